//! View algebra, aliasing and store equivalence through the public API.

mod common;

use common::init_test_logging;
use matrixkit_core::{
    CellStore, DenseMatrix1D, DenseMatrix2D, DenseMatrix3D, Matrix, MatrixError, Mult, PlusMult,
    SparseMatrix2D, SparseMatrix3D,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn grid(rows: usize, cols: usize) -> DenseMatrix2D {
    DenseMatrix2D::from_vec([rows, cols], (0..rows * cols).map(|k| k as f64).collect()).unwrap()
}

/// Random matrix with roughly `density` of its cells non-zero.
fn random_cells<S: CellStore>(shape: [usize; 2], density: f64, seed: u64) -> Matrix<S, 2> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let m = Matrix::<S, 2>::new(shape);
    for index in m.indices() {
        if rng.random::<f64>() < density {
            m.set_quick(index, rng.random_range(-10.0..10.0));
        }
    }
    m
}

#[test]
fn test_overlapping_box_copy_matches_deep_copy() -> anyhow::Result<()> {
    init_test_logging();

    for (from, to) in [([0, 0], [1, 1]), ([1, 1], [0, 0]), ([0, 2], [2, 0])] {
        let aliased = grid(5, 5);
        let src = aliased.view_part(from, [3, 3])?;
        let dst = aliased.view_part(to, [3, 3])?;
        assert!(dst.have_shared_cells(&src));
        dst.assign(&src)?;

        let reference = grid(5, 5);
        let snapshot = reference.view_part(from, [3, 3])?.copy();
        assert!(!snapshot.have_shared_cells(&reference));
        reference.view_part(to, [3, 3])?.assign(&snapshot)?;

        assert_eq!(aliased.to_vec(), reference.to_vec(), "{from:?} -> {to:?}");
    }
    Ok(())
}

#[test]
fn test_flipped_self_assignment() -> anyhow::Result<()> {
    let v = DenseMatrix1D::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    v.assign(&v.view_flip(0)?)?;
    assert_eq!(v.to_vec(), vec![5.0, 4.0, 3.0, 2.0, 1.0]);

    let m = grid(3, 3);
    m.assign_with(&m.view_transpose(), PlusMult(1.0))?;
    assert_eq!(
        m.to_nested(),
        vec![
            vec![0.0, 4.0, 8.0],
            vec![4.0, 8.0, 12.0],
            vec![8.0, 12.0, 16.0]
        ]
    );
    Ok(())
}

#[test]
fn test_sparse_dense_equivalence_under_transforms() -> anyhow::Result<()> {
    init_test_logging();

    let dense: DenseMatrix2D = random_cells([12, 9], 0.3, 7);
    let sparse = SparseMatrix2D::new([12, 9]);
    sparse.assign_from(&dense)?;
    assert_eq!(sparse.cardinality(), dense.cardinality());

    let other: DenseMatrix2D = random_cells([12, 9], 0.5, 8);

    dense.assign_fn(Mult(-2.5));
    sparse.assign_fn(Mult(-2.5));
    dense.assign_fn(|x: f64| if x > 3.0 { 0.0 } else { x });
    sparse.assign_fn(|x: f64| if x > 3.0 { 0.0 } else { x });
    dense.assign_with(&other, PlusMult(0.5))?;
    sparse.assign_with(&other, PlusMult(0.5))?;

    for [r, c] in dense.indices() {
        assert_eq!(dense.get([r, c])?, sparse.get([r, c])?, "cell ({r}, {c})");
    }
    assert_eq!(sparse.cardinality(), dense.cardinality());
    assert_eq!(
        sparse.store().borrow().stored_len(),
        Some(dense.cardinality())
    );
    Ok(())
}

#[test]
fn test_view_composition() -> anyhow::Result<()> {
    let m = grid(6, 8);
    // Every second row, reversed columns, then a 2x3 box.
    let v = m
        .view_strides([2, 1])?
        .view_flip(1)?
        .view_part([1, 2], [2, 3])?;
    assert_eq!(v.to_nested(), vec![vec![21.0, 20.0, 19.0], vec![37.0, 36.0, 35.0]]);

    let picked = m.view_selection([Some(&[5, 0, 5][..]), Some(&[7, 1][..])])?;
    assert_eq!(
        picked.to_nested(),
        vec![vec![47.0, 41.0], vec![7.0, 1.0], vec![47.0, 41.0]]
    );
    picked.set([1, 1], -1.0)?;
    assert_eq!(m.get([0, 1])?, -1.0);

    let flipped_selection = picked.view_flip(0)?.view_flip(1)?;
    assert_eq!(flipped_selection.get([0, 0])?, 41.0);
    Ok(())
}

#[test]
fn test_view_errors() {
    let m = grid(3, 4);
    assert!(matches!(
        m.view_part([2, 0], [2, 4]),
        Err(MatrixError::RangeOutOfBounds { .. })
    ));
    assert!(matches!(
        m.view_dice([0, 0]),
        Err(MatrixError::InvalidPermutation(_))
    ));
    assert!(matches!(
        m.view_strides([0, 1]),
        Err(MatrixError::InvalidStride { axis: 0, .. })
    ));
    assert!(matches!(
        m.view_selection([None, Some(&[4][..])]),
        Err(MatrixError::SelectionOutOfBounds { axis: 1, index: 4, len: 4 })
    ));
    assert!(matches!(
        m.view_flip(2),
        Err(MatrixError::AxisOutOfRange { axis: 2, rank: 2 })
    ));
}

#[test]
fn test_3d_sparse_views() -> anyhow::Result<()> {
    let m = SparseMatrix3D::new([3, 4, 5]);
    m.view_slice(1)?.view_column(2)?.assign_value(7.0);
    assert_eq!(m.cardinality(), 4);
    assert_eq!(m.get([1, 3, 2])?, 7.0);

    let dense = DenseMatrix3D::new([3, 4, 5]);
    dense.assign_from(&m)?;
    assert_eq!(dense.z_sum(), 28.0);
    assert_eq!(m.view_row(3)?.cardinality(), 1);
    Ok(())
}
