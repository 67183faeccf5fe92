use approx::assert_abs_diff_eq;
use matrixkit::prelude::*;

/// 1-D Poisson matrix `tridiag(-1, 2, -1)` on `n` points.
fn poisson<S: CellStore>(n: usize) -> Matrix<S, 2> {
    let a = Matrix::<S, 2>::new([n, n]);
    for i in 0..n {
        a.set_quick([i, i], 2.0);
        if i + 1 < n {
            a.set_quick([i, i + 1], -1.0);
            a.set_quick([i + 1, i], -1.0);
        }
    }
    a
}

#[test]
fn test_sparse_poisson_solve() -> anyhow::Result<()> {
    let n = 50;
    let a: SparseMatrix2D = poisson(n);
    assert_eq!(a.cardinality(), 3 * n - 2);
    assert_eq!(a.store().borrow().cells().len(), 3 * n - 2);

    let b = DenseMatrix1D::new([n]);
    b.assign_value(1.0);
    let x = LuDecomposition::new(&a)?.solve_vector(&b)?;

    // Discrete solution of -u'' = 1 with zero boundaries: u_i = (i+1)(n-i)/2.
    for i in 0..n {
        let expected = ((i + 1) * (n - i)) as f64 / 2.0;
        assert_abs_diff_eq!(x.get([i])?, expected, epsilon = 1e-8);
    }
    assert_abs_diff_eq!(det(&a)?, (n + 1) as f64, epsilon = 1e-8);
    Ok(())
}

#[test]
fn test_banded_and_general_agree() -> anyhow::Result<()> {
    let n = 20;
    let b = DenseMatrix1D::from_slice(&(0..n).map(|i| (i as f64).sin()).collect::<Vec<_>>());

    let banded_input: DenseMatrix2D = poisson(n);
    let mut banded = LuDecompositionQuick::new();
    banded.decompose_banded(&banded_input, 2)?;
    let x_banded = b.copy();
    banded.solve_vector(&x_banded)?;

    let x_general = LuDecomposition::new(&poisson::<matrixkit::DenseStore>(n))?.solve_vector(&b)?;
    assert!(x_banded.approx_eq(&x_general, 1e-10));
    Ok(())
}

#[test]
fn test_solve_into_view_of_larger_matrix() -> anyhow::Result<()> {
    let a = DenseMatrix2D::from_rows(&[[3.0, 1.0], [1.0, 2.0]])?;
    let mut lu = LuDecompositionQuick::new();
    lu.decompose(&a.copy())?;

    // Solve in place into the lower-right block of a bigger matrix.
    let big = DenseMatrix2D::new([4, 4]);
    big.set([2, 2], 4.0)?;
    big.set([3, 2], 3.0)?;
    let block = big.view_part([2, 2], [2, 1])?;
    lu.solve_matrix(&block)?;
    assert_abs_diff_eq!(big.get([2, 2])?, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(big.get([3, 2])?, 1.0, epsilon = 1e-12);
    assert_eq!(big.cardinality(), 2);
    Ok(())
}

#[test]
fn test_errors_convert_through_question_mark() {
    fn run() -> Result<(), LuError> {
        let a = DenseMatrix2D::new([2, 2]);
        a.view_part([1, 1], [2, 2])?;
        Ok(())
    }
    assert!(matches!(
        run(),
        Err(LuError::Matrix(MatrixError::RangeOutOfBounds { .. }))
    ));
}
