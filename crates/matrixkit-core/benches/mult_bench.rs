use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use matrixkit_core::{CellStore, DenseMatrix2D, Matrix, SparseMatrix2D};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn random_matrix<S: CellStore>(n: usize, density: f64, seed: u64) -> Matrix<S, 2> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let m = Matrix::<S, 2>::new([n, n]);
    for index in m.indices() {
        if rng.random::<f64>() < density {
            m.set_quick(index, rng.random_range(-1.0..1.0));
        }
    }
    m
}

fn bench_mult(c: &mut Criterion) {
    let mut group = c.benchmark_group("mult");

    for &size in &[32, 128, 256] {
        let a: DenseMatrix2D = random_matrix(size, 1.0, 42);
        let b: DenseMatrix2D = random_matrix(size, 1.0, 43);
        group.bench_with_input(BenchmarkId::new("dense", size), &size, |bench, _| {
            bench.iter(|| a.mult(&b));
        });

        let s: SparseMatrix2D = random_matrix(size, 0.05, 44);
        group.bench_with_input(BenchmarkId::new("sparse_left_5pct", size), &size, |bench, _| {
            bench.iter(|| s.mult(&b));
        });
    }

    group.finish();
}

fn bench_stencil(c: &mut Criterion) {
    let a: DenseMatrix2D = random_matrix(256, 1.0, 7);
    let out = DenseMatrix2D::new([256, 256]);
    c.bench_function("assign_8_neighbors_256", |bench| {
        bench.iter(|| a.assign_8_neighbors(&out, |w| w.iter().flatten().sum::<f64>() / 9.0));
    });
}

criterion_group!(benches, bench_mult, bench_stencil);
criterion_main!(benches);
