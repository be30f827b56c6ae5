//! Benchmark grid search per candidate model
//!
//! Run with: cargo bench --bench selection_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand::SeedableRng;

use studperf::models::default_candidates;
use studperf::pipeline::ModelSelection;

/// Dense features with a noisy linear target
fn generate_matrix(n_rows: usize, n_features: usize, seed: u64) -> (Array2<f64>, Array1<f64>) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let weights: Vec<f64> = (0..n_features).map(|_| rng.gen_range(-2.0..2.0)).collect();
    let x = Array2::from_shape_fn((n_rows, n_features), |_| rng.gen::<f64>() * 2.0 - 1.0);
    let y = x
        .rows()
        .into_iter()
        .map(|row| {
            row.iter().zip(&weights).map(|(v, w)| v * w).sum::<f64>() + rng.gen::<f64>() * 0.1
        })
        .collect();
    (x, y)
}

/// Benchmark each default candidate's grid search separately
fn benchmark_candidates(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_search_by_candidate");
    group.sample_size(10);

    let (x_train, y_train) = generate_matrix(800, 19, 42);
    let (x_test, y_test) = generate_matrix(200, 19, 43);
    let selection = ModelSelection::default();

    for candidate in default_candidates() {
        let name = candidate.name.clone();
        let single = vec![candidate];
        group.bench_with_input(BenchmarkId::new("candidate", &name), &single, |b, cands| {
            b.iter(|| {
                let _ = selection.run(
                    black_box(&x_train),
                    black_box(&y_train),
                    black_box(&x_test),
                    black_box(&y_test),
                    cands,
                );
            });
        });
    }

    group.finish();
}

/// Benchmark the full default candidate set for varying row counts
fn benchmark_full_selection_by_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_selection_by_rows");
    group.sample_size(10);

    let candidates = default_candidates();
    for n_rows in [250, 500, 1_000] {
        let (x, y) = generate_matrix(n_rows, 19, 7);
        group.throughput(Throughput::Elements(n_rows as u64));

        group.bench_with_input(BenchmarkId::new("default_candidates", n_rows), &(x, y), |b, (x, y)| {
            b.iter(|| {
                let _ = ModelSelection::default().run(black_box(x), black_box(y), x, y, &candidates);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_candidates, benchmark_full_selection_by_rows);
criterion_main!(benches);
