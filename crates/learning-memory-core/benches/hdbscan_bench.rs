//! HDBSCAN clustering benchmarks
//!
//! Run with:
//! - `cargo bench -p learning-memory-core --bench hdbscan_bench`
//! - `cargo bench -p learning-memory-core --bench hdbscan_bench hdbscan_point_scaling -- --noplot`

use learning_memory_core::clustering::{
    ClusterSelectionMethod, Clusterer, DistanceMetric, HDBSCANParams,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// =============================================================================
// Helper Functions: Deterministic Data Generation
// =============================================================================

/// Deterministic point near the centre of `cloud`.
fn generate_point(dim: usize, cloud: usize, seed: u64) -> Vec<f32> {
    (0..dim)
        .map(|i| {
            let base = if i % 8 == cloud % 8 { 1.0 } else { 0.0 };
            base + (((i as f64 + seed as f64) * 0.37).sin() * 0.02) as f32
        })
        .collect()
}

/// `n_clouds` separated clouds of `per_cloud` points each.
fn generate_clouds(n_clouds: usize, per_cloud: usize, dim: usize) -> Vec<Vec<f32>> {
    (0..n_clouds)
        .flat_map(|c| (0..per_cloud).map(move |p| generate_point(dim, c, (c * 1000 + p) as u64)))
        .collect()
}

fn bench_params() -> HDBSCANParams {
    HDBSCANParams::default().with_min_cluster_size(5).with_min_samples(3)
}

// =============================================================================
// Point Count Scaling
// =============================================================================

fn bench_hdbscan_point_scaling(c: &mut Criterion) {
    let dim = 768;
    let clusterer = Clusterer::new(bench_params()).unwrap();

    let mut group = c.benchmark_group("hdbscan_point_scaling");
    group.sample_size(10);

    for n in [50usize, 200, 500, 1000].iter() {
        let data = generate_clouds(5, *n / 5, dim);

        group.throughput(Throughput::Elements(*n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, d| {
            b.iter(|| clusterer.cluster(black_box(d), None).unwrap())
        });
    }
    group.finish();
}

// =============================================================================
// Selection Method and Metric Comparison
// =============================================================================

fn bench_hdbscan_variants(c: &mut Criterion) {
    let data = generate_clouds(4, 50, 384);

    let mut group = c.benchmark_group("hdbscan_variants");

    for (name, method, metric) in [
        ("eom_cosine", ClusterSelectionMethod::EOM, DistanceMetric::Cosine),
        ("leaf_cosine", ClusterSelectionMethod::Leaf, DistanceMetric::Cosine),
        ("eom_euclidean", ClusterSelectionMethod::EOM, DistanceMetric::Euclidean),
    ] {
        let clusterer = Clusterer::new(
            bench_params()
                .with_selection_method(method)
                .with_metric(metric),
        )
        .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, d| {
            b.iter(|| clusterer.cluster(black_box(d), None).unwrap())
        });
    }
    group.finish();
}

// =============================================================================
// Weighted Centroids
// =============================================================================

fn bench_compute_centroids(c: &mut Criterion) {
    let data = generate_clouds(5, 100, 768);
    let clusterer = Clusterer::new(bench_params()).unwrap();
    let result = clusterer.cluster(&data, None).unwrap();
    let ids: Vec<String> = (0..data.len()).map(|i| format!("exp-{}", i)).collect();
    let weights: Vec<f32> = (0..data.len()).map(|i| [1.0, 0.8, 0.5, 0.2][i % 4]).collect();

    c.bench_function("compute_centroids_500x768", |b| {
        b.iter(|| {
            clusterer
                .compute_centroids(
                    black_box(&data),
                    black_box(&result.labels),
                    black_box(&ids),
                    Some(black_box(weights.as_slice())),
                )
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_hdbscan_point_scaling,
    bench_hdbscan_variants,
    bench_compute_centroids,
);
criterion_main!(benches);
