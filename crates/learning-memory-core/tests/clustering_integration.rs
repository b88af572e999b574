//! Integration tests for clustering: pure HDBSCAN plus centroids, and
//! per-axis clustering over the in-memory store.
//!
//! Each test prints the state it verified as evidence.

mod common;

use std::sync::Arc;

use common::{clouds, ids, seed, small_clusterer, DIM};
use learning_memory_core::clustering::{
    cosine_distance, euclidean_distance, ClusterSelectionMethod, Clusterer, HDBSCANParams,
    NOISE_LABEL,
};
use learning_memory_core::error::{ClusterError, ErrorKind, LearningError};
use learning_memory_core::stubs::InMemoryVectorStore;
use learning_memory_core::types::Axis;

// =============================================================================
// CLUSTERER
// =============================================================================

#[test]
fn three_separated_clouds_form_three_clusters() {
    println!("\n=== Three separated clouds, min_cluster_size = 3 ===");
    let data = clouds(3, 5);

    for method in [ClusterSelectionMethod::EOM, ClusterSelectionMethod::Leaf] {
        let clusterer = Clusterer::new(
            HDBSCANParams::default()
                .with_min_cluster_size(3)
                .with_selection_method(method),
        )
        .unwrap();
        let result = clusterer.cluster(&data, None).unwrap();

        println!("  - {}: n_clusters={} noise={}", method, result.n_clusters, result.noise_count);
        assert_eq!(result.n_clusters, 3);
        assert_eq!(result.noise_count, 0);

        // Points of one cloud share a label; different clouds differ.
        for cloud in 0..3 {
            let label = result.labels[cloud * 5];
            assert!(result.labels[cloud * 5..cloud * 5 + 5].iter().all(|&l| l == label));
        }
        assert_ne!(result.labels[0], result.labels[5]);
        assert_ne!(result.labels[5], result.labels[10]);
        assert_ne!(result.labels[0], result.labels[10]);
    }
    println!("EVIDENCE: every cloud is exactly one cluster");
}

#[test]
fn empty_input_is_validation_error() {
    let err = small_clusterer().cluster(&[], None).unwrap_err();
    assert_eq!(err, ClusterError::EmptyInput);
    assert_eq!(LearningError::from(err).kind(), ErrorKind::Validation);
}

#[test]
fn ragged_input_is_rejected() {
    let data = vec![vec![1.0, 0.0], vec![1.0]];
    let err = small_clusterer().cluster(&data, None).unwrap_err();
    assert!(matches!(err, ClusterError::NotTwoDimensional { .. }), "{:?}", err);
}

#[test]
fn weights_mismatch_names_both_lengths() {
    let data = clouds(2, 5);
    let err = small_clusterer().cluster(&data, Some(&[1.0, 1.0, 1.0])).unwrap_err();

    let msg = err.to_string();
    println!("  - error: {}", msg);
    assert!(msg.contains('3'), "{}", msg);
    assert!(msg.contains("10"), "{}", msg);
}

#[test]
fn small_batch_is_all_noise_not_error() {
    let data = clouds(1, 2);
    let result = small_clusterer().cluster(&data, None).unwrap();

    assert_eq!(result.n_clusters, 0);
    assert_eq!(result.noise_count, 2);
    assert!(result.labels.iter().all(|&l| l == NOISE_LABEL));
}

#[test]
fn labels_and_sizes_account_for_every_point() {
    let mut data = clouds(3, 6);
    // Two stragglers between clouds.
    data.push(vec![0.6, 0.6, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5]);
    data.push(vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.3, 0.3, 0.9]);
    let n = data.len();

    let clusterer = small_clusterer();
    let result = clusterer.cluster(&data, None).unwrap();
    let clusters = clusterer
        .compute_centroids(&data, &result.labels, &ids(n), None)
        .unwrap();

    assert_eq!(result.labels.len(), n);
    assert_eq!(result.probabilities.len(), n);
    assert!(result.probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
    assert_eq!(result.n_clusters, clusters.len());
    assert_eq!(result.noise_count + clusters.iter().map(|c| c.size).sum::<usize>(), n);

    for c in &clusters {
        assert_ne!(c.label, NOISE_LABEL);
        assert_eq!(c.centroid.len(), DIM);
        assert_eq!(c.member_ids.len(), c.size);
    }
    let labels: Vec<i32> = clusters.iter().map(|c| c.label).collect();
    let mut sorted = labels.clone();
    sorted.sort_unstable();
    assert_eq!(labels, sorted, "centroids are ordered by label");
}

#[test]
fn heavy_member_pulls_weighted_centroid() {
    let data = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 1.0]];
    let labels = vec![0, 0, 0];
    let clusterer = Clusterer::default();

    let plain = clusterer.compute_centroids(&data, &labels, &ids(3), None).unwrap();
    let weighted = clusterer
        .compute_centroids(&data, &labels, &ids(3), Some(&[1.0, 0.2, 0.2]))
        .unwrap();

    let heavy = &data[0];
    let d_plain = euclidean_distance(&plain[0].centroid, heavy);
    let d_weighted = euclidean_distance(&weighted[0].centroid, heavy);
    println!("  - distance to heavy member: plain={:.4} weighted={:.4}", d_plain, d_weighted);
    assert!(d_weighted < d_plain);
    assert!(cosine_distance(&weighted[0].centroid, heavy) < cosine_distance(&plain[0].centroid, heavy));
    assert!((weighted[0].avg_weight - 1.4 / 3.0).abs() < 1e-6);
}

#[test]
fn centroid_length_checks() {
    let clusterer = Clusterer::default();
    let data = vec![vec![1.0, 0.0], vec![0.0, 1.0]];

    let err = clusterer
        .compute_centroids(&data, &[0], &ids(2), None)
        .unwrap_err();
    assert!(matches!(err, ClusterError::LengthMismatch { .. }));

    let err = clusterer
        .compute_centroids(&data, &[0, 0], &ids(2), Some(&[0.0, 0.0]))
        .unwrap_err();
    assert!(matches!(err, ClusterError::InvalidWeight { index: 0, .. }), "{:?}", err);

    let only_noise = clusterer
        .compute_centroids(&data, &[NOISE_LABEL, NOISE_LABEL], &ids(2), None)
        .unwrap();
    assert!(only_noise.is_empty());
}

// =============================================================================
// EXPERIENCE CLUSTERER
// =============================================================================

#[tokio::test]
async fn empty_strategy_axis_is_skipped_by_cluster_all() {
    println!("\n=== Empty strategy collection ===");
    let store = Arc::new(InMemoryVectorStore::new());
    seed(&store, "ghap_full", 3, "gold").await;
    seed(&store, "ghap_root_cause", 2, "bronze").await;
    store.ensure_collection("ghap_strategy", DIM);

    let clusterer = common::experience_clusterer(store);

    let err = clusterer.cluster_axis(Axis::Strategy).await.unwrap_err();
    println!("  - strategy: {}", err);
    assert!(matches!(err, LearningError::NoDataForAxis { ref axis, .. } if axis == "strategy"));
    assert_eq!(err.kind(), ErrorKind::InsufficientData);

    let all = clusterer.cluster_all_axes().await.unwrap();
    println!("  - axes returned: {:?}", all.keys().collect::<Vec<_>>());
    assert!(!all.contains_key(&Axis::Strategy));
    assert!(!all.contains_key(&Axis::Surprise));
    assert_eq!(all[&Axis::Full].len(), 3);
    assert_eq!(all[&Axis::RootCause].len(), 2);
    assert!(all[&Axis::RootCause].iter().all(|c| (c.avg_weight - 0.5).abs() < 1e-6));
    println!("EVIDENCE: only axes with data are present");
}

#[tokio::test]
async fn axis_names_parse_or_list_valid_values() {
    let axis: Axis = "root_cause".parse().unwrap();
    assert_eq!(axis, Axis::RootCause);

    let err = "vibes".parse::<Axis>().unwrap_err();
    let msg = err.to_string();
    for valid in ["full", "strategy", "surprise", "root_cause"] {
        assert!(msg.contains(valid), "{}", msg);
    }
}
