//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use learning_memory_core::clustering::{Clusterer, ExperienceClusterer, HDBSCANParams};
use learning_memory_core::stubs::{InMemoryVectorStore, StubEmbeddingService};
use learning_memory_core::traits::{Payload, VectorRecord, VectorStore};
use learning_memory_core::types::AxisCollections;
use learning_memory_core::values::ValueStore;
use serde_json::json;

pub const DIM: usize = 8;

/// Point `p` of cloud `cloud`: a unit axis plus a small, distinct offset.
pub fn point(cloud: usize, p: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; DIM];
    v[cloud] = 1.0;
    v[(cloud + 1 + p) % DIM] += 0.01 * (p as f32 + 1.0);
    v
}

/// `clouds` clouds of `per_cloud` points, in cloud order.
pub fn clouds(clouds: usize, per_cloud: usize) -> Vec<Vec<f32>> {
    (0..clouds)
        .flat_map(|c| (0..per_cloud).map(move |p| point(c, p)))
        .collect()
}

pub fn ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("exp-{}", i)).collect()
}

pub fn tier_payload(tier: &str) -> Payload {
    json!({ "confidence_tier": tier })
        .as_object()
        .cloned()
        .unwrap_or_default()
}

/// Store `clouds` five-point clouds in `collection`.
pub async fn seed(store: &InMemoryVectorStore, collection: &str, clouds: usize, tier: &str) {
    store.ensure_collection(collection, DIM);
    for c in 0..clouds {
        for p in 0..5 {
            store
                .upsert(
                    collection,
                    VectorRecord::new(format!("{}-{}-{}", collection, c, p), point(c, p), tier_payload(tier)),
                )
                .await
                .expect("seed upsert");
        }
    }
}

pub fn small_clusterer() -> Clusterer {
    Clusterer::new(HDBSCANParams::default().with_min_cluster_size(3)).expect("valid params")
}

pub fn experience_clusterer(store: Arc<InMemoryVectorStore>) -> ExperienceClusterer {
    ExperienceClusterer::new(store, small_clusterer(), AxisCollections::default())
}

pub fn value_store(store: Arc<InMemoryVectorStore>, embeddings: Arc<StubEmbeddingService>) -> ValueStore {
    ValueStore::new(experience_clusterer(store), embeddings)
}
