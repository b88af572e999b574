//! Per-axis clustering of stored experiences.
//!
//! Binds the pure [`Clusterer`] to a [`VectorStore`]: scroll one axis
//! collection, derive weights from confidence tiers, cluster on a blocking
//! worker, compute weighted centroids.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use super::clusterer::{ClusterInfo, ClusterResult, Clusterer};
use crate::config::{LearningConfig, DEFAULT_SCROLL_LIMIT};
use crate::error::{ClusterError, LearningError, LearningResult, StorageError};
use crate::traits::{PayloadFilter, ScrollRequest, VectorRecord, VectorStore};
use crate::types::{Axis, AxisCollections, ConfidenceTier, DOMAIN_KEY};

/// Clusters experiences one axis at a time.
///
/// Holds no per-call state; every call re-reads the store and re-clusters.
#[derive(Clone)]
pub struct ExperienceClusterer {
    store: Arc<dyn VectorStore>,
    clusterer: Clusterer,
    collections: AxisCollections,
    scroll_limit: usize,
}

impl std::fmt::Debug for ExperienceClusterer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExperienceClusterer")
            .field("clusterer", &self.clusterer)
            .field("collections", &self.collections)
            .field("scroll_limit", &self.scroll_limit)
            .finish_non_exhaustive()
    }
}

impl ExperienceClusterer {
    /// Create a clusterer over `store` with the default scroll limit.
    pub fn new(store: Arc<dyn VectorStore>, clusterer: Clusterer, collections: AxisCollections) -> Self {
        Self {
            store,
            clusterer,
            collections,
            scroll_limit: DEFAULT_SCROLL_LIMIT,
        }
    }

    /// Build from configuration.
    ///
    /// # Errors
    /// - `LearningError::Cluster` if the clustering parameters are invalid
    pub fn from_config(store: Arc<dyn VectorStore>, config: &LearningConfig) -> LearningResult<Self> {
        let clusterer = Clusterer::new(config.clustering.to_params())?;
        Ok(Self::new(store, clusterer, config.collections.clone())
            .with_scroll_limit(config.retrieval.scroll_limit))
    }

    /// Set the maximum records scrolled per call.
    #[must_use]
    pub fn with_scroll_limit(mut self, limit: usize) -> Self {
        self.scroll_limit = limit;
        self
    }

    /// Axis → collection table.
    #[inline]
    pub fn collections(&self) -> &AxisCollections {
        &self.collections
    }

    /// Backing vector store.
    #[inline]
    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Cluster every experience on `axis`.
    ///
    /// Returns an empty list when every point is noise.
    ///
    /// # Errors
    /// - `LearningError::NoDataForAxis` if the collection is missing or empty
    /// - `LearningError::Cluster` for malformed stored embeddings
    /// - `LearningError::Storage` if the store fails
    pub async fn cluster_axis(&self, axis: Axis) -> LearningResult<Vec<ClusterInfo>> {
        let records = self.fetch(axis, None).await?;
        self.cluster_records(axis, records).await
    }

    /// Cluster full-axis experiences whose `domain` metadata equals `domain`.
    ///
    /// # Errors
    /// As [`Self::cluster_axis`]; `NoDataForAxis` if no record carries the domain.
    pub async fn cluster_domain(&self, domain: &str) -> LearningResult<Vec<ClusterInfo>> {
        let filter = PayloadFilter::new().with_equals(DOMAIN_KEY, domain.into());
        let records = self.fetch(Axis::Full, Some(filter)).await?;
        self.cluster_records(Axis::Full, records).await
    }

    /// Cluster all axes concurrently.
    ///
    /// Axes without data are omitted from the map. Any other failure is
    /// returned.
    pub async fn cluster_all_axes(&self) -> LearningResult<BTreeMap<Axis, Vec<ClusterInfo>>> {
        let results = join_all(
            Axis::all().map(|axis| async move { (axis, self.cluster_axis(axis).await) }),
        )
        .await;

        let mut by_axis = BTreeMap::new();
        for (axis, result) in results {
            match result {
                Ok(clusters) => {
                    by_axis.insert(axis, clusters);
                }
                Err(e) if e.is_no_data() => {
                    warn!(axis = %axis, error = %e, "Axis skipped: no data");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(by_axis)
    }

    /// Number of stored experiences on `axis`. A missing collection counts 0.
    pub async fn count_experiences(&self, axis: Axis) -> LearningResult<usize> {
        match self.store.count(self.collections.collection(axis), None).await {
            Ok(n) => Ok(n),
            Err(StorageError::CollectionNotFound(_)) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch(
        &self,
        axis: Axis,
        filter: Option<PayloadFilter>,
    ) -> LearningResult<Vec<VectorRecord>> {
        let collection = self.collections.collection(axis);
        let no_data = || LearningError::NoDataForAxis {
            axis: axis.to_string(),
            collection: collection.to_string(),
        };

        let mut request = ScrollRequest::with_vectors(self.scroll_limit);
        request.filter = filter;

        let records = match self.store.scroll(collection, request).await {
            Ok(records) => records,
            Err(StorageError::CollectionNotFound(_)) => return Err(no_data()),
            Err(e) => return Err(e.into()),
        };

        if records.len() >= self.scroll_limit {
            warn!(
                axis = %axis,
                collection,
                limit = self.scroll_limit,
                "Scroll limit reached; clustering may be missing experiences"
            );
        }

        let total = records.len();
        let records: Vec<VectorRecord> = records.into_iter().filter(|r| r.vector.is_some()).collect();
        if records.len() < total {
            debug!(
                axis = %axis,
                skipped = total - records.len(),
                "Skipped records without vectors"
            );
        }

        if records.is_empty() {
            return Err(no_data());
        }
        Ok(records)
    }

    async fn cluster_records(
        &self,
        axis: Axis,
        records: Vec<VectorRecord>,
    ) -> LearningResult<Vec<ClusterInfo>> {
        let n_points = records.len();
        let mut ids = Vec::with_capacity(n_points);
        let mut embeddings = Vec::with_capacity(n_points);
        let mut weights = Vec::with_capacity(n_points);

        for record in records {
            weights.push(ConfidenceTier::from_payload(&record.payload).weight());
            embeddings.push(record.vector.unwrap_or_default());
            ids.push(record.id);
        }

        let clusterer = self.clusterer.clone();
        let (result, clusters) = tokio::task::spawn_blocking(
            move || -> Result<(ClusterResult, Vec<ClusterInfo>), ClusterError> {
                let result = clusterer.cluster(&embeddings, Some(weights.as_slice()))?;
                let clusters = clusterer.compute_centroids(
                    &embeddings,
                    &result.labels,
                    &ids,
                    Some(weights.as_slice()),
                )?;
                Ok((result, clusters))
            },
        )
        .await
        .map_err(|e| LearningError::TaskFailed(e.to_string()))??;

        if clusters.is_empty() {
            warn!(
                axis = %axis,
                n_points,
                "HDBSCAN labeled all points as noise; no clusters found"
            );
            return Ok(clusters);
        }

        info!(
            axis = %axis,
            n_points,
            n_clusters = result.n_clusters,
            noise_count = result.noise_count,
            "Clustered axis"
        );
        Ok(clusters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::HDBSCANParams;
    use crate::stubs::InMemoryVectorStore;
    use crate::traits::{Payload, VectorRecord};
    use serde_json::json;

    const DIM: usize = 8;

    fn point(cloud: usize, p: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; DIM];
        v[cloud] = 1.0;
        v[(cloud + 1 + p) % DIM] += 0.01 * (p as f32 + 1.0);
        v
    }

    /// Clouds 0 and 1 are tagged `debugging`, later clouds `refactoring`.
    async fn seed(store: &InMemoryVectorStore, collection: &str, clouds: usize, tier: &str) {
        store.ensure_collection(collection, DIM);
        for c in 0..clouds {
            let domain = if c < 2 { "debugging" } else { "refactoring" };
            for p in 0..5 {
                let payload: Payload = json!({
                    "confidence_tier": tier,
                    "domain": domain,
                })
                .as_object()
                .cloned()
                .unwrap_or_default();
                let id = format!("{}-{}-{}", collection, c, p);
                store
                    .upsert(collection, VectorRecord::new(id, point(c, p), payload))
                    .await
                    .unwrap();
            }
        }
    }

    fn clusterer_over(store: Arc<InMemoryVectorStore>) -> ExperienceClusterer {
        let clusterer = Clusterer::new(HDBSCANParams::default().with_min_cluster_size(3)).unwrap();
        ExperienceClusterer::new(store, clusterer, AxisCollections::default())
    }

    #[tokio::test]
    async fn test_cluster_axis_finds_clouds() {
        let store = Arc::new(InMemoryVectorStore::new());
        seed(&store, "ghap_full", 3, "gold").await;

        let clusters = clusterer_over(store).cluster_axis(Axis::Full).await.unwrap();

        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters.iter().map(|c| c.size).sum::<usize>(), 15);
        for c in &clusters {
            assert_eq!(c.centroid.len(), DIM);
            assert!((c.avg_weight - 1.0).abs() < 1e-6, "gold weight is 1.0");
        }
        println!("[PASS] test_cluster_axis_finds_clouds");
    }

    #[tokio::test]
    async fn test_missing_and_empty_collections_are_no_data() {
        let store = Arc::new(InMemoryVectorStore::new());
        store.ensure_collection("ghap_strategy", DIM);
        let ec = clusterer_over(store);

        for axis in [Axis::Strategy, Axis::Surprise] {
            let err = ec.cluster_axis(axis).await.unwrap_err();
            assert!(err.is_no_data(), "{} should be NoDataForAxis, got {:?}", axis, err);
            assert!(err.to_string().contains(axis.as_str()));
        }
    }

    #[tokio::test]
    async fn test_unknown_tier_uses_bronze_weight() {
        let store = Arc::new(InMemoryVectorStore::new());
        seed(&store, "ghap_surprise", 2, "platinum").await;

        let clusters = clusterer_over(store).cluster_axis(Axis::Surprise).await.unwrap();
        assert!(!clusters.is_empty());
        assert!(clusters.iter().all(|c| (c.avg_weight - 0.5).abs() < 1e-6));
    }

    #[tokio::test]
    async fn test_all_noise_is_empty_list() {
        let store = Arc::new(InMemoryVectorStore::new());
        store.ensure_collection("ghap_root_cause", DIM);
        store
            .upsert("ghap_root_cause", VectorRecord::new("only", point(0, 0), Payload::new()))
            .await
            .unwrap();

        let clusters = clusterer_over(store).cluster_axis(Axis::RootCause).await.unwrap();
        assert!(clusters.is_empty());
    }

    #[tokio::test]
    async fn test_cluster_all_axes_omits_empty_axes() {
        let store = Arc::new(InMemoryVectorStore::new());
        seed(&store, "ghap_full", 3, "silver").await;
        seed(&store, "ghap_surprise", 2, "gold").await;
        store.ensure_collection("ghap_strategy", DIM);

        let all = clusterer_over(store).cluster_all_axes().await.unwrap();

        assert_eq!(all.keys().copied().collect::<Vec<_>>(), vec![Axis::Full, Axis::Surprise]);
        assert_eq!(all[&Axis::Full].len(), 3);
        println!("[PASS] test_cluster_all_axes_omits_empty_axes");
    }

    #[tokio::test]
    async fn test_count_and_domain() {
        let store = Arc::new(InMemoryVectorStore::new());
        seed(&store, "ghap_full", 3, "gold").await;
        let ec = clusterer_over(store);

        assert_eq!(ec.count_experiences(Axis::Full).await.unwrap(), 15);
        assert_eq!(ec.count_experiences(Axis::Strategy).await.unwrap(), 0);

        let debugging = ec.cluster_domain("debugging").await.unwrap();
        assert_eq!(debugging.len(), 2, "one cluster per debugging cloud");
        assert_eq!(debugging.iter().map(|c| c.size).sum::<usize>(), 10);
        for cluster in &debugging {
            assert!(
                cluster
                    .member_ids
                    .iter()
                    .all(|id| id.starts_with("ghap_full-0-") || id.starts_with("ghap_full-1-")),
                "refactoring record leaked into {:?}",
                cluster.member_ids
            );
        }

        let err = ec.cluster_domain("cooking").await.unwrap_err();
        assert!(err.is_no_data());
        println!("[PASS] test_count_and_domain - {} debugging clusters", debugging.len());
    }

    #[tokio::test]
    async fn test_scroll_limit_truncates() {
        let store = Arc::new(InMemoryVectorStore::new());
        seed(&store, "ghap_full", 3, "gold").await;

        let clusters = clusterer_over(store)
            .with_scroll_limit(5)
            .cluster_axis(Axis::Full)
            .await
            .unwrap();
        assert!(clusters.iter().map(|c| c.size).sum::<usize>() <= 5);
    }
}
