//! Value validation and storage.
//!
//! A value is a short statement an agent proposes as the lesson of one
//! experience cluster. It is accepted only when its embedding lies no farther
//! from the cluster centroid than a typical member:
//!
//! ```text
//! threshold = mean(member distances) + k * std(member distances)
//! valid     = cosine_distance(candidate, centroid) <= threshold
//! ```
//!
//! Clusters are recomputed on every call; nothing about them is cached. A
//! value validated against one clustering may be stored after the data has
//! changed, since `store_value` re-validates against a fresh clustering.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value as JsonValue;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::stats::distance_metrics;
use super::types::{Experience, ValidationResult, Value, ValuePayload, ValueValidation};
use crate::clustering::{ExperienceClusterer, NamedCluster};
use crate::config::{LearningConfig, DEFAULT_STD_MULTIPLIER, DEFAULT_VALUES_SCROLL_LIMIT};
use crate::error::{ClusterError, LearningError, LearningResult, StorageError};
use crate::traits::{EmbeddingService, PayloadFilter, ScrollRequest, VectorRecord, VectorStore};
use crate::types::{Axis, ClusterId, ConfidenceTier};

/// Reason reported when a cluster resolves to zero retrievable members.
pub const EMPTY_CLUSTER_REASON: &str = "Cluster has no members";

/// Payload key holding a value's axis.
const AXIS_KEY: &str = "axis";

/// Validates value candidates against experience clusters and persists the
/// accepted ones.
pub struct ValueStore {
    clusterer: ExperienceClusterer,
    embeddings: Arc<dyn EmbeddingService>,
    std_multiplier: f64,
    values_scroll_limit: usize,
    values_ready: OnceCell<()>,
}

impl std::fmt::Debug for ValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueStore")
            .field("clusterer", &self.clusterer)
            .field("embedding_model", &self.embeddings.model_id())
            .field("std_multiplier", &self.std_multiplier)
            .field("values_scroll_limit", &self.values_scroll_limit)
            .finish_non_exhaustive()
    }
}

impl ValueStore {
    /// Create a store with default validation settings.
    pub fn new(clusterer: ExperienceClusterer, embeddings: Arc<dyn EmbeddingService>) -> Self {
        Self {
            clusterer,
            embeddings,
            std_multiplier: DEFAULT_STD_MULTIPLIER,
            values_scroll_limit: DEFAULT_VALUES_SCROLL_LIMIT,
            values_ready: OnceCell::new(),
        }
    }

    /// Build the store and its clusterer from configuration.
    ///
    /// # Errors
    /// - `LearningError::Cluster` if the clustering parameters are invalid
    pub fn from_config(
        store: Arc<dyn VectorStore>,
        embeddings: Arc<dyn EmbeddingService>,
        config: &LearningConfig,
    ) -> LearningResult<Self> {
        let clusterer = ExperienceClusterer::from_config(store, config)?;
        Ok(Self::new(clusterer, embeddings)
            .with_std_multiplier(config.validation.std_multiplier)
            .with_values_scroll_limit(config.retrieval.values_scroll_limit))
    }

    /// Set `k` in `mean + k * std`.
    #[must_use]
    pub fn with_std_multiplier(mut self, k: f64) -> Self {
        self.std_multiplier = k;
        self
    }

    /// Set the maximum records read by [`Self::list_values`].
    #[must_use]
    pub fn with_values_scroll_limit(mut self, limit: usize) -> Self {
        self.values_scroll_limit = limit;
        self
    }

    /// Underlying experience clusterer.
    pub fn clusterer(&self) -> &ExperienceClusterer {
        &self.clusterer
    }

    fn store(&self) -> &Arc<dyn VectorStore> {
        self.clusterer.store()
    }

    // ========================================================================
    // CLUSTERS
    // ========================================================================

    /// Clusters on `axis`, largest first. Equal sizes order by ascending label.
    ///
    /// # Errors
    /// As [`ExperienceClusterer::cluster_axis`].
    pub async fn get_clusters(&self, axis: Axis) -> LearningResult<Vec<NamedCluster>> {
        let mut clusters: Vec<NamedCluster> = self
            .clusterer
            .cluster_axis(axis)
            .await?
            .into_iter()
            .map(|info| NamedCluster::new(axis, info))
            .collect();

        clusters.sort_by(by_size_then_label);
        Ok(clusters)
    }

    /// Experiences belonging to `cluster_id`.
    ///
    /// Members no longer present in the store are skipped.
    ///
    /// # Errors
    /// - `LearningError::InvalidClusterId` for malformed ids or unknown axes
    /// - `LearningError::ClusterNotFound` if a fresh clustering lacks the label
    /// - `LearningError::NoDataForAxis` if the axis has no data
    pub async fn get_cluster_members(&self, cluster_id: &str) -> LearningResult<Vec<Experience>> {
        let id: ClusterId = cluster_id.parse()?;
        let cluster = self.resolve_cluster(id).await?;
        self.fetch_members(&cluster).await
    }

    async fn resolve_cluster(&self, id: ClusterId) -> LearningResult<NamedCluster> {
        self.get_clusters(id.axis)
            .await?
            .into_iter()
            .find(|c| c.cluster_id == id)
            .ok_or_else(|| LearningError::ClusterNotFound {
                cluster_id: id.to_string(),
            })
    }

    async fn fetch_members(&self, cluster: &NamedCluster) -> LearningResult<Vec<Experience>> {
        let collection = self.clusterer.collections().collection(cluster.axis);
        let mut members = Vec::with_capacity(cluster.size());

        for member_id in cluster.member_ids() {
            match self.store().get(collection, member_id, true).await? {
                Some(VectorRecord {
                    id,
                    vector: Some(embedding),
                    payload,
                }) => {
                    let weight = ConfidenceTier::from_payload(&payload).weight();
                    members.push(Experience {
                        id,
                        embedding,
                        payload,
                        weight,
                    });
                }
                _ => {
                    debug!(
                        cluster_id = %cluster.cluster_id,
                        member_id = member_id.as_str(),
                        "Cluster member no longer retrievable; skipping"
                    );
                }
            }
        }

        Ok(members)
    }

    // ========================================================================
    // VALIDATION
    // ========================================================================

    /// Check whether `text` is close enough to the centroid of `cluster_id`.
    ///
    /// A rejected candidate is `Ok` with `valid == false`; an empty cluster is
    /// rejected with [`EMPTY_CLUSTER_REASON`].
    ///
    /// # Errors
    /// - cluster resolution errors as in [`Self::get_cluster_members`]
    /// - `LearningError::Embedding` if the text cannot be embedded
    /// - `ClusterError::DimensionMismatch` if the embedding service and the
    ///   stored experiences disagree on dimension
    pub async fn validate_value_candidate(
        &self,
        text: &str,
        cluster_id: &str,
    ) -> LearningResult<ValidationResult> {
        let id: ClusterId = cluster_id.parse()?;
        let cluster = self.resolve_cluster(id).await?;
        let (result, _) = self.validate_against(text, &cluster).await?;
        Ok(result)
    }

    /// Returns the decision and, when members existed, the candidate embedding.
    async fn validate_against(
        &self,
        text: &str,
        cluster: &NamedCluster,
    ) -> LearningResult<(ValidationResult, Option<Vec<f32>>)> {
        let members = self.fetch_members(cluster).await?;
        if members.is_empty() {
            return Ok((ValidationResult::rejected(EMPTY_CLUSTER_REASON), None));
        }

        let candidate = self.embeddings.embed(text).await?;
        if candidate.len() != cluster.centroid().len() {
            warn!(
                cluster_id = %cluster.cluster_id,
                candidate_dimension = candidate.len(),
                centroid_dimension = cluster.centroid().len(),
                model = self.embeddings.model_id(),
                "Embedding dimension differs from stored experiences"
            );
            return Err(ClusterError::DimensionMismatch {
                expected: cluster.centroid().len(),
                actual: candidate.len(),
            }
            .into());
        }

        let metrics = distance_metrics(
            &candidate,
            cluster.centroid(),
            members.iter().map(|m| m.embedding.as_slice()),
            self.std_multiplier,
        )?;
        let result = ValidationResult::from_metrics(metrics, self.std_multiplier);

        debug!(
            cluster_id = %cluster.cluster_id,
            members = members.len(),
            candidate_distance = metrics.candidate_distance,
            threshold = metrics.threshold,
            valid = result.valid,
            "Validated value candidate"
        );

        Ok((result, Some(candidate)))
    }

    // ========================================================================
    // STORAGE
    // ========================================================================

    /// Validate `text` against `cluster_id` and persist it as a value.
    ///
    /// # Errors
    /// - `LearningError::AxisMismatch` if `axis` differs from the id's axis
    /// - `LearningError::ValidationFailed` if the candidate is rejected
    /// - cluster resolution, embedding and storage errors
    pub async fn store_value(&self, text: &str, cluster_id: &str, axis: Axis) -> LearningResult<Value> {
        let id: ClusterId = cluster_id.parse()?;
        if id.axis != axis {
            return Err(LearningError::AxisMismatch {
                cluster_id: id.to_string(),
                axis: axis.to_string(),
            });
        }

        let cluster = self.resolve_cluster(id).await?;
        let (result, embedding) = self.validate_against(text, &cluster).await?;

        let (validation, embedding) = match (result.similarity, result.metrics, embedding) {
            (Some(similarity), Some(metrics), Some(embedding)) if result.valid => {
                (ValueValidation { similarity, metrics }, embedding)
            }
            _ => {
                return Err(LearningError::ValidationFailed {
                    reason: result.reason.unwrap_or_else(|| "candidate rejected".to_string()),
                })
            }
        };

        self.ensure_values_collection().await?;

        let value = Value {
            id: format!("value_{}_{}_{}", axis, id.label, Uuid::new_v4().simple()),
            text: text.to_string(),
            cluster_id: id,
            axis,
            cluster_label: id.label,
            embedding,
            cluster_size: cluster.size(),
            created_at: Utc::now(),
            validation,
        };

        let payload = match serde_json::to_value(ValuePayload::from_value(&value))
            .map_err(|e| StorageError::Serialization(e.to_string()))?
        {
            JsonValue::Object(map) => map,
            other => {
                return Err(StorageError::Serialization(format!(
                    "value payload must be an object, got {}",
                    other
                ))
                .into())
            }
        };

        self.store()
            .upsert(
                self.clusterer.collections().values_collection(),
                VectorRecord::new(value.id.clone(), value.embedding.clone(), payload),
            )
            .await?;

        info!(
            value_id = value.id.as_str(),
            cluster_id = %value.cluster_id,
            cluster_size = value.cluster_size,
            similarity = validation.similarity,
            "Stored value"
        );
        Ok(value)
    }

    /// Stored values, newest first, optionally restricted to one axis.
    ///
    /// # Errors
    /// - `LearningError::Storage` if the store fails or a payload is malformed
    pub async fn list_values(&self, axis: Option<Axis>) -> LearningResult<Vec<Value>> {
        self.ensure_values_collection().await?;

        let mut request = ScrollRequest::with_vectors(self.values_scroll_limit);
        if let Some(axis) = axis {
            request = request.filtered(PayloadFilter::new().with_equals(AXIS_KEY, axis.as_str().into()));
        }

        let collection = self.clusterer.collections().values_collection();
        let records = self.store().scroll(collection, request).await?;

        if records.len() >= self.values_scroll_limit {
            warn!(
                collection,
                limit = self.values_scroll_limit,
                "Values scroll limit reached; older values may be missing"
            );
        }

        let mut values = Vec::with_capacity(records.len());
        for record in records {
            let payload: ValuePayload = serde_json::from_value(JsonValue::Object(record.payload))
                .map_err(|e| {
                    StorageError::Serialization(format!("value '{}': {}", record.id, e))
                })?;
            values.push(payload.into_value(record.id, record.vector.unwrap_or_default()));
        }

        values.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(values)
    }

    async fn ensure_values_collection(&self) -> LearningResult<()> {
        self.values_ready
            .get_or_try_init(|| async {
                let name = self.clusterer.collections().values_collection();
                match self.store().create_collection(name, self.embeddings.dimension()).await {
                    Ok(()) => {
                        info!(collection = name, "Created values collection");
                        Ok(())
                    }
                    Err(StorageError::CollectionAlreadyExists(_)) => Ok(()),
                    Err(e) => Err(LearningError::from(e)),
                }
            })
            .await?;
        Ok(())
    }
}

fn by_size_then_label(a: &NamedCluster, b: &NamedCluster) -> Ordering {
    b.size()
        .cmp(&a.size())
        .then_with(|| a.info.label.cmp(&b.info.label))
}
