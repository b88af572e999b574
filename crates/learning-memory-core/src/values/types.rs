//! Value store data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::traits::Payload;
use crate::types::{Axis, ClusterId};

/// One stored experience resolved as a cluster member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    /// Record identifier in the axis collection.
    pub id: String,
    /// Stored embedding.
    pub embedding: Vec<f32>,
    /// Stored metadata.
    pub payload: Payload,
    /// Confidence tier weight.
    pub weight: f32,
}

/// Distance statistics behind a validation decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    /// Cosine distance from the candidate to the centroid.
    pub candidate_distance: f64,
    /// Mean member distance to the centroid.
    pub mean_distance: f64,
    /// Population standard deviation of member distances.
    pub std_distance: f64,
    /// `mean_distance + k * std_distance`.
    pub threshold: f64,
}

impl ValidationMetrics {
    /// True when the candidate lies within the threshold.
    #[inline]
    pub fn accepts(&self) -> bool {
        self.candidate_distance <= self.threshold
    }
}

/// Outcome of checking a value candidate against a cluster.
///
/// Rejection is data, not an error: `valid == false` carries a `reason`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the candidate may be stored.
    pub valid: bool,
    /// `1 - candidate_distance`, present when valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    /// Why the candidate was rejected, present when invalid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Distance statistics; absent when the cluster had no members.
    #[serde(flatten)]
    pub metrics: Option<ValidationMetrics>,
}

impl ValidationResult {
    /// Rejection without statistics.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            similarity: None,
            reason: Some(reason.into()),
            metrics: None,
        }
    }

    /// Decide from computed statistics.
    pub fn from_metrics(metrics: ValidationMetrics, std_multiplier: f64) -> Self {
        if metrics.accepts() {
            Self {
                valid: true,
                similarity: Some(1.0 - metrics.candidate_distance),
                reason: None,
                metrics: Some(metrics),
            }
        } else {
            Self {
                valid: false,
                similarity: None,
                reason: Some(format!(
                    "Value too far from centroid (distance={:.3}, threshold={:.3} [mean={:.3} + {}*std={:.3}])",
                    metrics.candidate_distance,
                    metrics.threshold,
                    metrics.mean_distance,
                    std_multiplier,
                    metrics.std_distance,
                )),
                metrics: Some(metrics),
            }
        }
    }
}

/// Validation record persisted with a value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueValidation {
    /// Similarity to the centroid at creation.
    pub similarity: f64,
    /// Distance statistics at creation.
    #[serde(flatten)]
    pub metrics: ValidationMetrics,
}

/// A validated statement anchored to one cluster. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    /// `value_{axis}_{label}_{uuid}`.
    pub id: String,
    /// Statement text.
    pub text: String,
    /// Source cluster.
    pub cluster_id: ClusterId,
    /// Source axis.
    pub axis: Axis,
    /// Source cluster label.
    pub cluster_label: u32,
    /// Embedding of `text`.
    pub embedding: Vec<f32>,
    /// Cluster size when the value was created.
    pub cluster_size: usize,
    /// Creation time (RFC 3339 on the wire).
    pub created_at: DateTime<Utc>,
    /// Validation metrics at creation.
    pub validation: ValueValidation,
}

/// Payload layout of a value record in the values collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ValuePayload {
    pub text: String,
    pub cluster_id: ClusterId,
    pub axis: Axis,
    pub cluster_label: u32,
    pub cluster_size: usize,
    pub created_at: DateTime<Utc>,
    pub validation: ValueValidation,
}

impl ValuePayload {
    pub(crate) fn from_value(value: &Value) -> Self {
        Self {
            text: value.text.clone(),
            cluster_id: value.cluster_id,
            axis: value.axis,
            cluster_label: value.cluster_label,
            cluster_size: value.cluster_size,
            created_at: value.created_at,
            validation: value.validation,
        }
    }

    pub(crate) fn into_value(self, id: String, embedding: Vec<f32>) -> Value {
        Value {
            id,
            text: self.text,
            cluster_id: self.cluster_id,
            axis: self.axis,
            cluster_label: self.cluster_label,
            embedding,
            cluster_size: self.cluster_size,
            created_at: self.created_at,
            validation: self.validation,
        }
    }
}
