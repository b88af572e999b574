//! Top-level unified error type for the learning memory engine.

use thiserror::Error;

use super::sub_errors::{ClusterError, ConfigError, EmbeddingError, StorageError};

/// Coarse classification of a [`LearningError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller supplied something malformed or a candidate was rejected.
    Validation,
    /// A referenced cluster does not exist.
    NotFound,
    /// Not enough data to run the requested operation.
    InsufficientData,
    /// The vector store or embedding service failed.
    Collaborator,
    /// Configuration or worker failure.
    Internal,
}

/// Top-level error for every engine service.
///
/// Sub-errors convert via `From`, so services use `?` on collaborator and
/// clustering results directly.
///
/// # Examples
///
/// ```rust
/// use learning_memory_core::error::{ErrorKind, LearningError};
///
/// let err = LearningError::NoDataForAxis {
///     axis: "strategy".into(),
///     collection: "ghap_strategy".into(),
/// };
/// assert_eq!(err.kind(), ErrorKind::InsufficientData);
/// assert!(err.is_no_data());
/// ```
#[derive(Debug, Error)]
pub enum LearningError {
    /// Axis name is not one of the fixed axes.
    #[error("Invalid axis '{value}'. Valid axes: {valid}")]
    InvalidAxis {
        /// Rejected input
        value: String,
        /// Comma-separated accepted values
        valid: String,
    },

    /// Cluster identifier does not match `{axis}_{label}`.
    #[error("Invalid cluster_id '{value}': {reason}. Expected format 'axis_label' (e.g. 'full_0')")]
    InvalidClusterId {
        /// Rejected input
        value: String,
        /// What is wrong with it
        reason: String,
    },

    /// The axis argument disagrees with the axis encoded in the cluster id.
    #[error("Axis '{axis}' does not match cluster_id '{cluster_id}'")]
    AxisMismatch {
        /// Cluster identifier
        cluster_id: String,
        /// Axis argument
        axis: String,
    },

    /// The cluster does not exist in a freshly computed clustering.
    #[error("Cluster not found: {cluster_id}")]
    ClusterNotFound {
        /// Cluster identifier
        cluster_id: String,
    },

    /// The axis collection has no retrievable embeddings.
    #[error("No embeddings found for axis '{axis}' (collection: {collection})")]
    NoDataForAxis {
        /// Axis name
        axis: String,
        /// Collection that was scrolled
        collection: String,
    },

    /// A value candidate was rejected by statistical validation.
    #[error("Value failed validation: {reason}")]
    ValidationFailed {
        /// Rejection reason from the validator
        reason: String,
    },

    /// Clustering input or parameter error.
    #[error("Clustering error: {0}")]
    Cluster(#[from] ClusterError),

    /// Vector store error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Embedding service error.
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A blocking clustering worker panicked or was cancelled.
    #[error("Clustering worker failed: {0}")]
    TaskFailed(String),
}

impl LearningError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAxis { .. }
            | Self::InvalidClusterId { .. }
            | Self::AxisMismatch { .. }
            | Self::ValidationFailed { .. }
            | Self::Cluster(_) => ErrorKind::Validation,
            Self::ClusterNotFound { .. } => ErrorKind::NotFound,
            Self::NoDataForAxis { .. } => ErrorKind::InsufficientData,
            Self::Storage(_) | Self::Embedding(_) => ErrorKind::Collaborator,
            Self::Config(_) | Self::TaskFailed(_) => ErrorKind::Internal,
        }
    }

    /// True for the per-axis "no data" condition absorbed by aggregate clustering.
    #[inline]
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoDataForAxis { .. })
    }

    /// Create an InvalidClusterId error.
    pub fn invalid_cluster_id(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidClusterId {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for engine operations.
pub type LearningResult<T> = std::result::Result<T, LearningError>;
