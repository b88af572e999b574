//! Sub-error types for learning-memory-core.
//!
//! Each error type covers a specific domain of failures.

use thiserror::Error;

// ============================================================================
// CLUSTER ERROR
// ============================================================================

/// Errors raised by the pure clustering layer.
///
/// All of these describe bad input or parameters; none of them are retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClusterError {
    /// The embeddings batch contained no rows.
    #[error("Embeddings array is empty; at least one embedding is required")]
    EmptyInput,

    /// Rows are ragged or zero-width, so the batch is not a 2D array.
    #[error("Embeddings must be a 2D array: {reason}")]
    NotTwoDimensional {
        /// What is wrong with the shape
        reason: String,
    },

    /// An embedding contains NaN or infinity.
    #[error("Embedding at row {row} contains non-finite values")]
    NonFiniteEmbedding {
        /// Offending row index
        row: usize,
    },

    /// Weights supplied with a batch have the wrong length.
    #[error("Weights length ({weights}) doesn't match embeddings ({embeddings})")]
    WeightsLengthMismatch {
        /// Number of weights supplied
        weights: usize,
        /// Number of embeddings supplied
        embeddings: usize,
    },

    /// Parallel input arrays to centroid computation disagree in length.
    #[error("Array lengths don't match: embeddings={embeddings}, labels={labels}, ids={ids}")]
    LengthMismatch {
        /// Number of embeddings
        embeddings: usize,
        /// Number of labels
        labels: usize,
        /// Number of identifiers
        ids: usize,
    },

    /// A weight is outside (0, 1], NaN or infinite.
    #[error("Weight at index {index} must be finite and in (0, 1], got {value}")]
    InvalidWeight {
        /// Offending index
        index: usize,
        /// Offending value
        value: f32,
    },

    /// Two vectors compared by distance have different lengths.
    #[error("Embedding dimension {actual} does not match centroid dimension {expected}")]
    DimensionMismatch {
        /// Centroid dimension
        expected: usize,
        /// Dimension of the compared embedding
        actual: usize,
    },

    /// All members of a cluster carry zero weight.
    #[error("Cluster {label} has zero total weight")]
    ZeroTotalWeight {
        /// Label of the degenerate cluster
        label: i32,
    },

    /// Invalid parameter provided.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Description of what's wrong with the parameter
        message: String,
    },
}

impl ClusterError {
    /// Create a NotTwoDimensional error.
    pub fn not_two_dimensional(reason: impl Into<String>) -> Self {
        Self::NotTwoDimensional {
            reason: reason.into(),
        }
    }

    /// Create a WeightsLengthMismatch error.
    pub fn weights_mismatch(weights: usize, embeddings: usize) -> Self {
        Self::WeightsLengthMismatch {
            weights,
            embeddings,
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }
}

// ============================================================================
// STORAGE ERROR
// ============================================================================

/// Vector store errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The named collection does not exist.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// The named collection already exists.
    #[error("Collection already exists: {0}")]
    CollectionAlreadyExists(String),

    /// A vector does not match the collection dimension.
    #[error("Vector dimension {actual} does not match collection '{collection}' dimension {expected}")]
    DimensionMismatch {
        /// Collection name
        collection: String,
        /// Dimension the collection was created with
        expected: usize,
        /// Dimension of the rejected vector
        actual: usize,
    },

    /// Payload could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Snapshot file could not be read or written.
    #[error("Snapshot error at '{path}': {message}")]
    Snapshot {
        /// Snapshot path
        path: String,
        /// Underlying failure
        message: String,
    },

    /// Backend-specific failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

// ============================================================================
// EMBEDDING ERROR
// ============================================================================

/// Embedding service errors.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Empty input text provided for embedding.
    #[error("Empty input text")]
    EmptyInput,

    /// Produced vector does not have the advertised dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Advertised dimension
        expected: usize,
        /// Actual dimension produced
        actual: usize,
    },

    /// Embedding generation failed.
    #[error("Embedding generation failed for model {model}: {reason}")]
    GenerationFailed {
        /// Model identifier
        model: String,
        /// Detailed reason for failure
        reason: String,
    },
}

// ============================================================================
// CONFIG ERROR
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config file '{path}': {message}")]
    Read {
        /// Path that was read
        path: String,
        /// IO failure
        message: String,
    },

    /// TOML could not be parsed or serialized.
    #[error("Failed to parse TOML: {0}")]
    Parse(String),

    /// A value failed validation.
    #[error("[{section}] {message}")]
    Invalid {
        /// Config section, e.g. `clustering`
        section: &'static str,
        /// What is wrong
        message: String,
    },
}
