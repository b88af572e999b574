//! Error types for learning-memory-core.
//!
//! This module defines the error taxonomy used throughout the engine:
//!
//! - [`LearningError`]: Top-level unified error returned by the engine services
//! - Sub-error types: [`ClusterError`], [`StorageError`], [`EmbeddingError`],
//!   [`ConfigError`]
//!
//! Every [`LearningError`] is classified by [`LearningError::kind`] into one of
//! the [`ErrorKind`] buckets so callers can react without matching on every
//! variant:
//!
//! - `Validation`: malformed axis, malformed cluster id, mismatched lengths,
//!   invalid parameters, rejected value candidates
//! - `NotFound`: a referenced cluster does not exist in a fresh clustering
//! - `InsufficientData`: an axis has no retrievable embeddings
//! - `Collaborator`: the vector store or embedding service failed
//! - `Internal`: configuration or worker failures
//!
//! Library code never panics on bad input; it returns `Result` and propagates
//! with `?`.
//!
//! # Examples
//!
//! ```rust
//! use learning_memory_core::error::{ClusterError, ErrorKind, LearningError};
//!
//! let err = LearningError::from(ClusterError::EmptyInput);
//! assert_eq!(err.kind(), ErrorKind::Validation);
//! assert!(err.to_string().contains("empty"));
//! ```

mod sub_errors;
mod unified;


pub use sub_errors::{ClusterError, ConfigError, EmbeddingError, StorageError};
pub use unified::{ErrorKind, LearningError, LearningResult};

/// Result alias for vector store operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Result alias for embedding operations.
pub type EmbeddingResult<T> = std::result::Result<T, EmbeddingError>;
