//! Learning Memory Core Library
//!
//! Clusters an agent's recorded experiences along several embedding axes and
//! validates proposed values (short lessons) against those clusters before
//! storing them.
//!
//! # Architecture
//!
//! This crate defines:
//! - HDBSCAN clustering and weighted centroids (`clustering`)
//! - Per-axis experience clustering over a vector store (`ExperienceClusterer`)
//! - Statistical value validation and storage (`ValueStore`)
//! - Collaborator traits (`VectorStore`, `EmbeddingService`) with in-memory stubs
//! - Error types, result aliases and configuration
//!
//! # Example
//!
//! ```
//! use learning_memory_core::types::{Axis, ClusterId};
//! use learning_memory_core::clustering::Clusterer;
//!
//! let id: ClusterId = "strategy_2".parse().unwrap();
//! assert_eq!(id.axis, Axis::Strategy);
//!
//! let clusterer = Clusterer::default();
//! assert_eq!(clusterer.params().min_cluster_size, 5);
//! ```

pub mod clustering;
pub mod config;
pub mod error;
pub mod stubs;
pub mod traits;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use clustering::{ClusterInfo, ClusterResult, Clusterer, ExperienceClusterer, NamedCluster};
pub use config::LearningConfig;
pub use error::{ErrorKind, LearningError, LearningResult};
pub use types::{Axis, ClusterId, ConfidenceTier};
pub use values::{ValidationResult, Value, ValueStore};
