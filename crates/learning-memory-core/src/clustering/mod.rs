//! Density clustering of experience embeddings.
//!
//! # Layers
//!
//! - [`HdbscanClusterer`]: HDBSCAN over dense vectors (core distances,
//!   mutual reachability MST, condensed tree, EOM or leaf selection)
//! - [`Clusterer`]: input validation plus weighted centroid computation
//! - [`ExperienceClusterer`]: binds a [`Clusterer`] to a vector store and
//!   clusters one axis collection at a time
//!
//! # Example
//!
//! ```
//! use learning_memory_core::clustering::{
//!     cosine_distance, ClusterSelectionMethod, HDBSCANParams, HdbscanClusterer, NOISE_LABEL,
//! };
//!
//! let params = HDBSCANParams::default()
//!     .with_min_cluster_size(2)
//!     .with_min_samples(1)
//!     .with_selection_method(ClusterSelectionMethod::EOM);
//!
//! let points = vec![
//!     vec![1.0, 0.0],
//!     vec![0.99, 0.01],
//!     vec![0.0, 1.0],
//!     vec![0.01, 0.99],
//! ];
//! let fitted = HdbscanClusterer::new(params).fit(&points).unwrap();
//!
//! assert_eq!(fitted.n_clusters, 2);
//! assert!(fitted.labels.iter().all(|&l| l != NOISE_LABEL));
//! assert!(cosine_distance(&points[0], &points[1]) < 0.01);
//! ```

mod clusterer;
mod distance;
mod experience;
mod hdbscan;
mod named;

pub use clusterer::{ClusterInfo, ClusterResult, Clusterer};
pub use distance::{
    checked_cosine_distance, cosine_distance, cosine_similarity, euclidean_distance, DistanceMetric,
};
pub use experience::ExperienceClusterer;
pub use hdbscan::{
    ClusterSelectionMethod, HDBSCANParams, HdbscanClusterer, HdbscanLabels, NOISE_LABEL,
};
pub use named::NamedCluster;
