//! Default values for every tunable in [`LearningConfig`](super::LearningConfig).

/// Minimum points for HDBSCAN to form a cluster.
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 5;

/// HDBSCAN neighborhood size for core distances.
pub const DEFAULT_MIN_SAMPLES: usize = 3;

/// Maximum records scrolled from one axis collection per clustering call.
///
/// Reaching it logs a truncation warning.
pub const DEFAULT_SCROLL_LIMIT: usize = 10_000;

/// Maximum records scrolled from the values collection by `list_values`.
pub const DEFAULT_VALUES_SCROLL_LIMIT: usize = 1_000;

/// Multiplier `k` in the validation threshold `mean + k * std`.
pub const DEFAULT_STD_MULTIPLIER: f64 = 0.5;

/// Embedding dimension of the default model.
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 768;

/// Model identifier recorded when none is configured.
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text-v1.5";

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "LEARNING_";
