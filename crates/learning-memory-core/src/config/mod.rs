//! Engine configuration.
//!
//! # Loading Configuration
//!
//! ```rust,ignore
//! use learning_memory_core::config::LearningConfig;
//!
//! let config = LearningConfig::from_file("learning.toml")?
//!     .with_env_overrides();
//! config.validate()?;
//! ```
//!
//! # TOML Structure
//!
//! ```toml
//! [clustering]
//! min_cluster_size = 5
//! min_samples = 3
//! cluster_selection_method = "eom"
//! metric = "cosine"
//!
//! [retrieval]
//! scroll_limit = 10000
//! values_scroll_limit = 1000
//!
//! [validation]
//! std_multiplier = 0.5
//!
//! [collections]
//! full = "ghap_full"
//! strategy = "ghap_strategy"
//! surprise = "ghap_surprise"
//! root_cause = "ghap_root_cause"
//! values = "values"
//!
//! [embedding]
//! dimension = 768
//! model_id = "nomic-embed-text-v1.5"
//! ```
//!
//! Every section and field is optional; missing values take the defaults in
//! [`constants`]. Invalid values are rejected by [`LearningConfig::validate`],
//! never silently corrected.

pub mod constants;


pub use constants::*;

use std::env;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::clustering::{ClusterSelectionMethod, DistanceMetric, HDBSCANParams};
use crate::error::ConfigError;
use crate::types::AxisCollections;

// ============================================================================
// SECTIONS
// ============================================================================

/// `[clustering]`: HDBSCAN parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Minimum points per cluster (>= 2).
    pub min_cluster_size: usize,
    /// Core-distance neighborhood size (1..=min_cluster_size).
    pub min_samples: usize,
    /// `eom` or `leaf`.
    pub cluster_selection_method: ClusterSelectionMethod,
    /// `cosine` or `euclidean`.
    pub metric: DistanceMetric,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            min_samples: DEFAULT_MIN_SAMPLES,
            cluster_selection_method: ClusterSelectionMethod::EOM,
            metric: DistanceMetric::Cosine,
        }
    }
}

impl ClusteringConfig {
    /// HDBSCAN parameters for this section.
    pub fn to_params(&self) -> HDBSCANParams {
        HDBSCANParams::default()
            .with_min_cluster_size(self.min_cluster_size)
            .with_min_samples(self.min_samples)
            .with_selection_method(self.cluster_selection_method)
            .with_metric(self.metric)
    }

    fn validate(&self) -> Result<(), String> {
        self.to_params().validate().map_err(|e| e.to_string())
    }
}

/// `[retrieval]`: vector store scroll bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Records scrolled per axis clustering call.
    pub scroll_limit: usize,
    /// Records scrolled by `list_values`.
    pub values_scroll_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            scroll_limit: DEFAULT_SCROLL_LIMIT,
            values_scroll_limit: DEFAULT_VALUES_SCROLL_LIMIT,
        }
    }
}

impl RetrievalConfig {
    fn validate(&self) -> Result<(), String> {
        if self.scroll_limit == 0 {
            return Err("scroll_limit must be > 0".to_string());
        }
        if self.values_scroll_limit == 0 {
            return Err("values_scroll_limit must be > 0".to_string());
        }
        Ok(())
    }
}

/// `[validation]`: value candidate threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// `k` in `threshold = mean + k * std`.
    pub std_multiplier: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            std_multiplier: DEFAULT_STD_MULTIPLIER,
        }
    }
}

impl ValidationConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.std_multiplier.is_finite() || self.std_multiplier < 0.0 {
            return Err(format!(
                "std_multiplier must be finite and >= 0, got {}",
                self.std_multiplier
            ));
        }
        Ok(())
    }
}

/// `[embedding]`: embedding model settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Output dimension of the embedding model.
    pub dimension: usize,
    /// Model identifier.
    pub model_id: String,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_EMBEDDING_DIMENSION,
            model_id: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }
}

impl EmbeddingSettings {
    fn validate(&self) -> Result<(), String> {
        if self.dimension == 0 {
            return Err("dimension must be > 0".to_string());
        }
        if self.model_id.trim().is_empty() {
            return Err("model_id must not be empty".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// ROOT CONFIG
// ============================================================================

/// Root configuration for the learning memory engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningConfig {
    /// HDBSCAN parameters.
    #[serde(default)]
    pub clustering: ClusteringConfig,

    /// Scroll bounds.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Value validation threshold.
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Axis → collection table and values collection.
    #[serde(default)]
    pub collections: AxisCollections,

    /// Embedding model settings.
    #[serde(default)]
    pub embedding: EmbeddingSettings,
}

impl LearningConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// - `ConfigError::Read` if the file cannot be read
    /// - `ConfigError::Parse` if TOML parsing fails
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(format!("'{}': {}", path.display(), e)))
    }

    /// Create configuration from a TOML string.
    ///
    /// # Errors
    /// - `ConfigError::Parse` if TOML parsing fails
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to a TOML string.
    ///
    /// # Errors
    /// - `ConfigError::Parse` if serialization fails
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize to TOML: {}", e)))
    }

    /// Validate all sections, returning the first error found.
    ///
    /// # Errors
    /// - `ConfigError::Invalid` naming the section and the offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.clustering.validate().map_err(invalid("clustering"))?;
        self.retrieval.validate().map_err(invalid("retrieval"))?;
        self.validation.validate().map_err(invalid("validation"))?;
        self.collections.validate().map_err(invalid("collections"))?;
        self.embedding.validate().map_err(invalid("embedding"))?;

        Ok(())
    }

    /// Apply environment variable overrides. Prefix: `LEARNING_`
    ///
    /// Unparseable values are ignored; run [`Self::validate`] afterwards.
    ///
    /// | Variable | Config Path | Type |
    /// |----------|-------------|------|
    /// | `LEARNING_MIN_CLUSTER_SIZE` | `clustering.min_cluster_size` | usize |
    /// | `LEARNING_MIN_SAMPLES` | `clustering.min_samples` | usize |
    /// | `LEARNING_CLUSTER_SELECTION_METHOD` | `clustering.cluster_selection_method` | eom/leaf |
    /// | `LEARNING_SCROLL_LIMIT` | `retrieval.scroll_limit` | usize |
    /// | `LEARNING_VALUES_SCROLL_LIMIT` | `retrieval.values_scroll_limit` | usize |
    /// | `LEARNING_STD_MULTIPLIER` | `validation.std_multiplier` | f64 |
    /// | `LEARNING_EMBEDDING_DIMENSION` | `embedding.dimension` | usize |
    /// | `LEARNING_EMBEDDING_MODEL` | `embedding.model_id` | String |
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(n) = env_parse("MIN_CLUSTER_SIZE") {
            self.clustering.min_cluster_size = n;
        }
        if let Some(n) = env_parse("MIN_SAMPLES") {
            self.clustering.min_samples = n;
        }
        if let Some(method) = env_parse("CLUSTER_SELECTION_METHOD") {
            self.clustering.cluster_selection_method = method;
        }

        if let Some(n) = env_parse("SCROLL_LIMIT") {
            self.retrieval.scroll_limit = n;
        }
        if let Some(n) = env_parse("VALUES_SCROLL_LIMIT") {
            self.retrieval.values_scroll_limit = n;
        }

        if let Some(k) = env_parse("STD_MULTIPLIER") {
            self.validation.std_multiplier = k;
        }

        if let Some(n) = env_parse("EMBEDDING_DIMENSION") {
            self.embedding.dimension = n;
        }
        if let Ok(val) = env::var(format!("{}EMBEDDING_MODEL", ENV_PREFIX)) {
            self.embedding.model_id = val;
        }

        self
    }
}

fn invalid(section: &'static str) -> impl Fn(String) -> ConfigError {
    move |message| ConfigError::Invalid { section, message }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(format!("{}{}", ENV_PREFIX, name))
        .ok()
        .and_then(|val| val.trim().parse().ok())
}
