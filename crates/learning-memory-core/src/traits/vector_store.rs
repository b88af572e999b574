//! Vector storage collaborator.
//!
//! Implementations hold named collections of `(id, vector, payload)` records.
//! The engine only scrolls, fetches by id, counts and upserts; it never
//! deletes.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::StorageResult;

/// Arbitrary JSON metadata attached to a record.
pub type Payload = Map<String, JsonValue>;

/// One stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Record identifier, unique within a collection.
    pub id: String,
    /// Embedding. `None` when fetched without vectors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
    /// Metadata payload.
    #[serde(default)]
    pub payload: Payload,
}

impl VectorRecord {
    /// Create a record carrying a vector.
    pub fn new(id: impl Into<String>, vector: Vec<f32>, payload: Payload) -> Self {
        Self {
            id: id.into(),
            vector: Some(vector),
            payload,
        }
    }
}

/// Conjunction of payload equality conditions.
///
/// ```
/// use learning_memory_core::traits::PayloadFilter;
/// use serde_json::json;
///
/// let filter = PayloadFilter::new().with_equals("axis", json!("full"));
/// let payload = json!({"axis": "full", "text": "x"});
/// assert!(filter.matches(payload.as_object().unwrap()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadFilter {
    /// Key → required value.
    pub equals: BTreeMap<String, JsonValue>,
}

impl PayloadFilter {
    /// Empty filter matching everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `payload[key] == value`.
    #[must_use]
    pub fn with_equals(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.equals.insert(key.into(), value);
        self
    }

    /// True if every condition holds for `payload`.
    pub fn matches(&self, payload: &Payload) -> bool {
        self.equals
            .iter()
            .all(|(key, expected)| payload.get(key) == Some(expected))
    }

    /// True if there are no conditions.
    pub fn is_empty(&self) -> bool {
        self.equals.is_empty()
    }
}

/// Parameters for listing records in a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollRequest {
    /// Maximum number of records returned.
    pub limit: usize,
    /// Optional payload filter.
    pub filter: Option<PayloadFilter>,
    /// Whether to include vectors.
    pub with_vectors: bool,
}

impl ScrollRequest {
    /// Scroll up to `limit` records with vectors and no filter.
    pub fn with_vectors(limit: usize) -> Self {
        Self {
            limit,
            filter: None,
            with_vectors: true,
        }
    }

    /// Restrict to records matching `filter`.
    #[must_use]
    pub fn filtered(mut self, filter: PayloadFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Asynchronous vector storage.
///
/// All methods fail with `StorageError::CollectionNotFound` when the named
/// collection does not exist, except `create_collection`.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a collection of vectors of `dimension`.
    ///
    /// # Errors
    /// - `StorageError::CollectionAlreadyExists` if the name is taken
    async fn create_collection(&self, name: &str, dimension: usize) -> StorageResult<()>;

    /// Insert or replace a record.
    ///
    /// # Errors
    /// - `StorageError::DimensionMismatch` if the vector has the wrong dimension
    async fn upsert(&self, collection: &str, record: VectorRecord) -> StorageResult<()>;

    /// List up to `request.limit` records.
    async fn scroll(&self, collection: &str, request: ScrollRequest)
        -> StorageResult<Vec<VectorRecord>>;

    /// Fetch one record by id. `Ok(None)` if the id is unknown.
    async fn get(
        &self,
        collection: &str,
        id: &str,
        with_vector: bool,
    ) -> StorageResult<Option<VectorRecord>>;

    /// Count records, optionally filtered.
    async fn count(&self, collection: &str, filter: Option<&PayloadFilter>) -> StorageResult<usize>;
}
