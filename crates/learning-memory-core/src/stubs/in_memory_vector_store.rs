//! In-memory implementation of [`VectorStore`] with JSON snapshots.
//!
//! Collections live in a `DashMap`; records inside a collection are kept in a
//! `BTreeMap` so scrolling is deterministic (ascending id). Searches are full
//! scans, which is fine for tests and small operator datasets.
//!
//! Snapshots serialize every collection to a single pretty-printed JSON file
//! so the CLI can keep state between invocations.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::traits::{Payload, PayloadFilter, ScrollRequest, VectorRecord, VectorStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    vector: Vec<f32>,
    #[serde(default)]
    payload: Payload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Collection {
    dimension: usize,
    records: BTreeMap<String, StoredRecord>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    collections: BTreeMap<String, Collection>,
}

/// Thread-safe in-memory vector store.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: DashMap<String, Collection>,
}

impl InMemoryVectorStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        info!("Creating new InMemoryVectorStore");
        Self::default()
    }

    /// Names of all collections, sorted.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Dimension of a collection, if it exists.
    pub fn dimension_of(&self, collection: &str) -> Option<usize> {
        self.collections.get(collection).map(|c| c.dimension)
    }

    /// Create `name` unless it already exists. Returns true if created.
    pub fn ensure_collection(&self, name: &str, dimension: usize) -> bool {
        match self.collections.entry(name.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Collection {
                    dimension,
                    records: BTreeMap::new(),
                });
                true
            }
        }
    }

    /// Write every collection to `path` as JSON.
    ///
    /// # Errors
    /// - `StorageError::Snapshot` if serialization or the write fails
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> StorageResult<()> {
        let path = path.as_ref();
        let snapshot = Snapshot {
            collections: self
                .collections
                .iter()
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect(),
        };

        let json = serde_json::to_string_pretty(&snapshot).map_err(|e| snapshot_error(path, e))?;
        std::fs::write(path, json).map_err(|e| snapshot_error(path, e))?;

        debug!(
            path = %path.display(),
            collections = snapshot.collections.len(),
            "Saved vector store snapshot"
        );
        Ok(())
    }

    /// Load a store from a snapshot written by [`Self::save_snapshot`].
    ///
    /// # Errors
    /// - `StorageError::Snapshot` if the file is unreadable or malformed
    pub fn load_snapshot(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| snapshot_error(path, e))?;
        let snapshot: Snapshot = serde_json::from_str(&raw).map_err(|e| snapshot_error(path, e))?;

        let store = Self::default();
        for (name, collection) in snapshot.collections {
            store.collections.insert(name, collection);
        }

        info!(
            path = %path.display(),
            collections = store.collections.len(),
            "Loaded vector store snapshot"
        );
        Ok(store)
    }

    /// Load `path` if it exists, otherwise start empty.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_snapshot(path)
        } else {
            debug!(path = %path.display(), "No snapshot found; starting empty");
            Ok(Self::new())
        }
    }
}

fn snapshot_error(path: &Path, err: impl std::fmt::Display) -> StorageError {
    StorageError::Snapshot {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

fn passes_filter(filter: Option<&PayloadFilter>, payload: &Payload) -> bool {
    filter.map_or(true, |f| f.matches(payload))
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, dimension: usize) -> StorageResult<()> {
        if self.ensure_collection(name, dimension) {
            debug!(collection = name, dimension, "Created collection");
            Ok(())
        } else {
            Err(StorageError::CollectionAlreadyExists(name.to_string()))
        }
    }

    async fn upsert(&self, collection: &str, record: VectorRecord) -> StorageResult<()> {
        let mut entry = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| StorageError::CollectionNotFound(collection.to_string()))?;

        let vector = record.vector.ok_or_else(|| {
            StorageError::Backend(format!("record '{}' has no vector", record.id))
        })?;

        if vector.len() != entry.dimension {
            return Err(StorageError::DimensionMismatch {
                collection: collection.to_string(),
                expected: entry.dimension,
                actual: vector.len(),
            });
        }

        entry.records.insert(
            record.id,
            StoredRecord {
                vector,
                payload: record.payload,
            },
        );
        Ok(())
    }

    async fn scroll(
        &self,
        collection: &str,
        request: ScrollRequest,
    ) -> StorageResult<Vec<VectorRecord>> {
        let entry = self
            .collections
            .get(collection)
            .ok_or_else(|| StorageError::CollectionNotFound(collection.to_string()))?;

        Ok(entry
            .records
            .iter()
            .filter(|(_, r)| passes_filter(request.filter.as_ref(), &r.payload))
            .take(request.limit)
            .map(|(id, r)| VectorRecord {
                id: id.clone(),
                vector: request.with_vectors.then(|| r.vector.clone()),
                payload: r.payload.clone(),
            })
            .collect())
    }

    async fn get(
        &self,
        collection: &str,
        id: &str,
        with_vector: bool,
    ) -> StorageResult<Option<VectorRecord>> {
        let entry = self
            .collections
            .get(collection)
            .ok_or_else(|| StorageError::CollectionNotFound(collection.to_string()))?;

        Ok(entry.records.get(id).map(|r| VectorRecord {
            id: id.to_string(),
            vector: with_vector.then(|| r.vector.clone()),
            payload: r.payload.clone(),
        }))
    }

    async fn count(&self, collection: &str, filter: Option<&PayloadFilter>) -> StorageResult<usize> {
        let entry = self
            .collections
            .get(collection)
            .ok_or_else(|| StorageError::CollectionNotFound(collection.to_string()))?;

        Ok(entry
            .records
            .values()
            .filter(|r| passes_filter(filter, &r.payload))
            .count())
    }
}
