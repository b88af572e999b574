//! In-process collaborator implementations.
//!
//! - [`InMemoryVectorStore`]: `DashMap`-backed vector store with JSON snapshots
//! - [`StubEmbeddingService`]: deterministic hash-seeded embeddings
//!
//! Both are complete implementations of their traits; they back the unit and
//! integration tests and the CLI's local snapshot mode.

mod in_memory_vector_store;
mod stub_embedding_service;

pub use in_memory_vector_store::InMemoryVectorStore;
pub use stub_embedding_service::{StubEmbeddingService, STUB_MODEL_ID};
