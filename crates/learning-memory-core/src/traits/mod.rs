//! Collaborator contracts consumed by the engine.
//!
//! # Traits
//!
//! - [`VectorStore`]: named collections of vectors with JSON payloads
//! - [`EmbeddingService`]: text to fixed-dimension vector

mod embedding_service;
mod vector_store;

pub use embedding_service::EmbeddingService;
pub use vector_store::{Payload, PayloadFilter, ScrollRequest, VectorRecord, VectorStore};
