//! Deterministic embedding service for tests and offline use.
//!
//! Each text is hashed with SHA-256; the first eight digest bytes seed a
//! ChaCha8 generator that draws a standard-normal vector, which is then
//! normalized to unit length. Same text, same vector, on every platform.
//!
//! Specific texts can be pinned to hand-chosen vectors so tests can place
//! candidates exactly where they want relative to a cluster.

use async_trait::async_trait;
use dashmap::DashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use sha2::{Digest, Sha256};

use crate::error::{EmbeddingError, EmbeddingResult};
use crate::traits::EmbeddingService;

/// Model identifier reported by [`StubEmbeddingService`].
pub const STUB_MODEL_ID: &str = "stub-sha256-gaussian-v1";

/// Hash-seeded Gaussian embedding generator.
///
/// # Example
///
/// ```
/// use learning_memory_core::stubs::StubEmbeddingService;
/// use learning_memory_core::traits::EmbeddingService;
///
/// # tokio_test_block_on(async {
/// let service = StubEmbeddingService::new(16);
/// let a = service.embed("hello").await.unwrap();
/// let b = service.embed("hello").await.unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 16);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug)]
pub struct StubEmbeddingService {
    dimension: usize,
    pinned: DashMap<String, Vec<f32>>,
}

impl StubEmbeddingService {
    /// Create a service producing vectors of `dimension`.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            pinned: DashMap::new(),
        }
    }

    /// Pin `text` to `vector` (builder form).
    #[must_use]
    pub fn with_fixed(self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.pin(text, vector);
        self
    }

    /// Pin `text` to `vector`.
    pub fn pin(&self, text: impl Into<String>, vector: Vec<f32>) {
        self.pinned.insert(text.into(), vector);
    }

    fn generate(&self, text: &str) -> Vec<f32> {
        let digest = Sha256::digest(text.as_bytes());
        let mut seed_bytes = [0u8; 8];
        seed_bytes.copy_from_slice(&digest[..8]);
        let mut rng = ChaCha8Rng::seed_from_u64(u64::from_le_bytes(seed_bytes));

        let mut vector: Vec<f32> = (0..self.dimension)
            .map(|_| rng.sample::<f32, _>(StandardNormal))
            .collect();

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in vector.iter_mut() {
                *x /= norm;
            }
        }
        vector
    }
}

impl Default for StubEmbeddingService {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_EMBEDDING_DIMENSION)
    }
}

#[async_trait]
impl EmbeddingService for StubEmbeddingService {
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        if let Some(pinned) = self.pinned.get(text) {
            if pinned.len() != self.dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimension,
                    actual: pinned.len(),
                });
            }
            return Ok(pinned.clone());
        }

        Ok(self.generate(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        STUB_MODEL_ID
    }
}
