//! Text embedding collaborator.

use async_trait::async_trait;

use crate::error::EmbeddingResult;

/// Turns text into a fixed-dimension embedding.
///
/// ```rust,ignore
/// let vector = service.embed("retry with backoff").await?;
/// assert_eq!(vector.len(), service.dimension());
/// ```
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embed a single text.
    ///
    /// # Errors
    /// - `EmbeddingError::EmptyInput` for empty text
    /// - `EmbeddingError::GenerationFailed` if the model fails
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>>;

    /// Embed several texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Output dimension.
    fn dimension(&self) -> usize;

    /// Model identifier, for logging.
    fn model_id(&self) -> &str;
}
