//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::{RagError, Result};

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. One provider instance produces embeddings of one fixed
/// dimensionality, and must be deterministic when its backend is: embedding
/// the same text twice returns the same vector within floating-point
/// tolerance. The default [`embed_batch`](EmbeddingProvider::embed_batch)
/// implementation calls [`embed`](EmbeddingProvider::embed) sequentially;
/// backends with native batching should override it. A batch call is
/// semantically equivalent to per-item calls.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::EmbeddingProvider;
///
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Name of this provider, used in error and log context.
    fn name(&self) -> &str;

    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs, one per input,
    /// order preserved.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}

/// Verify that every embedding in one batch has the same length.
///
/// # Errors
///
/// Returns [`RagError::EmbeddingDimensionMismatch`] naming the first
/// offending position. An empty batch passes.
pub fn check_batch(embeddings: &[Vec<f32>]) -> Result<()> {
    let Some(first) = embeddings.first() else {
        return Ok(());
    };
    let expected = first.len();
    for (position, embedding) in embeddings.iter().enumerate().skip(1) {
        if embedding.len() != expected {
            return Err(RagError::EmbeddingDimensionMismatch {
                expected,
                actual: embedding.len(),
                position,
            });
        }
    }
    Ok(())
}
