//! Generative model boundary.

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;

use crate::error::Result;

/// A lazy, finite, non-restartable stream of generated text tokens.
pub type TokenStream = BoxStream<'static, Result<String>>;

/// A text-generation backend.
///
/// The retrieval engine only ever hands an implementation a prompt string
/// and consumes text back, either whole or as a token stream. Backend
/// failures surface as
/// [`RagError::ProviderUnavailable`](crate::error::RagError::ProviderUnavailable).
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Name of this backend, used in error and log context.
    fn name(&self) -> &str;

    /// Generate a streamed completion for the prompt.
    ///
    /// The stream yields tokens in order and ends when generation is done;
    /// consumers can iterate it without buffering the whole response.
    async fn generate_stream(&self, prompt: &str) -> Result<TokenStream>;

    /// Generate a complete response for the prompt.
    ///
    /// The default implementation drains
    /// [`generate_stream`](Self::generate_stream).
    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut stream = self.generate_stream(prompt).await?;
        let mut text = String::new();
        while let Some(token) = stream.next().await {
            text.push_str(&token?);
        }
        Ok(text)
    }
}
