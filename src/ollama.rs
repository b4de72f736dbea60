//! Ollama embedding and generation backends.
//!
//! This module is only available when the `ollama` feature is enabled.
//! Both clients talk to a local Ollama server over its HTTP API:
//! [`OllamaEmbeddingProvider`] posts `/api/embeddings` and
//! [`OllamaGenerator`] posts `/api/generate`, exposing the streamed NDJSON
//! response as a [`TokenStream`].

use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result, UnavailableReason};
use crate::model::{GenerativeModel, TokenStream};

/// The default Ollama server address.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

/// The default model for both embeddings and generation.
const DEFAULT_MODEL: &str = "llama3";

/// Embedding dimensionality of the default model.
const DEFAULT_DIMENSIONS: usize = 4096;

const PROVIDER: &str = "Ollama";

fn unavailable(error: reqwest::Error) -> RagError {
    let reason = if error.is_timeout() {
        UnavailableReason::Timeout
    } else if error.is_connect() {
        UnavailableReason::Connect
    } else {
        UnavailableReason::Backend
    };
    RagError::ProviderUnavailable {
        provider: PROVIDER.into(),
        reason,
        message: error.to_string(),
    }
}

fn backend_error(message: impl Into<String>) -> RagError {
    RagError::ProviderUnavailable {
        provider: PROVIDER.into(),
        reason: UnavailableReason::Backend,
        message: message.into(),
    }
}

/// An [`EmbeddingProvider`] backed by a local Ollama server.
///
/// The embeddings endpoint takes one prompt per request, so batches are
/// embedded item by item via the trait's default
/// [`embed_batch`](EmbeddingProvider::embed_batch).
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::ollama::OllamaEmbeddingProvider;
///
/// let provider = OllamaEmbeddingProvider::new().with_model("llama3", 4096);
/// let embedding = provider.embed("hello world").await?;
/// ```
#[derive(Debug)]
pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
    timeout: Option<Duration>,
}

impl Default for OllamaEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaEmbeddingProvider {
    /// Create a provider for the default local server and model.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
            timeout: None,
        }
    }

    /// Point the provider at a different server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a different model, declaring its embedding dimensionality.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    /// Bound each request by a deadline. Overruns surface as
    /// [`RagError::ProviderUnavailable`] with
    /// [`UnavailableReason::Timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// ── Ollama API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, model = %self.model, text_len = text.len(), "embedding text");

        let mut request = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&EmbeddingRequest { model: &self.model, prompt: text });
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "embedding request failed");
            unavailable(e)
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(provider = PROVIDER, %status, "embedding API error");
            return Err(backend_error(format!("API returned {status}: {body}")));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse embedding response");
            backend_error(format!("failed to parse response: {e}"))
        })?;

        Ok(body.embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// A [`GenerativeModel`] backed by a local Ollama server.
///
/// Streamed responses arrive as newline-delimited JSON; each line's
/// `response` field is yielded as one token.
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Option<Duration>,
}

impl Default for OllamaGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaGenerator {
    /// Create a generator for the default local server and model.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            timeout: None,
        }
    }

    /// Point the generator at a different server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a different model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Bound each request by a deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn send_generate(&self, prompt: &str, stream: bool) -> Result<reqwest::Response> {
        let mut request = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&GenerateRequest { model: &self.model, prompt, stream });
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "generate request failed");
            unavailable(e)
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(provider = PROVIDER, %status, "generate API error");
            return Err(backend_error(format!("API returned {status}: {body}")));
        }
        Ok(response)
    }
}

#[async_trait]
impl GenerativeModel for OllamaGenerator {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate_stream(&self, prompt: &str) -> Result<TokenStream> {
        debug!(provider = PROVIDER, model = %self.model, prompt_len = prompt.len(), "streaming generation");

        let response = self.send_generate(prompt, true).await?;
        let mut bytes = response.bytes_stream();

        let stream = try_stream! {
            let mut buffer: Vec<u8> = Vec::new();
            let mut done = false;
            while !done {
                let chunk = match bytes.next().await {
                    Some(chunk) => chunk.map_err(unavailable)?,
                    None => break,
                };
                buffer.extend_from_slice(&chunk);

                while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=pos).collect();
                    let line = String::from_utf8_lossy(&line);
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let piece: GenerateChunk = serde_json::from_str(line)
                        .map_err(|e| backend_error(format!("malformed stream line: {e}")))?;
                    if !piece.response.is_empty() {
                        yield piece.response;
                    }
                    if piece.done {
                        done = true;
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(provider = PROVIDER, model = %self.model, prompt_len = prompt.len(), "generation");

        let response = self.send_generate(prompt, false).await?;
        let body: GenerateChunk = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse generate response");
            backend_error(format!("failed to parse response: {e}"))
        })?;
        Ok(body.response)
    }
}
