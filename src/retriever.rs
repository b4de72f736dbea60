//! Retrieval orchestrator.
//!
//! The [`Retriever`] binds a [`Chunker`], an [`EmbeddingProvider`], and a
//! [`VectorIndex`] into the two-phase workflow: ingestion (chunk → embed →
//! index) and retrieval (embed → search). Construct one via
//! [`Retriever::builder()`].
//!
//! # Example
//!
//! ```rust,ignore
//! use ragkit::{Retriever, RetrieverConfig, Query};
//!
//! let retriever = Retriever::builder()
//!     .config(RetrieverConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .build()?;
//!
//! let report = retriever.ingest(&documents).await;
//! let results = retriever.retrieve(&Query::new("search query", 5)).await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::chunking::{Chunker, RecursiveChunker};
use crate::config::RetrieverConfig;
use crate::document::{Document, Query, ScoredFragment};
use crate::embedding::{EmbeddingProvider, check_batch};
use crate::error::{RagError, Result, UnavailableReason};
use crate::index::{InMemoryIndex, VectorIndex};

/// One document that could not be ingested, with the failure that stopped it.
#[derive(Debug)]
pub struct IngestFailure {
    /// Source identifier of the document that failed.
    pub source_id: String,
    /// The underlying failure.
    pub cause: RagError,
}

impl From<IngestFailure> for RagError {
    fn from(failure: IngestFailure) -> Self {
        RagError::IngestFailed { source_id: failure.source_id, cause: Box::new(failure.cause) }
    }
}

/// The outcome of one [`Retriever::ingest`] call.
///
/// Ingestion is per-document atomic: a failing document is recorded here
/// and the remaining documents are still processed.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Total fragments indexed across all successful documents.
    pub fragments_indexed: usize,
    /// Per-document failures, in input order.
    pub failures: Vec<IngestFailure>,
}

enum DocOutcome {
    Indexed(usize),
    Cancelled,
}

/// The retrieval orchestrator.
#[derive(Debug)]
pub struct Retriever {
    config: RetrieverConfig,
    chunker: Arc<dyn Chunker>,
    provider: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl Retriever {
    /// Create a new [`RetrieverBuilder`].
    pub fn builder() -> RetrieverBuilder {
        RetrieverBuilder::default()
    }

    /// Return a reference to the retriever configuration.
    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Return a reference to the vector index.
    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// Whether at least one entry has been ingested.
    ///
    /// Retrieval is permitted either way; an untouched index simply
    /// returns empty results.
    pub async fn is_ready(&self) -> bool {
        !self.index.is_empty().await
    }

    /// Ingest documents: chunk, embed each document as one batch, and
    /// insert the batch atomically into the index.
    ///
    /// A document whose chunking, embedding, or insertion fails is recorded
    /// in the report's failures and does not abort the remaining documents.
    pub async fn ingest(&self, documents: &[Document]) -> IngestReport {
        self.ingest_with_cancellation(documents, &CancellationToken::new()).await
    }

    /// Like [`ingest`](Self::ingest), stopping cooperatively when `cancel`
    /// fires. Cancellation never leaves a partial document in the index:
    /// the in-flight document's batch is discarded, and already-inserted
    /// documents stay.
    pub async fn ingest_with_cancellation(
        &self,
        documents: &[Document],
        cancel: &CancellationToken,
    ) -> IngestReport {
        let mut report = IngestReport::default();

        for document in documents {
            if cancel.is_cancelled() {
                info!(source_id = %document.source_id, "ingestion cancelled");
                break;
            }
            match self.ingest_document(document, cancel).await {
                Ok(DocOutcome::Indexed(count)) => report.fragments_indexed += count,
                Ok(DocOutcome::Cancelled) => {
                    info!(source_id = %document.source_id, "ingestion cancelled");
                    break;
                }
                Err(cause) => {
                    error!(source_id = %document.source_id, error = %cause, "document ingestion failed");
                    report
                        .failures
                        .push(IngestFailure { source_id: document.source_id.clone(), cause });
                }
            }
        }

        info!(
            fragments_indexed = report.fragments_indexed,
            failed_documents = report.failures.len(),
            "ingestion completed"
        );
        report
    }

    async fn ingest_document(
        &self,
        document: &Document,
        cancel: &CancellationToken,
    ) -> Result<DocOutcome> {
        let fragments = self.chunker.split(document);
        if fragments.is_empty() {
            info!(source_id = %document.source_id, fragment_count = 0, "ingested document (empty)");
            return Ok(DocOutcome::Indexed(0));
        }

        // The embedding call is a suspension point; no index lock is held
        // across it.
        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        let embeddings = tokio::select! {
            _ = cancel.cancelled() => return Ok(DocOutcome::Cancelled),
            result = self.bounded(self.provider.embed_batch(&texts)) => result?,
        };

        check_batch(&embeddings)?;

        if cancel.is_cancelled() {
            return Ok(DocOutcome::Cancelled);
        }

        let count = fragments.len();
        let entries: Vec<_> = fragments.into_iter().zip(embeddings).collect();
        self.index.insert_batch(entries).await?;

        info!(source_id = %document.source_id, fragment_count = count, "ingested document");
        Ok(DocOutcome::Indexed(count))
    }

    /// Embed the query text and return the top `query.k` fragments.
    ///
    /// An empty index is not an error: the result is simply empty.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if `query.k == 0`, and
    /// propagates provider and index failures.
    pub async fn retrieve(&self, query: &Query) -> Result<Vec<ScoredFragment>> {
        self.retrieve_with_cancellation(query, &CancellationToken::new()).await
    }

    /// Like [`retrieve`](Self::retrieve), returning early with no results
    /// when `cancel` fires.
    pub async fn retrieve_with_cancellation(
        &self,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<Vec<ScoredFragment>> {
        if query.k == 0 {
            return Err(RagError::InvalidConfig("query k must be at least 1".into()));
        }
        if cancel.is_cancelled() {
            return Ok(Vec::new());
        }

        let embedding = tokio::select! {
            _ = cancel.cancelled() => return Ok(Vec::new()),
            result = self.bounded(self.provider.embed(&query.text)) => result?,
        };

        let results = self.index.search(&embedding, query.k, query.filter.as_ref()).await?;
        info!(result_count = results.len(), k = query.k, "retrieval completed");
        Ok(results)
    }

    /// Like [`retrieve`](Self::retrieve), but for callers whose contract
    /// requires a non-empty result.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyIndex`] when the index has zero entries.
    pub async fn retrieve_non_empty(&self, query: &Query) -> Result<Vec<ScoredFragment>> {
        if self.index.is_empty().await {
            error!("retrieval required results but the index is empty");
            return Err(RagError::EmptyIndex);
        }
        self.retrieve(query).await
    }

    /// Run a provider call under the configured embedding deadline.
    ///
    /// A deadline overrun surfaces as [`RagError::ProviderUnavailable`]
    /// with [`UnavailableReason::Timeout`]; the call never hangs its
    /// caller indefinitely.
    async fn bounded<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        match self.config.embed_timeout {
            Some(deadline) => match tokio::time::timeout(deadline, call).await {
                Ok(result) => result,
                Err(_) => {
                    error!(provider = self.provider.name(), ?deadline, "embedding call timed out");
                    Err(RagError::ProviderUnavailable {
                        provider: self.provider.name().to_string(),
                        reason: UnavailableReason::Timeout,
                        message: format!("embedding call exceeded {deadline:?}"),
                    })
                }
            },
            None => call.await,
        }
    }
}

/// Builder for constructing a [`Retriever`].
///
/// Only the embedding provider is required. The chunker defaults to a
/// [`RecursiveChunker`] built from the configuration, and the index to an
/// [`InMemoryIndex`] with the configured metric.
#[derive(Default)]
pub struct RetrieverBuilder {
    config: Option<RetrieverConfig>,
    chunker: Option<Arc<dyn Chunker>>,
    provider: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
}

impl RetrieverBuilder {
    /// Set the retriever configuration.
    pub fn config(mut self, config: RetrieverConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the vector index backend.
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Build the [`Retriever`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if no embedding provider was
    /// set, if the configuration fails validation, or if a supplied index
    /// scores with a different metric than the configuration declares.
    pub fn build(self) -> Result<Retriever> {
        let config = match self.config {
            Some(config) => {
                // Re-validate: the struct is constructible without the builder.
                RetrieverConfig::builder()
                    .chunk_size(config.chunk_size)
                    .overlap(config.overlap)
                    .top_k(config.top_k)
                    .metric(config.metric)
                    .embed_timeout(config.embed_timeout)
                    .build()?
            }
            None => RetrieverConfig::default(),
        };
        let provider = self
            .provider
            .ok_or_else(|| RagError::InvalidConfig("embedding_provider is required".into()))?;
        let chunker: Arc<dyn Chunker> = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(RecursiveChunker::new(config.chunk_size, config.overlap)?),
        };
        let index: Arc<dyn VectorIndex> = match self.index {
            Some(index) => {
                if index.metric() != config.metric {
                    return Err(RagError::InvalidConfig(format!(
                        "index scores with {:?} but the configuration declares {:?}",
                        index.metric(),
                        config.metric
                    )));
                }
                index
            }
            None => Arc::new(InMemoryIndex::with_metric(config.metric)),
        };

        Ok(Retriever { config, chunker, provider, index })
    }
}
