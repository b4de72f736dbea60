//! Error types for the `ragkit` crate.

use thiserror::Error;

/// Why an embedding or generation backend was unavailable.
///
/// Carried inside [`RagError::ProviderUnavailable`] so callers can pick a
/// retry policy per cause (a timeout is usually retryable, a backend
/// rejection usually is not).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// The call exceeded its configured deadline.
    Timeout,
    /// The backend could not be reached at all.
    Connect,
    /// The backend was reached but refused or failed the request.
    Backend,
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Connect => write!(f, "connect"),
            Self::Backend => write!(f, "backend"),
        }
    }
}

/// Errors that can occur in retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// A configuration validation error. Fatal to the call that raised it.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An embedding or generation backend is unreachable, timed out, or
    /// rejected the request. The core never retries internally; callers
    /// own the retry policy.
    #[error("provider '{provider}' unavailable ({reason}): {message}")]
    ProviderUnavailable {
        /// Name of the provider that produced the error.
        provider: String,
        /// Whether the failure was a timeout, a connection failure, or a
        /// backend-side rejection.
        reason: UnavailableReason,
        /// A description of the failure.
        message: String,
    },

    /// An embedding's length disagrees with the dimensionality the index
    /// has established. Never coerced by truncation or padding.
    #[error("embedding dimension mismatch: index holds {expected}-dimensional vectors, got {actual}")]
    DimensionMismatch {
        /// The dimensionality established by the index.
        expected: usize,
        /// The dimensionality of the offending embedding.
        actual: usize,
    },

    /// A single batch call returned embeddings of inconsistent lengths.
    #[error(
        "provider returned inconsistent embedding lengths in one batch: \
         expected {expected}, got {actual} at position {position}"
    )]
    EmbeddingDimensionMismatch {
        /// Length of the first embedding in the batch.
        expected: usize,
        /// Length of the offending embedding.
        actual: usize,
        /// Zero-based position of the offending embedding in the batch.
        position: usize,
    },

    /// Chunking, embedding, or indexing failed for one document during
    /// ingestion. Other documents in the same call are unaffected.
    #[error("ingestion failed for document '{source_id}': {cause}")]
    IngestFailed {
        /// Source identifier of the document that failed.
        source_id: String,
        /// The underlying failure.
        #[source]
        cause: Box<RagError>,
    },

    /// A retrieval that requires results was issued against an index with
    /// zero entries.
    #[error("retrieval requires a non-empty index")]
    EmptyIndex,
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
