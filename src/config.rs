//! Configuration for the retriever.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};
use crate::index::Metric;

/// Configuration parameters for a [`Retriever`](crate::retriever::Retriever).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrieverConfig {
    /// Maximum fragment size in bytes.
    pub chunk_size: usize,
    /// Overlap between consecutive fragments in bytes.
    pub overlap: usize,
    /// Default number of results for queries built by the crate's own
    /// conveniences; explicit [`Query`](crate::document::Query) values win.
    pub top_k: usize,
    /// Distance metric the index is expected to score with.
    pub metric: Metric,
    /// Deadline for each embedding call. `None` leaves the call unbounded.
    pub embed_timeout: Option<Duration>,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            overlap: 100,
            top_k: 10,
            metric: Metric::Cosine,
            embed_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl RetrieverConfig {
    /// Create a new builder for constructing a [`RetrieverConfig`].
    pub fn builder() -> RetrieverConfigBuilder {
        RetrieverConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RetrieverConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetrieverConfigBuilder {
    config: RetrieverConfig,
}

impl RetrieverConfigBuilder {
    /// Set the maximum fragment size in bytes.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive fragments in bytes.
    pub fn overlap(mut self, overlap: usize) -> Self {
        self.config.overlap = overlap;
        self
    }

    /// Set the default number of results returned by queries.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the distance metric.
    pub fn metric(mut self, metric: Metric) -> Self {
        self.config.metric = metric;
        self
    }

    /// Bound every embedding call by the given deadline.
    pub fn embed_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.embed_timeout = timeout;
        self
    }

    /// Build the [`RetrieverConfig`], validating that parameters are
    /// consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if:
    /// - `chunk_size == 0`
    /// - `overlap >= chunk_size`
    /// - `top_k == 0`
    pub fn build(self) -> Result<RetrieverConfig> {
        if self.config.chunk_size == 0 {
            return Err(RagError::InvalidConfig("chunk_size must be greater than zero".into()));
        }
        if self.config.overlap >= self.config.chunk_size {
            return Err(RagError::InvalidConfig(format!(
                "overlap ({}) must be less than chunk_size ({})",
                self.config.overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::InvalidConfig("top_k must be greater than zero".into()));
        }
        Ok(self.config)
    }
}
