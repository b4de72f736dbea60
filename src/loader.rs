//! Document loading boundary.

use async_trait::async_trait;

use crate::document::Document;
use crate::error::{RagError, Result};

/// Supplies plain-text documents for the given source identifiers.
///
/// Format-specific extraction (PDF, HTML, ...) happens behind this
/// boundary; the retrieval engine only ever sees extracted text.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load one document per source, order preserved.
    async fn load(&self, sources: &[String]) -> Result<Vec<Document>>;
}

/// A loader over a fixed set of already-extracted documents.
///
/// Sources resolve against the documents' `source_id`s. Useful for tests
/// and for corpora that are assembled in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    documents: Vec<Document>,
}

impl StaticLoader {
    /// Create a loader over the given documents.
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl DocumentLoader for StaticLoader {
    async fn load(&self, sources: &[String]) -> Result<Vec<Document>> {
        sources
            .iter()
            .map(|source| {
                self.documents.iter().find(|d| &d.source_id == source).cloned().ok_or_else(
                    || RagError::InvalidConfig(format!("unknown document source '{source}'")),
                )
            })
            .collect()
    }
}
