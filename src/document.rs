//! Data types for documents, fragments, queries, and search results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A source document containing text content and metadata.
///
/// Documents are immutable once constructed; fragments keep a back-reference
/// to the document through `source_id` for citation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Identifier for the source of this document (URL, path, ...).
    pub source_id: String,
    /// The text content of the document.
    pub text: String,
    /// Key-value metadata associated with the document.
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document with no metadata.
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source_id: source_id.into(), text: text.into(), metadata: HashMap::new() }
    }

    /// Attach a metadata key-value pair.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A contiguous, offset-tracked piece of a [`Document`].
///
/// `start` and `end` are byte offsets into the source text, always on UTF-8
/// character boundaries, with `0 <= start < end <= text.len()` of the source.
/// Fragments are immutable after chunking and carry a copy of the document
/// metadata taken at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fragment {
    /// The substring content.
    pub text: String,
    /// Source identifier of the originating document.
    pub source_id: String,
    /// Byte offset of the fragment start in the source text.
    pub start: usize,
    /// Byte offset one past the fragment end in the source text.
    pub end: usize,
    /// Metadata copied from the originating document.
    pub metadata: HashMap<String, String>,
}

/// A retrieved [`Fragment`] paired with a similarity score.
///
/// Higher scores are more relevant under every [`Metric`](crate::index::Metric).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredFragment {
    /// The retrieved fragment.
    pub fragment: Fragment,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

/// An exact-match conjunction over fragment metadata.
///
/// A fragment matches when every listed key is present with the listed
/// value. An empty filter matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetadataFilter {
    equals: HashMap<String, String>,
}

impl MetadataFilter {
    /// Create an empty filter that matches all fragments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `key` to be present with exactly `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.equals.insert(key.into(), value.into());
        self
    }

    /// Whether the given metadata satisfies every requirement.
    pub fn matches(&self, metadata: &HashMap<String, String>) -> bool {
        self.equals.iter().all(|(k, v)| metadata.get(k) == Some(v))
    }
}

/// A similarity query: text, requested result count, optional filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Query {
    /// The query text to embed and search for.
    pub text: String,
    /// Requested result count. Must be at least 1.
    pub k: usize,
    /// Optional metadata filter restricting the searched entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<MetadataFilter>,
}

impl Query {
    /// Create a query with no metadata filter.
    pub fn new(text: impl Into<String>, k: usize) -> Self {
        Self { text: text.into(), k, filter: None }
    }

    /// Restrict the query to fragments matching the filter.
    pub fn with_filter(mut self, filter: MetadataFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}
