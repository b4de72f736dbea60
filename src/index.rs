//! Exact nearest-neighbor search over stored embeddings.
//!
//! This module provides the [`VectorIndex`] trait and [`InMemoryIndex`], a
//! brute-force reference implementation backed by a `tokio::sync::RwLock`.
//! Every query scores all stored entries under the index's [`Metric`], so
//! results are exact; any approximate backend plugged in behind the trait
//! must stay observably equivalent to this contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::document::{Fragment, MetadataFilter, ScoredFragment};
use crate::error::{RagError, Result};

/// The distance metric used to score similarity.
///
/// Fixed at index construction and immutable for the index's lifetime.
/// All metrics are oriented so that a higher score means more similar;
/// Euclidean scores are negated distances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Cosine similarity of the two vectors. The default.
    #[default]
    Cosine,
    /// Negated Euclidean distance.
    Euclidean,
    /// Raw dot product.
    DotProduct,
}

impl Metric {
    /// Score the similarity of two equal-length vectors. Higher is closer.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Cosine => {
                let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
                let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    return 0.0;
                }
                dot / (norm_a * norm_b)
            }
            Self::Euclidean => {
                let dist: f32 =
                    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt();
                -dist
            }
            Self::DotProduct => a.iter().zip(b.iter()).map(|(x, y)| x * y).sum(),
        }
    }
}

/// A store of (fragment, embedding) entries with k-nearest-neighbor search.
///
/// The index establishes its dimensionality at the first insert and rejects
/// every embedding of a different length afterwards; mixing embedding
/// providers within one index fails fast. Entries are never mutated after
/// insertion and each gets a stable integer id.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::{InMemoryIndex, VectorIndex};
///
/// let index = InMemoryIndex::new();
/// index.insert(fragment, embedding).await?;
/// let results = index.search(&query_embedding, 5, None).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync + std::fmt::Debug {
    /// The metric this index scores with.
    fn metric(&self) -> Metric;

    /// The established dimensionality, or `None` before the first insert.
    async fn dimensions(&self) -> Option<usize>;

    /// Append one entry, returning its id.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the embedding's length
    /// disagrees with the established dimensionality; the index is left
    /// unchanged.
    async fn insert(&self, fragment: Fragment, embedding: Vec<f32>) -> Result<u64>;

    /// Append a batch of entries, returning their ids in order.
    ///
    /// All entries are validated before any is applied: either the whole
    /// batch is inserted or none of it is, and readers never observe a
    /// partially-applied batch.
    async fn insert_batch(&self, entries: Vec<(Fragment, Vec<f32>)>) -> Result<Vec<u64>>;

    /// Return the `k` most similar entries to `embedding`, best first.
    ///
    /// When `filter` is given, only entries whose metadata match are
    /// scored. `k` larger than the entry count returns everything. Equal
    /// scores are broken by insertion order, earliest first, so repeated
    /// searches on an unchanged index return identical results.
    async fn search(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredFragment>>;

    /// Current entry count.
    async fn len(&self) -> usize;

    /// Whether the index has no entries.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    id: u64,
    fragment: Fragment,
    embedding: Vec<f32>,
}

#[derive(Debug, Default)]
struct Inner {
    dimensions: Option<usize>,
    entries: Vec<Entry>,
}

impl Inner {
    /// Validate an embedding against the established dimensionality, or
    /// against `candidate` when nothing is established yet.
    fn check(&self, candidate: Option<usize>, embedding: &[f32]) -> Result<()> {
        let expected = match self.dimensions.or(candidate) {
            Some(d) => d,
            None => return Ok(()),
        };
        if embedding.len() != expected {
            return Err(RagError::DimensionMismatch { expected, actual: embedding.len() });
        }
        Ok(())
    }
}

/// An in-memory exact vector index.
///
/// Entries live in insertion order in a `Vec` behind a
/// `tokio::sync::RwLock`: inserts take the write half, searches the read
/// half, so searches run concurrently with each other but never interleave
/// with a batch insert.
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    metric: Metric,
    inner: RwLock<Inner>,
}

impl InMemoryIndex {
    /// Create an empty index scoring with cosine similarity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index scoring with the given metric.
    pub fn with_metric(metric: Metric) -> Self {
        Self { metric, inner: RwLock::default() }
    }

    /// Capture the current contents as a version-tagged [`IndexSnapshot`].
    pub async fn snapshot(&self) -> IndexSnapshot {
        let inner = self.inner.read().await;
        IndexSnapshot {
            version: SNAPSHOT_VERSION,
            metric: self.metric,
            dimensions: inner.dimensions,
            entries: inner.entries.clone(),
        }
    }

    /// Rebuild an index from a snapshot taken with [`snapshot`](Self::snapshot).
    ///
    /// `metric` is the metric the caller expects to search with.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if the snapshot version or
    /// metric differs from what the caller expects, and
    /// [`RagError::DimensionMismatch`] if any stored entry disagrees with
    /// the snapshot's declared dimensionality.
    pub fn restore(snapshot: IndexSnapshot, metric: Metric) -> Result<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(RagError::InvalidConfig(format!(
                "unsupported index snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        if snapshot.metric != metric {
            return Err(RagError::InvalidConfig(format!(
                "snapshot was built with metric {:?}, index is configured for {:?}",
                snapshot.metric, metric
            )));
        }
        if let Some(expected) = snapshot.dimensions {
            for entry in &snapshot.entries {
                if entry.embedding.len() != expected {
                    return Err(RagError::DimensionMismatch {
                        expected,
                        actual: entry.embedding.len(),
                    });
                }
            }
        }
        Ok(Self {
            metric,
            inner: RwLock::new(Inner {
                dimensions: snapshot.dimensions,
                entries: snapshot.entries,
            }),
        })
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    fn metric(&self) -> Metric {
        self.metric
    }

    async fn dimensions(&self) -> Option<usize> {
        self.inner.read().await.dimensions
    }

    async fn insert(&self, fragment: Fragment, embedding: Vec<f32>) -> Result<u64> {
        let mut inner = self.inner.write().await;
        inner.check(None, &embedding)?;
        let id = inner.entries.len() as u64;
        inner.dimensions = Some(embedding.len());
        inner.entries.push(Entry { id, fragment, embedding });
        Ok(id)
    }

    async fn insert_batch(&self, entries: Vec<(Fragment, Vec<f32>)>) -> Result<Vec<u64>> {
        let mut inner = self.inner.write().await;

        // Validate the whole batch up front; the first entry of the batch
        // establishes the dimensionality when the index is still empty.
        let candidate = entries.first().map(|(_, e)| e.len());
        for (_, embedding) in &entries {
            inner.check(candidate, embedding)?;
        }

        let mut ids = Vec::with_capacity(entries.len());
        for (fragment, embedding) in entries {
            let id = inner.entries.len() as u64;
            inner.dimensions = Some(embedding.len());
            inner.entries.push(Entry { id, fragment, embedding });
            ids.push(id);
        }
        Ok(ids)
    }

    async fn search(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredFragment>> {
        let inner = self.inner.read().await;

        if let Some(expected) = inner.dimensions {
            if embedding.len() != expected {
                return Err(RagError::DimensionMismatch { expected, actual: embedding.len() });
            }
        }

        // Entries are scanned in insertion order and sorted stably, which
        // yields the earliest-inserted-first tie-break.
        let mut scored: Vec<(&Entry, f32)> = inner
            .entries
            .iter()
            .filter(|entry| filter.is_none_or(|f| f.matches(&entry.fragment.metadata)))
            .map(|entry| (entry, self.metric.score(&entry.embedding, embedding)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(entry, score)| ScoredFragment { fragment: entry.fragment.clone(), score })
            .collect())
    }

    async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }
}

/// Format version written into every snapshot.
const SNAPSHOT_VERSION: u32 = 1;

/// A serializable, version-tagged capture of an [`InMemoryIndex`].
///
/// Restoring detects version, metric, and dimensionality mismatches instead
/// of silently corrupting the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    version: u32,
    metric: Metric,
    dimensions: Option<usize>,
    entries: Vec<Entry>,
}
