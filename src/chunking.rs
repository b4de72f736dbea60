//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`RecursiveChunker`], a
//! splitter that cuts at the largest separator available — paragraph breaks,
//! then sentence breaks, then word breaks, then a raw character cut — while
//! tracking the byte offsets of every fragment in the source text.

use crate::document::{Document, Fragment};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into fragments.
///
/// Implementations produce offset-accurate [`Fragment`]s covering the full
/// document text. Embeddings are attached later by the retriever.
pub trait Chunker: Send + Sync + std::fmt::Debug {
    /// Split a document into ordered, contiguous fragments.
    ///
    /// Returns an empty `Vec` if the document has empty text. A document no
    /// longer than the chunk size yields exactly one full-text fragment.
    fn split(&self, document: &Document) -> Vec<Fragment>;
}

/// Separator classes tried from coarsest to finest. A raw character cut is
/// the final fallback when no separator fits in the window.
const SEPARATOR_LEVELS: &[&[&str]] = &[&["\n\n"], &[". ", "! ", "? "], &[" "]];

/// Splits text recursively by separators with a fixed overlap.
///
/// The splitter walks the text with a window of at most `chunk_size` bytes
/// and cuts after the last separator of the coarsest class found inside the
/// window. Each subsequent fragment starts `overlap` bytes before the
/// previous cut, clamped to a character boundary, so no content is ever
/// skipped and fragment offsets always slice the source text exactly.
///
/// Sizes are byte budgets; cuts land on UTF-8 character boundaries, so a
/// fragment may hold a single character that is wider than `chunk_size`.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(512, 100)?;
/// let fragments = chunker.split(&document);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if `chunk_size` is zero or
    /// `overlap >= chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::InvalidConfig("chunk_size must be greater than zero".into()));
        }
        if overlap >= chunk_size {
            return Err(RagError::InvalidConfig(format!(
                "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    /// Pick the cut position for a fragment starting at `start`.
    ///
    /// Tries each separator class in turn, taking the last match inside the
    /// window whose cut leaves the next fragment start strictly past
    /// `start`. Falls back to a raw cut at the window end.
    fn find_cut(&self, text: &str, start: usize, window_end: usize) -> usize {
        if window_end <= start {
            // chunk_size is narrower than the character at `start`
            return ceil_char_boundary(text, start + 1);
        }
        let window = &text[start..window_end];
        let min_cut = start + self.overlap;
        for level in SEPARATOR_LEVELS {
            let mut best = None;
            for sep in *level {
                if let Some(pos) = window.rfind(sep) {
                    let cut = start + pos + sep.len();
                    if cut > min_cut {
                        best = best.max(Some(cut));
                    }
                }
            }
            if let Some(cut) = best {
                return cut;
            }
        }
        window_end
    }
}

impl Chunker for RecursiveChunker {
    fn split(&self, document: &Document) -> Vec<Fragment> {
        let text = &document.text;
        if text.is_empty() {
            return Vec::new();
        }

        let mut fragments = Vec::new();
        let mut start = 0;

        loop {
            let window_end =
                floor_char_boundary(text, (start + self.chunk_size).min(text.len()));
            if window_end == text.len() {
                fragments.push(make_fragment(document, start, text.len()));
                break;
            }

            let cut = self.find_cut(text, start, window_end);
            fragments.push(make_fragment(document, start, cut));

            // Rewind by the overlap; clamping to a boundary may only grow
            // the overlap, never skip content.
            let mut next = floor_char_boundary(text, cut.saturating_sub(self.overlap));
            if next <= start {
                next = cut;
            }
            start = next;
        }

        fragments
    }
}

fn make_fragment(document: &Document, start: usize, end: usize) -> Fragment {
    Fragment {
        text: document.text[start..end].to_string(),
        source_id: document.source_id.clone(),
        start,
        end,
        metadata: document.metadata.clone(),
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index.min(text.len())
}
