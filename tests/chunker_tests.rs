//! Chunking contract tests: offset accuracy, overlap stepping, separator
//! preference, and the lossless round-trip property.

use proptest::prelude::*;
use ragkit::{Chunker, Document, RagError, RecursiveChunker};

fn doc(text: &str) -> Document {
    Document::new("doc", text)
}

#[test]
fn raw_cut_with_overlap_matches_expected_offsets() {
    let chunker = RecursiveChunker::new(4, 1).unwrap();
    let fragments = chunker.split(&doc("ABCDEFGHIJ"));

    let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
    assert_eq!(texts, ["ABCD", "DEFG", "GHIJ"]);

    let offsets: Vec<(usize, usize)> = fragments.iter().map(|f| (f.start, f.end)).collect();
    assert_eq!(offsets, [(0, 4), (3, 7), (6, 10)]);
}

#[test]
fn short_document_yields_one_full_fragment() {
    let chunker = RecursiveChunker::new(100, 10).unwrap();
    let fragments = chunker.split(&doc("short text"));
    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].text, "short text");
    assert_eq!((fragments[0].start, fragments[0].end), (0, 10));
}

#[test]
fn document_exactly_chunk_size_yields_one_fragment() {
    let chunker = RecursiveChunker::new(5, 2).unwrap();
    let fragments = chunker.split(&doc("abcde"));
    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].text, "abcde");
}

#[test]
fn empty_document_yields_no_fragments() {
    let chunker = RecursiveChunker::new(10, 2).unwrap();
    assert!(chunker.split(&doc("")).is_empty());
}

#[test]
fn rejects_invalid_parameters() {
    assert!(matches!(RecursiveChunker::new(0, 0), Err(RagError::InvalidConfig(_))));
    assert!(matches!(RecursiveChunker::new(10, 10), Err(RagError::InvalidConfig(_))));
    assert!(matches!(RecursiveChunker::new(10, 15), Err(RagError::InvalidConfig(_))));
}

#[test]
fn prefers_paragraph_break_over_mid_word_cut() {
    let text = "Hello world.\n\nSecond paragraph here.";
    let chunker = RecursiveChunker::new(20, 0).unwrap();
    let fragments = chunker.split(&doc(text));

    assert_eq!(fragments[0].text, "Hello world.\n\n");
    assert_eq!(fragments[0].end, 14);
    for f in &fragments {
        assert!(f.text.len() <= 20);
    }
}

#[test]
fn falls_back_to_sentence_then_word_breaks() {
    let text = "One sentence here. Another sentence follows. And a third one.";
    let chunker = RecursiveChunker::new(25, 0).unwrap();
    let fragments = chunker.split(&doc(text));

    // No paragraph breaks: the first cut lands after "here. "
    assert_eq!(fragments[0].text, "One sentence here. ");
    for f in &fragments {
        assert!(f.text.len() <= 25);
    }
}

#[test]
fn fragments_inherit_document_metadata() {
    let document = Document::new("doc", "some text long enough to split into parts")
        .with_metadata("lang", "en");
    let chunker = RecursiveChunker::new(16, 4).unwrap();
    for f in chunker.split(&document) {
        assert_eq!(f.metadata.get("lang").map(String::as_str), Some("en"));
        assert_eq!(f.source_id, "doc");
    }
}

fn arb_params() -> impl Strategy<Value = (usize, usize)> {
    (1usize..64).prop_flat_map(|size| (Just(size), 0..size))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every fragment slices the source text exactly at its offsets, the
    /// fragments cover the text without gaps, and stitching them back
    /// together (skipping overlaps) reconstructs the original.
    #[test]
    fn split_is_offset_accurate_and_lossless(
        chars in proptest::collection::vec(any::<char>(), 0..200),
        (chunk_size, overlap) in arb_params(),
    ) {
        let text: String = chars.into_iter().collect();
        let chunker = RecursiveChunker::new(chunk_size, overlap).unwrap();
        let fragments = chunker.split(&doc(&text));

        if text.is_empty() {
            prop_assert!(fragments.is_empty());
            return Ok(());
        }

        prop_assert!(!fragments.is_empty());
        prop_assert_eq!(fragments[0].start, 0);
        prop_assert_eq!(fragments.last().unwrap().end, text.len());

        for f in &fragments {
            prop_assert!(f.start < f.end);
            prop_assert_eq!(&f.text, &text[f.start..f.end]);
            // A cut never lands below the size budget unless a single
            // character is wider than the budget.
            prop_assert!(f.text.len() <= chunk_size || f.text.chars().count() == 1);
        }

        for pair in fragments.windows(2) {
            // No content is ever skipped, and the walk always advances.
            prop_assert!(pair[1].start <= pair[0].end);
            prop_assert!(pair[1].start > pair[0].start);
        }

        // Reconstruct from offsets, skipping whatever each fragment overlaps
        // with already-covered text.
        let mut covered = fragments[0].end;
        let mut rebuilt = text[..fragments[0].end].to_string();
        for f in &fragments[1..] {
            if f.end > covered {
                rebuilt.push_str(&text[covered.max(f.start)..f.end]);
                covered = f.end;
            }
        }
        prop_assert_eq!(rebuilt, text);
    }
}
