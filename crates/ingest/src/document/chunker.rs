//! Character-based hierarchical chunking (§4.5).
//!
//! Splits extracted documents into overlapping chunks sized in characters
//! rather than tokens, preferring paragraph break → line break → space →
//! character boundaries, in that order. Chunking runs per-page so page
//! numbers stay attributable and overlap never crosses a page boundary.

use super::ExtractedDocument;

const SEPARATORS: &[&str] = &["\n\n", "\n", " "];

#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Target chunk size in characters (default: 1000).
    pub target_size: usize,
    /// Overlap between adjacent chunks in characters (default: 200).
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self { target_size: 1000, overlap: 200 }
    }
}

/// A chunk of text with attribution metadata, prior to embedding.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub index: usize,
    pub content: String,
    pub page_number: usize,
    pub source_id: String,
}

/// Chunk an extracted document. `source_id` identifies the originating
/// document (e.g. its filename) and is carried onto every chunk.
pub fn chunk_document(doc: &ExtractedDocument, config: &ChunkConfig, source_id: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut index = 0;

    for page in &doc.pages {
        let trimmed = page.text.trim();
        if trimmed.is_empty() {
            continue;
        }
        let pieces = split_recursive(trimmed, config.target_size, SEPARATORS);
        let merged = merge_tiny(pieces, config.target_size / 10);
        for (i, content) in merged.iter().enumerate() {
            let content = if i > 0 && config.overlap > 0 {
                let overlap_text = tail_chars(&merged[i - 1], config.overlap);
                format!("{overlap_text}{content}")
            } else {
                content.clone()
            };
            chunks.push(Chunk { index, content, page_number: page.page_number, source_id: source_id.to_string() });
            index += 1;
        }
    }
    chunks
}

/// Recursively split `text` using the separator hierarchy until every piece
/// is within `target` characters, falling back to hard character splitting.
fn split_recursive(text: &str, target: usize, separators: &[&str]) -> Vec<String> {
    if text.chars().count() <= target {
        return vec![text.to_string()];
    }
    let Some((sep, rest)) = separators.split_first() else {
        return split_by_chars(text, target);
    };

    let parts: Vec<&str> = text.split(sep).filter(|p| !p.is_empty()).collect();
    if parts.len() <= 1 {
        return split_recursive(text, target, rest);
    }

    let mut pieces = Vec::new();
    let mut buf = String::new();
    for part in parts {
        let candidate_len = if buf.is_empty() { part.chars().count() } else { buf.chars().count() + sep.chars().count() + part.chars().count() };
        if candidate_len <= target {
            if !buf.is_empty() {
                buf.push_str(sep);
            }
            buf.push_str(part);
        } else {
            if !buf.is_empty() {
                pieces.push(std::mem::take(&mut buf));
            }
            if part.chars().count() > target {
                pieces.extend(split_recursive(part, target, rest));
            } else {
                buf = part.to_string();
            }
        }
    }
    if !buf.is_empty() {
        pieces.push(buf);
    }
    pieces
}

fn split_by_chars(text: &str, target: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(target.max(1)).map(|c| c.iter().collect()).collect()
}

/// Merge adjacent fragments smaller than `min_size` into their neighbour.
fn merge_tiny(fragments: Vec<String>, min_size: usize) -> Vec<String> {
    if fragments.is_empty() {
        return fragments;
    }
    let mut merged: Vec<String> = Vec::with_capacity(fragments.len());
    for frag in fragments {
        if let Some(last) = merged.last_mut() {
            if last.chars().count() < min_size {
                last.push(' ');
                last.push_str(&frag);
                continue;
            }
        }
        merged.push(frag);
    }
    if merged.len() >= 2 && merged.last().unwrap().chars().count() < min_size {
        let last = merged.pop().unwrap();
        let prev = merged.last_mut().unwrap();
        prev.push(' ');
        prev.push_str(&last);
    }
    merged
}

fn tail_chars(text: &str, n: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= n {
        return text.to_string();
    }
    chars[chars.len() - n..].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PageContent;

    fn make_doc(pages: Vec<&str>) -> ExtractedDocument {
        ExtractedDocument {
            filename: "test.txt".into(),
            file_type: "txt".into(),
            pages: pages
                .into_iter()
                .enumerate()
                .map(|(i, text)| PageContent { page_number: i + 1, text: text.to_string(), headings: vec![] })
                .collect(),
        }
    }

    #[test]
    fn short_document_produces_one_chunk() {
        let doc = make_doc(vec!["Just one short paragraph."]);
        let config = ChunkConfig { target_size: 1000, overlap: 200 };
        let chunks = chunk_document(&doc, &config, "doc1");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].page_number, 1);
        assert_eq!(chunks[0].source_id, "doc1");
    }

    #[test]
    fn long_document_splits_into_multiple_chunks_within_target() {
        let long = "word ".repeat(2000);
        let doc = make_doc(vec![long.as_str()]);
        let config = ChunkConfig { target_size: 1000, overlap: 200 };
        let chunks = chunk_document(&doc, &config, "doc1");
        assert!(chunks.len() >= 2);
        for c in &chunks {
            assert!(c.content.chars().count() <= 1000 + 200 + 10);
        }
    }

    #[test]
    fn overlap_appears_at_chunk_boundary() {
        let long = "alpha bravo charlie delta echo foxtrot golf hotel india juliet ".repeat(50);
        let doc = make_doc(vec![long.as_str()]);
        let config = ChunkConfig { target_size: 500, overlap: 100 };
        let chunks = chunk_document(&doc, &config, "doc1");
        assert!(chunks.len() >= 2);
        let tail_of_first = tail_chars(&chunks[0].content, 50);
        assert!(chunks[1].content.contains(tail_of_first.trim()));
    }

    #[test]
    fn chunking_is_per_page_and_preserves_page_numbers() {
        let doc = make_doc(vec!["Page one content.", "Page two content."]);
        let config = ChunkConfig::default();
        let chunks = chunk_document(&doc, &config, "doc1");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page_number, 1);
        assert_eq!(chunks[1].page_number, 2);
    }

    #[test]
    fn empty_page_produces_no_chunks() {
        let doc = make_doc(vec!["", "   "]);
        let config = ChunkConfig::default();
        let chunks = chunk_document(&doc, &config, "doc1");
        assert!(chunks.is_empty());
    }

    #[test]
    fn indices_are_sequential_across_pages() {
        let doc = make_doc(vec!["A.\n\nB.", "C.\n\nD."]);
        let config = ChunkConfig { target_size: 2, overlap: 0 };
        let chunks = chunk_document(&doc, &config, "doc1");
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i);
        }
    }

    #[test]
    fn single_giant_word_falls_back_to_character_split() {
        let giant: String = "x".repeat(2500);
        let doc = make_doc(vec![giant.as_str()]);
        let config = ChunkConfig { target_size: 1000, overlap: 0 };
        let chunks = chunk_document(&doc, &config, "doc1");
        assert!(chunks.len() >= 2);
    }
}
