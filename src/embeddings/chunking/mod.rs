
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A source document handed to the chunker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Full text of the document
    pub text: String,
    /// URL the text was taken from
    pub source_url: String,
}

impl SourceDocument {
    #[inline]
    pub fn new(text: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_url: source_url.into(),
        }
    }
}

/// A chunk of a source document, ready for embedding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// The passage text
    pub text: String,
    /// URL of the document this passage came from
    pub source_url: String,
    /// Character offset of the passage within its source document
    #[serde(default)]
    pub offset: usize,
}

impl Passage {
    /// Length of the passage in characters
    #[inline]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Configuration for passage chunking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum passage length in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive passages of one document
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

/// Split every document into overlapping, length-bounded passages.
///
/// Passages of one document are contiguous character ranges of its text.
/// Dropping the leading overlap of every passage after the first and
/// concatenating the rest gives back the original text.
#[inline]
pub fn chunk_documents(documents: &[SourceDocument], config: &ChunkingConfig) -> Vec<Passage> {
    let mut passages = Vec::new();

    for document in documents {
        let document_passages = chunk_document(document, config);
        debug!(
            "Chunked {} ({} chars) into {} passages",
            document.source_url,
            document.text.chars().count(),
            document_passages.len()
        );
        passages.extend(document_passages);
    }

    passages
}

/// Split a single document into passages
#[inline]
pub fn chunk_document(document: &SourceDocument, config: &ChunkingConfig) -> Vec<Passage> {
    if document.text.trim().is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = document.text.chars().collect();
    let chunk_size = config.chunk_size.max(1);
    // Overlap must stay below the chunk size or the window never advances
    let overlap = config.chunk_overlap.min(chunk_size - 1);

    let mut passages = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = if chars.len() - start <= chunk_size {
            chars.len()
        } else {
            find_split_point(&chars, start + overlap + 1, start + chunk_size)
        };

        passages.push(Passage {
            text: chars[start..end].iter().collect(),
            source_url: document.source_url.clone(),
            offset: start,
        });

        if end == chars.len() {
            break;
        }

        start = overlap_start(&chars, end, overlap);
    }

    passages
}

/// Pick the end of a passage inside `min_end..=max_end`.
///
/// Paragraph breaks win over line breaks, line breaks over sentence ends and
/// sentence ends over plain whitespace. The separator stays with the
/// passage it closes. Falls back to a hard cut at `max_end`.
fn find_split_point(chars: &[char], min_end: usize, max_end: usize) -> usize {
    let boundaries: [fn(&[char], usize) -> bool; 4] = [
        is_paragraph_break,
        is_line_break,
        is_sentence_break,
        is_word_break,
    ];

    for is_boundary in boundaries {
        if let Some(end) = (min_end..=max_end).rev().find(|&end| is_boundary(chars, end)) {
            return end;
        }
    }

    max_end
}

/// First character of the next passage.
///
/// The overlap begins at the earliest word start inside the trailing
/// `overlap` characters of the previous passage. Without a word start in
/// that window the next passage starts exactly at `end`.
fn overlap_start(chars: &[char], end: usize, overlap: usize) -> usize {
    if overlap == 0 {
        return end;
    }

    ((end - overlap)..end)
        .find(|&position| position > 0 && chars[position - 1].is_whitespace())
        .unwrap_or(end)
}

fn is_paragraph_break(chars: &[char], end: usize) -> bool {
    end >= 2 && chars[end - 1] == '\n' && chars[end - 2] == '\n'
}

fn is_line_break(chars: &[char], end: usize) -> bool {
    end >= 1 && chars[end - 1] == '\n'
}

fn is_sentence_break(chars: &[char], end: usize) -> bool {
    end >= 2 && chars[end - 1].is_whitespace() && matches!(chars[end - 2], '.' | '!' | '?')
}

fn is_word_break(chars: &[char], end: usize) -> bool {
    end >= 1 && chars[end - 1].is_whitespace()
}

/// Rebuild the source text of one document from its passages in order
#[inline]
pub fn reconstruct(passages: &[Passage]) -> String {
    let mut text = String::new();
    let mut covered = 0_usize;

    for passage in passages {
        let skip = covered.saturating_sub(passage.offset);
        text.extend(passage.text.chars().skip(skip));
        covered = passage.offset + passage.char_len();
    }

    text
}
