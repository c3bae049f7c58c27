//! Grapheme-aware overlapping text splitter.
//!
//! Splits a source document into fixed-size chunks with a configurable
//! overlap between consecutive chunks. "Size" is measured in extended
//! grapheme clusters so a chunk boundary never tears apart a multi-byte
//! sequence; offsets are reported as byte ranges for exact slicing.

use unicode_segmentation::UnicodeSegmentation;

use crate::error::IndexError;

/// Default maximum chunk length in grapheme clusters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap between consecutive chunks in grapheme clusters.
pub const DEFAULT_OVERLAP: usize = 200;

/// A contiguous slice of the source text produced by the splitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSpan {
    /// Byte offset of the chunk start in the source text.
    pub start: usize,
    /// Byte offset one past the chunk end in the source text.
    pub end: usize,
    /// The chunk text, exactly `source[start..end]`.
    pub text: String,
}

/// Splits `text` into overlapping chunks of at most `chunk_size` graphemes.
///
/// Consecutive chunks share exactly `min(chunk_overlap, chunk length)`
/// graphemes. Every source character appears in at least one chunk, and
/// chunks preserve original order. An empty input yields no chunks.
///
/// # Errors
///
/// Returns [`IndexError::InvalidGeometry`] unless `chunk_size > chunk_overlap`.
pub fn split_text(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<Vec<ChunkSpan>, IndexError> {
    if chunk_size <= chunk_overlap {
        return Err(IndexError::InvalidGeometry {
            chunk_size,
            chunk_overlap,
        });
    }

    if text.is_empty() {
        return Ok(Vec::new());
    }

    // Byte offset of every grapheme boundary, plus the end sentinel.
    let mut boundaries: Vec<usize> = text.grapheme_indices(true).map(|(i, _)| i).collect();
    boundaries.push(text.len());
    let grapheme_count = boundaries.len() - 1;

    let step = chunk_size - chunk_overlap;
    let mut chunks = Vec::new();
    let mut pos = 0;

    loop {
        let end_idx = (pos + chunk_size).min(grapheme_count);
        let start = boundaries[pos];
        let end = boundaries[end_idx];
        chunks.push(ChunkSpan {
            start,
            end,
            text: text[start..end].to_string(),
        });

        if end_idx == grapheme_count {
            break;
        }
        pos += step;
    }

    Ok(chunks)
}
