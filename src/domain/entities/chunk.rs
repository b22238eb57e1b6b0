use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::PageText;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: Uuid,
    pub document_id: String,
    pub text: String,
    pub chunk_index: usize,
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    pub fn new(
        document_id: impl Into<String>,
        text: impl Into<String>,
        chunk_index: usize,
        metadata: ChunkMetadata,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id: document_id.into(),
            text: text.into(),
            chunk_index,
            metadata,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// 1-based page number the chunk starts on.
    pub page: usize,
    /// Byte offset of the chunk's first character within that page's text.
    pub start_offset: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum chunk length in bytes.
    pub chunk_size: usize,
    /// Maximum bytes of trailing text repeated at the start of the next chunk.
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Splits extracted pages into overlapping chunks for embedding.
///
/// Each chunk is a contiguous slice of one page's text, so concatenating
/// chunks with overlaps removed reconstructs the page (modulo trimmed
/// whitespace at unit boundaries). Boundaries prefer paragraph breaks, then
/// sentence breaks, before falling back to a hard split at `chunk_size`.
/// Chunk indices are contiguous across pages and start offsets within a page
/// are strictly increasing.
pub fn chunk_pages(document_id: &str, pages: &[PageText], config: &ChunkConfig) -> Vec<DocumentChunk> {
    let mut chunks = Vec::new();
    let mut chunk_index = 0;

    for page in pages {
        let units = split_units(&page.text, config.chunk_size);
        if units.is_empty() {
            continue;
        }

        let mut first = 0;
        loop {
            // Extend the chunk while the span of covered units stays in bounds.
            let mut last = first;
            while last + 1 < units.len()
                && units[last + 1].1 - units[first].0 <= config.chunk_size
            {
                last += 1;
            }

            let (start, _) = units[first];
            let end = units[last].1;
            chunks.push(DocumentChunk::new(
                document_id,
                &page.text[start..end],
                chunk_index,
                ChunkMetadata {
                    page: page.page,
                    start_offset: start,
                },
            ));
            chunk_index += 1;

            if last + 1 >= units.len() {
                break;
            }

            // Start the next chunk far enough back to repeat at most
            // `chunk_overlap` bytes, but always make forward progress.
            let mut next = last + 1;
            while next > first + 1 && end - units[next - 1].0 <= config.chunk_overlap {
                next -= 1;
            }
            first = next;
        }
    }

    chunks
}

/// Byte ranges of chunkable units within `text`: paragraphs, with oversized
/// paragraphs split into sentences and oversized sentences hard-split.
/// Ranges are trimmed of surrounding whitespace; blank units are dropped.
fn split_units(text: &str, max_len: usize) -> Vec<(usize, usize)> {
    let mut units = Vec::new();
    let mut offset = 0;

    for para in text.split("\n\n") {
        if let Some((start, end)) = trim_range(text, offset, offset + para.len()) {
            if end - start <= max_len {
                units.push((start, end));
            } else {
                split_sentences(text, start, end, max_len, &mut units);
            }
        }
        offset += para.len() + 2;
    }

    units
}

fn split_sentences(
    text: &str,
    start: usize,
    end: usize,
    max_len: usize,
    units: &mut Vec<(usize, usize)>,
) {
    let mut sentence_start = start;
    let slice = &text[start..end];

    let mut prev: Option<char> = None;
    for (i, c) in slice.char_indices() {
        let boundary = match prev {
            Some(p) => matches!(p, '.' | '!' | '?') && c.is_whitespace() || p == '\n',
            None => false,
        };
        if boundary {
            let sentence_end = start + i;
            if sentence_end > sentence_start {
                push_sentence(text, sentence_start, sentence_end, max_len, units);
            }
            sentence_start = sentence_end;
        }
        prev = Some(c);
    }
    if end > sentence_start {
        push_sentence(text, sentence_start, end, max_len, units);
    }
}

fn push_sentence(
    text: &str,
    start: usize,
    end: usize,
    max_len: usize,
    units: &mut Vec<(usize, usize)>,
) {
    let Some((start, end)) = trim_range(text, start, end) else {
        return;
    };

    if end - start <= max_len {
        units.push((start, end));
        return;
    }

    // Hard split at the last char boundary at or below max_len.
    let mut piece_start = start;
    while end - piece_start > max_len {
        let mut cut = piece_start + max_len;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        if cut == piece_start {
            break;
        }
        units.push((piece_start, cut));
        piece_start = cut;
    }
    if end > piece_start {
        units.push((piece_start, end));
    }
}

/// Shrinks `[start, end)` past surrounding whitespace; `None` if all blank.
fn trim_range(text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let slice = &text[start..end];
    let trimmed = slice.trim_start();
    let lead = slice.len() - trimmed.len();
    let trimmed = trimmed.trim_end();
    if trimmed.is_empty() {
        return None;
    }
    Some((start + lead, start + lead + trimmed.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(chunk_size: usize, chunk_overlap: usize) -> ChunkConfig {
        ChunkConfig {
            chunk_size,
            chunk_overlap,
        }
    }

    #[test]
    fn single_page_single_chunk() {
        let pages = vec![PageText::new(1, "Hello world.\n\nThis is a test.")];
        let chunks = chunk_pages("doc-1", &pages, &cfg(100, 20));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Hello world.\n\nThis is a test.");
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].metadata.page, 1);
        assert_eq!(chunks[0].metadata.start_offset, 0);
    }

    #[test]
    fn splits_on_paragraph_boundaries() {
        let text = "First paragraph here.\n\nSecond paragraph here.\n\nThird paragraph here.";
        let pages = vec![PageText::new(1, text)];
        let chunks = chunk_pages("doc-1", &pages, &cfg(30, 0));

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "First paragraph here.");
        assert_eq!(chunks[1].text, "Second paragraph here.");
        assert_eq!(chunks[2].text, "Third paragraph here.");
    }

    #[test]
    fn start_offsets_are_increasing() {
        let text = "One sentence. Two sentence. Three sentence. Four sentence. Five sentence.";
        let pages = vec![PageText::new(1, text)];
        let chunks = chunk_pages("doc-1", &pages, &cfg(30, 10));

        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            assert!(pair[1].metadata.start_offset > pair[0].metadata.start_offset);
        }
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let text = "Alpha sentence one. Beta sentence two. Gamma sentence three. Delta sentence four.";
        let pages = vec![PageText::new(1, text)];
        let chunks = chunk_pages("doc-1", &pages, &cfg(45, 25));

        assert!(chunks.len() > 1);
        // The overlap keeps the tail of each chunk at the head of the next.
        for pair in chunks.windows(2) {
            let prev_end = pair[0].metadata.start_offset + pair[0].text.len();
            assert!(pair[1].metadata.start_offset < prev_end);
            assert!(prev_end - pair[1].metadata.start_offset <= 25);
        }
    }

    #[test]
    fn chunks_are_slices_of_the_page() {
        let text = "Some text. More text here.\n\nAnother paragraph with content.";
        let pages = vec![PageText::new(1, text)];
        let chunks = chunk_pages("doc-1", &pages, &cfg(25, 5));

        for chunk in &chunks {
            let start = chunk.metadata.start_offset;
            assert_eq!(&text[start..start + chunk.text.len()], chunk.text);
        }
    }

    #[test]
    fn indices_continue_across_pages() {
        let pages = vec![
            PageText::new(1, "Page one content."),
            PageText::new(2, "Page two content."),
        ];
        let chunks = chunk_pages("doc-1", &pages, &cfg(100, 0));

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].metadata.page, 1);
        assert_eq!(chunks[1].chunk_index, 1);
        assert_eq!(chunks[1].metadata.page, 2);
    }

    #[test]
    fn oversized_sentence_is_hard_split() {
        let text = "a".repeat(120);
        let pages = vec![PageText::new(1, text.clone())];
        let chunks = chunk_pages("doc-1", &pages, &cfg(50, 0));

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.text.len() <= 50));
        let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn empty_and_blank_pages_yield_nothing() {
        let pages = vec![PageText::new(1, ""), PageText::new(2, "  \n\n  ")];
        let chunks = chunk_pages("doc-1", &pages, &cfg(100, 20));
        assert!(chunks.is_empty());
    }
}
