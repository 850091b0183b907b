//! Paragraph-aware text chunking with a hard size ceiling

/// Separator placed between paragraphs packed into the same chunk
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

const SEPARATOR_CHARS: usize = 2;

/// Splits page text into bounded-size chunks
///
/// Paragraphs (separated by blank lines) are packed greedily into chunks of
/// at most `max_chars` characters. A paragraph that cannot fit any chunk is
/// hard-wrapped into consecutive `max_chars`-wide slices.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    max_chars: usize,
}

impl TextChunker {
    /// Create a new text chunker
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
        }
    }

    /// Maximum characters per chunk
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Chunk the given text
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_extractor::TextChunker;
    ///
    /// let chunks = TextChunker::new(1800).chunk("Name: Alice\n\nAge: 30");
    /// assert_eq!(chunks, vec!["Name: Alice\n\nAge: 30".to_string()]);
    /// assert!(TextChunker::new(1800).chunk("").is_empty());
    /// ```
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_chars = 0;

        for paragraph in paragraphs(text) {
            let paragraph_chars = paragraph.chars().count();
            let packed_chars = if current.is_empty() {
                paragraph_chars
            } else {
                current_chars + SEPARATOR_CHARS + paragraph_chars
            };

            if packed_chars <= self.max_chars {
                if !current.is_empty() {
                    current.push_str(PARAGRAPH_SEPARATOR);
                }
                current.push_str(paragraph);
                current_chars = packed_chars;
                continue;
            }

            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            current_chars = 0;

            if paragraph_chars <= self.max_chars {
                current.push_str(paragraph);
                current_chars = paragraph_chars;
            } else {
                chunks.extend(split_at_char_limit(paragraph, self.max_chars));
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }
}

/// Non-empty, trimmed paragraphs in page order
pub fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split(PARAGRAPH_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

/// Split text into consecutive slices of `limit` characters (last may be shorter)
fn split_at_char_limit(text: &str, limit: usize) -> Vec<String> {
    let mut slices = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let end = text[start..]
            .char_indices()
            .nth(limit)
            .map_or(text.len(), |(offset, _)| start + offset);
        slices.push(text[start..end].to_string());
        start = end;
    }

    slices
}
