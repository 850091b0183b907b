//! Output rows and the sentinel rows that stand in for failures

use serde::{Deserialize, Serialize};

/// Key used by every sentinel row
pub const UNSTRUCTURED_KEY: &str = "__UNSTRUCTURED__";

/// Characters of a bad service reply kept in a parse-failure row
pub const BAD_REPLY_EXCERPT_CHARS: usize = 800;

/// One row of the final key/value table.
///
/// Column names match the persisted `Structured` sheet exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Extracted key, or [`UNSTRUCTURED_KEY`] for sentinel rows
    #[serde(rename = "Key")]
    pub key: String,

    /// Extracted value; sentinel rows carry the unprocessed content here
    #[serde(rename = "Value")]
    pub value: String,

    /// Service remarks, or a diagnostic for sentinel rows
    #[serde(rename = "Comments")]
    pub comments: String,

    /// Page the row was derived from
    #[serde(rename = "Source_Page")]
    pub source_page: u32,
}

impl Row {
    /// Build a sentinel row
    pub fn sentinel(value: impl Into<String>, comments: impl Into<String>, source_page: u32) -> Self {
        Self {
            key: UNSTRUCTURED_KEY.to_string(),
            value: value.into(),
            comments: comments.into(),
            source_page,
        }
    }

    /// Row emitted for a page that produced no chunks
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_domain::{Row, UNSTRUCTURED_KEY};
    ///
    /// let row = Row::empty_page(7);
    /// assert_eq!(row.key, UNSTRUCTURED_KEY);
    /// assert_eq!(row.value, "");
    /// assert_eq!(row.comments, "Empty page");
    /// assert_eq!(row.source_page, 7);
    /// ```
    pub fn empty_page(source_page: u32) -> Self {
        Self::sentinel("", "Empty page", source_page)
    }

    /// Row emitted when the extraction service could not be reached for a chunk
    pub fn service_failure(chunk: &str, message: &str, source_page: u32) -> Self {
        Self::sentinel(chunk, format!("Model error: {}", message), source_page)
    }

    /// Row emitted when the service reply for a chunk held no usable JSON
    pub fn parse_failure(chunk: &str, raw_reply: &str, source_page: u32) -> Self {
        Self::sentinel(
            chunk,
            format!(
                "Bad JSON output.\n{}",
                truncate_chars(raw_reply, BAD_REPLY_EXCERPT_CHARS)
            ),
            source_page,
        )
    }

    /// Row emitted when the service parsed cleanly but returned no elements,
    /// so the chunk still appears in the output
    pub fn no_items(chunk: &str, source_page: u32) -> Self {
        Self::sentinel(chunk, "No items returned", source_page)
    }

    /// Row emitted for a reply element that is not a key/value object
    pub fn invalid_item(element: impl Into<String>, source_page: u32) -> Self {
        Self::sentinel(element, "Invalid item", source_page)
    }

    /// Whether this row stands in for unstructured or failed content
    pub fn is_sentinel(&self) -> bool {
        self.key == UNSTRUCTURED_KEY
    }
}

/// Return at most `max_chars` characters of `text`, never splitting a character
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_failure_row() {
        let row = Row::service_failure("X", "connection refused", 2);
        assert!(row.is_sentinel());
        assert_eq!(row.value, "X");
        assert_eq!(row.comments, "Model error: connection refused");
        assert_eq!(row.source_page, 2);
    }

    #[test]
    fn test_parse_failure_row_truncates_reply() {
        let reply = "z".repeat(2000);
        let row = Row::parse_failure("chunk text", &reply, 1);
        assert_eq!(row.value, "chunk text");
        assert!(row.comments.starts_with("Bad JSON output.\n"));
        assert_eq!(
            row.comments.len(),
            "Bad JSON output.\n".len() + BAD_REPLY_EXCERPT_CHARS
        );
    }

    #[test]
    fn test_no_items_row_keeps_chunk() {
        let row = Row::no_items("Lorem ipsum", 9);
        assert!(row.is_sentinel());
        assert_eq!(row.value, "Lorem ipsum");
        assert_eq!(row.comments, "No items returned");
    }

    #[test]
    fn test_invalid_item_row() {
        let row = Row::invalid_item("42", 5);
        assert_eq!(row.key, UNSTRUCTURED_KEY);
        assert_eq!(row.value, "42");
        assert_eq!(row.comments, "Invalid item");
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_row_column_names() {
        let json = serde_json::to_value(Row::empty_page(1)).unwrap();
        assert_eq!(json["Key"], UNSTRUCTURED_KEY);
        assert_eq!(json["Value"], "");
        assert_eq!(json["Comments"], "Empty page");
        assert_eq!(json["Source_Page"], 1);
    }
}
