//! Items returned by the extraction service

use crate::row::Row;

/// One key/value fact identified by the extraction service.
///
/// Never persisted on its own: the pipeline projects it into a [`Row`]
/// as soon as it is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedItem {
    /// Key as worded in the source text
    pub key: String,

    /// Value as worded in the source text
    pub value: String,

    /// Free-form remarks from the service
    pub comments: String,
}

impl ExtractedItem {
    /// Create a new item
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        comments: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            comments: comments.into(),
        }
    }

    /// Project this item into an output row for the given page
    pub fn into_row(self, source_page: u32) -> Row {
        Row {
            key: self.key,
            value: self.value,
            comments: self.comments,
            source_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_row_keeps_fields() {
        let row = ExtractedItem::new("Name", "Alice", "from header").into_row(4);
        assert_eq!(row.key, "Name");
        assert_eq!(row.value, "Alice");
        assert_eq!(row.comments, "from header");
        assert_eq!(row.source_page, 4);
        assert!(!row.is_sentinel());
    }
}
