//! Raw page text produced by the document layer

use serde::{Deserialize, Serialize};

/// Text of a single document page.
///
/// Produced once per page by a [`PageSource`](crate::traits::PageSource) and
/// never mutated afterwards. An empty `text` is a zero-content page, not an
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-based page number
    #[serde(rename = "page")]
    pub page_number: u32,

    /// Raw text of the page (possibly empty)
    pub text: String,
}

impl PageText {
    /// Create a new page
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_domain::PageText;
    ///
    /// let page = PageText::new(1, "Name: Alice");
    /// assert_eq!(page.page_number, 1);
    /// assert!(!page.is_blank());
    /// ```
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }

    /// Whether the page has no visible content
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
