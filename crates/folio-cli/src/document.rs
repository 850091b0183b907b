//! Reading input documents into per-page text.

use crate::error::{CliError, Result};
use folio_domain::{PageSource, PageText};
use lopdf::Document;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Page separator emitted by pdftotext.
pub const FORM_FEED: char = '\x0c';

/// Reads PDF files page by page with lopdf.
///
/// A page whose text cannot be extracted yields an empty page rather than an
/// error, so numbering stays aligned with the document.
pub struct PdfPageSource;

impl PageSource for PdfPageSource {
    type Error = CliError;

    fn pages(&self, path: &Path) -> Result<Vec<PageText>> {
        let doc = Document::load(path)
            .map_err(|e| CliError::Document(format!("Failed to load PDF {}: {}", path.display(), e)))?;

        // get_pages is keyed by 1-based page number
        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        debug!("{} has {} pages", path.display(), page_numbers.len());

        Ok(page_numbers
            .into_iter()
            .map(|number| {
                let text = doc.extract_text(&[number]).unwrap_or_else(|e| {
                    warn!("No text extracted from page {}: {}", number, e);
                    String::new()
                });
                PageText::new(number, text)
            })
            .collect())
    }
}

/// Reads plain-text files whose pages are separated by form feeds.
pub struct TextPageSource;

impl TextPageSource {
    /// Split text into pages, numbered from 1
    ///
    /// A trailing form feed does not start a new page, and empty text has no
    /// pages at all.
    pub fn split_pages(text: &str) -> Vec<PageText> {
        if text.is_empty() {
            return Vec::new();
        }

        let text = text.strip_suffix(FORM_FEED).unwrap_or(text);
        text.split(FORM_FEED)
            .enumerate()
            .map(|(idx, page)| PageText::new(idx as u32 + 1, page))
            .collect()
    }
}

impl PageSource for TextPageSource {
    type Error = CliError;

    fn pages(&self, path: &Path) -> Result<Vec<PageText>> {
        let text = fs::read_to_string(path)?;
        Ok(Self::split_pages(&text))
    }
}

/// Read the pages of `path`, choosing the reader by file extension.
pub fn read_pages(path: &Path) -> Result<Vec<PageText>> {
    if !path.is_file() {
        return Err(CliError::InputNotFound(path.to_path_buf()));
    }

    if is_pdf(path) {
        PdfPageSource.pages(path)
    } else {
        TextPageSource.pages(path)
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
