//! The artifact produced by one pipeline run

use crate::page::PageText;
use crate::row::Row;
use serde::{Deserialize, Serialize};

/// Complete output of one pipeline execution.
///
/// `rows` is ordered page → chunk → item. `page_backup` holds every page's
/// raw text, whether or not any of its chunks succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Structured and sentinel rows
    pub rows: Vec<Row>,

    /// Raw text of every processed page
    pub page_backup: Vec<PageText>,
}

/// Run-level counters handed to persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Number of rows in the structured table (sentinel rows included)
    pub num_structured_rows: usize,

    /// Number of pages processed
    pub num_pages: usize,
}

impl RunResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters for the metrics table
    pub fn metrics(&self) -> RunMetrics {
        RunMetrics {
            num_structured_rows: self.rows.len(),
            num_pages: self.page_backup.len(),
        }
    }

    /// Number of sentinel rows
    pub fn sentinel_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_sentinel()).count()
    }

    /// Rows derived from a given page
    pub fn rows_for_page(&self, page_number: u32) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(move |r| r.source_page == page_number)
    }
}
