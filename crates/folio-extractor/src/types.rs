//! Intermediate types flowing through the pipeline

use folio_domain::{ExtractedItem, Row};
use serde_json::{Map, Value};

/// One element of a parsed reply, validated for shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedElement {
    /// A key/value object
    Item(ExtractedItem),

    /// Anything else, rendered as text
    Invalid(String),
}

impl ParsedElement {
    /// Classify a reply element.
    ///
    /// Objects become items; missing or null fields read as empty strings and
    /// other non-string fields keep their JSON text. Every other value is
    /// invalid.
    pub fn classify(element: Value) -> Self {
        match element {
            Value::Object(fields) => ParsedElement::Item(ExtractedItem {
                key: field_text(&fields, "key"),
                value: field_text(&fields, "value"),
                comments: field_text(&fields, "comments"),
            }),
            other => ParsedElement::Invalid(value_text(&other)),
        }
    }

    /// Project into an output row
    pub fn into_row(self, source_page: u32) -> Row {
        match self {
            ParsedElement::Item(item) => item.into_row(source_page),
            ParsedElement::Invalid(text) => Row::invalid_item(text, source_page),
        }
    }
}

fn field_text(fields: &Map<String, Value>, name: &str) -> String {
    match fields.get(name) {
        None | Some(Value::Null) => String::new(),
        Some(value) => value_text(value),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Terminal state of one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Reply parsed; one row per element
    Success(Vec<Row>),

    /// Service call failed; one sentinel row
    ServiceFailed(Row),

    /// Reply unusable; one sentinel row
    ParseFailed(Row),
}

impl ChunkOutcome {
    /// Whether the chunk reached the success state
    pub fn is_success(&self) -> bool {
        matches!(self, ChunkOutcome::Success(_))
    }

    /// Rows contributed by this chunk
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            ChunkOutcome::Success(rows) => rows,
            ChunkOutcome::ServiceFailed(row) | ChunkOutcome::ParseFailed(row) => vec![row],
        }
    }
}

/// Progress report emitted after each page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    /// Page just finished
    pub page_number: u32,

    /// Pages finished so far, this one included
    pub pages_done: usize,

    /// Pages in the run
    pub pages_total: usize,

    /// Chunks the page was split into
    pub chunks: usize,

    /// Rows the page contributed
    pub rows: usize,

    /// Chunks that ended in a service or parse failure
    pub failed_chunks: usize,
}
