//! Extraction prompt for a single chunk

/// Placeholder replaced by the chunk text
pub const CHUNK_PLACEHOLDER: &str = "{chunk}";

/// Builds the prompt sent to the service for one chunk
pub struct PromptBuilder<'a> {
    chunk: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(chunk: &'a str) -> Self {
        Self { chunk }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        EXTRACTION_TEMPLATE.replace(CHUNK_PLACEHOLDER, self.chunk)
    }
}

const EXTRACTION_TEMPLATE: &str = r#"
You are a reliable extractor. The input is an English text chunk taken from a PDF page. Your task:
1) Identify every explicit or implicit key:value pair present in the text.
2) Preserve the original wording of keys and values.
3) Return each pair as an object with the fields "key", "value" and "comments".
4) If the content cannot form key:value pairs, return a single object with key="__UNSTRUCTURED__" and value set to the full chunk.
Output JSON only.
Chunk:{chunk}
"#;
