//! Folio Extractor
//!
//! Converts document pages into key/value rows using a text-generation service.
//!
//! # Overview
//!
//! Each page is split into bounded-size chunks along paragraph boundaries.
//! Every chunk is sent to the service with an extraction prompt, and the
//! reply is parsed into key/value items. Whatever happens to a chunk, it
//! leaves at least one row behind: failures are recorded as
//! `__UNSTRUCTURED__` rows carrying the chunk text and a diagnostic.
//!
//! # Architecture
//!
//! ```text
//! PageText → TextChunker → ExtractionGateway → LLM → ResponseParser → Row
//! ```
//!
//! # Example Usage
//!
//! ```
//! use folio_domain::PageText;
//! use folio_extractor::{Extractor, ExtractorConfig};
//! use folio_llm::MockProvider;
//!
//! # tokio_test::block_on(async {
//! let llm = MockProvider::new(r#"[{"key":"Name","value":"Alice","comments":""}]"#);
//! let extractor = Extractor::new(llm, ExtractorConfig::fast()).unwrap();
//!
//! let pages = vec![PageText::new(1, "Name: Alice"), PageText::new(2, "")];
//! let result = extractor.run(&pages).await.unwrap();
//!
//! assert_eq!(result.rows.len(), 2);
//! assert_eq!(result.rows[0].key, "Name");
//! assert_eq!(result.rows[1].comments, "Empty page");
//! assert_eq!(result.page_backup.len(), 2);
//! # });
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod error;
mod extractor;
mod gateway;
mod parser;
mod prompt;
mod reply;
mod types;


pub use chunking::{paragraphs, TextChunker, PARAGRAPH_SEPARATOR};
pub use config::{ExtractorConfig, DEFAULT_CHUNK_DELAY_MS, DEFAULT_MAX_CHUNK_CHARS, DEFAULT_MODEL};
pub use error::{ExtractorError, ParseError, ServiceError};
pub use extractor::Extractor;
pub use gateway::ExtractionGateway;
pub use parser::{BracketScoped, RecoveryStage, ResponseParser, StrictJson, PARSE_ERROR_EXCERPT_CHARS};
pub use prompt::PromptBuilder;
pub use reply::{CandidateFragments, DirectText, ReplyNormalizer, Stringify};
pub use types::{ChunkOutcome, PageProgress, ParsedElement};
