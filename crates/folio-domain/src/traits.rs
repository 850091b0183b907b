//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction core and its
//! collaborators. Implementations live in other crates.

use crate::page::PageText;
use std::future::Future;
use std::path::Path;

/// One prompt sent to a text-generation service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Model identifier understood by the provider
    pub model: String,

    /// Fully rendered prompt
    pub prompt: String,
}

impl GenerationRequest {
    /// Create a new request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
        }
    }
}

/// A reply from a text-generation service, in whatever shape it arrived.
///
/// Services disagree on where the generated text lives. Providers fill in
/// the fields they have and leave the rest empty; callers decide how to
/// reduce the reply to a single string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReply {
    /// Direct text field, when the service exposes one
    pub text: Option<String>,

    /// Candidate fragments, when the service returns several
    pub candidates: Vec<CandidateFragment>,

    /// The whole reply rendered as a string
    pub raw: String,
}

impl GenerationReply {
    /// Reply that only carries a direct text field
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            raw: text.clone(),
            text: Some(text),
            candidates: Vec::new(),
        }
    }
}

/// One candidate of a multi-candidate reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFragment {
    /// Candidate content
    pub content: Option<String>,

    /// Alternate text field some services use instead of `content`
    pub text: Option<String>,
}

/// Trait for text-generation providers
///
/// Implemented by the infrastructure layer (folio-llm). A provider is
/// constructed once per run and passed to the extractor explicitly.
pub trait LlmProvider {
    /// Error type for provider operations
    type Error: std::fmt::Display;

    /// Send one prompt and wait for the reply
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<GenerationReply, Self::Error>> + Send;
}

/// Trait for turning a document into per-page text
///
/// Implemented by the document layer (folio-cli)
pub trait PageSource {
    /// Error type for document reading
    type Error;

    /// Read every page of the document at `path`, in order
    fn pages(&self, path: &Path) -> Result<Vec<PageText>, Self::Error>;
}
