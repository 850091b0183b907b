//! Single-call wrapper around the extraction service

use crate::error::ServiceError;
use crate::prompt::PromptBuilder;
use crate::reply::{default_normalizers, ReplyNormalizer};
use folio_domain::{GenerationReply, GenerationRequest, LlmProvider};
use tracing::debug;

/// Builds the prompt for a chunk, calls the provider once, and reduces the
/// reply to text
pub struct ExtractionGateway<L: LlmProvider> {
    provider: L,
    normalizers: Vec<Box<dyn ReplyNormalizer>>,
}

impl<L: LlmProvider> ExtractionGateway<L> {
    /// Create a gateway over an already constructed provider
    pub fn new(provider: L) -> Self {
        Self {
            provider,
            normalizers: default_normalizers(),
        }
    }

    /// Create a gateway with a custom normalizer list, tried in order
    pub fn with_normalizers(provider: L, normalizers: Vec<Box<dyn ReplyNormalizer>>) -> Self {
        Self {
            provider,
            normalizers,
        }
    }

    /// The wrapped provider
    pub fn provider(&self) -> &L {
        &self.provider
    }

    /// Extract from one chunk, returning the service's reply text
    pub async fn call(&self, chunk: &str, model: &str) -> Result<String, ServiceError> {
        let prompt = PromptBuilder::new(chunk).build();
        debug!("Prompt length: {} chars", prompt.len());

        let request = GenerationRequest::new(model, prompt);
        let reply = self
            .provider
            .generate(&request)
            .await
            .map_err(ServiceError::new)?;

        Ok(self.normalize(&reply))
    }

    fn normalize(&self, reply: &GenerationReply) -> String {
        self.normalizers
            .iter()
            .find_map(|normalizer| {
                let text = normalizer.normalize(reply)?;
                debug!("Reply read via {} ({} chars)", normalizer.name(), text.len());
                Some(text)
            })
            // Only reachable without a catch-all normalizer; the parser then fails on ""
            .unwrap_or_default()
    }
}
