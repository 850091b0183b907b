//! Folio LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `folio-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Scripted mock for testing
//! - `GeminiProvider`: Google Generative Language API integration
//!
//! # Examples
//!
//! ```
//! use folio_llm::MockProvider;
//! use folio_domain::{GenerationRequest, LlmProvider};
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new("[]");
//! let reply = provider
//!     .generate(&GenerationRequest::new("any-model", "test prompt"))
//!     .await
//!     .unwrap();
//! assert_eq!(reply.text.as_deref(), Some("[]"));
//! # });
//! ```

#![warn(missing_docs)]

pub mod gemini;

use folio_domain::{GenerationReply, GenerationRequest, LlmProvider};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use gemini::GeminiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// No API key in the environment
    #[error("Missing API key: set {0}")]
    MissingApiKey(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(GenerationReply),
    Error(String),
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured replies without making any network calls. Rules
/// match on a fragment of the prompt, so a test can script the reply for a
/// specific chunk; the first matching rule wins and unmatched prompts get
/// the default reply.
///
/// # Examples
///
/// ```
/// use folio_llm::MockProvider;
/// use folio_domain::{GenerationRequest, LlmProvider};
///
/// # tokio_test::block_on(async {
/// let mut provider = MockProvider::new("[]");
/// provider.add_response("Alice", r#"[{"key":"Name","value":"Alice","comments":""}]"#);
/// provider.add_error("Bob", "quota exhausted");
///
/// let alice = provider.generate(&GenerationRequest::new("m", "Chunk: Alice")).await.unwrap();
/// assert!(alice.text.unwrap().contains("Name"));
/// assert!(provider.generate(&GenerationRequest::new("m", "Chunk: Bob")).await.is_err());
/// assert_eq!(provider.call_count(), 2);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_reply: GenerationReply,
    rules: Arc<Mutex<Vec<(String, Scripted)>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed text reply for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_default_reply(GenerationReply::from_text(response))
    }

    /// Create a new MockProvider whose default reply has an arbitrary shape
    pub fn with_default_reply(reply: GenerationReply) -> Self {
        Self {
            default_reply: reply,
            rules: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with `response` to any prompt containing `fragment`
    pub fn add_response(&mut self, fragment: impl Into<String>, response: impl Into<String>) {
        self.add_reply(fragment, GenerationReply::from_text(response));
    }

    /// Reply with a fully shaped reply to any prompt containing `fragment`
    pub fn add_reply(&mut self, fragment: impl Into<String>, reply: GenerationReply) {
        lock(&self.rules).push((fragment.into(), Scripted::Reply(reply)));
    }

    /// Fail with `message` for any prompt containing `fragment`
    pub fn add_error(&mut self, fragment: impl Into<String>, message: impl Into<String>) {
        lock(&self.rules).push((fragment.into(), Scripted::Error(message.into())));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<GenerationRequest> {
        lock(&self.requests).clone()
    }

    /// Forget recorded requests
    pub fn reset_call_count(&self) {
        lock(&self.requests).clear();
    }

    fn respond(&self, request: &GenerationRequest) -> Result<GenerationReply, LlmError> {
        lock(&self.requests).push(request.clone());

        let rules = lock(&self.rules);
        let matched = rules
            .iter()
            .find(|(fragment, _)| request.prompt.contains(fragment.as_str()))
            .map(|(_, scripted)| scripted.clone());

        match matched {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Error(message)) => Err(LlmError::Communication(message)),
            None => Ok(self.default_reply.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("[]")
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationReply, Self::Error> {
        self.respond(request)
    }
}

// A panicking test must not poison the mock for the assertions that follow.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::CandidateFragment;

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest::new("test-model", prompt)
    }

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let reply = provider.generate(&request("any prompt")).await.unwrap();
        assert_eq!(reply.text.as_deref(), Some("Test response"));
        assert_eq!(reply.raw, "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_fragment_rules() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        let hello = provider.generate(&request("say hello")).await.unwrap();
        let foo = provider.generate(&request("foo!")).await.unwrap();
        let other = provider.generate(&request("unknown")).await.unwrap();
        assert_eq!(hello.text.as_deref(), Some("world"));
        assert_eq!(foo.text.as_deref(), Some("bar"));
        assert_eq!(other.text.as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_mock_provider_first_rule_wins() {
        let mut provider = MockProvider::default();
        provider.add_response("abc", "first");
        provider.add_response("ab", "second");

        let reply = provider.generate(&request("xxabcxx")).await.unwrap();
        assert_eq!(reply.text.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_mock_provider_records_requests() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);
        provider.generate(&request("prompt1")).await.unwrap();
        provider.generate(&request("prompt2")).await.unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.requests()[1].prompt, "prompt2");
        assert_eq!(provider.requests()[1].model, "test-model");

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad", "connection reset");

        let result = provider.generate(&request("bad prompt")).await;
        match result {
            Err(LlmError::Communication(msg)) => assert_eq!(msg, "connection reset"),
            other => panic!("Expected Communication error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mock_provider_shaped_reply() {
        let mut provider = MockProvider::default();
        provider.add_reply(
            "shaped",
            GenerationReply {
                text: None,
                candidates: vec![CandidateFragment {
                    content: Some("[]".to_string()),
                    text: None,
                }],
                raw: "{...}".to_string(),
            },
        );

        let reply = provider.generate(&request("shaped")).await.unwrap();
        assert!(reply.text.is_none());
        assert_eq!(reply.candidates.len(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate(&request("test")).await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
