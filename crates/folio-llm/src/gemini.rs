//! Gemini Provider Implementation
//!
//! Provides integration with Google's Generative Language API
//! (`models/{model}:generateContent`).
//!
//! # Features
//!
//! - Async HTTP communication via `reqwest`
//! - Configurable endpoint, timeout and retry count
//! - API key taken from the environment
//!
//! # Examples
//!
//! ```no_run
//! use folio_llm::GeminiProvider;
//!
//! let provider = GeminiProvider::from_env(&["GEMINI_API_KEY", "GOOGLE_API_KEY"]).unwrap();
//! ```

use crate::LlmError;
use folio_domain::{CandidateFragment, GenerationReply, GenerationRequest, LlmProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Generative Language API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default timeout for a single request (2 minutes)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of attempts per call; the pipeline itself never retries
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Gemini API provider
pub struct GeminiProvider {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
}

/// Request body for the generateContent API
#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Response from the generateContent API
#[derive(Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,

    #[serde(default, rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

/// Present when the prompt itself was rejected
#[derive(Deserialize, Default)]
struct PromptFeedback {
    #[serde(default, rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Default)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl CandidateContent {
    fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .concat()
    }
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: API base URL (e.g., "https://generativelanguage.googleapis.com")
    /// - `api_key`: API key sent with every request
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new Gemini provider with an explicit client timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Create a provider against the default endpoint, reading the key from
    /// the first of `key_vars` that is set and non-empty
    pub fn from_env(key_vars: &[&str]) -> Result<Self, LlmError> {
        let api_key = api_key_from_env(key_vars)?;
        Self::new(DEFAULT_ENDPOINT, api_key)
    }

    /// Set the maximum number of attempts per call
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    fn url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.endpoint, model, self.api_key
        )
    }

    /// Send one prompt to the generateContent API
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The network request fails or times out
    /// - The model does not exist (HTTP 404)
    /// - The quota is exhausted (HTTP 429)
    /// - The body is not a generateContent response
    pub async fn generate_content(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationReply, LlmError> {
        let url = self.url(&request.model);
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
        };

        // Retry logic with exponential backoff
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            debug!("Gemini request to model {} (attempt {})", request.model, attempts + 1);

            match self.client.post(&url).json(&body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let text = response.text().await.map_err(|e| {
                            LlmError::InvalidResponse(format!("Failed to read response: {}", e))
                        })?;
                        return decode_reply(&text);
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(request.model.clone()));
                    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(LlmError::RateLimitExceeded);
                    } else {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    // reqwest embeds the URL (and with it the key) in its messages
                    last_error = Some(LlmError::Communication(format!(
                        "Request failed: {}",
                        e.without_url()
                    )));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!("Gemini call failed, retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

impl LlmProvider for GeminiProvider {
    type Error = LlmError;

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationReply, Self::Error> {
        self.generate_content(request).await
    }
}

/// Read an API key from the first set, non-empty variable in `key_vars`
pub fn api_key_from_env(key_vars: &[&str]) -> Result<String, LlmError> {
    key_vars
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
        .ok_or_else(|| LlmError::MissingApiKey(key_vars.join(" or ")))
}

/// Decode a generateContent response body into a [`GenerationReply`]
///
/// `text` mirrors the first candidate's concatenated parts; every candidate
/// also appears as a fragment. The body itself is kept as `raw`.
///
/// A body without candidates (a blocked prompt) is an
/// [`LlmError::InvalidResponse`], never an empty reply.
pub fn decode_reply(body: &str) -> Result<GenerationReply, LlmError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    if response.candidates.is_empty() {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!(" (prompt blocked: {})", r))
            .unwrap_or_default();
        return Err(LlmError::InvalidResponse(format!(
            "No candidates in response{}",
            reason
        )));
    }

    let candidates: Vec<CandidateFragment> = response
        .candidates
        .iter()
        .map(|c| CandidateFragment {
            content: c
                .content
                .as_ref()
                .map(CandidateContent::joined_text)
                .filter(|t| !t.is_empty()),
            text: None,
        })
        .collect();

    let text = candidates.first().and_then(|c| c.content.clone());

    Ok(GenerationReply {
        text,
        candidates,
        raw: body.to_string(),
    })
}
