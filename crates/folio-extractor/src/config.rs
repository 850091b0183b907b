//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default maximum chunk size (characters)
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 1800;

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default pause after each chunk (milliseconds)
pub const DEFAULT_CHUNK_DELAY_MS: u64 = 200;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum chunk size (characters)
    pub max_chunk_chars: usize,

    /// Model identifier passed to the provider
    pub model: String,

    /// Pause after each chunk to stay under the service rate limit (milliseconds)
    pub chunk_delay_ms: u64,
}

impl ExtractorConfig {
    /// Get the inter-chunk delay as a Duration
    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chunk_chars == 0 {
            return Err("max_chunk_chars must be greater than 0".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration matching the service's free-tier pacing
    fn default() -> Self {
        Self {
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            model: DEFAULT_MODEL.to_string(),
            chunk_delay_ms: DEFAULT_CHUNK_DELAY_MS,
        }
    }
}

impl ExtractorConfig {
    /// Fast preset: no throttling, for paid tiers and local mocks
    pub fn fast() -> Self {
        Self {
            chunk_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Conservative preset: smaller chunks and a longer pause between calls
    pub fn conservative() -> Self {
        Self {
            max_chunk_chars: 1000,
            chunk_delay_ms: 1000,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
