//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use folio_extractor::ExtractorConfig;
use folio_llm::gemini::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Variable consulted when the configured key variable is unset.
pub const FALLBACK_API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Load `.env` files into the process environment.
///
/// Searches from the working directory upward, then beside the executable.
/// Variables that are already set are never overridden. Returns the files
/// that were loaded.
pub fn load_env_files() -> Vec<PathBuf> {
    let mut loaded: Vec<PathBuf> = dotenvy::dotenv().ok().into_iter().collect();

    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(".env")));
    if let Some(path) = beside_exe.filter(|p| !loaded.contains(p)) {
        loaded.extend(load_env_from(&[path]));
    }
    loaded
}

/// Load each existing file in `candidates`, skipping unreadable ones.
pub fn load_env_from(candidates: &[PathBuf]) -> Vec<PathBuf> {
    candidates
        .iter()
        .filter(|path| path.is_file())
        .filter(|path| dotenvy::from_path(path).is_ok())
        .cloned()
        .collect()
}

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Pipeline settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Gemini connection settings
    #[serde(default)]
    pub gemini: GeminiSettings,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Gemini connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiSettings {
    /// API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// HTTP client timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".folio").join("config.toml"))
    }

    /// Load configuration from `path`, or the default location when `None`.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`, or the default location when `None`.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, self.to_toml()?)?;
        Ok(path)
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Check values that cannot be expressed in the type system.
    pub fn validate(&self) -> Result<()> {
        self.extractor.validate().map_err(CliError::Config)?;
        if self.gemini.endpoint.trim().is_empty() {
            return Err(CliError::Config("gemini.endpoint cannot be empty".into()));
        }
        if self.gemini.timeout_secs == 0 {
            return Err(CliError::Config("gemini.timeout_secs must be greater than 0".into()));
        }
        Ok(())
    }

    /// Environment variables to search for the API key, in order.
    pub fn api_key_vars(&self) -> Vec<&str> {
        let mut vars = vec![self.gemini.api_key_env.as_str()];
        if self.gemini.api_key_env != FALLBACK_API_KEY_ENV {
            vars.push(FALLBACK_API_KEY_ENV);
        }
        vars
    }

    /// HTTP client timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.gemini.timeout_secs)
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
