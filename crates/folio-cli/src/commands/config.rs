//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::{Path, PathBuf};

/// Execute the config command.
///
/// `path` is the `--config` override, if any.
pub fn execute_config(
    args: ConfigArgs,
    config: &Config,
    path: Option<&Path>,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            println!("{}", show_config(config, formatter.format())?);
        }
        ConfigAction::Init { force } => {
            let written = init_config(path, force)?;
            println!(
                "{}",
                formatter.success(&format!("Wrote default configuration to {}", written.display()))
            );
        }
    }
    Ok(())
}

/// Render the effective configuration.
fn show_config(config: &Config, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(config)?),
        OutputFormat::Table | OutputFormat::Quiet => config.to_toml(),
    }
}

/// Write a default configuration file, refusing to overwrite unless `force`.
fn init_config(path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let target = match path {
        Some(p) => p.to_path_buf(),
        None => Config::default_path()?,
    };

    if target.exists() && !force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            target.display()
        )));
    }

    Config::default().save(Some(&target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let written = init_config(Some(&path), false).unwrap();
        assert_eq!(written, path);
        assert_eq!(Config::load(Some(&path)).unwrap(), Config::default());
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings]\ncolor = false\n").unwrap();

        assert!(matches!(init_config(Some(&path), false), Err(CliError::InvalidInput(_))));
        assert!(!Config::load(Some(&path)).unwrap().settings.color);

        init_config(Some(&path), true).unwrap();
        assert!(Config::load(Some(&path)).unwrap().settings.color);
    }

    #[test]
    fn test_show_formats() {
        let config = Config::default();

        let toml_text = show_config(&config, OutputFormat::Table).unwrap();
        assert!(toml_text.contains("[extractor]"));
        assert!(toml_text.contains("api_key_env"));

        let json_text = show_config(&config, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json_text).unwrap();
        assert_eq!(value["extractor"]["max_chunk_chars"], 1800);
    }
}
