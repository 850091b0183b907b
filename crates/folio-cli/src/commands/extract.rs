//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::{Config, OutputFormat};
use crate::document;
use crate::error::Result;
use crate::output::{Formatter, Workbook};
use folio_domain::{LlmProvider, PageText, RunResult};
use folio_extractor::{Extractor, ExtractorConfig, PageProgress};
use folio_llm::gemini::api_key_from_env;
use folio_llm::GeminiProvider;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Execute the extract command.
pub async fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let extractor_config = effective_config(&args, &config.extractor);

    let pages = document::read_pages(&args.input)?;
    info!("Read {} pages from {}", pages.len(), args.input.display());

    let api_key = api_key_from_env(&config.api_key_vars())?;
    let provider = GeminiProvider::with_timeout(&config.gemini.endpoint, api_key, config.timeout())?;

    let show_progress = formatter.format() == OutputFormat::Table;
    let result = run_pipeline(provider, &pages, extractor_config, show_progress).await?;

    let workbook = Workbook::from_run(&result);
    workbook.write(&args.output)?;
    info!("Saved {} rows to {}", workbook.structured.len(), args.output.display());

    println!("{}", formatter.format_run(&workbook, &args.output)?);

    let unstructured = result.sentinel_count();
    if unstructured > 0 && formatter.format() == OutputFormat::Table {
        println!(
            "{}",
            formatter.warning(&format!(
                "{} of {} rows are {}",
                unstructured,
                result.rows.len(),
                folio_domain::UNSTRUCTURED_KEY
            ))
        );
    }

    Ok(())
}

/// Apply command-line overrides on top of the configured pipeline settings.
fn effective_config(args: &ExtractArgs, base: &ExtractorConfig) -> ExtractorConfig {
    let mut config = base.clone();
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(max_chunk_chars) = args.max_chunk_chars {
        config.max_chunk_chars = max_chunk_chars;
    }
    if let Some(delay_ms) = args.delay_ms {
        config.chunk_delay_ms = delay_ms;
    }
    config
}

/// Run the pipeline over `pages`, advancing a progress bar once per page.
async fn run_pipeline<L: LlmProvider>(
    provider: L,
    pages: &[PageText],
    config: ExtractorConfig,
    show_progress: bool,
) -> Result<RunResult> {
    let extractor = Extractor::new(provider, config)?;

    let progress = if show_progress {
        progress_bar(pages.len() as u64)
    } else {
        ProgressBar::hidden()
    };

    let result = extractor
        .run_with_observer(pages, |p: &PageProgress| {
            progress.set_position(p.pages_done as u64);
            progress.set_message(format!(
                "page {}: {} rows, {} failed chunks",
                p.page_number, p.rows, p.failed_chunks
            ));
        })
        .await;

    progress.finish_and_clear();
    Ok(result?)
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::DEFAULT_OUTPUT;
    use folio_extractor::ExtractorError;
    use folio_llm::MockProvider;
    use std::path::PathBuf;

    fn args(model: Option<&str>, max_chunk_chars: Option<usize>, delay_ms: Option<u64>) -> ExtractArgs {
        ExtractArgs {
            input: PathBuf::from("doc.pdf"),
            output: PathBuf::from(DEFAULT_OUTPUT),
            model: model.map(String::from),
            max_chunk_chars,
            delay_ms,
        }
    }

    #[test]
    fn test_effective_config_without_overrides() {
        let base = ExtractorConfig::conservative();
        assert_eq!(effective_config(&args(None, None, None), &base), base);
    }

    #[test]
    fn test_effective_config_overrides() {
        let config = effective_config(
            &args(Some("gemini-2.5-pro"), Some(500), Some(0)),
            &ExtractorConfig::default(),
        );
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.max_chunk_chars, 500);
        assert_eq!(config.chunk_delay_ms, 0);
    }

    #[tokio::test]
    async fn test_run_pipeline_into_workbook() {
        let llm = MockProvider::new(r#"[{"key":"Name","value":"Alice","comments":""}]"#);
        let pages = vec![PageText::new(1, "Name: Alice"), PageText::new(2, " ")];

        let result = run_pipeline(llm, &pages, ExtractorConfig::fast(), false)
            .await
            .unwrap();
        let workbook = Workbook::from_run(&result);

        assert_eq!(workbook.structured.len(), 2);
        assert_eq!(workbook.structured[0].value, "Alice");
        assert_eq!(workbook.structured[1].comments, "Empty page");
        assert_eq!(workbook.raw_pages, pages);
        assert_eq!(workbook.metrics[0].num_pages, 2);
    }

    #[tokio::test]
    async fn test_run_pipeline_no_pages() {
        let result = run_pipeline(MockProvider::default(), &[], ExtractorConfig::fast(), false).await;
        assert!(matches!(
            result,
            Err(crate::CliError::Extractor(ExtractorError::NoPages))
        ));
    }

    #[tokio::test]
    async fn test_run_pipeline_rejects_bad_override() {
        let config = effective_config(&args(None, Some(0), None), &ExtractorConfig::fast());
        let result = run_pipeline(MockProvider::default(), &[PageText::new(1, "x")], config, false).await;
        assert!(matches!(
            result,
            Err(crate::CliError::Extractor(ExtractorError::Config(_)))
        ));
    }
}
