//! Core Extractor implementation: the per-page, per-chunk pipeline driver

use crate::chunking::TextChunker;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::gateway::ExtractionGateway;
use crate::parser::ResponseParser;
use crate::types::{ChunkOutcome, PageProgress, ParsedElement};
use folio_domain::{LlmProvider, PageText, Row, RunResult};
use std::time::Instant;
use tracing::{debug, info, warn};

/// The Extractor turns document pages into key/value rows
///
/// Pages are processed one at a time and chunks within a page one at a
/// time. Chunk-level failures become sentinel rows; the only error a run can
/// return is [`ExtractorError::NoPages`].
pub struct Extractor<L: LlmProvider> {
    gateway: ExtractionGateway<L>,
    chunker: TextChunker,
    parser: ResponseParser,
    config: ExtractorConfig,
}

impl<L: LlmProvider> Extractor<L> {
    /// Create a new Extractor over a provider constructed for this run
    pub fn new(provider: L, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        Ok(Self {
            gateway: ExtractionGateway::new(provider),
            chunker: TextChunker::new(config.max_chunk_chars),
            parser: ResponseParser::new(),
            config,
        })
    }

    /// Override the model named in the configuration
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The wrapped provider
    pub fn provider(&self) -> &L {
        self.gateway.provider()
    }

    /// Process every page and collect the rows
    pub async fn run(&self, pages: &[PageText]) -> Result<RunResult, ExtractorError> {
        self.run_with_observer(pages, |_| {}).await
    }

    /// Process every page, reporting progress after each one
    pub async fn run_with_observer<F>(
        &self,
        pages: &[PageText],
        mut on_page: F,
    ) -> Result<RunResult, ExtractorError>
    where
        F: FnMut(&PageProgress),
    {
        if pages.is_empty() {
            return Err(ExtractorError::NoPages);
        }

        let start_time = Instant::now();
        info!(
            "Starting extraction of {} pages with model '{}'",
            pages.len(),
            self.config.model
        );

        let mut result = RunResult::new();

        for (idx, page) in pages.iter().enumerate() {
            let rows_before = result.rows.len();
            let (chunks, failed_chunks) = self.process_page(page, &mut result).await;

            let progress = PageProgress {
                page_number: page.page_number,
                pages_done: idx + 1,
                pages_total: pages.len(),
                chunks,
                rows: result.rows.len() - rows_before,
                failed_chunks,
            };
            info!(
                "Page {} ({}/{}): {} chunks, {} rows, {} failed",
                progress.page_number,
                progress.pages_done,
                progress.pages_total,
                progress.chunks,
                progress.rows,
                progress.failed_chunks
            );
            on_page(&progress);
        }

        info!(
            "Extraction complete: {} rows ({} unstructured) from {} pages in {} ms",
            result.rows.len(),
            result.sentinel_count(),
            result.page_backup.len(),
            start_time.elapsed().as_millis()
        );

        Ok(result)
    }

    /// Process one page, returning (chunk count, failed chunk count)
    async fn process_page(&self, page: &PageText, result: &mut RunResult) -> (usize, usize) {
        result.page_backup.push(page.clone());

        let chunks = self.chunker.chunk(&page.text);
        if chunks.is_empty() {
            debug!("Page {} is empty", page.page_number);
            result.rows.push(Row::empty_page(page.page_number));
            return (0, 0);
        }

        debug!("Page {} split into {} chunks", page.page_number, chunks.len());

        let mut failed = 0;
        for (idx, chunk) in chunks.iter().enumerate() {
            debug!(
                "Processing page {} chunk {}/{}",
                page.page_number,
                idx + 1,
                chunks.len()
            );

            let outcome = self.process_chunk(chunk, page.page_number).await;
            if !outcome.is_success() {
                failed += 1;
            }
            result.rows.extend(outcome.into_rows());

            self.pause().await;
        }

        (chunks.len(), failed)
    }

    /// Drive one chunk to its terminal state
    async fn process_chunk(&self, chunk: &str, page_number: u32) -> ChunkOutcome {
        let raw_reply = match self.gateway.call(chunk, &self.config.model).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Page {}: {}", page_number, e);
                return ChunkOutcome::ServiceFailed(Row::service_failure(
                    chunk,
                    &e.to_string(),
                    page_number,
                ));
            }
        };

        debug!("Reply length: {} chars", raw_reply.len());

        match self.parser.parse(&raw_reply) {
            Ok(elements) if elements.is_empty() => {
                warn!("Page {}: reply held no items", page_number);
                ChunkOutcome::Success(vec![Row::no_items(chunk, page_number)])
            }
            Ok(elements) => ChunkOutcome::Success(
                elements
                    .into_iter()
                    .map(|element| ParsedElement::classify(element).into_row(page_number))
                    .collect(),
            ),
            Err(e) => {
                warn!("Page {}: unusable reply ({} chars)", page_number, raw_reply.len());
                debug!("{}", e);
                ChunkOutcome::ParseFailed(Row::parse_failure(chunk, &raw_reply, page_number))
            }
        }
    }

    async fn pause(&self) {
        let delay = self.config.chunk_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::UNSTRUCTURED_KEY;
    use folio_llm::MockProvider;

    fn create_test_extractor(provider: MockProvider) -> Extractor<MockProvider> {
        Extractor::new(provider, ExtractorConfig::fast()).unwrap()
    }

    #[tokio::test]
    async fn test_no_pages_is_fatal() {
        let extractor = create_test_extractor(MockProvider::default());
        let result = extractor.run(&[]).await;
        assert!(matches!(result, Err(ExtractorError::NoPages)));
        assert_eq!(extractor.provider().call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = ExtractorConfig {
            max_chunk_chars: 0,
            ..ExtractorConfig::fast()
        };
        let result = Extractor::new(MockProvider::default(), config);
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }

    #[tokio::test]
    async fn test_empty_page_skips_service() {
        let extractor = create_test_extractor(MockProvider::default());
        let result = extractor.run(&[PageText::new(1, "")]).await.unwrap();

        assert_eq!(result.rows, vec![Row::empty_page(1)]);
        assert_eq!(result.page_backup, vec![PageText::new(1, "")]);
        assert_eq!(extractor.provider().call_count(), 0);
    }

    #[tokio::test]
    async fn test_service_error_becomes_row() {
        let mut provider = MockProvider::default();
        provider.add_error("Chunk:X", "transport closed");
        let extractor = create_test_extractor(provider);

        let result = extractor.run(&[PageText::new(1, "X")]).await.unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].key, UNSTRUCTURED_KEY);
        assert_eq!(result.rows[0].value, "X");
        assert!(result.rows[0].comments.starts_with("Model error:"));
        assert!(result.rows[0].comments.contains("transport closed"));
    }

    #[tokio::test]
    async fn test_model_override_reaches_provider() {
        let provider = MockProvider::default();
        let extractor = create_test_extractor(provider.clone()).with_model("gemini-2.5-pro");
        extractor.run(&[PageText::new(1, "a: b")]).await.unwrap();

        assert_eq!(provider.requests()[0].model, "gemini-2.5-pro");
        assert_eq!(extractor.config().model, "gemini-2.5-pro");
    }

    #[tokio::test]
    async fn test_observer_called_per_page() {
        let mut provider = MockProvider::default();
        provider.add_error("broken", "boom");
        let extractor = create_test_extractor(provider);
        let pages = vec![
            PageText::new(1, "fine"),
            PageText::new(2, ""),
            PageText::new(3, "broken"),
        ];

        let mut seen = Vec::new();
        extractor
            .run_with_observer(&pages, |p| seen.push(*p))
            .await
            .unwrap();

        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].pages_done, 1);
        assert_eq!(seen[0].pages_total, 3);
        assert_eq!(seen[0].rows, 1);
        assert_eq!(seen[0].failed_chunks, 0);
        assert_eq!(seen[1].chunks, 0);
        assert_eq!(seen[1].rows, 1);
        assert_eq!(seen[2].page_number, 3);
        assert_eq!(seen[2].failed_chunks, 1);
        assert_eq!(seen[2].rows, 1);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_page_progress_logged_at_info() {
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let extractor = create_test_extractor(MockProvider::default());
        extractor
            .run(&[PageText::new(1, "a: b"), PageText::new(2, "")])
            .await
            .unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("INFO"));
        assert!(output.contains("Page 1 (1/2): 1 chunks, 1 rows, 0 failed"));
        assert!(output.contains("Page 2 (2/2): 0 chunks, 1 rows, 0 failed"));
    }
}
