//! Capture pipeline: fetch, extract, convert, analyze, write.
//!
//! URLs are handled one at a time with a politeness delay between them.
//! Fetch and write failures skip the URL; analyzer failures stop the run.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;

use crate::analyzer::ContentAnalyzer;
use crate::config::CaptureConfig;
use crate::error::CaptureError;
use crate::extract::extract_page;
use crate::fetch::PageFetcher;
use crate::markdown::html_to_markdown;
use crate::queue::{LinkQueue, ProcessedLog};
use crate::writer::ArchiveWriter;

/// Outcome of a capture run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// URLs the run started with
    pub total: usize,
    /// Archive files written
    pub processed: Vec<PathBuf>,
    /// URLs that failed and were skipped
    pub failed: Vec<String>,
    /// URLs never attempted
    pub remaining: usize,
    /// Analyzer error that stopped the run
    pub halted: Option<String>,
    /// Ctrl-C stopped the run
    pub interrupted: bool,
}

impl RunSummary {
    /// True when every URL was captured.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.remaining == 0 && self.halted.is_none() && !self.interrupted
    }
}

/// Drives captures from the queue into the archive.
pub struct CapturePipeline {
    fetcher: PageFetcher,
    analyzer: Box<dyn ContentAnalyzer>,
    writer: ArchiveWriter,
    queue: LinkQueue,
    processed_log: ProcessedLog,
    delay: Duration,
}

impl CapturePipeline {
    /// Assemble a pipeline from resolved config and an analyzer.
    #[must_use]
    pub fn new(config: &CaptureConfig, analyzer: Box<dyn ContentAnalyzer>) -> Self {
        Self {
            fetcher: PageFetcher::from_config(config),
            analyzer,
            writer: ArchiveWriter::new(&config.output_dir, config.category.as_str()),
            queue: LinkQueue::new(&config.source_file),
            processed_log: ProcessedLog::new(&config.processed_file),
            delay: config.delay_between_requests,
        }
    }

    /// Capture one URL, then log it and drop it from the queue.
    ///
    /// Once the document is written and logged the capture counts as done; a
    /// queue file that cannot be rewritten only produces a warning.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error; see [`CaptureError::is_fatal`].
    pub async fn process_url(&self, url: &str) -> Result<PathBuf, CaptureError> {
        tracing::info!("Processing: {url}");

        let html = self.fetcher.fetch(url).await?;
        let page = extract_page(&html, url);
        let markdown = html_to_markdown(&page.content_html);

        tracing::info!(
            provider = self.analyzer.name(),
            "Processing with analyzer..."
        );
        let analysis = self.analyzer.analyze(url, &markdown).await?;

        let now = Local::now().naive_local();
        let output_path = self.writer.write(url, &page, &analysis, now)?;
        tracing::info!("Created file: {}", output_path.display());

        self.processed_log.append(url, &output_path, now)?;
        if let Err(error) = self.queue.remove(url) {
            tracing::warn!(
                error = %error,
                "Captured {url} but could not remove it from the source file"
            );
        }
        Ok(output_path)
    }

    /// Process the queue file until it is drained, halted or Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error only if the queue file cannot be read.
    pub async fn run(&self) -> Result<RunSummary, CaptureError> {
        self.run_until(ctrl_c()).await
    }

    /// [`CapturePipeline::run`] with a custom shutdown signal.
    ///
    /// # Errors
    ///
    /// Returns an error only if the queue file cannot be read.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<RunSummary, CaptureError>
    where
        F: Future<Output = ()>,
    {
        let urls = self.queue.read()?;
        if urls.is_empty() {
            tracing::info!("No URLs to process");
            return Ok(RunSummary::default());
        }
        tracing::info!("Found {} URLs to process", urls.len());
        let summary = self.process_all(&urls, shutdown).await;
        tracing::info!(
            processed = summary.processed.len(),
            failed = summary.failed.len(),
            remaining = summary.remaining,
            "Processing complete"
        );
        Ok(summary)
    }

    /// Capture an explicit URL list with the same failure rules as a run.
    pub async fn capture_urls(&self, urls: &[String]) -> RunSummary {
        self.process_all(urls, ctrl_c()).await
    }

    async fn process_all<F>(&self, urls: &[String], shutdown: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let total = urls.len();
        let mut summary = RunSummary {
            total,
            ..RunSummary::default()
        };

        for (index, url) in urls.iter().enumerate() {
            let position = index + 1;
            tracing::info!("Processing URL {position}/{total}");

            let result = tokio::select! {
                result = self.process_url(url) => result,
                () = &mut shutdown => {
                    tracing::info!("Processing interrupted by user");
                    summary.interrupted = true;
                    summary.remaining = total - index;
                    return summary;
                }
            };

            match result {
                Ok(path) => {
                    tracing::info!("Successfully processed {url}");
                    summary.processed.push(path);
                }
                Err(error) if error.is_fatal() => {
                    tracing::error!("Error processing {url}: {error}");
                    tracing::error!("Stopping due to analyzer error");
                    summary.failed.push(url.clone());
                    summary.halted = Some(error.to_string());
                    summary.remaining = total - position;
                    return summary;
                }
                Err(error) => {
                    tracing::error!("Error processing {url}: {error}");
                    tracing::warn!("Failed to process {url}");
                    summary.failed.push(url.clone());
                }
            }

            if position < total && !self.delay.is_zero() {
                tracing::info!(
                    "Waiting {} seconds before next request...",
                    self.delay.as_secs_f64()
                );
                tokio::select! {
                    () = tokio::time::sleep(self.delay) => {}
                    () = &mut shutdown => {
                        tracing::info!("Processing interrupted by user");
                        summary.interrupted = true;
                        summary.remaining = total - position;
                        return summary;
                    }
                }
            }
        }
        summary
    }
}

async fn ctrl_c() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %error, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
