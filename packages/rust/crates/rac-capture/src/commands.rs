//! Subcommand handlers for the `rac` binary.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;

use rac_capture::config::{DEFAULT_OUTPUT_DIR, DEFAULT_PROCESSED_FILE, DEFAULT_SOURCE_FILE};
use rac_capture::{
    CaptureConfig, CapturePipeline, LinkQueue, ProcessedLog, RunSummary, RuntimeSettings,
    LogHandle, build_analyzer,
};
use rac_scanner::{ArchiveFilter, ArchiveScanner, LintReport, LintSeverity};
use rac_types::DifficultyLevel;

/// Drain the queue file.
pub(crate) async fn run_queue(
    settings: RuntimeSettings,
    logs: &LogHandle,
) -> anyhow::Result<ExitCode> {
    let pipeline = build_pipeline(settings, logs)?;
    let summary = pipeline
        .run()
        .await
        .context("failed to read the source file")?;
    Ok(report_summary(&summary))
}

/// Capture URLs given on the command line; the queue file is left alone
/// except for removing these URLs if they are listed there.
pub(crate) async fn capture_urls(
    settings: RuntimeSettings,
    urls: &[String],
    logs: &LogHandle,
) -> anyhow::Result<ExitCode> {
    let pipeline = build_pipeline(settings, logs)?;
    let summary = pipeline.capture_urls(urls).await;
    Ok(report_summary(&summary))
}

fn build_pipeline(settings: RuntimeSettings, logs: &LogHandle) -> anyhow::Result<CapturePipeline> {
    let config = CaptureConfig::from_settings(settings).context("invalid capture settings")?;
    logs.attach_file(&config.log_file)?;
    tracing::debug!(
        event = "capture.config.resolved",
        source_file = %config.source_file.display(),
        output_dir = %config.output_dir.display(),
        delay_secs = config.delay_between_requests.as_secs(),
        max_retries = config.max_retries,
        "resolved capture config"
    );
    let analyzer = build_analyzer(&config.analyzer)?;
    Ok(CapturePipeline::new(&config, analyzer))
}

fn report_summary(summary: &RunSummary) -> ExitCode {
    if summary.total > 0 {
        println!(
            "Captured {}/{} URLs ({} failed, {} not attempted)",
            summary.processed.len(),
            summary.total,
            summary.failed.len(),
            summary.remaining
        );
    }
    if let Some(reason) = &summary.halted {
        eprintln!("Stopped: {reason}");
        return ExitCode::FAILURE;
    }
    if summary.interrupted {
        return ExitCode::from(130);
    }
    ExitCode::SUCCESS
}

/// Lint the archive; exits 1 when any error-severity issue is found.
pub(crate) fn lint(
    settings: &RuntimeSettings,
    dir: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let dir = archive_dir(settings, dir);
    let report = ArchiveScanner::new()
        .lint(&dir)
        .with_context(|| format!("failed to lint {}", dir.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_lint_report(&report);
    }
    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_lint_report(report: &LintReport) {
    for issue in &report.issues {
        let severity = match issue.severity {
            LintSeverity::Error => "error",
            LintSeverity::Warning => "warning",
        };
        println!("{}: {severity}: {}", issue.file_path, issue.kind);
    }
    println!(
        "{} files checked, {} errors, {} warnings",
        report.files_checked,
        report.error_count(),
        report.warning_count()
    );
}

/// Print tag or technology frequencies.
pub(crate) fn tags(
    settings: &RuntimeSettings,
    dir: Option<PathBuf>,
    technologies: bool,
    limit: usize,
) -> anyhow::Result<ExitCode> {
    let dir = archive_dir(settings, dir);
    let scanner = ArchiveScanner::new();
    let counts = if technologies {
        scanner.technology_counts(&dir)
    } else {
        scanner.tag_counts(&dir)
    }
    .with_context(|| format!("failed to scan {}", dir.display()))?;

    for (name, count) in counts.iter().take(limit) {
        println!("{count:>5}  {name}");
    }
    Ok(ExitCode::SUCCESS)
}

/// Filters for `rac list`.
pub(crate) struct ListRequest {
    pub(crate) dir: Option<PathBuf>,
    pub(crate) tags: Vec<String>,
    pub(crate) technologies: Vec<String>,
    pub(crate) difficulty: Option<DifficultyLevel>,
    pub(crate) domain: Option<String>,
    pub(crate) json: bool,
}

impl ListRequest {
    fn filter(&self) -> ArchiveFilter {
        let mut filter = ArchiveFilter::new();
        for tag in &self.tags {
            filter = filter.with_tag(tag.as_str());
        }
        for technology in &self.technologies {
            filter = filter.with_technology(technology.as_str());
        }
        if let Some(level) = self.difficulty {
            filter = filter.with_difficulty(level);
        }
        if let Some(domain) = &self.domain {
            filter = filter.with_domain(domain.as_str());
        }
        filter
    }
}

/// List archive documents matching the request.
pub(crate) fn list(settings: &RuntimeSettings, request: ListRequest) -> anyhow::Result<ExitCode> {
    let filter = request.filter();
    let dir = archive_dir(settings, request.dir);
    let entries = ArchiveScanner::new()
        .filter(&dir, &filter)
        .with_context(|| format!("failed to scan {}", dir.display()))?;

    if request.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(ExitCode::SUCCESS);
    }
    for entry in &entries {
        println!(
            "{}\t{}\t{}\t{}",
            entry.file_path,
            entry.record.difficulty_level,
            entry.record.title,
            entry.record.tags.join(", ")
        );
    }
    Ok(ExitCode::SUCCESS)
}

/// Queue, processed log and archive counts.
pub(crate) fn status(settings: RuntimeSettings) -> anyhow::Result<ExitCode> {
    let capture = settings.capture;
    let source_file = capture
        .source_file
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_FILE));
    let processed_file = capture
        .processed_file
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROCESSED_FILE));
    let output_dir = capture
        .output_dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    let pending = LinkQueue::new(&source_file).read()?;
    let processed = ProcessedLog::new(&processed_file).entries()?;
    let archived = if output_dir.exists() {
        ArchiveScanner::new().scan_all(&output_dir, None)?.len()
    } else {
        0
    };

    println!("Pending:   {:>5}  ({})", pending.len(), source_file.display());
    println!("Processed: {:>5}  ({})", processed.len(), processed_file.display());
    println!("Archived:  {:>5}  ({})", archived, output_dir.display());
    if let Some(last) = processed.last() {
        println!("Last capture: {} {}", last.captured_at, last.url);
    }
    Ok(ExitCode::SUCCESS)
}

fn archive_dir(settings: &RuntimeSettings, dir: Option<PathBuf>) -> PathBuf {
    dir.or_else(|| settings.capture.output_dir.clone())
        .unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_DIR).to_path_buf())
}
