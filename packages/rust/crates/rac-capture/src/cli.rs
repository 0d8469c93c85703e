use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use rac_capture::config::{AnalyzerSettings, CaptureSettings, LoggingSettings};
use rac_capture::RuntimeSettings;
use rac_types::DifficultyLevel;

#[derive(Parser)]
#[command(name = "rac", version)]
#[command(about = "Capture web articles into a Markdown archive with YAML front matter.")]
pub(crate) struct Cli {
    /// Project settings file (default: rac.yaml in the working directory).
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Overrides shared by `run` and `capture`.
#[derive(Args, Debug, Default)]
pub(crate) struct CaptureArgs {
    /// Archive directory (default: processed_documents)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,

    /// Processed log (default: processed_links.txt)
    #[arg(long)]
    pub(crate) processed: Option<PathBuf>,

    /// Seconds to wait between URLs (default: 5)
    #[arg(long)]
    pub(crate) delay: Option<u64>,

    /// Extra fetch attempts after a retryable failure (default: 3)
    #[arg(long)]
    pub(crate) max_retries: Option<u32>,

    /// Analyzer backend: gemini or chat (default: gemini)
    #[arg(long)]
    pub(crate) provider: Option<String>,

    /// Analyzer model
    #[arg(long)]
    pub(crate) model: Option<String>,

    /// Log file (default: capture.log)
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,
}

impl CaptureArgs {
    /// Settings layer holding only the flags given on the command line.
    pub(crate) fn into_settings(self, source: Option<PathBuf>) -> RuntimeSettings {
        RuntimeSettings {
            capture: CaptureSettings {
                source_file: source,
                output_dir: self.output,
                processed_file: self.processed,
                delay_between_requests_secs: self.delay,
                max_retries: self.max_retries,
                ..CaptureSettings::default()
            },
            analyzer: AnalyzerSettings {
                provider: self.provider,
                model: self.model,
                ..AnalyzerSettings::default()
            },
            logging: LoggingSettings {
                file: self.log_file,
            },
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Capture every URL in the queue file, removing each one once archived.
    Run {
        /// Queue file (default: source_links.txt)
        #[arg(long)]
        source: Option<PathBuf>,

        #[command(flatten)]
        capture: CaptureArgs,
    },
    /// Capture the given URLs now.
    Capture {
        /// URLs to capture
        #[arg(required = true)]
        urls: Vec<String>,

        #[command(flatten)]
        capture: CaptureArgs,
    },
    /// Check every archive document; exits 1 when errors are found.
    Lint {
        /// Archive directory (default: configured output directory)
        dir: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Tag (or technology) frequencies across the archive.
    Tags {
        /// Archive directory (default: configured output directory)
        dir: Option<PathBuf>,

        /// Count technologies instead of tags
        #[arg(long)]
        technologies: bool,

        /// Show at most this many rows
        #[arg(long, default_value_t = 25)]
        limit: usize,
    },
    /// List archive documents, optionally filtered.
    List {
        /// Archive directory (default: configured output directory)
        dir: Option<PathBuf>,

        /// Keep documents with this tag (repeatable, any matches)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Keep documents using this technology (repeatable, any matches)
        #[arg(long = "technology")]
        technologies: Vec<String>,

        /// Keep documents at this difficulty (beginner, intermediate, advanced or unknown)
        #[arg(long, value_parser = parse_difficulty)]
        difficulty: Option<DifficultyLevel>,

        /// Keep documents from this domain
        #[arg(long)]
        domain: Option<String>,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Pending URLs, processed captures and archived documents.
    Status,
    /// Print the JSON Schema of the document front matter.
    Schema,
}

/// Case-insensitive level name; `unknown` selects unclassified documents.
fn parse_difficulty(raw: &str) -> Result<DifficultyLevel, String> {
    let level = raw.parse::<DifficultyLevel>().unwrap_or_default();
    if level.is_known() || raw.trim().eq_ignore_ascii_case("unknown") {
        Ok(level)
    } else {
        Err(format!(
            "unrecognized difficulty `{raw}` (expected beginner, intermediate, advanced or unknown)"
        ))
    }
}
