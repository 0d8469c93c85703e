//! rac-capture - Capture web articles into the Markdown archive.
//!
//! # Architecture
//!
//! ```text
//! rac-capture/src/
//! ├── lib.rs          # Exports
//! ├── config/         # Layered YAML/env settings, resolved CaptureConfig
//! ├── error.rs        # FetchError, AnalyzerError, ConfigError, CaptureError
//! ├── fetch.rs        # PageFetcher: HTTP GET with bounded retries
//! ├── extract.rs      # Title, author, date and main content from HTML
//! ├── markdown.rs     # HTML to Markdown
//! ├── analyzer/       # ContentAnalyzer trait, prompt, reply parsing, backends
//! ├── writer.rs       # File naming and archive writes
//! ├── queue.rs        # LinkQueue and ProcessedLog
//! ├── pipeline.rs     # CapturePipeline: the capture run
//! └── logging.rs      # tracing-subscriber setup
//! ```
//!
//! The `rac` binary (`main.rs`, `cli.rs`, `commands.rs`) wires these together
//! with the archive reader from `rac-scanner`.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod markdown;
pub mod pipeline;
pub mod queue;
pub mod writer;

pub use analyzer::{
    ChatCompletionsAnalyzer, ContentAnalysis, ContentAnalyzer, GeminiAnalyzer, build_analyzer,
    build_prompt, parse_analysis,
};
pub use config::{
    AnalyzerConfig, AnalyzerProvider, CaptureConfig, RuntimeSettings, load_runtime_settings,
    load_runtime_settings_from_paths,
};
pub use error::{AnalyzerError, CaptureError, ConfigError, FetchError};
pub use extract::{ExtractedPage, extract_page};
pub use fetch::PageFetcher;
pub use logging::{LogHandle, init_logging};
pub use markdown::html_to_markdown;
pub use pipeline::{CapturePipeline, RunSummary};
pub use queue::{LinkQueue, ProcessedEntry, ProcessedLog};
pub use writer::{ArchiveWriter, archive_file_name};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
