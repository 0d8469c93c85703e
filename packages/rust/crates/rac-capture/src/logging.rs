//! Tracing subscriber setup: stderr plus an optional plain-text log file.
//!
//! The subscriber is installed before settings are loaded so that settings
//! warnings reach stderr. The log file path comes from those settings, so the
//! file layer starts empty and is filled in through [`LogHandle::attach_file`].

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, reload};

use crate::error::ConfigError;

type FileLayer = tracing_subscriber::fmt::Layer<Registry, DefaultFields, Format, Mutex<File>>;

/// Default filter when `RUST_LOG` is unset.
#[must_use]
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "rac=debug,rac_capture=debug,rac_scanner=debug"
    } else {
        "rac=info,rac_capture=info,rac_scanner=info"
    }
}

/// Handle to the reloadable log file layer.
#[derive(Clone)]
pub struct LogHandle {
    file: reload::Handle<Option<FileLayer>, Registry>,
}

impl LogHandle {
    /// Start appending events to `path` without ANSI colors.
    ///
    /// Parent directories are created. When the subscriber this handle
    /// belongs to was never installed, the file is opened but nothing is
    /// written to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be opened.
    pub fn attach_file(&self, path: &Path) -> Result<(), ConfigError> {
        let log_file_error = |source| ConfigError::LogFile {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(log_file_error)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(log_file_error)?;
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file));
        if let Err(err) = self.file.reload(Some(layer)) {
            tracing::debug!(error = %err, "log file layer not attached");
        }
        Ok(())
    }
}

/// Build the subscriber without installing it.
fn build_subscriber(verbose: bool) -> (impl Subscriber + Send + Sync + 'static, LogHandle) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    let (file_layer, file) = reload::Layer::new(None::<FileLayer>);
    let subscriber = tracing_subscriber::registry()
        .with(file_layer)
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    (subscriber, LogHandle { file })
}

/// Install the global stderr subscriber.
///
/// `RUST_LOG` overrides the filter. A second call leaves the first
/// subscriber in place and returns a handle that attaches nothing.
#[must_use]
pub fn init_logging(verbose: bool) -> LogHandle {
    let (subscriber, handle) = build_subscriber(verbose);
    let _ = subscriber.try_init();
    handle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert!(default_filter(true).contains("rac_capture=debug"));
        assert!(default_filter(false).contains("rac_scanner=info"));
    }

    #[test]
    fn test_log_file_created() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs/capture.log");
        init_logging(false).attach_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_file_attached_after_startup_logging() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("capture.log");
        let (subscriber, handle) = build_subscriber(false);

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("settings warning before the file is known");
            handle.attach_file(&path).unwrap();
            tracing::info!("capture started");
        });

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("capture started"), "{written}");
        assert!(!written.contains("settings warning"), "{written}");
        assert!(!written.contains("\u{1b}["), "{written}");
    }
}
