//! Logging initialization.
//!
//! Two outputs are installed:
//! - a daily rolling file `<dir>/specbundle.<date>.log`, text or JSON lines
//! - compact logs on stdout
//!
//! `RUST_LOG` takes precedence over the configured level.

use std::path::Path;
use std::sync::OnceLock;

use anyhow::Context;
use specbundle_core::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps the non-blocking file writer alive for the life of the process.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_FILE_PREFIX: &str = "specbundle";
const LOG_FILE_SUFFIX: &str = "log";

/// Initialize logging, writing files under `log_dir`.
///
/// Call once, at startup.
///
/// # Errors
///
/// Returns an error if the filter cannot be parsed, the log directory cannot
/// be created, or a global subscriber is already installed.
pub fn init(settings: &LoggingSettings, log_dir: &Path) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .with_context(|| format!("invalid log level '{}'", settings.level))?;

    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender(log_dir)?);

    let json_layer = settings.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(file_writer.clone())
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
    });

    let text_layer = (!settings.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(file_writer)
            .with_target(true)
            .with_ansi(false)
    });

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(stdout_layer)
        .try_init()
        .context("logging already initialized")?;

    let _ = FILE_GUARD.set(file_guard);

    tracing::debug!(dir = %log_dir.display(), json = settings.json, "Logging initialized");
    Ok(())
}

/// Daily rolling appender in `dir`, creating the directory if needed.
fn file_appender(dir: &Path) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(dir)
        .context("cannot open log file")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_appender_creates_directory() {
        let root = tempfile::TempDir::new().unwrap();
        let dir = root.path().join("logs");
        assert!(!dir.exists());

        file_appender(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_log_file_naming() {
        use std::io::Write;

        let root = tempfile::TempDir::new().unwrap();
        let mut appender = file_appender(root.path()).unwrap();
        appender.write_all(b"hello\n").unwrap();
        appender.flush().unwrap();

        let names: Vec<String> = std::fs::read_dir(root.path())
            .unwrap()
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("specbundle."));
        assert!(names[0].ends_with(".log"));
    }
}
