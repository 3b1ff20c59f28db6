// Logging setup.
// Writes tracing output to a file so it never draws over the terminal UI.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cache::paths;
use crate::config::LogConfig;
use crate::error::{DocsError, Result};

/// Log files larger than this are truncated at startup.
const MAX_LOG_BYTES: u64 = 8 * 1024 * 1024;

/// Build the filter: `RUST_LOG` wins over the configured level.
pub fn env_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| DocsError::Config(format!("invalid log level '{}': {}", level, e))),
    }
}

/// Where logs go: the configured file, or `docview.log` in the cache directory.
pub fn log_file(config: &LogConfig) -> Option<PathBuf> {
    config.file.clone().or_else(paths::log_path)
}

/// Install the global subscriber. Keep the returned guard alive until exit.
///
/// Returns `Ok(None)` when there is nowhere to write logs.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = env_filter(&config.level)?;
    let Some(path) = log_file(config) else {
        return Ok(None);
    };
    let (directory, file_name) = split_log_path(&path)?;
    fs::create_dir_all(directory)?;
    let truncated = truncate_if_large(&path, MAX_LOG_BYTES);

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .try_init()
        .map_err(|e| DocsError::Config(format!("failed to install logger: {}", e)))?;

    tracing::info!(path = %path.display(), "logging initialized");
    match truncated {
        Ok(true) => tracing::info!(max_bytes = MAX_LOG_BYTES, "truncated oversized log file"),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "could not truncate log file"),
    }
    Ok(Some(guard))
}

fn split_log_path(path: &Path) -> Result<(&Path, &std::ffi::OsStr)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| DocsError::Config(format!("invalid log file '{}'", path.display())))?;
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok((directory, file_name))
}

/// Empty the file in place when it exceeds `max_bytes`. Returns whether it was truncated.
fn truncate_if_large(path: &Path, max_bytes: u64) -> io::Result<bool> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if !metadata.is_file() || metadata.len() <= max_bytes {
        return Ok(false);
    }
    OpenOptions::new().write(true).truncate(true).open(path)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_log_path() {
        let (dir, name) = split_log_path(Path::new("/tmp/docview/docview.log")).unwrap();
        assert_eq!(dir, Path::new("/tmp/docview"));
        assert_eq!(name, "docview.log");

        let (dir, name) = split_log_path(Path::new("docview.log")).unwrap();
        assert_eq!(dir, Path::new("."));
        assert_eq!(name, "docview.log");

        assert!(split_log_path(Path::new("/")).is_err());
    }

    #[test]
    fn test_configured_file_wins() {
        let config = LogConfig {
            level: "debug".to_string(),
            file: Some(PathBuf::from("/var/log/docview.log")),
        };
        assert_eq!(log_file(&config), Some(PathBuf::from("/var/log/docview.log")));
    }

    #[test]
    fn test_truncate_if_large_keeps_small_files() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("docview.log");
        fs::write(&path, "line\n").unwrap();

        assert!(!truncate_if_large(&path, MAX_LOG_BYTES).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "line\n");
    }

    #[test]
    fn test_truncate_if_large_empties_file_in_place() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("docview.log");
        fs::write(&path, "0123456789").unwrap();

        assert!(truncate_if_large(&path, 4).unwrap());
        assert!(path.exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_truncate_if_large_missing_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.log");
        assert!(!truncate_if_large(&path, 4).unwrap());
    }
}
