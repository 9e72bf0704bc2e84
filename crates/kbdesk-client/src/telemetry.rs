//! Tracing subscriber setup.
//!
//! Environment variables:
//!   KBDESK_LOG_FORMAT - "json" or "text" (default: "text")
//!   KBDESK_LOG_FILE   - path to log file (optional, enables daily-rotated file logging)
//!   RUST_LOG          - standard env filter (default: "kbdesk=info")

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kbdesk_core::{defaults, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(Error::Config(format!("unknown log format: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl TelemetryConfig {
    pub fn from_env() -> Result<Self> {
        let format = match std::env::var(defaults::ENV_LOG_FORMAT) {
            Ok(value) => value.parse()?,
            Err(_) => LogFormat::default(),
        };
        let file = std::env::var(defaults::ENV_LOG_FILE)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        Ok(Self { format, file })
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes file output on drop and must be held for the
/// life of the process. Fails if a subscriber is already installed.
pub fn init_tracing(config: &TelemetryConfig) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(defaults::LOG_FILTER));
    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = match &config.file {
        Some(path) => {
            let (dir, file_name) = split_log_path(path);
            let file_appender = tracing_appender::rolling::daily(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let result = match config.format {
                LogFormat::Json => registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(non_blocking),
                    )
                    .try_init(),
                LogFormat::Text => registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(non_blocking)
                            .with_ansi(false),
                    )
                    .try_init(),
            };
            result.map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
            Some(guard)
        }
        None => {
            let result = match config.format {
                LogFormat::Json => registry
                    .with(tracing_subscriber::fmt::layer().json())
                    .try_init(),
                LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init(),
            };
            result.map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
            None
        }
    };

    let log_file = config
        .file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(stdout)".to_string());
    info!(log_format = ?config.format, log_file = %log_file, "Logging initialized");
    Ok(guard)
}

fn split_log_path(path: &Path) -> (&Path, &str) {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("kbdesk.log");
    (dir, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_split_log_path() {
        assert_eq!(
            split_log_path(Path::new("/var/log/kbdesk/client.log")),
            (Path::new("/var/log/kbdesk"), "client.log")
        );
        assert_eq!(split_log_path(Path::new("client.log")), (Path::new("."), "client.log"));
    }

    #[test]
    fn test_default_config_is_stdout_text() {
        let config = TelemetryConfig::default();
        assert_eq!(config.format, LogFormat::Text);
        assert!(config.file.is_none());
    }
}
