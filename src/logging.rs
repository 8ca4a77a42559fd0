use crate::config::ShellConfig;
use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Send `tracing` output to the configured log file.
///
/// Nothing is installed without a filter, so the macros stay no-ops and the
/// terminal never sees log lines. Returns whether a subscriber was installed.
pub fn init(config: &ShellConfig) -> Result<bool> {
    let Some(directives) = config.log_filter.as_deref() else {
        return Ok(false);
    };

    let filter = EnvFilter::try_new(directives)
        .with_context(|| format!("invalid FLUSH_LOG filter '{}'", directives))?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("cannot open log file {}", config.log_file.display()))?;

    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_writer(Arc::new(log_file))
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {}", e))?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_no_filter_installs_nothing() {
        let config = ShellConfig {
            log_filter: None,
            ..ShellConfig::default()
        };
        assert!(!init(&config).unwrap());
    }

    #[test]
    fn test_bad_log_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = ShellConfig {
            log_filter: Some("debug".to_string()),
            log_file: dir.path().join("missing-dir").join("flush.log"),
            ..ShellConfig::default()
        };
        let err = init(&config).unwrap_err();
        assert!(err.to_string().contains("cannot open log file"));
    }
}
