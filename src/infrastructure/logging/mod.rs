//! Tracing subscriber initialization driven by the loaded configuration.
//!
//! The configured level becomes the filter's default directive, so `RUST_LOG`
//! still overrides it per target. Output goes to stderr so command results on
//! stdout stay machine-readable.

use std::io;

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::domain::models::LoggingConfig;

/// Initialize the global subscriber from config (level + json/pretty format).
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = build_filter(config)?;

    match config.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_filter(env_filter),
            )
            .try_init()?,
        _ => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .with_filter(env_filter),
            )
            .try_init()?,
    }

    Ok(())
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let default_level = parse_log_level(&config.level)?;
    Ok(EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy())
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {level}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert!(matches!(parse_log_level("trace"), Ok(Level::TRACE)));
        assert!(matches!(parse_log_level("debug"), Ok(Level::DEBUG)));
        assert!(matches!(parse_log_level("info"), Ok(Level::INFO)));
        assert!(matches!(parse_log_level("warn"), Ok(Level::WARN)));
        assert!(matches!(parse_log_level("error"), Ok(Level::ERROR)));
        assert!(matches!(parse_log_level("WARN"), Ok(Level::WARN)));
        assert!(parse_log_level("verbose").is_err());
    }

    #[test]
    fn test_build_filter_defaults_to_configured_level() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        };
        let filter = build_filter(&config).unwrap();
        assert!(filter.to_string().contains("debug"));
    }

    #[test]
    fn test_build_filter_rejects_unknown_level() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            format: "pretty".to_string(),
        };
        assert!(build_filter(&config).is_err());
    }

    // Note: this initializes the process-global subscriber, so only one init
    // test can exist in this binary.
    #[test]
    fn test_init_logging_with_default_config() {
        assert!(init_logging(&LoggingConfig::default()).is_ok());
    }
}
