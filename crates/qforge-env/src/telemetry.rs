//! Tracing subscriber setup.
//!
//! `RUST_LOG`, when set and valid, takes precedence over the configured
//! level. Output is pretty console text or one JSON object per event.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::{LogFormat, LoggingConfig};

/// Build the level filter for a logging configuration.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed, in which case
/// the existing one is left in place.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let fmt_layer = match config.format {
        LogFormat::Console => fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .boxed(),
    };

    let installed = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(fmt_layer)
        .try_init()
        .is_ok();
    if installed {
        tracing::info!(format = ?config.format, "Tracing initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_noop() {
        let config = LoggingConfig {
            format: LogFormat::Json,
            ..LoggingConfig::default()
        };
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
