//! Tracing subscriber setup

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Filter used when RUST_LOG is unset.
pub fn default_filter(config: &LoggingConfig) -> String {
    format!(
        "report_host={level},report_convert={level}",
        level = config.level
    )
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(config.json.then(|| fmt::layer().json()))
        .with((!config.json).then(fmt::layer))
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_both_crates() {
        let config = LoggingConfig {
            level: "debug".into(),
            json: false,
        };
        assert_eq!(
            default_filter(&config),
            "report_host=debug,report_convert=debug"
        );
    }
}
