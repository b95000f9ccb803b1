//! Configuration management for the report host
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with REPORTS_ prefix

use std::collections::HashMap;

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
use report_convert::reports::default_sort;
use report_convert::{all_converters, NullPlacement, SortDirection, SortSpec};
use serde::Deserialize;

/// Main host configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Per-report conversion defaults
    pub reports: ReportsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default filter level when RUST_LOG is unset
    pub level: String,

    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

/// Default ordering for one report
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SortDefaults {
    pub sort: String,
    pub dir: SortDirection,
}

impl From<&SortDefaults> for SortSpec {
    fn from(defaults: &SortDefaults) -> Self {
        SortSpec::new(defaults.sort.clone(), defaults.dir)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportsConfig {
    /// Where lines without a sort key are placed
    pub null_placement: NullPlacement,

    pub inventory_adjustments: SortDefaults,
    pub item_usage: SortDefaults,
    pub expiring_items: SortDefaults,
    pub stock_detail: SortDefaults,

    /// Defaults for additionally registered reports, keyed by report code
    #[serde(default)]
    pub custom: HashMap<String, SortDefaults>,
}

impl ReportsConfig {
    /// Default ordering for the report registered under `code`.
    pub fn default_sort(&self, code: &str) -> Option<SortSpec> {
        let defaults = match code {
            "inventory-adjustments" => &self.inventory_adjustments,
            "item-usage" => &self.item_usage,
            "expiring-items" => &self.expiring_items,
            "stock-detail" => &self.stock_detail,
            other => self.custom.get(other)?,
        };
        Some(defaults.into())
    }
}

impl Config {
    /// Builder seeded with the code defaults for `environment`.
    pub fn builder_with_defaults(
        environment: &str,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("environment", environment)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("reports.null_placement", NullPlacement::default().as_str())?;

        // Report sections are named after the code, e.g. `reports.item_usage`
        for converter in all_converters() {
            let code = converter.code();
            let Some(spec) = default_sort(code) else {
                continue;
            };
            let section = code.replace('-', "_");
            builder = builder
                .set_default(format!("reports.{}.sort", section), spec.key)?
                .set_default(format!("reports.{}.dir", section), spec.direction.as_str())?;
        }
        Ok(builder)
    }

    /// Code defaults only, ignoring files and environment
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder_with_defaults("development")?
            .build()?
            .try_deserialize()
    }

    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("REPORTS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self::builder_with_defaults(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (REPORTS_ prefix)
            .add_source(
                Environment::with_prefix("REPORTS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
