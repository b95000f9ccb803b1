//! Report execution host
//!
//! Loads configuration, sets up logging and dispatches report conversions to the
//! registered converters, turning failures into a displayable "report failed"
//! outcome instead of aborting a render.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod service;
pub mod telemetry;

pub use config::Config;
pub use error::{ErrorDetail, HostError, HostResult};
pub use service::{ReportOutcome, ReportService};

/// Load `.env` and configuration, initialise tracing and build the service.
pub fn bootstrap() -> anyhow::Result<ReportService> {
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    telemetry::init_tracing(&config.logging)?;

    tracing::info!("Starting report host");
    tracing::info!("Environment: {}", config.environment);

    let service = ReportService::new(Arc::new(config));
    tracing::info!(reports = ?service.report_codes(), "Registered report converters");

    Ok(service)
}
