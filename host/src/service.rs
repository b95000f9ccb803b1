//! Report dispatch and export
//!
//! Looks up the converter registered for a report code, builds its context from
//! configuration and runs it. Converters are stateless so one service can be
//! shared across threads.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use report_convert::accessor::get;
use report_convert::{all_converters, ConvertContext, ReportConverter, ReportData};
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::{ErrorDetail, HostError, HostResult};

/// Result of a render request, suitable for handing straight to a template.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    Rendered { report: String, output: ReportData },
    Failed { report: String, error: ErrorDetail },
}

impl ReportOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, ReportOutcome::Rendered { .. })
    }
}

pub struct ReportService {
    converters: HashMap<&'static str, Box<dyn ReportConverter>>,
    config: Arc<Config>,
}

impl ReportService {
    /// Service with every built-in report registered
    pub fn new(config: Arc<Config>) -> Self {
        let mut service = Self {
            converters: HashMap::new(),
            config,
        };
        for converter in all_converters() {
            service.register(converter);
        }
        service
    }

    /// Register a converter, replacing any previous one with the same code.
    pub fn register(&mut self, converter: Box<dyn ReportConverter>) {
        let code = converter.code();
        if self.converters.insert(code, converter).is_some() {
            tracing::warn!(report = code, "Replaced existing report converter");
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registered report codes, sorted
    pub fn report_codes(&self) -> Vec<&'static str> {
        let mut codes: Vec<_> = self.converters.keys().copied().collect();
        codes.sort_unstable();
        codes
    }

    /// Conversion context for `code` at reference time `now`
    pub fn context_for(&self, code: &str, now: DateTime<Utc>) -> HostResult<ConvertContext> {
        let default_sort = self
            .config
            .reports
            .default_sort(code)
            .ok_or_else(|| HostError::MissingSortDefaults(code.to_string()))?;

        Ok(ConvertContext::new(now, default_sort)
            .with_null_placement(self.config.reports.null_placement))
    }

    pub fn generate(&self, code: &str, input: &ReportData) -> HostResult<ReportData> {
        self.generate_at(code, input, Utc::now())
    }

    /// Convert `input` with expiry calculations evaluated at `now`.
    pub fn generate_at(
        &self,
        code: &str,
        input: &ReportData,
        now: DateTime<Utc>,
    ) -> HostResult<ReportData> {
        let converter = self
            .converters
            .get(code)
            .ok_or_else(|| HostError::UnknownReport(code.to_string()))?;
        let ctx = self.context_for(code, now)?;

        tracing::info!(report = code, "Generating report");
        let output = converter.convert(input, &ctx)?;
        Ok(output)
    }

    /// Like [`generate_at`](Self::generate_at) but never fails: errors become a
    /// `Failed` outcome carrying the error detail.
    pub fn generate_outcome(
        &self,
        code: &str,
        input: &ReportData,
        now: DateTime<Utc>,
    ) -> ReportOutcome {
        match self.generate_at(code, input, now) {
            Ok(output) => ReportOutcome::Rendered {
                report: code.to_string(),
                output,
            },
            Err(error) => {
                tracing::error!(report = code, error = %error, "Report conversion failed");
                ReportOutcome::Failed {
                    report: code.to_string(),
                    error: error.detail(),
                }
            }
        }
    }

    /// JSON in, JSON out, for hosts that exchange serialized report data.
    pub fn generate_json(&self, code: &str, input_json: &str) -> HostResult<String> {
        let input: ReportData = serde_json::from_str(input_json)?;
        let output = self.generate(code, &input)?;
        Ok(serde_json::to_string(&output)?)
    }

    /// Export converted lines as CSV.
    ///
    /// `columns` pairs a header with the key path read from each line. Missing
    /// values become empty cells.
    pub fn export_to_csv(lines: &[Value], columns: &[(&str, &str)]) -> HostResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(columns.iter().map(|(header, _)| *header))
            .map_err(|e| HostError::Export(format!("CSV header error: {}", e)))?;

        for line in lines {
            wtr.write_record(columns.iter().map(|(_, path)| csv_cell(get(line, path))))
                .map_err(|e| HostError::Export(format!("CSV serialization error: {}", e)))?;
        }

        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| HostError::Export(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| HostError::Export(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

fn csv_cell(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
