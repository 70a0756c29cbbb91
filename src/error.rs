//! Error types for the exporter.
//!
//! Failures are contained at the smallest possible scope: a single metric
//! value, then a single process record, then the whole scrape.

use thiserror::Error;

/// Errors that abort one scrape cycle.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The process list could not be retrieved from the process manager.
    #[error("process manager unavailable: {0}")]
    CollectorUnavailable(String),

    /// The per-scrape registry could not be seeded.
    #[error("metric registry error: {0}")]
    Registry(#[from] MetricError),

    /// The populated registry could not be rendered.
    #[error("failed to encode metrics: {0}")]
    Encoding(String),
}

/// Errors scoped to a single metric observation or process record.
#[derive(Debug, Error)]
pub enum MetricError {
    /// A raw value did not parse to a finite number.
    #[error("metric \"{name}\" has non-numeric value {raw}")]
    UnparsableMetricValue { name: String, raw: String },

    /// A process record or metric definition could not be used.
    #[error("malformed metric record: {0}")]
    MalformedMetricRecord(String),
}

impl From<prometheus::Error> for MetricError {
    fn from(err: prometheus::Error) -> Self {
        MetricError::MalformedMetricRecord(err.to_string())
    }
}
