//! Metrics endpoint handler for Prometheus scraping.
//!
//! Every request runs a full scrape cycle against the process manager and
//! returns the result in Prometheus text format.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use prometheus::TEXT_FORMAT;
use tracing::{debug, error, instrument};

use crate::error::ScrapeError;
use crate::state::SharedState;

/// Error type for metrics endpoint failures.
#[derive(Debug)]
pub enum MetricsError {
    CollectorUnavailable,
    EncodingFailed,
}

impl From<ScrapeError> for MetricsError {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::CollectorUnavailable(_) => MetricsError::CollectorUnavailable,
            ScrapeError::Registry(_) | ScrapeError::Encoding(_) => MetricsError::EncodingFailed,
        }
    }
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> Response {
        match self {
            MetricsError::CollectorUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Process manager unavailable",
            )
                .into_response(),
            MetricsError::EncodingFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics",
            )
                .into_response(),
        }
    }
}

/// Handler for the /metrics endpoint.
#[instrument(skip(state))]
pub async fn metrics_handler(State(state): State<SharedState>) -> Result<Response, MetricsError> {
    debug!("Processing /metrics request");

    let output = state.scraper.scrape().await.map_err(|e| {
        if !matches!(e, ScrapeError::CollectorUnavailable(_)) {
            error!("Failed to render metrics: {}", e);
        }
        MetricsError::from(e)
    })?;

    debug!(
        "Metrics request completed: {} processes, {} unparsable, {} malformed",
        output.processes, output.report.unparsable, output.report.malformed
    );

    Ok(([(header::CONTENT_TYPE, TEXT_FORMAT)], output.body).into_response())
}
