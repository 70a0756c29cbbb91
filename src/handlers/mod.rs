//! HTTP endpoint handlers for the exporter.
//!
//! This module provides handlers for all HTTP endpoints:
//! - `/`: Landing page linking to the metrics endpoint
//! - `/metrics`: Prometheus metrics endpoint
//!
//! Any other path answers with a plain-text 404.

pub mod metrics;
pub mod root;

use axum::{routing::get, Router};

use crate::state::SharedState;

// Re-export handlers
pub use metrics::metrics_handler;
pub use root::{not_found_handler, root_handler};

/// Builds the exporter's router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .fallback(not_found_handler)
        .with_state(state)
}
