//! Landing page and fallback handlers.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};
use tracing::{debug, instrument};

/// Body of the landing page.
pub const ROOT_PAGE: &str = r#"<html>PM2 metrics: <a href="/metrics">/metrics</a></html>"#;

/// Handler for the / endpoint.
#[instrument]
pub async fn root_handler() -> Html<&'static str> {
    debug!("Processing / request");
    Html(ROOT_PAGE)
}

/// Handler for every path without a route.
pub async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "404")
}
