//! Cold-start suppression for the event loop latency percentile.
//!
//! Right after the exporter starts, the p95 event loop latency reported by
//! applications is dominated by startup work. For the first
//! [`WARMUP_WINDOW_SECS`] seconds that one series is exported as zero.

use chrono::{DateTime, Duration, Utc};

/// Series whose value is masked during warm-up.
pub const SUPPRESSED_METRIC: &str = "pm2_event_loop_latency_p95";

/// Length of the warm-up window, inclusive.
pub const WARMUP_WINDOW_SECS: i64 = 45;

/// Process-wide warm-up gate.
///
/// Holds the instant the exporter started. It is captured once in `main`
/// and only read afterwards, so it is `Copy` and shared by value.
#[derive(Debug, Clone, Copy)]
pub struct WarmupSuppressor {
    started_at: DateTime<Utc>,
}

impl WarmupSuppressor {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self { started_at }
    }

    /// Starts the window now.
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Last instant at which the window is still open.
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.started_at + Duration::seconds(WARMUP_WINDOW_SECS)
    }

    pub fn should_suppress(&self, canonical_name: &str, now: DateTime<Utc>) -> bool {
        canonical_name == SUPPRESSED_METRIC
            && now - self.started_at <= Duration::seconds(WARMUP_WINDOW_SECS)
    }

    /// Returns the value to export for `canonical_name` at `now`.
    pub fn apply(&self, canonical_name: &str, value: f64, now: DateTime<Utc>) -> f64 {
        if self.should_suppress(canonical_name, now) {
            0.0
        } else {
            value
        }
    }
}
