//! One full scrape cycle: fetch, translate, render.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

use crate::error::ScrapeError;
use crate::process::ProcessStatus;
use crate::provider::ProcessSnapshotProvider;
use crate::registry::MetricRegistry;
use crate::translator::{translate, TranslationReport};
use crate::warmup::WarmupSuppressor;

/// Rendered exposition of one scrape plus what went into it.
#[derive(Debug, Clone)]
pub struct ScrapeOutput {
    pub body: String,
    pub processes: usize,
    /// Metric families in the body, static ones included.
    pub metrics: usize,
    pub report: TranslationReport,
}

/// Drives scrape cycles against a process list provider.
///
/// Holds no per-scrape state: every call builds its own registry, so
/// concurrent scrapes do not interfere.
#[derive(Clone)]
pub struct Scraper {
    provider: Arc<dyn ProcessSnapshotProvider>,
    warmup: WarmupSuppressor,
}

impl Scraper {
    pub fn new(provider: Arc<dyn ProcessSnapshotProvider>, warmup: WarmupSuppressor) -> Self {
        Self { provider, warmup }
    }

    pub fn provider(&self) -> &dyn ProcessSnapshotProvider {
        self.provider.as_ref()
    }

    /// Fetches the current process list and renders it.
    pub async fn scrape(&self) -> Result<ScrapeOutput, ScrapeError> {
        let start = Instant::now();

        let processes = self.provider.list().await.map_err(|e| {
            error!("Failed to list processes from {}: {}", self.provider.describe(), e);
            e
        })?;

        let output = self.render(&processes, Utc::now())?;
        debug!(
            "Scrape completed: {} processes, {} metrics, {} samples, {} bytes, {:.3}ms",
            output.processes,
            output.metrics,
            output.report.recorded,
            output.body.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(output)
    }

    /// Renders a given process list as observed at `now`.
    pub fn render(
        &self,
        processes: &[ProcessStatus],
        now: DateTime<Utc>,
    ) -> Result<ScrapeOutput, ScrapeError> {
        let mut registry = MetricRegistry::with_catalog()?;
        let mut report = TranslationReport::default();

        for p in processes {
            report.merge(translate(p, &mut registry, &self.warmup, now));
        }

        Ok(ScrapeOutput {
            body: registry.render()?,
            processes: processes.len(),
            metrics: registry.len(),
            report,
        })
    }
}
