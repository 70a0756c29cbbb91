//! Application state management for the exporter.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::provider::{FileProvider, Pm2CliProvider, ProcessSnapshotProvider};
use crate::scrape::Scraper;
use crate::warmup::WarmupSuppressor;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests.
pub struct AppState {
    pub scraper: Scraper,
}

impl AppState {
    pub fn new(scraper: Scraper) -> SharedState {
        Arc::new(Self { scraper })
    }
}

/// Picks the process list source for `config`: the test data file when
/// one is configured, otherwise the PM2 CLI.
pub fn provider_for(config: &Config) -> Arc<dyn ProcessSnapshotProvider> {
    match &config.test_data_file {
        Some(path) => Arc::new(FileProvider::new(path)),
        None => Arc::new(Pm2CliProvider::new(config.pm2_bin())),
    }
}

/// Builds the scraper for `config` with the given warm-up gate.
pub fn scraper_for(config: &Config, warmup: WarmupSuppressor) -> Scraper {
    Scraper::new(provider_for(config), warmup)
}
