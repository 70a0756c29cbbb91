//! Prometheus exporter for processes managed by PM2.
//!
//! Every scrape lists the managed processes, maps each status record onto
//! a fresh set of gauges (liveness, CPU, memory, uptime, restarts and any
//! custom metric the application reports) and renders them in the
//! Prometheus text format.
//!
//! ```text
//! Scraper::scrape()
//!   ├── ProcessSnapshotProvider::list()   ← pm2 jlist / JSON file
//!   ├── MetricRegistry::with_catalog()    ← 7 static gauges
//!   ├── translate() per process           ← value parsing, warm-up gate
//!   └── MetricRegistry::render()          → text/plain; version=0.0.4
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod process;
pub mod provider;
pub mod registry;
pub mod scrape;
pub mod state;
pub mod translator;
pub mod value;
pub mod warmup;

pub use error::{MetricError, ScrapeError};
pub use process::ProcessStatus;
pub use provider::{FileProvider, Pm2CliProvider, ProcessSnapshotProvider};
pub use registry::MetricRegistry;
pub use scrape::{ScrapeOutput, Scraper};
pub use warmup::WarmupSuppressor;
