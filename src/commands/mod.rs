//! CLI command implementations for pm2-prometheus-exporter.
//!
//! This module provides implementations for all CLI subcommands:
//! - `config`: Configuration file generation
//! - `test`: Scrape cycle testing
//! - `generate-testdata`: Synthetic process list generation

pub mod config;
pub mod generate;
pub mod test;

// Re-export command functions
pub use config::{command_config, show_config};
pub use generate::command_generate_testdata;
pub use test::command_test;
