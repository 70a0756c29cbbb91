//! Config command implementation.
//!
//! Writes a default configuration file and prints effective configuration.

use pm2_prometheus_exporter::config::Config;
use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;

/// Serializes `config` in the requested format.
pub fn render_config(config: &Config, format: ConfigFormat) -> anyhow::Result<String> {
    let content = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(content)
}

/// Generates a default configuration file.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> anyhow::Result<()> {
    let config = Config::default();
    let output = output.unwrap_or_else(|| PathBuf::from("pm2-prometheus-exporter.yaml"));

    let mut content = render_config(&config, format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> anyhow::Result<()> {
    println!("{}", render_config(config, format)?);
    Ok(())
}

/// Adds comments to YAML configuration
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# PM2 Prometheus Exporter Configuration
# =====================================
#
# Server Configuration
# --------------------
# bind: "0.0.0.0"              # Bind IP (0.0.0.0 = all interfaces), alias: host
# port: 9209                   # HTTP port
#
# Logging
# -------
# log_level: "info"            # off, error, warn, info, debug, trace
#
# Process List Source
# -------------------
# pm2_bin: "pm2"               # PM2 executable queried with `jlist`
# test_data_file: null         # JSON process list used instead of PM2
"#;

    format!("{comments}\n{yaml}")
}
