//! Configuration model and loading.
//!
//! Effective configuration is resolved as CLI flag > config file > default.
//! Files may be YAML, JSON or TOML, chosen by extension.

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9209;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_PM2_BIN: &str = "pm2";

/// Default config file locations, tried in order.
pub const DEFAULT_CONFIG_PATHS: [&str; 6] = [
    "/etc/pm2-prometheus-exporter/config.yaml",
    "/etc/pm2-prometheus-exporter/config.yml",
    "/etc/pm2-prometheus-exporter/config.json",
    "./pm2-prometheus-exporter.yaml",
    "./pm2-prometheus-exporter.yml",
    "./pm2-prometheus-exporter.json",
];

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Exporter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    #[serde(alias = "host")]
    pub bind: Option<String>,
    pub port: Option<u16>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,

    // Process list source
    /// PM2 executable queried with `jlist`.
    #[serde(alias = "pm2-bin")]
    pub pm2_bin: Option<PathBuf>,
    /// JSON process list read instead of querying PM2.
    #[serde(alias = "test-data-file")]
    pub test_data_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            port: Some(DEFAULT_PORT),
            log_level: Some(DEFAULT_LOG_LEVEL.into()),
            pm2_bin: Some(PathBuf::from(DEFAULT_PM2_BIN)),
            test_data_file: None,
        }
    }
}

impl Config {
    pub fn bind_addr(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn pm2_bin(&self) -> &Path {
        self.pm2_bin
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_PM2_BIN))
    }

    /// Fills fields missing from a loaded file with the defaults.
    fn with_defaults(self) -> Self {
        let defaults = Config::default();
        Self {
            bind: self.bind.or(defaults.bind),
            port: self.port.or(defaults.port),
            log_level: self.log_level.or(defaults.log_level),
            pm2_bin: self.pm2_bin.or(defaults.pm2_bin),
            test_data_file: self.test_data_file.or(defaults.test_data_file),
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), String> {
    if cfg.port() == 0 {
        return Err("port must be between 1 and 65535".into());
    }

    if cfg.bind_addr().parse::<IpAddr>().is_err() {
        return Err(format!(
            "Invalid bind address '{}', expected an IP address",
            cfg.bind_addr()
        ));
    }

    let level = cfg.log_level().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(format!(
            "Invalid log_level '{}', expected one of: {}",
            cfg.log_level(),
            LOG_LEVELS.join(", ")
        ));
    }

    if let Some(path) = &cfg.test_data_file {
        if !path.exists() {
            return Err(format!("test_data_file not found: {}", path.display()));
        }
    }

    Ok(())
}

/// Loads configuration from `path`, or from the first existing default
/// location when no path is given. Falls back to defaults when no file
/// exists.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("config file not found: {}", p.display());
            }
            p.to_path_buf()
        }
        None => match DEFAULT_CONFIG_PATHS
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
        {
            Some(p) => p.to_path_buf(),
            None => return Ok(Config::default()),
        },
    };

    let content = fs::read_to_string(&path)?;
    let config = parse_config(&content, &path)?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config.with_defaults())
}

/// Parses config text in the format implied by the file extension.
pub fn parse_config(content: &str, path: &Path) -> anyhow::Result<Config> {
    let config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(content)?,
        Some("toml") => toml::from_str(content)?,
        // Default to YAML
        _ => serde_yaml::from_str(content)?,
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.bind_addr(), "0.0.0.0");
        assert_eq!(cfg.port(), 9209);
        assert_eq!(cfg.pm2_bin(), Path::new("pm2"));
        assert!(validate_effective_config(&cfg).is_ok());
    }

    #[test]
    fn test_parse_formats() {
        let yaml = parse_config("port: 9300\nhost: 127.0.0.1\n", Path::new("c.yaml")).unwrap();
        assert_eq!(yaml.port, Some(9300));
        assert_eq!(yaml.bind.as_deref(), Some("127.0.0.1"));

        let json = parse_config(r#"{"port": 9301, "log_level": "debug"}"#, Path::new("c.json"))
            .unwrap();
        assert_eq!(json.port, Some(9301));
        assert_eq!(json.log_level(), "debug");

        let toml = parse_config("port = 9302\npm2_bin = \"/usr/bin/pm2\"\n", Path::new("c.toml"))
            .unwrap();
        assert_eq!(toml.port(), 9302);
        assert_eq!(toml.pm2_bin(), Path::new("/usr/bin/pm2"));
    }

    #[test]
    fn test_load_fills_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "port: 9555").unwrap();

        let cfg = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.port(), 9555);
        assert_eq!(cfg.bind.as_deref(), Some(DEFAULT_BIND_ADDR));
        assert_eq!(cfg.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.yaml"))).is_err());
    }

    #[test]
    fn test_validation_errors() {
        let cfg = Config {
            port: Some(0),
            ..Config::default()
        };
        assert!(validate_effective_config(&cfg).is_err());

        let cfg = Config {
            bind: Some("localhost:80".into()),
            ..Config::default()
        };
        assert!(validate_effective_config(&cfg).is_err());

        let cfg = Config {
            log_level: Some("chatty".into()),
            ..Config::default()
        };
        assert!(validate_effective_config(&cfg).is_err());

        let cfg = Config {
            test_data_file: Some(PathBuf::from("/nonexistent/processes.json")),
            ..Config::default()
        };
        assert!(validate_effective_config(&cfg).is_err());
    }
}
