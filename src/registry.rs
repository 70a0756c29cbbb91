//! Per-scrape metric registry.
//!
//! A [`MetricRegistry`] is created empty (plus the static catalog) at the
//! start of every scrape, filled while translating the process list and
//! dropped once rendered. Custom metric names are registered the first
//! time they are observed.

use ahash::AHashMap as HashMap;
use prometheus::core::Collector;
use prometheus::{Encoder, GaugeVec, Opts, TextEncoder};
use std::io::Write;
use tracing::debug;

use crate::catalog::{StaticMetric, LABEL_NAMES};
use crate::error::{MetricError, ScrapeError};

/// Buffer capacity for metrics encoding.
const BUFFER_CAP: usize = 64 * 1024;

/// Canonical name and help text of one exported gauge. The label schema
/// lives in the gauge itself.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MetricDefinition {
    name: String,
    help: String,
}

struct Entry {
    definition: MetricDefinition,
    gauge: GaugeVec,
}

/// Gauge definitions and their observations for one scrape.
pub struct MetricRegistry {
    entries: HashMap<String, Entry>,
    /// Registration order, used for rendering.
    order: Vec<String>,
}

impl MetricRegistry {
    /// An empty registry without any definitions.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// A registry seeded with the static metric catalog.
    pub fn with_catalog() -> Result<Self, MetricError> {
        let mut registry = Self::new();
        for metric in StaticMetric::ALL {
            registry.ensure(metric.name(), metric.help(), &LABEL_NAMES)?;
        }
        Ok(registry)
    }

    /// Registers `name` unless it is already known.
    ///
    /// The first registration within a scrape keeps its help text and
    /// label schema; later calls are no-ops.
    pub fn ensure(&mut self, name: &str, help: &str, labels: &[&str]) -> Result<(), MetricError> {
        if let Some(existing) = self.entries.get(name) {
            if existing.definition.help != help {
                debug!(
                    "Metric {} already registered with help {:?}, ignoring {:?}",
                    name, existing.definition.help, help
                );
            }
            return Ok(());
        }

        let gauge = GaugeVec::new(Opts::new(name, help), labels)?;
        let definition = MetricDefinition {
            name: name.to_string(),
            help: help.to_string(),
        };

        self.order.push(name.to_string());
        self.entries
            .insert(name.to_string(), Entry { definition, gauge });
        Ok(())
    }

    /// Records `value` for the series `name{label_values}`, replacing any
    /// value already recorded for the same series in this scrape.
    pub fn set(&self, name: &str, label_values: &[&str], value: f64) -> Result<(), MetricError> {
        if !value.is_finite() {
            return Err(MetricError::UnparsableMetricValue {
                name: name.to_string(),
                raw: value.to_string(),
            });
        }

        let entry = self.entries.get(name).ok_or_else(|| {
            MetricError::MalformedMetricRecord(format!("metric {name} is not registered"))
        })?;

        entry
            .gauge
            .get_metric_with_label_values(label_values)?
            .set(value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Renders every definition in the Prometheus text format.
    ///
    /// Definitions without observations still produce their `HELP` and
    /// `TYPE` lines, which the text encoder refuses to emit on its own.
    pub fn render(&self) -> Result<String, ScrapeError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::with_capacity(BUFFER_CAP);

        for name in &self.order {
            let Some(entry) = self.entries.get(name) else {
                continue;
            };

            let families = entry.gauge.collect();
            if families.iter().all(|f| f.get_metric().is_empty()) {
                write_header(&mut buffer, &entry.definition)
                    .map_err(|e| ScrapeError::Encoding(e.to_string()))?;
                continue;
            }

            encoder
                .encode(&families, &mut buffer)
                .map_err(|e| ScrapeError::Encoding(e.to_string()))?;
        }

        String::from_utf8(buffer).map_err(|e| ScrapeError::Encoding(e.to_string()))
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes the `HELP` and `TYPE` lines of a family without samples.
fn write_header(out: &mut impl Write, definition: &MetricDefinition) -> std::io::Result<()> {
    writeln!(
        out,
        "# HELP {} {}",
        definition.name,
        escape_help(&definition.help)
    )?;
    writeln!(out, "# TYPE {} gauge", definition.name)
}

/// Escapes help text the way the text exposition format requires.
fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [&str; 6] = ["0", "api", "0", "1.0.0", "node", "20.11.1"];

    #[test]
    fn test_catalog_seeds_static_definitions() {
        let registry = MetricRegistry::with_catalog().unwrap();
        assert_eq!(registry.len(), 7);

        let text = registry.render().unwrap();
        let names: Vec<_> = text
            .lines()
            .filter_map(|l| l.strip_prefix("# TYPE "))
            .filter_map(|l| l.strip_suffix(" gauge"))
            .collect();
        assert_eq!(
            names,
            [
                "pm2_up",
                "pm2_cpu",
                "pm2_memory",
                "pm2_uptime",
                "pm2_instances",
                "pm2_restarts",
                "pm2_prev_restart_delay"
            ]
        );
    }

    #[test]
    fn test_empty_registry_renders_headers_only() {
        let registry = MetricRegistry::with_catalog().unwrap();
        let text = registry.render().unwrap();

        assert!(text.contains("# HELP pm2_up Is the process running\n"));
        assert!(text.contains("# TYPE pm2_up gauge\n"));
        assert_eq!(text.matches("# TYPE ").count(), 7);
        assert!(text.lines().all(|l| l.starts_with('#')));
    }

    #[test]
    fn test_ensure_first_registration_wins() {
        let mut registry = MetricRegistry::new();
        registry.ensure("pm2_loop_delay", "Loop delay", &LABEL_NAMES).unwrap();
        registry.ensure("pm2_loop_delay", "loop-delay", &LABEL_NAMES).unwrap();

        assert_eq!(registry.len(), 1);
        let text = registry.render().unwrap();
        assert_eq!(text, "# HELP pm2_loop_delay Loop delay\n# TYPE pm2_loop_delay gauge\n");
    }

    #[test]
    fn test_header_write_failure_is_reported() {
        struct Full;

        impl Write for Full {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::ErrorKind::WriteZero.into())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let definition = MetricDefinition {
            name: "pm2_up".into(),
            help: "Is the process running".into(),
        };
        assert!(write_header(&mut Full, &definition).is_err());

        let mut out = Vec::new();
        write_header(&mut out, &definition).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "# HELP pm2_up Is the process running\n# TYPE pm2_up gauge\n"
        );
    }

    #[test]
    fn test_set_overwrites_same_series() {
        let mut registry = MetricRegistry::new();
        registry.ensure("pm2_cpu", "Process cpu usage", &LABEL_NAMES).unwrap();
        registry.set("pm2_cpu", &LABELS, 1.0).unwrap();
        registry.set("pm2_cpu", &LABELS, 2.5).unwrap();

        let text = registry.render().unwrap();
        let samples: Vec<_> = text.lines().filter(|l| l.starts_with("pm2_cpu{")).collect();
        assert_eq!(samples.len(), 1);
        assert!(samples[0].ends_with(" 2.5"), "{}", samples[0]);
    }

    #[test]
    fn test_set_rejects_non_finite_values() {
        let mut registry = MetricRegistry::new();
        registry.ensure("pm2_cpu", "Process cpu usage", &LABEL_NAMES).unwrap();

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = registry.set("pm2_cpu", &LABELS, bad).unwrap_err();
            assert!(matches!(err, MetricError::UnparsableMetricValue { .. }));
        }
        let text = registry.render().unwrap();
        assert!(!text.contains("pm2_cpu{"));
    }

    #[test]
    fn test_set_unknown_metric_is_malformed() {
        let registry = MetricRegistry::new();
        let err = registry.set("pm2_nope", &LABELS, 1.0).unwrap_err();
        assert!(matches!(err, MetricError::MalformedMetricRecord(_)));
    }

    #[test]
    fn test_set_wrong_label_count_is_malformed() {
        let mut registry = MetricRegistry::new();
        registry.ensure("pm2_cpu", "Process cpu usage", &LABEL_NAMES).unwrap();
        let err = registry.set("pm2_cpu", &["0", "api"], 1.0).unwrap_err();
        assert!(matches!(err, MetricError::MalformedMetricRecord(_)));
    }

    #[test]
    fn test_empty_help_is_rejected() {
        let mut registry = MetricRegistry::new();
        assert!(registry.ensure("pm2_", "", &LABEL_NAMES).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_help_text_is_escaped() {
        let mut registry = MetricRegistry::new();
        registry
            .ensure("pm2_odd", "line\\one\ntwo", &LABEL_NAMES)
            .unwrap();
        let text = registry.render().unwrap();
        assert!(text.contains("# HELP pm2_odd line\\\\one\\ntwo\n"));
    }
}
