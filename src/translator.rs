//! Translation of process status records into gauge observations.

use chrono::{DateTime, Utc};
use tracing::{error, warn};

use crate::catalog::{canonical_name, StaticMetric, LABEL_NAMES};
use crate::error::MetricError;
use crate::process::ProcessStatus;
use crate::registry::MetricRegistry;
use crate::value::parse_metric_value;
use crate::warmup::WarmupSuppressor;

/// Label value used when the application does not report a version.
pub const UNKNOWN_VERSION: &str = "N/A";

/// Identifying labels of one process's series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelSet {
    pub id: String,
    pub name: String,
    pub instance: String,
    pub version: String,
    pub interpreter: String,
    pub node_version: String,
}

impl LabelSet {
    pub fn for_process(p: &ProcessStatus) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            instance: p.instance.clone().unwrap_or_default(),
            version: p
                .app_version
                .clone()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| UNKNOWN_VERSION.to_string()),
            interpreter: p.interpreter.clone().unwrap_or_default(),
            node_version: p.interpreter_version.clone().unwrap_or_default(),
        }
    }

    /// Label values in [`LABEL_NAMES`] order.
    pub fn values(&self) -> [&str; 6] {
        [
            &self.id,
            &self.name,
            &self.instance,
            &self.version,
            &self.interpreter,
            &self.node_version,
        ]
    }
}

/// Outcome of translating one process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationReport {
    /// Observations written to the registry.
    pub recorded: usize,
    /// Values dropped because they were not finite numbers.
    pub unparsable: usize,
    /// Observations dropped because the registry refused them.
    pub malformed: usize,
}

impl TranslationReport {
    fn record(&mut self, name: &str, result: Result<(), MetricError>) {
        match result {
            Ok(()) => self.recorded += 1,
            Err(MetricError::UnparsableMetricValue { raw, .. }) => {
                warn!(
                    "Ignoring metric name \"{}\" as value {} is not a number",
                    name, raw
                );
                self.unparsable += 1;
            }
            Err(e @ MetricError::MalformedMetricRecord(_)) => {
                error!("Skipping metric {}: {}", name, e);
                self.malformed += 1;
            }
        }
    }

    pub fn merge(&mut self, other: TranslationReport) {
        self.recorded += other.recorded;
        self.unparsable += other.unparsable;
        self.malformed += other.malformed;
    }
}

/// Static metric values for one process; `None` means "do not export".
pub fn static_values(p: &ProcessStatus, now: DateTime<Utc>) -> [(StaticMetric, Option<f64>); 7] {
    let up = if p.state.is_online() { 1.0 } else { 0.0 };
    let uptime = p
        .started_at_ms
        .and_then(|started| now.timestamp_millis().checked_sub(started))
        .map(|elapsed_ms| (elapsed_ms.max(0) / 1000) as f64);
    let instances = match p.instances {
        Some(n) if n != 0.0 && !n.is_nan() => n,
        _ => 1.0,
    };

    [
        (StaticMetric::Up, Some(up)),
        (StaticMetric::Cpu, p.cpu),
        (StaticMetric::Memory, p.memory),
        (StaticMetric::Uptime, uptime),
        (StaticMetric::Instances, Some(instances)),
        (StaticMetric::Restarts, p.restarts),
        (StaticMetric::PrevRestartDelay, p.prev_restart_delay),
    ]
}

/// Writes all observations for `p` into `registry`.
///
/// Each custom metric is handled on its own: a value that does not parse
/// or cannot be registered is logged and skipped without affecting the
/// remaining metrics of this process.
pub fn translate(
    p: &ProcessStatus,
    registry: &mut MetricRegistry,
    warmup: &WarmupSuppressor,
    now: DateTime<Utc>,
) -> TranslationReport {
    let labels = LabelSet::for_process(p);
    let label_values = labels.values();
    let mut report = TranslationReport::default();

    for (metric, value) in static_values(p, now) {
        if let Some(v) = value {
            report.record(metric.name(), registry.set(metric.name(), &label_values, v));
        }
    }

    for (display_name, raw) in &p.custom_metrics {
        let result = parse_metric_value(display_name, raw).and_then(|value| {
            let metric_name = canonical_name(display_name);
            let value = warmup.apply(&metric_name, value, now);
            registry.ensure(&metric_name, display_name, &LABEL_NAMES)?;
            registry.set(&metric_name, &label_values, value)
        });
        report.record(display_name, result);
    }

    report
}
