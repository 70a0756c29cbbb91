//! Fixed metric definitions exported for every scrape.
//!
//! Every series carries the same six labels identifying one managed
//! process. Custom application metrics get their names from
//! [`canonical_name`].

/// Namespace prefixed to every exported metric name.
pub const METRIC_PREFIX: &str = "pm2";

/// Label schema shared by all series, static and dynamic.
pub const LABEL_NAMES: [&str; 6] = [
    "id",
    "name",
    "instance",
    "version",
    "interpreter",
    "node_version",
];

/// The always-present metrics, in exposition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaticMetric {
    Up,
    Cpu,
    Memory,
    Uptime,
    Instances,
    Restarts,
    PrevRestartDelay,
}

impl StaticMetric {
    pub const ALL: [StaticMetric; 7] = [
        StaticMetric::Up,
        StaticMetric::Cpu,
        StaticMetric::Memory,
        StaticMetric::Uptime,
        StaticMetric::Instances,
        StaticMetric::Restarts,
        StaticMetric::PrevRestartDelay,
    ];

    /// Fully qualified metric name, including the namespace.
    pub fn name(self) -> &'static str {
        match self {
            StaticMetric::Up => "pm2_up",
            StaticMetric::Cpu => "pm2_cpu",
            StaticMetric::Memory => "pm2_memory",
            StaticMetric::Uptime => "pm2_uptime",
            StaticMetric::Instances => "pm2_instances",
            StaticMetric::Restarts => "pm2_restarts",
            StaticMetric::PrevRestartDelay => "pm2_prev_restart_delay",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            StaticMetric::Up => "Is the process running",
            StaticMetric::Cpu => "Process cpu usage",
            StaticMetric::Memory => "Process memory usage",
            StaticMetric::Uptime => "Process uptime",
            StaticMetric::Instances => "Process instances",
            StaticMetric::Restarts => "Process restarts",
            StaticMetric::PrevRestartDelay => "Previous restart delay",
        }
    }
}

/// Derives the exported metric name from an application display name.
///
/// Every run of characters outside `[A-Za-z0-9]` collapses into a single
/// underscore, the result is lower-cased and prefixed with the namespace:
/// `"Event Loop Latency p95"` becomes `"pm2_event_loop_latency_p95"`.
pub fn canonical_name(display_name: &str) -> String {
    let mut out = String::with_capacity(METRIC_PREFIX.len() + 1 + display_name.len());
    out.push_str(METRIC_PREFIX);
    out.push('_');

    let mut in_separator = false;
    for c in display_name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            in_separator = false;
        } else if !in_separator {
            out.push('_');
            in_separator = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_names_carry_prefix() {
        for metric in StaticMetric::ALL {
            assert!(metric.name().starts_with("pm2_"), "{}", metric.name());
            assert!(!metric.help().is_empty());
        }
    }

    #[test]
    fn test_canonical_name_collapses_separators() {
        assert_eq!(
            canonical_name("Event Loop Latency p95"),
            "pm2_event_loop_latency_p95"
        );
        assert_eq!(canonical_name("Heap Size"), "pm2_heap_size");
        assert_eq!(canonical_name("HTTP req/min"), "pm2_http_req_min");
        assert_eq!(canonical_name("a -- b"), "pm2_a_b");
    }

    #[test]
    fn test_canonical_name_edges() {
        assert_eq!(canonical_name(" Used Heap Size "), "pm2__used_heap_size_");
        assert_eq!(canonical_name("Größe"), "pm2_gr_e");
        assert_eq!(canonical_name(""), "pm2_");
    }

    #[test]
    fn test_distinct_display_names_can_collide() {
        assert_eq!(canonical_name("Loop delay"), canonical_name("loop-delay"));
    }
}
