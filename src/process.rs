//! Process status records as reported by PM2.
//!
//! [`Pm2Process`] mirrors one element of `pm2 jlist`; [`ProcessStatus`] is
//! the flattened, immutable view the translator works on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::value::{RawMetricValue, Scalar};

/// Process state as reported by the process manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProcessState {
    Online,
    Other(String),
}

impl ProcessState {
    pub fn is_online(&self) -> bool {
        matches!(self, ProcessState::Online)
    }
}

impl From<String> for ProcessState {
    fn from(s: String) -> Self {
        if s == "online" {
            ProcessState::Online
        } else {
            ProcessState::Other(s)
        }
    }
}

impl From<ProcessState> for String {
    fn from(state: ProcessState) -> Self {
        match state {
            ProcessState::Online => "online".to_string(),
            ProcessState::Other(s) => s,
        }
    }
}

impl Default for ProcessState {
    fn default() -> Self {
        ProcessState::Other("unknown".to_string())
    }
}

/// `monit` section of a PM2 process entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Monit {
    #[serde(default)]
    pub cpu: Option<f64>,
    #[serde(default)]
    pub memory: Option<f64>,
}

/// `pm2_env` section of a PM2 process entry. Only the fields the exporter
/// reads are kept; everything else in the document is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pm2Env {
    #[serde(default)]
    pub status: ProcessState,
    #[serde(rename = "NODE_APP_INSTANCE", default)]
    pub node_app_instance: Option<Scalar>,
    #[serde(default)]
    pub exec_interpreter: Option<String>,
    #[serde(default)]
    pub node_version: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Process start time, milliseconds since the Unix epoch.
    #[serde(default)]
    pub pm_uptime: Option<i64>,
    #[serde(default)]
    pub restart_time: Option<f64>,
    #[serde(default)]
    pub prev_restart_delay: Option<f64>,
    #[serde(default)]
    pub instances: Option<Scalar>,
    #[serde(default)]
    pub axm_monitor: BTreeMap<String, RawMetricValue>,
}

/// One element of the PM2 process list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pm2Process {
    pub pm_id: Scalar,
    pub name: String,
    #[serde(default)]
    pub pm2_env: Pm2Env,
    #[serde(default)]
    pub monit: Monit,
}

/// Immutable per-scrape snapshot of one managed process.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "Pm2Process")]
pub struct ProcessStatus {
    pub id: String,
    pub name: String,
    pub state: ProcessState,
    pub instance: Option<String>,
    pub interpreter: Option<String>,
    pub interpreter_version: Option<String>,
    pub app_version: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub started_at_ms: Option<i64>,
    pub restarts: Option<f64>,
    pub prev_restart_delay: Option<f64>,
    pub instances: Option<f64>,
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    /// Custom application metrics keyed by display name.
    pub custom_metrics: BTreeMap<String, RawMetricValue>,
}

impl From<Pm2Process> for ProcessStatus {
    fn from(p: Pm2Process) -> Self {
        let env = p.pm2_env;
        ProcessStatus {
            id: p.pm_id.as_text().into_owned(),
            name: p.name,
            state: env.status,
            instance: env.node_app_instance.map(|s| s.as_text().into_owned()),
            interpreter: env.exec_interpreter,
            interpreter_version: env.node_version,
            app_version: env.version,
            started_at_ms: env.pm_uptime,
            restarts: env.restart_time,
            prev_restart_delay: env.prev_restart_delay,
            instances: env.instances.as_ref().and_then(Scalar::as_f64),
            cpu: p.monit.cpu,
            memory: p.monit.memory,
            custom_metrics: env.axm_monitor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JLIST_ENTRY: &str = r#"{
        "pid": 4242,
        "name": "api",
        "pm_id": 3,
        "monit": { "memory": 52428800, "cpu": 1.5 },
        "pm2_env": {
            "status": "online",
            "NODE_APP_INSTANCE": 1,
            "exec_interpreter": "node",
            "node_version": "20.11.1",
            "version": "2.4.0",
            "pm_uptime": 1714564800000,
            "restart_time": 4,
            "prev_restart_delay": null,
            "instances": 2,
            "unstable_restarts": 0,
            "axm_monitor": {
                "Heap Size": { "value": "128.5mb", "type": "internal/v8/heap/total", "unit": "MiB" },
                "Loop delay": { "value": "1.92ms" },
                "Active requests": 3
            }
        }
    }"#;

    #[test]
    fn test_decode_jlist_entry() {
        let p: ProcessStatus = serde_json::from_str(JLIST_ENTRY).unwrap();

        assert_eq!(p.id, "3");
        assert_eq!(p.name, "api");
        assert!(p.state.is_online());
        assert_eq!(p.instance.as_deref(), Some("1"));
        assert_eq!(p.interpreter.as_deref(), Some("node"));
        assert_eq!(p.interpreter_version.as_deref(), Some("20.11.1"));
        assert_eq!(p.app_version.as_deref(), Some("2.4.0"));
        assert_eq!(p.started_at_ms, Some(1_714_564_800_000));
        assert_eq!(p.restarts, Some(4.0));
        assert_eq!(p.prev_restart_delay, None);
        assert_eq!(p.instances, Some(2.0));
        assert_eq!(p.cpu, Some(1.5));
        assert_eq!(p.memory, Some(52_428_800.0));
        assert_eq!(p.custom_metrics.len(), 3);
    }

    #[test]
    fn test_decode_minimal_entry() {
        let p: ProcessStatus =
            serde_json::from_str(r#"{"pm_id": 0, "name": "worker", "pm2_env": {"status": "stopped"}}"#)
                .unwrap();

        assert_eq!(p.state, ProcessState::Other("stopped".into()));
        assert!(p.instance.is_none());
        assert!(p.cpu.is_none());
        assert!(p.custom_metrics.is_empty());
    }

    #[test]
    fn test_decode_rejects_missing_identity() {
        assert!(serde_json::from_str::<ProcessStatus>(r#"{"name": "worker"}"#).is_err());
        assert!(serde_json::from_str::<ProcessStatus>(r#"{"pm_id": 1}"#).is_err());
    }

    #[test]
    fn test_state_round_trips_through_string() {
        assert_eq!(String::from(ProcessState::Online), "online");
        assert_eq!(
            ProcessState::from("errored".to_string()),
            ProcessState::Other("errored".into())
        );
    }
}
