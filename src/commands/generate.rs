//! Generate testdata command implementation.
//!
//! Generates synthetic `pm2 jlist` JSON files for testing.

use chrono::{Duration, Utc};
use pm2_prometheus_exporter::process::{Monit, Pm2Env, Pm2Process, ProcessState};
use pm2_prometheus_exporter::value::{MetricDescriptor, RawMetricValue, Scalar};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const APP_NAMES: [&str; 6] = ["api", "worker", "scheduler", "gateway", "mailer", "ws"];
const NODE_VERSIONS: [&str; 3] = ["18.19.1", "20.11.1", "22.2.0"];

/// Generates a synthetic process list and writes it to `output`.
pub fn command_generate_testdata(output: PathBuf, processes: usize) -> anyhow::Result<()> {
    debug!(
        "Generating test data: processes={}, output={}",
        processes,
        output.display()
    );

    let mut rng = rand::thread_rng();
    let list: Vec<Pm2Process> = (0..processes)
        .map(|id| generate_random_process(&mut rng, id))
        .collect();

    let json_content = serde_json::to_string_pretty(&list)?;
    fs::write(&output, &json_content)?;

    println!(
        "✅ Generated test data: {} processes in {}",
        list.len(),
        output.display()
    );

    Ok(())
}

/// Generates a random process entry with a mix of custom metric formats.
fn generate_random_process(rng: &mut impl Rng, id: usize) -> Pm2Process {
    let base = APP_NAMES[id % APP_NAMES.len()];
    let name = if id < APP_NAMES.len() {
        base.to_string()
    } else {
        format!("{}-{}", base, id / APP_NAMES.len())
    };

    // Mostly online, some stopped or errored
    let status = match rng.gen_range(0..10) {
        0 => ProcessState::Other("stopped".into()),
        1 => ProcessState::Other("errored".into()),
        _ => ProcessState::Online,
    };

    let started = Utc::now() - Duration::seconds(rng.gen_range(5..86_400));

    let mut axm_monitor = BTreeMap::new();
    axm_monitor.insert(
        "Heap Size".to_string(),
        text_descriptor(format!("{:.2}mb", rng.gen_range(20.0..512.0))),
    );
    axm_monitor.insert(
        "Used Heap Size".to_string(),
        text_descriptor(format!("{:.2}mb", rng.gen_range(10.0..256.0))),
    );
    axm_monitor.insert(
        "Event Loop Latency".to_string(),
        text_descriptor(format!("{:.2}ms", rng.gen_range(0.1..5.0))),
    );
    axm_monitor.insert(
        "Event Loop Latency p95".to_string(),
        text_descriptor(format!("{:.2}ms", rng.gen_range(1.0..50.0))),
    );
    axm_monitor.insert(
        "Loop delay".to_string(),
        text_descriptor(format!("{:.2}ms", rng.gen_range(0.5..20.0))),
    );
    axm_monitor.insert(
        "Active requests".to_string(),
        RawMetricValue::Number(rng.gen_range(0..64u32).into()),
    );
    if rng.gen_bool(0.2) {
        axm_monitor.insert("Broken gauge".to_string(), text_descriptor("n/a".into()));
    }

    Pm2Process {
        pm_id: Scalar::Number(id.into()),
        name,
        pm2_env: Pm2Env {
            status,
            node_app_instance: Some(Scalar::Number(0u32.into())),
            exec_interpreter: Some("node".into()),
            node_version: NODE_VERSIONS.choose(rng).map(|v| v.to_string()),
            version: if rng.gen_bool(0.8) {
                Some(format!("1.{}.{}", rng.gen_range(0..10), rng.gen_range(0..20)))
            } else {
                None
            },
            pm_uptime: Some(started.timestamp_millis()),
            restart_time: Some(rng.gen_range(0..12) as f64),
            prev_restart_delay: Some(0.0),
            instances: Some(Scalar::Number(1u32.into())),
            axm_monitor,
        },
        monit: Monit {
            // CPU percent: 0.0 - 100.0
            cpu: Some((rng.gen_range(0.0..100.0_f64) * 10.0).round() / 10.0),
            // Memory: 10 MB - 1 GB (in bytes)
            memory: Some(rng.gen_range(10 * 1024 * 1024..1024 * 1024 * 1024_u64) as f64),
        },
    }
}

fn text_descriptor(value: String) -> RawMetricValue {
    RawMetricValue::Descriptor(MetricDescriptor {
        value: Some(Scalar::Text(value)),
        unit: None,
    })
}
