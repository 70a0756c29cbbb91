//! Sources of the managed process list.
//!
//! The live source shells out to `pm2 jlist`; the file source reads the
//! same JSON document from disk (offline runs and synthetic test data).

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error, instrument};

use crate::error::{MetricError, ScrapeError};
use crate::process::ProcessStatus;

/// Supplies one snapshot of the process list per call.
#[async_trait]
pub trait ProcessSnapshotProvider: Send + Sync {
    /// Short description used in log lines.
    fn describe(&self) -> String;

    async fn list(&self) -> Result<Vec<ProcessStatus>, ScrapeError>;
}

/// Queries a running PM2 daemon through its CLI.
#[derive(Debug, Clone)]
pub struct Pm2CliProvider {
    pm2_bin: PathBuf,
}

impl Pm2CliProvider {
    pub fn new(pm2_bin: impl Into<PathBuf>) -> Self {
        Self {
            pm2_bin: pm2_bin.into(),
        }
    }
}

#[async_trait]
impl ProcessSnapshotProvider for Pm2CliProvider {
    fn describe(&self) -> String {
        format!("{} jlist", self.pm2_bin.display())
    }

    #[instrument(skip(self), fields(bin = %self.pm2_bin.display()))]
    async fn list(&self) -> Result<Vec<ProcessStatus>, ScrapeError> {
        let output = Command::new(&self.pm2_bin)
            .arg("jlist")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ScrapeError::CollectorUnavailable(format!(
                    "failed to run {}: {}",
                    self.describe(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScrapeError::CollectorUnavailable(format!(
                "{} exited with {}: {}",
                self.describe(),
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        decode_process_list(&stdout)
    }
}

/// Reads the process list from a JSON file.
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProcessSnapshotProvider for FileProvider {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn list(&self) -> Result<Vec<ProcessStatus>, ScrapeError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ScrapeError::CollectorUnavailable(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))
        })?;
        decode_process_list(&content)
    }
}

/// Decodes a `pm2 jlist` document.
///
/// Anything printed before the opening `[` is ignored. Records are decoded
/// one by one; a record that does not decode is logged and skipped.
pub fn decode_process_list(raw: &str) -> Result<Vec<ProcessStatus>, ScrapeError> {
    let start = raw.find('[').ok_or_else(|| {
        ScrapeError::CollectorUnavailable("process list output contains no JSON array".into())
    })?;

    let records: Vec<serde_json::Value> = serde_json::from_str(raw[start..].trim_end())
        .map_err(|e| ScrapeError::CollectorUnavailable(format!("invalid process list: {e}")))?;

    let total = records.len();
    let mut processes = Vec::with_capacity(total);
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<ProcessStatus>(record) {
            Ok(p) => processes.push(p),
            Err(e) => {
                let err = MetricError::MalformedMetricRecord(format!("process #{index}: {e}"));
                error!("{}", err);
            }
        }
    }

    debug!("Decoded {} of {} process records", processes.len(), total);
    Ok(processes)
}
