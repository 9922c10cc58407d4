//! Periodic JSON snapshot persistence for the error monitor, so history
//! survives a restart. Same atomic-replace-on-write approach used by the
//! assignment ledger (`coordination::ledger`), applied here to a Vec of
//! `ErrorRecord`s instead of the assignment map.

use super::model::ErrorRecord;
use super::store::ErrorMonitor;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

pub async fn load(path: &Path) -> Result<Vec<ErrorRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading monitor snapshot at {}", path.display()))?;
    let records = serde_json::from_slice(&bytes).with_context(|| "parsing monitor snapshot")?;
    Ok(records)
}

pub async fn save(path: &Path, records: &[ErrorRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }
    let tmp_path = path.with_extension("tmp");
    let payload = serde_json::to_vec_pretty(records)?;

    let mut file = tokio::fs::File::create(&tmp_path).await?;
    file.write_all(&payload).await?;
    file.sync_all().await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}

/// Background daemon that flushes the monitor's history to disk on a fixed
/// interval, grounded on the teacher's `services/memory_decay_daemon.rs`
/// stop-flag-plus-interval-loop pattern.
pub struct SnapshotDaemon {
    stop: Arc<AtomicBool>,
}

impl SnapshotDaemon {
    pub fn spawn(monitor: Arc<ErrorMonitor>, path: PathBuf, period: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_clone = stop.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                if stop_clone.load(Ordering::Relaxed) {
                    break;
                }
                let records = monitor.snapshot().await;
                if let Err(err) = save(&path, &records).await {
                    tracing::warn!(error = %err, "failed to persist monitor snapshot");
                }
            }
        });
        Self { stop }
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
