//! Detection of newly started processes by polling `/proc`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use procwatch_domain::ProcessDetails;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace, warn};

use crate::error::{SystemError, SystemResult};
use crate::events::ControlEvent;

pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Diffs the PID set of a procfs mount between polls.
///
/// Processes already running at the first poll are not reported. A PID that
/// vanishes and is reused later is reported again, which consumers tolerate.
#[derive(Debug)]
pub struct ProcFsFeed {
    root: PathBuf,
    known: HashSet<u32>,
    primed: bool,
}

impl Default for ProcFsFeed {
    fn default() -> Self {
        Self::with_root(DEFAULT_PROC_ROOT)
    }
}

impl ProcFsFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), known: HashSet::new(), primed: false }
    }

    /// Returns processes that appeared since the previous poll, by ascending PID.
    pub async fn poll(&mut self) -> SystemResult<Vec<ProcessDetails>> {
        let pids = self.list_pids().await?;
        let mut fresh: Vec<u32> = if self.primed {
            pids.difference(&self.known).copied().collect()
        } else {
            Vec::new()
        };
        fresh.sort_unstable();
        self.known = pids;
        self.primed = true;

        let mut appeared = Vec::with_capacity(fresh.len());
        for pid in fresh {
            match read_process(&self.root, pid).await {
                Some(details) => appeared.push(details),
                None => trace!("Skipping unreadable process {}", pid),
            }
        }
        Ok(appeared)
    }

    async fn list_pids(&self) -> SystemResult<HashSet<u32>> {
        let table_error = |source| SystemError::ProcessTable { path: self.root.clone(), source };
        let mut dir = tokio::fs::read_dir(&self.root).await.map_err(table_error)?;
        let mut pids = HashSet::new();
        while let Some(entry) = dir.next_entry().await.map_err(table_error)? {
            if let Some(pid) = entry.file_name().to_str().and_then(|name| name.parse::<u32>().ok()) {
                pids.insert(pid);
            }
        }
        Ok(pids)
    }

    /// Polls every `interval` until the receiving side goes away.
    pub async fn run(mut self, interval: Duration, events: mpsc::Sender<ControlEvent>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match self.poll().await {
                Ok(appeared) => {
                    for details in appeared {
                        if events.send(ControlEvent::ProcessAppeared(details)).await.is_err() {
                            debug!("Control loop gone, stopping process feed");
                            return;
                        }
                    }
                }
                Err(err) => warn!("Process poll failed: {}", err),
            }
        }
    }
}

/// Kernel threads and processes we may not inspect have no readable `exe`
/// and are skipped.
async fn read_process(root: &Path, pid: u32) -> Option<ProcessDetails> {
    let dir = root.join(pid.to_string());
    let exe = tokio::fs::read_link(dir.join("exe")).await.ok()?;
    let exe = exe.to_string_lossy();
    let path = exe.strip_suffix(" (deleted)").unwrap_or(&exe).to_string();

    let name = match Path::new(&path).file_name().and_then(|n| n.to_str()) {
        Some(file_name) if !file_name.is_empty() => file_name.to_string(),
        _ => tokio::fs::read_to_string(dir.join("comm")).await.ok()?.trim().to_string(),
    };

    let elevated = tokio::fs::read_to_string(dir.join("status"))
        .await
        .ok()
        .and_then(|status| effective_uid(&status))
        .map_or(false, |uid| uid == 0);

    Some(ProcessDetails { pid, name, path, elevated })
}

/// Second field of the `Uid:` line: real, effective, saved, filesystem.
fn effective_uid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("Uid:"))
        .and_then(|ids| ids.split_whitespace().nth(1))
        .and_then(|uid| uid.parse().ok())
}
