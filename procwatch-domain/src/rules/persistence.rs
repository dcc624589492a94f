use async_trait::async_trait;
use log::{debug, info, warn};
use procwatch_core::error::CoreError;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::errors::RuleError;
use super::persistence_iface::RuleListProvider;
use super::types::{RuleEntry, RuleList};
use crate::fs_tasks;

pub const BLOCK_LIST_HEADER: &str = "# Block list: one executable path, file name or directory (ending in a separator) per line.\n# A line containing only ALL blocks everything not explicitly allowed.\n";
pub const ALLOW_LIST_HEADER: &str = "# Allow list: one executable path, file name or directory (ending in a separator) per line.\n";

/// A rule list stored as a line-oriented text file.
///
/// A missing file is created with `header` on first load, so users find a
/// documented file to edit.
pub struct FilesystemRuleListProvider {
    path: PathBuf,
    header: &'static str,
}

impl FilesystemRuleListProvider {
    pub fn new(path: impl Into<PathBuf>, header: &'static str) -> Self {
        Self { path: path.into(), header }
    }

    pub fn block_list(path: impl Into<PathBuf>) -> Self {
        Self::new(path, BLOCK_LIST_HEADER)
    }

    pub fn allow_list(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ALLOW_LIST_HEADER)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_error(&self, source: CoreError) -> RuleError {
        RuleError::ConfigLoad { path: self.path.clone(), source }
    }

    fn persist_error(&self, source: CoreError) -> RuleError {
        RuleError::Persist { path: self.path.clone(), source }
    }

    /// Current lines as raw bytes, without their `\n`. A missing file reads
    /// as its header.
    async fn read_lines(&self) -> Result<Vec<Vec<u8>>, RuleError> {
        let bytes = match fs_tasks::read_bytes(self.path.clone()).await {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => self.header.as_bytes().to_vec(),
            Err(e) => return Err(self.load_error(e)),
        };
        let mut lines: Vec<Vec<u8>> = bytes.split(|b| *b == b'\n').map(<[u8]>::to_vec).collect();
        if lines.last().map_or(false, Vec::is_empty) {
            lines.pop();
        }
        Ok(lines)
    }

    async fn write_lines(&self, lines: &[Vec<u8>]) -> Result<(), RuleError> {
        let mut content = lines.join(&b'\n');
        content.push(b'\n');
        fs_tasks::write_bytes_atomically(self.path.clone(), content)
            .await
            .map_err(|e| self.persist_error(e))
    }
}

/// Lines that are not valid UTF-8 never match and are written back untouched.
fn same_entry(line: &[u8], target: &RuleEntry) -> bool {
    std::str::from_utf8(line)
        .ok()
        .and_then(RuleEntry::parse)
        .map_or(false, |e| e.kind == target.kind && e.normalized == target.normalized)
}

#[async_trait]
impl RuleListProvider for FilesystemRuleListProvider {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self, version: u64) -> Result<RuleList, RuleError> {
        match fs_tasks::read_bytes(self.path.clone()).await {
            Ok(bytes) => {
                let list = RuleList::parse_bytes(&bytes, version);
                debug!("Loaded {} rule entries from {:?}", list.len(), self.path);
                Ok(list)
            }
            Err(e) if e.is_not_found() => {
                info!("Rule list {:?} not found, creating it empty", self.path);
                let header = self.header.as_bytes().to_vec();
                if let Err(err) = fs_tasks::write_bytes_atomically(self.path.clone(), header).await {
                    warn!("Could not create rule list {:?}: {}", self.path, err);
                }
                Ok(RuleList::empty(version))
            }
            Err(e) => Err(self.load_error(e)),
        }
    }

    async fn modified(&self) -> Result<Option<SystemTime>, RuleError> {
        fs_tasks::modified_time(self.path.clone()).await.map_err(|e| self.load_error(e))
    }

    async fn add_entry(&self, raw: &str) -> Result<bool, RuleError> {
        let target = RuleEntry::parse(raw).ok_or_else(|| RuleError::InvalidEntry(raw.to_string()))?;
        let mut lines = self.read_lines().await?;
        if lines.iter().any(|line| same_entry(line, &target)) {
            return Ok(false);
        }
        lines.push(raw.trim().as_bytes().to_vec());
        self.write_lines(&lines).await?;
        info!("Added '{}' to {:?}", raw.trim(), self.path);
        Ok(true)
    }

    async fn remove_entry(&self, raw: &str) -> Result<bool, RuleError> {
        let target = RuleEntry::parse(raw).ok_or_else(|| RuleError::InvalidEntry(raw.to_string()))?;
        let lines = self.read_lines().await?;
        let before = lines.len();
        let kept: Vec<Vec<u8>> = lines.into_iter().filter(|line| !same_entry(line, &target)).collect();
        if kept.len() == before {
            return Ok(false);
        }
        self.write_lines(&kept).await?;
        info!("Removed '{}' from {:?}", raw.trim(), self.path);
        Ok(true)
    }
}
