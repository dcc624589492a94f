use async_trait::async_trait;
use std::time::SystemTime;

use super::errors::RuleError;
use super::types::RuleList;

/// Backing storage for one rule list.
#[async_trait]
pub trait RuleListProvider: Send + Sync {
    /// Human-readable location, for logs.
    fn describe(&self) -> String;

    /// Loads the list, stamping it with `version`. A missing source yields an
    /// empty list.
    async fn load(&self, version: u64) -> Result<RuleList, RuleError>;

    /// Modification stamp used to detect changes; `None` if the source is absent.
    async fn modified(&self) -> Result<Option<SystemTime>, RuleError>;

    /// Appends `raw` unless an equivalent entry exists. Returns whether it was added.
    async fn add_entry(&self, raw: &str) -> Result<bool, RuleError>;

    /// Removes every line equivalent to `raw`. Returns whether anything was removed.
    async fn remove_entry(&self, raw: &str) -> Result<bool, RuleError>;
}
