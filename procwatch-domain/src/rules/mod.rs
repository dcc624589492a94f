//! Allow/block rule lists and their resolution.

pub mod engine;
pub mod errors;
pub mod persistence;
pub mod persistence_iface;
pub mod store;
pub mod types;

pub use engine::{evaluate, ProcessClassifier, RuleEngine, UnrestrictedClassifier};
pub use errors::RuleError;
pub use persistence::FilesystemRuleListProvider;
pub use persistence_iface::RuleListProvider;
pub use store::{RuleStore, SharedRuleStore};
pub use types::{Decision, MatchKind, RuleEntry, RuleKind, RuleList, RuleSnapshot, RuleStatus};
