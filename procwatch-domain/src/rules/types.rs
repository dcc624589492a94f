use procwatch_core::utils::string_utils::{normalize_path, normalize_path_trimmed, separator_count, SEPARATOR};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Literal that marks the blanket block entry.
pub const WILDCARD_LITERAL: &str = "ALL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    /// Compared against the full candidate path, then against its base name.
    ExactPath,
    /// "This directory and everything under it".
    DirectoryPrefix,
    Wildcard,
}

/// One parsed rule line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub kind: RuleKind,
    /// Normalized form used for matching. DirectoryPrefix entries keep exactly
    /// one trailing separator.
    pub normalized: String,
    /// The line as written, for display.
    pub raw: String,
}

impl RuleEntry {
    /// Parses one line; comments and blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let raw = line.trim();
        if raw.is_empty() || raw.starts_with('#') {
            return None;
        }

        if raw.eq_ignore_ascii_case(WILDCARD_LITERAL) {
            return Some(Self {
                kind: RuleKind::Wildcard,
                normalized: WILDCARD_LITERAL.to_lowercase(),
                raw: raw.to_string(),
            });
        }

        let normalized = normalize_path(raw);
        if normalized.ends_with(SEPARATOR) {
            let mut prefix = normalized.trim_end_matches(SEPARATOR).to_string();
            prefix.push(SEPARATOR);
            Some(Self { kind: RuleKind::DirectoryPrefix, normalized: prefix, raw: raw.to_string() })
        } else {
            Some(Self {
                kind: RuleKind::ExactPath,
                normalized: normalize_path_trimmed(raw),
                raw: raw.to_string(),
            })
        }
    }

    /// Separator count of a DirectoryPrefix entry, used to pick the deepest match.
    pub fn depth(&self) -> usize {
        separator_count(&self.normalized)
    }

    /// Whether `candidate` (normalized, trailing separators stripped) lies under
    /// this DirectoryPrefix entry.
    pub fn covers(&self, candidate: &str) -> bool {
        self.kind == RuleKind::DirectoryPrefix && candidate.starts_with(self.normalized.as_str())
    }
}

/// An immutable, versioned rule list. Reloads build a new list; nothing
/// mutates an existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleList {
    version: u64,
    entries: Vec<RuleEntry>,
}

impl RuleList {
    pub fn new(version: u64, entries: Vec<RuleEntry>) -> Self {
        Self { version, entries }
    }

    pub fn empty(version: u64) -> Self {
        Self { version, entries: Vec::new() }
    }

    /// Parses UTF-8 text, one entry per line.
    pub fn parse(text: &str, version: u64) -> Self {
        Self::new(version, text.lines().filter_map(RuleEntry::parse).collect())
    }

    /// Parses raw file bytes. Lines that are not valid UTF-8 are skipped with a
    /// warning instead of failing the whole list.
    pub fn parse_bytes(bytes: &[u8], version: u64) -> Self {
        let mut entries = Vec::new();
        for (index, line) in bytes.split(|b| *b == b'\n').enumerate() {
            match std::str::from_utf8(line) {
                Ok(text) => entries.extend(RuleEntry::parse(text)),
                Err(e) => log::warn!("Skipping unreadable rule line {}: {}", index + 1, e),
            }
        }
        Self::new(version, entries)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_exact(&self, normalized: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.kind == RuleKind::ExactPath && e.normalized == normalized)
    }

    pub fn has_wildcard(&self) -> bool {
        self.entries.iter().any(|e| e.kind == RuleKind::Wildcard)
    }

    /// DirectoryPrefix entries in file order. The wildcard never appears here,
    /// so this is safe to present as a directory breakdown.
    pub fn directory_entries(&self) -> impl Iterator<Item = &RuleEntry> {
        self.entries.iter().filter(|e| e.kind == RuleKind::DirectoryPrefix)
    }

    /// Depth of the deepest DirectoryPrefix entry covering `candidate`.
    pub fn deepest_prefix(&self, candidate: &str) -> Option<usize> {
        self.directory_entries()
            .filter(|e| e.covers(candidate))
            .map(RuleEntry::depth)
            .max()
    }
}

/// Outcome of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleStatus {
    Allowed,
    Blocked,
    /// No rule applies. Not the same as an explicit allow.
    Unmatched,
}

/// Which priority step produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    ExactPath,
    BaseName,
    /// Only one list had a covering directory entry.
    DirectoryPrefix,
    /// Both lists had covering directory entries; depth (then allow) decided.
    ContestedDirectory,
    Wildcard,
    NoMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub status: RuleStatus,
    pub reason: MatchKind,
    /// Separator depth of the winning directory entry, for directory verdicts.
    pub match_depth: Option<usize>,
}

impl Decision {
    pub const fn new(status: RuleStatus, reason: MatchKind, match_depth: Option<usize>) -> Self {
        Self { status, reason, match_depth }
    }

    pub const fn unmatched() -> Self {
        Self::new(RuleStatus::Unmatched, MatchKind::NoMatch, None)
    }

    pub fn is_blocked(&self) -> bool {
        self.status == RuleStatus::Blocked
    }

    pub fn is_allowed(&self) -> bool {
        self.status == RuleStatus::Allowed
    }
}

/// A consistent pair of lists, swapped as one unit.
#[derive(Debug, Clone, Default)]
pub struct RuleSnapshot {
    pub version: u64,
    pub block: Arc<RuleList>,
    pub allow: Arc<RuleList>,
}
