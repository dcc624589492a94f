//! Allow/block rule resolution.
//!
//! [`evaluate`] is the pure decision function. [`RuleEngine`] binds it to a
//! [`RuleStore`] so callers evaluate against whatever snapshot is current,
//! and [`ProcessClassifier`] is the seam the orchestrator depends on.

use std::sync::Arc;

use procwatch_core::utils::string_utils::{base_name, normalize_path_trimmed};

use super::store::RuleStore;
use super::types::{Decision, MatchKind, RuleList, RuleStatus};

/// Decides Allowed/Blocked/Unmatched for `path`.
///
/// Priority, highest first, each step short-circuiting:
/// 1. exact full path;
/// 2. exact base name;
/// 3. deepest covering directory entry per list, deeper wins;
/// 4. wildcard in the block list;
/// 5. unmatched.
///
/// Allow wins every tie. The function is total: it never fails and never
/// panics on any input.
pub fn evaluate(path: &str, block: &RuleList, allow: &RuleList) -> Decision {
    let candidate = normalize_path_trimmed(path);

    if let Some(decision) = exact_verdict(&candidate, block, allow, MatchKind::ExactPath) {
        return decision;
    }

    let name = base_name(&candidate);
    if name != candidate {
        if let Some(decision) = exact_verdict(name, block, allow, MatchKind::BaseName) {
            return decision;
        }
    }

    match (block.deepest_prefix(&candidate), allow.deepest_prefix(&candidate)) {
        (Some(block_depth), Some(allow_depth)) => {
            return if allow_depth >= block_depth {
                Decision::new(RuleStatus::Allowed, MatchKind::ContestedDirectory, Some(allow_depth))
            } else {
                Decision::new(RuleStatus::Blocked, MatchKind::ContestedDirectory, Some(block_depth))
            };
        }
        (Some(depth), None) => {
            return Decision::new(RuleStatus::Blocked, MatchKind::DirectoryPrefix, Some(depth));
        }
        (None, Some(depth)) => {
            return Decision::new(RuleStatus::Allowed, MatchKind::DirectoryPrefix, Some(depth));
        }
        (None, None) => {}
    }

    if block.has_wildcard() {
        return Decision::new(RuleStatus::Blocked, MatchKind::Wildcard, None);
    }

    Decision::unmatched()
}

fn exact_verdict(key: &str, block: &RuleList, allow: &RuleList, reason: MatchKind) -> Option<Decision> {
    if allow.contains_exact(key) {
        Some(Decision::new(RuleStatus::Allowed, reason, None))
    } else if block.contains_exact(key) {
        Some(Decision::new(RuleStatus::Blocked, reason, None))
    } else {
        None
    }
}

/// Classifies a process by its executable path.
///
/// Resolved once when the orchestrator is built; when no rule source is
/// configured the orchestrator gets [`UnrestrictedClassifier`].
pub trait ProcessClassifier: Send + Sync {
    fn classify(&self, path: &str) -> Decision;
}

/// Classifier used when rules are not configured: everything is Unmatched.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnrestrictedClassifier;

impl ProcessClassifier for UnrestrictedClassifier {
    fn classify(&self, _path: &str) -> Decision {
        Decision::unmatched()
    }
}

/// Evaluates against the current snapshot of a [`RuleStore`].
pub struct RuleEngine {
    store: Arc<dyn RuleStore>,
}

impl RuleEngine {
    pub fn new(store: Arc<dyn RuleStore>) -> Self {
        Self { store }
    }

    /// Evaluates against one snapshot, taken once per call, so a concurrent
    /// reload is either fully visible or not at all.
    pub fn evaluate(&self, path: &str) -> Decision {
        let snapshot = self.store.snapshot();
        let decision = evaluate(path, &snapshot.block, &snapshot.allow);
        log::trace!(
            "Rule decision for '{}' at snapshot v{}: {:?}",
            path,
            snapshot.version,
            decision
        );
        decision
    }
}

impl ProcessClassifier for RuleEngine {
    fn classify(&self, path: &str) -> Decision {
        self.evaluate(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::store::SharedRuleStore;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn lists(block: &[&str], allow: &[&str]) -> (RuleList, RuleList) {
        (RuleList::parse(&block.join("\n"), 1), RuleList::parse(&allow.join("\n"), 1))
    }

    #[rstest]
    #[case::allow_wins_exact_tie(&[r"C:\A\x.exe"], &[r"C:\A\x.exe"], r"C:\A\x.exe", RuleStatus::Allowed, MatchKind::ExactPath)]
    #[case::path_beats_name(&["x.exe"], &[r"C:\A\x.exe"], r"C:\A\x.exe", RuleStatus::Allowed, MatchKind::ExactPath)]
    #[case::name_block(&["x.exe"], &[], r"C:\A\x.exe", RuleStatus::Blocked, MatchKind::BaseName)]
    #[case::name_tie(&["X.EXE"], &["x.exe"], "/opt/x.exe", RuleStatus::Allowed, MatchKind::BaseName)]
    #[case::deeper_allow(&[r"C:\"], &[r"C:\Sub\"], r"C:\Sub\app.exe", RuleStatus::Allowed, MatchKind::ContestedDirectory)]
    #[case::deeper_block(&[r"C:\Sub\"], &[r"C:\"], r"C:\Sub\app.exe", RuleStatus::Blocked, MatchKind::ContestedDirectory)]
    #[case::equal_depth_allow(&["/opt/"], &["/OPT/"], "/opt/tool", RuleStatus::Allowed, MatchKind::ContestedDirectory)]
    #[case::single_directory(&["/usr/bin/"], &[], "/usr/bin/top", RuleStatus::Blocked, MatchKind::DirectoryPrefix)]
    #[case::wildcard_lowest(&["ALL"], &["app.exe"], r"C:\Any\app.exe", RuleStatus::Allowed, MatchKind::BaseName)]
    #[case::wildcard_blocks(&["all"], &[], "/usr/bin/top", RuleStatus::Blocked, MatchKind::Wildcard)]
    #[case::directory_beats_wildcard(&["ALL"], &["/usr/"], "/usr/bin/top", RuleStatus::Allowed, MatchKind::DirectoryPrefix)]
    #[case::no_match(&["/opt/"], &["vim"], "/usr/bin/top", RuleStatus::Unmatched, MatchKind::NoMatch)]
    fn test_evaluate_priorities(
        #[case] block: &[&str],
        #[case] allow: &[&str],
        #[case] path: &str,
        #[case] status: RuleStatus,
        #[case] reason: MatchKind,
    ) {
        let (block, allow) = lists(block, allow);
        let decision = evaluate(path, &block, &allow);
        assert_eq!((decision.status, decision.reason), (status, reason));
    }

    #[test]
    fn test_directory_decision_reports_depth() {
        let (block, allow) = lists(&[r"C:\"], &[r"C:\Sub\"]);
        let decision = evaluate(r"C:\Sub\app.exe", &block, &allow);
        assert_eq!(decision.match_depth, Some(2));
    }

    #[test]
    fn test_trailing_separator_on_candidate_is_ignored() {
        let (block, allow) = lists(&["/usr/bin/top"], &[]);
        assert!(evaluate("/usr/bin/top/", &block, &allow).is_blocked());
    }

    #[test]
    fn test_unmatched_is_distinct_from_allowed() {
        let (block, allow) = lists(&[], &[]);
        let decision = evaluate("/usr/bin/top", &block, &allow);
        assert_eq!(decision, Decision::unmatched());
        assert!(!decision.is_allowed());
        assert!(!decision.is_blocked());
    }

    #[test]
    fn test_evaluate_is_total_on_odd_input() {
        let (block, allow) = lists(&["ALL", "/"], &[""]);
        for path in ["", "/", "\\\\", "ä/ö\\Ü", "ALL"] {
            let _ = evaluate(path, &block, &allow);
        }
    }

    #[test]
    fn test_rule_engine_sees_reloaded_snapshot() {
        let store = Arc::new(SharedRuleStore::new());
        let engine = RuleEngine::new(store.clone());
        assert_eq!(engine.evaluate("/usr/bin/top").status, RuleStatus::Unmatched);

        store.replace_block(RuleList::parse("top", 2));
        assert_eq!(engine.classify("/usr/bin/top").status, RuleStatus::Blocked);
    }

    #[test]
    fn test_unrestricted_classifier_never_matches() {
        assert_eq!(UnrestrictedClassifier.classify("/usr/bin/top"), Decision::unmatched());
    }
}
