use regex::Regex;
use std::sync::LazyLock;

static COMMIT_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new("^[0-9a-fA-F]{7,40}$").unwrap());

/// Rough shape of a configured revision.
///
/// Only used for reporting; checkout always tries branches and tags before
/// falling back to a commit lookup, so a branch literally named `deadbeef`
/// still resolves as a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionKind {
    CommitId,
    Named,
}

pub fn classify(rev: &str) -> RevisionKind {
    if COMMIT_ID.is_match(rev) {
        RevisionKind::CommitId
    } else {
        RevisionKind::Named
    }
}

/// First 8 characters of a commit id, for display.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
