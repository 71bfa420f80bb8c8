//! Sort functions for issue lists.
//!
//! All sorts are stable: issues that compare equal keep the relative order
//! they had coming out of the filter stages.

use unicase::UniCase;

use crate::types::Issue;

/// Sort key for the browse list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Newest,
    Votes,
    Location,
}

impl SortKey {
    /// All valid string representations of this enum.
    pub const ALL_STRINGS: &[&str] = &["newest", "votes", "location"];
}

enum_display_fromstr!(
    SortKey,
    crate::error::CivicError::invalid_sort_key,
    {
        Newest => "newest",
        Votes => "votes",
        Location => "location",
    }
);

/// Newest first by creation time
pub fn sort_by_newest(issues: &mut [Issue]) {
    issues.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Most votes first
pub fn sort_by_votes(issues: &mut [Issue]) {
    issues.sort_by(|a, b| b.votes.cmp(&a.votes));
}

/// Location label, A to Z, ignoring case
pub fn sort_by_location(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        UniCase::new(a.location.as_str()).cmp(&UniCase::new(b.location.as_str()))
    });
}

/// Sort issues by the specified key
pub fn sort_issues_by(issues: &mut [Issue], key: SortKey) {
    match key {
        SortKey::Newest => sort_by_newest(issues),
        SortKey::Votes => sort_by_votes(issues),
        SortKey::Location => sort_by_location(issues),
    }
}
