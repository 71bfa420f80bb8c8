//! Optimistic voting.
//!
//! Each issue the viewer can see has a small state machine:
//!
//! ```text
//! Idle ──begin──> Pending ──commit────> Committed
//!                    │
//!                    └────rollback──> RolledBack ──begin──> Pending
//! ```
//!
//! `begin` disables the control and shows the count one higher straight
//! away; `commit` replaces the guess with the backend's count; `rollback`
//! restores the previous count and re-enables the control. The backend's
//! unique index on (issue, user) is what actually prevents double votes;
//! this only keeps a double click from sending a second request.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::backend::IssueBackend;
use crate::error::{CivicError, Result};
use crate::types::Issue;

/// Every this-many votes a successful vote is flagged as a milestone.
pub const MILESTONE_INTERVAL: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoteState {
    #[default]
    Idle,
    Pending,
    Committed,
    RolledBack,
}

impl VoteState {
    /// Whether the vote control should accept a click.
    pub fn is_enabled(self) -> bool {
        matches!(self, VoteState::Idle | VoteState::RolledBack)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct VoteEntry {
    state: VoteState,
    /// Count shown to the viewer, including an in-flight optimistic +1.
    shown: u32,
}

/// Result of a committed vote.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteOutcome {
    /// The issue as the backend now has it.
    pub issue: Issue,
    /// The new count is a multiple of [`MILESTONE_INTERVAL`].
    pub milestone: bool,
}

/// Tracks vote state for every issue on screen.
#[derive(Debug, Default)]
pub struct VoteCoordinator {
    entries: Mutex<HashMap<String, VoteEntry>>,
}

impl VoteCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the backend's view of an issue: its count and whether the
    /// viewer has voted. An in-flight vote is left alone.
    pub fn track(&self, issue_id: &str, votes: u32, has_voted: bool) {
        let mut entries = self.entries.lock();
        let entry = entries.entry(issue_id.to_string()).or_insert(VoteEntry {
            state: VoteState::Idle,
            shown: votes,
        });
        if entry.state == VoteState::Pending {
            return;
        }
        entry.shown = votes;
        if has_voted {
            entry.state = VoteState::Committed;
        }
    }

    /// Drop state for an issue that left the collection.
    pub fn forget(&self, issue_id: &str) {
        self.entries.lock().remove(issue_id);
    }

    pub fn state(&self, issue_id: &str) -> VoteState {
        self.entries
            .lock()
            .get(issue_id)
            .map(|e| e.state)
            .unwrap_or_default()
    }

    /// Count to display, or `None` for an issue that was never tracked.
    pub fn shown_votes(&self, issue_id: &str) -> Option<u32> {
        self.entries.lock().get(issue_id).map(|e| e.shown)
    }

    pub fn has_voted(&self, issue_id: &str) -> bool {
        self.state(issue_id) == VoteState::Committed
    }

    /// Lock the control and apply the optimistic increment. Returns the
    /// count to show.
    pub fn begin(&self, issue_id: &str) -> Result<u32> {
        let mut entries = self.entries.lock();
        let entry = entries.entry(issue_id.to_string()).or_default();
        match entry.state {
            VoteState::Idle | VoteState::RolledBack => {
                entry.state = VoteState::Pending;
                entry.shown += 1;
                tracing::debug!(issue_id, shown = entry.shown, "vote pending");
                Ok(entry.shown)
            }
            VoteState::Pending => Err(CivicError::VoteInFlight(issue_id.to_string())),
            VoteState::Committed => Err(CivicError::AlreadyVoted(issue_id.to_string())),
        }
    }

    /// Settle a pending vote with the backend's authoritative issue.
    pub fn commit(&self, issue: &Issue) {
        let mut entries = self.entries.lock();
        let entry = entries.entry(issue.id.clone()).or_default();
        entry.state = VoteState::Committed;
        entry.shown = issue.votes;
        tracing::debug!(issue_id = %issue.id, votes = issue.votes, "vote committed");
    }

    /// Undo the optimistic increment and re-enable the control.
    pub fn rollback(&self, issue_id: &str) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(issue_id)
            && entry.state == VoteState::Pending
        {
            entry.state = VoteState::RolledBack;
            entry.shown = entry.shown.saturating_sub(1);
            tracing::debug!(issue_id, shown = entry.shown, "vote rolled back");
        }
    }

    /// The backend says this viewer already voted: drop the optimistic
    /// increment but keep the control disabled.
    fn settle_already_voted(&self, issue_id: &str) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(issue_id) {
            if entry.state == VoteState::Pending {
                entry.shown = entry.shown.saturating_sub(1);
            }
            entry.state = VoteState::Committed;
        }
    }

    /// Cast the viewer's vote through `backend`.
    ///
    /// Signed-out viewers are rejected before any state changes. Any
    /// backend failure other than a duplicate vote rolls back.
    pub async fn cast<B: IssueBackend>(&self, backend: &B, issue_id: &str) -> Result<VoteOutcome> {
        if backend.current_user_id().is_none() {
            return Err(CivicError::Unauthenticated);
        }

        self.begin(issue_id)?;

        match backend.cast_vote(issue_id).await {
            Ok(issue) => {
                self.commit(&issue);
                let milestone = issue.votes > 0 && issue.votes % MILESTONE_INTERVAL == 0;
                Ok(VoteOutcome { issue, milestone })
            }
            Err(CivicError::AlreadyVoted(id)) => {
                self.settle_already_voted(issue_id);
                Err(CivicError::AlreadyVoted(id))
            }
            Err(e) => {
                tracing::warn!(issue_id, "vote failed: {e}");
                self.rollback(issue_id);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_increments_and_locks() {
        let votes = VoteCoordinator::new();
        votes.track("i-1", 5, false);
        assert!(votes.state("i-1").is_enabled());

        assert_eq!(votes.begin("i-1").unwrap(), 6);
        assert_eq!(votes.state("i-1"), VoteState::Pending);
        assert!(!votes.state("i-1").is_enabled());
        assert!(matches!(
            votes.begin("i-1").unwrap_err(),
            CivicError::VoteInFlight(_)
        ));
        assert_eq!(votes.shown_votes("i-1"), Some(6));
    }

    #[test]
    fn test_rollback_restores_count_and_allows_retry() {
        let votes = VoteCoordinator::new();
        votes.track("i-1", 5, false);
        votes.begin("i-1").unwrap();
        votes.rollback("i-1");
        assert_eq!(votes.state("i-1"), VoteState::RolledBack);
        assert_eq!(votes.shown_votes("i-1"), Some(5));
        assert_eq!(votes.begin("i-1").unwrap(), 6);
    }

    #[test]
    fn test_rollback_outside_pending_is_noop() {
        let votes = VoteCoordinator::new();
        votes.track("i-1", 5, true);
        votes.rollback("i-1");
        assert_eq!(votes.state("i-1"), VoteState::Committed);
        assert_eq!(votes.shown_votes("i-1"), Some(5));
    }

    #[test]
    fn test_committed_rejects_new_vote() {
        let votes = VoteCoordinator::new();
        votes.track("i-1", 3, true);
        assert!(votes.has_voted("i-1"));
        assert!(matches!(
            votes.begin("i-1").unwrap_err(),
            CivicError::AlreadyVoted(_)
        ));
        assert_eq!(votes.shown_votes("i-1"), Some(3));
    }

    #[test]
    fn test_track_does_not_clobber_pending() {
        let votes = VoteCoordinator::new();
        votes.track("i-1", 5, false);
        votes.begin("i-1").unwrap();
        votes.track("i-1", 5, false);
        assert_eq!(votes.state("i-1"), VoteState::Pending);
        assert_eq!(votes.shown_votes("i-1"), Some(6));
    }

    #[test]
    fn test_untracked_issue_is_idle() {
        let votes = VoteCoordinator::new();
        assert_eq!(votes.state("nope"), VoteState::Idle);
        assert_eq!(votes.shown_votes("nope"), None);
        votes.forget("nope");
    }
}
