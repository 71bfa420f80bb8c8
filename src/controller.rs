//! Page-level state shared by the issue list and the map.
//!
//! [`BrowseController`] owns the loaded collection and every piece of
//! filter state. The list and the map both read from it; only refresh,
//! delete and vote write the collection, and each write swaps in a new
//! `Arc<[Issue]>` so a reader holding the old one never sees a half-applied
//! change.

use std::sync::Arc;

use futures::future::join_all;

use crate::backend::IssueBackend;
use crate::error::{CivicError, Result};
use crate::map::{MapView, Marker};
use crate::pagination::{DEFAULT_PAGE_SIZE, Page, paginate};
use crate::query::{BrowseCriteria, Choice, SortKey, filter_issues};
use crate::types::{Issue, IssueCategory, IssueStatus};
use crate::vote::{VoteCoordinator, VoteOutcome, VoteState};

pub struct BrowseController {
    issues: Arc<[Issue]>,
    criteria: BrowseCriteria,
    page: usize,
    page_size: usize,
    map: MapView,
    votes: VoteCoordinator,
}

impl Default for BrowseController {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, MapView::default())
    }
}

impl BrowseController {
    pub fn new(page_size: usize, map: MapView) -> Self {
        Self {
            issues: Arc::from(Vec::new()),
            criteria: BrowseCriteria::default(),
            page: 1,
            page_size: page_size.max(1),
            map,
            votes: VoteCoordinator::new(),
        }
    }

    /// Snapshot of the current collection.
    pub fn issues(&self) -> Arc<[Issue]> {
        Arc::clone(&self.issues)
    }

    pub fn criteria(&self) -> &BrowseCriteria {
        &self.criteria
    }

    pub fn map(&self) -> &MapView {
        &self.map
    }

    pub fn votes(&self) -> &VoteCoordinator {
        &self.votes
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Swap in a freshly loaded collection.
    pub fn replace_issues(&mut self, issues: Vec<Issue>) {
        for issue in self.issues.iter() {
            if !issues.iter().any(|i| i.id == issue.id) {
                self.votes.forget(&issue.id);
            }
        }
        for issue in &issues {
            self.votes.track(&issue.id, issue.votes, false);
        }
        self.issues = Arc::from(issues);
    }

    /// Reload everything from the backend. On failure the current
    /// collection is kept so the page stays usable.
    pub async fn refresh<B: IssueBackend>(&mut self, backend: &B) -> Result<usize> {
        let issues = backend.list_issues().await?;
        let count = issues.len();
        self.replace_issues(issues);
        tracing::debug!(count, "issue collection refreshed");
        Ok(count)
    }

    /// Ask the backend which loaded issues the viewer already voted on.
    pub async fn load_vote_states<B: IssueBackend>(&self, backend: &B) -> Result<()> {
        if backend.current_user_id().is_none() {
            return Ok(());
        }
        let issues = self.issues();
        let checks = issues.iter().map(|issue| backend.has_voted(&issue.id));
        let results = join_all(checks).await;
        for (issue, voted) in issues.iter().zip(results) {
            self.votes.track(&issue.id, issue.votes, voted?);
        }
        Ok(())
    }

    /// Set the list's category. Also the external edge the map follows.
    pub fn set_category(&mut self, category: Choice<IssueCategory>) {
        self.criteria.category = category;
        self.map.sync_external_category(match category {
            Choice::All => None,
            Choice::Only(c) => Some(c),
        });
    }

    pub fn set_status(&mut self, status: Choice<IssueStatus>) {
        self.criteria.status = status;
    }

    pub fn set_search(&mut self, text: &str) {
        self.criteria.search = text.trim().to_string();
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.criteria.sort = sort;
    }

    pub fn set_page(&mut self, requested: i64) {
        self.page = usize::try_from(requested).unwrap_or(1).max(1);
    }

    /// The filtered, sorted list without paging.
    pub fn filtered(&self) -> Vec<Issue> {
        filter_issues(&self.issues, &self.criteria)
    }

    /// Current page of the list. A page past the end is clamped and the
    /// clamped value becomes the current page.
    pub fn page_view(&mut self) -> Page<Issue> {
        let filtered = self.filtered();
        let page = paginate(&filtered, self.page_size, self.page as i64);
        self.page = page.page;
        page
    }

    pub fn map_markers(&self) -> Vec<Marker> {
        self.map.markers(&self.issues)
    }

    /// Fit the map camera to what it shows. See [`MapView::reframe`].
    pub fn map_reframe(&mut self) -> bool {
        self.map.reframe(&self.issues)
    }

    /// Select an issue on the map or from the list.
    pub fn map_select(&mut self, issue_id: &str) -> bool {
        self.map.select_issue(&self.issues, issue_id)
    }

    pub fn map_clear_selection(&mut self) {
        self.map.clear_selection();
    }

    /// Tick a map category box and carry the resulting single category (or
    /// none) back into the list filter.
    pub fn map_toggle_category(&mut self, category: IssueCategory, on: bool) {
        let shared = self.map.toggle_category(category, on);
        self.criteria.category = shared.into();
    }

    pub fn map_toggle_status(&mut self, status: IssueStatus, on: bool) {
        self.map.toggle_status(status, on);
    }

    pub fn map_set_search(&mut self, text: &str) {
        self.map.set_search(text);
    }

    /// Clear list and map filters and go back to newest first.
    pub fn reset_filters(&mut self) {
        self.criteria = BrowseCriteria::default();
        self.map.reset_filters();
    }

    /// Put the backend's copy of one issue into the collection.
    pub fn apply_issue_update(&mut self, updated: Issue) {
        let issues: Vec<Issue> = self
            .issues
            .iter()
            .map(|i| if i.id == updated.id { updated.clone() } else { i.clone() })
            .collect();
        self.issues = Arc::from(issues);
    }

    /// Drop an issue from the collection and every view of it.
    pub fn remove_issue(&mut self, issue_id: &str) {
        let issues: Vec<Issue> = self
            .issues
            .iter()
            .filter(|i| i.id != issue_id)
            .cloned()
            .collect();
        self.issues = Arc::from(issues);
        self.votes.forget(issue_id);
        if self.map.selected() == Some(issue_id) {
            self.map.clear_selection();
        }
    }

    /// Delete an issue the viewer owns while it is still pending, then drop
    /// it locally.
    pub async fn delete<B: IssueBackend>(&mut self, backend: &B, issue_id: &str) -> Result<()> {
        if let Some(issue) = self.issues.iter().find(|i| i.id == issue_id) {
            issue.ensure_editable_by(backend.current_user_id().as_deref())?;
        }
        if !backend.delete_issue(issue_id).await? {
            return Err(CivicError::NotFound(issue_id.to_string()));
        }
        self.remove_issue(issue_id);
        Ok(())
    }

    /// Vote optimistically and fold the authoritative issue back in.
    pub async fn vote<B: IssueBackend>(&mut self, backend: &B, issue_id: &str) -> Result<VoteOutcome> {
        let outcome = self.votes.cast(backend, issue_id).await?;
        self.apply_issue_update(outcome.issue.clone());
        Ok(outcome)
    }

    /// Count to show for an issue, including an in-flight vote.
    pub fn shown_votes(&self, issue_id: &str) -> Option<u32> {
        self.votes.shown_votes(issue_id)
    }

    pub fn vote_state(&self, issue_id: &str) -> VoteState {
        self.votes.state(issue_id)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::backend::MemoryBackend;

    fn issue(id: &str, category: IssueCategory, votes: u32) -> Issue {
        Issue {
            id: id.to_string(),
            title: format!("Issue {id}"),
            description: "Something needs fixing".to_string(),
            category,
            location: "Oak Avenue".to_string(),
            status: IssueStatus::Pending,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
            user_id: "owner".to_string(),
            image_url: None,
            votes,
            latitude: None,
            longitude: None,
        }
    }

    fn many(n: usize) -> Vec<Issue> {
        (0..n)
            .map(|i| issue(&format!("i-{i}"), IssueCategory::Road, 0))
            .collect()
    }

    #[test]
    fn test_page_clamps_after_remove() {
        let mut controller = BrowseController::new(12, MapView::default());
        controller.replace_issues(many(25));
        controller.set_page(3);
        assert_eq!(controller.page_view().items.len(), 1);

        controller.remove_issue("i-24");
        let page = controller.page_view();
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(controller.page(), 2);
    }

    #[test]
    fn test_filter_change_keeps_page_then_clamps() {
        let mut controller = BrowseController::default();
        controller.replace_issues(many(30));
        controller.set_page(3);
        controller.set_status(Choice::Only(IssueStatus::Pending));
        assert_eq!(controller.page(), 3);
        assert_eq!(controller.page_view().page, 3);

        controller.set_search("nothing matches");
        let page = controller.page_view();
        assert_eq!(page.page, 1);
        assert!(page.items.is_empty());
        assert_eq!(controller.page(), 1);
    }

    #[test]
    fn test_snapshot_survives_mutation() {
        let mut controller = BrowseController::default();
        controller.replace_issues(many(3));
        let before = controller.issues();
        controller.remove_issue("i-0");
        assert_eq!(before.len(), 3);
        assert_eq!(controller.issues().len(), 2);
    }

    #[test]
    fn test_category_flows_both_ways() {
        let mut controller = BrowseController::default();
        controller.set_category(Choice::Only(IssueCategory::Water));
        assert_eq!(
            controller.map().filters().single_category(),
            Some(IssueCategory::Water)
        );

        controller.map_toggle_category(IssueCategory::Road, true);
        assert_eq!(controller.criteria().category, Choice::All);

        controller.map_toggle_category(IssueCategory::Water, false);
        assert_eq!(
            controller.criteria().category,
            Choice::Only(IssueCategory::Road)
        );
    }

    #[test]
    fn test_reset_restores_newest_sort() {
        let mut controller = BrowseController::default();
        controller.set_sort(SortKey::Votes);
        controller.set_search("light");
        controller.set_category(Choice::Only(IssueCategory::Electricity));
        controller.reset_filters();
        assert_eq!(controller.criteria().sort, SortKey::Newest);
        assert_eq!(controller.criteria(), &BrowseCriteria::default());
        assert!(controller.criteria().search.is_empty());
        assert_eq!(controller.criteria().category, Choice::All);
        assert_eq!(
            controller.map().filters().categories.len(),
            IssueCategory::ALL.len()
        );
    }

    #[tokio::test]
    async fn test_delete_rejects_non_pending_issue() {
        let mut resolved = issue("i-1", IssueCategory::Road, 0);
        resolved.status = IssueStatus::Resolved;
        let backend = MemoryBackend::with_issues(vec![resolved]).as_user("owner");
        let mut controller = BrowseController::default();
        controller.refresh(&backend).await.unwrap();

        let err = controller.delete(&backend, "i-1").await.unwrap_err();
        assert!(matches!(err, CivicError::NotEditable(_)));
        assert_eq!(controller.issues().len(), 1);
        assert!(backend.get_issue("i-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_requires_owner_session() {
        let backend = MemoryBackend::with_issues(vec![issue("i-1", IssueCategory::Road, 0)]);
        let mut controller = BrowseController::default();
        controller.refresh(&backend).await.unwrap();

        let err = controller.delete(&backend, "i-1").await.unwrap_err();
        assert!(matches!(err, CivicError::Unauthenticated));

        let err = controller
            .delete(&backend.as_user("stranger"), "i-1")
            .await
            .unwrap_err();
        assert!(matches!(err, CivicError::NotEditable(_)));

        controller.delete(&backend.as_user("owner"), "i-1").await.unwrap();
        assert!(controller.issues().is_empty());
    }

    #[tokio::test]
    async fn test_vote_updates_collection() {
        let backend =
            MemoryBackend::with_issues(vec![issue("i-1", IssueCategory::Road, 5)]).as_user("voter");
        let mut controller = BrowseController::default();
        controller.refresh(&backend).await.unwrap();

        let outcome = controller.vote(&backend, "i-1").await.unwrap();
        assert_eq!(outcome.issue.votes, 6);
        assert_eq!(controller.issues()[0].votes, 6);
        assert_eq!(controller.shown_votes("i-1"), Some(6));
        assert_eq!(controller.vote_state("i-1"), VoteState::Committed);
    }

    #[tokio::test]
    async fn test_load_vote_states_marks_voted() {
        let backend = MemoryBackend::with_issues(vec![
            issue("i-1", IssueCategory::Road, 0),
            issue("i-2", IssueCategory::Water, 0),
        ])
        .as_user("voter");
        backend.cast_vote("i-2").await.unwrap();

        let mut controller = BrowseController::default();
        controller.refresh(&backend).await.unwrap();
        controller.load_vote_states(&backend).await.unwrap();
        assert_eq!(controller.vote_state("i-1"), VoteState::Idle);
        assert_eq!(controller.vote_state("i-2"), VoteState::Committed);
    }

    #[tokio::test]
    async fn test_delete_missing_issue_is_not_found() {
        let backend = MemoryBackend::with_issues(vec![issue("i-1", IssueCategory::Road, 0)])
            .as_user("someone-else");
        let mut controller = BrowseController::default();
        controller.refresh(&backend).await.unwrap();
        let err = controller.delete(&backend, "i-1").await.unwrap_err();
        assert!(matches!(err, CivicError::NotFound(_)));
        assert_eq!(controller.issues().len(), 1);
    }
}
