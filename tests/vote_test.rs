mod common;

use common::six_issues;

use civicsync::backend::{IssueBackend, MemoryBackend};
use civicsync::controller::BrowseController;
use civicsync::error::CivicError;
use civicsync::vote::{VoteCoordinator, VoteState};

fn backend_with_five_votes() -> MemoryBackend {
    let mut issues = six_issues();
    issues[0].votes = 5;
    MemoryBackend::with_issues(issues).as_user("voter")
}

#[tokio::test]
async fn test_vote_increments_once() {
    let backend = backend_with_five_votes();
    let mut controller = BrowseController::default();
    controller.refresh(&backend).await.unwrap();
    assert_eq!(controller.shown_votes("1"), Some(5));

    let outcome = controller.vote(&backend, "1").await.unwrap();
    assert_eq!(outcome.issue.votes, 6);
    assert!(!outcome.milestone);
    assert_eq!(controller.shown_votes("1"), Some(6));
    assert_eq!(controller.vote_state("1"), VoteState::Committed);
    assert!(backend.has_voted("1").await.unwrap());

    let err = controller.vote(&backend, "1").await.unwrap_err();
    assert!(matches!(err, CivicError::AlreadyVoted(_)));
    assert_eq!(controller.shown_votes("1"), Some(6));

    let stored = backend.get_issue("1").await.unwrap().unwrap();
    assert_eq!(stored.votes, 6);
    assert_eq!(backend.vote_count(), 1);
}

#[tokio::test]
async fn test_concurrent_casts_store_one_vote() {
    let backend = backend_with_five_votes();
    let votes = VoteCoordinator::new();
    votes.track("1", 5, false);

    let (first, second) = tokio::join!(votes.cast(&backend, "1"), votes.cast(&backend, "1"));
    let succeeded = [first.is_ok(), second.is_ok()]
        .iter()
        .filter(|ok| **ok)
        .count();
    assert_eq!(succeeded, 1);
    assert_eq!(backend.vote_count(), 1);
    assert_eq!(backend.get_issue("1").await.unwrap().unwrap().votes, 6);
    assert_eq!(votes.shown_votes("1"), Some(6));
}

#[tokio::test]
async fn test_two_devices_same_user_store_one_vote() {
    let backend = backend_with_five_votes();
    let phone = VoteCoordinator::new();
    let laptop = VoteCoordinator::new();
    phone.track("1", 5, false);
    laptop.track("1", 5, false);

    phone.cast(&backend, "1").await.unwrap();
    let err = laptop.cast(&backend, "1").await.unwrap_err();
    assert!(matches!(err, CivicError::AlreadyVoted(_)));

    // The laptop drops its optimistic guess and disables the control.
    assert_eq!(laptop.shown_votes("1"), Some(5));
    assert!(!laptop.state("1").is_enabled());
    assert_eq!(backend.vote_count(), 1);
}

#[tokio::test]
async fn test_signed_out_vote_changes_nothing() {
    let backend = backend_with_five_votes().signed_out();
    let votes = VoteCoordinator::new();
    votes.track("1", 5, false);

    let err = votes.cast(&backend, "1").await.unwrap_err();
    assert!(matches!(err, CivicError::Unauthenticated));
    assert_eq!(votes.shown_votes("1"), Some(5));
    assert_eq!(votes.state("1"), VoteState::Idle);
    assert_eq!(backend.vote_count(), 0);
}

#[tokio::test]
async fn test_failed_vote_rolls_back() {
    let backend = backend_with_five_votes();
    let votes = VoteCoordinator::new();
    votes.track("missing", 3, false);

    let err = votes.cast(&backend, "missing").await.unwrap_err();
    assert!(matches!(err, CivicError::NotFound(_)));
    assert_eq!(votes.shown_votes("missing"), Some(3));
    assert_eq!(votes.state("missing"), VoteState::RolledBack);
    assert!(votes.state("missing").is_enabled());
}

#[tokio::test]
async fn test_tenth_vote_is_a_milestone() {
    let mut issues = six_issues();
    issues[0].votes = 9;
    let backend = MemoryBackend::with_issues(issues).as_user("voter");
    let votes = VoteCoordinator::new();

    let outcome = votes.cast(&backend, "1").await.unwrap();
    assert_eq!(outcome.issue.votes, 10);
    assert!(outcome.milestone);
}

#[tokio::test]
async fn test_load_vote_states_marks_prior_votes() {
    let backend = backend_with_five_votes();
    backend.cast_vote("2").await.unwrap();

    let mut controller = BrowseController::default();
    controller.refresh(&backend).await.unwrap();
    assert_eq!(controller.vote_state("2"), VoteState::Idle);

    controller.load_vote_states(&backend).await.unwrap();
    assert_eq!(controller.vote_state("2"), VoteState::Committed);
    assert_eq!(controller.vote_state("1"), VoteState::Idle);
}
