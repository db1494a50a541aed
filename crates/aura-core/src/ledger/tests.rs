//! Tests for the submission record and transition table.

use super::*;

use SubmissionStatus::{Approved, Pending, Rejected, Withdrawn};

#[test]
fn pending_can_reach_every_review_outcome() {
    assert!(can_transition(Pending, Approved));
    assert!(can_transition(Pending, Rejected));
    assert!(can_transition(Pending, Withdrawn));
}

#[test]
fn corrections_are_reversible() {
    assert!(can_transition(Approved, Rejected));
    assert!(can_transition(Rejected, Approved));
    // Re-issuing the current status is legal (idempotent review).
    assert!(can_transition(Approved, Approved));
    assert!(can_transition(Rejected, Rejected));
}

#[test]
fn withdrawn_is_terminal() {
    assert!(!can_transition(Withdrawn, Pending));
    assert!(!can_transition(Withdrawn, Approved));
    assert!(!can_transition(Withdrawn, Rejected));
    assert!(!can_transition(Withdrawn, Withdrawn));
}

#[test]
fn reviewed_submissions_cannot_be_withdrawn() {
    assert!(!can_transition(Approved, Withdrawn));
    assert!(!can_transition(Rejected, Withdrawn));
}

#[test]
fn nothing_returns_to_pending() {
    assert!(!can_transition(Approved, Pending));
    assert!(!can_transition(Rejected, Pending));
    assert!(!can_transition(Pending, Pending));
}

#[test]
fn status_string_form_round_trips() {
    for status in [Pending, Approved, Rejected, Withdrawn] {
        assert_eq!(status.as_str().parse::<SubmissionStatus>(), Ok(status));
    }
    assert!("garbage".parse::<SubmissionStatus>().is_err());
}

#[test]
fn new_submission_starts_pending() {
    let sub = Submission::new("s1", "alice", "t-1", Some(10), "did the thing");
    assert_eq!(sub.status, Pending);
    assert_eq!(sub.base_points, Some(10));
    assert_eq!(sub.final_points, 0);
    assert!(sub.withdrawn_at_ms.is_none());
    assert!(sub.id.starts_with("s-"));
}
