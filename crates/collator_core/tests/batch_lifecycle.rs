use collator_core::{BatchOutcome, BatchState};
use pretty_assertions::assert_eq;

#[test]
fn submit_moves_idle_to_in_flight() {
    assert_eq!(BatchState::Idle.submit(), BatchState::FanOutInFlight);
}

#[test]
fn settle_without_failures_is_all_succeeded() {
    let state = BatchState::Idle.submit().settle(0);
    assert_eq!(state, BatchState::AllSucceeded);
}

#[test]
fn settle_with_failures_is_partially_failed() {
    let state = BatchState::Idle.submit().settle(3);
    assert_eq!(state, BatchState::PartiallyFailed);
}

#[test]
fn finish_reaches_done_from_either_settled_state() {
    assert_eq!(BatchState::AllSucceeded.finish(), BatchState::Done);
    assert_eq!(BatchState::PartiallyFailed.finish(), BatchState::Done);
    assert!(BatchState::PartiallyFailed.finish().is_terminal());
}

#[test]
fn illegal_transitions_leave_state_unchanged() {
    // There is no path back out of Done, and settling an idle batch is a no-op.
    assert_eq!(BatchState::Done.submit(), BatchState::Done);
    assert_eq!(BatchState::Idle.settle(1), BatchState::Idle);
    assert_eq!(BatchState::FanOutInFlight.finish(), BatchState::FanOutInFlight);
}

#[test]
fn outcome_counts_successes_and_failures() {
    let mut outcome = BatchOutcome::new(5);
    assert_eq!(outcome.state(), BatchState::FanOutInFlight);

    for _ in 0..4 {
        outcome.record_success();
    }
    outcome.record_failure("3", "connection reset");
    outcome.settle();

    assert_eq!(outcome.submitted(), 5);
    assert_eq!(outcome.succeeded(), 4);
    assert_eq!(outcome.failures().len(), 1);
    assert_eq!(outcome.failures()[0].key, "3");
    assert_eq!(outcome.state(), BatchState::PartiallyFailed);
    assert!(!outcome.all_succeeded());
}

#[test]
fn empty_outcome_settles_as_all_succeeded() {
    let mut outcome = BatchOutcome::new(0);
    outcome.settle();
    assert_eq!(outcome.state(), BatchState::AllSucceeded);
    assert!(outcome.all_succeeded());
}
