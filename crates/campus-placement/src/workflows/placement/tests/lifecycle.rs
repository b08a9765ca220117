use super::common::*;
use chrono::Duration;

use crate::workflows::placement::domain::ApplicationStatus;
use crate::workflows::placement::lifecycle::{transition, InvalidTransition, TransitionPolicy};

#[test]
fn permissive_policy_allows_any_overwrite() {
    let mut application = application("app-1", "job-1", "stu-a");
    application.status = ApplicationStatus::Hired;
    let later = now() + Duration::hours(2);

    let change = transition(
        &mut application,
        ApplicationStatus::Applied,
        TransitionPolicy::Permissive,
        later,
    )
    .expect("permissive accepts reopening");

    assert_eq!(change.previous, ApplicationStatus::Hired);
    assert_eq!(application.status, ApplicationStatus::Applied);
    assert_eq!(application.status_updated_at, later);
}

#[test]
fn same_status_write_still_stamps_time() {
    let mut application = application("app-1", "job-1", "stu-a");
    let later = now() + Duration::minutes(5);

    let change = transition(
        &mut application,
        ApplicationStatus::Applied,
        TransitionPolicy::Permissive,
        later,
    )
    .expect("no-op write allowed");

    assert!(!change.changed());
    assert_eq!(application.status_updated_at, later);
}

#[test]
fn forward_only_follows_lattice() {
    use ApplicationStatus::*;

    let policy = TransitionPolicy::ForwardOnly;
    for (from, to) in [
        (Applied, Shortlisted),
        (Applied, Rejected),
        (Applied, Hired),
        (Shortlisted, Rejected),
        (Shortlisted, Hired),
    ] {
        assert!(policy.permits(from, to), "{from:?} -> {to:?} should be allowed");
    }

    for (from, to) in [
        (Hired, Applied),
        (Rejected, Shortlisted),
        (Shortlisted, Applied),
        (Applied, Applied),
        (Hired, Rejected),
    ] {
        assert!(!policy.permits(from, to), "{from:?} -> {to:?} should be refused");
    }
}

#[test]
fn forward_only_rejection_leaves_application_untouched() {
    let mut application = application("app-1", "job-1", "stu-a");
    application.status = ApplicationStatus::Hired;
    let before = application.clone();

    let err = transition(
        &mut application,
        ApplicationStatus::Applied,
        TransitionPolicy::ForwardOnly,
        now() + Duration::hours(1),
    )
    .expect_err("hired cannot reopen");

    assert_eq!(
        err,
        InvalidTransition {
            from: ApplicationStatus::Hired,
            to: ApplicationStatus::Applied,
        }
    );
    assert_eq!(application, before);
}

#[test]
fn policy_parses_configuration_spellings() {
    assert_eq!(
        TransitionPolicy::parse("forward-only"),
        Some(TransitionPolicy::ForwardOnly)
    );
    assert_eq!(
        TransitionPolicy::parse(" Permissive "),
        Some(TransitionPolicy::Permissive)
    );
    assert_eq!(TransitionPolicy::parse("loose"), None);
}

#[test]
fn terminal_statuses() {
    assert!(ApplicationStatus::Hired.is_terminal());
    assert!(ApplicationStatus::Rejected.is_terminal());
    assert!(!ApplicationStatus::Shortlisted.is_terminal());
}
