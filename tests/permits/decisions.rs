//! Edit, transition and export rules through the public API.

use std::collections::BTreeSet;

use permitdesk::PermitStatus::{self, Approved, Cancelled, Completed, InProgress, Pending, Rejected};
use permitdesk::access::Access;
use permitdesk::form::{self, ACTUAL_END_DATE, ACTUAL_END_TIME};
use permitdesk::{
    ActingUser, EditMode, PermitSnapshot, Role, UserId, allowed_targets, can_export,
    can_initiate_change, permission,
};

const OWNER: i64 = 7;

fn permit(status: PermitStatus, signed: bool) -> PermitSnapshot {
    PermitSnapshot::new(41, status, UserId(OWNER), signed)
}

fn users() -> Vec<ActingUser> {
    vec![
        ActingUser::new(OWNER, [Role::User]),
        ActingUser::new(8, [Role::User]),
        ActingUser::new(9, [Role::Supervisor]),
        ActingUser::new(10, [Role::SafetyHealth]),
        ActingUser::new(1, [Role::Admin]),
        ActingUser::new(OWNER, [Role::Admin, Role::User]),
    ]
}

fn set<const N: usize>(statuses: [PermitStatus; N]) -> BTreeSet<PermitStatus> {
    statuses.into_iter().collect()
}

#[test]
fn closed_permits_are_read_only_for_everyone() {
    for status in [Cancelled, Rejected] {
        for user in users() {
            for signed in [true, false] {
                assert_eq!(
                    permission::evaluate(Some(&permit(status, signed)), &user),
                    EditMode::ReadOnly,
                    "{status} for {user:?}"
                );
            }
        }
    }
}

#[test]
fn completed_is_editable_by_admins_only() {
    for user in users() {
        let expected = if user.is_admin() {
            EditMode::Full
        } else {
            EditMode::ReadOnly
        };
        assert_eq!(permission::evaluate(Some(&permit(Completed, true)), &user), expected);
    }
}

#[test]
fn owner_edits_pending_in_full() {
    let owner = ActingUser::new(OWNER, [Role::User]);
    assert_eq!(permission::evaluate(Some(&permit(Pending, false)), &owner), EditMode::Full);
}

#[test]
fn owner_in_flight_edits_only_actual_end() {
    let owner = ActingUser::new(OWNER, [Role::User]);
    for status in [Approved, InProgress] {
        let mode = permission::evaluate(Some(&permit(status, true)), &owner);
        assert_eq!(mode, EditMode::Limited);
        assert_eq!(
            form::for_mode(mode).enabled_fields(),
            [ACTUAL_END_DATE, ACTUAL_END_TIME].map(String::from).into_iter().collect()
        );
    }
}

#[test]
fn non_owner_non_admin_cannot_edit_open_permits() {
    let stranger = ActingUser::new(8, [Role::Supervisor, Role::SafetyHealth]);
    for status in [Pending, Approved, InProgress] {
        assert_eq!(
            permission::evaluate(Some(&permit(status, true)), &stranger),
            EditMode::ReadOnly
        );
    }
}

#[test]
fn new_permit_is_fully_editable() {
    for user in users() {
        assert_eq!(permission::evaluate(None, &user), EditMode::Full);
    }
}

#[test]
fn sign_gate_on_pending() {
    assert_eq!(allowed_targets(Pending, false, true), set([Rejected, Cancelled]));
    assert_eq!(allowed_targets(Pending, true, true), set([Approved, Rejected, Cancelled]));
}

#[test]
fn completed_has_no_targets() {
    for signed in [true, false] {
        for admin in [true, false] {
            assert!(allowed_targets(Completed, signed, admin).is_empty());
        }
    }
}

#[test]
fn export_rules() {
    for signed in [true, false] {
        assert!(!can_export(&permit(Pending, signed)));
        for status in [Approved, InProgress, Completed] {
            assert!(can_export(&permit(status, signed)));
        }
    }
    assert!(!can_export(&permit(Rejected, false)));
    assert!(can_export(&permit(Rejected, true)));
}

#[test]
fn decisions_are_repeatable() {
    for status in PermitStatus::ALL {
        for user in users() {
            let p = permit(status, false);
            assert_eq!(
                permission::evaluate(Some(&p), &user),
                permission::evaluate(Some(&p), &user)
            );
            assert_eq!(
                allowed_targets(status, false, user.is_admin()),
                allowed_targets(status, false, user.is_admin())
            );
        }
    }
}

#[test]
fn owner_on_approved_permit_end_to_end() {
    let permit = permit(Approved, true);
    let user = ActingUser::new(OWNER, [Role::User]);

    assert_eq!(permission::evaluate(Some(&permit), &user), EditMode::Limited);
    assert!(can_initiate_change(&permit, &user));
    assert_eq!(allowed_targets(Approved, true, false), set([InProgress]));
    assert!(can_export(&permit));

    let access = Access::compute(Some(&permit), &user);
    assert_eq!(access.edit_mode, EditMode::Limited);
    assert_eq!(access.allowed_targets, set([InProgress]));
    assert!(access.can_initiate_change);
    assert!(access.can_export);
}

#[test]
fn every_reachable_target_is_a_different_status() {
    for status in PermitStatus::ALL {
        for signed in [true, false] {
            for admin in [true, false] {
                assert!(!allowed_targets(status, signed, admin).contains(&status));
            }
        }
    }
}
