//! Which status changes an acting user may request.
//!
//! The transition table is data: one row per current status with the targets
//! an admin may pick and the targets anyone else may pick. A pending permit
//! that S&H has not signed yet can be rejected or cancelled but never
//! approved.
//!
//! These checks decide what the status control offers. The backend still
//! enforces the same rules and answers a disallowed change with a
//! business-rule error.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::permit::PermitSnapshot;
use crate::status::PermitStatus::{
    self, Approved, Cancelled, Completed, InProgress, Pending, Rejected,
};
use crate::user::ActingUser;

struct Row {
    from: PermitStatus,
    admin: &'static [PermitStatus],
    member: &'static [PermitStatus],
}

const TABLE: [Row; 6] = [
    Row {
        from: Pending,
        admin: &[Approved, Rejected, Cancelled],
        member: &[],
    },
    Row {
        from: Approved,
        admin: &[InProgress, Cancelled],
        member: &[InProgress],
    },
    Row {
        from: InProgress,
        admin: &[Completed, Cancelled],
        member: &[Completed],
    },
    Row {
        from: Completed,
        admin: &[],
        member: &[],
    },
    Row {
        from: Rejected,
        admin: &[Pending],
        member: &[],
    },
    Row {
        from: Cancelled,
        admin: &[Pending],
        member: &[],
    },
];

/// Targets still reachable from an unsigned pending permit.
const UNSIGNED_PENDING: [PermitStatus; 2] = [Rejected, Cancelled];

/// Statuses reachable from `current`.
///
/// For an admin on an unsigned pending permit the row is narrowed to
/// rejection or cancellation.
pub fn allowed_targets(current: PermitStatus, is_signed: bool, is_admin: bool) -> BTreeSet<PermitStatus> {
    let Some(row) = TABLE.iter().find(|r| r.from == current) else {
        return BTreeSet::new();
    };

    let column = if is_admin { row.admin } else { row.member };
    let sign_gated = current == Pending && !is_signed && is_admin;

    column
        .iter()
        .copied()
        .filter(|target| !sign_gated || UNSIGNED_PENDING.contains(target))
        .collect()
}

/// Statuses `user` may move `permit` to.
///
/// A missing signed flag does not trigger the sign-gate; only an explicit
/// "not signed" does.
pub fn targets_for(permit: &PermitSnapshot, user: &ActingUser) -> BTreeSet<PermitStatus> {
    allowed_targets(permit.status, !permit.is_explicitly_unsigned(), user.is_admin())
}

/// Whether the status control is offered at all.
///
/// Admins may open it on anything but a completed permit; everyone else only
/// while the permit is approved or in progress. Whether any target ends up
/// selectable is decided separately by [`allowed_targets`].
pub fn can_initiate_change(permit: &PermitSnapshot, user: &ActingUser) -> bool {
    if user.is_admin() {
        permit.status != Completed
    } else {
        matches!(permit.status, Approved | InProgress)
    }
}

/// Check a requested change before sending it to the backend.
pub fn authorize_change(permit: &PermitSnapshot, user: &ActingUser, target: PermitStatus) -> Result<()> {
    if !can_initiate_change(permit, user) {
        return Err(Error::BusinessRuleViolation(format!(
            "Status of a {} permit cannot be changed",
            permit.status
        )));
    }
    if !targets_for(permit, user).contains(&target) {
        if permit.status == Pending && target == Approved && permit.is_explicitly_unsigned() {
            return Err(Error::BusinessRuleViolation(
                "Permit must be signed by Safety & Health before approval".to_string(),
            ));
        }
        return Err(Error::BusinessRuleViolation(format!(
            "Transition from {} to {} is not allowed",
            permit.status, target
        )));
    }
    Ok(())
}
