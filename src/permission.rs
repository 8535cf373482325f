//! Edit permission for the permit form.
//!
//! [`evaluate`] decides how much of a permit the acting user may change. The
//! decision is an ordered list of guards; the first one that applies wins and
//! anything no guard claims is read-only.
//!
//! # Example
//!
//! ```
//! use permitdesk::permission::{self, EditMode};
//! use permitdesk::{ActingUser, PermitSnapshot, PermitStatus, Role, UserId};
//!
//! let owner = ActingUser::new(7, [Role::User]);
//! let permit = PermitSnapshot::new(41, PermitStatus::Approved, UserId(7), true);
//!
//! assert_eq!(permission::evaluate(Some(&permit), &owner), EditMode::Limited);
//! assert_eq!(permission::evaluate(None, &owner), EditMode::Full);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::permit::PermitSnapshot;
use crate::status::PermitStatus;
use crate::user::ActingUser;

/// How much of the permit form may be changed.
///
/// Ordered from least to most permissive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    /// Nothing may change.
    ReadOnly,
    /// Only the actual end date and time may change.
    Limited,
    /// Every field may change.
    Full,
}

impl EditMode {
    pub fn allows_any_edit(self) -> bool {
        self > EditMode::ReadOnly
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EditMode::ReadOnly => "readonly",
            EditMode::Limited => "limited",
            EditMode::Full => "full",
        }
    }

    /// Banner shown above the form.
    pub fn banner(self) -> &'static str {
        match self {
            EditMode::Full => "You can edit every field",
            EditMode::Limited => "You can only edit the actual end date and time",
            EditMode::ReadOnly => "This permit is read-only",
        }
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs every guard looks at.
#[derive(Clone, Copy, Debug)]
struct Facts {
    status: PermitStatus,
    is_admin: bool,
    is_owner: bool,
}

struct Guard {
    name: &'static str,
    applies: fn(&Facts) -> bool,
    mode: EditMode,
}

const GUARDS: [Guard; 4] = [
    Guard {
        name: "closed",
        applies: |f| {
            matches!(f.status, PermitStatus::Cancelled | PermitStatus::Rejected)
                || (f.status == PermitStatus::Completed && !f.is_admin)
        },
        mode: EditMode::ReadOnly,
    },
    Guard {
        name: "admin",
        applies: |f| f.is_admin,
        mode: EditMode::Full,
    },
    Guard {
        name: "owner-draft",
        applies: |f| {
            f.is_owner && matches!(f.status, PermitStatus::Pending | PermitStatus::Rejected)
        },
        mode: EditMode::Full,
    },
    Guard {
        name: "owner-in-flight",
        applies: |f| {
            f.is_owner && matches!(f.status, PermitStatus::Approved | PermitStatus::InProgress)
        },
        mode: EditMode::Limited,
    },
];

/// Decide the edit mode for `user` on `permit`.
///
/// `None` means a permit that is being created and always gets full access.
pub fn evaluate(permit: Option<&PermitSnapshot>, user: &ActingUser) -> EditMode {
    let Some(permit) = permit else {
        return EditMode::Full;
    };

    let facts = Facts {
        status: permit.status,
        is_admin: user.is_admin(),
        is_owner: permit.is_owned_by(user.id),
    };

    match GUARDS.iter().find(|g| (g.applies)(&facts)) {
        Some(guard) => {
            tracing::debug!(
                permit = permit.id,
                user = %user.id,
                guard = guard.name,
                mode = %guard.mode,
                "edit mode decided"
            );
            guard.mode
        }
        None => EditMode::ReadOnly,
    }
}

/// Whether a completed permit is shown to a non-admin, who sees a warning
/// that it can no longer be changed.
pub fn shows_completed_warning(permit: &PermitSnapshot, user: &ActingUser) -> bool {
    permit.status == PermitStatus::Completed && !user.is_admin()
}
