//! Departments a permit can be filed for.
//!
//! Admins may file for any department. Everyone else files for their own
//! department only, and it is picked for them.

use serde::{Deserialize, Serialize};

use crate::user::ActingUser;

/// Page size used when loading the department lookup.
pub const LOOKUP_PAGE_SIZE: u32 = 30;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
}

/// Departments offered on the permit form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentChoice {
    pub options: Vec<Department>,
    /// Filled in without asking when exactly one department is offered to a
    /// non-admin.
    pub preselected: Option<i64>,
}

impl DepartmentChoice {
    /// Narrow `all` to what `user` may pick. `home` is the user's own
    /// department, if the account has one.
    pub fn for_user(all: Vec<Department>, user: &ActingUser, home: Option<i64>) -> Self {
        if user.is_admin() {
            return Self {
                options: all,
                preselected: None,
            };
        }

        let Some(home) = home else {
            tracing::debug!(user = %user.id, "user has no department; nothing to offer");
            return Self::default();
        };

        let options: Vec<Department> = all.into_iter().filter(|d| d.id == home).collect();
        let preselected = match options.as_slice() {
            [only] => Some(only.id),
            _ => None,
        };
        Self {
            options,
            preselected,
        }
    }

    pub fn allows(&self, department_id: i64) -> bool {
        self.options.iter().any(|d| d.id == department_id)
    }
}
