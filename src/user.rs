//! Users as seen by the permit rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, FieldErrors, Result};
use crate::role::{Role, Roles};

/// Numeric user id.
///
/// Accounts carry the id as a string, permits carry `createdById` as a
/// number; both deserialize into this type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse()
            .map(UserId)
            .map_err(|_| Error::BadRequest(format!("Invalid user id: {s}")))
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(UserId(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// The user on whose behalf a decision is made.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActingUser {
    pub id: UserId,
    pub roles: Roles,
}

impl ActingUser {
    pub fn new(id: i64, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            id: UserId(id),
            roles: roles.into_iter().collect(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.is_admin()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role)
    }
}

/// Signed-in account returned by `POST /auth/sign-in`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: UserId,
    #[serde(default)]
    pub full_name: Option<String>,
    pub token: String,
    pub user_name: String,
    #[serde(default)]
    pub roles: Roles,
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub email: String,
}

impl Account {
    pub fn acting_user(&self) -> ActingUser {
        ActingUser {
            id: self.id,
            roles: self.roles.clone(),
        }
    }
}

/// A user record from the `user/*` endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub user_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub department_id: Option<i64>,
    #[serde(default)]
    pub department_name: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub roles: Roles,
    /// Signature image as a `data:` URL.
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub signature_updated_at: Option<String>,
}

/// Filters for the user list. Unset filters are omitted from the query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserFilters {
    pub search: Option<String>,
    pub department_id: Option<i64>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

impl UserFilters {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page_number {
            pairs.push(("pageNumber", page.to_string()));
        }
        if let Some(size) = self.page_size {
            pairs.push(("pageSize", size.to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(id) = self.department_id {
            pairs.push(("departmentId", id.to_string()));
        }
        if let Some(role) = self.role {
            pairs.push(("role", role.to_string()));
        }
        if let Some(active) = self.is_active {
            pairs.push(("isActive", active.to_string()));
        }
        pairs
    }
}

/// Shortest password the backend accepts.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Body of `POST /user/change-password`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

impl PasswordChange {
    /// Check the form before it is sent: every field filled, the new
    /// password long enough and confirmed.
    pub fn new(current: &str, new: &str, confirm: &str) -> Result<Self> {
        let mut errors = FieldErrors::new();
        if current.is_empty() {
            errors.insert("currentPassword".into(), vec!["Current password is required".into()]);
        }
        if new.chars().count() < MIN_PASSWORD_LENGTH {
            errors.insert(
                "newPassword".into(),
                vec![format!("Password must be at least {MIN_PASSWORD_LENGTH} characters")],
            );
        }
        if new != confirm {
            errors.insert("confirmPassword".into(), vec!["Passwords do not match".into()]);
        }

        if errors.is_empty() {
            Ok(Self {
                current_password: current.to_string(),
                new_password: new.to_string(),
            })
        } else {
            let message = errors.values().flatten().cloned().collect::<Vec<_>>().join("\n");
            Err(Error::ValidationFailed { message, errors })
        }
    }
}
