//! Translation of backend failures into [`Error`].
//!
//! The backend answers failures with RFC 7807 problem documents carrying an
//! application error code such as `WP-006-001`. A known code decides the
//! error; otherwise the HTTP status does.

use serde::{Deserialize, Serialize};

use crate::error::{Denial, Error, FieldErrors};

/// RFC 7807 problem document as sent by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Field-level validation messages.
    #[serde(default)]
    pub errors: FieldErrors,
    /// Older endpoints send a bare `message`.
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    SessionEnded,
    BadCredentials,
    Denied(Denial),
    Invalid,
    BusinessRule,
    Missing,
    Throttled,
}

/// Known application error codes.
const CODES: &[(&str, Kind)] = &[
    ("WP-002-001", Kind::SessionEnded),   // unauthenticated
    ("WP-002-002", Kind::BadCredentials), // invalid credentials
    ("WP-002-003", Kind::SessionEnded),   // token expired
    ("WP-002-006", Kind::SessionEnded),   // session expired
    ("WP-002-007", Kind::BadCredentials), // account locked
    ("WP-003-001", Kind::Denied(Denial::InsufficientRole)),
    ("WP-003-004", Kind::Denied(Denial::InsufficientRole)),
    ("WP-003-005", Kind::Denied(Denial::InsufficientRole)),
    ("WP-003-006", Kind::Denied(Denial::NotOwner)),
    ("WP-004-001", Kind::Invalid),
    ("WP-006-001", Kind::Missing),
    ("WP-007-005", Kind::Throttled),
];

fn kind_for_code(code: &str) -> Option<Kind> {
    if let Some((_, kind)) = CODES.iter().find(|(c, _)| *c == code) {
        return Some(*kind);
    }
    // Every WP-005 code is a business rule (max workers, past date, already approved, ...).
    code.starts_with("WP-005-").then_some(Kind::BusinessRule)
}

fn kind_for_status(status: u16) -> Option<Kind> {
    match status {
        400 => Some(Kind::Invalid),
        401 => Some(Kind::SessionEnded),
        403 => Some(Kind::Denied(Denial::InsufficientRole)),
        404 => Some(Kind::Missing),
        409 | 422 => Some(Kind::BusinessRule),
        429 => Some(Kind::Throttled),
        _ => None,
    }
}

/// Fallback message for a status without a usable body.
pub fn generic_message(status: u16) -> &'static str {
    match status {
        400 => "The request contains invalid data",
        401 => "Your session has expired, please sign in again",
        403 => "You do not have permission to perform this action",
        404 => "The requested item was not found",
        429 => "Too many requests, please try again shortly",
        500 => "A server error occurred, please try again later",
        503 => "The service is temporarily unavailable",
        _ => "An unexpected error occurred",
    }
}

impl Problem {
    /// Parse a failure body. Bodies that are not JSON yield an empty problem.
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    fn message(&self, status: u16) -> String {
        [&self.detail, &self.title, &self.message]
            .into_iter()
            .filter_map(|m| m.as_deref().map(str::trim))
            .find(|m| !m.is_empty())
            .unwrap_or_else(|| generic_message(status))
            .to_string()
    }

    fn validation_message(&self, status: u16) -> String {
        if self.errors.is_empty() {
            return self.message(status);
        }
        self.errors
            .values()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Turn the problem into an error, given the response status.
    pub fn into_error(self, status: u16, retry_after: Option<u64>) -> Error {
        let kind = self
            .error_code
            .as_deref()
            .and_then(kind_for_code)
            .or_else(|| kind_for_status(status));

        if let Some(code) = &self.error_code {
            tracing::warn!(code = %code, status, trace_id = ?self.trace_id, "backend rejected request");
        } else {
            tracing::warn!(status, "backend rejected request");
        }

        match kind {
            Some(Kind::SessionEnded) => Error::AuthenticationExpired(self.message(status)),
            Some(Kind::BadCredentials) => Error::InvalidCredentials(self.message(status)),
            Some(Kind::Denied(denial)) => Error::AuthorizationDenied {
                denial,
                message: self.message(status),
            },
            Some(Kind::Invalid) => Error::ValidationFailed {
                message: self.validation_message(status),
                errors: self.errors,
            },
            Some(Kind::BusinessRule) => Error::BusinessRuleViolation(self.message(status)),
            Some(Kind::Missing) => Error::NotFound(self.message(status)),
            Some(Kind::Throttled) => Error::RateLimited { retry_after },
            None => Error::Remote {
                status,
                message: self.message(status),
            },
        }
    }
}

/// Translate a failed response.
pub fn from_response(status: u16, body: &[u8], retry_after: Option<u64>) -> Error {
    Problem::parse(body).into_error(status, retry_after)
}
