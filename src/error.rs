//! Error types, their user-facing category, and HTTP mapping.

use std::collections::BTreeMap;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

/// Validation messages keyed by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Why an authorization check failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Denial {
    /// The permit belongs to someone else.
    NotOwner,
    /// The user lacks a role the operation needs.
    InsufficientRole,
}

/// Error type for permitdesk operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Auth errors
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Session expired: {0}")]
    AuthenticationExpired(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Forbidden: {message}")]
    AuthorizationDenied { denial: Denial, message: String },

    // Data errors
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String, errors: FieldErrors },

    #[error("Not allowed: {0}")]
    BusinessRuleViolation(String),

    #[error("Too many requests, retry later")]
    RateLimited { retry_after: Option<u64> },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unsupported media type: expected {expected}")]
    UnsupportedMediaType { expected: String },

    #[error("Remote error {status}: {message}")]
    Remote { status: u16, message: String },

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    // System errors
    #[error("Invalid address: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// The failure families users see.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    AuthenticationExpired,
    AuthorizationDenied,
    NotFound,
    ValidationFailed,
    BusinessRuleViolation,
    RateLimited,
    Unknown,
}

/// What the application does after an error is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recovery {
    /// Drop the session and go to the login screen.
    SignOut,
    /// Leave the permit and go back to the permit list.
    ReturnToList,
    /// Stay put and show the message.
    Notify,
}

impl Error {
    pub fn category(&self) -> Category {
        match self {
            Error::Unauthorized | Error::AuthenticationExpired(_) => {
                Category::AuthenticationExpired
            }
            Error::AuthorizationDenied { .. } => Category::AuthorizationDenied,
            Error::NotFound(_) => Category::NotFound,
            Error::ValidationFailed { .. } | Error::BadRequest(_) | Error::UnsupportedMediaType { .. } => {
                Category::ValidationFailed
            }
            Error::BusinessRuleViolation(_) => Category::BusinessRuleViolation,
            Error::RateLimited { .. } => Category::RateLimited,
            // Wrong credentials are reported on the login form itself.
            Error::InvalidCredentials(_)
            | Error::Remote { .. }
            | Error::Config(_)
            | Error::AddrParse(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::Network(_)
            | Error::Jwt(_)
            | Error::Internal(_) => Category::Unknown,
        }
    }

    pub fn recovery(&self) -> Recovery {
        match self.category() {
            Category::AuthenticationExpired => Recovery::SignOut,
            Category::AuthorizationDenied | Category::NotFound => Recovery::ReturnToList,
            _ => Recovery::Notify,
        }
    }

    /// Message suitable for a notification.
    pub fn user_message(&self) -> String {
        match self {
            Error::AuthenticationExpired(m)
            | Error::InvalidCredentials(m)
            | Error::NotFound(m)
            | Error::BusinessRuleViolation(m)
            | Error::BadRequest(m) => m.clone(),
            Error::AuthorizationDenied { message, .. }
            | Error::ValidationFailed { message, .. }
            | Error::Remote { message, .. } => message.clone(),
            Error::Unauthorized => "Please sign in again".to_string(),
            Error::RateLimited { .. } => "Too many requests, please try again shortly".to_string(),
            Error::Network(_) => "Unable to reach the server, check your connection".to_string(),
            _ => "An unexpected error occurred".to_string(),
        }
    }

    /// Map error to HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Auth errors -> 401/403
            Error::Unauthorized | Error::AuthenticationExpired(_) | Error::InvalidCredentials(_) => {
                StatusCode::UNAUTHORIZED
            }
            Error::AuthorizationDenied { .. } => StatusCode::FORBIDDEN,

            // Data errors -> 4xx
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::ValidationFailed { .. } | Error::BadRequest(_) | Error::AddrParse(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::BusinessRuleViolation(_) => StatusCode::CONFLICT,
            Error::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            // Upstream failures -> 502
            Error::Remote { .. } | Error::Network(_) => StatusCode::BAD_GATEWAY,

            // Config errors -> 500 (shouldn't happen at runtime)
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // System errors -> 500
            Error::Io(_)
            | Error::Json(_)
            | Error::Jwt(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert error into an RFC 7807 problem response.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status_code();
        let detail = if status.is_server_error() {
            tracing::error!("Internal error: {self}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let mut body = serde_json::json!({
            "type": "about:blank",
            "title": status.canonical_reason().unwrap_or("Error"),
            "status": status.as_u16(),
            "detail": detail,
        });
        if let Error::ValidationFailed { errors, .. } = &self {
            body["errors"] = serde_json::json!(errors);
        }

        let mut builder = Response::builder()
            .status(status)
            .header("Content-Type", "application/problem+json");
        if let Error::RateLimited {
            retry_after: Some(secs),
        } = self
        {
            builder = builder.header("Retry-After", secs.to_string());
        }
        builder
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap_or_else(|_| Response::new(Full::new(Bytes::from_static(b"{}"))))
    }
}

/// Result type alias using permitdesk's Error.
pub type Result<T> = std::result::Result<T, Error>;
