//! Bearer token issuing and verification.
//!
//! Tokens carry the user id and role names so the decision service can build
//! an [`ActingUser`] without another lookup. Passwords never pass through
//! this crate; the remote API signs users in.

use hyper::http::HeaderMap;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Auth as AuthConfig;
use crate::error::{Error, Result};
use crate::role::Roles;
use crate::user::{ActingUser, UserId};

const MIN_SECRET_LENGTH: usize = 32;

fn validate_secret(config: &AuthConfig) -> Result<()> {
    if config.jwt_secret.len() < MIN_SECRET_LENGTH {
        return Err(Error::Config(format!(
            "JWT secret must be at least {MIN_SECRET_LENGTH} bytes"
        )));
    }
    Ok(())
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Role names; unknown names are dropped on read.
    #[serde(default)]
    pub roles: Roles,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn acting_user(&self) -> Result<ActingUser> {
        let id: UserId = self.sub.parse().map_err(|_| Error::Unauthorized)?;
        Ok(ActingUser {
            id,
            roles: self.roles.clone(),
        })
    }
}

/// Issue a token for `user`.
pub fn create_token(config: &AuthConfig, user: &ActingUser) -> Result<String> {
    validate_secret(config)?;
    let now = jiff::Timestamp::now();
    let hours = i64::from(config.token_expiry_days) * 24;
    let exp = now + jiff::Span::new().hours(hours);

    let claims = Claims {
        sub: user.id.to_string(),
        roles: user.roles.clone(),
        exp: exp.as_second(),
        iat: now.as_second(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Token creation failed: {e}")))
}

/// Verify and decode a token.
///
/// An expired token is [`Error::AuthenticationExpired`]; any other failure
/// is [`Error::Unauthorized`].
pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims> {
    validate_secret(config)?;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            Error::AuthenticationExpired("Your session has expired, please sign in again".into())
        }
        _ => Error::Unauthorized,
    })?;

    Ok(data.claims)
}

/// Read the token from an `Authorization: Bearer <token>` header.
pub fn bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("Authorization")?.to_str().ok()?;
    value
        .get(..7)
        .filter(|p| p.eq_ignore_ascii_case("bearer "))
        .map(|_| value[7..].trim())
        .filter(|t| !t.is_empty())
}

/// Resolve the acting user from request headers.
pub fn extract_user(headers: &HeaderMap, config: &AuthConfig) -> Result<ActingUser> {
    let token = bearer(headers).ok_or(Error::Unauthorized)?;
    verify_token(config, token)?.acting_user()
}
