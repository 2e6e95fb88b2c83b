//! The credential capability shared by both authentication variants.

use axum::http::{HeaderMap, header};
use chrono::{DateTime, Utc};

use crate::{db::models::users::UserDBResponse, errors::Result};

/// A credential handed to a client after a successful login.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Opaque session value or signed JWT
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// Who a valid credential speaks for. Nothing beyond the username is trusted from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

/// Issues, validates and revokes credentials.
///
/// Handlers and extractors only talk to this trait, so the score and account logic is written once
/// for both the cookie-session and bearer-token deployments.
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    /// Mint a credential for a user whose password has just been verified.
    async fn issue(&self, user: &UserDBResponse) -> Result<Credential>;

    /// Check a credential. Invalid, expired or revoked credentials yield `Error::Unauthenticated`.
    async fn validate(&self, credential: &str) -> Result<Identity>;

    /// Invalidate a credential. A no-op where the server keeps no state.
    async fn revoke(&self, credential: &str) -> Result<()>;

    /// Locate the raw credential in request headers, if any.
    fn credential_from<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str>;
}

/// Value of the named cookie from the `Cookie` header(s).
pub fn cookie_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(cookie_name, _)| *cookie_name == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
