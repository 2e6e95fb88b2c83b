//! Server-side cookie sessions.
//!
//! The cookie carries 32 random bytes, base64url encoded. Only the SHA-256 digest of that value is
//! stored, so a leaked `sessions` table does not hand out live cookies.

use base64::{Engine as _, engine::general_purpose};
use chrono::Utc;
use rand::prelude::RngExt;
use rand::rng;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use crate::{
    auth::authenticator::{Authenticator, Credential, Identity, cookie_value},
    config::SessionConfig,
    db::{
        errors::DbError,
        handlers::{Repository, Sessions, Users},
        models::{sessions::SessionCreateDBRequest, users::UserDBResponse},
    },
    errors::{Error, Result},
    types::abbrev_secret,
};

/// Generate a fresh opaque session value
pub fn generate_session_token() -> String {
    let mut token_bytes = [0u8; 32];
    rng().fill(&mut token_bytes);

    general_purpose::URL_SAFE_NO_PAD.encode(token_bytes)
}

/// Database key for a session value
pub fn session_id_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// `Set-Cookie` value that stores the session in the browser.
pub fn session_cookie(token: &str, config: &SessionConfig) -> String {
    let secure = if config.cookie_secure { "; Secure" } else { "" };
    format!(
        "{}={}; Path=/; HttpOnly{}; SameSite={}; Max-Age={}",
        config.cookie_name,
        token,
        secure,
        config.cookie_same_site,
        config.timeout.as_secs()
    )
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(config: &SessionConfig) -> String {
    let secure = if config.cookie_secure { "; Secure" } else { "" };
    format!(
        "{}=; Path=/; HttpOnly{}; SameSite={}; Max-Age=0",
        config.cookie_name, secure, config.cookie_same_site
    )
}

pub struct SessionAuthenticator {
    db: SqlitePool,
    config: SessionConfig,
}

impl SessionAuthenticator {
    pub fn new(db: SqlitePool, config: SessionConfig) -> Self {
        Self { db, config }
    }
}

#[async_trait::async_trait]
impl Authenticator for SessionAuthenticator {
    #[instrument(skip(self, user), fields(user_id = user.id), err)]
    async fn issue(&self, user: &UserDBResponse) -> Result<Credential> {
        let timeout = chrono::Duration::from_std(self.config.timeout).map_err(|e| Error::Internal {
            operation: format!("convert session timeout: {e}"),
        })?;

        let token = generate_session_token();
        let now = Utc::now();
        let expires_at = now + timeout;

        let mut conn = self.db.acquire().await.map_err(DbError::from)?;
        let mut sessions = Sessions::new(&mut conn);

        let purged = sessions.delete_expired(now).await?;
        if purged > 0 {
            debug!("Purged {purged} expired sessions");
        }

        sessions
            .create(&SessionCreateDBRequest {
                id: session_id_digest(&token),
                user_id: user.id,
                expires_at,
            })
            .await?;

        Ok(Credential { value: token, expires_at })
    }

    #[instrument(skip(self, credential), fields(session = %abbrev_secret(credential)), err(level = "debug"))]
    async fn validate(&self, credential: &str) -> Result<Identity> {
        let id = session_id_digest(credential);
        let mut conn = self.db.acquire().await.map_err(DbError::from)?;

        let Some(session) = Sessions::new(&mut conn).get_by_id(id.clone()).await? else {
            return Err(Error::Unauthenticated { message: None });
        };

        if session.is_expired(Utc::now()) {
            debug!("Session expired at {}, removing", session.expires_at);
            Sessions::new(&mut conn).revoke(&id).await?;
            return Err(Error::Unauthenticated {
                message: Some("Session expired".to_string()),
            });
        }

        match Users::new(&mut conn).get_by_id(session.user_id).await? {
            Some(user) => Ok(Identity { username: user.username }),
            None => Err(Error::Unauthenticated { message: None }),
        }
    }

    #[instrument(skip(self, credential), fields(session = %abbrev_secret(credential)), err)]
    async fn revoke(&self, credential: &str) -> Result<()> {
        let mut conn = self.db.acquire().await.map_err(DbError::from)?;
        let removed = Sessions::new(&mut conn).revoke(&session_id_digest(credential)).await?;
        debug!("Session revoked: {removed}");
        Ok(())
    }

    fn credential_from<'h>(&self, headers: &'h axum::http::HeaderMap) -> Option<&'h str> {
        cookie_value(headers, &self.config.cookie_name)
    }
}
