//! Database models for server-side sessions.

use crate::types::UserId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database entity model. `id` is the SHA-256 hex digest of the cookie value.
#[derive(Debug, Clone, FromRow)]
pub struct SessionDBResponse {
    pub id: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionDBResponse {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Request for creating a session
#[derive(Debug, Clone)]
pub struct SessionCreateDBRequest {
    pub id: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}
