//! Database models for daily scores.

use crate::types::{ScoreId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database request for recording a score. Used for both plain inserts and upserts.
#[derive(Debug, Clone)]
pub struct ScoreCreateDBRequest {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub score: i64,
}

/// Database response for a score
#[derive(Debug, Clone, FromRow)]
pub struct ScoreDBResponse {
    pub id: ScoreId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub score: i64,
    pub created_at: DateTime<Utc>,
}

/// Filter for listing one user's scores between two dates (both inclusive)
#[derive(Debug, Clone)]
pub struct ScoreFilter {
    pub user_id: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
