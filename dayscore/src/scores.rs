//! Daily score recording and window queries.
//!
//! Written against [`CurrentUser`], so the cookie-session pages and the bearer-token API share it.

use chrono::{Days, NaiveDate, Utc};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::instrument;

use crate::{
    api::models::{
        scores::{ScoreEntry, ValidScore},
        users::CurrentUser,
    },
    db::{
        errors::DbError,
        handlers::Scores,
        models::scores::{ScoreCreateDBRequest, ScoreDBResponse, ScoreFilter},
    },
    errors::Result,
};

/// Record `score` for the user on the given date, replacing any earlier score for that date.
#[instrument(skip(db, user), fields(user_id = user.id, date = %submission.date), err)]
pub async fn submit_score(db: &SqlitePool, user: &CurrentUser, submission: ValidScore) -> Result<ScoreDBResponse> {
    let mut conn = db.acquire().await.map_err(DbError::from)?;

    let stored = Scores::new(&mut conn)
        .upsert(&ScoreCreateDBRequest {
            user_id: user.id,
            date: submission.date,
            score: submission.score,
        })
        .await?;

    Ok(stored)
}

/// Scores dated from `today - window_days` through `today` (UTC, both inclusive), oldest first.
///
/// A zero window covers today only; a negative window is empty.
#[instrument(skip(db, user), fields(user_id = user.id), err)]
pub async fn get_scores(db: &SqlitePool, user: &CurrentUser, window_days: i64) -> Result<Vec<ScoreEntry>> {
    get_scores_until(db, user, window_days, Utc::now().date_naive()).await
}

/// The same window as [`get_scores`], keyed by `YYYY-MM-DD` for the dashboard.
pub async fn score_map(db: &SqlitePool, user: &CurrentUser, window_days: i64) -> Result<BTreeMap<String, i64>> {
    let scores = get_scores(db, user, window_days).await?;
    Ok(scores
        .into_iter()
        .map(|entry| (entry.date.format("%Y-%m-%d").to_string(), entry.score))
        .collect())
}

async fn get_scores_until(db: &SqlitePool, user: &CurrentUser, window_days: i64, end_date: NaiveDate) -> Result<Vec<ScoreEntry>> {
    let Some(start_date) = window_start(end_date, window_days) else {
        return Ok(Vec::new());
    };

    let mut conn = db.acquire().await.map_err(DbError::from)?;
    let scores = Scores::new(&mut conn)
        .list(&ScoreFilter {
            user_id: user.id,
            start_date,
            end_date,
        })
        .await?;

    Ok(scores.into_iter().map(ScoreEntry::from).collect())
}

/// First day of the window, or `None` when the window is empty. Windows reaching past the
/// earliest representable date are clamped to it.
pub(crate) fn window_start(end_date: NaiveDate, window_days: i64) -> Option<NaiveDate> {
    let days = u64::try_from(window_days).ok()?;
    Some(end_date.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN))
}
