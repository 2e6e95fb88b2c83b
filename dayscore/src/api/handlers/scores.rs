//! Score submission and listing endpoints.
//!
//! The session deployment mounts the form variant at `/submit_score` and the listing at
//! `/get_scores`; the token deployment mounts the JSON variant and listing under `/api`.

use axum::{Json, extract::State};

use crate::{
    AppState,
    api::extractors::{ValidForm, ValidJson, ValidQuery},
    api::models::{
        auth::MessageResponse,
        scores::{ScoreEntry, ScoreSubmission, ScoreWindowQuery},
        users::CurrentUser,
    },
    errors::Error,
    scores,
};

const SUBMITTED: &str = "Score submitted successfully";

/// Record today's (or any day's) score from a JSON body
#[utoipa::path(
    post,
    path = "/api/submit_score",
    request_body = ScoreSubmission,
    tag = "scores",
    responses(
        (status = 200, description = "Score stored", body = MessageResponse),
        (status = 400, description = "Missing or invalid date or score", body = crate::errors::ErrorBody),
        (status = 401, description = "Missing, invalid or expired token", body = crate::errors::ErrorBody),
        (status = 404, description = "The token's user no longer exists", body = crate::errors::ErrorBody),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn submit_score_json(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidJson(submission): ValidJson<ScoreSubmission>,
) -> Result<Json<MessageResponse>, Error> {
    scores::submit_score(&state.db, &current_user, submission.validate()?).await?;
    Ok(Json(MessageResponse::new(SUBMITTED)))
}

/// Record a score from a form-encoded body
#[utoipa::path(
    post,
    path = "/submit_score",
    request_body(content = ScoreSubmission, content_type = "application/x-www-form-urlencoded"),
    tag = "scores",
    responses(
        (status = 200, description = "Score stored", body = MessageResponse),
        (status = 400, description = "Missing or invalid date or score", body = crate::errors::ErrorBody),
        (status = 401, description = "No valid session", body = crate::errors::ErrorBody),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn submit_score_form(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidForm(submission): ValidForm<ScoreSubmission>,
) -> Result<Json<MessageResponse>, Error> {
    scores::submit_score(&state.db, &current_user, submission.validate()?).await?;
    Ok(Json(MessageResponse::new(SUBMITTED)))
}

/// List the caller's scores for the last `days` days, oldest first
#[utoipa::path(
    get,
    path = "/api/get_scores",
    params(ScoreWindowQuery),
    tag = "scores",
    responses(
        (status = 200, description = "Scores in the window", body = [ScoreEntry]),
        (status = 401, description = "Missing, invalid or expired credential", body = crate::errors::ErrorBody),
    ),
    security(("bearer" = []), ("session_cookie" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn get_scores(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidQuery(query): ValidQuery<ScoreWindowQuery>,
) -> Result<Json<Vec<ScoreEntry>>, Error> {
    let days = query.days.unwrap_or_else(|| state.config.default_window_days());
    Ok(Json(scores::get_scores(&state.db, &current_user, days).await?))
}
