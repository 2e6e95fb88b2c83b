//! HTML pages for the cookie-session deployment.
//!
//! Form errors a user can fix (bad credentials, taken username, missing fields) re-render the form
//! with a flashed message. Anything else surfaces as the usual JSON error.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};
use minijinja::context;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::{
    AppState,
    api::extractors::ValidForm,
    api::models::{
        auth::{LoginRequest, SessionRedirect, SignupRequest},
        users::CurrentUser,
    },
    auth::{
        accounts::{register_user, verify_credentials},
        authenticator::Identity,
        session::{clear_session_cookie, session_cookie},
    },
    errors::Error,
    scores,
    templates::render,
};

#[derive(Debug, PartialEq, Serialize)]
struct HeatmapCell {
    date: String,
    score: i64,
}

/// One cell per day of the dashboard window ending `today`, scored 0 where nothing was submitted.
/// Uses the same window as [`scores::score_map`], so a negative window renders no cells.
fn heatmap_cells(score_data: &BTreeMap<String, i64>, window_days: i64, today: NaiveDate) -> Vec<HeatmapCell> {
    let Some(start) = scores::window_start(today, window_days) else {
        return Vec::new();
    };

    start
        .iter_days()
        .take_while(|day| *day <= today)
        .map(|day| {
            let date = day.format("%Y-%m-%d").to_string();
            let score = score_data.get(&date).copied().unwrap_or(0);
            HeatmapCell { date, score }
        })
        .collect()
}

/// Whether an error belongs on the form rather than in a JSON error body.
fn is_form_error(error: &Error) -> bool {
    matches!(
        error,
        Error::Validation { .. } | Error::InvalidCredentials | Error::DuplicateUsername
    )
}

#[tracing::instrument(skip_all)]
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, Error> {
    render(&state.templates, "home.html", context! {})
}

#[tracing::instrument(skip_all)]
pub async fn login_page(State(state): State<AppState>) -> Result<Html<String>, Error> {
    render(&state.templates, "login.html", context! {})
}

#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, ValidForm(request): ValidForm<LoginRequest>) -> Result<Response, Error> {
    let username = request.username.clone().unwrap_or_default();

    let attempt = async {
        let user = verify_credentials(&state.db, request.validate()?).await?;
        state.authenticator.issue(&user).await
    };

    match attempt.await {
        Ok(credential) => Ok(SessionRedirect {
            location: "/dashboard",
            cookie: session_cookie(&credential.value, &state.config.auth.session),
        }
        .into_response()),
        Err(e) if is_form_error(&e) => {
            e.log();
            let page = render(
                &state.templates,
                "login.html",
                context! { flash => e.user_message(), username => username },
            )?;
            Ok(page.into_response())
        }
        Err(e) => Err(e),
    }
}

#[tracing::instrument(skip_all)]
pub async fn signup_page(State(state): State<AppState>) -> Result<Html<String>, Error> {
    render(&state.templates, "signup.html", context! {})
}

#[tracing::instrument(skip_all)]
pub async fn signup(State(state): State<AppState>, ValidForm(request): ValidForm<SignupRequest>) -> Result<Response, Error> {
    let username = request.username.clone().unwrap_or_default();
    let password_config = &state.config.auth.password;

    let attempt = async {
        let credentials = request.validate_for_signup(password_config)?;
        register_user(&state.db, credentials, password_config.argon2_params()).await
    };

    match attempt.await {
        Ok(_) => Ok(axum::response::Redirect::to("/login").into_response()),
        Err(e) if is_form_error(&e) => {
            e.log();
            let page = render(
                &state.templates,
                "signup.html",
                context! { flash => e.user_message(), username => username },
            )?;
            Ok(page.into_response())
        }
        Err(e) => Err(e),
    }
}

#[tracing::instrument(skip_all, fields(username = %identity.username))]
pub async fn logout(State(state): State<AppState>, identity: Identity, headers: HeaderMap) -> Result<SessionRedirect, Error> {
    if let Some(credential) = state.authenticator.credential_from(&headers) {
        state.authenticator.revoke(credential).await?;
    }

    Ok(SessionRedirect {
        location: "/login",
        cookie: clear_session_cookie(&state.config.auth.session),
    })
}

#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn dashboard(State(state): State<AppState>, current_user: CurrentUser) -> Result<Html<String>, Error> {
    let window_days = state.config.scores.dashboard_window_days;
    let score_data = scores::score_map(&state.db, &current_user, window_days).await?;

    let today = Utc::now().date_naive();
    let cells = heatmap_cells(&score_data, window_days, today);

    render(
        &state.templates,
        "dashboard.html",
        context! {
            username => current_user.username,
            today => today.format("%Y-%m-%d").to_string(),
            score_data => score_data,
            cells => cells,
        },
    )
}
