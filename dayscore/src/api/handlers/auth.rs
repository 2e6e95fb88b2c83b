//! JSON authentication endpoints for the bearer-token deployment.

use axum::{Json, extract::State};

use crate::{
    AppState,
    api::extractors::ValidJson,
    api::models::auth::{LoginRequest, LoginResponse, SignupRequest, SignupResponse, ValidateTokenResponse},
    auth::{
        accounts::{register_user, verify_credentials},
        authenticator::Identity,
    },
    errors::Error,
};

/// Register a new user account
#[utoipa::path(
    post,
    path = "/api/signup",
    request_body = SignupRequest,
    tag = "authentication",
    responses(
        (status = 201, description = "User created", body = crate::api::models::auth::MessageResponse),
        (status = 400, description = "Missing fields, password policy violation or username taken", body = crate::errors::ErrorBody),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn signup(State(state): State<AppState>, ValidJson(request): ValidJson<SignupRequest>) -> Result<SignupResponse, Error> {
    let password_config = &state.config.auth.password;
    let credentials = request.validate_for_signup(password_config)?;

    register_user(&state.db, credentials, password_config.argon2_params()).await?;

    Ok(SignupResponse)
}

/// Exchange a username and password for a bearer token
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing fields", body = crate::errors::ErrorBody),
        (status = 401, description = "Invalid username or password", body = crate::errors::ErrorBody),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, ValidJson(request): ValidJson<LoginRequest>) -> Result<Json<LoginResponse>, Error> {
    let user = verify_credentials(&state.db, request.validate()?).await?;
    let credential = state.authenticator.issue(&user).await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token: credential.value,
    }))
}

/// Check a bearer token and report whose it is
#[utoipa::path(
    get,
    path = "/api/validate_token",
    tag = "authentication",
    responses(
        (status = 200, description = "Token is valid", body = ValidateTokenResponse),
        (status = 401, description = "Missing, invalid or expired token", body = crate::errors::ErrorBody),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn validate_token(identity: Identity) -> Json<ValidateTokenResponse> {
    Json(ValidateTokenResponse {
        username: identity.username,
    })
}
