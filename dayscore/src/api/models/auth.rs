//! Request/response payloads for signup, login and token validation.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{config::PasswordConfig, errors::Error};

/// Signup or login payload as sent by the client. Both the JSON API and the HTML forms use it.
///
/// Fields are optional so a missing field becomes a 400 with a readable message instead of an
/// extractor rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

pub type SignupRequest = CredentialsRequest;
pub type LoginRequest = CredentialsRequest;

/// Credentials that passed shape validation.
#[derive(Debug, Clone)]
pub struct ValidCredentials {
    pub username: String,
    pub password: String,
}

impl CredentialsRequest {
    /// Both fields present and non-empty. The username is trimmed, the password is taken verbatim.
    pub fn validate(self) -> Result<ValidCredentials, Error> {
        let username = self.username.map(|u| u.trim().to_string()).unwrap_or_default();
        let password = self.password.unwrap_or_default();

        if username.is_empty() || password.is_empty() {
            return Err(Error::validation("Username and password are required"));
        }

        Ok(ValidCredentials { username, password })
    }

    /// As [`Self::validate`], plus the configured password length policy. Used at signup only so
    /// that tightening the policy never locks out existing accounts.
    pub fn validate_for_signup(self, policy: &PasswordConfig) -> Result<ValidCredentials, Error> {
        let credentials = self.validate()?;
        let length = credentials.password.chars().count();

        if length < policy.min_length {
            return Err(Error::validation(format!(
                "Password must be at least {} characters",
                policy.min_length
            )));
        }
        if length > policy.max_length {
            return Err(Error::validation(format!(
                "Password must be no more than {} characters",
                policy.max_length
            )));
        }

        Ok(credentials)
    }
}

/// Plain acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Successful bearer-token login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidateTokenResponse {
    pub username: String,
}

/// 201 response for a created account.
pub struct SignupResponse;

impl IntoResponse for SignupResponse {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(MessageResponse::new("User created successfully"))).into_response()
    }
}

/// Redirect that also sets or clears the session cookie.
pub struct SessionRedirect {
    pub location: &'static str,
    pub cookie: String,
}

impl IntoResponse for SessionRedirect {
    fn into_response(self) -> Response {
        let mut response = Redirect::to(self.location).into_response();
        if let Ok(cookie_value) = self.cookie.parse() {
            response.headers_mut().insert(header::SET_COOKIE, cookie_value);
        }
        response
    }
}
