//! OpenAPI documentation for the JSON endpoints, served at `/api-docs/openapi.json`.
//!
//! Both deployments are documented in one document. The `bearer` scheme covers the `/api/*` routes of
//! the token deployment and `session_cookie` covers the form routes of the session deployment.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "bearer".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Token returned by `POST /api/login`. Send it as `Authorization: Bearer <token>`.",
                        ))
                        .build(),
                ),
            );
            components.security_schemes.insert(
                "session_cookie".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "dayscore_session",
                    "Session cookie set by a successful form login",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Day Score API",
        description = "Record one score from 1 to 10 per day and read back recent history."
    ),
    paths(
        api::handlers::auth::signup,
        api::handlers::auth::login,
        api::handlers::auth::validate_token,
        api::handlers::scores::submit_score_json,
        api::handlers::scores::submit_score_form,
        api::handlers::scores::get_scores,
    ),
    components(schemas(
        api::models::auth::CredentialsRequest,
        api::models::auth::MessageResponse,
        api::models::auth::LoginResponse,
        api::models::auth::ValidateTokenResponse,
        api::models::scores::ScoreSubmission,
        api::models::scores::ScoreEntry,
        crate::errors::ErrorBody,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "authentication", description = "Account creation and token issue"),
        (name = "scores", description = "Daily score submission and history"),
    )
)]
pub struct ApiDoc;
