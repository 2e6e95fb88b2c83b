use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::authenticator::Identity,
    db::{errors::DbError, handlers::Users},
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{instrument, trace};

/// Validates the request credential without touching the users table.
impl FromRequestParts<AppState> for Identity {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let Some(credential) = state.authenticator.credential_from(&parts.headers) else {
            trace!("No credential present on request");
            return Err(Error::Unauthenticated { message: None });
        };

        state.authenticator.validate(credential).await
    }
}

/// Resolves the credential to a live user row. A valid credential for an account that no longer
/// exists is a 404, not a 401.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let identity = Identity::from_request_parts(parts, state).await?;

        let mut conn = state.db.acquire().await.map_err(DbError::from)?;
        match Users::new(&mut conn).get_user_by_username(&identity.username).await? {
            Some(user) => Ok(CurrentUser {
                id: user.id,
                username: user.username,
            }),
            None => Err(Error::NotFound {
                resource: "User".to_string(),
                id: identity.username,
            }),
        }
    }
}
