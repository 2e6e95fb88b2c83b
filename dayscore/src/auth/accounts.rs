//! Account registration and credential checks shared by both deployment variants.

use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::{
    api::models::auth::ValidCredentials,
    auth::password::{self, Argon2Params},
    db::{
        errors::DbError,
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserDBResponse},
    },
    errors::{Error, Result},
};

/// Create an account. The username must be unused; the password is stored only as an Argon2id hash.
#[instrument(skip(db, credentials, params), fields(username = %credentials.username), err)]
pub async fn register_user(db: &SqlitePool, credentials: ValidCredentials, params: Argon2Params) -> Result<UserDBResponse> {
    let mut conn = db.acquire().await.map_err(DbError::from)?;

    if Users::new(&mut conn).get_user_by_username(&credentials.username).await?.is_some() {
        return Err(Error::DuplicateUsername);
    }

    // Hash the password on a blocking thread to avoid blocking async runtime
    let plaintext = credentials.password;
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plaintext, params))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let created = Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            username: credentials.username,
            password_hash,
        })
        .await
        .map_err(|e| {
            // Lost a race with a concurrent signup for the same name
            if e.is_unique_violation_on("users.username") {
                Error::DuplicateUsername
            } else {
                Error::Database(e)
            }
        })?;

    info!(user_id = created.id, "User registered");
    Ok(created)
}

/// Check a username/password pair. Unknown users and wrong passwords are indistinguishable.
#[instrument(skip(db, credentials), fields(username = %credentials.username), err(level = "info"))]
pub async fn verify_credentials(db: &SqlitePool, credentials: ValidCredentials) -> Result<UserDBResponse> {
    let mut conn = db.acquire().await.map_err(DbError::from)?;

    let Some(user) = Users::new(&mut conn).get_user_by_username(&credentials.username).await? else {
        return Err(Error::InvalidCredentials);
    };

    let plaintext = credentials.password;
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&plaintext, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::InvalidCredentials);
    }

    Ok(user)
}
