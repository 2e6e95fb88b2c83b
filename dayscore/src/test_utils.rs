//! Shared fixtures for unit and HTTP tests.

use crate::{
    AppState, Application,
    auth::password::{Argon2Params, hash_password},
    config::{AuthMode, Config, PoolSettings},
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserDBResponse},
    },
};
use axum_test::{TestResponse, TestServer};
use sqlx::SqlitePool;

/// Argon2 parameters cheap enough to hash hundreds of passwords in a test run.
pub fn test_argon2_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 128,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn create_test_config(mode: AuthMode) -> Config {
    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    };

    config.database.pool = PoolSettings {
        max_connections: 1,
        min_connections: 0,
        ..Default::default()
    };
    config.auth.mode = mode;

    let fast = test_argon2_params();
    config.auth.password.argon2_memory_kib = fast.memory_kib;
    config.auth.password.argon2_iterations = fast.iterations;
    config.auth.password.argon2_parallelism = fast.parallelism;

    config
}

pub fn create_test_state(pool: SqlitePool, config: Config) -> AppState {
    crate::build_state(config, pool).expect("Failed to build test state")
}

/// Full router for `mode` on a `#[sqlx::test]` pool, plus the state behind it.
pub async fn create_test_app(pool: SqlitePool, mode: AuthMode) -> (TestServer, AppState) {
    let app = Application::new_with_pool(create_test_config(mode), Some(pool))
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

pub async fn create_test_user(pool: &SqlitePool, username: &str, password: &str) -> UserDBResponse {
    let password_hash = hash_password(password, test_argon2_params()).expect("Failed to hash password");

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            password_hash,
        })
        .await
        .expect("Failed to create test user")
}

/// `Authorization` header value carrying a freshly issued credential for `user`.
pub async fn bearer_for(state: &AppState, user: &UserDBResponse) -> String {
    let credential = state.authenticator.issue(user).await.expect("Failed to issue credential");
    format!("Bearer {}", credential.value)
}

/// The `name=value` pair from a response's `Set-Cookie`, ready to send back as a `Cookie` header.
pub fn session_cookie_from(response: &TestResponse) -> String {
    let set_cookie = response.header("set-cookie");
    let set_cookie = set_cookie.to_str().expect("Set-Cookie is not ASCII");
    set_cookie.split(';').next().unwrap_or_default().trim().to_string()
}
