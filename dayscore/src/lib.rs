//! # dayscore: a daily score tracker
//!
//! Users sign up, log in and record one score from 1 to 10 per calendar day. Each user can read
//! back the scores for a recent window of days, as JSON or as a heatmap on a dashboard.
//!
//! ## Deployments
//!
//! The same score and account logic runs behind one of two authentication schemes, picked by
//! [`config::AuthMode`]:
//!
//! - **Session** (default): form posts, server-rendered pages under `/`, and an opaque session
//!   cookie whose sha256 digest is stored in the `sessions` table.
//! - **Token**: a JSON API under `/api`, HS256 bearer tokens, and an embedded single-page
//!   front-end served as the fallback route.
//!
//! Handlers never look at the scheme. They ask for an [`auth::authenticator::Identity`] or an
//! [`api::models::users::CurrentUser`] and the extractor consults the
//! [`auth::authenticator::Authenticator`] held in [`AppState`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use dayscore::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = dayscore::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     dayscore::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! Migrations are embedded and run on startup. They are idempotent:
//!
//! ```no_run
//! # use sqlx::SqlitePool;
//! # async fn example(pool: SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
//! dayscore::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod scores;
mod static_assets;
pub mod telemetry;
mod templates;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    api::handlers::{auth as auth_handlers, pages, scores as score_handlers, static_assets::serve_embedded_asset},
    auth::{authenticator::Authenticator, session::SessionAuthenticator, token::TokenAuthenticator},
    config::{AuthMode, CorsOrigin},
    openapi::ApiDoc,
};
use axum::{
    Json, Router,
    http::{self, HeaderValue},
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use minijinja::Environment;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{str::FromStr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;

pub use types::{ScoreId, UserId};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .authenticator(authenticator)
///     .templates(Arc::new(templates::environment()?))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    /// Session or token scheme, according to `config.auth.mode`
    pub authenticator: Arc<dyn Authenticator>,
    pub templates: Arc<Environment<'static>>,
}

/// Get the dayscore database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Open the configured SQLite database, creating the file if needed, and apply migrations.
#[instrument(skip_all)]
async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let settings = &config.database.pool;
    let options = SqliteConnectOptions::from_str(&config.database.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout((settings.idle_timeout_secs > 0).then(|| Duration::from_secs(settings.idle_timeout_secs)))
        .max_lifetime((settings.max_lifetime_secs > 0).then(|| Duration::from_secs(settings.max_lifetime_secs)))
        .connect_with(options)
        .await?;

    migrator().run(&pool).await?;
    info!("Database ready at {}", config.database.url);

    Ok(pool)
}

/// Pick the credential scheme for the configured mode.
pub fn build_authenticator(config: &Config, db: SqlitePool) -> anyhow::Result<Arc<dyn Authenticator>> {
    let authenticator: Arc<dyn Authenticator> = match config.auth.mode {
        AuthMode::Session => Arc::new(SessionAuthenticator::new(db, config.auth.session.clone())),
        AuthMode::Token => {
            let secret_key = config
                .secret_key
                .as_deref()
                .filter(|key| !key.is_empty())
                .ok_or_else(|| anyhow::anyhow!("secret_key is required for token authentication"))?;
            Arc::new(TokenAuthenticator::new(secret_key, config.auth.token.expiry))
        }
    };
    Ok(authenticator)
}

/// Assemble the shared state for a config and an already-migrated pool.
pub fn build_state(config: Config, db: SqlitePool) -> anyhow::Result<AppState> {
    let authenticator = build_authenticator(&config, db.clone())?;
    let templates = templates::environment().map_err(|e| anyhow::anyhow!("Failed to load templates: {}", e))?;

    Ok(AppState::builder()
        .db(db)
        .config(config)
        .authenticator(authenticator)
        .templates(Arc::new(templates))
        .build())
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;
    let wildcard = cors_config.allowed_origins.iter().any(|origin| matches!(origin, CorsOrigin::Wildcard));

    let allow_origin = if wildcard {
        if cors_config.allow_credentials {
            anyhow::bail!("CORS wildcard origin cannot be combined with allow_credentials");
        }
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([http::Method::GET, http::Method::POST])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .allow_credentials(cors_config.allow_credentials)
        .expose_headers(vec![http::header::LOCATION]);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Pages and form endpoints of the cookie-session deployment.
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/login", get(pages::login_page).post(pages::login))
        .route("/signup", get(pages::signup_page).post(pages::signup))
        .route("/logout", get(pages::logout).post(pages::logout))
        .route("/dashboard", get(pages::dashboard))
        .route("/submit_score", post(score_handlers::submit_score_form))
        .route("/get_scores", get(score_handlers::get_scores))
}

/// JSON API of the bearer-token deployment, with the embedded front-end as fallback.
fn token_routes() -> Router<AppState> {
    let api_routes = Router::new()
        .route("/signup", post(auth_handlers::signup))
        .route("/login", post(auth_handlers::login))
        .route("/validate_token", get(auth_handlers::validate_token))
        .route("/submit_score", post(score_handlers::submit_score_json))
        .route("/get_scores", get(score_handlers::get_scores));

    Router::new().nest("/api", api_routes).fallback(serve_embedded_asset)
}

/// Build the application router for the configured [`AuthMode`].
///
/// Both modes get `/healthz`, `/api-docs/openapi.json`, CORS and request tracing.
///
/// # Errors
///
/// Returns an error if the CORS configuration is invalid.
#[instrument(skip_all, fields(mode = ?state.config.auth.mode))]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let mode_routes = match state.config.auth.mode {
        AuthMode::Session => session_routes(),
        AuthMode::Token => token_routes(),
    };

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(mode_routes)
        .with_state(state.clone());

    let cors_layer = create_cors_layer(&state.config)?;
    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns the router, state and database pool.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] opens the database, runs migrations and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal resolves, in-flight requests drain and the pool closes
pub struct Application {
    router: Router,
    app_state: AppState,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Create an application on an existing pool, or open one from config when `None`.
    pub async fn new_with_pool(config: Config, pool: Option<SqlitePool>) -> anyhow::Result<Self> {
        debug!("Starting dayscore with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => {
                migrator().run(&pool).await?;
                pool
            }
            None => setup_database(&config).await?,
        };

        let app_state = build_state(config.clone(), pool.clone())?;
        let router = build_router(&app_state)?;

        Ok(Self {
            router,
            app_state,
            config,
            pool,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> (axum_test::TestServer, AppState) {
        let server = axum_test::TestServer::new(self.router).expect("Failed to create test server");
        (server, self.app_state)
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "dayscore ({:?} mode) listening on http://{}, available at http://localhost:{}",
            self.config.auth.mode, bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{create_test_app, create_test_config, create_test_state};
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    #[sqlx::test]
    async fn test_healthz_and_openapi_in_both_modes(pool: SqlitePool) {
        for mode in [AuthMode::Session, AuthMode::Token] {
            let (server, _) = create_test_app(pool.clone(), mode).await;

            let response = server.get("/healthz").await;
            response.assert_status_ok();
            assert_eq!(response.text(), "OK");

            let response = server.get("/api-docs/openapi.json").await;
            response.assert_status_ok();
            let doc: Value = response.json();
            assert!(doc["paths"]["/api/submit_score"].is_object());
            assert!(doc["components"]["securitySchemes"]["bearer"].is_object());
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_token_example_flow(pool: SqlitePool) {
        let (server, _) = create_test_app(pool, AuthMode::Token).await;
        let credentials = json!({"username": "alice", "password": "pw1"});

        let response = server.post("/api/signup").json(&credentials).await;
        response.assert_status(StatusCode::CREATED);
        response.assert_json(&json!({"message": "User created successfully"}));

        let response = server.post("/api/login").json(&credentials).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Login successful");
        let token = body["token"].as_str().unwrap().to_string();
        let bearer = format!("Bearer {token}");

        let response = server.get("/api/validate_token").add_header("authorization", bearer.clone()).await;
        response.assert_status_ok();
        response.assert_json(&json!({"username": "alice"}));

        let today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();
        for score in [7, 9] {
            server
                .post("/api/submit_score")
                .add_header("authorization", bearer.clone())
                .json(&json!({"date": today, "score": score}))
                .await
                .assert_status_ok();
        }

        let response = server
            .get("/api/get_scores")
            .add_query_param("days", 30)
            .add_header("authorization", bearer)
            .await;
        response.assert_status_ok();
        response.assert_json(&json!([{"date": today, "score": 9}]));

        let response = server
            .post("/api/login")
            .json(&json!({"username": "alice", "password": "wrong"}))
            .await;
        response.assert_status_unauthorized();
        response.assert_json(&json!({"error": "Invalid username or password"}));
    }

    #[sqlx::test]
    async fn test_token_mode_serves_front_end(pool: SqlitePool) {
        let (server, _) = create_test_app(pool, AuthMode::Token).await;

        let response = server.get("/").await;
        response.assert_status_ok();
        response.assert_text_contains("<!DOCTYPE html>");

        let response = server.get("/dashboard").await;
        response.assert_status_ok();
        response.assert_text_contains("<!DOCTYPE html>");
    }

    #[sqlx::test]
    async fn test_session_mode_has_no_json_api(pool: SqlitePool) {
        let (server, _) = create_test_app(pool, AuthMode::Session).await;

        server
            .post("/api/login")
            .json(&json!({"username": "alice", "password": "pw1"}))
            .await
            .assert_status_not_found();
    }

    #[sqlx::test]
    async fn test_cors_preflight_allows_configured_origin(pool: SqlitePool) {
        use tower::ServiceExt;

        let state = create_test_state(pool, create_test_config(AuthMode::Token));
        let router = build_router(&state).unwrap();

        let request = axum::http::Request::builder()
            .method("OPTIONS")
            .uri("/api/login")
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", "POST")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        let headers = response.headers();
        assert_eq!(headers.get("access-control-allow-origin").unwrap(), "http://localhost:5173");
        assert_eq!(headers.get("access-control-allow-credentials").unwrap(), "true");
    }

    #[tokio::test]
    async fn test_token_mode_requires_secret() {
        let mut config = create_test_config(AuthMode::Token);
        config.secret_key = None;

        let pool = SqlitePool::connect_lazy("sqlite::memory:").unwrap();
        assert!(build_authenticator(&config, pool).is_err());
    }

    #[test]
    fn test_cors_wildcard_requires_no_credentials() {
        let mut config = create_test_config(AuthMode::Session);
        config.auth.security.cors.allowed_origins = vec![CorsOrigin::Wildcard];
        assert!(create_cors_layer(&config).is_err());

        config.auth.security.cors.allow_credentials = false;
        assert!(create_cors_layer(&config).is_ok());
    }

    #[tokio::test]
    async fn test_application_integration() {
        let db_path = std::env::temp_dir().join(format!("dayscore-test-{}.db", std::process::id()));
        let mut config = create_test_config(AuthMode::Session);
        config.database.url = format!("sqlite://{}", db_path.display());

        let app = Application::new(config).await;
        assert!(app.is_ok(), "Application::new should succeed");
        let (server, state) = app.unwrap().into_test_server();

        let response = server.get("/healthz").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "OK");

        let response = server.get("/").await;
        response.assert_status_ok();
        response.assert_text_contains("Welcome to Day Score");

        server.get("/dashboard").await.assert_status_unauthorized();

        state.db.close().await;
        let _ = std::fs::remove_file(&db_path);
    }
}
