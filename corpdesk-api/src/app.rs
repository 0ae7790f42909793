/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use corpdesk_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = corpdesk_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use corpdesk_shared::cascade::CascadeEngine;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Company mutations and user deletion
    pub cascade: CascadeEngine,
}

impl AppState {
    /// Creates new application state with the default observers
    pub fn new(db: PgPool, config: Config) -> Self {
        let cascade = CascadeEngine::new(db.clone(), config.cascade);
        Self::with_engine(db, config, cascade)
    }

    /// Creates application state around a preconfigured engine
    pub fn with_engine(db: PgPool, config: Config, cascade: CascadeEngine) -> Self {
        Self {
            db,
            config: Arc::new(config),
            cascade,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /
/// ├── GET /health
/// └── /api/
///     ├── /users
///     │   ├── GET    /                  # List users
///     │   ├── POST   /                  # Create user
///     │   ├── GET    /:id               # Show user
///     │   ├── PUT    /:id               # Update user
///     │   └── DELETE /:id               # Delete user and their companies
///     └── /companies
///         ├── GET    /                  # List companies (?user_id=)
///         ├── POST   /                  # Create company
///         ├── GET    /:id               # Show company
///         ├── PUT    /:id               # Update company (propagates status)
///         ├── DELETE /:id               # Soft delete
///         ├── POST   /:id/restore       # Restore
///         ├── DELETE /:id/force         # Permanent delete
///         ├── GET    /:id/adds          # List adds
///         └── POST   /:id/adds          # Create add
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users).post(routes::users::create_user))
        .route(
            "/:id",
            get(routes::users::show_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        );

    let company_routes = Router::new()
        .route(
            "/",
            get(routes::companies::list_companies).post(routes::companies::create_company),
        )
        .route(
            "/:id",
            get(routes::companies::show_company)
                .put(routes::companies::update_company)
                .delete(routes::companies::delete_company),
        )
        .route("/:id/restore", post(routes::companies::restore_company))
        .route("/:id/force", delete(routes::companies::force_delete_company))
        .route(
            "/:id/adds",
            get(routes::adds::list_adds).post(routes::adds::create_add),
        );

    let api_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/companies", company_routes);

    let cors = build_cors(&state.config.api.cors_origins);
    let production = state.config.api.production;

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}
