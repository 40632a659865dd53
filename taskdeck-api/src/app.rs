/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware. State is constructed explicitly and passed in —
/// there is no process-wide connection or config singleton.
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use jsonwebtoken::Algorithm;
use sqlx::PgPool;
use std::sync::Arc;
use taskdeck_shared::auth::middleware::bearer_auth_middleware;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; the config rides in an
/// Arc so cloning stays cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Token signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Token signing algorithm
    pub fn jwt_algorithm(&self) -> Algorithm {
        self.config.jwt.algorithm
    }

    /// Configured access token time-to-live
    pub fn access_token_ttl(&self) -> chrono::Duration {
        self.config.jwt.access_token_ttl()
    }
}

/// Builds the complete Axum router
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /                        # Service banner (public)
/// ├── GET  /health                  # Health check (public)
/// └── /api/v1/
///     ├── /auth/                    # Public
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── POST /refresh
///     ├── /users/                   # Bearer-authenticated
///     │   ├── GET|PUT|DELETE /me
///     │   ├── POST /me/password
///     │   ├── GET  /
///     │   └── GET  /:user_id
///     └── /tasks/                   # Bearer-authenticated, owner-scoped
///         ├── POST|GET /
///         ├── GET  /stats
///         ├── GET  /status/:status
///         ├── GET|PUT|DELETE /:task_id
///         └── PATCH /:task_id/status
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public, no auth.
    let health_routes = Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Everything below goes through the bearer gate.
    let user_routes = Router::new()
        .route(
            "/me",
            get(routes::users::me)
                .put(routes::users::update_me)
                .delete(routes::users::delete_me),
        )
        .route("/me/password", post(routes::users::change_password))
        .route("/", get(routes::users::list_users))
        .route("/:user_id", get(routes::users::get_user))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_gate_layer,
        ));

    let task_routes = Router::new()
        .route(
            "/",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route("/stats", get(routes::tasks::task_stats))
        .route("/status/:status", get(routes::tasks::tasks_by_status))
        .route(
            "/:task_id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/:task_id/status", patch(routes::tasks::update_task_status))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_gate_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/tasks", task_routes);

    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS.
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer authentication layer
///
/// Delegates to the shared gate with this state's pool and token
/// configuration; rejections convert into the unified error type.
async fn auth_gate_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    bearer_auth_middleware(
        state.db.clone(),
        state.jwt_secret().to_string(),
        state.jwt_algorithm(),
        req,
        next,
    )
    .await
    .map_err(ApiError::from)
}
