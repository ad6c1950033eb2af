/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::{build_router, AppState}, config::Config};
/// use taskboard_shared::store::Stores;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Stores::in_memory(), config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, routes};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use taskboard_shared::service::{AuthService, TaskService};
use taskboard_shared::store::Stores;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,

    pub tasks: TaskService,

    /// Backing stores, for the health check
    pub stores: Stores,

    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the services onto the given stores
    pub fn new(stores: Stores, config: Config) -> Self {
        let auth = AuthService::new(stores.users.clone(), config.jwt.secret.as_str());
        let tasks = TaskService::new(stores.tasks.clone(), stores.users.clone());

        Self {
            auth,
            tasks,
            stores,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health
/// └── /api/
///     ├── POST   /auth/register
///     ├── POST   /auth/login
///     ├── GET    /auth/me                    (bearer)
///     ├── GET    /tasks/public
///     ├── POST   /tasks/public
///     ├── GET    /tasks/public/:id
///     ├── PATCH  /tasks/public/:id
///     ├── DELETE /tasks/public/:id
///     ├── GET    /tasks                      (bearer)
///     ├── POST   /tasks                      (bearer)
///     ├── GET    /tasks/:id                  (bearer)
///     ├── PUT    /tasks/:id                  (bearer)
///     ├── DELETE /tasks/:id                  (bearer)
///     └── GET    /users/:id/tasks            (bearer)
/// ```
///
/// Unknown paths fall through to a JSON 404.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route(
            "/tasks/public",
            get(routes::public::list_tasks).post(routes::public::create_task),
        )
        .route(
            "/tasks/public/:id",
            get(routes::public::get_task)
                .patch(routes::public::update_task)
                .delete(routes::public::delete_task),
        );

    let protected_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/users/:id/tasks", get(routes::users::list_user_tasks))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new().merge(public_routes).merge(protected_routes);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .fallback(routes::not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
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
}

/// Bearer token middleware
///
/// Resolves the `Authorization` header to an `AuthContext` and inserts it
/// into the request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let auth_context = state.auth.verify_token(header)?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
