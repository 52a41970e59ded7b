use axum::{
    Router,
    http::{HeaderValue, StatusCode},
    middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::{AccessService, SessionAuthority};
use crate::state::SharedState;

mod attempts;
pub mod auth;
mod check_points;
mod error;
mod observability;
mod system;
pub mod users;

pub use error::{ApiError, ErrorBody};

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn access(&self) -> &AccessService {
        &self.shared.access
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionAuthority {
        &self.shared.sessions
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();
    let request_timeout = Duration::from_secs(state.config().server.request_timeout_seconds);

    let admin_routes = create_admin_router(state.clone());

    let api_router = Router::new()
        .merge(admin_routes)
        .route("/admin/login", post(auth::login))
        .route("/admin/logout", post(auth::logout))
        .route("/user/rfid-check", post(users::rfid_check))
        .route("/user/two-fa", post(users::two_fa))
        .route("/health", get(system::health))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    api_router
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/register", post(users::register_admin))
        .route("/user/register", post(users::register_user))
        .route(
            "/check-point/register",
            post(check_points::register_check_point),
        )
        .route("/users", get(users::list_users))
        .route("/attempts", get(attempts::list_attempts))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::require_admin))
}
