pub mod error;
mod handlers;
mod tenant;

pub use tenant::Tenant;

use crate::config::Config;
use axum::{
    http::HeaderValue,
    routing::{delete, get, post, put},
    Router,
};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(conn: Connection, config: Config) -> Self {
        AppState {
            db: Arc::new(Mutex::new(conn)),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/auth/update", put(handlers::auth::update_profile))
        .route(
            "/api/students",
            post(handlers::students::create).get(handlers::students::list),
        )
        .route("/api/students/reset", delete(handlers::students::reset))
        .route(
            "/api/students/inactive",
            delete(handlers::students::purge_inactive),
        )
        .route(
            "/api/students/studentId/{student_no}",
            get(handlers::students::get_by_student_no),
        )
        .route(
            "/api/students/{id}",
            get(handlers::students::get)
                .patch(handlers::students::update)
                .delete(handlers::students::deactivate),
        )
        .route(
            "/api/payments/statuslist",
            get(handlers::payments::status_list),
        )
        .route("/api/payments/mark", post(handlers::payments::mark))
        .route("/api/payments/reset", delete(handlers::payments::reset))
        .route(
            "/api/payments/student/{id}",
            get(handlers::payments::student_history),
        )
        .route("/api/attendance", post(handlers::attendance::create))
        .route("/api/attendance/mark", post(handlers::attendance::mark))
        .route("/api/attendance/class", get(handlers::attendance::class_view))
        .route(
            "/api/attendance/student/{id}",
            get(handlers::attendance::student_history),
        )
        .route("/api/attendance/summary", get(handlers::attendance::summary))
        .route("/api/attendance/reset", delete(handlers::attendance::reset))
        .route(
            "/api/locations",
            get(handlers::locations::list).post(handlers::locations::create),
        )
        .route(
            "/api/locations/{id}",
            delete(handlers::locations::remove),
        )
        .route("/api/reports/finance", get(handlers::reports::finance))
        .route("/api/dashboard", get(handlers::reports::dashboard))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
