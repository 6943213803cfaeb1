pub mod bridge;
pub mod codec;
pub mod config;
pub mod error;
pub mod gpx_export;
pub mod listing;
pub mod route_handlers;
pub mod session;
pub mod store;

use std::{
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post, put},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::bridge::CommandQueue;
use crate::session::Session;

/// Shared by every handler. All store access goes through the one mutex,
/// so inbound events and operator commands never interleave mid-operation.
#[derive(Clone)]
pub struct AppState {
    session: Arc<Mutex<Session<CommandQueue>>>,
    pub export_path: Arc<PathBuf>,
    allowed_origins: Arc<Vec<HeaderValue>>,
}

impl AppState {
    pub fn new(session: Session<CommandQueue>, export_path: PathBuf) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            export_path: Arc::new(export_path),
            allowed_origins: Arc::new(Vec::new()),
        }
    }

    /// Map page origins allowed to call the API from a browser. Same-origin
    /// only when empty.
    pub fn with_allowed_origins(mut self, origins: Vec<HeaderValue>) -> Self {
        self.allowed_origins = Arc::new(origins);
        self
    }

    pub fn session(&self) -> MutexGuard<'_, Session<CommandQueue>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(state.allowed_origins.iter().cloned()))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/events", post(route_handlers::post_event))
        .route("/api/commands", get(route_handlers::drain_commands))
        .route(
            "/api/routes",
            get(route_handlers::list_routes).post(route_handlers::create_route),
        )
        .route("/api/routes/active", put(route_handlers::select_route))
        .route(
            "/api/routes/active/clear",
            post(route_handlers::clear_current_route),
        )
        .route("/api/reset", post(route_handlers::reset_all))
        .route("/api/poi/toggle", post(route_handlers::toggle_poi))
        .route("/api/sync", post(route_handlers::sync_surface))
        .route("/api/export", get(route_handlers::export_yaml))
        .route("/api/export/gpx", get(route_handlers::export_gpx))
        .route("/api/import", post(route_handlers::import_yaml))
        .route("/api/save", post(route_handlers::save_file))
        .route("/api/load", post(route_handlers::load_file))
        .layer(cors)
        .with_state(state)
}
