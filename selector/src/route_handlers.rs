// Handlers for the map bridge and operator endpoints
// Each handler takes the session lock once and applies one operation.

use std::path::PathBuf;

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use shared::{ApiError, MapCommand, MapEvent, RouteId, RouteListing};

use crate::bridge::InboundHandler;
use crate::codec;
use crate::error::{CodecError, StoreError};
use crate::gpx_export::encode_routes_as_gpx;
use crate::AppState;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[derive(Debug, Default, Deserialize)]
pub struct CreateRouteRequest {
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectRouteRequest {
    pub route_id: RouteId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub route_ids: Vec<RouteId>,
    pub active_route_id: RouteId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
    pub path: PathBuf,
    pub route_count: usize,
}

/// POST /api/events - Inbound map surface notification
pub async fn post_event(State(state): State<AppState>, Json(event): Json<MapEvent>) -> StatusCode {
    state.session().handle_event(event);
    StatusCode::NO_CONTENT
}

/// GET /api/commands - Drain commands waiting for the map surface
pub async fn drain_commands(State(state): State<AppState>) -> Json<Vec<MapCommand>> {
    Json(state.session().sink_mut().drain())
}

/// GET /api/routes - Route selector entries and active route rows
pub async fn list_routes(State(state): State<AppState>) -> Json<RouteListing> {
    Json(state.session().listing().clone())
}

/// POST /api/routes - Start a new route and make it current
pub async fn create_route(
    State(state): State<AppState>,
    Json(req): Json<CreateRouteRequest>,
) -> Json<RouteListing> {
    let mut session = state.session();
    session.new_route(req.color.as_deref());
    Json(session.listing().clone())
}

/// PUT /api/routes/active - Switch the current route
pub async fn select_route(
    State(state): State<AppState>,
    Json(req): Json<SelectRouteRequest>,
) -> ApiResult<Json<RouteListing>> {
    let mut session = state.session();
    session
        .select_route(req.route_id)
        .map_err(store_error_to_api_error)?;
    Ok(Json(session.listing().clone()))
}

/// POST /api/routes/active/clear - Remove every point of the current route
pub async fn clear_current_route(State(state): State<AppState>) -> Json<RouteListing> {
    let mut session = state.session();
    session.clear_current_route();
    Json(session.listing().clone())
}

/// POST /api/reset - Drop all routes and start over with the default one
pub async fn reset_all(State(state): State<AppState>) -> Json<RouteListing> {
    let mut session = state.session();
    session.clear_all();
    Json(session.listing().clone())
}

/// POST /api/poi/toggle
pub async fn toggle_poi(State(state): State<AppState>) -> StatusCode {
    state.session().toggle_poi();
    StatusCode::NO_CONTENT
}

/// POST /api/sync - Replay the whole model to a reloaded map surface
pub async fn sync_surface(State(state): State<AppState>) -> StatusCode {
    state.session().sync_surface();
    StatusCode::NO_CONTENT
}

/// GET /api/export - Canonical YAML document
pub async fn export_yaml(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let yaml = state
        .session()
        .export_document()
        .map_err(codec_error_to_api_error)?;
    Ok(([(header::CONTENT_TYPE, "application/yaml")], yaml))
}

/// GET /api/export/gpx - One GPX track per route
pub async fn export_gpx(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let xml = encode_routes_as_gpx(state.session().store().routes())
        .map_err(codec_error_to_api_error)?;
    Ok(([(header::CONTENT_TYPE, "application/gpx+xml")], xml))
}

/// POST /api/import - Import a YAML document sent as the request body
pub async fn import_yaml(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<Json<ImportResponse>> {
    let mut session = state.session();
    let route_ids = session
        .import_document(&body)
        .map_err(codec_error_to_api_error)?;
    Ok(Json(ImportResponse {
        route_ids,
        active_route_id: session.store().active_route_id(),
    }))
}

/// POST /api/save - Write the canonical document to the configured export file
pub async fn save_file(State(state): State<AppState>) -> ApiResult<Json<SaveResponse>> {
    let path = (*state.export_path).clone();
    let session = state.session();
    codec::write_document_file(session.store(), &path).map_err(codec_error_to_api_error)?;
    Ok(Json(SaveResponse {
        path,
        route_count: session.store().len(),
    }))
}

/// POST /api/load - Import the configured export file
pub async fn load_file(State(state): State<AppState>) -> ApiResult<Json<ImportResponse>> {
    let path = state.export_path.as_path();
    let parsed = codec::read_document_file(path).map_err(codec_error_to_api_error)?;
    tracing::info!("loading routes from {}", path.display());

    let mut session = state.session();
    let route_ids = session.import_parsed(&parsed);
    Ok(Json(ImportResponse {
        route_ids,
        active_route_id: session.store().active_route_id(),
    }))
}

fn store_error_to_api_error(err: StoreError) -> (StatusCode, Json<ApiError>) {
    let status = match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
    };
    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}

fn codec_error_to_api_error(err: CodecError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        CodecError::Parse(_) | CodecError::UnrecognizedDocument => StatusCode::BAD_REQUEST,
        CodecError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
        CodecError::Io(_) | CodecError::Serialize(_) | CodecError::Gpx(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    tracing::warn!("request failed: {err}");
    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}
