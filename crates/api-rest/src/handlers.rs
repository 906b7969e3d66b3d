//! Request handlers.
//!
//! Identifiers are validated before any filesystem work. Filesystem work runs on the blocking
//! pool; files are streamed back through `ServeFile`, which handles ranges and content types.

use crate::error::ApiError;
use crate::AppState;
use api_shared::{HealthRes, HealthService, HoldingRes, ServerInfoRes};
use axum::body::{Body, Bytes};
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use holdings_core::{PathResolver, ServerInfo};
use std::path::PathBuf;
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// Runs blocking library work off the async executor.
async fn blocking<T, E, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(Into::into)
}

async fn serve_file(path: PathBuf, req: Request) -> Result<Response, ApiError> {
    let response = ServeFile::new(path)
        .oneshot(req)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(response.map(Body::new))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Liveness check for monitoring and load balancers.
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Every holding identifier in the library", body = [String]),
        (status = 500, description = "Internal server error")
    )
)]
/// Lists every holding in the library.
pub async fn list_holdings(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let library = state.library.clone();
    let ids = blocking(move || library.enumerator().list_all()).await?;
    Ok(Json(ids))
}

#[utoipa::path(
    get,
    path = "/version",
    responses(
        (status = 200, description = "Server version, free space and shards", body = ServerInfoRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Reports the server version, free space on the library filesystem and configured shards.
pub async fn version(State(state): State<AppState>) -> Result<Json<ServerInfoRes>, ApiError> {
    let config = state.config.clone();
    let root = state.library.root().to_path_buf();
    let info = blocking(move || ServerInfo::collect(&config, &root)).await?;
    Ok(Json(info.into()))
}

#[utoipa::path(
    get,
    path = "/{uuid}/",
    params(("uuid" = String, Path, description = "Holding identifier (uuid4)")),
    responses(
        (status = 200, description = "Holding contents and flags", body = HoldingRes),
        (status = 400, description = "Invalid identifier"),
        (status = 404, description = "Holding not found")
    )
)]
/// Describes one holding: its tracks, whether artwork exists and whether it is locked.
pub async fn describe_holding(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<HoldingRes>, ApiError> {
    let id = PathResolver::validate(&uuid)?;
    let library = state.library.clone();
    let summary = blocking(move || library.enumerator().describe(&id)).await?;
    Ok(Json(summary.into()))
}

#[utoipa::path(
    get,
    path = "/{uuid}/music/{relpath}",
    params(
        ("uuid" = String, Path, description = "Holding identifier (uuid4)"),
        ("relpath" = String, Path, description = "Track path relative to music/")
    ),
    responses(
        (status = 200, description = "Track content"),
        (status = 400, description = "Invalid identifier or path"),
        (status = 401, description = "Path escapes the holding"),
        (status = 404, description = "Holding or track not found")
    )
)]
/// Streams a track.
pub async fn get_track(
    State(state): State<AppState>,
    Path((uuid, relpath)): Path<(String, String)>,
    req: Request,
) -> Result<Response, ApiError> {
    let id = PathResolver::validate(&uuid)?;
    let library = state.library.clone();
    let path = blocking(move || library.store().track_file(&id, &relpath)).await?;
    serve_file(path, req).await
}

#[utoipa::path(
    put,
    path = "/{uuid}/music/{relpath}",
    params(
        ("uuid" = String, Path, description = "Holding identifier (uuid4)"),
        ("relpath" = String, Path, description = "Track path relative to music/")
    ),
    request_body(content = String, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Track stored", body = String),
        (status = 400, description = "Invalid identifier or path"),
        (status = 401, description = "Bad credentials or path escapes the holding"),
        (status = 423, description = "Holding is locked")
    ),
    security(("basic_auth" = []))
)]
/// Stores a track, replacing any track already at the same path.
pub async fn put_track(
    State(state): State<AppState>,
    Path((uuid, relpath)): Path<(String, String)>,
    body: Bytes,
) -> Result<String, ApiError> {
    let id = PathResolver::validate(&uuid)?;
    let library = state.library.clone();
    let written = blocking(move || library.store().put_track(&id, &relpath, &body)).await?;
    Ok(format!("uploaded: {} bytes\n", written))
}

#[utoipa::path(
    get,
    path = "/{uuid}/albumart",
    params(("uuid" = String, Path, description = "Holding identifier (uuid4)")),
    responses(
        (status = 200, description = "Artwork content"),
        (status = 400, description = "Invalid identifier"),
        (status = 404, description = "Holding or artwork not found")
    )
)]
/// Streams the holding's artwork.
pub async fn get_artwork(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    req: Request,
) -> Result<Response, ApiError> {
    let id = PathResolver::validate(&uuid)?;
    let library = state.library.clone();
    let path = blocking(move || library.store().artwork_file(&id)).await?;
    serve_file(path, req).await
}

#[utoipa::path(
    put,
    path = "/{uuid}/albumart",
    params(("uuid" = String, Path, description = "Holding identifier (uuid4)")),
    request_body(content = String, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Artwork stored", body = String),
        (status = 400, description = "Invalid identifier"),
        (status = 401, description = "Bad credentials")
    ),
    security(("basic_auth" = []))
)]
/// Stores the artwork. Allowed on locked holdings.
pub async fn put_artwork(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    body: Bytes,
) -> Result<String, ApiError> {
    let id = PathResolver::validate(&uuid)?;
    let library = state.library.clone();
    let written = blocking(move || library.store().put_artwork(&id, &body)).await?;
    Ok(format!("uploaded: {} bytes\n", written))
}

#[utoipa::path(
    put,
    path = "/{uuid}/lock",
    params(("uuid" = String, Path, description = "Holding identifier (uuid4)")),
    responses(
        (status = 200, description = "Holding locked", body = String),
        (status = 400, description = "Invalid identifier"),
        (status = 401, description = "Bad credentials"),
        (status = 404, description = "Holding not found")
    ),
    security(("basic_auth" = []))
)]
/// Locks a holding against further track uploads.
pub async fn lock_holding(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<String, ApiError> {
    let id = PathResolver::validate(&uuid)?;
    let library = state.library.clone();
    blocking(move || library.locks().lock(&id)).await?;
    Ok("Created lock\n".to_string())
}

/// Browsers ask for this on every visit; answer without going near the library.
pub async fn favicon() -> impl IntoResponse {
    StatusCode::NOT_FOUND
}
