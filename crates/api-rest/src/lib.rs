//! # API REST
//!
//! REST API implementation for the holdings library.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Basic authentication on write routes
//! - OpenAPI documentation
//! - REST-specific concerns (JSON serialization, CORS, request tracing)
//!
//! Uses `api-shared` for wire types and credential checks, and `holdings-core` for storage.

#![warn(rust_2018_idioms)]

pub mod auth;
pub mod error;
pub mod handlers;

use api_shared::{CredentialCheck, HealthRes, HoldingRes, ServerInfoRes, ShardRes};
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::response::Json;
use axum::routing::{get, put};
use axum::Router;
use holdings_core::{Library, LibraryConfig};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::Level;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub use error::ApiError;

/// Application state shared across request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<LibraryConfig>,
    pub library: Library,
    pub credentials: CredentialCheck,
}

impl AppState {
    pub fn new(config: Arc<LibraryConfig>, library: Library) -> Self {
        let credentials = CredentialCheck::new(config.api_user(), config.api_key());
        Self {
            config,
            library,
            credentials,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_holdings,
        handlers::version,
        handlers::describe_holding,
        handlers::get_track,
        handlers::put_track,
        handlers::get_artwork,
        handlers::put_artwork,
        handlers::lock_holding,
    ),
    components(schemas(HealthRes, HoldingRes, ServerInfoRes, ShardRes)),
    modifiers(&BasicAuthScheme)
)]
pub struct ApiDoc;

struct BasicAuthScheme;

impl Modify for BasicAuthScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Builds the application router.
///
/// Write routes sit behind Basic authentication. Request bodies are buffered whole and
/// are not size limited. Every request runs in an `info` span carrying its method and URI, so
/// error events name the operation, holding and track path they refer to.
pub fn build_router(state: AppState) -> Router {
    let require_auth = middleware::from_fn_with_state(state.clone(), auth::require_basic_auth);

    Router::new()
        .route("/", get(handlers::list_holdings))
        .route("/version", get(handlers::version))
        .route("/health", get(handlers::health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/favicon.ico", get(handlers::favicon))
        .route("/:uuid", get(handlers::describe_holding))
        .route("/:uuid/", get(handlers::describe_holding))
        .route(
            "/:uuid/music/*relpath",
            get(handlers::get_track).merge(put(handlers::put_track).route_layer(require_auth.clone())),
        )
        .route(
            "/:uuid/albumart",
            get(handlers::get_artwork)
                .merge(put(handlers::put_artwork).route_layer(require_auth.clone())),
        )
        .route(
            "/:uuid/lock",
            put(handlers::lock_holding).route_layer(require_auth),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().level(Level::INFO)),
        )
        .with_state(state)
}
