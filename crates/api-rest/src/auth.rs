//! Basic authentication middleware for write routes.

use crate::error::ApiError;
use crate::AppState;
use api_shared::BasicCredentials;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

/// Rejects the request with 401 unless it carries the configured Basic credentials.
///
/// Runs before the handler, so a rejected request never touches the library.
pub async fn require_basic_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credentials = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(BasicCredentials::from_header);

    match credentials {
        Some(creds) if state.credentials.verify(&creds) => Ok(next.run(req).await),
        Some(creds) => Err(ApiError::Unauthorized(creds.user)),
        None => Err(ApiError::Unauthorized("<no credentials>".into())),
    }
}
