//! Static file delivery for the front end (`public_dir`) and generated
//! artifacts (`out_dir`).

use std::path::Component;
use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::Method;
use axum::http::Uri;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

/// Serve `relative` from `dir`. Only plain relative paths are accepted.
pub async fn send(dir: &Path, relative: &str) -> Result<Response, ApiError> {
    let relative = Path::new(relative);
    let plain = relative.components().next().is_some()
        && relative.components().all(|c| matches!(c, Component::Normal(_)));
    if !plain {
        return Err(ApiError::not_found("Arquivo não encontrado").bare());
    }

    let path = dir.join(relative);
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            Ok(([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response())
        }
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "static file not served");
            Err(ApiError::not_found("Arquivo não encontrado").bare())
        }
    }
}

pub async fn public_fallback(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
) -> Result<Response, ApiError> {
    if method != Method::GET && method != Method::HEAD {
        let message = format!("Rota não encontrada: {method} {}", uri.path());
        return Err(ApiError::not_found(message).bare());
    }
    let relative = uri.path().trim_start_matches('/');
    let relative = if relative.is_empty() { "index.html" } else { relative };
    send(&state.public_dir, relative).await
}
