//! Route table and handlers.

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::middleware;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use chrono::SecondsFormat;
use chrono::Utc;
use petition_cnpj::LookupSource;
use petition_cnpj::normalize_cnpj;
use petition_docgen::Artifact;
use petition_docgen::LegacyRequest;
use petition_docgen::OutputFormat;
use petition_docgen::PublishedUrls;
use petition_docgen::RenderRequest;
use serde_json::Value;
use serde_json::json;

use crate::cors::cors;
use crate::error::ApiError;
use crate::files;
use crate::state::AppState;

type Shared = State<Arc<AppState>>;

pub fn build_router(state: Arc<AppState>, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/cnpj/brasilapi/:cnpj", get(proxy_brasilapi))
        .route("/api/cnpj/receitaws/:cnpj", get(proxy_receitaws))
        .route("/api/cnpj/:cnpj", get(lookup_cnpj))
        .route("/api/templates", get(list_templates))
        .route("/api/gerar-docx", post(legacy_docx))
        .route("/api/gerar-pdf", post(legacy_pdf))
        .route("/api/gerar-ambos", post(legacy_both))
        .route("/api/generate/:format", post(generate))
        .route("/out/:file", get(out_file))
        .fallback(files::public_fallback)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

async fn index(State(state): Shared) -> Result<Response, ApiError> {
    files::send(&state.public_dir, "index.html").await
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// CNPJ
// ─────────────────────────────────────────────────────────────────────────────

async fn lookup_cnpj(
    State(state): Shared,
    Path(cnpj): Path<String>,
) -> Result<Response, ApiError> {
    let outcome = state.resolver.resolve(&cnpj).await?;
    Ok(Json(outcome).into_response())
}

async fn proxy_brasilapi(
    State(state): Shared,
    Path(cnpj): Path<String>,
) -> Result<Response, ApiError> {
    proxy(&state, LookupSource::BrasilApi, &cnpj).await
}

async fn proxy_receitaws(
    State(state): Shared,
    Path(cnpj): Path<String>,
) -> Result<Response, ApiError> {
    proxy(&state, LookupSource::ReceitaWs, &cnpj).await
}

async fn proxy(state: &AppState, source: LookupSource, cnpj: &str) -> Result<Response, ApiError> {
    let Some(provider) = state.resolver.provider(source) else {
        return Err(ApiError::not_found(format!("provider {source} is not configured")).bare());
    };
    match provider.fetch_raw(&normalize_cnpj(cnpj)).await {
        Ok(body) => Ok(Json(body).into_response()),
        Err(err) => {
            tracing::warn!(provider = %source, error = %err, "CNPJ proxy request failed");
            Err(ApiError::from(err).bare())
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Documents
// ─────────────────────────────────────────────────────────────────────────────

async fn list_templates(State(state): Shared) -> Result<Response, ApiError> {
    let templates = state.orchestrator.catalog().list().await?;
    Ok(Json(json!({ "success": true, "templates": templates })).into_response())
}

async fn legacy_docx(
    state: Shared,
    body: Result<Json<LegacyRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    legacy(state, body, OutputFormat::Docx).await
}

async fn legacy_pdf(
    state: Shared,
    body: Result<Json<LegacyRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    legacy(state, body, OutputFormat::Pdf).await
}

async fn legacy_both(
    state: Shared,
    body: Result<Json<LegacyRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    legacy(state, body, OutputFormat::Both).await
}

async fn legacy(
    State(state): Shared,
    body: Result<Json<LegacyRequest>, JsonRejection>,
    format: OutputFormat,
) -> Result<Response, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let artifact = state.orchestrator.produce(request, format).await?;
    Ok(attachment(artifact))
}

fn attachment(artifact: Artifact) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", artifact.filename);
    (
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response()
}

async fn generate(
    State(state): Shared,
    Path(format): Path<String>,
    body: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Json<PublishedUrls>, ApiError> {
    let format = OutputFormat::from_str(&format)
        .map_err(|_| ApiError::not_found(format!("formato desconhecido: {format}")).bare())?;
    let Json(request) =
        body.map_err(|rejection| ApiError::bad_request(rejection.body_text()).bare())?;
    let urls = state
        .orchestrator
        .publish(request, format)
        .await
        .map_err(|err| ApiError::from(err).bare())?;
    Ok(Json(urls))
}

async fn out_file(State(state): Shared, Path(file): Path<String>) -> Result<Response, ApiError> {
    files::send(state.orchestrator.out_dir(), &file).await
}
