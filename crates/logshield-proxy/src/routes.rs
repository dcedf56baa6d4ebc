//! HTTP route handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use logshield_core::RedactionRecord;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::analysis::{AnalysisError, AnalysisReport};
use crate::error::ApiError;
use crate::state::AppState;
use crate::upload;

/// Headroom above the raw limit for JSON escaping and the envelope.
const BODY_OVERHEAD: usize = 64 * 1024;

/// Build the router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state
        .max_upload_bytes
        .saturating_mul(2)
        .saturating_add(BODY_OVERHEAD);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/mask", post(mask_log))
        .route("/analyze", post(analyze_log))
}

// ---------------------------------------------------------------
// Request/Response types
// ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskRequest {
    pub log_content: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskResponse {
    pub masked_log: String,
    pub redactions: Vec<RedactionRecord>,
    pub content_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub masking: MaskResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisReport>,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_error: Option<String>,
}

// ---------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "rules": state.redactor.registry().len(),
    }))
}

async fn mask_log(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MaskRequest>, JsonRejection>,
) -> Result<Json<MaskResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(Json(mask_upload(&state, request).await?))
}

async fn analyze_log(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MaskRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let masking = mask_upload(&state, request).await?;

    if let Some(report) = state.cache.get(&masking.content_hash) {
        info!(hash = %masking.content_hash, "analysis served from cache");
        return Ok(Json(AnalyzeResponse {
            masking,
            analysis: Some(report.as_ref().clone()),
            cached: true,
            analysis_error: None,
        }));
    }

    let outcome = match &state.analyzer {
        Some(client) => client.analyze(&masking.masked_log).await,
        None => Err(AnalysisError::NotConfigured),
    };

    let response = match outcome {
        Ok(report) => {
            state
                .cache
                .insert(masking.content_hash.clone(), Arc::new(report.clone()));
            AnalyzeResponse {
                masking,
                analysis: Some(report),
                cached: false,
                analysis_error: None,
            }
        }
        Err(err) => {
            warn!(error = %err, "analysis unavailable, returning masking result only");
            AnalyzeResponse {
                masking,
                analysis: None,
                cached: false,
                analysis_error: Some(err.to_string()),
            }
        }
    };
    Ok(Json(response))
}

/// Validate, hash and mask one upload on the blocking pool.
async fn mask_upload(state: &AppState, request: MaskRequest) -> Result<MaskResponse, ApiError> {
    let MaskRequest {
        log_content,
        file_name,
    } = request;
    upload::validate(&log_content, file_name.as_deref(), state.max_upload_bytes)?;

    let redactor = Arc::clone(&state.redactor);
    let (content_hash, result) = tokio::task::spawn_blocking(move || {
        let hash = upload::content_hash(&log_content);
        (hash, redactor.scan(&log_content))
    })
    .await?;

    info!(
        redactions = result.redactions.len(),
        hash = %content_hash,
        "masked upload"
    );

    Ok(MaskResponse {
        masked_log: result.masked_log,
        redactions: result.redactions,
        content_hash,
        download_name: file_name.as_deref().map(upload::download_name),
    })
}
