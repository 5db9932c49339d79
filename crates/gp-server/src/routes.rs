use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use gp_core::Savings;
use gp_compressor::CompressionResult;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Upper bound on prompts per batch request.
const MAX_BATCH: usize = 100;

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

pub fn compress_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/compress", post(compress))
        .route("/api/v1/compress/batch", post(compress_batch))
}

#[derive(Debug, Deserialize)]
pub struct CompressRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CompressResponse {
    #[serde(flatten)]
    pub result: CompressionResult,
    pub savings: Savings,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub prompts: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<CompressResponse>,
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

async fn compress(
    State(state): State<AppState>,
    Json(req): Json<CompressRequest>,
) -> Json<CompressResponse> {
    let result = state.pipeline.compress(&req.text).await;
    let savings = state.estimator.estimate(result.tokens_saved());
    Json(CompressResponse { result, savings })
}

/// Compress independent prompts concurrently; results come back in request
/// order.
async fn compress_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    if req.prompts.len() > MAX_BATCH {
        return Err(ApiError::bad_request(format!(
            "batch size {} exceeds limit {MAX_BATCH}",
            req.prompts.len()
        )));
    }

    let handles: Vec<_> = req
        .prompts
        .into_iter()
        .map(|text| {
            let pipeline = state.pipeline.clone();
            tokio::spawn(async move { pipeline.compress(&text).await })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = handle
            .await
            .map_err(|e| ApiError::internal(e.to_string()))?;
        let savings = state.estimator.estimate(result.tokens_saved());
        results.push(CompressResponse { result, savings });
    }
    Ok(Json(BatchResponse { results }))
}
