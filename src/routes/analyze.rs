//! Image analysis endpoint: ingredients in, ranked recipes out.

use std::sync::Arc;

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use tracing::info;

use crate::analysis::Analyzer;

// ---

/// Request body for `POST /analyze`.
#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    /// Base64-encoded image bytes captured by the client.
    image_base64: String,
}

pub fn router() -> Router<Arc<Analyzer>> {
    // ---
    Router::new().route("/analyze", post(handler))
}

async fn handler(
    State(analyzer): State<Arc<Analyzer>>,
    Json(request): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    // ---
    info!("POST /analyze - starting scan pipeline");

    let image = match BASE64.decode(&request.image_base64) {
        Ok(bytes) => bytes,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": format!("invalid image_base64: {e}") })),
            )
                .into_response();
        }
    };

    match analyzer.analyze_image(&image).await {
        Ok(report) => {
            info!("POST /analyze - {}", report.message);
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(e) => e.into_response(),
    }
}
