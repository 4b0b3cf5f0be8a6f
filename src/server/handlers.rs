//! Request handlers for the demo web application.

use crate::server::error::ApiError;
use crate::server::state::AppState;
use axum::Json;
use axum::extract::{Multipart, State};
use axum::response::Html;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// The embedded upload page.
const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// A single prediction in the API response.
#[derive(Debug, Serialize)]
pub struct PredictionDto {
    /// Human-readable class label.
    pub label: String,
    /// Confidence score in [0, 1].
    pub confidence: f32,
}

/// Response body for a successful classification.
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    /// Predictions ordered by descending confidence, at most top-k entries.
    pub predictions: Vec<PredictionDto>,
}

/// Response body for the health endpoint.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" when the server is up.
    pub status: &'static str,
    /// Name of the loaded model.
    pub model: String,
}

/// Serves the upload page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Liveness probe; the model is loaded before the server starts, so a
/// responding server always has a usable classifier.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.classifier.model_name().to_string(),
    })
}

/// Classifies an uploaded image.
///
/// Expects `multipart/form-data` with an `image` field holding the file
/// bytes. Returns the top-k predictions, or an error body with no
/// predictions if any pipeline stage fails.
pub async fn classify(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let mut image_bytes = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart upload: {e}")))?
    {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?;
            image_bytes = Some(bytes);
            break;
        }
    }

    let bytes = image_bytes
        .ok_or_else(|| ApiError::bad_request("missing 'image' field in multipart upload"))?;
    if bytes.is_empty() {
        return Err(ApiError::bad_request("uploaded image is empty"));
    }

    debug!(upload_bytes = bytes.len(), "classifying upload");

    // The forward pass is CPU-bound; keep it off the async runtime.
    let classifier = Arc::clone(&state.classifier);
    let result = tokio::task::spawn_blocking(move || classifier.classify_bytes(&bytes))
        .await
        .map_err(|e| ApiError::internal(format!("classification task failed: {e}")))??;

    let predictions = result
        .predictions()
        .map(|p| PredictionDto {
            label: p.label.to_string(),
            confidence: p.confidence,
        })
        .collect();

    Ok(Json(ClassifyResponse { predictions }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_response_serializes_as_expected() {
        let response = ClassifyResponse {
            predictions: vec![
                PredictionDto {
                    label: "golden retriever".to_string(),
                    confidence: 0.87,
                },
                PredictionDto {
                    label: "Labrador retriever".to_string(),
                    confidence: 0.05,
                },
            ],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json["predictions"][0]["label"],
            serde_json::json!("golden retriever")
        );
        assert!(json["predictions"][0]["confidence"].as_f64().unwrap() > 0.8);
    }

    #[test]
    fn index_page_has_the_upload_form() {
        assert!(INDEX_HTML.contains("multipart") || INDEX_HTML.contains("FormData"));
        assert!(INDEX_HTML.contains("/classify"));
    }
}
