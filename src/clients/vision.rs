//! Image label detection client.
//!
//! Sends the image (base64) to the vision API's annotate endpoint asking for
//! label detection and object localization, then flattens both annotation
//! kinds into one raw label list. No thresholding happens here; the
//! normalizer owns that.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::IngredientDetector;
use crate::error::PipelineError;
use crate::models::RawLabel;

// ---

/// Max annotations requested per feature kind.
const MAX_RESULTS: u32 = 20;

pub struct VisionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl VisionClient {
    // ---
    pub fn new(http: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl IngredientDetector for VisionClient {
    // ---
    async fn detect(&self, image: &[u8]) -> Result<Vec<RawLabel>, PipelineError> {
        let body = json!({
            "requests": [{
                "image": { "content": BASE64.encode(image) },
                "features": [
                    { "type": "LABEL_DETECTION", "maxResults": MAX_RESULTS },
                    { "type": "OBJECT_LOCALIZATION", "maxResults": MAX_RESULTS },
                ],
            }]
        });

        let response = self
            .http
            .post(format!("{}?key={}", self.base_url, self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::upstream("detector", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::upstream("detector", format!("HTTP {status}")));
        }

        let parsed: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::upstream("detector", e))?;

        let result = parsed.responses.into_iter().next().unwrap_or_default();
        if let Some(err) = result.error {
            return Err(PipelineError::upstream("detector", err.message));
        }

        let labels = flatten_annotations(result);
        debug!("detector returned {} raw labels", labels.len());
        Ok(labels)
    }
}

fn flatten_annotations(result: AnnotateResult) -> Vec<RawLabel> {
    // ---
    let mut labels = Vec::new();
    for a in result.label_annotations {
        labels.push(RawLabel {
            name: a.description,
            score: a.score,
        });
    }
    for o in result.object_annotations {
        labels.push(RawLabel {
            name: o.name,
            score: o.score,
        });
    }
    labels
}

// --- boundary structs ---

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResult>,
}

#[derive(Debug, Default, Deserialize)]
struct AnnotateResult {
    #[serde(default, rename = "labelAnnotations")]
    label_annotations: Vec<LabelAnnotation>,
    #[serde(default, rename = "localizedObjectAnnotations")]
    object_annotations: Vec<ObjectAnnotation>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct LabelAnnotation {
    description: String,
    #[serde(default)]
    score: f32,
}

#[derive(Debug, Deserialize)]
struct ObjectAnnotation {
    name: String,
    #[serde(default)]
    score: f32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}
