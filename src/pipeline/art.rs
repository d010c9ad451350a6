//! Scene-art generation via a Replicate image model.
//!
//! A thin call site: one prediction request per prompt, blocking until the
//! model finishes (the `Prefer: wait` header asks Replicate to hold the
//! connection open instead of making us poll). The only local logic is
//! output normalisation — depending on the model version the `output`
//! field arrives as a URL string or as a list of URL strings, and callers
//! always get a single string.

use crate::config::CompanionConfig;
use crate::error::CompanionError;
use serde_json::{json, Value};
use tracing::debug;

/// Client for the image-generation API.
pub struct ImageGenerator {
    client: reqwest::Client,
    endpoint_base: String,
    model: String,
    /// Read once at construction; a missing token surfaces on the first
    /// call, never eagerly.
    api_token: Option<String>,
}

impl ImageGenerator {
    pub fn new(config: &CompanionConfig) -> Result<Self, CompanionError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| CompanionError::Internal(format!("http client: {e}")))?;

        Ok(Self {
            client,
            endpoint_base: config.replicate_endpoint.clone(),
            model: config.image_model.clone(),
            api_token: std::env::var("REPLICATE_API_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
        })
    }

    /// Generate an image for the prompt and return its URL.
    pub async fn generate(&self, prompt: &str) -> Result<String, CompanionError> {
        let token = self.api_token.as_deref().ok_or(CompanionError::MissingCredential {
            var: "REPLICATE_API_TOKEN",
            hint: "export REPLICATE_API_TOKEN=r8_... before asking for scene art.".into(),
        })?;

        let url = format!(
            "{}/models/{}/predictions",
            self.endpoint_base.trim_end_matches('/'),
            self.model
        );

        debug!("Requesting image for prompt: {prompt}");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("Prefer", "wait")
            .json(&json!({ "input": { "prompt": prompt } }))
            .send()
            .await
            .map_err(|e| CompanionError::ImageApi {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CompanionError::ImageApi {
                message: format!("HTTP {status}: {detail}"),
            });
        }

        let prediction: Value = response.json().await.map_err(|e| CompanionError::ImageApi {
            message: format!("invalid prediction response: {e}"),
        })?;

        if let Some(err) = prediction.get("error").filter(|e| !e.is_null()) {
            return Err(CompanionError::ImageApi {
                message: err.to_string(),
            });
        }

        normalize_output(prediction.get("output"))
    }
}

/// Normalise the prediction `output` field to a single URL string.
///
/// Accepts a plain string or the first element of a non-empty list; any
/// other shape is a malformed response.
fn normalize_output(output: Option<&Value>) -> Result<String, CompanionError> {
    match output {
        Some(Value::String(url)) => Ok(url.clone()),
        Some(Value::Array(items)) => match items.first() {
            Some(Value::String(url)) => Ok(url.clone()),
            Some(other) => Ok(other.to_string()),
            None => Err(CompanionError::MalformedResponse {
                what: "image",
                detail: "prediction output list is empty".into(),
            }),
        },
        other => Err(CompanionError::MalformedResponse {
            what: "image",
            detail: format!("unexpected prediction output: {other:?}"),
        }),
    }
}
