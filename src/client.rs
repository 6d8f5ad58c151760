//! Caller-side invoker for the proxy endpoint
//!
//! The browser-facing counterpart of the edit endpoint: encodes the image
//! once, posts the payload, and translates transport or contract failures
//! into the shared error taxonomy. Never retries; one outcome per call.

use reqwest::Client;
use serde_json::json;

use crate::api::handlers::EditResponse;
use crate::error::{AppError, ErrorResponse, Result};
use crate::prompt::Hotspot;
use crate::response::data_url;

/// Client for the edit endpoint.
pub struct EditClient {
    http: Client,
    base_url: String,
}

impl EditClient {
    /// Create a client with a default HTTP client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client with a caller-provided HTTP client.
    ///
    /// Timeouts and cancellation are the caller's concern; configure them on
    /// the `reqwest::Client` passed here.
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Apply a localized edit focused on the hotspot.
    pub async fn edit(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
        hotspot: Hotspot,
    ) -> Result<String> {
        let image_data_url = data_url::encode(image, mime_type);
        self.call(json!({
            "imageDataUrl": image_data_url,
            "action": "edit",
            "prompt": prompt,
            "hotspot": hotspot,
        }))
        .await
    }

    /// Apply a stylistic filter to the whole image.
    pub async fn filter(&self, image: &[u8], mime_type: &str, prompt: &str) -> Result<String> {
        let image_data_url = data_url::encode(image, mime_type);
        self.call(json!({
            "imageDataUrl": image_data_url,
            "action": "filter",
            "prompt": prompt,
        }))
        .await
    }

    /// Apply a global photorealistic adjustment.
    pub async fn adjust(&self, image: &[u8], mime_type: &str, prompt: &str) -> Result<String> {
        let image_data_url = data_url::encode(image, mime_type);
        self.call(json!({
            "imageDataUrl": image_data_url,
            "action": "adjust",
            "prompt": prompt,
        }))
        .await
    }

    async fn call(&self, payload: serde_json::Value) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/api/edits", self.base_url))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Prefer the structured error the endpoint produces; fall back to
            // a synthesized message when the body came from something else
            // (a proxy error page, a misrouted deploy).
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error,
                Err(_) => format!("the server returned {} with no readable error body", status),
            };
            return Err(AppError::Proxy {
                status: status.as_u16(),
                message,
            });
        }

        let body: EditResponse = response.json().await.map_err(|e| {
            AppError::MalformedResponse(format!("success body did not match the contract: {}", e))
        })?;

        if body.image_url.is_empty() {
            return Err(AppError::MalformedResponse(
                "success body carried an empty image URL".to_string(),
            ));
        }

        Ok(body.image_url)
    }
}
