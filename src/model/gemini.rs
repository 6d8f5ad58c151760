//! Gemini REST adapter for the image model boundary

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ModelConfig;
use crate::error::{AppError, Result};
use crate::model::reply::{BlockSignal, InlineImage, ModelReply, ReplyCandidate};
use crate::model::traits::{ImageModel, ImagePayload};

/// Gemini-backed image model.
///
/// The endpoint and model name come from configuration so tests can point
/// the adapter at a stub server.
pub struct GeminiModel {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiModel {
    /// Create a new adapter from configuration.
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::ModelCall(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.name.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn request_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

#[async_trait]
impl ImageModel for GeminiModel {
    async fn generate(&self, image: ImagePayload, instruction: &str) -> Result<ModelReply> {
        let body = GenerateContentRequest::new(image, instruction);

        debug!(model = %self.model, "Sending generate request");

        let response = self
            .client
            .post(self.request_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Image model request failed");
                AppError::ModelCall("could not reach the image model".to_string())
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "Image model returned an error");
            return Err(AppError::ModelCall(format!(
                "the image model returned status {}",
                status.as_u16()
            )));
        }

        let provider_response: GenerateContentResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Image model response did not parse");
            AppError::ModelCall("the image model returned an unreadable response".to_string())
        })?;

        Ok(provider_response.into_reply())
    }
}

// Provider wire types. Everything below is the only place in the crate that
// knows the provider's JSON shape.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

impl GenerateContentRequest {
    fn new(image: ImagePayload, instruction: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type,
                            data: image.data,
                        },
                    },
                    RequestPart::Text {
                        text: instruction.to_string(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string(), "TEXT".to_string()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    inline_data: Option<InlineData>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

impl GenerateContentResponse {
    /// Map the provider's response shape into the normalized model reply.
    fn into_reply(self) -> ModelReply {
        let block = self.prompt_feedback.and_then(|feedback| match feedback.block_reason {
            Some(reason) => Some(BlockSignal {
                reason,
                message: feedback.block_reason_message,
            }),
            None => None,
        });

        let mut text_feedback: Option<String> = None;
        let candidates = self
            .candidates
            .into_iter()
            .map(|candidate| {
                let mut image = None;
                for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
                    if let Some(inline) = part.inline_data {
                        if image.is_none() {
                            image = Some(InlineImage {
                                mime_type: inline.mime_type,
                                data: inline.data,
                            });
                        }
                    } else if let Some(text) = part.text {
                        if text_feedback.is_none() && !text.trim().is_empty() {
                            text_feedback = Some(text);
                        }
                    }
                }
                ReplyCandidate {
                    image,
                    finish_reason: candidate.finish_reason,
                }
            })
            .collect();

        ModelReply {
            block,
            candidates,
            text_feedback,
        }
    }
}
