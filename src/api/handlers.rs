//! Axum request handlers for the edit pipeline

use axum::{body::Bytes, extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::model::reply::interpret;
use crate::model::traits::ImagePayload;
use crate::prompt::{build_instruction, EditAction, Hotspot};
use crate::response::data_url;
use crate::AppState;

/// Wire shape of an edit request.
///
/// Every field is optional here so that a missing one is reported as its own
/// explicit failure instead of a generic deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequestBody {
    pub image_data_url: Option<String>,
    pub action: Option<String>,
    pub prompt: Option<String>,
    pub hotspot: Option<Hotspot>,
}

/// Canonical success body.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResponse {
    pub image_url: String,
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Apply one edit request end to end: validate, build the instruction,
/// invoke the model, interpret the reply.
///
/// All validation and the size check run before the model is called, so a
/// rejected request never spends model quota.
pub async fn apply_edit(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<EditResponse>> {
    let request_id = Uuid::new_v4();
    let span = info_span!("edit_request", %request_id);

    async move {
        let body: EditRequestBody = serde_json::from_slice(&body)
            .map_err(|e| AppError::InvalidRequest(format!("request body is not valid JSON: {}", e)))?;

        let image_data_url = body
            .image_data_url
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(AppError::MissingField("imageDataUrl"))?;
        let action = body
            .action
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(AppError::MissingField("action"))?;
        let prompt = body
            .prompt
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(AppError::MissingField("prompt"))?;

        let action: EditAction = action.parse()?;

        let (mime_type, payload) = data_url::split(image_data_url)?;
        let size = data_url::decoded_len(payload);
        let limit = state.settings.limits.max_image_bytes;
        if size > limit {
            return Err(AppError::PayloadTooLarge { size, limit });
        }

        let instruction = build_instruction(action, prompt, body.hotspot)?;

        info!(action = %action, size, "Forwarding edit request to the image model");

        let image = ImagePayload {
            mime_type: mime_type.to_string(),
            data: payload.to_string(),
        };
        let reply = state.model.generate(image, &instruction).await?;

        let image_url = interpret(reply)?;
        info!(action = %action, "Edit request succeeded");

        Ok(Json(EditResponse { image_url }))
    }
    .instrument(span)
    .await
}
