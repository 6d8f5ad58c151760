//! Common error types for the edit pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid action '{0}'. Expected one of 'edit', 'filter' or 'adjust'")]
    InvalidAction(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid image data: {0}")]
    Encoding(String),

    #[error("Image is too large ({size} bytes). The limit is {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Method not allowed. Only POST requests are accepted")]
    MethodNotAllowed,

    #[error("Request was blocked. Reason: {reason}.{}", .message.as_deref().map(|m| format!(" {m}")).unwrap_or_default())]
    ContentBlocked {
        reason: String,
        message: Option<String>,
    },

    #[error("Image generation stopped unexpectedly. Reason: {0}. This is often related to safety settings")]
    GenerationStopped(String),

    #[error("The model did not return an image. {}", .0.as_deref().map(|t| format!("It responded with text: \"{t}\"")).unwrap_or_else(|| "Try rephrasing the prompt more directly.".to_string()))]
    NoImageReturned(Option<String>),

    #[error("Rate limit exceeded. Please try again in a minute")]
    RateLimited,

    #[error("Image model request failed: {0}")]
    ModelCall(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Edit request failed ({status}): {message}")]
    Proxy { status: u16, message: String },

    #[error("The server returned an unexpected response: {0}")]
    MalformedResponse(String),
}

/// Canonical error body: every failure renders as `{ "error": "<message>" }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidAction(_)
            | AppError::MissingField(_)
            | AppError::InvalidRequest(_)
            | AppError::Encoding(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Config(_)
            | AppError::ContentBlocked { .. }
            | AppError::GenerationStopped(_)
            | AppError::NoImageReturned(_)
            | AppError::ModelCall(_)
            | AppError::HttpClient(_)
            | AppError::Proxy { .. }
            | AppError::MalformedResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::InvalidAction("rotate".into()), 400),
            (AppError::MissingField("prompt"), 400),
            (AppError::Encoding("not a data URL".into()), 400),
            (AppError::MethodNotAllowed, 405),
            (AppError::PayloadTooLarge { size: 11, limit: 10 }, 413),
            (AppError::RateLimited, 429),
            (AppError::GenerationStopped("SAFETY".into()), 500),
            (AppError::NoImageReturned(None), 500),
        ];

        for (error, expected) in cases {
            let response = error.into_response();
            assert_eq!(response.status().as_u16(), expected);
        }
    }

    #[test]
    fn test_blocked_message_includes_reason() {
        let error = AppError::ContentBlocked {
            reason: "SAFETY".into(),
            message: Some("Prompt violates policy".into()),
        };
        let text = error.to_string();
        assert!(text.contains("SAFETY"));
        assert!(text.contains("Prompt violates policy"));
    }

    #[test]
    fn test_no_image_message_carries_feedback() {
        let error = AppError::NoImageReturned(Some("I cannot do that".into()));
        assert!(error.to_string().contains("I cannot do that"));

        let error = AppError::NoImageReturned(None);
        assert!(error.to_string().contains("rephrasing"));
    }
}
