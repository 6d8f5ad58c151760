//! Normalized model replies and their interpretation

use crate::error::{AppError, Result};
use crate::response::data_url;

/// Finish reason the model reports on normal completion.
pub const NORMAL_FINISH: &str = "STOP";

/// Signal that the request was refused before generation.
#[derive(Debug, Clone)]
pub struct BlockSignal {
    pub reason: String,
    pub message: Option<String>,
}

/// Inline image data within a candidate.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

/// One candidate output from the model.
#[derive(Debug, Clone, Default)]
pub struct ReplyCandidate {
    pub image: Option<InlineImage>,
    pub finish_reason: Option<String>,
}

/// Normalized reply from the model boundary.
///
/// Built by a provider adapter, consumed exactly once by [`interpret`].
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    pub block: Option<BlockSignal>,
    pub candidates: Vec<ReplyCandidate>,
    pub text_feedback: Option<String>,
}

/// Decide what a model reply means.
///
/// The checks run in a fixed priority order:
/// 1. a block signal, even alongside apparent image data,
/// 2. the first candidate carrying inline image data,
/// 3. an abnormal finish reason on the top candidate,
/// 4. no image at all, surfacing any text feedback to help rephrasing.
pub fn interpret(reply: ModelReply) -> Result<String> {
    if let Some(block) = reply.block {
        return Err(AppError::ContentBlocked {
            reason: block.reason,
            message: block.message,
        });
    }

    if let Some(image) = reply.candidates.iter().find_map(|c| c.image.as_ref()) {
        return Ok(data_url::from_base64(&image.mime_type, &image.data));
    }

    if let Some(finish) = reply.candidates.first().and_then(|c| c.finish_reason.as_deref()) {
        if finish != NORMAL_FINISH {
            return Err(AppError::GenerationStopped(finish.to_string()));
        }
    }

    let feedback = reply
        .text_feedback
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    Err(AppError::NoImageReturned(feedback))
}
