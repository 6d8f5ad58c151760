//! Common trait for generative image model boundaries

use async_trait::async_trait;

use crate::error::Result;
use crate::model::reply::ModelReply;

/// Inline image payload handed to the model.
///
/// The base64 payload is passed through verbatim from the incoming data URL;
/// the pipeline never re-encodes image bytes.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

/// A generative image model that applies a textual instruction to an image.
///
/// The pipeline depends only on this one operation, not on any particular
/// provider's SDK shape. Handlers receive the model as a trait object so
/// tests can substitute a stub.
#[async_trait]
pub trait ImageModel: Send + Sync {
    /// Run one generation and return the normalized reply.
    async fn generate(&self, image: ImagePayload, instruction: &str) -> Result<ModelReply>;
}
