//! Uniform request/response adapter for remote generative models.

use async_trait::async_trait;
use regen_core::Result;

/// One part of a multimodal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// Plain instruction text.
    Text(String),
    /// Base64-encoded image bytes with an explicit MIME type.
    InlineImage { mime_type: String, data: String },
}

/// Adapter over one remote model provider.
///
/// The fallback loop in [`crate::client::VisionClient`] stays
/// provider-agnostic by going through this trait; provider-specific wire
/// formats live entirely in the implementations.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    /// Sends `parts` to the model identified by `model` and returns the raw
    /// response text.
    ///
    /// Failures (network, non-2xx, empty reply) come back as
    /// [`regen_core::RegenError::ModelUnavailable`].
    async fn generate(&self, model: &str, parts: &[ContentPart]) -> Result<String>;
}
