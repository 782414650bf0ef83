//! Description generation backends
//!
//! The session only knows the `DescriptionGenerator` trait. `GeminiGenerator`
//! is the HTTP implementation used by the app; tests plug in stubs.

use async_trait::async_trait;
use thiserror::Error;

use crate::media::ImageFile;

pub mod gemini;

pub use gemini::GeminiGenerator;

/// Shown when a failure carries no message of its own
pub const FALLBACK_ERROR: &str = "An unexpected error occurred.";

/// Failure of the external generation call.
///
/// Payloads are plain strings so the error can travel inside UI messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Message reported by the service itself (quota, safety block, bad request)
    #[error("{0}")]
    Service(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("The service returned HTTP {status}")]
    Status { status: u16 },

    #[error("The service returned no description.")]
    EmptyResponse,

    #[error("No API key configured. Set GEMINI_API_KEY and restart.")]
    MissingApiKey,
}

impl GenerationError {
    /// Text for the error area, never empty
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_ERROR.to_string()
        } else {
            message
        }
    }
}

/// Something that turns a product image plus notes into marketing copy
#[async_trait]
pub trait DescriptionGenerator: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn generate(
        &self,
        image: &ImageFile,
        features: &str,
        audience: &str,
    ) -> Result<String, GenerationError>;
}
