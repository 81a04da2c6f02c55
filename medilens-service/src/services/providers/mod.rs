//! Generative AI provider abstraction.
//!
//! A trait-based seam over the upstream model API, allowing swapping between
//! the real Gemini backend and a mock.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Trait for text/vision generation providers (e.g., Gemini).
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Generate a text reply for the prompt.
    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Generate a text reply for the prompt plus an inline image.
    async fn analyze_image(
        &self,
        prompt: &str,
        mime_type: &str,
        image: &[u8],
    ) -> Result<String, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
