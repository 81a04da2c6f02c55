//! Gemini provider implementation.
//!
//! Relays prompts (and optionally an inline image) to Google's Gemini API via
//! the `generateContent` REST method and returns the model's text verbatim.

use super::{GenerativeProvider, ProviderError};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Gemini API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub text_model: String,
    pub vision_model: String,
}

/// Gemini text/vision provider.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Build the generateContent URL for the given model.
    fn api_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_API_BASE, model, self.config.api_key
        )
    }

    async fn generate(
        &self,
        model: &str,
        parts: Vec<ContentPart>,
    ) -> Result<String, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
        };

        let url = self.api_url(model);

        tracing::debug!(model = %model, "Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        api_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .and_then(|p| match p {
                ContentPart::Text { text } => Some(text.clone()),
                _ => None,
            })
            .ok_or(ProviderError::EmptyResponse)
    }
}

#[async_trait]
impl GenerativeProvider for GeminiProvider {
    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        let parts = vec![ContentPart::Text {
            text: prompt.to_string(),
        }];
        self.generate(&self.config.text_model, parts).await
    }

    async fn analyze_image(
        &self,
        prompt: &str,
        mime_type: &str,
        image: &[u8],
    ) -> Result<String, ProviderError> {
        let data = base64::engine::general_purpose::STANDARD.encode(image);
        let parts = vec![
            ContentPart::Text {
                text: prompt.to_string(),
            },
            ContentPart::InlineData {
                inline_data: InlineData {
                    mime_type: mime_type.to_string(),
                    data,
                },
            },
        ];
        self.generate(&self.config.vision_model, parts).await
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ));
        }

        // Listing models verifies the API key works.
        let url = format!("{}/models?key={}", GEMINI_API_BASE, self.config.api_key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::ApiError(format!(
                "Health check failed: {}",
                response.status()
            )))
        }
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
}
