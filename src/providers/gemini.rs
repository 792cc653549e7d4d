//! Google Gemini provider implementation for Stargazer
//!
//! This module implements the `TextGenerator` trait against the Gemini
//! `generateContent` REST endpoint. Each call sends the full conversation
//! plus an optional system instruction and returns the concatenated text
//! of the first candidate.

use crate::config::GeminiConfig;
use crate::error::{Result, StargazerError};
use crate::providers::{Message, Role, TextGenerator};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini API provider
///
/// # Examples
///
/// ```
/// use stargazer::config::GeminiConfig;
/// use stargazer::providers::{GeminiProvider, TextGenerator};
///
/// let provider = GeminiProvider::new(GeminiConfig::default()).unwrap();
/// assert_eq!(provider.model(), "gemini-2.5-flash");
/// ```
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
}

/// A role-tagged list of parts
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Error envelope returned by Google APIs
#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("stargazer/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| {
            StargazerError::Provider(format!("Failed to create HTTP client: {}", e))
        })?;

        tracing::info!(
            "Initialized Gemini provider: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self { client, config })
    }

    /// Build the `generateContent` URL for the configured model
    fn endpoint(&self) -> Result<url::Url> {
        let mut base = url::Url::parse(&self.config.api_base).map_err(|e| {
            StargazerError::Provider(format!(
                "Invalid Gemini API base {}: {}",
                self.config.api_base, e
            ))
        })?;
        // `join` replaces the last segment unless the base ends in a slash
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let path = format!("v1beta/models/{}:generateContent", self.config.model);
        base.join(&path).map_err(|e| {
            StargazerError::Provider(format!("Failed to build Gemini URL: {}", e)).into()
        })
    }

    /// Convert conversation messages to Gemini contents
    fn convert_messages(messages: &[Message]) -> Vec<GeminiContent> {
        messages
            .iter()
            .map(|m| GeminiContent {
                role: Some(
                    match m.role {
                        Role::User => "user",
                        Role::Model => "model",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: m.text.clone(),
                }],
            })
            .collect()
    }

    /// Join the text parts of the first candidate
    fn extract_text(response: GenerateContentResponse) -> Result<String> {
        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            StargazerError::Provider("Gemini returned no candidates".to_string())
        })?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
            return Err(StargazerError::Provider(format!(
                "Gemini returned an empty response (finish reason: {})",
                reason
            ))
            .into());
        }

        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate(
        &self,
        api_key: &str,
        system_instruction: Option<&str>,
        history: &[Message],
    ) -> Result<String> {
        let url = self.endpoint()?;

        let request = GenerateContentRequest {
            system_instruction: system_instruction.map(|text| GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: text.to_string(),
                }],
            }),
            contents: Self::convert_messages(history),
        };

        tracing::debug!(
            "Sending Gemini request: model={}, {} messages",
            self.config.model,
            request.contents.len()
        );

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                StargazerError::Provider(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            let detail = serde_json::from_str::<GeminiErrorResponse>(&error_text)
                .map(|e| e.error.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or(error_text);

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    StargazerError::Authentication(detail)
                }
                _ => StargazerError::Provider(format!("Gemini returned error {}: {}", status, detail)),
            }
            .into());
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            StargazerError::Provider(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text = Self::extract_text(body)?;
        tracing::debug!("Gemini response: {} chars", text.len());
        Ok(text)
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }
}
