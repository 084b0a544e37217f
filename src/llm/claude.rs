//! Claude (Anthropic) Messages API client
//!
//! SECURITY: API keys are ONLY sent to the configured Anthropic endpoint.

use serde::{Deserialize, Serialize};

use super::{ChatClient, ChatRequest, ProviderError};

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic accepts temperatures up to 1.0 only
const MAX_TEMPERATURE: f32 = 1.0;

pub struct ClaudeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ClaudeClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Read `ANTHROPIC_API_KEY` from the environment
    pub fn from_env(base_url: impl Into<String>) -> Self {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::new(base_url, api_key)
    }

    fn endpoint(&self) -> String {
        format!("{}/messages", self.base_url.trim_end_matches('/'))
    }

    fn build_request(&self, request: &ChatRequest<'_>) -> ClaudeRequest {
        let mut blocks = Vec::new();
        if let Some(image) = request.image {
            blocks.push(ClaudeContentBlock::Image {
                source: ImageSource {
                    source_type: "base64".to_string(),
                    media_type: image.media_type.clone(),
                    data: image.data.clone(),
                },
            });
        }
        blocks.push(ClaudeContentBlock::Text {
            text: request.prompt.to_string(),
        });

        ClaudeRequest {
            model: request.model.to_string(),
            max_tokens: request.sampling.max_tokens(),
            temperature: request.sampling.temperature().min(MAX_TEMPERATURE),
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: blocks,
            }],
        }
    }
}

#[async_trait::async_trait]
impl ChatClient for ClaudeClient {
    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: &ChatRequest<'_>) -> Result<String, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ProviderError::Unauthorized(
                "ANTHROPIC_API_KEY environment variable not set".to_string(),
            ));
        };

        tracing::debug!(
            target: "llm",
            provider = "Anthropic",
            model = request.model,
            with_image = request.image.is_some(),
            "Sending messages request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&self.build_request(request))
            .send()
            .await
            .map_err(ProviderError::from_network_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_http_status(status, error_text));
        }

        let api_response: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let text: Vec<String> = api_response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ClaudeResponseBlock::Text { text } => Some(text),
                ClaudeResponseBlock::Other => None,
            })
            .collect();

        if text.is_empty() {
            return Err(ProviderError::InvalidResponse(
                "Anthropic returned no text content".to_string(),
            ));
        }
        Ok(text.join("\n"))
    }
}

#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ClaudeMessage>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: String,
    content: Vec<ClaudeContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ClaudeContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: String,
    media_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<ClaudeResponseBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ClaudeResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ImageInput, SamplingConfig};

    #[test]
    fn test_temperature_clamped() {
        let client = ClaudeClient::new(ANTHROPIC_API_URL, Some("key".into()));
        let request = ChatRequest {
            model: "claude-sonnet-4-20250514",
            prompt: "hi",
            sampling: SamplingConfig::new(1.6, 1000).unwrap(),
            image: None,
        };
        let body = client.build_request(&request);
        assert_eq!(body.temperature, 1.0);
        assert_eq!(body.max_tokens, 1000);
    }

    #[test]
    fn test_image_block_precedes_text() {
        let client = ClaudeClient::new(ANTHROPIC_API_URL, Some("key".into()));
        let image = ImageInput {
            media_type: "image/gif".into(),
            data: "R0lG".into(),
        };
        let request = ChatRequest {
            model: "claude-sonnet-4-20250514",
            prompt: "Describe",
            sampling: SamplingConfig::default(),
            image: Some(&image),
        };
        let body = serde_json::to_value(client.build_request(&request)).unwrap();
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["media_type"], "image/gif");
        assert_eq!(content[1]["type"], "text");
    }

    #[tokio::test]
    async fn test_missing_key() {
        let client = ClaudeClient::new(ANTHROPIC_API_URL, None);
        assert!(!client.has_credentials());
        let request = ChatRequest {
            model: "claude-sonnet-4-20250514",
            prompt: "hi",
            sampling: SamplingConfig::default(),
            image: None,
        };
        let err = client.complete(&request).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unauthorized(_)));
    }

    #[test]
    fn test_response_ignores_unknown_blocks() {
        let parsed: ClaudeResponse = serde_json::from_str(
            r#"{"content":[{"type":"thinking","thinking":"..."},{"type":"text","text":"Hi"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.content.len(), 2);
        assert!(matches!(parsed.content[1], ClaudeResponseBlock::Text { .. }));
    }
}
