//! Generic OpenAI-compatible chat client
//!
//! Serves every provider that speaks the OpenAI chat completions format:
//! - OpenAI
//! - xAI Grok
//! - DeepSeek
//!
//! SECURITY: Credentials are only sent to the configured endpoint.

use serde::{Deserialize, Serialize};

use super::{ChatClient, ChatRequest, ProviderError};

/// Authentication method for the API
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// Bearer token in Authorization header
    BearerToken(String),
    /// Key was not configured; requests fail with `Unauthorized`
    Missing { env_var: String },
}

/// Configuration for an OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiCompatConfig {
    /// Provider name used in logs and error messages
    pub name: String,
    /// API base URL, without the `/chat/completions` suffix
    pub base_url: String,
    pub auth: AuthMethod,
    /// Custom headers to send with requests
    pub custom_headers: Vec<(String, String)>,
}

impl OpenAiCompatConfig {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, auth: AuthMethod) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            auth,
            custom_headers: Vec::new(),
        }
    }

    /// Read the API key from `env_var`, recording its absence
    pub fn from_env(name: impl Into<String>, base_url: impl Into<String>, env_var: &str) -> Self {
        let auth = match std::env::var(env_var) {
            Ok(key) if !key.trim().is_empty() => AuthMethod::BearerToken(key),
            _ => AuthMethod::Missing {
                env_var: env_var.to_string(),
            },
        };
        Self::new(name, base_url, auth)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// OpenAI-compatible chat completions client
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    config: OpenAiCompatConfig,
}

impl OpenAiCompatClient {
    pub fn new(config: OpenAiCompatConfig) -> Self {
        Self::with_http_client(reqwest::Client::new(), config)
    }

    pub fn with_http_client(client: reqwest::Client, config: OpenAiCompatConfig) -> Self {
        Self { client, config }
    }

    fn build_request(&self, request: &ChatRequest<'_>) -> OpenAiRequest {
        let content = match request.image {
            Some(image) => OpenAiContent::Parts(vec![
                OpenAiContentPart::Text {
                    text: request.prompt.to_string(),
                },
                OpenAiContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image.data_url(),
                    },
                },
            ]),
            None => OpenAiContent::Text(request.prompt.to_string()),
        };

        OpenAiRequest {
            model: request.model.to_string(),
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content,
            }],
            temperature: request.sampling.temperature(),
            max_tokens: request.sampling.max_tokens(),
        }
    }

    fn build_http_request(&self, body: &OpenAiRequest) -> Result<reqwest::RequestBuilder, ProviderError> {
        let mut req = self
            .client
            .post(self.config.endpoint())
            .header("Content-Type", "application/json");

        match &self.config.auth {
            AuthMethod::BearerToken(token) => {
                req = req.header("Authorization", format!("Bearer {}", token));
            }
            AuthMethod::Missing { env_var } => {
                return Err(ProviderError::Unauthorized(format!(
                    "{} environment variable not set",
                    env_var
                )));
            }
        }

        for (name, value) in &self.config.custom_headers {
            req = req.header(name, value);
        }

        Ok(req.json(body))
    }

    fn parse_response(&self, response: OpenAiResponse) -> Result<String, ProviderError> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ProviderError::InvalidResponse(format!(
                    "{} returned no message content",
                    self.config.name
                ))
            })
    }
}

#[async_trait::async_trait]
impl ChatClient for OpenAiCompatClient {
    fn has_credentials(&self) -> bool {
        matches!(self.config.auth, AuthMethod::BearerToken(_))
    }

    async fn complete(&self, request: &ChatRequest<'_>) -> Result<String, ProviderError> {
        tracing::debug!(
            target: "llm",
            provider = self.config.name,
            model = request.model,
            with_image = request.image.is_some(),
            "Sending chat request"
        );

        let body = self.build_request(request);
        let response = self
            .build_http_request(&body)?
            .send()
            .await
            .map_err(ProviderError::from_network_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_http_status(status, error_text));
        }

        let api_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        self.parse_response(api_response)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    content: OpenAiContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum OpenAiContent {
    Text(String),
    Parts(Vec<OpenAiContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OpenAiContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

// ============================================================================
// Factory Functions
// ============================================================================

pub fn create_openai(base_url: &str) -> OpenAiCompatClient {
    OpenAiCompatClient::new(OpenAiCompatConfig::from_env("OpenAI", base_url, "OPENAI_API_KEY"))
}

pub fn create_xai(base_url: &str) -> OpenAiCompatClient {
    OpenAiCompatClient::new(OpenAiCompatConfig::from_env("xAI Grok", base_url, "XAI_API_KEY"))
}

pub fn create_deepseek(base_url: &str) -> OpenAiCompatClient {
    OpenAiCompatClient::new(OpenAiCompatConfig::from_env(
        "DeepSeek",
        base_url,
        "DEEPSEEK_API_KEY",
    ))
}
