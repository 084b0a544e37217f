//! Live response source backed by the real provider APIs
//!
//! OpenAI, xAI Grok and DeepSeek share the OpenAI-compatible client;
//! Anthropic uses the Messages API client. A provider whose key is missing
//! fails on its own calls only.

use async_trait::async_trait;

use super::claude::ClaudeClient;
use super::openai_compat::{create_deepseek, create_openai, create_xai, OpenAiCompatClient};
use super::{ChatClient, ChatRequest, ImageInput, ProviderError, ResponseSource, SamplingConfig};
use crate::config::EndpointsConfig;
use crate::core::{Provider, Selection};

pub struct LiveSource {
    openai: OpenAiCompatClient,
    anthropic: ClaudeClient,
    xai: OpenAiCompatClient,
    deepseek: OpenAiCompatClient,
}

impl LiveSource {
    pub fn new(
        openai: OpenAiCompatClient,
        anthropic: ClaudeClient,
        xai: OpenAiCompatClient,
        deepseek: OpenAiCompatClient,
    ) -> Self {
        Self {
            openai,
            anthropic,
            xai,
            deepseek,
        }
    }

    /// Build clients for every provider, reading keys from the environment
    pub fn from_endpoints(endpoints: &EndpointsConfig) -> Self {
        Self::new(
            create_openai(&endpoints.openai),
            ClaudeClient::from_env(endpoints.anthropic.clone()),
            create_xai(&endpoints.xai),
            create_deepseek(&endpoints.deepseek),
        )
    }

    pub fn client_for(&self, provider: Provider) -> &dyn ChatClient {
        match provider {
            Provider::OpenAi => &self.openai,
            Provider::Anthropic => &self.anthropic,
            Provider::XaiGrok => &self.xai,
            Provider::DeepSeek => &self.deepseek,
        }
    }

    /// Send a prompt with an attached image to the selected provider
    pub async fn complete_with_image(
        &self,
        prompt: &str,
        selection: &Selection,
        sampling: &SamplingConfig,
        image: &ImageInput,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: selection.model(),
            prompt,
            sampling: *sampling,
            image: Some(image),
        };
        self.client_for(selection.provider())
            .complete(&request)
            .await
    }
}

#[async_trait]
impl ResponseSource for LiveSource {
    fn name(&self) -> &str {
        "live"
    }

    fn is_available(&self, provider: Provider) -> bool {
        self.client_for(provider).has_credentials()
    }

    async fn generate(
        &self,
        prompt: &str,
        selection: &Selection,
        sampling: &SamplingConfig,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: selection.model(),
            prompt,
            sampling: *sampling,
            image: None,
        };
        self.client_for(selection.provider())
            .complete(&request)
            .await
    }
}
