//! Response sources and provider clients

mod claude;
mod error;
mod live;
mod openai_compat;
mod simulated;
mod types;

pub use claude::{ClaudeClient, ANTHROPIC_API_URL};
pub use error::ProviderError;
pub use live::LiveSource;
pub use openai_compat::{AuthMethod, OpenAiCompatClient, OpenAiCompatConfig};
pub use simulated::{SimCall, SimulatedSource};
pub use types::*;

use async_trait::async_trait;

use crate::core::{Provider, Selection};

/// Capability that turns a prompt and selection into assistant text
///
/// The chat controller only ever talks to this trait, so the simulated
/// source and the live HTTP source are interchangeable.
#[async_trait]
pub trait ResponseSource: Send + Sync {
    /// Short name for logs ("simulated", "live")
    fn name(&self) -> &str;

    async fn generate(
        &self,
        prompt: &str,
        selection: &Selection,
        sampling: &SamplingConfig,
    ) -> Result<String, ProviderError>;

    /// Whether calls to `provider` can succeed without contacting it
    /// (e.g. its API key is configured)
    fn is_available(&self, _provider: Provider) -> bool {
        true
    }
}

/// Transport-level client for one provider API
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, request: &ChatRequest<'_>) -> Result<String, ProviderError>;

    /// An API key is configured for this client
    fn has_credentials(&self) -> bool;
}
