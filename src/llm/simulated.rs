//! Simulated response source
//!
//! The default `ResponseSource`. No API keys, no network: every reply is a
//! constant template naming the provider and model. Latency and per-provider
//! failures can be injected so comparison mode and error notices can be
//! exercised end to end.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{ProviderError, ResponseSource, SamplingConfig};
use crate::config::SimulationConfig;
use crate::core::{Provider, Selection};

/// One recorded generate call
#[derive(Debug, Clone, serde::Serialize)]
pub struct SimCall {
    pub timestamp: DateTime<Utc>,
    pub provider: Provider,
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

pub struct SimulatedSource {
    latency: Duration,
    failing: HashSet<Provider>,
    /// Calls received, for observability in tests and `--verbose` runs
    calls: Mutex<Vec<SimCall>>,
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSource {
    pub fn new() -> Self {
        Self {
            latency: Duration::ZERO,
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Build from the `[simulation]` config section, skipping unknown provider names
    pub fn from_config(config: &SimulationConfig) -> Self {
        let mut source = Self::new().with_latency(Duration::from_millis(config.latency_ms));
        for name in &config.fail_providers {
            match name.parse::<Provider>() {
                Ok(provider) => source = source.with_failure(provider),
                Err(e) => tracing::warn!("Ignoring simulation.fail_providers entry: {}", e),
            }
        }
        source
    }

    /// Delay every reply by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make every call to `provider` fail with a service error
    pub fn with_failure(mut self, provider: Provider) -> Self {
        self.failing.insert(provider);
        self
    }

    /// The reply the simulator produces for a selection
    pub fn response_text(selection: &Selection) -> String {
        format!(
            "This is a simulated response from {} using {}. \
             In the real implementation, this would connect to your FastBite Pro backend API.",
            selection.provider().display_name(),
            selection.model()
        )
    }

    /// Snapshot of all calls received so far
    pub fn calls(&self) -> Vec<SimCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, call: SimCall) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);
    }
}

#[async_trait]
impl ResponseSource for SimulatedSource {
    fn name(&self) -> &str {
        "simulated"
    }

    fn is_available(&self, provider: Provider) -> bool {
        !self.failing.contains(&provider)
    }

    async fn generate(
        &self,
        prompt: &str,
        selection: &Selection,
        sampling: &SamplingConfig,
    ) -> Result<String, ProviderError> {
        self.record(SimCall {
            timestamp: Utc::now(),
            provider: selection.provider(),
            model: selection.model().to_string(),
            prompt: prompt.to_string(),
            temperature: sampling.temperature(),
            max_tokens: sampling.max_tokens(),
        });

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.failing.contains(&selection.provider()) {
            tracing::debug!(
                target: "llm",
                provider = selection.provider().display_name(),
                "Simulated failure"
            );
            return Err(ProviderError::ServiceError(format!(
                "{} is unavailable (simulated)",
                selection.provider().display_name()
            )));
        }

        Ok(Self::response_text(selection))
    }
}
