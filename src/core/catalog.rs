//! Provider/model registry
//!
//! The catalog is immutable configuration data: a fixed set of providers,
//! each with an ordered, non-empty list of unique model ids. The first model
//! of each list is the provider's default.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::CatalogError;

/// The closed set of supported AI providers, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    #[serde(rename = "xai")]
    XaiGrok,
    #[serde(rename = "deepseek")]
    DeepSeek,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::OpenAi,
        Provider::Anthropic,
        Provider::XaiGrok,
        Provider::DeepSeek,
    ];

    /// Stable lowercase id used in config files and the HTTP API
    pub fn id(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::XaiGrok => "xai",
            Provider::DeepSeek => "deepseek",
        }
    }

    /// Human-facing name shown in selectors and message captions
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Anthropic => "Anthropic",
            Provider::XaiGrok => "xAI Grok",
            Provider::DeepSeek => "DeepSeek",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Provider::OpenAi => "🤖",
            Provider::Anthropic => "🧠",
            Provider::XaiGrok => "⚡",
            Provider::DeepSeek => "🔍",
        }
    }

    /// Brand colour (hex) used by the dashboard charts
    pub fn color(self) -> &'static str {
        match self {
            Provider::OpenAi => "#10A37F",
            Provider::Anthropic => "#D97706",
            Provider::XaiGrok => "#6B46C1",
            Provider::DeepSeek => "#EF4444",
        }
    }

    pub fn features(self) -> &'static [Feature] {
        match self {
            Provider::OpenAi => &[Feature::Chat, Feature::Voice, Feature::Image, Feature::Code],
            Provider::Anthropic => &[
                Feature::Chat,
                Feature::Image,
                Feature::Code,
                Feature::Analysis,
            ],
            Provider::XaiGrok => &[Feature::Chat, Feature::Image, Feature::Realtime],
            Provider::DeepSeek => &[Feature::Chat, Feature::Reasoning, Feature::Code],
        }
    }

    pub fn supports(self, feature: Feature) -> bool {
        self.features().contains(&feature)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Provider {
    type Err = CatalogError;

    /// Accepts display names, ids and a few common aliases, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "openai" | "gpt" => Ok(Provider::OpenAi),
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "xai grok" | "xai" | "grok" | "xai-grok" => Ok(Provider::XaiGrok),
            "deepseek" => Ok(Provider::DeepSeek),
            _ => Err(CatalogError::UnknownProvider(s.to_string())),
        }
    }
}

/// Provider capability tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Chat,
    Voice,
    Image,
    Code,
    Analysis,
    Realtime,
    Reasoning,
}

/// Provider summary for selectors and the `/providers` endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub features: Vec<Feature>,
    pub models: Vec<String>,
    pub default_model: String,
}

/// Immutable provider → models lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCatalog {
    models: BTreeMap<Provider, Vec<String>>,
}

impl Default for ProviderCatalog {
    fn default() -> Self {
        let models = Provider::ALL
            .iter()
            .map(|&p| (p, default_models(p).iter().map(|m| m.to_string()).collect()))
            .collect();
        Self { models }
    }
}

fn default_models(provider: Provider) -> &'static [&'static str] {
    match provider {
        Provider::OpenAi => &["gpt-4o", "gpt-4o-mini", "gpt-3.5-turbo"],
        Provider::Anthropic => &["claude-sonnet-4-20250514", "claude-3-7-sonnet-20250219"],
        Provider::XaiGrok => &["grok-2-1212", "grok-2-vision-1212"],
        Provider::DeepSeek => &["deepseek-chat", "deepseek-reasoner"],
    }
}

impl ProviderCatalog {
    /// Build a catalog from config overrides keyed by provider name
    ///
    /// Providers without an override keep their built-in model list.
    pub fn from_overrides(overrides: &HashMap<String, Vec<String>>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for (name, models) in overrides {
            let provider: Provider = name.parse()?;
            validate_models(provider, models)?;
            catalog.models.insert(provider, models.clone());
        }
        Ok(catalog)
    }

    /// Ordered model ids for a provider name
    pub fn models_for(&self, provider: &str) -> Result<&[String], CatalogError> {
        let provider: Provider = provider.parse()?;
        Ok(self.models(provider))
    }

    /// Ordered model ids for a provider
    pub fn models(&self, provider: Provider) -> &[String] {
        self.models
            .get(&provider)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First model in the provider's list
    pub fn default_model(&self, provider: Provider) -> &str {
        self.models(provider)
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn contains(&self, provider: Provider, model: &str) -> bool {
        self.models(provider).iter().any(|m| m == model)
    }

    pub fn providers(&self) -> impl Iterator<Item = Provider> + '_ {
        self.models.keys().copied()
    }

    pub fn info(&self, provider: Provider) -> ProviderInfo {
        ProviderInfo {
            id: provider.id().to_string(),
            name: provider.display_name().to_string(),
            icon: provider.icon().to_string(),
            color: provider.color().to_string(),
            features: provider.features().to_vec(),
            models: self.models(provider).to_vec(),
            default_model: self.default_model(provider).to_string(),
        }
    }

    pub fn list(&self) -> Vec<ProviderInfo> {
        self.providers().map(|p| self.info(p)).collect()
    }
}

fn validate_models(provider: Provider, models: &[String]) -> Result<(), CatalogError> {
    if models.is_empty() {
        return Err(CatalogError::InvalidCatalog {
            provider: provider.display_name().to_string(),
            reason: "model list is empty".to_string(),
        });
    }
    let mut seen = HashSet::new();
    for model in models {
        if model.trim().is_empty() {
            return Err(CatalogError::InvalidCatalog {
                provider: provider.display_name().to_string(),
                reason: "model id is blank".to_string(),
            });
        }
        if !seen.insert(model.as_str()) {
            return Err(CatalogError::InvalidCatalog {
                provider: provider.display_name().to_string(),
                reason: format!("duplicate model id {}", model),
            });
        }
    }
    Ok(())
}
