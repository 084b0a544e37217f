//! Domain error types
//!
//! These errors represent business logic failures, distinct from provider
//! (transport) errors which live in `crate::llm::ProviderError`.

use thiserror::Error;

/// Errors from the provider/model registry and selection state machine
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Provider name is not one of the fixed set
    #[error("Unknown provider: {0}. Supported: OpenAI, Anthropic, xAI Grok, DeepSeek")]
    UnknownProvider(String),

    /// Model is not offered by the currently selected provider
    #[error("Model not available for {provider}: {model}")]
    InvalidModel { provider: String, model: String },

    /// Catalog override rejected (empty or duplicate model list)
    #[error("Invalid catalog for {provider}: {reason}")]
    InvalidCatalog { provider: String, reason: String },
}

/// Errors related to session lookup
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
}

/// Slider value outside its allowed range
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SettingsError {
    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: String,
        min: String,
        max: String,
    },
}

impl SettingsError {
    /// NaN never passes, since it compares false against both bounds
    pub(crate) fn check<T>(name: &'static str, value: T, min: T, max: T) -> Result<(), Self>
    where
        T: PartialOrd + std::fmt::Display,
    {
        if value >= min && value <= max {
            Ok(())
        } else {
            Err(SettingsError::OutOfRange {
                name,
                value: value.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            })
        }
    }
}
