//! Shared types for response sources and provider clients

use serde::{Deserialize, Serialize};

use crate::core::errors::SettingsError;

pub const TEMPERATURE_RANGE: (f32, f32) = (0.0, 2.0);
pub const MAX_TOKENS_RANGE: (u32, u32) = (100, 4000);

/// Sampling parameters passed to every generate call
///
/// Values are validated on construction: temperature in `[0.0, 2.0]`,
/// max_tokens in `[100, 4000]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawSampling")]
pub struct SamplingConfig {
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct RawSampling {
    temperature: f32,
    max_tokens: u32,
}

impl TryFrom<RawSampling> for SamplingConfig {
    type Error = SettingsError;

    fn try_from(raw: RawSampling) -> Result<Self, Self::Error> {
        SamplingConfig::new(raw.temperature, raw.max_tokens)
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

impl SamplingConfig {
    pub fn new(temperature: f32, max_tokens: u32) -> Result<Self, SettingsError> {
        let mut config = Self::default();
        config.set_temperature(temperature)?;
        config.set_max_tokens(max_tokens)?;
        Ok(config)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn set_temperature(&mut self, temperature: f32) -> Result<(), SettingsError> {
        let (min, max) = TEMPERATURE_RANGE;
        SettingsError::check("temperature", temperature, min, max)?;
        self.temperature = temperature;
        Ok(())
    }

    pub fn set_max_tokens(&mut self, max_tokens: u32) -> Result<(), SettingsError> {
        let (min, max) = MAX_TOKENS_RANGE;
        SettingsError::check("max_tokens", max_tokens, min, max)?;
        self.max_tokens = max_tokens;
        Ok(())
    }
}

/// Image payload attached to a chat request
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// MIME type, e.g. `image/png`
    pub media_type: String,
    /// Base64-encoded image bytes
    pub data: String,
}

impl ImageInput {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Single-turn request sent to a provider client
#[derive(Debug, Clone)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub sampling: SamplingConfig,
    pub image: Option<&'a ImageInput>,
}
