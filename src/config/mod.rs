//! Configuration management for studio

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::ProviderCatalog;
use crate::llm::SamplingConfig;
use crate::voice::VoiceSettings;

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV: &str = "STUDIO_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub studio: StudioConfig,
    pub sampling: SamplingDefaults,
    pub voice: VoiceDefaults,
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub endpoints: EndpointsConfig,
    pub simulation: SimulationConfig,
}

/// Where assistant replies come from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Constant-template replies, no network
    #[default]
    Simulated,
    /// Real provider APIs, keys read from the environment
    Live,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub default_provider: String,
    pub source: SourceKind,
    /// Upper bound for a single generate call
    pub request_timeout_secs: u64,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            default_provider: "openai".to_string(),
            source: SourceKind::Simulated,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingDefaults {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SamplingDefaults {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceDefaults {
    pub speed: f32,
    pub pitch: f32,
}

impl Default for VoiceDefaults {
    fn default() -> Self {
        Self {
            speed: 1.0,
            pitch: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

/// Model list overrides keyed by provider name or id
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CatalogConfig {
    pub models: HashMap<String, Vec<String>>,
}

/// API base URLs for the live source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub openai: String,
    pub anthropic: String,
    pub xai: String,
    pub deepseek: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            openai: "https://api.openai.com/v1".to_string(),
            anthropic: "https://api.anthropic.com/v1".to_string(),
            xai: "https://api.x.ai/v1".to_string(),
            deepseek: "https://api.deepseek.com".to_string(),
        }
    }
}

/// Knobs for the simulated source
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimulationConfig {
    pub latency_ms: u64,
    /// Providers whose simulated calls always fail
    pub fail_providers: Vec<String>,
}

impl Config {
    /// Load configuration from `STUDIO_CONFIG` or the default location, or use defaults
    pub fn load() -> Result<Self> {
        let config_path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => Self::config_path()?,
        };
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "studio") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            Ok(PathBuf::from("config.toml"))
        }
    }

    /// Check every section that has a domain invariant
    pub fn validate(&self) -> Result<()> {
        self.catalog()?;
        self.sampling()?;
        self.voice_settings()?;
        self.default_provider()?;
        Ok(())
    }

    pub fn catalog(&self) -> Result<ProviderCatalog> {
        ProviderCatalog::from_overrides(&self.catalog.models).context("Invalid [catalog] section")
    }

    pub fn sampling(&self) -> Result<SamplingConfig> {
        SamplingConfig::new(self.sampling.temperature, self.sampling.max_tokens)
            .context("Invalid [sampling] section")
    }

    pub fn voice_settings(&self) -> Result<VoiceSettings> {
        VoiceSettings::new(self.voice.speed, self.voice.pitch).context("Invalid [voice] section")
    }

    pub fn default_provider(&self) -> Result<crate::core::Provider> {
        self.studio
            .default_provider
            .parse()
            .context("Invalid studio.default_provider")
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.studio.request_timeout_secs)
    }
}
