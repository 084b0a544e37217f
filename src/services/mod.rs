//! Service layer for studio
//!
//! Wires the configured collaborators (catalog, response source, vision
//! analyzer, speech synthesizer) into one bundle shared by the CLI and the
//! HTTP server.

use std::sync::Arc;

use anyhow::Result;

use crate::config::{Config, SourceKind};
use crate::core::{ChatController, ProviderCatalog, SessionDefaults, SessionState};
use crate::llm::{LiveSource, ResponseSource, SimulatedSource};
use crate::vision::{LiveVision, SimulatedVision, VisionAnalyzer};
use crate::voice::{PlaceholderTts, SpeechSynthesizer};

#[derive(Clone)]
pub struct StudioService {
    pub catalog: Arc<ProviderCatalog>,
    pub controller: ChatController,
    pub vision: Arc<dyn VisionAnalyzer>,
    pub tts: Arc<dyn SpeechSynthesizer>,
    pub defaults: SessionDefaults,
}

impl StudioService {
    /// Build every collaborator from a validated config
    pub fn from_config(config: &Config) -> Result<Self> {
        let catalog = Arc::new(config.catalog()?);
        let defaults = SessionDefaults {
            provider: config.default_provider()?,
            sampling: config.sampling()?,
            voice: config.voice_settings()?,
        };

        let source: Arc<dyn ResponseSource>;
        let vision: Arc<dyn VisionAnalyzer>;
        match config.studio.source {
            SourceKind::Simulated => {
                tracing::info!("Using simulated response source");
                source = Arc::new(SimulatedSource::from_config(&config.simulation));
                vision = Arc::new(SimulatedVision);
            }
            SourceKind::Live => {
                tracing::info!("Using live provider APIs");
                let live = Arc::new(LiveSource::from_endpoints(&config.endpoints));
                source = live.clone();
                vision = Arc::new(LiveVision::new(live, config.request_timeout()));
            }
        }

        let controller = ChatController::new(source).with_timeout(config.request_timeout());
        for provider in catalog.providers() {
            if !controller.is_available(provider) {
                tracing::warn!("{} is unavailable; its requests will fail", provider.display_name());
            }
        }
        Ok(Self {
            catalog,
            controller,
            vision,
            tts: Arc::new(PlaceholderTts),
            defaults,
        })
    }

    /// Assemble from explicit parts
    pub fn new(
        catalog: Arc<ProviderCatalog>,
        controller: ChatController,
        vision: Arc<dyn VisionAnalyzer>,
        defaults: SessionDefaults,
    ) -> Self {
        Self {
            catalog,
            controller,
            vision,
            tts: Arc::new(PlaceholderTts),
            defaults,
        }
    }

    pub fn new_session(&self) -> SessionState {
        SessionState::new(&self.catalog, &self.defaults)
    }
}
