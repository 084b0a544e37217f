//! Per-session state and the in-memory session store

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::catalog::{Provider, ProviderCatalog};
use super::comparison::ComparisonReport;
use super::errors::{CatalogError, SessionError};
use super::types::{Selection, Toggle, Transcript, UiToggles};
use crate::llm::SamplingConfig;
use crate::vision::{ImageKind, ImageUpload, VisionError};
use crate::voice::{AudioClip, PlaceholderCapture, VoiceCapture, VoiceResult, VoiceSettings};

/// Starting values for a new session
#[derive(Debug, Clone)]
pub struct SessionDefaults {
    pub provider: Provider,
    pub sampling: SamplingConfig,
    pub voice: VoiceSettings,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            provider: Provider::OpenAi,
            sampling: SamplingConfig::default(),
            voice: VoiceSettings::default(),
        }
    }
}

/// Metadata of the last uploaded image
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UploadMeta {
    pub name: String,
    pub format: ImageKind,
    pub size_bytes: usize,
}

/// Last analysis shown in the vision panel
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum VisionOutcome {
    Analysis(String),
    Error(String),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VisionPanel {
    pub last_upload: Option<UploadMeta>,
    pub question: String,
    pub last_result: Option<VisionOutcome>,
}

/// Everything one user session owns
///
/// Sessions share nothing mutable; every operation takes the session it acts on.
pub struct SessionState {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub transcript: Transcript,
    pub selection: Selection,
    pub toggles: UiToggles,
    pub sampling: SamplingConfig,
    pub voice: VoiceSettings,
    pub vision: VisionPanel,
    pub last_comparison: Option<ComparisonReport>,
    capture: Box<dyn VoiceCapture>,
}

impl SessionState {
    pub fn new(catalog: &ProviderCatalog, defaults: &SessionDefaults) -> Self {
        Self::with_capture(catalog, defaults, Box::new(PlaceholderCapture::default()))
    }

    pub fn with_capture(
        catalog: &ProviderCatalog,
        defaults: &SessionDefaults,
        capture: Box<dyn VoiceCapture>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            transcript: Transcript::new(),
            selection: Selection::new(catalog, defaults.provider),
            toggles: UiToggles::default(),
            sampling: defaults.sampling,
            voice: defaults.voice,
            vision: VisionPanel::default(),
            last_comparison: None,
            capture,
        }
    }

    pub fn set_provider(&mut self, catalog: &ProviderCatalog, provider: Provider) {
        self.selection.set_provider(catalog, provider);
        tracing::debug!(session = %self.id, provider = provider.id(), "Provider changed");
    }

    pub fn set_model(&mut self, catalog: &ProviderCatalog, model: &str) -> Result<(), CatalogError> {
        self.selection.set_model(catalog, model)?;
        tracing::debug!(session = %self.id, model, "Model changed");
        Ok(())
    }

    /// Flip a sidebar toggle, returning the new value
    pub fn toggle(&mut self, toggle: Toggle) -> bool {
        self.toggles.flip(toggle)
    }

    pub fn is_recording(&self) -> bool {
        self.capture.is_recording()
    }

    pub fn start_recording(&mut self) -> VoiceResult<()> {
        let result = self.capture.start_capture();
        self.toggles.recording = self.capture.is_recording();
        result
    }

    pub fn stop_recording(&mut self) -> VoiceResult<AudioClip> {
        let result = self.capture.stop_capture();
        self.toggles.recording = self.capture.is_recording();
        result
    }

    /// Store an analysis result (or its failure) in the vision panel
    pub fn record_vision(
        &mut self,
        image: &ImageUpload,
        question: &str,
        result: Result<String, VisionError>,
    ) {
        self.vision.last_upload = Some(UploadMeta {
            name: image.name().to_string(),
            format: image.kind(),
            size_bytes: image.size(),
        });
        self.vision.question = question.to_string();
        self.vision.last_result = Some(match result {
            Ok(text) => VisionOutcome::Analysis(text),
            Err(e) => VisionOutcome::Error(e.to_string()),
        });
    }

    /// Store an upload rejected before analysis
    pub fn record_vision_error(&mut self, question: &str, error: &VisionError) {
        self.vision.question = question.to_string();
        self.vision.last_result = Some(VisionOutcome::Error(error.to_string()));
    }
}

pub type SharedSession = Arc<Mutex<SessionState>>;

/// Live sessions keyed by id
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<Uuid, SharedSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, state: SessionState) -> Uuid {
        let id = state.id;
        self.sessions.insert(id, Arc::new(Mutex::new(state)));
        tracing::info!(session = %id, "Session created");
        id
    }

    pub fn get(&self, id: &str) -> Result<SharedSession, SessionError> {
        let uuid = parse_id(id)?;
        self.sessions
            .get(&uuid)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    pub fn remove(&self, id: &str) -> Result<(), SessionError> {
        let uuid = parse_id(id)?;
        match self.sessions.remove(&uuid) {
            Some(_) => {
                tracing::info!(session = %uuid, "Session removed");
                Ok(())
            }
            None => Err(SessionError::NotFound(id.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn parse_id(id: &str) -> Result<Uuid, SessionError> {
    Uuid::parse_str(id).map_err(|_| SessionError::NotFound(id.to_string()))
}
