//! Voice collaborators: capture and speech synthesis
//!
//! Only the interfaces and placeholder backends live here. Real audio I/O is
//! plugged in by implementing [`VoiceCapture`] / [`SpeechSynthesizer`].

use serde::Serialize;
use thiserror::Error;

use crate::core::errors::SettingsError;

pub const VOICE_RANGE: (f32, f32) = (0.5, 2.0);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VoiceError {
    #[error("Recording already in progress")]
    AlreadyRecording,

    #[error("Not recording")]
    NotRecording,

    #[error("Voice backend error: {0}")]
    Backend(String),
}

pub type VoiceResult<T> = Result<T, VoiceError>;

/// Encoded audio returned by capture or synthesis
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `audio/wav`
    pub format: String,
}

impl AudioClip {
    pub fn empty(format: impl Into<String>) -> Self {
        Self {
            bytes: Vec::new(),
            format: format.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Speech speed and pitch sliders, each in `[0.5, 2.0]`
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct VoiceSettings {
    speed: f32,
    pitch: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            pitch: 1.0,
        }
    }
}

impl VoiceSettings {
    pub fn new(speed: f32, pitch: f32) -> Result<Self, SettingsError> {
        let mut settings = Self::default();
        settings.set_speed(speed)?;
        settings.set_pitch(pitch)?;
        Ok(settings)
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn set_speed(&mut self, speed: f32) -> Result<(), SettingsError> {
        let (min, max) = VOICE_RANGE;
        SettingsError::check("speed", speed, min, max)?;
        self.speed = speed;
        Ok(())
    }

    pub fn set_pitch(&mut self, pitch: f32) -> Result<(), SettingsError> {
        let (min, max) = VOICE_RANGE;
        SettingsError::check("pitch", pitch, min, max)?;
        self.pitch = pitch;
        Ok(())
    }
}

/// Microphone capture backend
pub trait VoiceCapture: Send + Sync {
    fn start_capture(&mut self) -> VoiceResult<()>;

    /// Stop recording and return what was captured
    fn stop_capture(&mut self) -> VoiceResult<AudioClip>;

    fn is_recording(&self) -> bool;
}

/// Text-to-speech backend
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize(&self, text: &str, settings: &VoiceSettings) -> VoiceResult<AudioClip>;
}

/// Placeholder capture: tracks recording state, captures nothing
#[derive(Debug, Default)]
pub struct PlaceholderCapture {
    recording: bool,
}

impl VoiceCapture for PlaceholderCapture {
    fn start_capture(&mut self) -> VoiceResult<()> {
        if self.recording {
            return Err(VoiceError::AlreadyRecording);
        }
        self.recording = true;
        tracing::debug!("Recording started");
        Ok(())
    }

    fn stop_capture(&mut self) -> VoiceResult<AudioClip> {
        if !self.recording {
            return Err(VoiceError::NotRecording);
        }
        self.recording = false;
        tracing::debug!("Recording stopped");
        Ok(AudioClip::empty("audio/wav"))
    }

    fn is_recording(&self) -> bool {
        self.recording
    }
}

/// Placeholder TTS: returns empty audio so nothing plays
#[derive(Debug, Default)]
pub struct PlaceholderTts;

impl SpeechSynthesizer for PlaceholderTts {
    fn synthesize(&self, _text: &str, _settings: &VoiceSettings) -> VoiceResult<AudioClip> {
        Ok(AudioClip::empty("audio/mpeg"))
    }
}
