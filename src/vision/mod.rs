//! Vision analysis: upload validation and the analyzer collaborator

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::Serialize;
use thiserror::Error;

use crate::core::{Feature, Selection};
use crate::llm::{ImageInput, LiveSource, ProviderError, SamplingConfig};

/// Question used when the user leaves the prompt blank
pub const DEFAULT_QUESTION: &str = "Describe what you see in this image.";

/// Output budget for a single image analysis
const VISION_MAX_TOKENS: u32 = 1000;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VisionError {
    #[error("Image is empty")]
    EmptyImage,

    #[error("Unsupported image format: {0}. Accepted: JPEG, PNG, GIF")]
    UnsupportedFormat(String),

    #[error("{0} does not support image analysis")]
    Unsupported(String),

    #[error("Vision request failed: {0}")]
    Provider(#[from] ProviderError),
}

/// Accepted upload encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
}

impl ImageKind {
    pub const ACCEPTED: [ImageKind; 3] = [ImageKind::Jpeg, ImageKind::Png, ImageKind::Gif];

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Gif => "image/gif",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "JPEG",
            ImageKind::Png => "PNG",
            ImageKind::Gif => "GIF",
        }
    }
}

/// A validated image upload
#[derive(Debug, Clone)]
pub struct ImageUpload {
    name: String,
    kind: ImageKind,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Validate raw bytes, sniffing the format from the file signature
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, VisionError> {
        if bytes.is_empty() {
            return Err(VisionError::EmptyImage);
        }
        let format = image::guess_format(&bytes)
            .map_err(|_| VisionError::UnsupportedFormat("unrecognized data".to_string()))?;
        let kind = match format {
            image::ImageFormat::Jpeg => ImageKind::Jpeg,
            image::ImageFormat::Png => ImageKind::Png,
            image::ImageFormat::Gif => ImageKind::Gif,
            other => return Err(VisionError::UnsupportedFormat(format!("{:?}", other))),
        };
        Ok(Self {
            name: name.into(),
            kind,
            bytes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn to_input(&self) -> ImageInput {
        ImageInput {
            media_type: self.kind.mime_type().to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(&self.bytes),
        }
    }
}

/// Resolve a blank question to the default prompt
pub fn question_or_default(question: &str) -> &str {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        DEFAULT_QUESTION
    } else {
        trimmed
    }
}

/// Image analysis collaborator
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        image: &ImageUpload,
        question: &str,
        selection: &Selection,
    ) -> Result<String, VisionError>;
}

/// Fixed-reply analyzer used with the simulated source
#[derive(Debug, Default)]
pub struct SimulatedVision;

#[async_trait]
impl VisionAnalyzer for SimulatedVision {
    async fn analyze(
        &self,
        image: &ImageUpload,
        question: &str,
        selection: &Selection,
    ) -> Result<String, VisionError> {
        ensure_supported(selection)?;
        Ok(format!(
            "Image analysis complete! {} ({}, {} bytes) was checked by {} {} for: \"{}\". \
             Analysis result would appear here.",
            image.name(),
            image.kind().label(),
            image.size(),
            selection.provider().display_name(),
            selection.model(),
            question_or_default(question)
        ))
    }
}

/// Analyzer that sends the image to the selected provider's API
pub struct LiveVision {
    source: Arc<LiveSource>,
    timeout: Duration,
}

impl LiveVision {
    /// Each analysis is bounded by `timeout`, like a chat request
    pub fn new(source: Arc<LiveSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }
}

#[async_trait]
impl VisionAnalyzer for LiveVision {
    async fn analyze(
        &self,
        image: &ImageUpload,
        question: &str,
        selection: &Selection,
    ) -> Result<String, VisionError> {
        ensure_supported(selection)?;
        let sampling = SamplingConfig::new(0.7, VISION_MAX_TOKENS)
            .map_err(|e| VisionError::Provider(ProviderError::Other(e.to_string())))?;
        let input = image.to_input();
        let call = self.source.complete_with_image(
            question_or_default(question),
            selection,
            &sampling,
            &input,
        );
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                tracing::warn!(
                    provider = selection.provider().id(),
                    "Image analysis timed out after {:?}",
                    self.timeout
                );
                Err(ProviderError::Timeout(self.timeout.as_secs()).into())
            }
        }
    }
}

fn ensure_supported(selection: &Selection) -> Result<(), VisionError> {
    if selection.provider().supports(Feature::Image) {
        Ok(())
    } else {
        Err(VisionError::Unsupported(
            selection.provider().display_name().to_string(),
        ))
    }
}
