//! Session data model: messages, transcript, selection and UI toggles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{Provider, ProviderCatalog};
use super::errors::CatalogError;

/// Role of a chat message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single chat message
///
/// Messages are immutable once appended to a [`Transcript`]. The provider and
/// model are the selection active when the message was submitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Assistant notice describing a failed request
    #[serde(default)]
    pub is_error: bool,
}

impl Message {
    pub fn user(content: impl Into<String>, selection: &Selection) -> Self {
        Self::tagged(Role::User, content, selection, false)
    }

    pub fn assistant(content: impl Into<String>, selection: &Selection) -> Self {
        Self::tagged(Role::Assistant, content, selection, false)
    }

    pub fn error_notice(content: impl Into<String>, selection: &Selection) -> Self {
        Self::tagged(Role::Assistant, content, selection, true)
    }

    fn tagged(role: Role, content: impl Into<String>, selection: &Selection, is_error: bool) -> Self {
        Self {
            role,
            content: content.into(),
            provider: Some(selection.provider().display_name().to_string()),
            model: Some(selection.model().to_string()),
            timestamp: Utc::now(),
            is_error,
        }
    }

    /// "Provider: X | Model: Y" caption, if the message is tagged
    pub fn caption(&self) -> Option<String> {
        match (&self.provider, &self.model) {
            (Some(provider), Some(model)) => {
                Some(format!("Provider: {} | Model: {}", provider, model))
            }
            _ => None,
        }
    }
}

/// Append-only ordered message log for one session
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// Active provider + model pair
///
/// Invariant: `model` is always a member of the catalog's list for `provider`.
/// Fields are private so the invariant can only be changed through
/// [`Selection::set_provider`] and [`Selection::set_model`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Selection {
    provider: Provider,
    model: String,
}

impl Selection {
    /// Select a provider with its default model
    pub fn new(catalog: &ProviderCatalog, provider: Provider) -> Self {
        Self {
            provider,
            model: catalog.default_model(provider).to_string(),
        }
    }

    /// Select a provider and a specific model, validating the pair
    pub fn with_model(
        catalog: &ProviderCatalog,
        provider: Provider,
        model: &str,
    ) -> Result<Self, CatalogError> {
        let mut selection = Self::new(catalog, provider);
        selection.set_model(catalog, model)?;
        Ok(selection)
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Switch provider and reset the model to the provider's default
    pub fn set_provider(&mut self, catalog: &ProviderCatalog, provider: Provider) {
        self.provider = provider;
        self.model = catalog.default_model(provider).to_string();
    }

    /// Switch model within the current provider
    ///
    /// Leaves the selection untouched when the model is not offered.
    pub fn set_model(&mut self, catalog: &ProviderCatalog, model: &str) -> Result<(), CatalogError> {
        if !catalog.contains(self.provider, model) {
            return Err(CatalogError::InvalidModel {
                provider: self.provider.display_name().to_string(),
                model: model.to_string(),
            });
        }
        self.model = model.to_string();
        Ok(())
    }
}

/// Independent feature switches shown in the sidebar
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiToggles {
    pub voice_enabled: bool,
    pub vision_enabled: bool,
    pub multi_provider_enabled: bool,
    pub recording: bool,
}

/// Names of the user-facing toggles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
    Voice,
    Vision,
    MultiProvider,
}

impl UiToggles {
    pub fn get(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::Voice => self.voice_enabled,
            Toggle::Vision => self.vision_enabled,
            Toggle::MultiProvider => self.multi_provider_enabled,
        }
    }

    pub fn set(&mut self, toggle: Toggle, value: bool) {
        match toggle {
            Toggle::Voice => self.voice_enabled = value,
            Toggle::Vision => self.vision_enabled = value,
            Toggle::MultiProvider => self.multi_provider_enabled = value,
        }
    }

    /// Flip a toggle and return its new value
    pub fn flip(&mut self, toggle: Toggle) -> bool {
        let value = !self.get(toggle);
        self.set(toggle, value);
        value
    }
}
