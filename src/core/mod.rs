//! Core domain: catalog, selection, transcript, chat, comparison and sessions
//!
//! Nothing here does I/O directly; replies come through the injected
//! [`crate::llm::ResponseSource`].

pub mod catalog;
pub mod chat;
pub mod comparison;
pub mod errors;
pub mod session;
pub mod types;

pub use catalog::{Feature, Provider, ProviderCatalog, ProviderInfo};
pub use chat::{error_notice_text, CancelToken, ChatController, SubmitOutcome, DEFAULT_TIMEOUT};
pub use comparison::{comparison_selections, ComparisonEntry, ComparisonReport};
pub use errors::{CatalogError, SessionError, SettingsError};
pub use session::{
    SessionDefaults, SessionState, SessionStore, SharedSession, UploadMeta, VisionOutcome,
    VisionPanel,
};
pub use types::{Message, Role, Selection, Toggle, Transcript, UiToggles};
