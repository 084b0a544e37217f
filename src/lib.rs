//! studio: multi-provider AI chat studio
//!
//! This library provides:
//! - A provider/model catalog and a per-session selection that always stays valid
//! - A chat controller over a pluggable response source (simulated or live APIs)
//! - Comparison mode fanning one prompt out to every provider
//! - Voice and vision collaborators
//! - A pure panel renderer, an interactive CLI and a JSON HTTP API

pub mod config;
pub mod core;
pub mod dashboard;
pub mod llm;
pub mod services;
pub mod transport;
pub mod vision;
pub mod voice;

pub use config::Config;
pub use services::StudioService;

/// Package version plus the build's dev suffix
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), env!("STUDIO_VERSION_SUFFIX"));
