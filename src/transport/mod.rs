//! Transport layer: interactive CLI and HTTP API

pub mod cli;
pub mod http;
