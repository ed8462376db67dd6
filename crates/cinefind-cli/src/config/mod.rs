//! Application configuration module.
//!
//! Reads the TOML config file holding the OMDb connection settings.

#[allow(clippy::module_inception)]
mod config;

#[allow(clippy::module_name_repetitions)]
pub use config::{API_KEY_ENV, AppConfig};
