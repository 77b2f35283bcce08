// src/config/mod.rs

//! Configuration loading and validation for labmark.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate launch templates and timing values (`validate.rs`).
//! - Render launch command templates (`template.rs`).

pub mod loader;
pub mod model;
pub mod template;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default, load_raw_or_default};
pub use model::{
    HarnessSettings, LanguageCommands, LanguageSection, MarkerConfig, RawMarkerConfig,
    ServerEndpoint,
};
pub use validate::validate_raw_config;
