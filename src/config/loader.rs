// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

use crate::config::model::{MarkerConfig, RawMarkerConfig};
use crate::errors::Result;

/// Read and deserialize a config file without semantic validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawMarkerConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let config: RawMarkerConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a config file and validate it.
///
/// This is the recommended entry point for the rest of the application.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<MarkerConfig> {
    let raw = load_from_path(&path)?;
    MarkerConfig::try_from(raw)
}

/// Resolve the config to use for a run.
///
/// - An explicit path must exist and be valid.
/// - Without one, [`default_config_path`] is used if present.
/// - Otherwise the built-in defaults apply.
pub fn load_or_default(explicit: Option<&Path>) -> Result<MarkerConfig> {
    MarkerConfig::try_from(load_raw_or_default(explicit)?)
}

/// Same resolution as [`load_or_default`], stopping before validation so
/// command-line overrides can be applied first.
pub fn load_raw_or_default(explicit: Option<&Path>) -> Result<RawMarkerConfig> {
    if let Some(path) = explicit {
        info!(path = ?path, "loading config");
        return load_from_path(path);
    }

    let default_path = default_config_path();
    if default_path.is_file() {
        info!(path = ?default_path, "loading config");
        return load_from_path(&default_path);
    }

    debug!("no config file found; using built-in defaults");
    Ok(RawMarkerConfig::default())
}

/// `labmark.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("labmark.toml")
}
