// src/config/validate.rs

use crate::config::model::{MarkerConfig, RawMarkerConfig};
use crate::config::template::unknown_placeholders;
use crate::errors::{MarkerError, Result};
use crate::types::Language;

impl TryFrom<RawMarkerConfig> for MarkerConfig {
    type Error = MarkerError;

    fn try_from(raw: RawMarkerConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(MarkerConfig::new_unchecked(raw))
    }
}

/// Run every check on an already deserialized config.
pub fn validate_raw_config(cfg: &RawMarkerConfig) -> Result<()> {
    validate_harness(cfg)?;
    validate_server(cfg)?;
    validate_target(cfg)?;
    validate_languages(cfg)?;
    Ok(())
}

fn validate_harness(cfg: &RawMarkerConfig) -> Result<()> {
    if cfg.harness.poll_interval_ms == 0 {
        return Err(MarkerError::ConfigError(
            "[harness].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.harness.max_polls == 0 {
        return Err(MarkerError::ConfigError(
            "[harness].max_polls must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_server(cfg: &RawMarkerConfig) -> Result<()> {
    if cfg.server.host.trim().is_empty() {
        return Err(MarkerError::ConfigError(
            "[server].host must not be empty".to_string(),
        ));
    }
    // The host is pasted into a shell command line.
    if let Some(bad) = cfg.server.host.chars().find(|c| !is_host_char(*c)) {
        return Err(MarkerError::ConfigError(format!(
            "[server].host may only contain letters, digits and '.-_:[]' (got {bad:?} in '{}')",
            cfg.server.host
        )));
    }
    if cfg.server.port == 0 {
        return Err(MarkerError::ConfigError(
            "[server].port must be between 1 and 65535 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn is_host_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | '[' | ']')
}

fn validate_target(cfg: &RawMarkerConfig) -> Result<()> {
    let name = cfg.target.name.trim();
    if name.is_empty() {
        return Err(MarkerError::ConfigError(
            "[target].name must not be empty".to_string(),
        ));
    }
    if name.contains('/') || name.contains('.') {
        return Err(MarkerError::ConfigError(format!(
            "[target].name must be a bare file name without extension (got '{}')",
            cfg.target.name
        )));
    }
    Ok(())
}

fn validate_languages(cfg: &RawMarkerConfig) -> Result<()> {
    for language in Language::ALL {
        let commands = cfg.language.commands(language);
        let key = section_key(language);

        for (field, template) in [("build", &commands.build), ("run", &commands.run)] {
            let Some(template) = template else { continue };

            if template.trim().is_empty() {
                return Err(MarkerError::ConfigError(format!(
                    "[language.{key}].{field} must not be empty; omit it instead"
                )));
            }

            let unknown = unknown_placeholders(template);
            if !unknown.is_empty() {
                return Err(MarkerError::ConfigError(format!(
                    "[language.{key}].{field} uses unknown placeholder(s) {:?}; expected {{name}}, {{host}} or {{port}}",
                    unknown
                )));
            }
        }

        if commands.build.is_some() && commands.run.is_none() {
            return Err(MarkerError::ConfigError(format!(
                "[language.{key}] has a build command but no run command"
            )));
        }
    }
    Ok(())
}

/// Name of the `[language.<key>]` table for `language`.
fn section_key(language: Language) -> &'static str {
    match language {
        Language::Python => "python",
        Language::Java => "java",
        Language::C => "c",
    }
}
