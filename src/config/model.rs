// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::types::Language;

/// Configuration as read from a TOML file.
///
/// ```toml
/// [harness]
/// poll_interval_ms = 100
/// max_polls = 150
/// min_survival_ms = 2000
///
/// [server]
/// host = "localhost"
/// port = 12000
///
/// [target]
/// name = "PingClient"
///
/// [language.java]
/// build = "javac {name}.java"
/// run = "java {name} {host} {port}"
/// ```
///
/// All sections are optional and have defaults matching the lab setup.
/// A language table given in the file replaces that language's defaults
/// as a whole.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMarkerConfig {
    #[serde(default)]
    pub harness: HarnessSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub target: TargetSection,

    #[serde(default)]
    pub language: LanguageSection,
}

/// `[harness]` section: polling and timing of a single classification.
#[derive(Debug, Clone, Deserialize)]
pub struct HarnessSection {
    /// Timeout of every poll of the child's output.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// The child is killed once the poll counter exceeds this value.
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,

    /// Exits earlier than this count as unexpected termination.
    #[serde(default = "default_min_survival_ms")]
    pub min_survival_ms: u64,

    /// Upper bound for collecting buffered output after the child exited.
    #[serde(default = "default_drain_grace_ms")]
    pub drain_grace_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_max_polls() -> u32 {
    150
}

fn default_min_survival_ms() -> u64 {
    2000
}

fn default_drain_grace_ms() -> u64 {
    200
}

impl Default for HarnessSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_polls: default_max_polls(),
            min_survival_ms: default_min_survival_ms(),
            drain_grace_ms: default_drain_grace_ms(),
        }
    }
}

/// `[server]` section: where the reference server listens.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSection {
    /// Replace the endpoint with whatever was given on the command line.
    pub fn apply_overrides(&mut self, host: Option<&str>, port: Option<u16>) {
        if let Some(host) = host {
            self.host = host.to_string();
        }
        if let Some(port) = port {
            self.port = port;
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    12000
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// `[target]` section: base name of the file every submission must contain.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetSection {
    #[serde(default = "default_target_name")]
    pub name: String,
}

fn default_target_name() -> String {
    "PingClient".to_string()
}

impl Default for TargetSection {
    fn default() -> Self {
        Self {
            name: default_target_name(),
        }
    }
}

/// Commands for one language.
///
/// Templates may use `{name}`, `{host}` and `{port}`. A language without a
/// `run` command is never executed; its submissions are flagged for manual
/// review instead.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LanguageCommands {
    /// Unchecked build step, run in the submission directory before `run`.
    #[serde(default)]
    pub build: Option<String>,

    #[serde(default)]
    pub run: Option<String>,
}

/// `[language.<lang>]` tables.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageSection {
    #[serde(default = "default_python")]
    pub python: LanguageCommands,

    #[serde(default = "default_java")]
    pub java: LanguageCommands,

    #[serde(default)]
    pub c: LanguageCommands,
}

fn default_python() -> LanguageCommands {
    LanguageCommands {
        build: None,
        run: Some("python {name}.py {host} {port}".to_string()),
    }
}

fn default_java() -> LanguageCommands {
    LanguageCommands {
        build: Some("javac {name}.java".to_string()),
        run: Some("java {name} {host} {port}".to_string()),
    }
}

impl Default for LanguageSection {
    fn default() -> Self {
        Self {
            python: default_python(),
            java: default_java(),
            c: LanguageCommands::default(),
        }
    }
}

impl LanguageSection {
    pub fn commands(&self, language: Language) -> &LanguageCommands {
        match language {
            Language::Python => &self.python,
            Language::Java => &self.java,
            Language::C => &self.c,
        }
    }
}

/// Timing parameters of one classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessSettings {
    pub poll_interval: Duration,
    pub max_polls: u32,
    pub min_survival: Duration,
    pub drain_grace: Duration,
}

impl From<&HarnessSection> for HarnessSettings {
    fn from(section: &HarnessSection) -> Self {
        Self {
            poll_interval: Duration::from_millis(section.poll_interval_ms),
            max_polls: section.max_polls,
            min_survival: Duration::from_millis(section.min_survival_ms),
            drain_grace: Duration::from_millis(section.drain_grace_ms),
        }
    }
}

/// Address of the reference server the client is pointed at.
///
/// Passed explicitly into every classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    pub host: String,
    pub port: u16,
}

impl Default for ServerEndpoint {
    fn default() -> Self {
        let section = ServerSection::default();
        Self {
            host: section.host,
            port: section.port,
        }
    }
}

/// Validated configuration.
///
/// Can only be built from a [`RawMarkerConfig`] through `TryFrom`, which
/// runs the checks in [`validate`](crate::config::validate).
#[derive(Debug, Clone)]
pub struct MarkerConfig {
    pub harness: HarnessSettings,
    pub server: ServerEndpoint,
    pub target_name: String,
    pub languages: LanguageSection,
}

impl MarkerConfig {
    pub(crate) fn new_unchecked(raw: RawMarkerConfig) -> Self {
        Self {
            harness: HarnessSettings::from(&raw.harness),
            server: ServerEndpoint {
                host: raw.server.host,
                port: raw.server.port,
            },
            target_name: raw.target.name,
            languages: raw.language,
        }
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        MarkerConfig::new_unchecked(RawMarkerConfig::default())
    }
}
