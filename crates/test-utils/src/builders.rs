#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use labmark::config::{LanguageCommands, MarkerConfig, RawMarkerConfig};
use labmark::types::Language;

/// Builder for `MarkerConfig` to simplify test setup.
pub struct MarkerConfigBuilder {
    config: RawMarkerConfig,
}

impl MarkerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawMarkerConfig::default(),
        }
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.harness.poll_interval_ms = ms;
        self
    }

    pub fn max_polls(mut self, polls: u32) -> Self {
        self.config.harness.max_polls = polls;
        self
    }

    pub fn min_survival_ms(mut self, ms: u64) -> Self {
        self.config.harness.min_survival_ms = ms;
        self
    }

    pub fn drain_grace_ms(mut self, ms: u64) -> Self {
        self.config.harness.drain_grace_ms = ms;
        self
    }

    pub fn server(mut self, host: &str, port: u16) -> Self {
        self.config.server.host = host.to_string();
        self.config.server.port = port;
        self
    }

    pub fn target(mut self, name: &str) -> Self {
        self.config.target.name = name.to_string();
        self
    }

    pub fn language(mut self, language: Language, build: Option<&str>, run: Option<&str>) -> Self {
        let commands = LanguageCommands {
            build: build.map(str::to_string),
            run: run.map(str::to_string),
        };
        match language {
            Language::Python => self.config.language.python = commands,
            Language::Java => self.config.language.java = commands,
            Language::C => self.config.language.c = commands,
        }
        self
    }

    pub fn raw(self) -> RawMarkerConfig {
        self.config
    }

    pub fn build(self) -> MarkerConfig {
        MarkerConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for MarkerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Lays out a class directory (one sub-directory per submission) on disk.
pub struct ClassDirBuilder {
    root: PathBuf,
}

impl ClassDirBuilder {
    /// `root` must exist (typically a `tempfile::TempDir`).
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Create `<root>/<relative>` with `contents`, creating parents.
    pub fn file(self, relative: &str, contents: &str) -> Self {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write fixture file");
        self
    }

    /// Create an empty directory `<root>/<relative>`.
    pub fn dir(self, relative: &str) -> Self {
        fs::create_dir_all(self.root.join(relative)).expect("create fixture dir");
        self
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}
