use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::accuracy::AccuracyPolicy;
use crate::error::ConfigurationError;
use crate::session::TypingSession;

pub const DEFAULT_WORDS: [&str; 5] = ["hello", "world", "typing", "test", "practice"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub words: Vec<String>,
    pub accuracy_policy: AccuracyPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
            accuracy_policy: AccuracyPolicy::default(),
        }
    }
}

impl Config {
    pub fn build_session(&self) -> Result<TypingSession, ConfigurationError> {
        TypingSession::new(self.words.iter().cloned(), self.accuracy_policy)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
}

/// Read-only JSON config; a missing or broken file yields the defaults
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "wordtap") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("wordtap_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "no config file, using defaults");
                return Config::default();
            }
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => {
                tracing::debug!(path = %self.path.display(), words = cfg.words.len(), "config loaded");
                cfg
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "malformed config, using defaults");
                Config::default()
            }
        }
    }
}
