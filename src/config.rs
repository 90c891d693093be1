use crate::app_dirs::AppDirs;
use crate::puzzle::PuzzleKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_SESSION: &str = "default";

/// Settings remembered between runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub puzzle: PuzzleKind,
    pub session: String,
    pub pointer_input: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            puzzle: PuzzleKind::default(),
            session: DEFAULT_SESSION.to_string(),
            pointer_input: true,
        }
    }
}

impl Config {
    /// Command-line values win over what was saved
    pub fn with_overrides(
        mut self,
        puzzle: Option<PuzzleKind>,
        session: Option<String>,
        no_mouse: bool,
    ) -> Self {
        if let Some(puzzle) = puzzle {
            self.puzzle = puzzle;
        }
        if let Some(session) = session {
            self.session = session;
        }
        if no_mouse {
            self.pointer_input = false;
        }
        self
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
