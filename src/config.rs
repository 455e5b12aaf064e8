use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::pad::PadId;

/// Sample file per pad. Missing entries leave that pad silent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PadSounds {
    pub right_hand: Option<PathBuf>,
    pub left_hand: Option<PathBuf>,
    pub right_foot: Option<PathBuf>,
}

impl PadSounds {
    pub fn path_for(&self, pad: PadId) -> Option<&Path> {
        match pad {
            PadId::RightHand => self.right_hand.as_deref(),
            PadId::LeftHand => self.left_hand.as_deref(),
            PadId::RightFoot => self.right_foot.as_deref(),
        }
    }
}

impl Default for PadSounds {
    fn default() -> Self {
        Self {
            right_hand: Some(PathBuf::from("snare.wav")),
            left_hand: Some(PathBuf::from("hihat.wav")),
            right_foot: Some(PathBuf::from("kick.wav")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub history_capacity: usize,
    pub poll_interval_ms: u64,
    pub flash_ms: u64,
    pub sounds: PadSounds,
    pub default_sheet: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            poll_interval_ms: 10,
            flash_ms: 200,
            sounds: PadSounds::default(),
            default_sheet: None,
        }
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
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = crate::app_dirs::AppDirs::config_path()
            .unwrap_or_else(|| PathBuf::from("drumsheet_config.json"));
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
            Err(_) => return Config::default(),
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("ignoring unreadable config {}: {e}", self.path.display());
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

/// Platform config location, if one can be determined.
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "drumsheet")
}
