//! # Configuration
//!
//! Nametag configuration is managed by [`confique`], layered from environment
//! variables, a TOML file, and compiled defaults.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `NAMETAG_DATA_DIR`, `NAMETAG_LOG_FILE`,
//!    `NAMETAG_RECURSIVE`.
//! 2. **Config file**: `nametag.toml` in the OS config directory (via the
//!    `directories` crate), or the file passed to [`NametagConfig::load`].
//! 3. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | OS data dir | Where `images.json` and `tags.json` live |
//! | `log_file` | `<data_dir>/nameLog.txt` | Rename audit log |
//! | `extensions` | `gif png bmp JPG jpeg jpg` | File extensions treated as images |
//! | `recursive` | `false` | Descend into subdirectories when listing |

use crate::error::{NametagError, Result};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "nametag.toml";
pub const LOG_FILE_NAME: &str = "nameLog.txt";

fn default_extensions() -> Vec<String> {
    ["gif", "png", "bmp", "JPG", "jpeg", "jpg"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "nametag", "nametag")
}

/// Configuration for nametag, stored in `nametag.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NametagConfig {
    /// Directory holding the image and tag stores.
    #[config(env = "NAMETAG_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Rename audit log. Defaults to `nameLog.txt` inside `data_dir`.
    #[config(env = "NAMETAG_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Extensions (without the dot) that count as images. Case-sensitive.
    #[config(default = ["gif", "png", "bmp", "JPG", "jpeg", "jpg"])]
    pub extensions: Vec<String>,

    /// Whether directory listings descend into subdirectories.
    #[config(env = "NAMETAG_RECURSIVE", default = false)]
    pub recursive: bool,
}

impl Default for NametagConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_file: None,
            extensions: default_extensions(),
            recursive: false,
        }
    }
}

impl NametagConfig {
    /// Loads the layered configuration. A missing config file is fine.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        let file = config_file
            .map(Path::to_path_buf)
            .or_else(Self::default_config_file);
        if let Some(file) = file {
            log::debug!("config file: {}", file.display());
            builder = builder.file(file);
        }
        builder
            .load()
            .map_err(|e| NametagError::Config(e.to_string()))
    }

    pub fn default_config_file() -> Option<PathBuf> {
        project_dirs().map(|d| d.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => project_dirs()
                .map(|d| d.data_dir().to_path_buf())
                .ok_or_else(|| {
                    NametagError::Config("could not determine a data directory".to_string())
                }),
        }
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        match &self.log_file {
            Some(path) => Ok(path.clone()),
            None => Ok(self.data_dir()?.join(LOG_FILE_NAME)),
        }
    }

    /// Whether `path` has one of the configured image extensions.
    pub fn is_image(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.trim_start_matches('.') == ext))
    }

    /// Renders the effective configuration as TOML-ish `key = value` lines.
    pub fn describe(&self) -> Vec<(String, String)> {
        let data_dir = self
            .data_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|e| e.to_string());
        let log_file = self
            .log_file()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|e| e.to_string());
        vec![
            ("data_dir".to_string(), data_dir),
            ("log_file".to_string(), log_file),
            ("extensions".to_string(), self.extensions.join(" ")),
            ("recursive".to_string(), self.recursive.to_string()),
        ]
    }
}
