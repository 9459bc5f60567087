//! # Initialization
//!
//! Builds the production [`NametagApi`]: resolves the configuration, picks
//! the data directory, and wires the JSON store and the audit log file into
//! a [`Library`](crate::library::Library).
//!
//! ## Data Directory
//!
//! In priority order:
//! 1. `data_override` (the CLI's `--data-dir`)
//! 2. `data_dir` from the configuration (`NAMETAG_DATA_DIR` or `nametag.toml`)
//! 3. The OS data directory (via the `directories` crate)

use crate::api::NametagApi;
use crate::config::NametagConfig;
use crate::error::Result;
use crate::rename_log::FileRenameLog;
use crate::store::fs::FsStore;
use std::path::{Path, PathBuf};

pub struct NametagContext {
    pub api: NametagApi<FsStore, FileRenameLog>,
    pub config: NametagConfig,
}

pub fn initialize(
    config_file: Option<&Path>,
    data_override: Option<PathBuf>,
) -> Result<NametagContext> {
    let mut config = NametagConfig::load(config_file)?;
    if let Some(dir) = data_override {
        config.data_dir = Some(dir);
    }

    let data_dir = config.data_dir()?;
    let log_file = config.log_file()?;
    log::debug!(
        "data dir: {}, audit log: {}",
        data_dir.display(),
        log_file.display()
    );

    let api = NametagApi::new(FsStore::new(data_dir), FileRenameLog::new(log_file));
    for warning in api.library().warnings() {
        log::warn!("{}", warning);
    }
    Ok(NametagContext { api, config })
}
