//! Lists the image files of a directory.
//!
//! This is the only place the CLI touches a directory listing; the library
//! receives plain paths.

use nametagapp::config::NametagConfig;
use nametagapp::error::{NametagError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Canonical form of a directory argument.
///
/// Tracked files are keyed by their directory, so `.`, `../pics` and a
/// symlink to the same place must all come out as one path.
pub fn canonical_dir(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(NametagError::Api(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }
    Ok(fs::canonicalize(dir)?)
}

/// Image files in `dir`, sorted by path. Hidden entries are skipped.
///
/// Paths are rooted at the canonical form of `dir`.
pub fn image_files(dir: &Path, config: &NametagConfig) -> Result<Vec<PathBuf>> {
    let dir = canonical_dir(dir)?;
    let mut found = Vec::new();
    walk(&dir, config, &mut found)?;
    found.sort();
    log::debug!("found {} images in {}", found.len(), dir.display());
    Ok(found)
}

fn walk(dir: &Path, config: &NametagConfig, found: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let kind = entry.file_type()?;
        if kind.is_dir() {
            if config.recursive {
                walk(&path, config, found)?;
            }
        } else if kind.is_file() && config.is_image(&path) {
            found.push(path);
        }
    }
    Ok(())
}
