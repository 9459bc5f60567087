//! Directory loading and file listings.

use crate::commands::{plural, CmdMessage, CmdResult, FileView};
use crate::error::Result;
use crate::library::Library;
use crate::rename_log::RenameLog;
use crate::store::PersistenceStore;
use std::path::PathBuf;

/// Replaces the working set with `paths` and lists it.
pub fn load<S: PersistenceStore, L: RenameLog>(
    lib: &mut Library<S, L>,
    paths: &[PathBuf],
) -> Result<CmdResult> {
    let report = lib.load_directory(paths);
    let mut result = list(lib, None)?;

    for (path, reason) in &report.skipped {
        result.add_message(CmdMessage::warning(format!(
            "Skipped {}: {}",
            path.display(),
            reason
        )));
    }
    if !report.discovered_tags.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "Registered tag{} found in file names: {}",
            plural(report.discovered_tags.len()),
            report.discovered_tags.join(", ")
        )));
    }
    result.note_flush(Some(&report.flush));
    Ok(result)
}

/// Lists the working set, optionally only files holding `tag`.
pub fn list<S: PersistenceStore, L: RenameLog>(
    lib: &Library<S, L>,
    tag: Option<&str>,
) -> Result<CmdResult> {
    let files: Vec<FileView> = lib
        .working_set()
        .into_iter()
        .filter(|f| tag.is_none_or(|t| f.has_tag(t)))
        .map(|f| FileView::new(f, lib.is_ever_tagged(f.path())))
        .collect();

    let mut result = CmdResult::default();
    if files.is_empty() {
        result.add_message(CmdMessage::info(match tag {
            Some(t) => format!("No files tagged '{}'", t),
            None => "No images found".to_string(),
        }));
    }
    Ok(result.with_listed_files(files))
}

/// Lists every file that has ever been tagged, loaded or not.
pub fn tracked<S: PersistenceStore, L: RenameLog>(lib: &Library<S, L>) -> Result<CmdResult> {
    let files: Vec<FileView> = lib
        .ever_tagged()
        .into_iter()
        .map(|f| FileView::new(f, true))
        .collect();
    let mut result = CmdResult::default();
    if files.is_empty() {
        result.add_message(CmdMessage::info("No file has been tagged yet"));
    }
    Ok(result.with_listed_files(files))
}
