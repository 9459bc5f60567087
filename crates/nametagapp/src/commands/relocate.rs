use crate::commands::{require_tracked, view_of, CmdMessage, CmdResult};
use crate::error::{NametagError, Result};
use crate::library::Library;
use crate::rename_log::RenameLog;
use crate::store::PersistenceStore;
use std::path::Path;

/// Moves a file into `dest`, keeping its name and tags.
pub fn run<S: PersistenceStore, L: RenameLog>(
    lib: &mut Library<S, L>,
    path: &Path,
    dest: &Path,
) -> Result<CmdResult> {
    if !dest.is_dir() {
        return Err(NametagError::Api(format!(
            "Not a directory: {}",
            dest.display()
        )));
    }
    require_tracked(lib, path)?;

    let report = lib.move_image(path, dest);
    let mut result = CmdResult::default();
    if report.rename.is_renamed() {
        result.add_message(CmdMessage::success(format!("Moved to {}", dest.display())));
    } else {
        result.note_rename(&report.rename);
    }
    result.note_flush(report.flush.as_ref());

    let affected = report
        .file
        .as_ref()
        .and_then(|k| view_of(lib, k))
        .into_iter()
        .collect();
    Ok(result.with_affected_files(affected))
}
