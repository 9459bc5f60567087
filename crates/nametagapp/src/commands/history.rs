//! Name history and reverts.

use crate::commands::{require_tracked, view_of, CmdMessage, CmdResult};
use crate::error::Result;
use crate::library::Library;
use crate::rename_log::RenameLog;
use crate::store::PersistenceStore;
use std::path::Path;

/// Past base names of a file, oldest first.
pub fn show<S: PersistenceStore, L: RenameLog>(
    lib: &Library<S, L>,
    path: &Path,
) -> Result<CmdResult> {
    require_tracked(lib, path)?;
    let mut result = CmdResult::default();
    result.history = lib.history(path).map(<[String]>::to_vec).unwrap_or_default();
    if result.history.is_empty() {
        result.add_message(CmdMessage::info("No previous names"));
    }
    Ok(result)
}

/// Renames a file back to `old_name` (a base name, without extension).
///
/// The file's tags become whatever `old_name` encodes.
pub fn revert<S: PersistenceStore, L: RenameLog>(
    lib: &mut Library<S, L>,
    path: &Path,
    old_name: &str,
) -> Result<CmdResult> {
    require_tracked(lib, path)?;
    let mut result = CmdResult::default();
    if !lib.is_ever_tagged(path) {
        result.add_message(CmdMessage::info("File has never been tagged"));
        return Ok(result);
    }

    let report = lib.set_image_to_old_name(path, old_name);
    result.note_rename(&report.rename);
    if report.rename.is_renamed() {
        result.add_message(CmdMessage::success(format!("Reverted to '{}'", old_name)));
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
