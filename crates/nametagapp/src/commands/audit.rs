use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::library::Library;
use crate::rename_log::RenameLog;
use crate::store::PersistenceStore;

/// Reads the rename audit log, newest last. `limit` keeps only the tail.
pub fn run<S: PersistenceStore, L: RenameLog>(
    lib: &Library<S, L>,
    limit: Option<usize>,
) -> Result<CmdResult> {
    let mut entries = lib.rename_log().entries()?;
    if let Some(limit) = limit {
        let skip = entries.len().saturating_sub(limit);
        entries.drain(..skip);
    }

    let mut result = CmdResult::default();
    if entries.is_empty() {
        result.add_message(CmdMessage::info("No renames recorded"));
    }
    result.log_entries = entries;
    Ok(result)
}
