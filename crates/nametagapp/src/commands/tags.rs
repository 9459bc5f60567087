//! Tag table commands.
//!
//! - `list_tags`: List all tags with their usage
//! - `create_tag`: Create a new tag
//! - `delete_tags`: Delete tags (cascades to every file holding them)

use crate::commands::{plural, CmdMessage, CmdResult, TagView};
use crate::error::{NametagError, Result};
use crate::library::Library;
use crate::rename_log::RenameLog;
use crate::store::PersistenceStore;

/// List all tags in the tag table.
pub fn list_tags<S: PersistenceStore, L: RenameLog>(lib: &Library<S, L>) -> Result<CmdResult> {
    let index = lib.tag_index();
    let mut result = CmdResult::default();

    if index.is_empty() {
        result.add_message(CmdMessage::info("No tags defined"));
    }
    result.listed_tags = index
        .tags()
        .map(|t| TagView {
            name: t.name.clone(),
            created_at: t.created_at,
            usage: index.usage(&t.name),
        })
        .collect();
    Ok(result)
}

/// Create a new tag.
///
/// Returns an error if the name is invalid or the tag already exists.
pub fn create_tag<S: PersistenceStore, L: RenameLog>(
    lib: &mut Library<S, L>,
    name: &str,
) -> Result<CmdResult> {
    let report = lib.create_tag(name)?;
    if !report.created {
        return Err(NametagError::Api(format!(
            "Tag '{}' already exists",
            report.tag.name
        )));
    }

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Created tag '{}'",
        report.tag.name
    )));
    result.note_flush(report.flush.as_ref());
    Ok(result)
}

/// Delete tags from the tag table.
///
/// Every file holding one of them is renamed once to drop the tokens.
pub fn delete_tags<S: PersistenceStore, L: RenameLog>(
    lib: &mut Library<S, L>,
    names: &[String],
) -> Result<CmdResult> {
    let resolved = lib.tag_index().resolve(names);
    if resolved.found.is_empty() {
        return Err(NametagError::Api(format!(
            "Tag{} not found: {}",
            plural(names.len()),
            names.join(", ")
        )));
    }

    let report = lib.remove_tags(&resolved.found);
    let mut result = CmdResult::default();
    result.note_unknown_tags(&resolved.unknown);

    for (_, outcome) in &report.files {
        result.note_rename(outcome);
    }
    if !report.removed.is_empty() {
        result.add_message(CmdMessage::success(format!(
            "Deleted tag{} {}",
            plural(report.removed.len()),
            report.removed.join(", ")
        )));
    }
    if !report.kept.is_empty() {
        result.add_message(CmdMessage::warning(format!(
            "Kept {} because some files could not be renamed",
            report.kept.join(", ")
        )));
    }
    let untagged = report.files.iter().filter(|(_, o)| o.is_committed()).count();
    if untagged > 0 {
        result.add_message(CmdMessage::info(format!(
            "Removed from {} file{}",
            untagged,
            plural(untagged)
        )));
    }
    result.note_flush(report.flush.as_ref());
    Ok(result)
}
