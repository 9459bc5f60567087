//! File tagging commands.
//!
//! - `add_tags`: Add tags to one file
//! - `remove_tags`: Remove tags from one file
//!
//! Tags must exist in the tag table. Unknown names are dropped with a
//! warning; the known ones still apply.

use crate::commands::{plural, require_tracked, view_of, CmdMessage, CmdResult};
use crate::error::{NametagError, Result};
use crate::file::RenameOutcome;
use crate::library::Library;
use crate::rename_log::RenameLog;
use crate::store::PersistenceStore;
use std::path::Path;

pub fn add_tags<S: PersistenceStore, L: RenameLog>(
    lib: &mut Library<S, L>,
    path: &Path,
    tags: &[String],
) -> Result<CmdResult> {
    if tags.is_empty() {
        return Err(NametagError::Api("No tags specified".to_string()));
    }
    require_tracked(lib, path)?;

    let report = lib.tag_image(path, tags);
    let mut result = CmdResult::default();
    result.note_unknown_tags(&report.unknown_tags);
    if report.is_noop() {
        return Ok(result);
    }

    result.note_rename(&report.rename);
    let tag_list = report.tags.join(", ");
    match &report.rename {
        RenameOutcome::Renamed { .. } => result.add_message(CmdMessage::success(format!(
            "Added tag{} [{}]",
            plural(report.tags.len()),
            tag_list
        ))),
        RenameOutcome::Unchanged => result.add_message(CmdMessage::info(format!(
            "File already has tag{} [{}]",
            plural(report.tags.len()),
            tag_list
        ))),
        _ => {}
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

pub fn remove_tags<S: PersistenceStore, L: RenameLog>(
    lib: &mut Library<S, L>,
    path: &Path,
    tags: &[String],
) -> Result<CmdResult> {
    if tags.is_empty() {
        return Err(NametagError::Api("No tags specified".to_string()));
    }
    require_tracked(lib, path)?;

    let mut result = CmdResult::default();
    if !lib.is_ever_tagged(path) {
        result.add_message(CmdMessage::info("File has never been tagged"));
        return Ok(result);
    }

    let report = lib.remove_tags_from_image(path, tags);
    result.note_unknown_tags(&report.unknown_tags);
    if report.is_noop() {
        return Ok(result);
    }

    result.note_rename(&report.rename);
    if report.rename.is_committed() {
        result.add_message(CmdMessage::success(format!(
            "Removed tag{} [{}]",
            plural(report.tags.len()),
            report.tags.join(", ")
        )));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::test_utils::TestEnv;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn add_tags_renames_file() {
        let mut env = TestEnv::with(&["beach", "sunset"], &["vacation.jpg"]);
        let path = env.path("vacation.jpg");

        let result = add_tags(&mut env.lib, &path, &strings(&["beach", "sunset"])).unwrap();

        assert_eq!(result.affected_files.len(), 1);
        assert_eq!(result.affected_files[0].file_name, "vacation @beach @sunset.jpg");
        assert!(result
            .messages
            .iter()
            .any(|m| m.level == MessageLevel::Success && m.content == "Added tags [beach, sunset]"));
        assert!(env.path("vacation @beach @sunset.jpg").exists());
    }

    #[test]
    fn add_tags_is_idempotent() {
        let mut env = TestEnv::with(&["beach"], &["vacation.jpg"]);
        let path = env.path("vacation.jpg");
        add_tags(&mut env.lib, &path, &strings(&["beach"])).unwrap();

        let result = add_tags(&mut env.lib, &path, &strings(&["beach"])).unwrap();

        assert!(result
            .messages
            .iter()
            .any(|m| m.content == "File already has tag [beach]"));
    }

    #[test]
    fn add_tags_warns_on_unknown() {
        let mut env = TestEnv::with(&["beach"], &["vacation.jpg"]);
        let path = env.path("vacation.jpg");

        let result = add_tags(&mut env.lib, &path, &strings(&["beach", "ghost"])).unwrap();

        assert!(result
            .messages
            .iter()
            .any(|m| m.level == MessageLevel::Warning && m.content.contains("ghost")));
        assert_eq!(result.affected_files[0].tags, vec!["beach"]);
    }

    #[test]
    fn add_tags_only_unknown_is_noop() {
        let mut env = TestEnv::with(&[], &["vacation.jpg"]);
        let path = env.path("vacation.jpg");

        let result = add_tags(&mut env.lib, &path, &strings(&["ghost"])).unwrap();

        assert!(result.affected_files.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn add_tags_requires_loaded_file() {
        let mut env = TestEnv::with(&["beach"], &[]);
        let path = env.path("nope.jpg");
        assert!(add_tags(&mut env.lib, &path, &strings(&["beach"])).is_err());
    }

    #[test]
    fn add_tags_requires_tags() {
        let mut env = TestEnv::with(&[], &["vacation.jpg"]);
        let path = env.path("vacation.jpg");
        assert!(add_tags(&mut env.lib, &path, &[]).is_err());
    }

    #[test]
    fn remove_tags_from_never_tagged_file() {
        let mut env = TestEnv::with(&["beach"], &["vacation.jpg"]);
        let path = env.path("vacation.jpg");

        let result = remove_tags(&mut env.lib, &path, &strings(&["beach"])).unwrap();

        assert_eq!(result.messages[0].content, "File has never been tagged");
    }

    #[test]
    fn remove_tags_renames_back() {
        let mut env = TestEnv::with(&["beach"], &["vacation.jpg"]);
        let path = env.path("vacation.jpg");
        add_tags(&mut env.lib, &path, &strings(&["beach"])).unwrap();

        let result = remove_tags(&mut env.lib, &path, &strings(&["beach"])).unwrap();

        assert_eq!(result.affected_files[0].file_name, "vacation.jpg");
        assert!(result.affected_files[0].ever_tagged);
        assert!(path.exists());
    }
}
