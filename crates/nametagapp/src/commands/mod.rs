//! # Command Layer
//!
//! Each command lives in its own submodule as a plain function over a
//! [`Library`](crate::library::Library). Commands turn the library's reports
//! into a [`CmdResult`]: the files and tags to show, plus leveled messages.
//!
//! ## What Commands Do NOT Do
//!
//! - **Any output**: no stdout or stderr. The UI renders `CmdResult`.
//! - **Argument parsing**: that is the CLI layer's job.
//! - **File discovery**: callers hand in the paths of a directory.
//!
//! ## Errors vs Messages
//!
//! A request that names something that does not exist (a file that is not
//! tracked, an invalid tag name) is an `Err`. Partial trouble during an
//! otherwise valid request (an unknown tag among known ones, a failed rename,
//! a failed flush) becomes a warning or error message on an `Ok` result.
//!
//! ## Command Modules
//!
//! - [`browse`]: Load a directory and list its files
//! - [`tagging`]: Add and remove tags on one file
//! - [`tags`]: List, create, and delete tags
//! - [`history`]: Show a file's past names and revert to one
//! - [`relocate`]: Move a file to another directory
//! - [`audit`]: Read the rename audit log
//! - [`doctor`]: Verify tracked files against the disk

use crate::error::{NametagError, Result};
use crate::file::{FileKey, RenameOutcome, TaggableFile};
use crate::library::{FlushOutcome, Library};
use crate::rename_log::{RenameEntry, RenameLog};
use crate::store::PersistenceStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub mod audit;
pub mod browse;
pub mod doctor;
pub mod history;
pub mod relocate;
pub mod tagging;
pub mod tags;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// A file as the UI shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileView {
    pub file_name: String,
    pub original_name: String,
    pub path: PathBuf,
    pub tags: Vec<String>,
    pub ever_tagged: bool,
}

impl FileView {
    pub fn new(file: &TaggableFile, ever_tagged: bool) -> Self {
        Self {
            file_name: file.file_name().to_string(),
            original_name: file.original_name(),
            path: file.path().to_path_buf(),
            tags: file.tags().to_vec(),
            ever_tagged,
        }
    }
}

/// A tag with how many tracked files hold it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagView {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub usage: usize,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_files: Vec<FileView>,
    pub listed_files: Vec<FileView>,
    pub listed_tags: Vec<TagView>,
    /// Past base names, oldest first.
    pub history: Vec<String>,
    pub log_entries: Vec<RenameEntry>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_files(mut self, files: Vec<FileView>) -> Self {
        self.affected_files = files;
        self
    }

    pub fn with_listed_files(mut self, files: Vec<FileView>) -> Self {
        self.listed_files = files;
        self
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.level == MessageLevel::Error)
    }

    /// Adds a message describing a rename, if anything worth saying happened.
    pub(crate) fn note_rename(&mut self, outcome: &RenameOutcome) {
        match outcome {
            RenameOutcome::Renamed { from, to } => {
                self.add_message(CmdMessage::info(format!(
                    "Renamed {} -> {}",
                    display_name(from),
                    display_name(to)
                )));
            }
            RenameOutcome::Failed { from, reason, .. } => {
                self.add_message(CmdMessage::error(format!(
                    "Could not rename {}: {}",
                    display_name(from),
                    reason
                )));
            }
            RenameOutcome::Rejected(reason) => {
                self.add_message(CmdMessage::warning(reason.clone()));
            }
            RenameOutcome::Unchanged => {}
        }
    }

    pub(crate) fn note_flush(&mut self, flush: Option<&FlushOutcome>) {
        if let Some(FlushOutcome::Failed(errors)) = flush {
            for error in errors {
                self.add_message(CmdMessage::error(format!("Changes not saved: {}", error)));
            }
        }
    }

    pub(crate) fn note_unknown_tags(&mut self, unknown: &[String]) {
        if !unknown.is_empty() {
            self.add_message(CmdMessage::warning(format!(
                "Unknown tag{} ignored: {}. Create with 'nametag tags create'",
                plural(unknown.len()),
                unknown.join(", ")
            )));
        }
    }
}

/// Fails unless `path` names a file in the loaded directory or a tracked one.
pub(crate) fn require_tracked<S: PersistenceStore, L: RenameLog>(
    lib: &Library<S, L>,
    path: &Path,
) -> Result<()> {
    if lib.file(path).is_none() {
        return Err(NametagError::Api(format!(
            "File not found in the loaded directory: {}",
            path.display()
        )));
    }
    Ok(())
}

pub(crate) fn view_of<S: PersistenceStore, L: RenameLog>(
    lib: &Library<S, L>,
    key: &FileKey,
) -> Option<FileView> {
    lib.file_by_key(key)
        .map(|f| FileView::new(f, lib.is_ever_tagged(f.path())))
}

pub(crate) fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_rename_levels() {
        let mut result = CmdResult::default();
        result.note_rename(&RenameOutcome::Unchanged);
        assert!(result.messages.is_empty());

        result.note_rename(&RenameOutcome::Failed {
            from: PathBuf::from("/p/a.jpg"),
            to: PathBuf::from("/p/a @x.jpg"),
            reason: "denied".to_string(),
        });
        assert!(result.has_errors());
        assert_eq!(result.messages[0].content, "Could not rename a.jpg: denied");
    }

    #[test]
    fn test_note_flush_only_reports_failures() {
        let mut result = CmdResult::default();
        result.note_flush(Some(&FlushOutcome::Saved));
        result.note_flush(None);
        assert!(result.messages.is_empty());

        result.note_flush(Some(&FlushOutcome::Failed(vec!["disk full".into()])));
        assert_eq!(result.messages.len(), 1);
        assert!(result.messages[0].content.contains("disk full"));
    }

    #[test]
    fn test_note_unknown_tags() {
        let mut result = CmdResult::default();
        result.note_unknown_tags(&["a".to_string(), "b".to_string()]);
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
        assert!(result.messages[0].content.starts_with("Unknown tags ignored: a, b"));
    }
}
