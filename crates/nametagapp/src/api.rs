//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the
//! single entry point for every nametag operation, whatever the UI.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Dispatches** to the appropriate command function
//! - **Normalizes inputs** (splitting `a,b` tag lists, trimming blanks)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It holds no business logic and does no output.
//!
//! ## Generic Over Store and Log
//!
//! `NametagApi<S: PersistenceStore, L: RenameLog>`:
//! - Production: `NametagApi<FsStore, FileRenameLog>`
//! - Testing: `NametagApi<MemStore, MemRenameLog>`

use crate::commands::{self, CmdResult};
use crate::error::Result;
use crate::events::LibraryEvent;
use crate::library::Library;
use crate::rename_log::RenameLog;
use crate::store::PersistenceStore;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;

/// The main API facade for nametag operations.
pub struct NametagApi<S: PersistenceStore, L: RenameLog> {
    lib: Library<S, L>,
}

impl<S: PersistenceStore, L: RenameLog> NametagApi<S, L> {
    pub fn new(store: S, log: L) -> Self {
        Self {
            lib: Library::open(store, log),
        }
    }

    pub fn library(&self) -> &Library<S, L> {
        &self.lib
    }

    pub fn subscribe(&self) -> Receiver<LibraryEvent> {
        self.lib.subscribe()
    }

    pub fn load_directory(&mut self, paths: &[PathBuf]) -> Result<CmdResult> {
        commands::browse::load(&mut self.lib, paths)
    }

    pub fn list_files(&self, tag: Option<&str>) -> Result<CmdResult> {
        commands::browse::list(&self.lib, tag)
    }

    pub fn tracked_files(&self) -> Result<CmdResult> {
        commands::browse::tracked(&self.lib)
    }

    pub fn add_tags<T: AsRef<str>>(&mut self, path: &Path, tags: &[T]) -> Result<CmdResult> {
        commands::tagging::add_tags(&mut self.lib, path, &split_tag_args(tags))
    }

    pub fn remove_tags<T: AsRef<str>>(&mut self, path: &Path, tags: &[T]) -> Result<CmdResult> {
        commands::tagging::remove_tags(&mut self.lib, path, &split_tag_args(tags))
    }

    pub fn list_tags(&self) -> Result<CmdResult> {
        commands::tags::list_tags(&self.lib)
    }

    pub fn create_tag(&mut self, name: &str) -> Result<CmdResult> {
        commands::tags::create_tag(&mut self.lib, name)
    }

    pub fn delete_tags<T: AsRef<str>>(&mut self, names: &[T]) -> Result<CmdResult> {
        commands::tags::delete_tags(&mut self.lib, &split_tag_args(names))
    }

    pub fn history(&self, path: &Path) -> Result<CmdResult> {
        commands::history::show(&self.lib, path)
    }

    pub fn revert(&mut self, path: &Path, old_name: &str) -> Result<CmdResult> {
        commands::history::revert(&mut self.lib, path, old_name)
    }

    pub fn move_file(&mut self, path: &Path, dest: &Path) -> Result<CmdResult> {
        commands::relocate::run(&mut self.lib, path, dest)
    }

    pub fn rename_log(&self, limit: Option<usize>) -> Result<CmdResult> {
        commands::audit::run(&self.lib, limit)
    }

    pub fn doctor(&mut self, fix: bool) -> Result<CmdResult> {
        commands::doctor::run(&mut self.lib, fix)
    }
}

/// Accepts `beach sunset` as well as `beach,sunset`; drops blanks.
fn split_tag_args<T: AsRef<str>>(args: &[T]) -> Vec<String> {
    args.iter()
        .flat_map(|a| a.as_ref().split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rename_log::MemRenameLog;
    use crate::store::memory::MemStore;
    use tempfile::TempDir;

    fn api() -> NametagApi<MemStore, MemRenameLog> {
        NametagApi::new(MemStore::new(), MemRenameLog::new())
    }

    #[test]
    fn test_split_tag_args() {
        assert_eq!(
            split_tag_args(&["beach,sunset", " trip ", ",", ""]),
            vec!["beach", "sunset", "trip"]
        );
    }

    #[test]
    fn test_api_dispatches_through_commands() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vacation.jpg");
        std::fs::write(&path, b"img").unwrap();
        let mut api = api();

        api.create_tag("beach").unwrap();
        api.create_tag("sunset").unwrap();
        let loaded = api.load_directory(std::slice::from_ref(&path)).unwrap();
        assert_eq!(loaded.listed_files.len(), 1);

        let tagged = api.add_tags(&path, &["beach,sunset"]).unwrap();
        assert_eq!(tagged.affected_files[0].file_name, "vacation @beach @sunset.jpg");

        let listed = api.list_files(Some("sunset")).unwrap();
        assert_eq!(listed.listed_files.len(), 1);

        let history = api.history(&path).unwrap();
        assert_eq!(history.history, vec!["vacation"]);

        let log = api.rename_log(None).unwrap();
        assert_eq!(log.log_entries.len(), 1);
    }

    #[test]
    fn test_api_emits_events() {
        let mut api = api();
        let rx = api.subscribe();
        api.create_tag("beach").unwrap();
        assert!(matches!(rx.try_recv(), Ok(LibraryEvent::TagsChanged { .. })));
    }
}
