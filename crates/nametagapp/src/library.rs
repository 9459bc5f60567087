//! # Library
//!
//! [`Library`] keeps the tag index, the files, and the persistence store in
//! step. Every mutation goes through it.
//!
//! ## File Sets
//!
//! - **working set**: the files of the last directory load, in load order.
//!   Rebuilt every load, never persisted.
//! - **ever tagged**: every file that has held at least one tag. This set
//!   alone is persisted. A file never leaves it by losing its tags.
//!
//! Both sets hold [`FileKey`]s into one map of [`TaggableFile`]s, so a file
//! that is both loaded and ever tagged is a single instance and its history
//! cannot be duplicated or lost.
//!
//! ## File Lifecycle
//!
//! ```text
//! Untracked ──load──▶ Tracked(untagged) ──tag──▶ Tracked(tagged)
//!                            ▲                          │
//!                            └────── remove last tag ───┘
//! ```
//!
//! Once tagged, a file stays tracked across sessions even with no tags left.
//!
//! ## Reports
//!
//! I/O never aborts an operation half way. Each method returns a report that
//! says what was resolved, what happened on disk ([`RenameOutcome`]) and
//! whether the flush that follows every mutation succeeded
//! ([`FlushOutcome`]). Unknown files and unknown tag names are no-ops, but
//! they are listed in the report so callers can tell the user.

use crate::error::Result;
use crate::events::{EventBus, LibraryEvent};
use crate::codec;
use crate::file::{absolute, FileKey, RenameOutcome, TaggableFile};
use crate::rename_log::RenameLog;
use crate::store::{PersistenceStore, RestoredFiles};
use crate::tags::{Tag, TagIndex};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;

/// Result of writing both blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    Saved,
    /// One message per blob that failed to write.
    Failed(Vec<String>),
}

impl FlushOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, FlushOutcome::Saved)
    }
}

/// Result of a single-file mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationReport {
    /// The tracked file acted on, if the path resolved to one.
    pub file: Option<FileKey>,
    /// Tag names that resolved and were applied (or attempted).
    pub tags: Vec<String>,
    /// Tag names that did not resolve and were dropped.
    pub unknown_tags: Vec<String>,
    pub rename: RenameOutcome,
    /// `None` when nothing was attempted and no flush ran.
    pub flush: Option<FlushOutcome>,
}

impl MutationReport {
    fn noop(file: Option<FileKey>, unknown_tags: Vec<String>) -> Self {
        Self {
            file,
            tags: Vec::new(),
            unknown_tags,
            rename: RenameOutcome::Unchanged,
            flush: None,
        }
    }

    fn with_rename(mut self, rename: RenameOutcome) -> Self {
        self.rename = rename;
        self
    }

    pub fn is_noop(&self) -> bool {
        self.flush.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    /// Files that matched an already tracked identity.
    pub reused: usize,
    /// Paths that could not be tracked, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
    /// Tags seen in file names that were not in the index before.
    pub discovered_tags: Vec<String>,
    pub flush: FlushOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReport {
    pub tag: Tag,
    pub created: bool,
    pub flush: Option<FlushOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    /// Tags deleted from the index.
    pub removed: Vec<String>,
    /// Tags kept because a holder could not be renamed.
    pub kept: Vec<String>,
    /// Every file that held a removed tag, with its rename outcome.
    pub files: Vec<(FileKey, RenameOutcome)>,
    pub flush: Option<FlushOutcome>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorReport {
    /// Ever-tagged files whose path no longer exists.
    pub missing: Vec<FileKey>,
    /// Missing files that were forgotten (only with `fix`).
    pub forgotten: Vec<FileKey>,
    /// Files whose tag set was re-derived from the name on disk.
    pub healed: Vec<FileKey>,
    pub flush: Option<FlushOutcome>,
}

impl DoctorReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.healed.is_empty()
    }
}

pub struct Library<S: PersistenceStore, L: RenameLog> {
    store: S,
    log: L,
    events: EventBus,
    index: TagIndex,
    files: BTreeMap<FileKey, TaggableFile>,
    working: Vec<FileKey>,
    ever_tagged: BTreeSet<FileKey>,
    warnings: Vec<String>,
}

impl<S: PersistenceStore, L: RenameLog> Library<S, L> {
    /// Restores persisted state. Unreadable blobs start empty; the reason is
    /// kept in [`Library::warnings`].
    pub fn open(store: S, log: L) -> Self {
        let mut warnings = Vec::new();

        let tags = store.load_tags().unwrap_or_else(|e| {
            log::warn!("starting with an empty tag table: {}", e);
            warnings.push(e.to_string());
            Vec::new()
        });
        let restored = store.load_files().unwrap_or_else(|e| {
            log::warn!("starting with no tracked files: {}", e);
            warnings.push(e.to_string());
            RestoredFiles::default()
        });
        warnings.extend(restored.skipped);

        let mut library = Self {
            store,
            log,
            events: EventBus::new(),
            index: TagIndex::from_tags(tags),
            files: BTreeMap::new(),
            working: Vec::new(),
            ever_tagged: BTreeSet::new(),
            warnings,
        };

        for file in restored.files {
            let key = file.key().clone();
            library.files.insert(key.clone(), file);
            library.ever_tagged.insert(key.clone());
            let added = library.relink(&key);
            if !added.is_empty() {
                log::info!("re-registered tags missing from the tag table: {:?}", added);
            }
        }

        log::debug!(
            "opened library: {} tags, {} tracked files",
            library.index.len(),
            library.ever_tagged.len()
        );
        library
    }

    // --- Accessors ---

    pub fn tag_index(&self) -> &TagIndex {
        &self.index
    }

    pub fn rename_log(&self) -> &L {
        &self.log
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Problems met while restoring persisted state.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn subscribe(&self) -> Receiver<LibraryEvent> {
        self.events.subscribe()
    }

    /// Files of the last directory load, in load order.
    pub fn working_set(&self) -> Vec<&TaggableFile> {
        self.working
            .iter()
            .filter_map(|k| self.files.get(k))
            .collect()
    }

    pub fn ever_tagged(&self) -> Vec<&TaggableFile> {
        self.ever_tagged
            .iter()
            .filter_map(|k| self.files.get(k))
            .collect()
    }

    pub fn is_ever_tagged(&self, path: &Path) -> bool {
        self.resolve(path)
            .is_some_and(|k| self.ever_tagged.contains(&k))
    }

    /// The tracked file with the same identity as `path`. Any rendering of
    /// the name resolves: `vacation.jpg` finds `vacation @beach.jpg`.
    pub fn file(&self, path: &Path) -> Option<&TaggableFile> {
        self.resolve(path).and_then(|k| self.files.get(&k))
    }

    pub fn file_by_key(&self, key: &FileKey) -> Option<&TaggableFile> {
        self.files.get(key)
    }

    pub fn history(&self, path: &Path) -> Option<&[String]> {
        self.file(path).map(TaggableFile::name_history)
    }

    pub fn files_with_tag(&self, name: &str) -> Vec<&TaggableFile> {
        self.index
            .holders(name)
            .iter()
            .filter_map(|k| self.files.get(k))
            .collect()
    }

    // --- Operations ---

    /// Replaces the working set with `paths`.
    ///
    /// Tracked identities are reused and follow the name found on disk. Tags
    /// in each name become that file's tag set and are registered in the
    /// index if unknown.
    pub fn load_directory(&mut self, paths: &[PathBuf]) -> LoadReport {
        for key in std::mem::take(&mut self.working) {
            if !self.ever_tagged.contains(&key) {
                self.files.remove(&key);
                self.index.unlink_all(&key);
            }
        }

        let mut reused = 0;
        let mut skipped = Vec::new();
        let mut discovered = Vec::new();

        for path in paths {
            let key = match FileKey::for_path(path) {
                Ok(key) => key,
                Err(e) => {
                    log::debug!("skipping {}: {}", path.display(), e);
                    skipped.push((path.clone(), e.to_string()));
                    continue;
                }
            };
            if self.working.contains(&key) {
                skipped.push((
                    path.clone(),
                    format!("same identity as another file ({})", key.original_name()),
                ));
                continue;
            }

            if let Some(file) = self.files.get_mut(&key) {
                reused += 1;
                if let Err(e) = file.adopt_disk_name(path.clone()) {
                    skipped.push((path.clone(), e.to_string()));
                    continue;
                }
            } else {
                match TaggableFile::new(path.clone()) {
                    Ok(file) => {
                        self.files.insert(key.clone(), file);
                    }
                    Err(e) => {
                        skipped.push((path.clone(), e.to_string()));
                        continue;
                    }
                }
            }

            discovered.extend(self.relink(&key));
            self.working.push(key);
        }

        self.events.emit(LibraryEvent::WorkingSetChanged {
            count: self.working.len(),
        });
        if !discovered.is_empty() {
            self.emit_tags_changed();
        }

        LoadReport {
            loaded: self.working.len(),
            reused,
            skipped,
            discovered_tags: discovered,
            flush: self.flush(),
        }
    }

    /// Registers a tag in the index.
    ///
    /// Invalid names are the caller's to fix and come back as `Err`.
    pub fn create_tag(&mut self, name: &str) -> Result<CreateReport> {
        let (tag, created) = self.index.add_tag(name)?;
        let flush = if created {
            self.emit_tags_changed();
            Some(self.flush())
        } else {
            None
        };
        Ok(CreateReport {
            tag,
            created,
            flush,
        })
    }

    /// Adds known tags to a tracked file with one rename.
    ///
    /// Unknown tag names are dropped. A file that is not tracked, or a
    /// request where no tag resolves, is a no-op.
    pub fn tag_image<T: AsRef<str>>(&mut self, path: &Path, names: &[T]) -> MutationReport {
        let resolved = self.index.resolve(names);
        let Some(key) = self.resolve(path) else {
            return MutationReport::noop(None, resolved.unknown);
        };
        if resolved.found.is_empty() {
            return MutationReport::noop(Some(key), resolved.unknown);
        }
        let Some(file) = self.files.get_mut(&key) else {
            return MutationReport::noop(None, resolved.unknown);
        };

        let rename = file.add_tags(&resolved.found, &self.log);
        if rename.is_committed() {
            for tag in &resolved.found {
                self.index.link(tag, &key);
            }
            self.ever_tagged.insert(key.clone());
            self.events
                .emit(LibraryEvent::FileChanged { key: key.clone() });
        }

        MutationReport {
            file: Some(key),
            tags: resolved.found,
            unknown_tags: resolved.unknown,
            rename,
            flush: Some(self.flush()),
        }
    }

    /// Removes tags from a file. Only ever-tagged files can be untagged.
    pub fn remove_tags_from_image<T: AsRef<str>>(
        &mut self,
        path: &Path,
        names: &[T],
    ) -> MutationReport {
        let resolved = self.index.resolve(names);
        let Some(key) = self.resolve(path).filter(|k| self.ever_tagged.contains(k)) else {
            return MutationReport::noop(None, resolved.unknown);
        };
        if resolved.found.is_empty() {
            return MutationReport::noop(Some(key), resolved.unknown);
        }
        let Some(file) = self.files.get_mut(&key) else {
            return MutationReport::noop(None, resolved.unknown);
        };

        let rename = file.remove_tags(&resolved.found, &self.log);
        if rename.is_committed() {
            for tag in &resolved.found {
                self.index.unlink(tag, &key);
            }
            self.events
                .emit(LibraryEvent::FileChanged { key: key.clone() });
        }

        MutationReport {
            file: Some(key),
            tags: resolved.found,
            unknown_tags: resolved.unknown,
            rename,
            flush: Some(self.flush()),
        }
    }

    /// Renames an ever-tagged file back to a name from its history.
    ///
    /// The restored name is authoritative: the tag set is re-derived from
    /// its `@` tokens, and tags it mentions that the index lacks are
    /// registered.
    pub fn set_image_to_old_name(&mut self, path: &Path, old_name: &str) -> MutationReport {
        let Some(key) = self.resolve(path).filter(|k| self.ever_tagged.contains(k)) else {
            return MutationReport::noop(None, Vec::new());
        };
        let target = FileKey {
            untagged: codec::decode_base(old_name).0,
            ..key.clone()
        };
        if let Some(rejected) = self.collision(&key, &target) {
            return MutationReport::noop(Some(key), Vec::new()).with_rename(rejected);
        }
        let Some(file) = self.files.get_mut(&key) else {
            return MutationReport::noop(None, Vec::new());
        };

        let rename = file.revert_to_historical_name(old_name, &self.log);
        if !rename.is_renamed() {
            return MutationReport {
                file: Some(key),
                tags: Vec::new(),
                unknown_tags: Vec::new(),
                rename,
                flush: None,
            };
        }

        let new_key = file.key().clone();
        let tags = file.tags().to_vec();
        if new_key != key {
            self.rekey(&key, &new_key);
        }
        if !self.relink(&new_key).is_empty() {
            self.emit_tags_changed();
        }
        self.events.emit(LibraryEvent::FileChanged {
            key: new_key.clone(),
        });

        MutationReport {
            file: Some(new_key),
            tags,
            unknown_tags: Vec::new(),
            rename,
            flush: Some(self.flush()),
        }
    }

    /// Deletes tags from the index and untags every file that held them.
    ///
    /// Each affected file is renamed once, however many of the tags it held.
    /// If a file cannot be renamed, the tags it still carries stay in the
    /// index so no file is left pointing at a deleted tag.
    pub fn remove_tags<T: AsRef<str>>(&mut self, names: &[T]) -> CascadeReport {
        let targets = self.index.resolve(names).found;
        if targets.is_empty() {
            return CascadeReport {
                removed: Vec::new(),
                kept: Vec::new(),
                files: Vec::new(),
                flush: None,
            };
        }

        let mut outcomes = Vec::new();
        let mut kept: BTreeSet<String> = BTreeSet::new();

        for key in self.index.holders_of_any(&targets) {
            let Some(file) = self.files.get_mut(&key) else {
                continue;
            };
            let outcome = file.remove_tags(&targets, &self.log);
            if !outcome.is_committed() {
                kept.extend(targets.iter().filter(|t| file.has_tag(t)).cloned());
            } else {
                self.events
                    .emit(LibraryEvent::FileChanged { key: key.clone() });
            }
            outcomes.push((key, outcome));
        }

        let doomed: Vec<&String> = targets.iter().filter(|t| !kept.contains(*t)).collect();
        let removed = self.index.remove_tags(&doomed);
        for (key, outcome) in &outcomes {
            if outcome.is_committed() {
                for tag in &targets {
                    self.index.unlink(tag, key);
                }
            }
        }
        if !removed.is_empty() {
            self.emit_tags_changed();
        }

        CascadeReport {
            removed,
            kept: kept.into_iter().collect(),
            files: outcomes,
            flush: Some(self.flush()),
        }
    }

    /// Moves a tracked file to another directory, keeping its name.
    pub fn move_image(&mut self, path: &Path, dest: &Path) -> MutationReport {
        let Some(key) = self.resolve(path) else {
            return MutationReport::noop(None, Vec::new());
        };
        let target = FileKey {
            dir: absolute(dest),
            ..key.clone()
        };
        if let Some(rejected) = self.collision(&key, &target) {
            return MutationReport::noop(Some(key), Vec::new()).with_rename(rejected);
        }
        let Some(file) = self.files.get_mut(&key) else {
            return MutationReport::noop(None, Vec::new());
        };

        let rename = file.move_to_directory(dest);
        let new_key = file.key().clone();
        let tags = file.tags().to_vec();
        if rename.is_renamed() && new_key != key {
            self.rekey(&key, &new_key);
            self.events.emit(LibraryEvent::FileChanged {
                key: new_key.clone(),
            });
        }

        MutationReport {
            file: Some(new_key),
            tags,
            unknown_tags: Vec::new(),
            rename,
            flush: Some(self.flush()),
        }
    }

    /// Checks every ever-tagged file against the disk.
    ///
    /// Files whose name drifted from their tag set adopt the tags in the
    /// name. Missing files are reported, and forgotten when `fix` is set.
    pub fn verify(&mut self, fix: bool) -> DoctorReport {
        let mut report = DoctorReport::default();
        let keys: Vec<FileKey> = self.ever_tagged.iter().cloned().collect();

        for key in keys {
            let Some(file) = self.files.get_mut(&key) else {
                continue;
            };
            if !file.path().exists() {
                report.missing.push(key);
                continue;
            }
            if file.tags_in_name() != file.tags() {
                let path = file.path().to_path_buf();
                if file.adopt_disk_name(path).is_ok() {
                    self.relink(&key);
                    report.healed.push(key);
                }
            }
        }

        if fix {
            for key in &report.missing {
                self.files.remove(key);
                self.ever_tagged.remove(key);
                self.working.retain(|k| k != key);
                self.index.unlink_all(key);
                report.forgotten.push(key.clone());
            }
        }

        if !report.healed.is_empty() || !report.forgotten.is_empty() {
            report.flush = Some(self.flush());
        }
        report
    }

    /// Writes the ever-tagged files and the tag table.
    ///
    /// Both writes are attempted even if the first fails.
    pub fn flush(&self) -> FlushOutcome {
        let files: Vec<TaggableFile> = self
            .ever_tagged
            .iter()
            .filter_map(|k| self.files.get(k))
            .cloned()
            .collect();
        let tags: Vec<Tag> = self.index.tags().cloned().collect();

        let mut errors = Vec::new();
        if let Err(e) = self.store.save_files(&files) {
            log::error!("{}", e);
            errors.push(e.to_string());
        }
        if let Err(e) = self.store.save_tags(&tags) {
            log::error!("{}", e);
            errors.push(e.to_string());
        }

        if errors.is_empty() {
            FlushOutcome::Saved
        } else {
            FlushOutcome::Failed(errors)
        }
    }

    // --- Internals ---

    fn resolve(&self, path: &Path) -> Option<FileKey> {
        FileKey::for_path(path)
            .ok()
            .filter(|k| self.files.contains_key(k))
    }

    /// Rebuilds `key`'s membership from its tag set, registering unknown
    /// tags. Returns the tags that had to be created.
    fn relink(&mut self, key: &FileKey) -> Vec<String> {
        let Some(file) = self.files.get(key) else {
            return Vec::new();
        };
        let tags = file.tags().to_vec();

        let mut created = Vec::new();
        self.index.unlink_all(key);
        for tag in &tags {
            match self.index.add_tag(tag) {
                Ok((_, true)) => created.push(tag.clone()),
                Ok(_) => {}
                Err(e) => log::warn!("{}: {}", key, e),
            }
            self.index.link(tag, key);
        }
        if !tags.is_empty() {
            self.ever_tagged.insert(key.clone());
        }
        created
    }

    /// Refuses a re-key onto an identity another tracked file already has.
    fn collision(&self, key: &FileKey, target: &FileKey) -> Option<RenameOutcome> {
        if target == key || !self.files.contains_key(target) {
            return None;
        }
        log::warn!("refusing to re-key {}: {} is already tracked", key, target);
        Some(RenameOutcome::Rejected(format!(
            "another tracked file is already {}",
            target
        )))
    }

    fn rekey(&mut self, old: &FileKey, new: &FileKey) {
        if let Some(file) = self.files.remove(old) {
            if self.files.insert(new.clone(), file).is_some() {
                log::warn!("{} replaced another tracked record", new);
            }
        }
        if self.ever_tagged.remove(old) {
            self.ever_tagged.insert(new.clone());
        }
        for key in self.working.iter_mut().filter(|k| *k == old) {
            *key = new.clone();
        }
        self.index.rekey(old, new);
    }

    fn emit_tags_changed(&self) {
        self.events.emit(LibraryEvent::TagsChanged {
            tags: self.index.names(),
        });
    }
}
