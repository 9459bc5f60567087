//! # Taggable Files
//!
//! A [`TaggableFile`] owns one file on disk: its current path, its ordered tag
//! names, and every base name it has had before (`name_history`).
//!
//! ## Invariant
//!
//! The on-disk file name is always
//! `codec::encode(untagged, tags, extension)`. Mutations compute the target
//! name first, perform the move, and only commit the new tag set and history
//! entry once the move succeeded. A failed move leaves the object exactly as
//! it was, so the path can never disagree with the tags.
//!
//! ## Identity
//!
//! Two files are the same logical file iff they share a [`FileKey`]: parent
//! directory, untagged name, and extension. The key is computed when the file
//! is constructed and cached; tagging never changes it. Only an explicit move
//! to another directory (or a revert to a differently-named ancestor) re-keys
//! the file.

use crate::codec;
use crate::error::{NametagError, Result};
use crate::rename_log::RenameLog;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Stable identity of a taggable file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileKey {
    pub dir: PathBuf,
    pub untagged: String,
    pub extension: String,
}

impl FileKey {
    /// Derives the key of whatever file lives (or would live) at `path`.
    ///
    /// Relative paths are resolved against the current directory, so `./a.jpg`
    /// and `/pics/a.jpg` name the same file when run from `/pics`.
    pub fn for_path(path: &Path) -> Result<Self> {
        let path = absolute(path);
        let decoded = codec::decode(file_name_of(&path)?)?;
        Ok(Self {
            dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            untagged: decoded.untagged,
            extension: decoded.extension,
        })
    }

    /// Untagged name with extension, e.g. `vacation.jpg`.
    pub fn original_name(&self) -> String {
        format!("{}{}", self.untagged, self.extension)
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir.join(self.original_name()).display())
    }
}

/// Lexically absolute form of `path`. Symlinks are left alone.
pub(crate) fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn file_name_of(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| NametagError::OutOfGrammar(path.display().to_string()))
}

/// What happened to the file on disk during a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The file name already matched; nothing was moved.
    Unchanged,
    /// The file was moved and in-memory state committed.
    Renamed { from: PathBuf, to: PathBuf },
    /// The move failed; in-memory state is untouched.
    Failed {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },
    /// The request was refused before touching the disk.
    Rejected(String),
}

impl RenameOutcome {
    pub fn is_renamed(&self) -> bool {
        matches!(self, RenameOutcome::Renamed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RenameOutcome::Failed { .. })
    }

    /// The file name now matches the requested state.
    pub fn is_committed(&self) -> bool {
        matches!(self, RenameOutcome::Unchanged | RenameOutcome::Renamed { .. })
    }

    /// Converts a failure into an error, for callers that want `?`.
    pub fn into_result(self) -> Result<Self> {
        match self {
            RenameOutcome::Failed { from, to, reason } => {
                Err(NametagError::RenameFailed { from, to, reason })
            }
            other => Ok(other),
        }
    }
}

/// Serialized shape of a [`TaggableFile`]. The key is re-derived on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileRecord {
    path: PathBuf,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    name_history: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "FileRecord", into = "FileRecord")]
pub struct TaggableFile {
    path: PathBuf,
    key: FileKey,
    tags: Vec<String>,
    name_history: Vec<String>,
}

impl TryFrom<FileRecord> for TaggableFile {
    type Error = NametagError;

    fn try_from(record: FileRecord) -> Result<Self> {
        let path = absolute(&record.path);
        let key = FileKey::for_path(&path)?;
        Ok(Self {
            path,
            key,
            tags: record.tags,
            name_history: record.name_history,
        })
    }
}

impl From<TaggableFile> for FileRecord {
    fn from(file: TaggableFile) -> Self {
        Self {
            path: file.path,
            tags: file.tags,
            name_history: file.name_history,
        }
    }
}

impl PartialEq for TaggableFile {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for TaggableFile {}

impl Hash for TaggableFile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for TaggableFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

impl TaggableFile {
    /// Wraps a path. Tags already present in the file name become the tag set.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path: PathBuf = path.into();
        let path = absolute(&path);
        let decoded = codec::decode(file_name_of(&path)?)?;
        let key = FileKey {
            dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            untagged: decoded.untagged,
            extension: decoded.extension,
        };
        Ok(Self {
            path,
            key,
            tags: dedup(decoded.tags),
            name_history: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key(&self) -> &FileKey {
        &self.key
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t == name)
    }

    pub fn name_history(&self) -> &[String] {
        &self.name_history
    }

    /// Full current file name, e.g. `vacation @beach.jpg`.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Current file name without extension, e.g. `vacation @beach`.
    pub fn base_name(&self) -> &str {
        codec::base_name(self.file_name()).unwrap_or_default()
    }

    pub fn extension(&self) -> &str {
        &self.key.extension
    }

    pub fn untagged_name(&self) -> &str {
        &self.key.untagged
    }

    /// Untagged name with extension; used for display and as identity.
    pub fn original_name(&self) -> String {
        self.key.original_name()
    }

    /// The file name this object's tag set renders to.
    pub fn rendered_name(&self) -> String {
        codec::encode(&self.key.untagged, &self.tags, &self.key.extension)
    }

    /// Tag names encoded in the current on-disk name.
    pub fn tags_in_name(&self) -> Vec<String> {
        codec::decode_base(self.base_name()).1
    }

    pub fn add_tag(&mut self, tag: &str, log: &dyn RenameLog) -> RenameOutcome {
        self.add_tags(&[tag.to_string()], log)
    }

    /// Adds every tag not yet present with a single rename.
    pub fn add_tags<S: AsRef<str>>(&mut self, tags: &[S], log: &dyn RenameLog) -> RenameOutcome {
        let mut next = self.tags.clone();
        for tag in tags {
            let tag = tag.as_ref();
            if !next.iter().any(|t| t == tag) {
                next.push(tag.to_string());
            }
        }
        if next.len() == self.tags.len() {
            return RenameOutcome::Unchanged;
        }
        self.apply_tags(next, log)
    }

    pub fn remove_tag(&mut self, tag: &str, log: &dyn RenameLog) -> RenameOutcome {
        self.remove_tags(&[tag.to_string()], log)
    }

    /// Removes the given tags and re-renders from the remaining set.
    ///
    /// The re-render happens even if none of the tags were present, which
    /// repairs a file name that drifted from the tag set.
    pub fn remove_tags<S: AsRef<str>>(
        &mut self,
        tags: &[S],
        log: &dyn RenameLog,
    ) -> RenameOutcome {
        let next: Vec<String> = self
            .tags
            .iter()
            .filter(|t| !tags.iter().any(|r| r.as_ref() == t.as_str()))
            .cloned()
            .collect();
        self.apply_tags(next, log)
    }

    /// Renames the file back to a base name it had before.
    ///
    /// `old_name` must be in the history and differ from the current base
    /// name. On success the tag set is re-derived from `old_name`.
    pub fn revert_to_historical_name(&mut self, old_name: &str, log: &dyn RenameLog) -> RenameOutcome {
        if old_name == self.base_name() {
            return RenameOutcome::Rejected(format!("'{}' is already the current name", old_name));
        }
        if !self.name_history.iter().any(|n| n == old_name) {
            return RenameOutcome::Rejected(format!("'{}' is not in the name history", old_name));
        }

        let (untagged, tags) = codec::decode_base(old_name);
        let target = format!("{}{}", old_name, self.key.extension);
        let previous = self.base_name().to_string();

        let outcome = self.rename_to(&target, log);
        if outcome.is_renamed() {
            self.name_history.push(previous);
            self.tags = dedup(tags);
            if untagged != self.key.untagged {
                self.key.untagged = untagged;
            }
        }
        outcome
    }

    /// Moves the file into `dir`, keeping its file name.
    pub fn move_to_directory(&mut self, dir: &Path) -> RenameOutcome {
        let dir = absolute(dir);
        let from = self.path.clone();
        let to = dir.join(self.file_name());
        if to == from {
            return RenameOutcome::Unchanged;
        }
        if to.exists() {
            return RenameOutcome::Failed {
                from,
                to,
                reason: "destination already exists".to_string(),
            };
        }

        let moved = fs::rename(&from, &to).or_else(|_| {
            // Cross-device moves cannot be renamed; copy then remove.
            fs::copy(&from, &to)?;
            fs::remove_file(&from)
        });

        match moved {
            Ok(()) => {
                log::info!("moved {} -> {}", from.display(), to.display());
                self.path = to.clone();
                self.key.dir = dir;
                RenameOutcome::Renamed { from, to }
            }
            Err(e) => {
                log::warn!("failed to move {}: {}", from.display(), e);
                RenameOutcome::Failed {
                    from,
                    to,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Points this file at a path found on disk and adopts the tags in its
    /// name. Returns `true` if the tag set changed.
    ///
    /// The path must have the same key; it is how a tracked file follows
    /// renames made outside the library.
    pub fn adopt_disk_name(&mut self, path: PathBuf) -> Result<bool> {
        let path = absolute(&path);
        let decoded = codec::decode(file_name_of(&path)?)?;
        let tags = dedup(decoded.tags);
        let changed = tags != self.tags;
        self.path = path;
        self.tags = tags;
        Ok(changed)
    }

    fn apply_tags(&mut self, tags: Vec<String>, log: &dyn RenameLog) -> RenameOutcome {
        let target = codec::encode(&self.key.untagged, &tags, &self.key.extension);
        let previous = self.base_name().to_string();

        let outcome = self.rename_to(&target, log);
        match &outcome {
            RenameOutcome::Renamed { .. } => {
                self.name_history.push(previous);
                self.tags = tags;
            }
            RenameOutcome::Unchanged => self.tags = tags,
            RenameOutcome::Failed { .. } | RenameOutcome::Rejected(_) => {}
        }
        outcome
    }

    fn rename_to(&mut self, file_name: &str, log: &dyn RenameLog) -> RenameOutcome {
        if codec::split_extension(file_name).is_none() {
            return RenameOutcome::Rejected(format!(
                "'{}' would leave the file without a name",
                file_name
            ));
        }
        let from = self.path.clone();
        let to = from.with_file_name(file_name);
        if to == from {
            return RenameOutcome::Unchanged;
        }

        if to.exists() && !same_file(&from, &to) {
            log::warn!(
                "refusing to rename {}: {} already exists",
                from.display(),
                to.display()
            );
            return RenameOutcome::Failed {
                from,
                to,
                reason: "a different file already has that name".to_string(),
            };
        }

        if let Err(e) = fs::rename(&from, &to) {
            log::warn!("failed to rename {}: {}", from.display(), e);
            return RenameOutcome::Failed {
                from,
                to,
                reason: e.to_string(),
            };
        }

        let old_name = self.file_name().to_string();
        self.path = to.clone();
        log::debug!("renamed {} -> {}", old_name, file_name);
        if let Err(e) = log.record(&old_name, file_name) {
            log::warn!("rename of {} not written to audit log: {}", old_name, e);
        }
        RenameOutcome::Renamed { from, to }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn dedup(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rename_log::MemRenameLog;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, b"img").unwrap();
        path
    }

    #[test]
    fn test_new_parses_tags_from_name() {
        let file = TaggableFile::new("/pics/sunset @beach @beach @trip.jpg").unwrap();
        assert_eq!(file.tags(), ["beach", "trip"]);
        assert_eq!(file.untagged_name(), "sunset");
        assert_eq!(file.extension(), ".jpg");
        assert_eq!(file.original_name(), "sunset.jpg");
        assert!(file.name_history().is_empty());
    }

    #[test]
    fn test_new_rejects_out_of_grammar() {
        assert!(TaggableFile::new("/pics/README").is_err());
        assert!(TaggableFile::new("/pics/.hidden").is_err());
    }

    #[test]
    fn test_add_tag_renames_and_records_history() {
        let dir = TempDir::new().unwrap();
        let log = MemRenameLog::new();
        let mut file = TaggableFile::new(touch(&dir, "vacation.jpg")).unwrap();

        let outcome = file.add_tag("beach", &log);

        assert!(outcome.is_renamed());
        assert_eq!(file.file_name(), "vacation @beach.jpg");
        assert_eq!(file.name_history(), ["vacation"]);
        assert!(dir.path().join("vacation @beach.jpg").exists());
        assert!(!dir.path().join("vacation.jpg").exists());

        let entries = log.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].old_name, "vacation.jpg");
        assert_eq!(entries[0].new_name, "vacation @beach.jpg");
    }

    #[test]
    fn test_add_tag_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let log = MemRenameLog::new();
        let mut file = TaggableFile::new(touch(&dir, "vacation.jpg")).unwrap();

        file.add_tag("beach", &log);
        let second = file.add_tag("beach", &log);

        assert_eq!(second, RenameOutcome::Unchanged);
        assert_eq!(file.tags(), ["beach"]);
        assert_eq!(log.len(), 1);
        assert_eq!(file.name_history().len(), 1);
    }

    #[test]
    fn test_add_tags_uses_one_rename() {
        let dir = TempDir::new().unwrap();
        let log = MemRenameLog::new();
        let mut file = TaggableFile::new(touch(&dir, "vacation.jpg")).unwrap();

        file.add_tags(&["beach", "sunset", "beach"], &log);

        assert_eq!(file.file_name(), "vacation @beach @sunset.jpg");
        assert_eq!(log.len(), 1);
        assert_eq!(file.name_history(), ["vacation"]);
    }

    #[test]
    fn test_remove_tag_rerenders_from_remaining_tags() {
        let dir = TempDir::new().unwrap();
        let log = MemRenameLog::new();
        let mut file = TaggableFile::new(touch(&dir, "vacation @beach @sunset.jpg")).unwrap();

        file.remove_tag("beach", &log);

        assert_eq!(file.file_name(), "vacation @sunset.jpg");
        assert_eq!(file.tags(), ["sunset"]);
        assert_eq!(file.name_history(), ["vacation @beach @sunset"]);
    }

    #[test]
    fn test_remove_absent_tag_heals_drifted_name() {
        let dir = TempDir::new().unwrap();
        let log = MemRenameLog::new();
        let path = touch(&dir, "a @x.jpg");
        let mut file = TaggableFile::new(&path).unwrap();

        // Someone renamed the file behind our back.
        let drifted = dir.path().join("a @x @y.jpg");
        fs::rename(&path, &drifted).unwrap();
        file.path = drifted;

        let outcome = file.remove_tag("nope", &log);

        assert!(outcome.is_renamed());
        assert_eq!(file.file_name(), "a @x.jpg");
        assert!(dir.path().join("a @x.jpg").exists());
    }

    #[test]
    fn test_untagging_a_nameless_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let log = MemRenameLog::new();
        let mut file = TaggableFile::new(touch(&dir, "@beach.jpg")).unwrap();
        assert_eq!(file.untagged_name(), "");

        let outcome = file.remove_tag("beach", &log);

        assert!(matches!(outcome, RenameOutcome::Rejected(_)));
        assert!(!outcome.is_committed());
        assert_eq!(file.tags(), ["beach"]);
        assert!(file.name_history().is_empty());
        assert!(dir.path().join("@beach.jpg").exists());
        assert!(!dir.path().join(".jpg").exists());
        assert!(log.is_empty());
    }

    #[test]
    fn test_relative_paths_are_made_absolute() {
        let cwd = std::env::current_dir().unwrap();
        let key = FileKey::for_path(Path::new("./pics/a @x.jpg")).unwrap();
        assert_eq!(key.dir, cwd.join("pics"));
        assert_eq!(key, FileKey::for_path(&cwd.join("pics").join("a.jpg")).unwrap());

        let file = TaggableFile::new("a.jpg").unwrap();
        assert!(file.path().is_absolute());
        assert_eq!(file.key().dir, cwd);
    }

    #[test]
    fn test_failed_rename_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        let log = MemRenameLog::new();
        let path = touch(&dir, "vacation.jpg");
        let mut file = TaggableFile::new(&path).unwrap();
        fs::remove_file(&path).unwrap();

        let outcome = file.add_tag("beach", &log);

        assert!(outcome.is_failed());
        assert!(file.tags().is_empty());
        assert!(file.name_history().is_empty());
        assert_eq!(file.path(), path.as_path());
        assert!(log.is_empty());
        assert!(outcome.into_result().is_err());
    }

    #[test]
    fn test_rename_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let log = MemRenameLog::new();
        let mut file = TaggableFile::new(touch(&dir, "vacation.jpg")).unwrap();
        touch(&dir, "vacation @beach.jpg");

        let outcome = file.add_tag("beach", &log);

        assert!(outcome.is_failed());
        assert!(dir.path().join("vacation.jpg").exists());
        assert!(file.tags().is_empty());
    }

    #[test]
    fn test_audit_log_failure_does_not_undo_rename() {
        let dir = TempDir::new().unwrap();
        let log = MemRenameLog::new();
        log.set_simulate_write_error(true);
        let mut file = TaggableFile::new(touch(&dir, "vacation.jpg")).unwrap();

        assert!(file.add_tag("beach", &log).is_renamed());
        assert_eq!(file.tags(), ["beach"]);
    }

    #[test]
    fn test_revert_requires_history_membership() {
        let dir = TempDir::new().unwrap();
        let log = MemRenameLog::new();
        let mut file = TaggableFile::new(touch(&dir, "vacation.jpg")).unwrap();

        assert!(matches!(
            file.revert_to_historical_name("something", &log),
            RenameOutcome::Rejected(_)
        ));
        assert!(matches!(
            file.revert_to_historical_name("vacation", &log),
            RenameOutcome::Rejected(_)
        ));
    }

    #[test]
    fn test_revert_rederives_tags_and_grows_history() {
        let dir = TempDir::new().unwrap();
        let log = MemRenameLog::new();
        let mut file = TaggableFile::new(touch(&dir, "vacation.jpg")).unwrap();
        file.add_tag("beach", &log);
        file.add_tag("sunset", &log);

        let outcome = file.revert_to_historical_name("vacation", &log);

        assert!(outcome.is_renamed());
        assert_eq!(file.file_name(), "vacation.jpg");
        assert!(file.tags().is_empty());
        assert_eq!(
            file.name_history(),
            ["vacation", "vacation @beach", "vacation @beach @sunset"]
        );
    }

    #[test]
    fn test_identity_is_stable_under_tagging() {
        let dir = TempDir::new().unwrap();
        let log = MemRenameLog::new();
        let mut file = TaggableFile::new(touch(&dir, "vacation.jpg")).unwrap();
        let before = file.clone();

        file.add_tags(&["a", "b"], &log);
        assert_eq!(file, before);
        file.remove_tag("a", &log);
        assert_eq!(file, before);
        assert_eq!(file.key(), before.key());
    }

    #[test]
    fn test_identity_includes_directory_and_extension() {
        let a = TaggableFile::new("/one/photo.jpg").unwrap();
        let b = TaggableFile::new("/two/photo.jpg").unwrap();
        let c = TaggableFile::new("/one/photo @x.jpg").unwrap();
        let d = TaggableFile::new("/one/photo.png").unwrap();
        assert_ne!(a, b);
        assert_eq!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_move_to_directory() {
        let dir = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let mut file = TaggableFile::new(touch(&dir, "vacation @beach.jpg")).unwrap();

        let outcome = file.move_to_directory(dest.path());

        assert!(outcome.is_renamed());
        assert_eq!(file.path(), dest.path().join("vacation @beach.jpg"));
        assert_eq!(file.key().dir, dest.path());
        assert_eq!(file.tags(), ["beach"]);
    }

    #[test]
    fn test_serde_roundtrip_rederives_key() {
        let dir = TempDir::new().unwrap();
        let log = MemRenameLog::new();
        let mut file = TaggableFile::new(touch(&dir, "vacation.jpg")).unwrap();
        file.add_tag("beach", &log);

        let json = serde_json::to_string(&file).unwrap();
        assert!(!json.contains("untagged"));
        let loaded: TaggableFile = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.key(), file.key());
        assert_eq!(loaded.tags(), file.tags());
        assert_eq!(loaded.name_history(), file.name_history());
    }
}
