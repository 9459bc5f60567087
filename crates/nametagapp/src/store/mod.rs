//! # Persistence Layer
//!
//! Only two things outlive a session:
//! 1. The **ever-tagged files**: every file that has held a tag, with its
//!    path, tags, and name history.
//! 2. The **tag table**.
//!
//! The working set is never persisted; it is rebuilt from disk every time a
//! directory is loaded.
//!
//! ## Philosophy
//!
//! - **Names are Truth**: if a stored record disagrees with the file name on
//!   disk, the file name wins on the next directory load.
//! - **Full Overwrite**: every flush rewrites both blobs in full. Each blob is
//!   written atomically (tmp file + rename), but the pair is not a
//!   transaction. A crash between the two writes is repaired on the next
//!   open, because dangling tag names are re-registered from file records.
//! - **Degraded Start**: a missing blob is an empty blob. A corrupt or
//!   future-versioned blob is a read error, which the library turns into an
//!   empty start plus a warning. A single unreadable file record is skipped
//!   on its own; the rest of the image store still loads.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//! ├── images.json   # { "version": 1, "files": [ { path, tags, name_history } ] }
//! └── tags.json     # { "version": 1, "tags": [ { name, created_at } ] }
//! ```
//!
//! ## Implementations
//!
//! - [`fs::FsStore`]: Production JSON store.
//! - [`memory::MemStore`]: For testing logic without filesystem I/O.

use crate::error::{NametagError, Result};
use crate::file::TaggableFile;
use crate::tags::Tag;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub mod fs;
pub mod memory;

/// Version written into both blobs.
pub const SCHEMA_VERSION: u32 = 1;

pub const FILES_BLOB: &str = "image store";
pub const TAGS_BLOB: &str = "tag store";

/// Tracked files read back from the image store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoredFiles {
    pub files: Vec<TaggableFile>,
    /// One message per record that could not be restored.
    pub skipped: Vec<String>,
}

/// Abstract interface for the two persisted blobs.
///
/// `load_*` returns an empty collection when nothing was saved yet.
pub trait PersistenceStore {
    fn load_files(&self) -> Result<RestoredFiles>;

    fn save_files(&self, files: &[TaggableFile]) -> Result<()>;

    fn load_tags(&self) -> Result<Vec<Tag>>;

    fn save_tags(&self, tags: &[Tag]) -> Result<()>;
}

#[derive(Serialize)]
struct FilesOut<'a> {
    version: u32,
    files: &'a [TaggableFile],
}

#[derive(Deserialize)]
struct FilesIn {
    #[serde(default)]
    files: Vec<serde_json::Value>,
}

#[derive(Serialize)]
struct TagsOut<'a> {
    version: u32,
    tags: &'a [Tag],
}

#[derive(Deserialize)]
struct TagsIn {
    #[serde(default)]
    tags: Vec<Tag>,
}

pub fn encode_files(files: &[TaggableFile]) -> Result<String> {
    let blob = FilesOut {
        version: SCHEMA_VERSION,
        files,
    };
    Ok(serde_json::to_string_pretty(&blob)?)
}

/// Decodes the image store record by record.
///
/// The blob as a whole must be valid JSON with the current version. Records
/// that fail to convert are skipped and reported in
/// [`RestoredFiles::skipped`].
pub fn decode_files(raw: &str) -> Result<RestoredFiles> {
    let blob: FilesIn = decode_versioned(raw, FILES_BLOB)?;
    let mut restored = RestoredFiles::default();
    for (i, record) in blob.files.into_iter().enumerate() {
        match serde_json::from_value::<TaggableFile>(record) {
            Ok(file) => restored.files.push(file),
            Err(e) => {
                log::warn!("skipping {} record {}: {}", FILES_BLOB, i, e);
                restored
                    .skipped
                    .push(format!("{} record {} skipped: {}", FILES_BLOB, i, e));
            }
        }
    }
    Ok(restored)
}

pub fn encode_tags(tags: &[Tag]) -> Result<String> {
    let blob = TagsOut {
        version: SCHEMA_VERSION,
        tags,
    };
    Ok(serde_json::to_string_pretty(&blob)?)
}

pub fn decode_tags(raw: &str) -> Result<Vec<Tag>> {
    let blob: TagsIn = decode_versioned(raw, TAGS_BLOB)?;
    Ok(blob.tags)
}

fn decode_versioned<T: DeserializeOwned>(raw: &str, what: &'static str) -> Result<T> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| NametagError::PersistenceRead {
            what,
            reason: e.to_string(),
        })?;

    let found = value
        .get("version")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| NametagError::PersistenceRead {
            what,
            reason: "missing schema version".to_string(),
        })?;
    if found != u64::from(SCHEMA_VERSION) {
        return Err(NametagError::UnsupportedVersion {
            what,
            found: u32::try_from(found).unwrap_or(u32::MAX),
            expected: SCHEMA_VERSION,
        });
    }

    serde_json::from_value(value).map_err(|e| NametagError::PersistenceRead {
        what,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_blobs_carry_version() {
        let raw = encode_tags(&[Tag::new("beach")]).unwrap();
        assert!(raw.contains("\"version\": 1"));
        assert_eq!(decode_tags(&raw).unwrap()[0].name, "beach");
    }

    #[test]
    fn test_decode_rejects_other_versions() {
        let raw = r#"{ "version": 7, "tags": [] }"#;
        assert!(matches!(
            decode_tags(raw),
            Err(NametagError::UnsupportedVersion { found: 7, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_unversioned() {
        assert!(matches!(
            decode_files(r#"{ "files": [] }"#),
            Err(NametagError::PersistenceRead { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_files("\u{0}\u{1}not json"),
            Err(NametagError::PersistenceRead { .. })
        ));
    }

    #[test]
    fn test_files_roundtrip() {
        let file = TaggableFile::new("/pics/vacation @beach.jpg").unwrap();
        let raw = encode_files(std::slice::from_ref(&file)).unwrap();
        let loaded = decode_files(&raw).unwrap();
        assert!(loaded.skipped.is_empty());
        assert_eq!(loaded.files, vec![file]);
        assert_eq!(loaded.files[0].tags(), ["beach"]);
    }

    #[test]
    fn test_bad_record_does_not_discard_the_rest() {
        let raw = r#"{
            "version": 1,
            "files": [
                { "path": "/pics/vacation @beach.jpg", "tags": ["beach"], "name_history": ["vacation"] },
                { "path": "/pics/.jpg", "tags": [], "name_history": ["@beach"] },
                { "tags": ["orphan"] }
            ]
        }"#;
        let loaded = decode_files(raw).unwrap();
        assert_eq!(loaded.files.len(), 1);
        assert_eq!(loaded.files[0].name_history(), ["vacation"]);
        assert_eq!(loaded.skipped.len(), 2);
        assert!(loaded.skipped[0].contains("record 1"));
        assert!(loaded.skipped[1].contains("record 2"));
    }
}
