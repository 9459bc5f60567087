use super::{decode_files, decode_tags, encode_files, encode_tags, PersistenceStore};
use super::{RestoredFiles, FILES_BLOB, TAGS_BLOB};
use crate::error::{NametagError, Result};
use crate::file::TaggableFile;
use crate::tags::Tag;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const FILES_NAME: &str = "images.json";
const TAGS_NAME: &str = "tags.json";

/// JSON store rooted at the configured data directory.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files_path(&self) -> PathBuf {
        self.root.join(FILES_NAME)
    }

    pub fn tags_path(&self) -> PathBuf {
        self.root.join(TAGS_NAME)
    }

    fn read(&self, path: &Path, what: &'static str) -> Result<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(path)
            .map(Some)
            .map_err(|e| NametagError::PersistenceRead {
                what,
                reason: e.to_string(),
            })
    }

    /// Atomic write: tmp file in the same directory, then rename over.
    fn write(&self, name: &str, content: &str, what: &'static str) -> Result<()> {
        let wrap = |e: std::io::Error| NametagError::PersistenceWrite {
            what,
            reason: e.to_string(),
        };

        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(wrap)?;
        }
        let tmp = self.root.join(format!(".{}-{}.tmp", name, Uuid::new_v4()));
        fs::write(&tmp, content).map_err(wrap)?;
        fs::rename(&tmp, self.root.join(name)).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            wrap(e)
        })
    }
}

impl PersistenceStore for FsStore {
    fn load_files(&self) -> Result<RestoredFiles> {
        match self.read(&self.files_path(), FILES_BLOB)? {
            Some(raw) => decode_files(&raw),
            None => Ok(RestoredFiles::default()),
        }
    }

    fn save_files(&self, files: &[TaggableFile]) -> Result<()> {
        self.write(FILES_NAME, &encode_files(files)?, FILES_BLOB)
    }

    fn load_tags(&self) -> Result<Vec<Tag>> {
        match self.read(&self.tags_path(), TAGS_BLOB)? {
            Some(raw) => decode_tags(&raw),
            None => Ok(Vec::new()),
        }
    }

    fn save_tags(&self, tags: &[Tag]) -> Result<()> {
        self.write(TAGS_NAME, &encode_tags(tags)?, TAGS_BLOB)
    }
}
