use super::{decode_files, decode_tags, encode_files, encode_tags, PersistenceStore};
use super::{RestoredFiles, FILES_BLOB, TAGS_BLOB};
use crate::error::{NametagError, Result};
use crate::file::TaggableFile;
use crate::tags::Tag;
use std::cell::RefCell;

/// In-memory store for testing.
///
/// Keeps the serialized JSON rather than the values, so tests exercise the
/// same encoding as [`FsStore`](super::fs::FsStore) and can plant corrupt
/// blobs. Uses `RefCell` since the library is single-threaded.
#[derive(Default)]
pub struct MemStore {
    files: RefCell<Option<String>>,
    tags: RefCell<Option<String>>,
    simulate_write_error: RefCell<bool>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Replace the raw image blob, e.g. with corrupt data.
    pub fn set_raw_files(&self, raw: &str) {
        *self.files.borrow_mut() = Some(raw.to_string());
    }

    /// Replace the raw tag blob, e.g. with corrupt data.
    pub fn set_raw_tags(&self, raw: &str) {
        *self.tags.borrow_mut() = Some(raw.to_string());
    }

    pub fn raw_files(&self) -> Option<String> {
        self.files.borrow().clone()
    }

    pub fn raw_tags(&self) -> Option<String> {
        self.tags.borrow().clone()
    }

    fn check_writable(&self, what: &'static str) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(NametagError::PersistenceWrite {
                what,
                reason: "Simulated write error".to_string(),
            });
        }
        Ok(())
    }
}

impl PersistenceStore for MemStore {
    fn load_files(&self) -> Result<RestoredFiles> {
        match self.files.borrow().as_deref() {
            Some(raw) => decode_files(raw),
            None => Ok(RestoredFiles::default()),
        }
    }

    fn save_files(&self, files: &[TaggableFile]) -> Result<()> {
        self.check_writable(FILES_BLOB)?;
        *self.files.borrow_mut() = Some(encode_files(files)?);
        Ok(())
    }

    fn load_tags(&self) -> Result<Vec<Tag>> {
        match self.tags.borrow().as_deref() {
            Some(raw) => decode_tags(raw),
            None => Ok(Vec::new()),
        }
    }

    fn save_tags(&self, tags: &[Tag]) -> Result<()> {
        self.check_writable(TAGS_BLOB)?;
        *self.tags.borrow_mut() = Some(encode_tags(tags)?);
        Ok(())
    }
}
