use crate::library::Library;
use crate::rename_log::MemRenameLog;
use crate::store::memory::MemStore;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub type TestLibrary = Library<MemStore, MemRenameLog>;

/// A temp image directory plus an in-memory library.
pub struct TestEnv {
    // Kept so the directory outlives the test.
    pub _temp_dir: TempDir,
    pub root: PathBuf,
    pub lib: TestLibrary,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
            lib: Library::open(MemStore::new(), MemRenameLog::new()),
        }
    }

    /// Creates an image file and returns its path.
    pub fn touch(&self, name: &str) -> PathBuf {
        let path = self.root.join(name);
        fs::write(&path, b"img").expect("failed to write test image");
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Loads every file currently in the root, sorted by name.
    pub fn load(&mut self) {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.root)
            .expect("failed to read temp dir")
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        paths.sort();
        self.lib.load_directory(&paths);
    }

    /// Creates the tags, then the files, then loads the directory.
    pub fn with(tags: &[&str], files: &[&str]) -> Self {
        let mut env = Self::new();
        for tag in tags {
            env.lib.create_tag(tag).expect("invalid test tag");
        }
        for file in files {
            env.touch(file);
        }
        env.load();
        env
    }
}
