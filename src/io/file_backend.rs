//! File-backed document storage
//!
//! Each document key maps to `<dir>/<key>.json`. Writes go to a temporary file in
//! the same directory which is then renamed over the target, so a crash mid-write
//! leaves either the old or the new document on disk.

use crate::core::traits::StorageBackend;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Stores documents as JSON files in one directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `dir`
    ///
    /// The directory is created on first write if it does not exist.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        FileBackend {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{}.json.tmp", key))
    }
}

impl StorageBackend for FileBackend {
    fn read(&mut self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, key: &str, contents: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let temp_path = self.temp_path_for(key);
        let mut file = File::create(&temp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, self.path_for(key))
    }
}
