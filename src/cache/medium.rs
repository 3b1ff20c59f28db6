// Durable key/value media backing the cache store.
// File-backed for normal runs, in-memory for tests and when no cache dir exists.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::error::{DocsError, Result};

/// Characters that cannot appear in a cache file name. `%` is escaped so the mapping stays one-to-one.
const KEY_RESERVED: &AsciiSet = &CONTROLS
    .add(b'/')
    .add(b'\\')
    .add(b':')
    .add(b'*')
    .add(b'?')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'|')
    .add(b' ')
    .add(b'%');

/// A persistent string key/value store with no expiry of its own.
pub trait CacheMedium: Send {
    /// Read a value. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// One file per key inside a cache directory.
#[derive(Debug, Clone)]
pub struct FileMedium {
    dir: PathBuf,
}

impl FileMedium {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.txt", sanitize_key(key)))
    }
}

impl CacheMedium for FileMedium {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(&path, e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        write_atomic(&path, value).map_err(|e| storage_error(&path, e))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(&path, e)),
        }
    }
}

/// Volatile medium used when no durable location is available.
#[derive(Debug, Clone, Default)]
pub struct MemoryMedium {
    entries: HashMap<String, String>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheMedium for MemoryMedium {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Write text via a temp file and rename so readers never see partial data.
fn write_atomic(path: &Path, text: &str) -> io::Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(text.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

fn storage_error(path: &Path, e: io::Error) -> DocsError {
    DocsError::StorageUnavailable(format!("{}: {}", path.display(), e))
}

/// Map a cache key onto a safe file name. Distinct keys give distinct names.
fn sanitize_key(key: &str) -> String {
    utf8_percent_encode(key, KEY_RESERVED).to_string()
}
