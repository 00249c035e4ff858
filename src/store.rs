//! Where snapshot text lives.
//!
//! The engine only needs four things from storage: read the canonical
//! snapshot, replace it atomically, move a bad snapshot aside, and forget it.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::error::StoreError;

pub trait SnapshotStore {
    /// Current snapshot text, or `None` when nothing was ever saved.
    /// Bytes that are not text come back as [`StoreError::Corrupt`].
    fn read(&mut self) -> Result<Option<String>, StoreError>;

    /// Replace the snapshot. On failure the previous snapshot is intact.
    fn write_atomic(&mut self, contents: &str) -> Result<(), StoreError>;

    /// Move the current snapshot out of the canonical slot, replacing any
    /// older backup. Returns where it went, or `None` if there was nothing.
    fn quarantine(&mut self) -> Result<Option<String>, StoreError>;

    /// Delete the snapshot. Missing snapshots are not an error.
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// Snapshot file on disk, replaced via `<path>.tmp` + rename.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn temp_path(&self) -> PathBuf {
        with_suffix(&self.path, ".tmp")
    }

    pub fn backup_path(&self) -> PathBuf {
        with_suffix(&self.path, ".bak")
    }
}

impl SnapshotStore for FileStore {
    fn read(&mut self) -> Result<Option<String>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn write_atomic(&mut self, contents: &str) -> Result<(), StoreError> {
        let tmp = self.temp_path();
        let result = (|| -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)
        })();
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn quarantine(&mut self) -> Result<Option<String>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let backup = self.backup_path();
        match fs::remove_file(&backup) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::rename(&self.path, &backup)?;
        Ok(Some(backup.display().to_string()))
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store for tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub contents: Option<String>,
    pub backup: Option<String>,
    /// Make every write fail, leaving `contents` untouched.
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
            ..Self::default()
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&mut self) -> Result<Option<String>, StoreError> {
        Ok(self.contents.clone())
    }

    fn write_atomic(&mut self, contents: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Backend("writes disabled".to_string()));
        }
        self.contents = Some(contents.to_string());
        Ok(())
    }

    fn quarantine(&mut self) -> Result<Option<String>, StoreError> {
        match self.contents.take() {
            Some(contents) => {
                self.backup = Some(contents);
                Ok(Some("memory backup".to_string()))
            }
            None => Ok(None),
        }
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.contents = None;
        Ok(())
    }
}

/// Browser `localStorage` under a fixed key. A single `setItem` is atomic.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn backup_key(&self) -> String {
        format!("{}.bak", self.key)
    }

    fn storage() -> Result<web_sys::Storage, StoreError> {
        let window =
            web_sys::window().ok_or_else(|| StoreError::Backend("no window".to_string()))?;
        window
            .local_storage()
            .map_err(|e| StoreError::Backend(format!("{e:?}")))?
            .ok_or_else(|| StoreError::Backend("localStorage unavailable".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl SnapshotStore for LocalStorageStore {
    fn read(&mut self) -> Result<Option<String>, StoreError> {
        Self::storage()?
            .get_item(&self.key)
            .map_err(|e| StoreError::Backend(format!("{e:?}")))
    }

    fn write_atomic(&mut self, contents: &str) -> Result<(), StoreError> {
        Self::storage()?
            .set_item(&self.key, contents)
            .map_err(|e| StoreError::Backend(format!("{e:?}")))
    }

    fn quarantine(&mut self) -> Result<Option<String>, StoreError> {
        let storage = Self::storage()?;
        let current = storage
            .get_item(&self.key)
            .map_err(|e| StoreError::Backend(format!("{e:?}")))?;
        let Some(contents) = current else {
            return Ok(None);
        };
        let backup_key = self.backup_key();
        storage
            .set_item(&backup_key, &contents)
            .map_err(|e| StoreError::Backend(format!("{e:?}")))?;
        storage
            .remove_item(&self.key)
            .map_err(|e| StoreError::Backend(format!("{e:?}")))?;
        Ok(Some(backup_key))
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        Self::storage()?
            .remove_item(&self.key)
            .map_err(|e| StoreError::Backend(format!("{e:?}")))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    static NEXT_DIR: AtomicU32 = AtomicU32::new(0);

    /// Fresh empty directory under the system temp dir.
    pub fn scratch_dir(label: &str) -> PathBuf {
        let n = NEXT_DIR.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "idle_gold_{label}_{}_{n}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
