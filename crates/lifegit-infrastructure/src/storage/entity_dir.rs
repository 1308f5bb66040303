//! Entity directory storage.
//!
//! Stores one TOML file per entity id under a collection directory:
//!
//! ```text
//! base_dir/
//! └── branches/
//!     ├── <uuid-1>.toml
//!     └── <uuid-2>.toml
//! ```
//!
//! Writes are atomic (tmp file + fsync + rename) and mutations take an
//! exclusive advisory lock on the collection, so a crashed writer can
//! never leave a half-written entity behind.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

/// Errors that can occur during entity storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// File I/O error.
    Io(std::io::Error),
    /// TOML deserialization error.
    Decode(toml::de::Error),
    /// TOML serialization error.
    Encode(toml::ser::Error),
    /// File locking error.
    Lock(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {}", e),
            StorageError::Decode(e) => write!(f, "TOML parse error: {}", e),
            StorageError::Encode(e) => write!(f, "TOML serialization error: {}", e),
            StorageError::Lock(e) => write!(f, "Lock error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<toml::de::Error> for StorageError {
    fn from(e: toml::de::Error) -> Self {
        StorageError::Decode(e)
    }
}

impl From<toml::ser::Error> for StorageError {
    fn from(e: toml::ser::Error) -> Self {
        StorageError::Encode(e)
    }
}

/// An id-keyed collection of TOML-serialized entities on disk.
pub struct EntityDirStorage {
    dir: PathBuf,
}

impl EntityDirStorage {
    /// Creates a storage handle for `<base>/<collection>/`.
    ///
    /// The directory is created lazily on first write.
    pub fn new(base: &Path, collection: &str) -> Self {
        Self {
            dir: base.join(collection),
        }
    }

    /// Loads one entity by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Entity found and parsed
    /// - `Ok(None)`: No file for this id
    /// - `Err`: Failed to read or parse the file
    pub fn load<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>, StorageError> {
        let path = self.entity_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(toml::from_str(&content)?))
    }

    /// Loads every entity in the collection, in directory order.
    pub fn load_all<T: DeserializeOwned>(&self) -> Result<Vec<T>, StorageError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut entities = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "toml") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            entities.push(toml::from_str(&content)?);
        }
        Ok(entities)
    }

    /// Saves an entity atomically under its id.
    pub fn save<T: Serialize>(&self, id: &str, entity: &T) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let _lock = self.acquire_lock()?;

        let toml_string = toml::to_string_pretty(entity)?;
        let path = self.entity_path(id);
        let tmp_path = self.dir.join(format!(".{id}.toml.tmp"));

        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Deletes an entity by id. Deleting a missing entity is not an error.
    pub fn delete(&self, id: &str) -> Result<(), StorageError> {
        let path = self.entity_path(id);
        if !path.exists() {
            return Ok(());
        }
        let _lock = self.acquire_lock()?;
        fs::remove_file(&path)?;
        Ok(())
    }

    fn entity_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.toml"))
    }

    fn acquire_lock(&self) -> Result<CollectionLock, StorageError> {
        CollectionLock::acquire(&self.dir)
    }
}

/// An exclusive advisory lock on a collection directory, released on drop.
struct CollectionLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl CollectionLock {
    fn acquire(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir)?;
        let lock_path = dir.join(".lock");
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| StorageError::Lock(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(CollectionLock { file, lock_path })
    }
}

impl Drop for CollectionLock {
    fn drop(&mut self) {
        // Unlock is automatic when the file handle is dropped.
        let _ = fs::remove_file(&self.lock_path);
    }
}
