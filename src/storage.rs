//! Durable bucket backends for the state store.
//!
//! A bucket is a named string payload (serialized JSON). Backends only
//! move whole payloads; merge semantics live in [`crate::store`].

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::errors::RephraseError;
use crate::types::BucketName;

/// Whole-bucket persistence port.
///
/// `load_bucket` distinguishes "absent" (`Ok(None)`) from backend
/// failure; callers treat absent buckets as empty.
pub trait StorageBackend: Send + Sync {
    /// Read a bucket payload, `None` when the bucket does not exist.
    fn load_bucket(&self, bucket: &str) -> Result<Option<String>, RephraseError>;
    /// Write a bucket payload, replacing any previous content.
    fn save_bucket(&self, bucket: &str, payload: &str) -> Result<(), RephraseError>;
    /// Delete a bucket; deleting a missing bucket is not an error.
    fn remove_bucket(&self, bucket: &str) -> Result<(), RephraseError>;
}

/// In-memory backend for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    buckets: RwLock<HashMap<BucketName, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn load_bucket(&self, bucket: &str) -> Result<Option<String>, RephraseError> {
        let buckets = self
            .buckets
            .read()
            .map_err(|_| RephraseError::Storage("bucket lock poisoned".into()))?;
        Ok(buckets.get(bucket).cloned())
    }

    fn save_bucket(&self, bucket: &str, payload: &str) -> Result<(), RephraseError> {
        let mut buckets = self
            .buckets
            .write()
            .map_err(|_| RephraseError::Storage("bucket lock poisoned".into()))?;
        buckets.insert(bucket.to_string(), payload.to_string());
        Ok(())
    }

    fn remove_bucket(&self, bucket: &str) -> Result<(), RephraseError> {
        let mut buckets = self
            .buckets
            .write()
            .map_err(|_| RephraseError::Storage("bucket lock poisoned".into()))?;
        buckets.remove(bucket);
        Ok(())
    }
}

/// Filesystem backend: one `<bucket>.json` file per bucket under a root
/// directory.
#[derive(Debug)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open a storage root, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, RephraseError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn bucket_path(&self, bucket: &str) -> PathBuf {
        self.root.join(format!("{bucket}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn load_bucket(&self, bucket: &str) -> Result<Option<String>, RephraseError> {
        match fs::read_to_string(self.bucket_path(bucket)) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save_bucket(&self, bucket: &str, payload: &str) -> Result<(), RephraseError> {
        fs::write(self.bucket_path(bucket), payload)?;
        Ok(())
    }

    fn remove_bucket(&self, bucket: &str) -> Result<(), RephraseError> {
        match fs::remove_file(self.bucket_path(bucket)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_round_trip_and_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.load_bucket("b").unwrap(), None);
        storage.save_bucket("b", "{\"x\":1}").unwrap();
        assert_eq!(storage.load_bucket("b").unwrap().as_deref(), Some("{\"x\":1}"));
        storage.save_bucket("b", "{}").unwrap();
        assert_eq!(storage.load_bucket("b").unwrap().as_deref(), Some("{}"));
        storage.remove_bucket("b").unwrap();
        assert_eq!(storage.load_bucket("b").unwrap(), None);
        storage.remove_bucket("b").unwrap();
    }

    #[test]
    fn file_round_trip_and_missing_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("state")).unwrap();
        assert_eq!(storage.load_bucket("panel").unwrap(), None);
        storage.save_bucket("panel", "{\"open\":true}").unwrap();
        assert_eq!(
            storage.load_bucket("panel").unwrap().as_deref(),
            Some("{\"open\":true}")
        );
        assert!(dir.path().join("state").join("panel.json").is_file());
        storage.remove_bucket("panel").unwrap();
        assert_eq!(storage.load_bucket("panel").unwrap(), None);
        storage.remove_bucket("panel").unwrap();
    }

    #[test]
    fn reopening_a_root_sees_existing_buckets() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = FileStorage::open(dir.path()).unwrap();
            storage.save_bucket("zoom", "1.5").unwrap();
        }
        let storage = FileStorage::open(dir.path()).unwrap();
        assert_eq!(storage.load_bucket("zoom").unwrap().as_deref(), Some("1.5"));
    }
}
