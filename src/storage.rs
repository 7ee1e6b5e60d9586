//! Durable document storage for the vector index.
//!
//! A `DocumentStore` is a namespaced key/bytes store; the index keeps two
//! documents in it (metadata and data). The file-backed implementation maps
//! one namespace to one directory and one key to one JSON file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::core::errors::RagError;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads a document. A missing key is `Ok(None)`, not an error.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, RagError>;

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), RagError>;

    /// Removes a document. Deleting a missing key is a no-op.
    async fn delete(&self, key: &str) -> Result<(), RagError>;
}

pub struct FileDocumentStore {
    dir: PathBuf,
}

impl FileDocumentStore {
    pub fn new(root: &Path, namespace: &str) -> Self {
        Self {
            dir: root.join(namespace),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, RagError> {
        match fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(RagError::persistence(err)),
        }
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), RagError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(RagError::persistence)?;
        fs::write(self.path_for(key), bytes)
            .await
            .map_err(RagError::persistence)
    }

    async fn delete(&self, key: &str) -> Result<(), RagError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(RagError::persistence(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_read_delete_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::new(tmp.path(), "test_ns");

        assert!(store.read("metadata").await.unwrap().is_none());

        store.write("metadata", b"{\"a\":1}").await.unwrap();
        let bytes = store.read("metadata").await.unwrap().unwrap();
        assert_eq!(bytes, b"{\"a\":1}");

        store.delete("metadata").await.unwrap();
        assert!(store.read("metadata").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_key_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::new(tmp.path(), "test_ns");
        store.delete("never_written").await.unwrap();
    }

    #[tokio::test]
    async fn namespaces_do_not_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let a = FileDocumentStore::new(tmp.path(), "a");
        let b = FileDocumentStore::new(tmp.path(), "b");

        a.write("data", b"from-a").await.unwrap();
        assert!(b.read("data").await.unwrap().is_none());
    }
}
