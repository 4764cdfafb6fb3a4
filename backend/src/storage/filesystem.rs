//! Blob store that maps keys to files under a root directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use super::BlobStore;
use crate::errors::AppError;

/// Marker in the file names of in-flight writes.
const TEMP_MARKER: &str = ".tmp-";

/// Blob store rooted at a local directory.
///
/// The key `history/2026/10/17/updates.json` lives at
/// `<root>/history/2026/10/17/updates.json`. Writes go to a sibling temp
/// file that is renamed over the target, so readers see either the old or
/// the new body.
pub struct FilesystemBlobStore {
    root: PathBuf,
}

impl FilesystemBlobStore {
    /// Open (and create if needed) the root directory.
    pub async fn open(root: &Path) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(root).await?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let mut path = self.root.clone();
        for segment in key.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return Err(AppError::Storage(format!("Invalid blob key: {}", key)));
            }
            path.push(segment);
        }
        Ok(path)
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    fn backend_tag(&self) -> &'static str {
        "filesystem"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(format!("{}{}", TEMP_MARKER, Uuid::new_v4().simple()));
        let temp_path = path.with_file_name(temp_name);

        tokio::fs::write(&temp_path, body).await?;
        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let mut keys = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                    continue;
                }

                if entry.file_name().to_string_lossy().contains(TEMP_MARKER) {
                    continue;
                }
                let Ok(relative) = path.strip_prefix(&self.root) else {
                    continue;
                };
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_round_trip_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = FilesystemBlobStore::open(temp_dir.path()).await.unwrap();

        store
            .put("history/2026/10/17/updates.json", b"[]".to_vec())
            .await
            .unwrap();

        assert!(temp_dir
            .path()
            .join("history/2026/10/17/updates.json")
            .exists());
        assert_eq!(
            store.get("history/2026/10/17/updates.json").await.unwrap(),
            Some(b"[]".to_vec())
        );
        assert!(store.get("current-status.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_walks_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = FilesystemBlobStore::open(temp_dir.path()).await.unwrap();

        store.put("current-status.json", b"{}".to_vec()).await.unwrap();
        store
            .put("history/2026/11/01/updates.json", b"[]".to_vec())
            .await
            .unwrap();
        store
            .put("history/2026/10/31/updates.json", b"[]".to_vec())
            .await
            .unwrap();

        let keys = store.list("history/").await.unwrap();
        assert_eq!(
            keys,
            vec![
                "history/2026/10/31/updates.json".to_string(),
                "history/2026/11/01/updates.json".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_skips_in_flight_writes() {
        let temp_dir = TempDir::new().unwrap();
        let store = FilesystemBlobStore::open(temp_dir.path()).await.unwrap();

        store.put("current-status.json", b"{}".to_vec()).await.unwrap();
        std::fs::write(
            temp_dir.path().join("current-status.json.tmp-0123abcd"),
            b"{",
        )
        .unwrap();

        assert_eq!(
            store.list("").await.unwrap(),
            vec!["current-status.json".to_string()]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reads_never_see_partial_writes() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FilesystemBlobStore::open(temp_dir.path()).await.unwrap());

        let body = |round: usize| -> Vec<u8> {
            serde_json::to_vec(&vec![round; 20_000]).unwrap()
        };
        store.put("current-status.json", body(0)).await.unwrap();

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for round in 1..=100 {
                    store.put("current-status.json", body(round)).await.unwrap();
                }
            })
        };

        loop {
            let done = writer.is_finished();
            let raw = store.get("current-status.json").await.unwrap().unwrap();
            let values: Vec<usize> = serde_json::from_slice(&raw).unwrap();
            assert_eq!(values.len(), 20_000);
            assert!(values.iter().all(|&v| v == values[0]));
            if done {
                break;
            }
        }
        writer.await.unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(TEMP_MARKER))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FilesystemBlobStore::open(temp_dir.path()).await.unwrap();

        let err = store.put("../outside.json", vec![]).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert!(store.get("history//updates.json").await.is_err());
    }
}
