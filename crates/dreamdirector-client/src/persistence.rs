//! Saving the store snapshot between runs.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::store::Snapshot;

/// Fixed key the snapshot is stored under.
pub const STATE_KEY: &str = "dreamdirector-state";

/// Where snapshots are kept.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// The saved snapshot, if any.
    async fn load(&self) -> Result<Option<Snapshot>, ClientError>;

    /// Replaces the saved snapshot.
    async fn save(&self, snapshot: &Snapshot) -> Result<(), ClientError>;

    /// Removes the saved snapshot.
    async fn clear(&self) -> Result<(), ClientError>;
}

/// A JSON file named after [`STATE_KEY`] inside a directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Snapshots live in `dir`, created on first save.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STATE_KEY}.json")),
        }
    }

    /// Location of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn io_error(action: &'static str) -> impl FnOnce(std::io::Error) -> ClientError {
    move |source| ClientError::Persistence { action, source }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self) -> Result<Option<Snapshot>, ClientError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("read")(e)),
        }
    }

    #[tracing::instrument(skip(self, snapshot), fields(path = %self.path.display()))]
    async fn save(&self, snapshot: &Snapshot) -> Result<(), ClientError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(io_error("create directory"))?;
        }
        let json = serde_json::to_vec_pretty(snapshot)?;
        let temp = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp, json)
            .await
            .map_err(io_error("write"))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(io_error("rename"))?;
        tracing::debug!("snapshot saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("remove")(e)),
        }
    }
}

/// Keeps the serialized snapshot in memory.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    saved: Mutex<Option<String>>,
}

impl MemorySnapshotStore {
    /// The raw JSON last saved.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> Result<Option<Snapshot>, ClientError> {
        let saved = self.saved.lock().map(|s| s.clone()).unwrap_or_default();
        saved
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(ClientError::from)
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), ClientError> {
        let json = serde_json::to_string(snapshot)?;
        if let Ok(mut saved) = self.saved.lock() {
            *saved = Some(json);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        if let Ok(mut saved) = self.saved.lock() {
            *saved = None;
        }
        Ok(())
    }
}
