//! In-memory `MediaStore`.

use std::sync::Mutex;

use async_trait::async_trait;
use dreamdirector_core::error::DomainError;
use dreamdirector_core::media::{MediaKind, MediaStore};

/// Keeps saved files in memory and names them `{prefix}{n}.{ext}`.
#[derive(Debug, Default)]
pub struct InMemoryMediaStore {
    files: Mutex<Vec<(MediaKind, String, Vec<u8>)>>,
}

impl InMemoryMediaStore {
    /// Names of every saved file, in save order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved(&self) -> Vec<(MediaKind, String)> {
        self.files
            .lock()
            .unwrap()
            .iter()
            .map(|(kind, name, _)| (*kind, name.clone()))
            .collect()
    }

    /// Count of saved files of `kind`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn count(&self, kind: MediaKind) -> usize {
        self.files
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _, _)| *k == kind)
            .count()
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn save(
        &self,
        kind: MediaKind,
        _label: &str,
        bytes: &[u8],
    ) -> Result<String, DomainError> {
        let mut files = self.files.lock().unwrap();
        let name = format!("{}{}.{}", kind.file_prefix(), files.len() + 1, kind.extension());
        files.push((kind, name.clone(), bytes.to_vec()));
        Ok(name)
    }

    async fn list(&self, kind: MediaKind) -> Result<Vec<String>, DomainError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _, _)| *k == kind)
            .map(|(_, name, _)| name.clone())
            .collect())
    }
}
