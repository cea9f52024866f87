//! Filesystem media library.
//!
//! New files land in the output directory as
//! `generated_scene_{stamp}.png`, `generated_video_{stamp}.mp4` or
//! `lyria_final_{label}_{stamp}.wav`. Writes go to a hidden temp file first
//! and are renamed into place, so a listing never sees half a file. Listing
//! and serving also consult the extra search directories, which lets the
//! service pick up media written by earlier deployments.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dreamdirector_core::clock::Clock;
use dreamdirector_core::error::DomainError;
use dreamdirector_core::media::{MediaKind, MediaStore};
use tokio::sync::Mutex;

use crate::error::MediaError;

/// Longest label kept in a music file name.
const MAX_LABEL_LEN: usize = 24;

/// A file found in the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    /// Absolute or configured path of the file.
    pub path: PathBuf,
    /// Content type derived from the extension.
    pub content_type: &'static str,
}

/// Content type served for a file name.
#[must_use]
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

/// Generated media on disk.
pub struct MediaLibrary {
    output_dir: PathBuf,
    search_dirs: Vec<PathBuf>,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for MediaLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaLibrary")
            .field("output_dir", &self.output_dir)
            .field("search_dirs", &self.search_dirs)
            .finish_non_exhaustive()
    }
}

impl MediaLibrary {
    /// Opens the library, creating `output_dir` if needed. `search_dirs`
    /// are consulted after the output directory; duplicates are dropped.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Io` if the output directory cannot be created.
    pub fn open(
        output_dir: impl AsRef<Path>,
        search_dirs: impl IntoIterator<Item = PathBuf>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, MediaError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .map_err(|e| MediaError::io("create directory", &output_dir, e))?;

        let mut dirs = Vec::new();
        for dir in search_dirs {
            if dir != output_dir && !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        tracing::info!(
            output_dir = %output_dir.display(),
            search_dirs = dirs.len(),
            "opened media library"
        );
        Ok(Self {
            output_dir,
            search_dirs: dirs,
            clock,
            write_lock: Mutex::new(()),
        })
    }

    /// Where new files are written.
    #[must_use]
    pub fn media_directory(&self) -> &Path {
        &self.output_dir
    }

    fn directories(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.output_dir.as_path())
            .chain(self.search_dirs.iter().map(PathBuf::as_path))
    }

    /// File name for a new file of `kind`, before collision handling.
    #[must_use]
    pub fn file_name(kind: MediaKind, label: &str, stamp: &str) -> String {
        match kind {
            MediaKind::Music => format!(
                "{}{}_{stamp}.{}",
                kind.file_prefix(),
                sanitize_label(label),
                kind.extension()
            ),
            _ => format!("{}{stamp}.{}", kind.file_prefix(), kind.extension()),
        }
    }

    /// Writes `bytes` as a new file and returns its name. A name already
    /// taken gets a three-digit suffix (`_002`, `_003`, ...) so names still
    /// sort in write order.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Io` if the file cannot be written.
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn write(
        &self,
        kind: MediaKind,
        label: &str,
        bytes: &[u8],
    ) -> Result<String, MediaError> {
        let _guard = self.write_lock.lock().await;

        let base = Self::file_name(kind, label, &self.clock.file_stamp());
        let mut name = base.clone();
        let mut n = 2;
        while self.exists_anywhere(&name).await {
            let (stem, ext) = base.rsplit_once('.').unwrap_or((base.as_str(), ""));
            name = format!("{stem}_{n:03}.{ext}");
            n += 1;
        }

        let path = self.output_dir.join(&name);
        let temp_path = self.output_dir.join(format!(".{name}.tmp"));
        tokio::fs::write(&temp_path, bytes)
            .await
            .map_err(|e| MediaError::io("write", &temp_path, e))?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| MediaError::io("rename", &path, e))?;

        tracing::info!(filename = %name, %kind, "stored media file");
        Ok(name)
    }

    async fn exists_anywhere(&self, name: &str) -> bool {
        for dir in self.directories() {
            if tokio::fs::try_exists(dir.join(name)).await.unwrap_or(false) {
                return true;
            }
        }
        false
    }

    /// Generated files of `kind` across every directory, deduplicated and
    /// ordered by name. Missing directories are skipped.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Io` if an existing directory cannot be read.
    pub async fn files(&self, kind: MediaKind) -> Result<Vec<String>, MediaError> {
        let mut names = BTreeSet::new();
        for dir in self.directories() {
            let mut entries = match tokio::fs::read_dir(dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(MediaError::io("read directory", dir, e)),
            };
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| MediaError::io("read directory", dir, e))?
            {
                let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                    continue;
                };
                if MediaKind::from_filename(&name) == Some(kind) {
                    names.insert(name);
                }
            }
        }
        Ok(names.into_iter().collect())
    }

    /// Finds `filename` in the first directory holding it.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::InvalidFilename` for anything but a bare file
    /// name, and `MediaError::NotFound` if no directory holds it.
    pub async fn resolve(&self, filename: &str) -> Result<ResolvedMedia, MediaError> {
        validate_filename(filename)?;
        for dir in self.directories() {
            let path = dir.join(filename);
            if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
                return Ok(ResolvedMedia {
                    path,
                    content_type: content_type_for(filename),
                });
            }
        }
        Err(MediaError::NotFound(filename.to_owned()))
    }
}

fn validate_filename(filename: &str) -> Result<(), MediaError> {
    let bare = !filename.is_empty()
        && !filename.starts_with('.')
        && !filename.contains(['/', '\\', '\0'])
        && !filename.contains("..");
    if bare {
        Ok(())
    } else {
        Err(MediaError::InvalidFilename(filename.to_owned()))
    }
}

/// Lowercase ASCII words joined by underscores, e.g. `Final Battle!` becomes
/// `final_battle`.
fn sanitize_label(label: &str) -> String {
    let mut out = String::new();
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    out.truncate(MAX_LABEL_LEN);
    let trimmed = out.trim_end_matches('_');
    if trimmed.is_empty() {
        "track".to_owned()
    } else {
        trimmed.to_owned()
    }
}

#[async_trait]
impl MediaStore for MediaLibrary {
    async fn save(
        &self,
        kind: MediaKind,
        label: &str,
        bytes: &[u8],
    ) -> Result<String, DomainError> {
        Ok(self.write(kind, label, bytes).await?)
    }

    async fn list(&self, kind: MediaKind) -> Result<Vec<String>, DomainError> {
        Ok(self.files(kind).await?)
    }
}
