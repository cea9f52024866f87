//! Media kinds, references and the storage port for generated files.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Route prefix under which generated files are served.
pub const MEDIA_ROUTE_PREFIX: &str = "/api/media/";

/// The three kinds of generated media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image (PNG).
    Image,
    /// Short video clip (MP4).
    Video,
    /// Music track (WAV).
    Music,
}

impl MediaKind {
    /// Every kind, in gallery order.
    pub const ALL: [MediaKind; 3] = [MediaKind::Image, MediaKind::Video, MediaKind::Music];

    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Music => "music",
        }
    }

    /// File extension written for this kind.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Image => "png",
            MediaKind::Video => "mp4",
            MediaKind::Music => "wav",
        }
    }

    /// File name prefix written for this kind.
    #[must_use]
    pub fn file_prefix(self) -> &'static str {
        match self {
            MediaKind::Image => "generated_scene_",
            MediaKind::Video => "generated_video_",
            MediaKind::Music => "lyria_final_",
        }
    }

    /// Classifies a generated file by its name.
    #[must_use]
    pub fn from_filename(filename: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| {
            filename.starts_with(kind.file_prefix())
                && filename
                    .rsplit_once('.')
                    .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(kind.extension()))
        })
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            "music" => Ok(MediaKind::Music),
            other => Err(DomainError::Validation(format!("invalid media type: {other}"))),
        }
    }
}

/// Relative URL a generated file is served from.
#[must_use]
pub fn media_url(filename: &str) -> String {
    format!("{MEDIA_ROUTE_PREFIX}{filename}")
}

/// A reference to one generated image, video or music track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMediaItem {
    /// Client-side identifier.
    pub id: Uuid,
    /// Where the file can be fetched.
    pub url: String,
    /// File name on the backend.
    pub filename: String,
    /// Media kind.
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Display title.
    pub title: String,
    /// When the item was added.
    pub timestamp: DateTime<Utc>,
}

/// Persists generated media bytes and enumerates what has been written.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Writes `bytes` as a new file of `kind` and returns its file name.
    /// `label` may be folded into the name (music tracks carry their scene).
    async fn save(
        &self,
        kind: MediaKind,
        label: &str,
        bytes: &[u8],
    ) -> Result<String, DomainError>;

    /// File names of `kind`, oldest first.
    async fn list(&self, kind: MediaKind) -> Result<Vec<String>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_filename_classifies_generated_files() {
        assert_eq!(
            MediaKind::from_filename("generated_scene_20260115_100000.png"),
            Some(MediaKind::Image)
        );
        assert_eq!(
            MediaKind::from_filename("generated_video_direct_20260115_100000.mp4"),
            Some(MediaKind::Video)
        );
        assert_eq!(
            MediaKind::from_filename("lyria_final_forest_tense_20260115_100000.wav"),
            Some(MediaKind::Music)
        );
    }

    #[test]
    fn test_from_filename_rejects_mismatched_extension() {
        assert_eq!(MediaKind::from_filename("generated_scene_1.mp4"), None);
        assert_eq!(MediaKind::from_filename("notes.txt"), None);
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let result = "hologram".parse::<MediaKind>();

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_item_serializes_kind_as_type() {
        let item = GeneratedMediaItem {
            id: Uuid::nil(),
            url: media_url("generated_scene_1.png"),
            filename: "generated_scene_1.png".to_owned(),
            kind: MediaKind::Image,
            title: "Opening".to_owned(),
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
        };

        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["type"], "image");
        assert_eq!(json["url"], "/api/media/generated_scene_1.png");
    }
}
