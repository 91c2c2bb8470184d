// Core domain types: photo assets, ids and library queries

pub mod collection;
pub mod loading;
pub mod permissions;

pub use collection::{CollectionStatus, PhotoCollection};
pub use loading::{LoadingIndicator, LoadingStatus};
pub use permissions::PermissionState;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Platform-assigned asset identifier, stable per physical asset location
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlbumId(pub String);

impl fmt::Display for AlbumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaKind {
    Photo,
    Video,
    Audio,
    Unknown,
    /// Motion component of a live photo
    PairedVideo,
}

impl MediaKind {
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" | "heic" | "heif" | "tif" | "tiff"
            | "avif" | "dng" => MediaKind::Photo,

            "mp4" | "mov" | "m4v" | "avi" | "mkv" | "webm" | "3gp" => MediaKind::Video,

            "mp3" | "m4a" | "wav" | "aac" | "flac" | "ogg" | "opus" => MediaKind::Audio,

            _ => MediaKind::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Unknown => "unknown",
            MediaKind::PairedVideo => "pairedVideo",
        }
    }
}

pub const SUBTYPE_SCREENSHOT: &str = "screenshot";
pub const SUBTYPE_LIVE_PHOTO: &str = "livePhoto";

/// One media item as reported by the library. Immutable once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoAsset {
    pub id: AssetId,
    pub uri: String,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub filename: String,
    pub creation_time: DateTime<Utc>,
    pub modification_time: DateTime<Utc>,
    /// Seconds; zero for still images
    pub duration: f64,
    pub media_type: MediaKind,
    pub media_subtypes: Vec<String>,
    pub album_id: Option<AlbumId>,
}

impl PhotoAsset {
    /// Reads an asset record from the file at `path`.
    ///
    /// Dimensions come from the image header only; files that cannot be
    /// decoded report `0x0` rather than failing.
    pub fn from_path(id: AssetId, path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        let modified = metadata.modified()?;
        let created = metadata.created().unwrap_or(modified);

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let media_type = MediaKind::from_extension(extension);

        let (width, height) = if media_type == MediaKind::Photo {
            image::image_dimensions(path).unwrap_or((0, 0))
        } else {
            (0, 0)
        };

        let mut media_subtypes = Vec::new();
        let lower = filename.to_lowercase();
        if lower.starts_with("screenshot") || lower.starts_with("screen shot") {
            media_subtypes.push(SUBTYPE_SCREENSHOT.to_string());
        }

        Ok(PhotoAsset {
            id,
            uri: format!("file://{}", path.display()),
            path: path.to_path_buf(),
            width,
            height,
            filename,
            creation_time: created.into(),
            modification_time: modified.into(),
            duration: 0.0,
            media_type,
            media_subtypes,
            album_id: None,
        })
    }
}

/// Sort key for library queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    CreationTime,
    ModificationTime,
}

/// Filter and ordering for `MediaLibrary::assets`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetQuery {
    /// Media kind filter (None = every kind)
    pub kind: Option<MediaKind>,
    /// Restrict to members of an album
    pub album: Option<AlbumId>,
    pub sort_by: SortBy,
    /// Page size (None = all)
    pub first: Option<usize>,
}

impl AssetQuery {
    pub fn photos() -> Self {
        Self {
            kind: Some(MediaKind::Photo),
            ..Self::default()
        }
    }

    pub fn in_album(mut self, album: AlbumId) -> Self {
        self.album = Some(album);
        self
    }

    pub fn first(mut self, count: usize) -> Self {
        self.first = Some(count);
        self
    }
}

/// Sorts assets ascending by the given key, tie-breaking on filename.
pub fn sort_assets(assets: &mut [PhotoAsset], sort_by: SortBy) {
    match sort_by {
        SortBy::CreationTime => assets.sort_by(|a, b| {
            a.creation_time
                .cmp(&b.creation_time)
                .then_with(|| a.filename.cmp(&b.filename))
        }),
        SortBy::ModificationTime => assets.sort_by(|a, b| {
            a.modification_time
                .cmp(&b.modification_time)
                .then_with(|| a.filename.cmp(&b.filename))
        }),
    }
}
