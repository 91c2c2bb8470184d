//! Media library boundary
//!
//! Everything the app knows about photos comes through [`MediaLibrary`]:
//! queries, per-asset metadata, album membership, permanent deletion and
//! registration of files as library assets. [`LocalLibrary`] implements it
//! over a directory tree.

pub mod local;
#[cfg(test)]
pub(crate) mod testing;

pub use local::LocalLibrary;

use crate::domain::{AlbumId, AssetId, AssetQuery, PhotoAsset};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

/// How much of the library a read grant covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessPrivileges {
    All,
    Limited,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionResponse {
    pub status: PermissionStatus,
    pub access_privileges: AccessPrivileges,
}

impl PermissionResponse {
    pub fn granted() -> Self {
        Self {
            status: PermissionStatus::Granted,
            access_privileges: AccessPrivileges::All,
        }
    }

    pub fn denied() -> Self {
        Self {
            status: PermissionStatus::Denied,
            access_privileges: AccessPrivileges::None,
        }
    }

    pub fn is_granted(&self) -> bool {
        self.status == PermissionStatus::Granted
    }

    /// Granted with access to the whole library
    pub fn is_full_access(&self) -> bool {
        self.is_granted() && self.access_privileges == AccessPrivileges::All
    }
}

/// One page of query results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetPage {
    pub assets: Vec<PhotoAsset>,
    pub total_count: usize,
    pub has_next_page: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    pub asset_count: usize,
}

#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Current grant. `write` selects the write/delete grant instead of read.
    async fn permissions(&self, write: bool) -> Result<PermissionResponse>;

    /// Asks for a grant; returns the resulting status.
    async fn request_permissions(&self, write: bool) -> Result<PermissionResponse>;

    async fn assets(&self, query: &AssetQuery) -> Result<AssetPage>;

    async fn asset_info(&self, id: &AssetId) -> Result<Option<PhotoAsset>>;

    /// Whether named albums can be created and maintained
    async fn supports_albums(&self) -> bool;

    async fn albums(&self) -> Result<Vec<Album>>;

    async fn create_album(&self, title: &str) -> Result<Album>;

    async fn add_assets_to_album(&self, ids: &[AssetId], album: &AlbumId) -> Result<()>;

    async fn remove_assets_from_album(&self, ids: &[AssetId], album: &AlbumId) -> Result<()>;

    /// Permanently deletes assets; ids whose file is already gone are ignored.
    async fn delete_assets(&self, ids: &[AssetId]) -> Result<()>;

    /// Registers a file as a library asset and returns its record.
    async fn create_asset(&self, path: &Path) -> Result<PhotoAsset>;

    /// Drops registrations of external files that no longer exist.
    /// Returns how many were dropped.
    async fn prune_registrations(&self) -> Result<usize>;

    /// Directory under which written files become ordinary library assets
    fn import_dir(&self) -> PathBuf;
}
