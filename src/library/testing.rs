// Fault-injecting library wrapper used by unit tests

use super::{Album, AssetPage, LocalLibrary, MediaLibrary, PermissionResponse};
use crate::domain::{AlbumId, AssetId, AssetQuery, PhotoAsset};
use crate::error::{Result, YeetError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Wraps a [`LocalLibrary`] and fails selected calls on demand.
pub struct FlakyLibrary {
    inner: LocalLibrary,
    /// Queries fail with a transient service error
    pub fail_queries: AtomicBool,
    /// Album calls fail with a transient service error
    pub fail_albums: AtomicBool,
    /// Read grant reported as denied
    pub deny_read: AtomicBool,
    /// Write grant reported as denied
    pub deny_write: AtomicBool,
    /// Single-asset lookups fail with a transient service error
    pub fail_info: AtomicBool,
    /// Ids whose deletion fails with a hard error
    pub failing_deletes: Mutex<HashSet<AssetId>>,
    /// Number of `delete_assets` invocations
    pub delete_calls: AtomicUsize,
    /// Ids passed to `delete_assets`, in call order
    pub deleted_ids: Mutex<Vec<AssetId>>,
}

impl FlakyLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            inner: LocalLibrary::new(root),
            fail_queries: AtomicBool::new(false),
            fail_albums: AtomicBool::new(false),
            deny_read: AtomicBool::new(false),
            deny_write: AtomicBool::new(false),
            fail_info: AtomicBool::new(false),
            failing_deletes: Mutex::new(HashSet::new()),
            delete_calls: AtomicUsize::new(0),
            deleted_ids: Mutex::new(Vec::new()),
        }
    }

    pub fn set(&self, flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }

    pub fn fail_delete_of(&self, id: AssetId) {
        self.failing_deletes.lock().unwrap().insert(id);
    }

    pub fn delete_call_count(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn service_error() -> YeetError {
        YeetError::ServiceUnavailable("connection to service was interrupted".to_string())
    }
}

#[async_trait]
impl MediaLibrary for FlakyLibrary {
    async fn permissions(&self, write: bool) -> Result<PermissionResponse> {
        let deny = if write { &self.deny_write } else { &self.deny_read };
        if deny.load(Ordering::SeqCst) {
            return Ok(PermissionResponse::denied());
        }
        self.inner.permissions(write).await
    }

    async fn request_permissions(&self, write: bool) -> Result<PermissionResponse> {
        self.permissions(write).await
    }

    async fn assets(&self, query: &AssetQuery) -> Result<AssetPage> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(Self::service_error());
        }
        self.inner.assets(query).await
    }

    async fn asset_info(&self, id: &AssetId) -> Result<Option<PhotoAsset>> {
        if self.fail_info.load(Ordering::SeqCst) {
            return Err(Self::service_error());
        }
        self.inner.asset_info(id).await
    }

    async fn supports_albums(&self) -> bool {
        self.inner.supports_albums().await
    }

    async fn albums(&self) -> Result<Vec<Album>> {
        if self.fail_albums.load(Ordering::SeqCst) {
            return Err(Self::service_error());
        }
        self.inner.albums().await
    }

    async fn create_album(&self, title: &str) -> Result<Album> {
        if self.fail_albums.load(Ordering::SeqCst) {
            return Err(Self::service_error());
        }
        self.inner.create_album(title).await
    }

    async fn add_assets_to_album(&self, ids: &[AssetId], album: &AlbumId) -> Result<()> {
        if self.fail_albums.load(Ordering::SeqCst) {
            return Err(Self::service_error());
        }
        self.inner.add_assets_to_album(ids, album).await
    }

    async fn remove_assets_from_album(&self, ids: &[AssetId], album: &AlbumId) -> Result<()> {
        self.inner.remove_assets_from_album(ids, album).await
    }

    async fn delete_assets(&self, ids: &[AssetId]) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.deleted_ids
            .lock()
            .unwrap()
            .extend(ids.iter().cloned());

        let failing = self.failing_deletes.lock().unwrap().clone();
        if let Some(id) = ids.iter().find(|id| failing.contains(*id)) {
            return Err(YeetError::Io(std::io::Error::other(format!(
                "refused to delete {}",
                id
            ))));
        }
        self.inner.delete_assets(ids).await
    }

    async fn create_asset(&self, path: &Path) -> Result<PhotoAsset> {
        self.inner.create_asset(path).await
    }

    async fn prune_registrations(&self) -> Result<usize> {
        self.inner.prune_registrations().await
    }

    fn import_dir(&self) -> PathBuf {
        self.inner.import_dir()
    }
}
