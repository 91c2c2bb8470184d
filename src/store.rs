//! Asset store adapter
//!
//! [`AssetStore`] is the only thing the collection state talks to. It hides
//! which staging mechanism is in use behind [`StagingArea`], enforces the
//! read/write grants, and absorbs transient media-service failures:
//! list calls come back empty and mutations are skipped, both with a
//! warning in the log.

pub mod album;
pub mod directory;

pub use album::{AlbumStaging, YEETED_ALBUM_NAME};
pub use directory::{DirectoryStaging, Sandbox, GALLERY_SUBDIR, YEETED_DIR_NAME};

use crate::domain::{AssetId, AssetQuery, PhotoAsset};
use crate::error::{Result, YeetError};
use crate::library::MediaLibrary;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Requested staging mechanism
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StagingMode {
    /// Album when the library supports albums, directory otherwise
    #[default]
    Auto,
    Album,
    Directory,
}

/// Mechanism actually backing a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingKind {
    Album,
    Directory,
}

/// Where discarded-but-recoverable photos live
#[async_trait]
pub trait StagingArea: Send + Sync {
    fn kind(&self) -> StagingKind;

    /// Photos currently staged, oldest first
    async fn list(&self) -> Result<Vec<PhotoAsset>>;

    /// Ids that are staged but still returned by library queries
    async fn hidden_ids(&self) -> Result<HashSet<AssetId>>;

    async fn stage(&self, ids: &[AssetId]) -> Result<()>;

    async fn restore(&self, ids: &[AssetId]) -> Result<()>;

    /// Permanently removes one staged photo
    async fn delete_one(&self, id: &AssetId) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

/// Outcome of a batch deletion; every item is attempted
#[derive(Debug, Default)]
pub struct DeleteReport {
    pub deleted: Vec<AssetId>,
    pub failed: Vec<(AssetId, YeetError)>,
}

impl DeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.deleted.len() + self.failed.len()
    }
}

/// Turns a transient failure into the default value, logging it.
fn absorb_transient<T: Default>(result: Result<T>, action: &str) -> Result<T> {
    match result {
        Err(e) if e.is_transient() => {
            warn!(
                "Photo library connection temporarily unavailable while {}: {}",
                action, e
            );
            Ok(T::default())
        }
        other => other,
    }
}

pub struct AssetStore {
    library: Arc<dyn MediaLibrary>,
    staging: Box<dyn StagingArea>,
}

impl AssetStore {
    /// Builds a store, picking the staging mechanism once from the library's capabilities.
    pub async fn open(library: Arc<dyn MediaLibrary>, mode: StagingMode, sandbox: &Path) -> Self {
        let kind = match mode {
            StagingMode::Album => StagingKind::Album,
            StagingMode::Directory => StagingKind::Directory,
            StagingMode::Auto => {
                if library.supports_albums().await {
                    StagingKind::Album
                } else {
                    StagingKind::Directory
                }
            }
        };

        let staging: Box<dyn StagingArea> = match kind {
            StagingKind::Album => Box::new(AlbumStaging::new(Arc::clone(&library))),
            StagingKind::Directory => Box::new(DirectoryStaging::new(
                Arc::clone(&library),
                Sandbox::new(sandbox),
            )),
        };

        info!("Using {:?} staging", kind);
        Self::with_staging(library, staging)
    }

    pub fn with_staging(library: Arc<dyn MediaLibrary>, staging: Box<dyn StagingArea>) -> Self {
        Self { library, staging }
    }

    pub fn staging_kind(&self) -> StagingKind {
        self.staging.kind()
    }

    pub fn library(&self) -> &Arc<dyn MediaLibrary> {
        &self.library
    }

    async fn require(&self, write: bool) -> Result<()> {
        let response = self.library.permissions(write).await?;
        if response.is_granted() {
            Ok(())
        } else {
            Err(YeetError::PermissionDenied(
                if write { "write access" } else { "read access" }.to_string(),
            ))
        }
    }

    /// All still photos in the library, oldest first, excluding staged ones.
    pub async fn list_photos(&self) -> Result<Vec<PhotoAsset>> {
        self.require(false).await?;

        let page = absorb_transient(
            self.library.assets(&AssetQuery::photos()).await,
            "listing photos",
        )?;
        let hidden = absorb_transient(self.staging.hidden_ids().await, "listing staged ids")?;

        let photos: Vec<PhotoAsset> = page
            .assets
            .into_iter()
            .filter(|asset| !hidden.contains(&asset.id))
            .collect();

        debug!("Listed {} photos ({} staged hidden)", photos.len(), hidden.len());
        Ok(photos)
    }

    pub async fn get_one(&self, id: &AssetId) -> Result<Option<PhotoAsset>> {
        self.require(false).await?;
        absorb_transient(self.library.asset_info(id).await, "reading asset info")
    }

    pub async fn list_staged(&self) -> Result<Vec<PhotoAsset>> {
        self.require(false).await?;
        absorb_transient(self.staging.list().await, "listing staged photos")
    }

    pub async fn move_to_staging(&self, ids: &[AssetId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.require(true).await?;
        absorb_transient(self.staging.stage(ids).await, "moving photos to staging")
    }

    pub async fn restore_from_staging(&self, ids: &[AssetId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.require(true).await?;
        absorb_transient(self.staging.restore(ids).await, "restoring photos")
    }

    /// Deletes every id concurrently and waits for all of them.
    ///
    /// Individual failures are collected in the report instead of aborting
    /// the batch; only a missing write grant fails the whole call.
    pub async fn delete_permanently(&self, ids: &[AssetId]) -> Result<DeleteReport> {
        if ids.is_empty() {
            return Ok(DeleteReport::default());
        }
        self.require(true).await?;

        let staging = &self.staging;
        let results = join_all(ids.iter().map(|id| async move {
            let result = staging.delete_one(id).await;
            (id.clone(), result)
        }))
        .await;

        let mut report = DeleteReport::default();
        for (id, result) in results {
            match result {
                Ok(()) => report.deleted.push(id),
                Err(e) => {
                    error!("Failed to delete {}: {}", id, e);
                    report.failed.push((id, e));
                }
            }
        }

        info!(
            "Deleted {} of {} staged photos",
            report.deleted.len(),
            report.attempted()
        );
        Ok(report)
    }

    pub async fn clear_staging(&self) -> Result<()> {
        self.require(true).await?;
        absorb_transient(self.staging.clear().await, "clearing staging")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::testing::FlakyLibrary;
    use crate::library::LocalLibrary;
    use tempfile::TempDir;

    fn write_photo(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        image::RgbImage::from_fn(4, 4, |x, y| image::Rgb([x as u8, y as u8, 0]))
            .save(path)
            .unwrap();
    }

    fn ids(assets: &[PhotoAsset]) -> Vec<String> {
        assets.iter().map(|a| a.id.to_string()).collect()
    }

    mod selection_tests {
        use super::*;

        #[tokio::test]
        async fn test_auto_selects_album_for_writable_library() {
            let library_dir = TempDir::new().unwrap();
            let sandbox = TempDir::new().unwrap();
            let library = Arc::new(LocalLibrary::new(library_dir.path()));

            let store = AssetStore::open(library, StagingMode::Auto, sandbox.path()).await;
            assert_eq!(store.staging_kind(), StagingKind::Album);
        }

        #[tokio::test]
        async fn test_explicit_directory_mode() {
            let library_dir = TempDir::new().unwrap();
            let sandbox = TempDir::new().unwrap();
            let library = Arc::new(LocalLibrary::new(library_dir.path()));

            let store = AssetStore::open(library, StagingMode::Directory, sandbox.path()).await;
            assert_eq!(store.staging_kind(), StagingKind::Directory);
        }
    }

    mod album_flow_tests {
        use super::*;

        #[tokio::test]
        async fn test_staged_photo_leaves_visible_list() {
            let library_dir = TempDir::new().unwrap();
            let sandbox = TempDir::new().unwrap();
            write_photo(&library_dir.path().join("a.png"));
            write_photo(&library_dir.path().join("b.png"));

            let library = Arc::new(LocalLibrary::new(library_dir.path()));
            let store = AssetStore::open(library, StagingMode::Album, sandbox.path()).await;

            store
                .move_to_staging(&[AssetId::new("a.png")])
                .await
                .unwrap();

            assert_eq!(ids(&store.list_photos().await.unwrap()), vec!["b.png"]);
            assert_eq!(ids(&store.list_staged().await.unwrap()), vec!["a.png"]);

            // Album membership only; the file stays in place
            assert!(library_dir.path().join("a.png").exists());

            store
                .restore_from_staging(&[AssetId::new("a.png")])
                .await
                .unwrap();
            assert_eq!(store.list_photos().await.unwrap().len(), 2);
            assert!(store.list_staged().await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_get_one_reports_album_membership() {
            let library_dir = TempDir::new().unwrap();
            let sandbox = TempDir::new().unwrap();
            write_photo(&library_dir.path().join("a.png"));
            write_photo(&library_dir.path().join("b.png"));

            let library = Arc::new(LocalLibrary::new(library_dir.path()));
            let store = AssetStore::open(library, StagingMode::Album, sandbox.path()).await;
            store
                .move_to_staging(&[AssetId::new("a.png")])
                .await
                .unwrap();

            let a = store.get_one(&AssetId::new("a.png")).await.unwrap().unwrap();
            assert_eq!(a.filename, "a.png");
            assert_eq!((a.width, a.height), (4, 4));
            assert!(a.album_id.is_some());

            let b = store.get_one(&AssetId::new("b.png")).await.unwrap().unwrap();
            assert!(b.album_id.is_none());

            let missing = store.get_one(&AssetId::new("nope.png")).await.unwrap();
            assert!(missing.is_none());
        }

        #[tokio::test]
        async fn test_clear_staging_deletes_album_members() {
            let library_dir = TempDir::new().unwrap();
            let sandbox = TempDir::new().unwrap();
            write_photo(&library_dir.path().join("a.png"));
            write_photo(&library_dir.path().join("b.png"));

            let library = Arc::new(LocalLibrary::new(library_dir.path()));
            let store = AssetStore::open(library, StagingMode::Album, sandbox.path()).await;
            store
                .move_to_staging(&[AssetId::new("a.png"), AssetId::new("b.png")])
                .await
                .unwrap();

            store.clear_staging().await.unwrap();

            assert!(store.list_staged().await.unwrap().is_empty());
            assert!(!library_dir.path().join("a.png").exists());
            assert!(!library_dir.path().join("b.png").exists());
        }
    }

    mod directory_flow_tests {
        use super::*;

        #[tokio::test]
        async fn test_stage_moves_file_into_sandbox() {
            let library_dir = TempDir::new().unwrap();
            let sandbox = TempDir::new().unwrap();
            write_photo(&library_dir.path().join("DCIM/a.png"));
            write_photo(&library_dir.path().join("DCIM/b.png"));

            let library = Arc::new(LocalLibrary::new(library_dir.path()));
            let store = AssetStore::open(library, StagingMode::Directory, sandbox.path()).await;

            store
                .move_to_staging(&[AssetId::new("DCIM/a.png")])
                .await
                .unwrap();

            assert!(!library_dir.path().join("DCIM/a.png").exists());
            assert!(sandbox.path().join(YEETED_DIR_NAME).join("a.png").exists());
            assert_eq!(ids(&store.list_photos().await.unwrap()), vec!["DCIM/b.png"]);

            let staged = store.list_staged().await.unwrap();
            assert_eq!(staged.len(), 1);
            assert_eq!(staged[0].filename, "a.png");
        }

        #[tokio::test]
        async fn test_restore_returns_file_to_gallery() {
            let library_dir = TempDir::new().unwrap();
            let sandbox = TempDir::new().unwrap();
            write_photo(&library_dir.path().join("a.png"));

            let library = Arc::new(LocalLibrary::new(library_dir.path()));
            let store = AssetStore::open(library, StagingMode::Directory, sandbox.path()).await;
            store
                .move_to_staging(&[AssetId::new("a.png")])
                .await
                .unwrap();
            let staged = store.list_staged().await.unwrap();

            store.restore_from_staging(&[staged[0].id.clone()]).await.unwrap();

            assert!(store.list_staged().await.unwrap().is_empty());
            let visible = store.list_photos().await.unwrap();
            assert_eq!(ids(&visible), vec![format!("{}/a.png", GALLERY_SUBDIR)]);
        }

        #[tokio::test]
        async fn test_delete_and_clear() {
            let library_dir = TempDir::new().unwrap();
            let sandbox = TempDir::new().unwrap();
            for name in ["a.png", "b.png", "c.png"] {
                write_photo(&library_dir.path().join(name));
            }

            let library = Arc::new(LocalLibrary::new(library_dir.path()));
            let store = AssetStore::open(library, StagingMode::Directory, sandbox.path()).await;
            store
                .move_to_staging(&[
                    AssetId::new("a.png"),
                    AssetId::new("b.png"),
                    AssetId::new("c.png"),
                ])
                .await
                .unwrap();

            let staged = store.list_staged().await.unwrap();
            let report = store
                .delete_permanently(&[staged[0].id.clone()])
                .await
                .unwrap();
            assert!(report.is_complete());
            assert_eq!(store.list_staged().await.unwrap().len(), 2);

            store.clear_staging().await.unwrap();
            assert!(store.list_staged().await.unwrap().is_empty());
            assert!(sandbox.path().join(YEETED_DIR_NAME).exists());
        }
    }

    mod failure_policy_tests {
        use super::*;

        #[tokio::test]
        async fn test_transient_query_failure_lists_empty() {
            let library_dir = TempDir::new().unwrap();
            let sandbox = TempDir::new().unwrap();
            write_photo(&library_dir.path().join("a.png"));

            let library = Arc::new(FlakyLibrary::new(library_dir.path()));
            library.set(&library.fail_queries, true);
            let store =
                AssetStore::open(library.clone(), StagingMode::Album, sandbox.path()).await;

            assert!(store.list_photos().await.unwrap().is_empty());
            assert!(store.list_staged().await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_transient_album_failure_skips_move() {
            let library_dir = TempDir::new().unwrap();
            let sandbox = TempDir::new().unwrap();
            write_photo(&library_dir.path().join("a.png"));

            let library = Arc::new(FlakyLibrary::new(library_dir.path()));
            let store =
                AssetStore::open(library.clone(), StagingMode::Album, sandbox.path()).await;

            library.set(&library.fail_albums, true);
            let result = store.move_to_staging(&[AssetId::new("a.png")]).await;
            assert!(result.is_ok());

            library.set(&library.fail_albums, false);
            assert_eq!(store.list_photos().await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_missing_write_grant_is_error() {
            let library_dir = TempDir::new().unwrap();
            let sandbox = TempDir::new().unwrap();
            write_photo(&library_dir.path().join("a.png"));

            let library = Arc::new(FlakyLibrary::new(library_dir.path()));
            library.set(&library.deny_write, true);
            let store =
                AssetStore::open(library.clone(), StagingMode::Album, sandbox.path()).await;

            let result = store.move_to_staging(&[AssetId::new("a.png")]).await;
            assert!(matches!(result, Err(YeetError::PermissionDenied(_))));

            let result = store.delete_permanently(&[AssetId::new("a.png")]).await;
            assert!(matches!(result, Err(YeetError::PermissionDenied(_))));
        }

        #[tokio::test]
        async fn test_get_one_failure_policy() {
            let library_dir = TempDir::new().unwrap();
            let sandbox = TempDir::new().unwrap();
            write_photo(&library_dir.path().join("a.png"));

            let library = Arc::new(FlakyLibrary::new(library_dir.path()));
            let store =
                AssetStore::open(library.clone(), StagingMode::Album, sandbox.path()).await;
            let id = AssetId::new("a.png");

            library.set(&library.fail_info, true);
            assert!(store.get_one(&id).await.unwrap().is_none());
            library.set(&library.fail_info, false);

            library.set(&library.deny_read, true);
            let result = store.get_one(&id).await;
            assert!(matches!(result, Err(YeetError::PermissionDenied(_))));
            let result = store.list_photos().await;
            assert!(matches!(result, Err(YeetError::PermissionDenied(_))));

            library.set(&library.deny_read, false);
            assert!(store.get_one(&id).await.unwrap().is_some());
        }

        #[tokio::test]
        async fn test_partial_batch_delete_reports_each_item() {
            let library_dir = TempDir::new().unwrap();
            let sandbox = TempDir::new().unwrap();
            for name in ["a.png", "b.png", "c.png"] {
                write_photo(&library_dir.path().join(name));
            }

            let library = Arc::new(FlakyLibrary::new(library_dir.path()));
            let store =
                AssetStore::open(library.clone(), StagingMode::Album, sandbox.path()).await;
            let all = [
                AssetId::new("a.png"),
                AssetId::new("b.png"),
                AssetId::new("c.png"),
            ];
            store.move_to_staging(&all).await.unwrap();

            library.fail_delete_of(AssetId::new("b.png"));
            let report = store.delete_permanently(&all).await.unwrap();

            assert_eq!(report.attempted(), 3);
            assert_eq!(report.deleted.len(), 2);
            assert_eq!(report.failed.len(), 1);
            assert_eq!(report.failed[0].0, AssetId::new("b.png"));
            assert_eq!(library.delete_call_count(), 3);
            assert_eq!(ids(&store.list_staged().await.unwrap()), vec!["b.png"]);
        }
    }
}
