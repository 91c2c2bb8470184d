//! Staging by relocation
//!
//! Used when the library cannot keep albums. Discarded files are moved
//! into `<sandbox>/YeetedContent` and their library entry is dropped;
//! listing re-registers whatever is in that folder so staged photos can
//! still be previewed and deleted through the library. Restoring moves
//! the file back under `<library>/DCIM/Camera`.

use super::{StagingArea, StagingKind};
use crate::domain::{sort_assets, AssetId, PhotoAsset, SortBy};
use crate::error::{Result, YeetError};
use crate::library::MediaLibrary;
use async_trait::async_trait;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, warn};

pub const YEETED_DIR_NAME: &str = "YeetedContent";

/// Where restored files are written, relative to the library's import dir
pub const GALLERY_SUBDIR: &str = "DCIM/Camera";

/// App-scoped file system the staging folder lives in
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    /// Creates a directory and its parents.
    pub async fn make_dir(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).await?;
        Ok(())
    }

    /// Moves a file, falling back to copy and remove across devices.
    pub async fn move_file(&self, from: &Path, to: &Path) -> Result<()> {
        if let Err(rename_err) = fs::rename(from, to).await {
            debug!(
                "Rename {} -> {} failed ({}), copying instead",
                from.display(),
                to.display(),
                rename_err
            );
            fs::copy(from, to).await?;
            fs::remove_file(from).await?;
        }
        Ok(())
    }

    /// Removes a file or directory tree. Missing paths are not an error.
    pub async fn delete(&self, path: &Path) -> Result<()> {
        let metadata = match fs::symlink_metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let result = if metadata.is_dir() {
            fs::remove_dir_all(path).await
        } else {
            fs::remove_file(path).await
        };

        match result {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Regular, non-hidden files directly inside `dir`, sorted by name.
    pub async fn read_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if !hidden && entry.file_type().await?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// First free path for `filename` in `dir`, appending ` (n)` to the stem on collision.
async fn unique_destination(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !fs::try_exists(&candidate).await.unwrap_or(false) {
        return candidate;
    }

    let name = Path::new(filename);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    let extension = name.extension().map(|e| e.to_string_lossy().into_owned());

    let mut n = 1;
    loop {
        let numbered = match &extension {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        let candidate = dir.join(numbered);
        if !fs::try_exists(&candidate).await.unwrap_or(false) {
            return candidate;
        }
        n += 1;
    }
}

pub struct DirectoryStaging {
    library: Arc<dyn MediaLibrary>,
    sandbox: Sandbox,
}

impl DirectoryStaging {
    pub fn new(library: Arc<dyn MediaLibrary>, sandbox: Sandbox) -> Self {
        Self { library, sandbox }
    }

    fn staging_dir(&self) -> PathBuf {
        self.sandbox.path(YEETED_DIR_NAME)
    }

    fn gallery_dir(&self) -> PathBuf {
        GALLERY_SUBDIR
            .split('/')
            .fold(self.library.import_dir(), |path, part| path.join(part))
    }

    async fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if !self.sandbox.exists(dir).await {
            self.sandbox.make_dir(dir).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StagingArea for DirectoryStaging {
    fn kind(&self) -> StagingKind {
        StagingKind::Directory
    }

    async fn list(&self) -> Result<Vec<PhotoAsset>> {
        match self.library.prune_registrations().await {
            Ok(0) => {}
            Ok(n) => debug!("Dropped {} stale staged registrations", n),
            Err(e) => warn!("Could not prune staged registrations: {}", e),
        }

        let mut staged = Vec::new();
        for path in self.sandbox.read_dir(&self.staging_dir()).await? {
            staged.push(self.library.create_asset(&path).await?);
        }
        sort_assets(&mut staged, SortBy::CreationTime);
        Ok(staged)
    }

    async fn hidden_ids(&self) -> Result<HashSet<AssetId>> {
        // A sandbox inside the library root is also picked up by its scan
        Ok(self.list().await?.into_iter().map(|a| a.id).collect())
    }

    async fn stage(&self, ids: &[AssetId]) -> Result<()> {
        let dir = self.staging_dir();
        self.ensure_dir(&dir).await?;

        for id in ids {
            let Some(asset) = self.library.asset_info(id).await? else {
                warn!("Cannot stage {}: asset no longer exists", id);
                continue;
            };

            let destination = unique_destination(&dir, &asset.filename).await;
            self.sandbox.move_file(&asset.path, &destination).await?;
            self.library.delete_assets(std::slice::from_ref(id)).await?;
            debug!("Staged {} at {}", id, destination.display());
        }
        Ok(())
    }

    async fn restore(&self, ids: &[AssetId]) -> Result<()> {
        let staging_dir = self.staging_dir();
        let gallery = self.gallery_dir();
        self.ensure_dir(&gallery).await?;

        for id in ids {
            let Some(asset) = self.library.asset_info(id).await? else {
                warn!("Cannot restore {}: file is gone from staging", id);
                continue;
            };
            if !asset.path.starts_with(&staging_dir) {
                return Err(YeetError::InvalidArgument(format!(
                    "{} is not a staged photo",
                    id
                )));
            }

            let destination = unique_destination(&gallery, &asset.filename).await;
            self.sandbox.move_file(&asset.path, &destination).await?;
            let restored = self.library.create_asset(&destination).await?;
            // Drops the registration of the old staged path
            self.library.delete_assets(std::slice::from_ref(id)).await?;
            debug!("Restored {} as {}", id, restored.id);
        }
        Ok(())
    }

    async fn delete_one(&self, id: &AssetId) -> Result<()> {
        self.library.delete_assets(std::slice::from_ref(id)).await
    }

    async fn clear(&self) -> Result<()> {
        let ids: Vec<AssetId> = self.list().await?.into_iter().map(|a| a.id).collect();
        if !ids.is_empty() {
            self.library.delete_assets(&ids).await?;
        }

        let dir = self.staging_dir();
        self.sandbox.delete(&dir).await?;
        self.sandbox.make_dir(&dir).await
    }
}
