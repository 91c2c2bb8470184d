//! Directory-backed media library
//!
//! The library root is scanned recursively for media files. Album
//! membership and files registered from outside the root are kept in a
//! JSON manifest under `<root>/.photoyeet/`.

use super::{Album, AssetPage, MediaLibrary, PermissionResponse};
use crate::domain::{
    sort_assets, AlbumId, AssetId, AssetQuery, MediaKind, PhotoAsset, SUBTYPE_LIVE_PHOTO,
};
use crate::error::{Result, YeetError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Metadata folder inside the library root; never scanned for media
pub const METADATA_DIR: &str = ".photoyeet";
const MANIFEST_FILE: &str = "library.json";
const EXTERNAL_PREFIX: &str = "ext:";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Manifest {
    #[serde(default)]
    albums: Vec<AlbumRecord>,
    /// Files outside the root that were registered with `create_asset`
    #[serde(default)]
    registered: Vec<PathBuf>,
    #[serde(default)]
    next_album: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AlbumRecord {
    id: AlbumId,
    title: String,
    #[serde(default)]
    assets: Vec<AssetId>,
}

impl Manifest {
    fn album_mut(&mut self, id: &AlbumId) -> Result<&mut AlbumRecord> {
        self.albums
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| YeetError::AlbumNotFound(id.to_string()))
    }

    fn album_of(&self, asset: &AssetId) -> Option<AlbumId> {
        self.albums
            .iter()
            .find(|a| a.assets.contains(asset))
            .map(|a| a.id.clone())
    }
}

#[derive(Debug)]
pub struct LocalLibrary {
    root: PathBuf,
    /// Serializes manifest read-modify-write cycles
    manifest_lock: Mutex<()>,
}

impl LocalLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            manifest_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn metadata_dir(&self) -> PathBuf {
        self.root.join(METADATA_DIR)
    }

    fn manifest_path(&self) -> PathBuf {
        self.metadata_dir().join(MANIFEST_FILE)
    }

    /// Maps a file path to its asset id.
    ///
    /// Files under the root are identified by their `/`-separated relative
    /// path, anything else by `ext:<absolute path>`.
    pub fn id_for_path(&self, path: &Path) -> AssetId {
        match path.strip_prefix(&self.root) {
            Ok(relative) => {
                let parts: Vec<String> = relative
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect();
                AssetId(parts.join("/"))
            }
            Err(_) => AssetId(format!("{}{}", EXTERNAL_PREFIX, path.display())),
        }
    }

    pub fn path_for_id(&self, id: &AssetId) -> PathBuf {
        match id.as_str().strip_prefix(EXTERNAL_PREFIX) {
            Some(external) => PathBuf::from(external),
            None => id
                .as_str()
                .split('/')
                .filter(|part| !part.is_empty() && *part != "..")
                .fold(self.root.clone(), |path, part| path.join(part)),
        }
    }

    async fn load_manifest(&self) -> Result<Manifest> {
        let path = self.manifest_path();
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Manifest::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_manifest(&self, manifest: &Manifest) -> Result<()> {
        fs::create_dir_all(self.metadata_dir()).await?;
        let contents = serde_json::to_string_pretty(manifest)?;
        let tmp = self.manifest_path().with_extension("json.tmp");
        fs::write(&tmp, contents).await?;
        fs::rename(&tmp, self.manifest_path()).await?;
        Ok(())
    }

    async fn ensure_readable(&self) -> Result<()> {
        if self.permissions(false).await?.is_granted() {
            Ok(())
        } else {
            Err(YeetError::PermissionDenied(format!(
                "cannot read library at {}",
                self.root.display()
            )))
        }
    }

    /// Walks the root and builds a record for every media file.
    async fn scan(&self) -> Result<Vec<PhotoAsset>> {
        let root = self.root.clone();
        let assets = tokio::task::spawn_blocking(move || scan_directory(&root))
            .await
            .map_err(|e| YeetError::Io(io::Error::other(e.to_string())))?;
        Ok(assets)
    }
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

fn scan_directory(root: &Path) -> Vec<PhotoAsset> {
    let mut assets = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        // Unreadable entries are skipped, the rest of the walk continues
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let id = match path.strip_prefix(root) {
            Ok(relative) => AssetId(
                relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/"),
            ),
            Err(_) => continue,
        };

        match PhotoAsset::from_path(id, path) {
            Ok(asset) => assets.push(asset),
            Err(e) => debug!("Skipping {}: {}", path.display(), e),
        }
    }

    pair_live_photos(&mut assets);
    assets
}

/// A video sharing directory and stem with a photo is that photo's motion part.
fn pair_live_photos(assets: &mut [PhotoAsset]) {
    let key = |asset: &PhotoAsset| {
        let parent = asset.path.parent().map(Path::to_path_buf);
        let stem = asset
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase());
        (parent, stem)
    };

    let photo_keys: HashSet<_> = assets
        .iter()
        .filter(|a| a.media_type == MediaKind::Photo)
        .map(key)
        .collect();
    let mut paired_keys = HashSet::new();

    for asset in assets.iter_mut() {
        if asset.media_type == MediaKind::Video && photo_keys.contains(&key(&*asset)) {
            asset.media_type = MediaKind::PairedVideo;
            paired_keys.insert(key(&*asset));
        }
    }

    for asset in assets.iter_mut() {
        if asset.media_type == MediaKind::Photo && paired_keys.contains(&key(&*asset)) {
            asset.media_subtypes.push(SUBTYPE_LIVE_PHOTO.to_string());
        }
    }
}

#[async_trait]
impl MediaLibrary for LocalLibrary {
    async fn permissions(&self, write: bool) -> Result<PermissionResponse> {
        let metadata = match fs::metadata(&self.root).await {
            Ok(m) if m.is_dir() => m,
            _ => return Ok(PermissionResponse::denied()),
        };

        if write {
            return Ok(if metadata.permissions().readonly() {
                PermissionResponse::denied()
            } else {
                PermissionResponse::granted()
            });
        }

        match fs::read_dir(&self.root).await {
            Ok(_) => Ok(PermissionResponse::granted()),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                Ok(PermissionResponse::denied())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn request_permissions(&self, write: bool) -> Result<PermissionResponse> {
        // A directory cannot prompt; asking again reflects its current mode
        let response = self.permissions(write).await?;
        debug!(
            "Permission request (write: {}) -> {:?}",
            write, response.status
        );
        Ok(response)
    }

    async fn assets(&self, query: &AssetQuery) -> Result<AssetPage> {
        self.ensure_readable().await?;

        let manifest = self.load_manifest().await?;
        let album_members: Option<HashSet<AssetId>> = match &query.album {
            Some(album_id) => {
                let album = manifest
                    .albums
                    .iter()
                    .find(|a| &a.id == album_id)
                    .ok_or_else(|| YeetError::AlbumNotFound(album_id.to_string()))?;
                Some(album.assets.iter().cloned().collect())
            }
            None => None,
        };

        let mut assets: Vec<PhotoAsset> = self
            .scan()
            .await?
            .into_iter()
            .filter(|a| query.kind.map_or(true, |kind| a.media_type == kind))
            .filter(|a| {
                album_members
                    .as_ref()
                    .map_or(true, |members| members.contains(&a.id))
            })
            .map(|mut a| {
                a.album_id = manifest.album_of(&a.id);
                a
            })
            .collect();

        sort_assets(&mut assets, query.sort_by);

        let total_count = assets.len();
        if let Some(first) = query.first {
            assets.truncate(first);
        }
        let has_next_page = assets.len() < total_count;

        Ok(AssetPage {
            assets,
            total_count,
            has_next_page,
        })
    }

    async fn asset_info(&self, id: &AssetId) -> Result<Option<PhotoAsset>> {
        self.ensure_readable().await?;

        let path = self.path_for_id(id);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }

        let id_clone = id.clone();
        let mut asset =
            tokio::task::spawn_blocking(move || PhotoAsset::from_path(id_clone, &path))
                .await
                .map_err(|e| YeetError::Io(io::Error::other(e.to_string())))??;

        asset.album_id = self.load_manifest().await?.album_of(id);
        Ok(Some(asset))
    }

    async fn supports_albums(&self) -> bool {
        match fs::create_dir_all(self.metadata_dir()).await {
            Ok(()) => match fs::metadata(self.metadata_dir()).await {
                Ok(m) => !m.permissions().readonly(),
                Err(_) => false,
            },
            Err(e) => {
                debug!("Albums unavailable for {}: {}", self.root.display(), e);
                false
            }
        }
    }

    async fn albums(&self) -> Result<Vec<Album>> {
        let manifest = self.load_manifest().await?;
        Ok(manifest
            .albums
            .iter()
            .map(|a| Album {
                id: a.id.clone(),
                title: a.title.clone(),
                asset_count: a.assets.len(),
            })
            .collect())
    }

    async fn create_album(&self, title: &str) -> Result<Album> {
        let _guard = self.manifest_lock.lock().await;
        let mut manifest = self.load_manifest().await?;

        manifest.next_album += 1;
        let record = AlbumRecord {
            id: AlbumId(format!("album-{}", manifest.next_album)),
            title: title.to_string(),
            assets: Vec::new(),
        };
        let album = Album {
            id: record.id.clone(),
            title: record.title.clone(),
            asset_count: 0,
        };
        manifest.albums.push(record);
        self.save_manifest(&manifest).await?;

        debug!("Created album '{}' ({})", album.title, album.id);
        Ok(album)
    }

    async fn add_assets_to_album(&self, ids: &[AssetId], album: &AlbumId) -> Result<()> {
        let _guard = self.manifest_lock.lock().await;
        let mut manifest = self.load_manifest().await?;

        let record = manifest.album_mut(album)?;
        for id in ids {
            if !record.assets.contains(id) {
                record.assets.push(id.clone());
            }
        }
        self.save_manifest(&manifest).await
    }

    async fn remove_assets_from_album(&self, ids: &[AssetId], album: &AlbumId) -> Result<()> {
        let _guard = self.manifest_lock.lock().await;
        let mut manifest = self.load_manifest().await?;

        let record = manifest.album_mut(album)?;
        record.assets.retain(|id| !ids.contains(id));
        self.save_manifest(&manifest).await
    }

    async fn delete_assets(&self, ids: &[AssetId]) -> Result<()> {
        for id in ids {
            let path = self.path_for_id(id);
            match fs::remove_file(&path).await {
                Ok(()) => debug!("Deleted {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        let _guard = self.manifest_lock.lock().await;
        let mut manifest = self.load_manifest().await?;
        let mut changed = false;

        for album in &mut manifest.albums {
            let before = album.assets.len();
            album.assets.retain(|id| !ids.contains(id));
            changed |= album.assets.len() != before;
        }

        let before = manifest.registered.len();
        manifest
            .registered
            .retain(|path| !ids.contains(&self.id_for_path(path)));
        changed |= manifest.registered.len() != before;

        if changed {
            self.save_manifest(&manifest).await?;
        }
        Ok(())
    }

    async fn create_asset(&self, path: &Path) -> Result<PhotoAsset> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Err(YeetError::AssetNotFound(path.display().to_string()));
        }

        let id = self.id_for_path(path);
        if id.as_str().starts_with(EXTERNAL_PREFIX) {
            let _guard = self.manifest_lock.lock().await;
            let mut manifest = self.load_manifest().await?;
            if !manifest.registered.iter().any(|p| p == path) {
                manifest.registered.push(path.to_path_buf());
                if let Err(e) = self.save_manifest(&manifest).await {
                    // Registration still yields a usable record
                    warn!("Could not persist registration of {}: {}", path.display(), e);
                }
            }
        }

        let owned = path.to_path_buf();
        let asset = tokio::task::spawn_blocking(move || PhotoAsset::from_path(id, &owned))
            .await
            .map_err(|e| YeetError::Io(io::Error::other(e.to_string())))??;
        Ok(asset)
    }

    async fn prune_registrations(&self) -> Result<usize> {
        let _guard = self.manifest_lock.lock().await;
        let mut manifest = self.load_manifest().await?;

        let before = manifest.registered.len();
        let mut kept = Vec::with_capacity(before);
        for path in manifest.registered.drain(..) {
            if fs::try_exists(&path).await.unwrap_or(false) {
                kept.push(path);
            } else {
                debug!("Forgetting registration of {}", path.display());
            }
        }
        manifest.registered = kept;

        let pruned = before - manifest.registered.len();
        if pruned > 0 {
            self.save_manifest(&manifest).await?;
        }
        Ok(pruned)
    }

    fn import_dir(&self) -> PathBuf {
        self.root.clone()
    }
}
