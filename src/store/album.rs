// Staging by album membership: discarded photos stay in the library and
// are tagged as members of a dedicated album.

use super::{StagingArea, StagingKind};
use crate::domain::{AlbumId, AssetId, AssetQuery, PhotoAsset};
use crate::error::Result;
use crate::library::{Album, MediaLibrary};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const YEETED_ALBUM_NAME: &str = "Yeeted Content";

pub struct AlbumStaging {
    library: Arc<dyn MediaLibrary>,
    /// Resolved album id, cached after the first lookup
    album: Mutex<Option<AlbumId>>,
}

impl AlbumStaging {
    pub fn new(library: Arc<dyn MediaLibrary>) -> Self {
        Self {
            library,
            album: Mutex::new(None),
        }
    }

    async fn find_album(&self) -> Result<Option<AlbumId>> {
        let mut cached = self.album.lock().await;
        if cached.is_none() {
            *cached = find_by_title(self.library.albums().await?);
        }
        Ok(cached.clone())
    }

    /// Returns the staging album, creating it on first use.
    async fn find_or_create_album(&self) -> Result<AlbumId> {
        if let Some(id) = self.find_album().await? {
            return Ok(id);
        }

        let id = match self.library.create_album(YEETED_ALBUM_NAME).await {
            Ok(album) => album.id,
            Err(e) if e.is_transient() => {
                // The album may have been created before the service dropped
                warn!("Album creation interrupted, looking it up again: {}", e);
                match find_by_title(self.library.albums().await?) {
                    Some(id) => id,
                    None => return Err(e),
                }
            }
            Err(e) => return Err(e),
        };

        debug!("Using staging album {}", id);
        *self.album.lock().await = Some(id.clone());
        Ok(id)
    }

    async fn members(&self) -> Result<Vec<PhotoAsset>> {
        match self.find_album().await? {
            Some(album) => Ok(self
                .library
                .assets(&AssetQuery::photos().in_album(album))
                .await?
                .assets),
            None => Ok(Vec::new()),
        }
    }
}

fn find_by_title(albums: Vec<Album>) -> Option<AlbumId> {
    albums
        .into_iter()
        .find(|album| album.title == YEETED_ALBUM_NAME)
        .map(|album| album.id)
}

#[async_trait]
impl StagingArea for AlbumStaging {
    fn kind(&self) -> StagingKind {
        StagingKind::Album
    }

    async fn list(&self) -> Result<Vec<PhotoAsset>> {
        self.members().await
    }

    async fn hidden_ids(&self) -> Result<HashSet<AssetId>> {
        Ok(self.members().await?.into_iter().map(|a| a.id).collect())
    }

    async fn stage(&self, ids: &[AssetId]) -> Result<()> {
        let album = self.find_or_create_album().await?;
        self.library.add_assets_to_album(ids, &album).await?;
        debug!("Added {} photo(s) to {}", ids.len(), YEETED_ALBUM_NAME);
        Ok(())
    }

    async fn restore(&self, ids: &[AssetId]) -> Result<()> {
        match self.find_album().await? {
            Some(album) => {
                self.library.remove_assets_from_album(ids, &album).await?;
                debug!("Removed {} photo(s) from {}", ids.len(), YEETED_ALBUM_NAME);
                Ok(())
            }
            None => Ok(()),
        }
    }

    async fn delete_one(&self, id: &AssetId) -> Result<()> {
        self.library.delete_assets(std::slice::from_ref(id)).await
    }

    async fn clear(&self) -> Result<()> {
        let ids: Vec<AssetId> = self.members().await?.into_iter().map(|a| a.id).collect();
        if ids.is_empty() {
            return Ok(());
        }
        self.library.delete_assets(&ids).await
    }
}
