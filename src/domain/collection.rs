//! Photo collection state
//!
//! Holds the visible photos, the staged photos and the review cursor.
//! Every mutation goes through the [`AssetStore`] and is followed by a
//! real re-fetch of the affected lists; nothing is patched in place.

use super::{AssetId, LoadingIndicator, PhotoAsset};
use crate::error::Result;
use crate::store::{AssetStore, DeleteReport};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

pub const MSG_LOADING_PHOTOS: &str = "Loading your photos...";
pub const MSG_LOADING_STAGED: &str = "Loading yeeted photos...";
pub const MSG_MOVING: &str = "Moving photo to yeeted...";
pub const MSG_RESTORING: &str = "Restoring photo...";
pub const MSG_DELETING: &str = "Deleting photos...";

/// What the review screen should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// First load has not finished
    Loading,
    /// Loaded, but the library has no photos
    Empty,
    Reviewing,
    /// Cursor is past the last photo
    Exhausted,
}

pub struct PhotoCollection {
    store: AssetStore,
    loading: LoadingIndicator,
    visible: Vec<PhotoAsset>,
    staged: Vec<PhotoAsset>,
    cursor: usize,
    has_loaded: bool,
}

impl PhotoCollection {
    pub fn new(store: AssetStore, loading: LoadingIndicator) -> Self {
        Self {
            store,
            loading,
            visible: Vec::new(),
            staged: Vec::new(),
            cursor: 0,
            has_loaded: false,
        }
    }

    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    pub fn loading(&self) -> &LoadingIndicator {
        &self.loading
    }

    pub fn visible(&self) -> &[PhotoAsset] {
        &self.visible
    }

    pub fn staged(&self) -> &[PhotoAsset] {
        &self.staged
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn has_loaded(&self) -> bool {
        self.has_loaded
    }

    /// Photo under the cursor, `None` when exhausted or empty
    pub fn current(&self) -> Option<&PhotoAsset> {
        self.visible.get(self.cursor)
    }

    /// Photo after the current one, for preloading
    pub fn upcoming(&self) -> Option<&PhotoAsset> {
        self.visible.get(self.cursor + 1)
    }

    pub fn status(&self) -> CollectionStatus {
        if !self.has_loaded {
            CollectionStatus::Loading
        } else if self.visible.is_empty() {
            CollectionStatus::Empty
        } else if self.cursor >= self.visible.len() {
            CollectionStatus::Exhausted
        } else {
            CollectionStatus::Reviewing
        }
    }

    /// Replaces the visible list with a fresh query.
    ///
    /// Always marks the collection as loaded. A hard failure leaves the
    /// visible list empty and is returned to the caller.
    pub async fn load_visible(&mut self) -> Result<()> {
        let first_load = !self.has_loaded;
        if first_load {
            self.loading.show(MSG_LOADING_PHOTOS);
        }

        let result = self.refresh_visible().await;
        self.has_loaded = true;

        if first_load {
            self.loading.hide();
        }
        result
    }

    pub async fn load_staged(&mut self) -> Result<()> {
        self.loading.show(MSG_LOADING_STAGED);
        let result = self.refresh_staged().await;
        self.loading.hide();
        result
    }

    async fn refresh_visible(&mut self) -> Result<()> {
        match self.store.list_photos().await {
            Ok(photos) => {
                debug!("Loaded {} visible photos", photos.len());
                self.visible = photos;
                self.clamp_cursor();
                Ok(())
            }
            Err(e) if e.is_transient() => {
                warn!("Photo service unavailable, showing no photos: {}", e);
                self.visible.clear();
                self.clamp_cursor();
                Ok(())
            }
            Err(e) => {
                error!("Error loading photos: {}", e);
                self.visible.clear();
                self.clamp_cursor();
                Err(e)
            }
        }
    }

    async fn refresh_staged(&mut self) -> Result<()> {
        match self.store.list_staged().await {
            Ok(staged) => {
                debug!("Loaded {} staged photos", staged.len());
                self.staged = staged;
                Ok(())
            }
            Err(e) if e.is_transient() => {
                warn!("Photo service unavailable, showing no staged photos: {}", e);
                self.staged.clear();
                Ok(())
            }
            Err(e) => {
                error!("Error loading staged photos: {}", e);
                self.staged.clear();
                Err(e)
            }
        }
    }

    async fn refresh_both(&mut self) -> Result<()> {
        let visible = self.refresh_visible().await;
        let staged = self.refresh_staged().await;
        visible.and(staged)
    }

    /// Replaces a visible photo's record with a fresh read from the store.
    ///
    /// A photo the library no longer has keeps its old record.
    pub async fn refresh_asset(&mut self, id: &AssetId) -> Result<()> {
        let Some(fresh) = self.store.get_one(id).await? else {
            debug!("{} is gone, keeping its old record", id);
            return Ok(());
        };
        if let Some(slot) = self.visible.iter_mut().find(|a| &a.id == id) {
            *slot = fresh;
        }
        Ok(())
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.visible.len());
    }

    /// Moves one photo to staging and advances past it.
    ///
    /// The cursor is not moved if the store rejects the move.
    pub async fn commit_discard(&mut self, id: &AssetId) -> Result<()> {
        self.loading.show(MSG_MOVING);

        if let Err(e) = self.store.move_to_staging(std::slice::from_ref(id)).await {
            error!("Error moving {} to yeeted: {}", id, e);
            self.loading.hide();
            return Err(e);
        }

        let reviewed: HashSet<AssetId> = self
            .visible
            .iter()
            .take(self.cursor + 1)
            .map(|a| a.id.clone())
            .collect();

        let result = self.refresh_both().await;

        // Lands just past every reviewed photo that is still visible
        self.cursor = self
            .visible
            .iter()
            .filter(|a| reviewed.contains(&a.id))
            .count()
            .min(self.visible.len());

        info!("Yeeted {}", id);
        self.loading.hide();
        result
    }

    /// Advances past the current photo without touching the library.
    pub fn commit_keep(&mut self) {
        if self.cursor < self.visible.len() {
            self.cursor += 1;
        }
        debug!("Kept photo, cursor at {}/{}", self.cursor, self.visible.len());
    }

    /// Moves photos out of staging back into the library.
    pub async fn restore(&mut self, ids: &[AssetId]) -> Result<()> {
        self.loading.show(MSG_RESTORING);

        let result = match self.store.restore_from_staging(ids).await {
            Ok(()) => {
                info!("Restored {} photo(s)", ids.len());
                self.refresh_both().await
            }
            Err(e) => {
                error!("Error restoring photos: {}", e);
                Err(e)
            }
        };

        self.loading.hide();
        result
    }

    /// Permanently deletes staged photos and re-fetches the staged list.
    pub async fn delete_many(&mut self, ids: &[AssetId]) -> Result<DeleteReport> {
        self.loading.show(MSG_DELETING);

        let result = self.store.delete_permanently(ids).await;
        let refreshed = self.refresh_staged().await;

        self.loading.hide();
        let report = result?;
        refreshed?;
        Ok(report)
    }

    /// Permanently deletes everything in staging.
    pub async fn clear_staged(&mut self) -> Result<()> {
        self.loading.show(MSG_DELETING);

        let result = self.store.clear_staging().await;
        let refreshed = self.refresh_staged().await;

        self.loading.hide();
        result.and(refreshed)
    }

    /// Starts the review over without re-fetching.
    pub fn restart(&mut self) {
        self.cursor = 0;
    }
}
