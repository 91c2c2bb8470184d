// Background photo preview loading with an LRU cache

use crate::domain::{AssetId, PhotoAsset};
use crate::preview::{generate_preview, PreviewContent};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Maximum number of cached previews
const CACHE_SIZE: usize = 16;
const QUEUE_SIZE: usize = 32;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A preview is specific to an asset and the cell budget it was sized for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewKey {
    pub id: AssetId,
    pub cols: u16,
    pub rows: u16,
}

impl PreviewKey {
    pub fn new(asset: &PhotoAsset, cols: u16, rows: u16) -> Self {
        Self {
            id: asset.id.clone(),
            cols,
            rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreviewState {
    Loading,
    Ready(PreviewContent),
    Error(String),
}

enum PreviewRequest {
    Load {
        asset: PhotoAsset,
        key: PreviewKey,
        /// `None` for prefetches
        response_tx: Option<oneshot::Sender<PreviewState>>,
    },
    Shutdown,
}

#[derive(Debug)]
struct PreviewCache {
    cache: HashMap<PreviewKey, PreviewContent>,
    /// Most recently used at the end
    access_order: Vec<PreviewKey>,
    max_size: usize,
}

impl PreviewCache {
    fn new(max_size: usize) -> Self {
        Self {
            cache: HashMap::new(),
            access_order: Vec::new(),
            max_size,
        }
    }

    fn get(&mut self, key: &PreviewKey) -> Option<PreviewContent> {
        let preview = self.cache.get(key)?.clone();
        self.access_order.retain(|k| k != key);
        self.access_order.push(key.clone());
        Some(preview)
    }

    fn insert(&mut self, key: PreviewKey, preview: PreviewContent) {
        if self.cache.contains_key(&key) {
            self.access_order.retain(|k| k != &key);
        } else if self.cache.len() >= self.max_size && !self.access_order.is_empty() {
            let oldest = self.access_order.remove(0);
            self.cache.remove(&oldest);
        }

        self.cache.insert(key.clone(), preview);
        self.access_order.push(key);
    }

    fn contains(&self, key: &PreviewKey) -> bool {
        self.cache.contains_key(key)
    }

    /// Drops every size variant of one asset
    fn forget(&mut self, id: &AssetId) {
        self.cache.retain(|k, _| &k.id != id);
        self.access_order.retain(|k| &k.id != id);
    }

    fn len(&self) -> usize {
        self.cache.len()
    }

    fn clear(&mut self) {
        self.cache.clear();
        self.access_order.clear();
    }
}

/// Locks ignoring poisoning; the cache stays consistent between statements.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Handle to the background preview worker. Cheap to clone.
#[derive(Clone)]
pub struct PreviewLoader {
    request_tx: mpsc::Sender<PreviewRequest>,
    cache: Arc<Mutex<PreviewCache>>,
    /// Key the UI is currently waiting for; stale queued requests are skipped
    wanted: Arc<Mutex<Option<PreviewKey>>>,
}

impl PreviewLoader {
    /// Spawns the worker on the current tokio runtime.
    pub fn new() -> Self {
        let (request_tx, request_rx) = mpsc::channel(QUEUE_SIZE);
        let cache = Arc::new(Mutex::new(PreviewCache::new(CACHE_SIZE)));
        let wanted = Arc::new(Mutex::new(None));

        tokio::spawn(Self::worker(
            request_rx,
            Arc::clone(&cache),
            Arc::clone(&wanted),
        ));

        Self {
            request_tx,
            cache,
            wanted,
        }
    }

    async fn worker(
        mut request_rx: mpsc::Receiver<PreviewRequest>,
        cache: Arc<Mutex<PreviewCache>>,
        wanted: Arc<Mutex<Option<PreviewKey>>>,
    ) {
        while let Some(request) = request_rx.recv().await {
            let (asset, key, response_tx) = match request {
                PreviewRequest::Load {
                    asset,
                    key,
                    response_tx,
                } => (asset, key, response_tx),
                PreviewRequest::Shutdown => break,
            };

            if let Some(cached) = lock(&cache).get(&key) {
                if let Some(tx) = response_tx {
                    let _ = tx.send(PreviewState::Ready(cached));
                }
                continue;
            }

            let stale = response_tx.is_some() && lock(&wanted).as_ref() != Some(&key);
            if stale {
                debug!("Skipping stale preview request for {}", key.id);
                continue;
            }

            let (cols, rows) = (key.cols, key.rows);
            let result =
                tokio::task::spawn_blocking(move || generate_preview(&asset, cols, rows)).await;

            let state = match result {
                Ok(preview) => {
                    lock(&cache).insert(key.clone(), preview.clone());
                    PreviewState::Ready(preview)
                }
                Err(e) => {
                    warn!("Preview task for {} failed: {}", key.id, e);
                    PreviewState::Error(format!("Preview failed: {}", e))
                }
            };

            if let Some(tx) = response_tx {
                let _ = tx.send(state);
            }
        }
        debug!("Preview worker stopped");
    }

    /// Loads a preview and waits for it.
    pub async fn request_preview(&self, asset: &PhotoAsset, cols: u16, rows: u16) -> PreviewState {
        let key = PreviewKey::new(asset, cols, rows);
        if let Some(cached) = self.cached(&key) {
            return PreviewState::Ready(cached);
        }

        *lock(&self.wanted) = Some(key.clone());
        let (response_tx, response_rx) = oneshot::channel();
        let request = PreviewRequest::Load {
            asset: asset.clone(),
            key,
            response_tx: Some(response_tx),
        };

        if self.request_tx.send(request).await.is_err() {
            return PreviewState::Error("Preview loader shut down".to_string());
        }

        match tokio::time::timeout(REQUEST_TIMEOUT, response_rx).await {
            Ok(Ok(state)) => state,
            Ok(Err(_)) => PreviewState::Error("Preview request dropped".to_string()),
            Err(_) => PreviewState::Error("Preview timed out".to_string()),
        }
    }

    /// Queues a preview for the cache without waiting. Silently dropped when the queue is full.
    pub fn prefetch(&self, asset: &PhotoAsset, cols: u16, rows: u16) {
        let key = PreviewKey::new(asset, cols, rows);
        if lock(&self.cache).contains(&key) {
            return;
        }
        let _ = self.request_tx.try_send(PreviewRequest::Load {
            asset: asset.clone(),
            key,
            response_tx: None,
        });
    }

    pub fn cached(&self, key: &PreviewKey) -> Option<PreviewContent> {
        lock(&self.cache).get(key)
    }

    pub fn is_cached(&self, key: &PreviewKey) -> bool {
        lock(&self.cache).contains(key)
    }

    /// Drops cached previews of an asset that left the library.
    pub fn forget(&self, id: &AssetId) {
        lock(&self.cache).forget(id);
    }

    pub fn cache_size(&self) -> usize {
        lock(&self.cache).len()
    }

    pub fn clear_cache(&self) {
        lock(&self.cache).clear();
    }

    pub async fn shutdown(&self) {
        let _ = self.request_tx.send(PreviewRequest::Shutdown).await;
    }

    fn try_load(&self, asset: &PhotoAsset, key: &PreviewKey) -> Option<oneshot::Receiver<PreviewState>> {
        let (response_tx, response_rx) = oneshot::channel();
        let request = PreviewRequest::Load {
            asset: asset.clone(),
            key: key.clone(),
            response_tx: Some(response_tx),
        };
        self.request_tx.try_send(request).ok().map(|_| response_rx)
    }
}

impl Default for PreviewLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Polling front end for the render loop.
///
/// Never blocks: a request that is not cached returns `Loading` and the
/// result is picked up by a later call.
pub struct PreviewManager {
    loader: PreviewLoader,
    current_key: Option<PreviewKey>,
    current_state: PreviewState,
    receiver: Option<oneshot::Receiver<PreviewState>>,
}

impl PreviewManager {
    pub fn new(loader: PreviewLoader) -> Self {
        Self {
            loader,
            current_key: None,
            current_state: PreviewState::Loading,
            receiver: None,
        }
    }

    pub fn loader(&self) -> &PreviewLoader {
        &self.loader
    }

    /// Preview of `asset` at the given size, as far as it has loaded.
    pub fn request(&mut self, asset: &PhotoAsset, cols: u16, rows: u16) -> &PreviewState {
        let key = PreviewKey::new(asset, cols, rows);

        if self.current_key.as_ref() != Some(&key) {
            self.current_key = Some(key.clone());
            self.receiver = None;
            *lock(&self.loader.wanted) = Some(key.clone());

            if let Some(cached) = self.loader.cached(&key) {
                self.current_state = PreviewState::Ready(cached);
                return &self.current_state;
            }
            self.current_state = PreviewState::Loading;
        }

        if self.current_state == PreviewState::Loading {
            match self.receiver.as_mut() {
                // Queue was full last time; retry
                None => self.receiver = self.loader.try_load(asset, &key),
                Some(rx) => match rx.try_recv() {
                    Ok(state) => {
                        self.current_state = state;
                        self.receiver = None;
                    }
                    Err(oneshot::error::TryRecvError::Empty) => {}
                    Err(oneshot::error::TryRecvError::Closed) => {
                        self.receiver = None;
                        self.current_state = match self.loader.cached(&key) {
                            Some(cached) => PreviewState::Ready(cached),
                            None => PreviewState::Error("Preview channel closed".to_string()),
                        };
                    }
                },
            }
        }

        &self.current_state
    }

    pub fn current_state(&self) -> &PreviewState {
        &self.current_state
    }

    pub fn reset(&mut self) {
        self.current_key = None;
        self.current_state = PreviewState::Loading;
        self.receiver = None;
    }
}
