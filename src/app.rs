//! Screen state machine
//!
//! Input handlers are synchronous: they move between screens, drive the
//! swipe card and queue [`AppCommand`]s. The event loop drains the queue
//! with [`App::run`], which owns every await on the photo collection, so
//! at most one library operation is in flight at a time.

use crate::async_preview::{PreviewLoader, PreviewManager};
use crate::config::{SecureStore, UserConfig};
use crate::domain::collection::{
    MSG_DELETING, MSG_LOADING_PHOTOS, MSG_LOADING_STAGED, MSG_MOVING, MSG_RESTORING,
};
use crate::domain::{AssetId, CollectionStatus, PermissionState, PhotoAsset, PhotoCollection};
use crate::swipe::{CardEvent, CardHandle, SwipeCard, SwipeConfig, CELL_HEIGHT_PX, CELL_WIDTH_PX};
use crate::tui::input::{
    handle_confirm_input, handle_details_input, handle_key_event, handle_mouse_event,
    handle_permission_input, handle_staged_input, KeyAction, PointerAction,
};
use crossterm::event::{Event, KeyEvent, KeyEventKind, MouseEvent};
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub const MSG_LOAD_FAILED: &str =
    "Failed to load photos from your gallery. Please check your permissions and try again.";

/// UI view state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Gallery access missing
    Permission,
    /// Welcome screen shown on first launch
    Welcome,
    /// Swiping through photos
    Review,
    /// Metadata sheet for the current photo
    Details,
    /// Yeeted photos awaiting a decision
    Staged,
    /// Confirmation dialog for permanent deletion
    ConfirmDelete,
    /// Help overlay visible
    Help,
    /// Blocking error message
    Alert,
}

/// Library work queued by input handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    LoadPhotos,
    LoadStaged,
    Discard(AssetId),
    Restore(Vec<AssetId>),
    Delete(Vec<AssetId>),
    RequestPermission,
    /// Re-read a photo's record for the details sheet
    RefreshDetails(AssetId),
}

#[derive(Debug, Clone, Default)]
pub struct AppSettings {
    /// Show the welcome screen even if it was dismissed before
    pub show_welcome: bool,
    /// Where the dismissed-welcome flag is saved; `None` keeps it in memory
    pub config_path: Option<PathBuf>,
}

/// Mouse position where the current drag began
#[derive(Debug, Clone, Copy)]
struct DragStart {
    column: u16,
    row: u16,
}

pub struct App {
    collection: PhotoCollection,
    permissions: PermissionState,
    secure_store: SecureStore,
    user_config: UserConfig,
    settings: AppSettings,
    card: SwipeCard,
    card_handle: CardHandle,
    previews: PreviewManager,
    view: ViewState,
    /// Screen to return to when help closes
    help_return: ViewState,
    alert: Option<String>,
    notice: Option<String>,
    staged_cursor: usize,
    /// Yeeted photos marked to keep
    keep_selection: HashSet<AssetId>,
    pending_delete: Vec<AssetId>,
    drag: Option<DragStart>,
    commands: VecDeque<AppCommand>,
    should_quit: bool,
}

impl App {
    /// Must be called inside a tokio runtime; the preview worker starts here.
    pub fn new(
        collection: PhotoCollection,
        secure_store: SecureStore,
        user_config: UserConfig,
        settings: AppSettings,
        columns: u16,
    ) -> Self {
        let card = SwipeCard::new(SwipeConfig::for_terminal(columns));
        let card_handle = card.handle();
        Self {
            collection,
            permissions: PermissionState::new(),
            secure_store,
            user_config,
            settings,
            card,
            card_handle,
            previews: PreviewManager::new(PreviewLoader::new()),
            view: ViewState::Permission,
            help_return: ViewState::Review,
            alert: None,
            notice: None,
            staged_cursor: 0,
            keep_selection: HashSet::new(),
            pending_delete: Vec::new(),
            drag: None,
            commands: VecDeque::new(),
            should_quit: false,
        }
    }

    pub fn collection(&self) -> &PhotoCollection {
        &self.collection
    }

    pub fn permissions(&self) -> &PermissionState {
        &self.permissions
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn card(&self) -> &SwipeCard {
        &self.card
    }

    pub fn card_handle(&self) -> &CardHandle {
        &self.card_handle
    }

    pub fn previews_mut(&mut self) -> &mut PreviewManager {
        &mut self.previews
    }

    /// Screen underneath the help overlay
    pub fn help_return(&self) -> ViewState {
        self.help_return
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn staged_cursor(&self) -> usize {
        self.staged_cursor
    }

    pub fn is_marked_keep(&self, id: &AssetId) -> bool {
        self.keep_selection.contains(id)
    }

    pub fn keep_count(&self) -> usize {
        self.keep_selection.len()
    }

    /// Staged photos that "Delete" would remove
    pub fn delete_candidates(&self) -> Vec<AssetId> {
        self.collection
            .staged()
            .iter()
            .filter(|a| !self.keep_selection.contains(&a.id))
            .map(|a| a.id.clone())
            .collect()
    }

    pub fn pending_delete_count(&self) -> usize {
        self.pending_delete.len()
    }

    pub fn highlighted_staged(&self) -> Option<&PhotoAsset> {
        self.collection.staged().get(self.staged_cursor)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn has_pending_commands(&self) -> bool {
        !self.commands.is_empty()
    }

    pub fn next_command(&mut self) -> Option<AppCommand> {
        self.commands.pop_front()
    }

    fn queue(&mut self, command: AppCommand) {
        debug!("Queued {:?}", command);
        self.commands.push_back(command);
    }

    /// Overlay text to show while `command` runs
    pub fn loading_message(&self, command: &AppCommand) -> Option<&'static str> {
        match command {
            AppCommand::LoadPhotos if !self.collection.has_loaded() => Some(MSG_LOADING_PHOTOS),
            AppCommand::LoadPhotos
            | AppCommand::RequestPermission
            | AppCommand::RefreshDetails(_) => None,
            AppCommand::LoadStaged => Some(MSG_LOADING_STAGED),
            AppCommand::Discard(_) => Some(MSG_MOVING),
            AppCommand::Restore(_) => Some(MSG_RESTORING),
            AppCommand::Delete(_) => Some(MSG_DELETING),
        }
    }

    /// Consent flow run once at launch.
    ///
    /// A consent recorded on an earlier launch only needs a status check;
    /// otherwise access is requested and recorded when granted.
    pub async fn start(&mut self) {
        let library = Arc::clone(self.collection.store().library());

        let granted = if self.secure_store.gallery_permission_granted() {
            debug!("Gallery consent recorded earlier, checking status");
            self.permissions.check(library.as_ref()).await
        } else {
            let granted = self.permissions.request(library.as_ref()).await;
            if granted {
                self.record_consent();
            }
            granted
        };

        if granted {
            self.enter_library();
        } else {
            info!("Gallery access not granted");
            self.view = ViewState::Permission;
        }
    }

    fn record_consent(&self) {
        if let Err(e) = self.secure_store.record_gallery_permission() {
            warn!("Failed to record gallery consent: {}", e);
        }
    }

    fn enter_library(&mut self) {
        self.view = if self.settings.show_welcome || !self.user_config.welcome_shown {
            ViewState::Welcome
        } else {
            ViewState::Review
        };
        self.queue(AppCommand::LoadPhotos);
        self.queue(AppCommand::LoadStaged);
    }

    /// Executes one queued command against the collection.
    pub async fn run(&mut self, command: AppCommand) {
        match command {
            AppCommand::LoadPhotos => {
                let first_load = !self.collection.has_loaded();
                if self.collection.load_visible().await.is_err() && first_load {
                    self.show_alert(MSG_LOAD_FAILED);
                }
                self.previews.reset();
            }
            AppCommand::LoadStaged => {
                if let Err(e) = self.collection.load_staged().await {
                    self.notice = Some(format!("Could not load yeeted photos: {}", e));
                }
                self.clamp_staged_cursor();
            }
            AppCommand::Discard(id) => {
                if let Err(e) = self.collection.commit_discard(&id).await {
                    self.notice = Some(format!("Could not yeet photo: {}", e));
                }
                self.previews.reset();
            }
            AppCommand::Restore(ids) => {
                match self.collection.restore(&ids).await {
                    Ok(()) => self.notice = Some(format!("Kept {} photo(s)", ids.len())),
                    Err(e) => self.notice = Some(format!("Could not restore photos: {}", e)),
                }
                self.clamp_staged_cursor();
                self.previews.reset();
            }
            AppCommand::Delete(ids) => {
                match self.collection.delete_many(&ids).await {
                    Ok(report) if report.is_complete() => {
                        self.notice = Some(format!("Deleted {} photo(s)", report.deleted.len()));
                    }
                    Ok(report) => {
                        self.notice = Some(format!(
                            "Deleted {} photo(s), {} failed",
                            report.deleted.len(),
                            report.failed.len()
                        ));
                    }
                    Err(e) => self.notice = Some(format!("Could not delete photos: {}", e)),
                }
                self.clamp_staged_cursor();
                self.previews.reset();
            }
            AppCommand::RequestPermission => {
                let library = Arc::clone(self.collection.store().library());
                if self.permissions.request(library.as_ref()).await {
                    self.record_consent();
                    self.enter_library();
                } else {
                    self.view = ViewState::Permission;
                }
            }
            AppCommand::RefreshDetails(id) => {
                if let Err(e) = self.collection.refresh_asset(&id).await {
                    warn!("Could not refresh details of {}: {}", id, e);
                }
            }
        }
    }

    fn show_alert(&mut self, message: &str) {
        error!("{}", message);
        self.alert = Some(message.to_string());
        self.view = ViewState::Alert;
    }

    fn clamp_staged_cursor(&mut self) {
        let len = self.collection.staged().len();
        self.staged_cursor = self.staged_cursor.min(len.saturating_sub(1));
    }

    pub fn resize(&mut self, columns: u16) {
        self.card.set_config(SwipeConfig::for_terminal(columns));
    }

    /// Entry point for terminal events
    pub fn handle_event(&mut self, event: Event, now: Instant) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse, now),
            Event::Resize(columns, _) => self.resize(columns),
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.notice = None;

        match self.view {
            ViewState::Permission => match handle_permission_input(key) {
                KeyAction::RequestPermission => self.queue(AppCommand::RequestPermission),
                KeyAction::Quit => self.should_quit = true,
                _ => {}
            },
            ViewState::Welcome => {
                // Any key dismisses welcome
                self.user_config.welcome_shown = true;
                if let Some(path) = &self.settings.config_path {
                    if let Err(e) = self.user_config.save_to(path) {
                        warn!("Failed to save user config: {}", e);
                    }
                }
                self.view = ViewState::Review;
            }
            ViewState::Alert => {
                self.alert = None;
                self.view = ViewState::Review;
            }
            ViewState::Help => {
                let action = handle_key_event(key);
                if matches!(action, KeyAction::Help | KeyAction::Quit | KeyAction::None) {
                    self.view = self.help_return;
                }
            }
            ViewState::Review => self.handle_review_key(key),
            ViewState::Details => match handle_details_input(key) {
                KeyAction::Open => self.open_current(),
                KeyAction::Back => self.view = ViewState::Review,
                KeyAction::Quit => self.should_quit = true,
                _ => {}
            },
            ViewState::Staged => self.handle_staged_key(key),
            ViewState::ConfirmDelete => match handle_confirm_input(key) {
                KeyAction::ConfirmDelete => {
                    let ids = std::mem::take(&mut self.pending_delete);
                    self.keep_selection.clear();
                    self.view = ViewState::Staged;
                    self.queue(AppCommand::Delete(ids));
                }
                KeyAction::CancelDelete => {
                    self.pending_delete.clear();
                    self.view = ViewState::Staged;
                }
                _ => {}
            },
        }
    }

    fn handle_review_key(&mut self, key: KeyEvent) {
        let status = self.collection.status();
        let reviewing = status == CollectionStatus::Reviewing;

        match handle_key_event(key) {
            KeyAction::Quit => self.should_quit = true,
            KeyAction::Keep if reviewing => self.send_to_card(self.card_handle.swipe_right()),
            KeyAction::Yeet if reviewing => self.send_to_card(self.card_handle.swipe_left()),
            KeyAction::Details if reviewing => self.send_to_card(self.card_handle.swipe_up()),
            KeyAction::Open if reviewing => self.open_current(),
            KeyAction::Restart if status == CollectionStatus::Exhausted => {
                self.collection.restart();
                self.previews.reset();
            }
            KeyAction::Staged => self.open_staged(),
            KeyAction::Help => {
                self.help_return = ViewState::Review;
                self.view = ViewState::Help;
            }
            _ => {}
        }
    }

    fn send_to_card(&mut self, result: crate::error::Result<()>) {
        if let Err(e) = result {
            warn!("Swipe trigger dropped: {}", e);
        }
    }

    fn open_staged(&mut self) {
        self.card.cancel_drag();
        self.drag = None;
        self.staged_cursor = 0;
        self.keep_selection.clear();
        self.view = ViewState::Staged;
        self.previews.reset();
        self.queue(AppCommand::LoadStaged);
    }

    fn handle_staged_key(&mut self, key: KeyEvent) {
        let len = self.collection.staged().len();

        match handle_staged_input(key) {
            KeyAction::Quit => self.should_quit = true,
            KeyAction::Next if self.staged_cursor + 1 < len => {
                self.staged_cursor += 1;
                self.previews.reset();
            }
            KeyAction::Previous if self.staged_cursor > 0 => {
                self.staged_cursor -= 1;
                self.previews.reset();
            }
            KeyAction::ToggleKeep => {
                if let Some(id) = self.highlighted_staged().map(|a| a.id.clone()) {
                    if !self.keep_selection.remove(&id) {
                        self.keep_selection.insert(id);
                    }
                }
            }
            KeyAction::KeepSelected if !self.keep_selection.is_empty() => {
                let ids: Vec<AssetId> = self
                    .collection
                    .staged()
                    .iter()
                    .filter(|a| self.keep_selection.contains(&a.id))
                    .map(|a| a.id.clone())
                    .collect();
                self.keep_selection.clear();
                self.queue(AppCommand::Restore(ids));
            }
            KeyAction::DeleteUnselected => {
                let ids = self.delete_candidates();
                if !ids.is_empty() {
                    self.pending_delete = ids;
                    self.view = ViewState::ConfirmDelete;
                }
            }
            KeyAction::Open => {
                if let Some(asset) = self.highlighted_staged() {
                    let path = asset.path.clone();
                    self.open_path(path);
                }
            }
            KeyAction::Back => {
                self.keep_selection.clear();
                self.view = ViewState::Review;
                self.previews.reset();
            }
            KeyAction::Help => {
                self.help_return = ViewState::Staged;
                self.view = ViewState::Help;
            }
            _ => {}
        }
    }

    fn open_current(&mut self) {
        if let Some(asset) = self.collection.current() {
            let path = asset.path.clone();
            self.open_path(path);
        }
    }

    fn open_path(&mut self, path: PathBuf) {
        info!("Opening {}", path.display());
        if let Err(e) = open::that_detached(&path) {
            warn!("Failed to open {}: {}", path.display(), e);
            self.notice = Some(format!("Could not open photo: {}", e));
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        if self.view != ViewState::Review
            || self.collection.status() != CollectionStatus::Reviewing
        {
            return;
        }

        match handle_mouse_event(mouse) {
            PointerAction::Press { column, row } => {
                if self.card.begin_drag(now) {
                    self.drag = Some(DragStart { column, row });
                }
            }
            PointerAction::Drag { column, row } => {
                if let Some(start) = self.drag {
                    let (dx, dy) = Self::translation(start, column, row);
                    self.card.drag(dx, dy, now);
                }
            }
            PointerAction::Release { column, row } => {
                if let Some(start) = self.drag.take() {
                    let (dx, dy) = Self::translation(start, column, row);
                    if let Some(event) = self.card.release(dx, dy, now) {
                        self.on_card_event(event);
                    }
                }
            }
            PointerAction::None => {}
        }
    }

    fn translation(start: DragStart, column: u16, row: u16) -> (f32, f32) {
        (
            (column as f32 - start.column as f32) * CELL_WIDTH_PX,
            (row as f32 - start.row as f32) * CELL_HEIGHT_PX,
        )
    }

    /// Advances card animations; runs about 60 times a second.
    pub fn on_tick(&mut self, now: Instant) {
        if let Some(event) = self.card.tick(now) {
            self.on_card_event(event);
        }
    }

    fn on_card_event(&mut self, event: CardEvent) {
        debug!("Card event {:?}", event);
        match event {
            CardEvent::SwipedLeft => {
                if let Some(id) = self.collection.current().map(|a| a.id.clone()) {
                    self.queue(AppCommand::Discard(id));
                }
            }
            CardEvent::SwipedRight => {
                self.collection.commit_keep();
                self.previews.reset();
            }
            CardEvent::SwipedUp => {
                if let Some(id) = self.collection.current().map(|a| a.id.clone()) {
                    self.view = ViewState::Details;
                    self.queue(AppCommand::RefreshDetails(id));
                }
            }
        }
    }

    /// Runs every queued command to completion.
    pub async fn drain_commands(&mut self) {
        while let Some(command) = self.next_command() {
            self.run(command).await;
        }
    }
}
