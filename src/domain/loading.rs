// Loading overlay state, shared between the collection and the UI

use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingStatus {
    pub visible: bool,
    pub message: String,
}

/// Publishes the loading overlay state.
///
/// Cloning shares the same channel; every clone and every subscriber sees
/// the latest `show`/`hide`.
#[derive(Debug, Clone)]
pub struct LoadingIndicator {
    sender: watch::Sender<LoadingStatus>,
}

impl Default for LoadingIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingIndicator {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(LoadingStatus::default());
        Self { sender }
    }

    pub fn show(&self, message: impl Into<String>) {
        let message = message.into();
        self.sender.send_modify(|status| {
            status.visible = true;
            status.message = message;
        });
    }

    pub fn hide(&self) {
        self.sender.send_modify(|status| {
            status.visible = false;
            status.message.clear();
        });
    }

    pub fn status(&self) -> LoadingStatus {
        self.sender.borrow().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.sender.borrow().visible
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadingStatus> {
        self.sender.subscribe()
    }
}
