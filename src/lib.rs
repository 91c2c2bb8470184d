//! Photoyeet - swipe through a photo library in the terminal
//!
//! Drag a photo right to keep it or left to yeet it. Yeeted photos wait in
//! a staging area until they are restored or permanently deleted.

pub mod app;
pub mod async_preview;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod library;
pub mod logging;
pub mod preview;
pub mod store;
pub mod swipe;
pub mod tui;

// Re-export primary types for convenience
pub use app::{App, AppCommand, AppSettings, ViewState};
pub use cli::{AppConfig, Args};
pub use config::{SecureStore, UserConfig};
pub use domain::{
    AssetId, CollectionStatus, LoadingIndicator, PhotoAsset, PhotoCollection, SortBy,
};
pub use error::{Result, YeetError};
pub use library::{LocalLibrary, MediaLibrary};
pub use store::{AssetStore, DeleteReport, StagingMode};
pub use swipe::{SwipeCard, SwipeConfig};
