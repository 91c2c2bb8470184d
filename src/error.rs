//! Error types shared across the crate

use std::io;
use thiserror::Error;

/// Substrings the media service uses when its backing connection drops.
const SERVICE_CONNECTION_MARKERS: &[&str] = &["connection to service", "CoreData"];

#[derive(Debug, Error)]
pub enum YeetError {
    /// The user declined (or revoked) access to the photo library
    #[error("Media library permission not granted: {0}")]
    PermissionDenied(String),

    /// The media service could not be reached; it recovers on its own
    #[error("Photo library connection temporarily unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Album not found: {0}")]
    AlbumNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    ConfigError(String),

    /// A swipe command was sent to a card that is no longer mounted
    #[error("Swipe card is no longer mounted")]
    CardUnmounted,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, YeetError>;

impl YeetError {
    /// Whether this error belongs to the recoverable "service connection" class.
    ///
    /// Callers treat such failures as empty results instead of surfacing them.
    pub fn is_transient(&self) -> bool {
        match self {
            YeetError::ServiceUnavailable(_) => true,
            YeetError::Io(e) => {
                matches!(
                    e.kind(),
                    io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) || mentions_service_connection(&e.to_string())
            }
            _ => false,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        match self {
            YeetError::PermissionDenied(_) => true,
            YeetError::Io(e) => e.kind() == io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }
}

fn mentions_service_connection(message: &str) -> bool {
    SERVICE_CONNECTION_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}
