// Read and write/delete grants as seen by the UI

use crate::error::Result;
use crate::library::{MediaLibrary, PermissionResponse};
use tracing::{debug, error};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionState {
    /// `None` until the first check completes
    pub has_media_permissions: Option<bool>,
    pub has_delete_permissions: Option<bool>,
    pub is_loading: bool,
}

impl PermissionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_checked(&self) -> bool {
        self.has_media_permissions.is_some()
    }

    /// Gallery can be browsed
    pub fn is_granted(&self) -> bool {
        self.has_media_permissions == Some(true)
    }

    pub fn can_delete(&self) -> bool {
        self.has_delete_permissions == Some(true)
    }

    /// Reads both grants without prompting.
    pub async fn check(&mut self, library: &dyn MediaLibrary) -> bool {
        self.update(library, false).await
    }

    /// Asks for both grants.
    pub async fn request(&mut self, library: &dyn MediaLibrary) -> bool {
        self.update(library, true).await
    }

    async fn update(&mut self, library: &dyn MediaLibrary, prompt: bool) -> bool {
        self.is_loading = true;

        let result = fetch_grants(library, prompt).await;

        match result {
            Ok((read, write)) => {
                debug!("Permissions: read {:?}, write {:?}", read, write);
                self.has_media_permissions = Some(read.is_full_access());
                self.has_delete_permissions = Some(write.is_granted());
            }
            Err(e) => {
                error!("Error checking permissions: {}", e);
                self.has_media_permissions = Some(false);
                self.has_delete_permissions = Some(false);
            }
        }

        self.is_loading = false;
        self.is_granted()
    }
}

async fn fetch_grants(
    library: &dyn MediaLibrary,
    prompt: bool,
) -> Result<(PermissionResponse, PermissionResponse)> {
    if prompt {
        Ok((
            library.request_permissions(false).await?,
            library.request_permissions(true).await?,
        ))
    } else {
        Ok((library.permissions(false).await?, library.permissions(true).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::testing::FlakyLibrary;
    use crate::library::LocalLibrary;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_unchecked_by_default() {
        let state = PermissionState::new();
        assert!(!state.is_checked());
        assert!(!state.is_granted());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_check_grants_both_for_writable_library() {
        let temp_dir = TempDir::new().unwrap();
        let library = LocalLibrary::new(temp_dir.path());
        let mut state = PermissionState::new();

        assert!(state.check(&library).await);
        assert_eq!(state.has_media_permissions, Some(true));
        assert_eq!(state.has_delete_permissions, Some(true));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_request_on_missing_library_denies() {
        let library = LocalLibrary::new("/nonexistent/photoyeet/library");
        let mut state = PermissionState::new();

        assert!(!state.request(&library).await);
        assert_eq!(state.has_media_permissions, Some(false));
        assert_eq!(state.has_delete_permissions, Some(false));
    }

    #[tokio::test]
    async fn test_grants_are_independent() {
        let temp_dir = TempDir::new().unwrap();
        let library = FlakyLibrary::new(temp_dir.path());
        library.set(&library.deny_write, true);
        let mut state = PermissionState::new();

        assert!(state.check(&library).await);
        assert!(state.is_granted());
        assert!(!state.can_delete());
    }
}
