//! User configuration and persisted app state

use crate::error::{Result, YeetError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const APP_DIR: &str = "photoyeet";

/// Secure-store key recording that gallery access was granted before
pub const GALLERY_PERMISSION_KEY: &str = "galleryPermission";

const SECURE_STORE_FILE: &str = "secure-store.json";

#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UserConfig {
    /// Whether the welcome dialog has been shown
    pub welcome_shown: bool,
}

impl UserConfig {
    /// Get the config file path (~/.config/photoyeet/config.json)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
    }

    /// Load config from the default location, or defaults if missing
    pub fn load() -> Result<Self> {
        let path = Self::config_path().ok_or_else(|| {
            YeetError::ConfigError("Could not determine config directory".to_string())
        })?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| YeetError::ConfigError(format!("Failed to read config file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| YeetError::ConfigError(format!("Failed to parse config file: {}", e)))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            YeetError::ConfigError("Could not determine config directory".to_string())
        })?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                YeetError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| YeetError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, contents)
            .map_err(|e| YeetError::ConfigError(format!("Failed to write config file: {}", e)))
    }
}

/// App-scoped key-value store, readable only by the current user.
#[derive(Debug, Clone)]
pub struct SecureStore {
    path: PathBuf,
}

impl SecureStore {
    /// Store kept inside the app's sandbox directory
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SECURE_STORE_FILE))
    }

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(values)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)?;
        debug!("Stored secure value for '{}'", key);
        Ok(())
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }

    /// Whether gallery consent was recorded on an earlier launch
    pub fn gallery_permission_granted(&self) -> bool {
        matches!(self.get(GALLERY_PERMISSION_KEY), Ok(Some(value)) if value == "true")
    }

    pub fn record_gallery_permission(&self) -> Result<()> {
        self.set(GALLERY_PERMISSION_KEY, "true")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    mod user_config_tests {
        use super::*;

        #[test]
        fn test_default_config() {
            let config = UserConfig::default();
            assert!(!config.welcome_shown);
        }

        #[test]
        fn test_save_and_load() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("nested/config.json");

            UserConfig {
                welcome_shown: true,
            }
            .save_to(&path)
            .unwrap();

            let loaded = UserConfig::load_from(&path).unwrap();
            assert!(loaded.welcome_shown);
        }

        #[test]
        fn test_missing_file_is_default() {
            let temp_dir = TempDir::new().unwrap();
            let loaded = UserConfig::load_from(&temp_dir.path().join("none.json")).unwrap();
            assert_eq!(loaded, UserConfig::default());
        }

        #[test]
        fn test_corrupt_file_is_config_error() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("config.json");
            fs::write(&path, "{ not json").unwrap();

            let result = UserConfig::load_from(&path);
            assert!(matches!(result, Err(YeetError::ConfigError(_))));
        }
    }

    mod secure_store_tests {
        use super::*;

        #[test]
        fn test_get_set_delete() {
            let temp_dir = TempDir::new().unwrap();
            let store = SecureStore::in_dir(temp_dir.path());

            assert_eq!(store.get("k").unwrap(), None);
            store.set("k", "v").unwrap();
            assert_eq!(store.get("k").unwrap(), Some("v".to_string()));

            store.delete("k").unwrap();
            assert_eq!(store.get("k").unwrap(), None);
        }

        #[test]
        fn test_gallery_permission_flag() {
            let temp_dir = TempDir::new().unwrap();
            let store = SecureStore::in_dir(temp_dir.path());

            assert!(!store.gallery_permission_granted());
            store.record_gallery_permission().unwrap();
            assert!(store.gallery_permission_granted());

            let raw = fs::read_to_string(store.path()).unwrap();
            assert!(raw.contains("\"galleryPermission\": \"true\""));
        }

        #[test]
        fn test_other_values_do_not_count_as_granted() {
            let temp_dir = TempDir::new().unwrap();
            let store = SecureStore::in_dir(temp_dir.path());
            store.set(GALLERY_PERMISSION_KEY, "false").unwrap();
            assert!(!store.gallery_permission_granted());
        }

        #[cfg(unix)]
        #[test]
        fn test_file_is_private() {
            use std::os::unix::fs::PermissionsExt;

            let temp_dir = TempDir::new().unwrap();
            let store = SecureStore::in_dir(temp_dir.path());
            store.set("k", "v").unwrap();

            let mode = fs::metadata(store.path()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
