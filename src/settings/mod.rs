//! Settings data store
//!
//! Holds the app-wide "location access enabled" flag. Reads and writes are
//! synchronous; the JSON store writes through on every change.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::core::fs::temp_path;
use crate::core::{GeopermsError, GeopermsResult};

/// Default file name for persisted settings
pub const SETTINGS_FILE: &str = "settings.json";

/// Synchronous key-value settings used by the view-model
pub trait SettingsDataStore: Send + Sync {
    /// Whether the app may use location at all
    fn app_location_permission(&self) -> bool;

    /// Persist the app-wide location flag
    fn set_app_location_permission(&self, enabled: bool) -> GeopermsResult<()>;
}

/// Settings held in memory only
#[derive(Debug, Default)]
pub struct InMemorySettingsDataStore {
    app_location_permission: AtomicBool,
}

impl InMemorySettingsDataStore {
    /// Create a store with the given initial flag
    pub fn new(app_location_permission: bool) -> Self {
        Self {
            app_location_permission: AtomicBool::new(app_location_permission),
        }
    }
}

impl SettingsDataStore for InMemorySettingsDataStore {
    fn app_location_permission(&self) -> bool {
        self.app_location_permission.load(Ordering::SeqCst)
    }

    fn set_app_location_permission(&self, enabled: bool) -> GeopermsResult<()> {
        self.app_location_permission.store(enabled, Ordering::SeqCst);
        Ok(())
    }
}

/// On-disk settings document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app_location_permission: bool,
}

/// Settings persisted to a JSON file
#[derive(Debug)]
pub struct JsonSettingsDataStore {
    path: PathBuf,
    settings: Mutex<Settings>,
}

impl JsonSettingsDataStore {
    /// Open the store at `path`; a missing file yields default settings
    pub fn open(path: impl Into<PathBuf>) -> GeopermsResult<Self> {
        let path = path.into();
        let settings = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader)?
        } else {
            Settings::default()
        };
        tracing::info!("Settings loaded from {}: {:?}", path.display(), settings);

        Ok(Self {
            path,
            settings: Mutex::new(settings),
        })
    }

    /// Open the store using the default file name inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> GeopermsResult<Self> {
        Self::open(dir.as_ref().join(SETTINGS_FILE))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, settings: &Settings) -> GeopermsResult<()> {
        self.write_file(settings).map_err(|e| {
            GeopermsError::Settings(format!("failed to write {}: {}", self.path.display(), e))
        })
    }

    /// Write to a sibling temp file, then rename it over the settings file
    fn write_file(&self, settings: &Settings) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = temp_path(&self.path);
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut writer, settings)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);

        fs::rename(&tmp, &self.path)
    }
}

impl SettingsDataStore for JsonSettingsDataStore {
    fn app_location_permission(&self) -> bool {
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .app_location_permission
    }

    fn set_app_location_permission(&self, enabled: bool) -> GeopermsResult<()> {
        let mut settings = self.settings.lock().unwrap_or_else(PoisonError::into_inner);
        let mut updated = settings.clone();
        updated.app_location_permission = enabled;
        self.save(&updated)?;
        *settings = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_in_memory_last_write_wins() {
        let store = InMemorySettingsDataStore::default();
        assert!(!store.app_location_permission());

        store.set_app_location_permission(true).unwrap();
        store.set_app_location_permission(false).unwrap();
        assert!(!store.app_location_permission());
    }

    #[test]
    fn test_json_store_defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let store = JsonSettingsDataStore::in_dir(dir.path()).unwrap();

        assert!(!store.app_location_permission());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_json_store_persists() {
        let dir = TempDir::new().unwrap();
        let store = JsonSettingsDataStore::in_dir(dir.path()).unwrap();
        store.set_app_location_permission(true).unwrap();

        let reopened = JsonSettingsDataStore::in_dir(dir.path()).unwrap();
        assert!(reopened.app_location_permission());
    }

    #[test]
    fn test_json_store_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = JsonSettingsDataStore::in_dir(dir.path()).unwrap();
        store.set_app_location_permission(true).unwrap();

        assert!(store.path().exists());
        assert!(!temp_path(store.path()).exists());
    }

    #[test]
    fn test_json_store_write_failure_keeps_value() {
        let dir = TempDir::new().unwrap();
        let store = JsonSettingsDataStore::in_dir(dir.path()).unwrap();
        fs::create_dir(temp_path(store.path())).unwrap();

        let result = store.set_app_location_permission(true);

        assert!(matches!(result, Err(GeopermsError::Settings(_))));
        assert!(!store.app_location_permission());
        assert!(!store.path().exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_json_store_reports_failed_flush() {
        let dir = TempDir::new().unwrap();
        let store = JsonSettingsDataStore::in_dir(dir.path()).unwrap();
        std::os::unix::fs::symlink("/dev/full", temp_path(store.path())).unwrap();

        let result = store.set_app_location_permission(true);

        assert!(matches!(result, Err(GeopermsError::Settings(_))));
        assert!(!store.app_location_permission());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_json_store_tolerates_missing_key() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{}").unwrap();

        let store = JsonSettingsDataStore::in_dir(dir.path()).unwrap();
        assert!(!store.app_location_permission());
    }
}
