//! JSON file backed permissions repository
//!
//! The whole grant list lives in a single pretty-printed JSON array. Every
//! mutation is written to disk before it is published on the feed.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};

use super::repository::{self, LocationPermissionsRepository, PermissionsFeed};
use super::types::{LocationPermissionEntity, LocationPermissionType};
use crate::core::fs::temp_path;
use crate::core::GeopermsResult;

/// Default file name for stored grants
pub const PERMISSIONS_FILE: &str = "location_permissions.json";

/// Repository persisting grants to a JSON file
pub struct JsonFileLocationPermissionsRepository {
    path: PathBuf,
    entities: watch::Sender<Vec<LocationPermissionEntity>>,
    /// Serializes read-modify-write cycles against the file
    write_lock: Mutex<()>,
}

impl JsonFileLocationPermissionsRepository {
    /// Open the repository at `path`, loading any grants already stored there
    pub fn open(path: impl Into<PathBuf>) -> GeopermsResult<Self> {
        let path = path.into();
        let entities = load_entities(&path)?;
        tracing::info!(
            "Loaded {} location permissions from {}",
            entities.len(),
            path.display()
        );

        let (tx, _rx) = watch::channel(entities);
        Ok(Self {
            path,
            entities: tx,
            write_lock: Mutex::new(()),
        })
    }

    /// Open the repository using the default file name inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> GeopermsResult<Self> {
        Self::open(dir.as_ref().join(PERMISSIONS_FILE))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `update` to a copy of the list, persist it, then publish it
    async fn mutate<F>(&self, update: F) -> GeopermsResult<()>
    where
        F: FnOnce(&mut Vec<LocationPermissionEntity>) -> bool + Send,
    {
        let _guard = self.write_lock.lock().await;

        let mut entities = self.entities.borrow().clone();
        if !update(&mut entities) {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(&entities)?;
        let tmp = temp_path(&self.path);
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        self.entities.send_replace(entities);
        Ok(())
    }
}

fn load_entities(path: &Path) -> GeopermsResult<Vec<LocationPermissionEntity>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let entities: Vec<LocationPermissionEntity> = serde_json::from_reader(reader)?;

    Ok(entities)
}

#[async_trait]
impl LocationPermissionsRepository for JsonFileLocationPermissionsRepository {
    fn location_permissions_feed(&self) -> PermissionsFeed {
        self.entities.subscribe()
    }

    async fn remove_location_permission(&self, domain: &str) -> GeopermsResult<()> {
        tracing::debug!("Removing location permission for {}", domain);
        self.mutate(|list| repository::remove(list, domain)).await
    }

    async fn save_location_permission(
        &self,
        domain: &str,
        permission: LocationPermissionType,
    ) -> GeopermsResult<()> {
        tracing::debug!("Saving location permission {:?} for {}", permission, domain);
        self.mutate(|list| {
            repository::upsert(list, domain, permission);
            true
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let repo = JsonFileLocationPermissionsRepository::in_dir(dir.path()).unwrap();

        assert!(repo.location_permissions_feed().borrow().is_empty());
        assert!(!repo.path().exists());
    }

    #[tokio::test]
    async fn test_grants_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let repo = JsonFileLocationPermissionsRepository::in_dir(dir.path()).unwrap();
            repo.save_location_permission("a.com", LocationPermissionType::AllowAlways)
                .await
                .unwrap();
            repo.save_location_permission("b.com", LocationPermissionType::DenyAlways)
                .await
                .unwrap();
            repo.save_location_permission("a.com", LocationPermissionType::DenyOnce)
                .await
                .unwrap();
            repo.remove_location_permission("b.com").await.unwrap();
        }

        let reopened = JsonFileLocationPermissionsRepository::in_dir(dir.path()).unwrap();
        let entities = reopened.location_permissions_feed().borrow().clone();
        assert_eq!(
            entities,
            vec![LocationPermissionEntity::new("a.com", LocationPermissionType::DenyOnce)]
        );
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_file() {
        let dir = TempDir::new().unwrap();
        let repo = JsonFileLocationPermissionsRepository::in_dir(dir.path()).unwrap();
        repo.save_location_permission("a.com", LocationPermissionType::AllowAlways)
            .await
            .unwrap();
        assert!(!temp_path(repo.path()).exists());

        fs::create_dir(temp_path(repo.path())).unwrap();
        let result = repo
            .save_location_permission("b.com", LocationPermissionType::DenyOnce)
            .await;
        assert!(result.is_err());
        assert_eq!(repo.location_permissions_feed().borrow().len(), 1);

        let reopened = JsonFileLocationPermissionsRepository::in_dir(dir.path()).unwrap();
        assert_eq!(
            reopened.location_permissions_feed().borrow().clone(),
            vec![LocationPermissionEntity::new("a.com", LocationPermissionType::AllowAlways)]
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PERMISSIONS_FILE);
        fs::write(&path, "not json").unwrap();

        let result = JsonFileLocationPermissionsRepository::open(&path);
        assert!(matches!(result, Err(crate::core::GeopermsError::Json(_))));
    }
}
