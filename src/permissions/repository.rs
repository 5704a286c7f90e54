//! Repository of per-domain location permission grants
//!
//! The repository is the single source of truth for the grant list. Observers
//! receive the full list through a [`PermissionsFeed`] every time it changes.

use async_trait::async_trait;
use tokio::sync::watch;

use super::types::{LocationPermissionEntity, LocationPermissionType};
use crate::core::GeopermsResult;

/// Push-based feed of the current grant list
///
/// New receivers see the current list immediately and every later change.
pub type PermissionsFeed = watch::Receiver<Vec<LocationPermissionEntity>>;

/// Storage for location permission grants
#[async_trait]
pub trait LocationPermissionsRepository: Send + Sync {
    /// Subscribe to the grant list
    fn location_permissions_feed(&self) -> PermissionsFeed;

    /// Remove the grant for a domain
    ///
    /// Removing a domain with no grant is not an error.
    async fn remove_location_permission(&self, domain: &str) -> GeopermsResult<()>;

    /// Insert or replace the grant for a domain
    async fn save_location_permission(
        &self,
        domain: &str,
        permission: LocationPermissionType,
    ) -> GeopermsResult<()>;

    /// Look up the grant for a domain
    async fn get_domain_permission(
        &self,
        domain: &str,
    ) -> GeopermsResult<Option<LocationPermissionEntity>> {
        let feed = self.location_permissions_feed();
        let found = feed.borrow().iter().find(|e| e.domain == domain).cloned();
        Ok(found)
    }

    /// Check whether any grant exists for a domain
    async fn has_location_permission(&self, domain: &str) -> GeopermsResult<bool> {
        Ok(self.get_domain_permission(domain).await?.is_some())
    }
}

/// Replace the grant for `domain` in place, or append it
pub(crate) fn upsert(
    entities: &mut Vec<LocationPermissionEntity>,
    domain: &str,
    permission: LocationPermissionType,
) {
    match entities.iter_mut().find(|e| e.domain == domain) {
        Some(existing) => existing.permission = permission,
        None => entities.push(LocationPermissionEntity::new(domain, permission)),
    }
}

/// Drop the grant for `domain`; returns whether anything was removed
pub(crate) fn remove(entities: &mut Vec<LocationPermissionEntity>, domain: &str) -> bool {
    let before = entities.len();
    entities.retain(|e| e.domain != domain);
    entities.len() != before
}

/// Repository that keeps grants in memory only
pub struct InMemoryLocationPermissionsRepository {
    entities: watch::Sender<Vec<LocationPermissionEntity>>,
}

impl InMemoryLocationPermissionsRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::with_entities(Vec::new())
    }

    /// Create a repository seeded with grants
    pub fn with_entities(entities: Vec<LocationPermissionEntity>) -> Self {
        let (tx, _rx) = watch::channel(entities);
        Self { entities: tx }
    }

    /// Snapshot of the stored grants
    pub fn entities(&self) -> Vec<LocationPermissionEntity> {
        self.entities.borrow().clone()
    }
}

impl Default for InMemoryLocationPermissionsRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationPermissionsRepository for InMemoryLocationPermissionsRepository {
    fn location_permissions_feed(&self) -> PermissionsFeed {
        self.entities.subscribe()
    }

    async fn remove_location_permission(&self, domain: &str) -> GeopermsResult<()> {
        let removed = self.entities.send_if_modified(|list| remove(list, domain));
        tracing::debug!("Removed location permission for {}: {}", domain, removed);
        Ok(())
    }

    async fn save_location_permission(
        &self,
        domain: &str,
        permission: LocationPermissionType,
    ) -> GeopermsResult<()> {
        tracing::debug!("Saving location permission {:?} for {}", permission, domain);
        self.entities
            .send_modify(|list| upsert(list, domain, permission));
        Ok(())
    }
}
