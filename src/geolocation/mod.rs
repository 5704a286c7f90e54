//! Platform geolocation permission store
//!
//! The web engine keeps its own record of which origins may read the
//! location. Removing a grant from the repository must also clear it here.

use async_trait::async_trait;
use std::collections::BTreeSet;
use tokio::sync::RwLock;

use crate::core::GeopermsResult;

/// Capability over the engine-level geolocation permissions
#[async_trait]
pub trait GeolocationPermissions: Send + Sync {
    /// Forget any decision for `domain`
    async fn clear(&self, domain: &str) -> GeopermsResult<()>;

    /// Allow `domain` to read the location
    async fn allow(&self, domain: &str) -> GeopermsResult<()>;

    /// Forget every stored decision
    async fn clear_all(&self) -> GeopermsResult<()>;

    /// Domains currently allowed, in sorted order
    async fn allowed_origins(&self) -> GeopermsResult<Vec<String>>;
}

/// Geolocation permissions kept in memory
#[derive(Debug, Default)]
pub struct InMemoryGeolocationPermissions {
    allowed: RwLock<BTreeSet<String>>,
}

impl InMemoryGeolocationPermissions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GeolocationPermissions for InMemoryGeolocationPermissions {
    async fn clear(&self, domain: &str) -> GeopermsResult<()> {
        let removed = self.allowed.write().await.remove(domain);
        tracing::debug!("Cleared geolocation permission for {}: {}", domain, removed);
        Ok(())
    }

    async fn allow(&self, domain: &str) -> GeopermsResult<()> {
        self.allowed.write().await.insert(domain.to_string());
        Ok(())
    }

    async fn clear_all(&self) -> GeopermsResult<()> {
        self.allowed.write().await.clear();
        Ok(())
    }

    async fn allowed_origins(&self) -> GeopermsResult<Vec<String>> {
        Ok(self.allowed.read().await.iter().cloned().collect())
    }
}
