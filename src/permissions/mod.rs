//! Per-domain location permission grants
//!
//! This module defines the grant types and the repository that owns them.
//! Two repositories are provided: an in-memory one and a JSON file backed one.

mod repository;
mod storage;
mod types;

pub use repository::{
    InMemoryLocationPermissionsRepository, LocationPermissionsRepository, PermissionsFeed,
};
pub use storage::{JsonFileLocationPermissionsRepository, PERMISSIONS_FILE};
pub use types::{LocationPermissionEntity, LocationPermissionType};
