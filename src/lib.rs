//! Location permission settings for a browser
//!
//! Keeps per-domain geolocation grants and the app-wide location toggle in
//! sync with a settings screen through [`viewmodel::LocationPermissionsViewModel`].

pub mod cli;
pub mod core;
pub mod geolocation;
pub mod logging;
pub mod permissions;
pub mod settings;
pub mod viewmodel;

pub use crate::core::{GeopermsError, GeopermsResult};
pub use geolocation::{GeolocationPermissions, InMemoryGeolocationPermissions};
pub use permissions::{
    InMemoryLocationPermissionsRepository, JsonFileLocationPermissionsRepository,
    LocationPermissionEntity, LocationPermissionType, LocationPermissionsRepository,
};
pub use settings::{InMemorySettingsDataStore, JsonSettingsDataStore, SettingsDataStore};
pub use viewmodel::{
    Command, LocationPermissionsViewModel, SingleLiveEvent, SiteLocationPermissionListener,
    ViewState,
};
