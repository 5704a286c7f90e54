//! Presentation layer for the location permissions settings screen
//!
//! The view-model exposes a [`ViewState`] that always reflects the latest
//! grant list pushed by the repository together with the latest app-wide
//! toggle, plus a one-shot [`Command`] event for actions the user has to
//! confirm.

mod live_event;
mod location_permissions;
mod state;

pub use live_event::SingleLiveEvent;
pub use location_permissions::{LocationPermissionsViewModel, SiteLocationPermissionListener};
pub use state::{Command, ViewState};
