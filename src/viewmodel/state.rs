//! Observable state and one-shot commands for the location settings screen

use serde::Serialize;

use crate::permissions::LocationPermissionEntity;

/// Snapshot rendered by the location settings screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    /// App-wide location toggle
    pub location_permission_enabled: bool,
    /// Stored grants, in repository order
    pub location_permission_entities: Vec<LocationPermissionEntity>,
}

/// Instruction the UI must act on exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask the user to confirm removing a grant
    ConfirmDeleteLocationPermission(LocationPermissionEntity),
}
