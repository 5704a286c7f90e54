//! Permission grant types
//!
//! A grant is a stored geolocation decision scoped to a single domain.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The decision stored for a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationPermissionType {
    /// Allow this site every time
    AllowAlways,
    /// Allow this site for the current visit only
    AllowOnce,
    /// Deny this site every time
    DenyAlways,
    /// Deny this site for the current visit only
    DenyOnce,
}

impl LocationPermissionType {
    /// Whether the grant lets the site read the location
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::AllowAlways | Self::AllowOnce)
    }

    /// Whether the decision outlives the current visit
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::AllowAlways | Self::DenyAlways)
    }
}

impl fmt::Display for LocationPermissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AllowAlways => "Always allow",
            Self::AllowOnce => "Allow once",
            Self::DenyAlways => "Always deny",
            Self::DenyOnce => "Deny once",
        };
        f.write_str(label)
    }
}

/// A stored permission grant for one domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationPermissionEntity {
    /// Registrable hostname, unique per grant
    pub domain: String,
    /// The stored decision
    pub permission: LocationPermissionType,
}

impl LocationPermissionEntity {
    /// Create a new permission grant
    pub fn new(domain: impl Into<String>, permission: LocationPermissionType) -> Self {
        Self {
            domain: domain.into(),
            permission,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_classification() {
        assert!(LocationPermissionType::AllowAlways.is_allowed());
        assert!(LocationPermissionType::AllowOnce.is_allowed());
        assert!(!LocationPermissionType::DenyOnce.is_allowed());

        assert!(LocationPermissionType::DenyAlways.is_persistent());
        assert!(!LocationPermissionType::AllowOnce.is_persistent());
    }

    #[test]
    fn test_serialized_form() {
        let entity = LocationPermissionEntity::new("example.com", LocationPermissionType::AllowAlways);
        let json = serde_json::to_string(&entity).unwrap();
        assert_eq!(json, r#"{"domain":"example.com","permission":"ALLOW_ALWAYS"}"#);
    }
}
