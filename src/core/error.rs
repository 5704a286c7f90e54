//! Error types for permission storage, settings and the geolocation store

use thiserror::Error;

/// Errors raised by the collaborators behind the view-model
#[derive(Error, Debug)]
pub enum GeopermsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The permissions repository could not complete an operation
    #[error("Repository error: {0}")]
    Repository(String),

    /// The settings store could not be written
    #[error("Settings error: {0}")]
    Settings(String),
}

/// Result alias used throughout the crate
pub type GeopermsResult<T> = Result<T, GeopermsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = GeopermsError::Repository("disk full".to_string());
        assert_eq!(err.to_string(), "Repository error: disk full");

        let io: GeopermsError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(io, GeopermsError::Io(_)));
    }
}
