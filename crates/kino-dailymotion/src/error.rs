//! Error types for the Dailymotion adapter

use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Adapter error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Lifecycle errors
    #[error("Tech {id} has been disposed")]
    Disposed { id: String },

    #[error("Another tech with id {id} is already waiting for the player API")]
    DuplicateTech { id: String },

    // Script bootstrap errors
    #[error("Failed to load player script: {0}")]
    ScriptLoadFailed(String),

    #[error("Player script did not load within {after_ms}ms")]
    ScriptLoadTimeout { after_ms: u64 },

    // Source errors
    #[error("No video id found in source: {0}")]
    UnparsableSource(String),

    // Control errors
    #[error("Invalid volume: {0}")]
    InvalidVolume(f64),

    // Embedding errors
    #[error("Failed to mount player element: {0}")]
    Mount(String),

    #[error("Failed to create player: {0}")]
    PlayerCreation(String),

    #[error("Player reported an error: {0}")]
    Native(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a disposed error for the given tech id
    pub fn disposed(id: impl Into<String>) -> Self {
        Error::Disposed { id: id.into() }
    }

    /// Returns true if retrying the operation could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Native(_) | Error::Mount(_))
    }

    /// Returns true if the script bootstrap failed for good
    pub fn is_script_failure(&self) -> bool {
        matches!(
            self,
            Error::ScriptLoadFailed(_) | Error::ScriptLoadTimeout { .. }
        )
    }

    /// Returns the error code reported to the host
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Disposed { .. } => "DISPOSED",
            Error::DuplicateTech { .. } => "DUPLICATE_TECH",
            Error::ScriptLoadFailed(_) => "SCRIPT_LOAD_FAILED",
            Error::ScriptLoadTimeout { .. } => "SCRIPT_LOAD_TIMEOUT",
            Error::UnparsableSource(_) => "UNPARSABLE_SOURCE",
            Error::InvalidVolume(_) => "INVALID_VOLUME",
            Error::Mount(_) => "MOUNT",
            Error::PlayerCreation(_) => "PLAYER_CREATION",
            Error::Native(_) => "NATIVE",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_failures() {
        assert!(Error::ScriptLoadFailed("404".into()).is_script_failure());
        assert!(Error::ScriptLoadTimeout { after_ms: 10 }.is_script_failure());
        assert!(!Error::disposed("p1").is_script_failure());
    }

    #[test]
    fn test_error_display() {
        let err = Error::ScriptLoadTimeout { after_ms: 15000 };
        assert_eq!(err.to_string(), "Player script did not load within 15000ms");
        assert_eq!(err.error_code(), "SCRIPT_LOAD_TIMEOUT");
    }
}
