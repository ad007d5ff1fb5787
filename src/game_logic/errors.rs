use thiserror::Error;
use std::path::PathBuf;

#[derive(Error, Debug)]
pub enum CtfError {
    // Config-related errors
    #[error("Failed to get config directory")]
    ConfigDirNotFound,

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    SerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize TOML: {0}")]
    DeserializationFailed(#[from] toml::de::Error),

    #[error("Config file not found at path: {path}")]
    ConfigFileNotFound { path: PathBuf },

    // Map-related errors
    #[error("Unknown built-in map: {name}")]
    UnknownMap { name: String },

    #[error("Map file not found at path: {path}")]
    MapFileNotFound { path: PathBuf },

    #[error("Invalid map data: {reason}")]
    InvalidMapData { reason: String },

    #[error("Map validation failed: {reason}")]
    MapValidationFailed { reason: String },

    // Command line errors
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },
}

/// Result type alias for all fallible operations
pub type CtfResult<T> = Result<T, CtfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctf_error_display() {
        let err = CtfError::UnknownMap {
            name: "map9".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown built-in map: map9");

        let err = CtfError::ConfigDirNotFound;
        assert_eq!(err.to_string(), "Failed to get config directory");
    }

    #[test]
    fn test_io_error_converts() {
        fn read_missing() -> CtfResult<String> {
            Ok(std::fs::read_to_string("/definitely/not/here.toml")?)
        }

        let err = read_missing().unwrap_err();
        assert!(matches!(err, CtfError::Io(_)));
    }
}
