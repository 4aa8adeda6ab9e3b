//! Error types for Squall

use thiserror::Error;

/// The main error type for Squall operations
#[derive(Debug, Error)]
pub enum SquallError {
    #[error("Physics world used before initialize()")]
    NotInitialized,

    #[error("Unknown or destroyed particle group: {0}")]
    UnknownGroup(u32),

    #[error("Invalid raster: {0}")]
    InvalidRaster(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("Worker error: {0}")]
    WorkerError(String),
}

/// Result type alias for Squall operations
pub type Result<T> = std::result::Result<T, SquallError>;

impl From<toml::de::Error> for SquallError {
    fn from(err: toml::de::Error) -> Self {
        SquallError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for SquallError {
    fn from(err: toml::ser::Error) -> Self {
        SquallError::TomlSerError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_errors_convert() {
        let err: SquallError = toml::from_str::<toml::Value>("= nope").unwrap_err().into();
        assert!(matches!(err, SquallError::TomlParseError(_)));
    }

    #[test]
    fn display_includes_group_id() {
        let err = SquallError::UnknownGroup(7);
        assert!(err.to_string().contains('7'));
    }
}
