use thiserror::Error;

pub const CANVAS_CONVERSION_FAILED: &str = "Failed to convert canvas to blob";
pub const READ_FILE_FAILED: &str = "Failed to read file";
pub const LEGACY_SAVE_FAILED: &str = "Failed to save file using msSaveOrOpenBlob";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("{0}")]
    Conversion(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Platform(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SaveError {
    pub fn canvas_conversion() -> Self {
        SaveError::Conversion(CANVAS_CONVERSION_FAILED.to_string())
    }

    pub fn read_file() -> Self {
        SaveError::Conversion(READ_FILE_FAILED.to_string())
    }

    pub fn legacy_save() -> Self {
        SaveError::Platform(LEGACY_SAVE_FAILED.to_string())
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(err: serde_json::Error) -> Self {
        SaveError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for SaveError {
    fn from(err: std::io::Error) -> Self {
        SaveError::Platform(format!("I/O error: {}", err))
    }
}
