use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("Invalid Path: '{path}' {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("Configuration Error: field '{field}': {message}")]
    Config { field: String, message: String },

    #[error("TOML Parsing Error: {0}")]
    TomlParse(String),

    #[error("JSON Serialization Error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File Read Error: Path '{path}', Error: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("WalkDir Error: {0}")]
    WalkDir(String),

    #[error("Glob Pattern Error: {0}")]
    Glob(String),

    #[error("Clone Error: {0}")]
    Clone(String),
}

impl AppError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable, machine-readable code used by the result wrapper.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidPath { .. } => "INVALID_PATH",
            AppError::Config { .. } | AppError::TomlParse(_) | AppError::Glob(_) => {
                "INVALID_CONFIG"
            }
            AppError::Io(_) | AppError::FileRead { .. } | AppError::WalkDir(_) => "IO_ERROR",
            AppError::Clone(_) => "CLONE_FAILED",
            AppError::JsonSerialize(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<globset::Error> for AppError {
    fn from(err: globset::Error) -> Self {
        AppError::Glob(format!("Globset error: {}", err))
    }
}

impl From<walkdir::Error> for AppError {
    fn from(err: walkdir::Error) -> Self {
        AppError::WalkDir(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::TomlParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_the_taxonomy() {
        let invalid = AppError::InvalidPath {
            path: PathBuf::from("/nope"),
            reason: "does not exist".to_string(),
        };
        assert_eq!(invalid.code(), "INVALID_PATH");
        assert_eq!(
            AppError::config("render.max_file_bytes", "must be > 0").code(),
            "INVALID_CONFIG"
        );
        assert_eq!(AppError::Clone("exit 128".into()).code(), "CLONE_FAILED");
    }

    #[test]
    fn config_error_names_the_field() {
        let err = AppError::config("render.format", "unknown format 'xml'");
        assert!(err.to_string().contains("render.format"));
        assert!(err.to_string().contains("xml"));
    }
}
