use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Failed to parse content: {0}")]
    Parse(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Google Drive API error: {0}")]
    Drive(String),

    #[error("Failed to encode table: {0}")]
    Encode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
