use bulkmsg_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("delivery API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("unexpected delivery API response: {0}")]
    Parse(String),
    #[error("no messages to send")]
    EmptyBatch,
    #[error("attachment is {size} bytes; images must be at most {limit} bytes")]
    FileTooLarge { size: usize, limit: usize },
    #[error("unsupported attachment type {0}; only JPEG images can be sent")]
    InvalidFileType(String),
    #[error("missing API credentials: set {0}")]
    MissingCredentials(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid storage path: {0}")]
    InvalidStoragePath(PathBuf),
    #[error("invalid delivery API url: {0}")]
    InvalidBaseUrl(String),
    #[error("{0}")]
    Unavailable(String),
    #[cfg(feature = "solapi")]
    #[error("failed to sign request: {0}")]
    Signing(#[from] hmac::digest::InvalidLength),
    #[cfg(feature = "solapi")]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[cfg(feature = "solapi")]
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, DeliveryError>;
