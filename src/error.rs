use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration missing: {0}")]
    Missing(String),

    #[error("Configuration invalid: {0}")]
    Invalid(String),

    #[error("Config file error at {path}: {message}")]
    File { path: PathBuf, message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Failure talking to the remote image search API.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SearchError {
    pub message: String,
    pub status: Option<u16>,
    pub status_text: Option<String>,
}

impl SearchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), status: None, status_text: None }
    }

    pub fn http(status: u16, status_text: impl Into<String>) -> Self {
        let status_text = status_text.into();
        Self {
            message: format!("Image search API request failed: {status_text}"),
            status: Some(status),
            status_text: Some(status_text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersistErrorCode {
    InvalidPath,
    DirectoryCreateFailed,
    FetchFailed,
    HttpError,
    NoResponseBody,
    InvalidContentType,
    SaveFailed,
    StatFailed,
}

impl PersistErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidPath => "INVALID_PATH",
            Self::DirectoryCreateFailed => "DIRECTORY_CREATE_FAILED",
            Self::FetchFailed => "FETCH_FAILED",
            Self::HttpError => "HTTP_ERROR",
            Self::NoResponseBody => "NO_RESPONSE_BODY",
            Self::InvalidContentType => "INVALID_CONTENT_TYPE",
            Self::SaveFailed => "SAVE_FAILED",
            Self::StatFailed => "STAT_FAILED",
        }
    }
}

impl fmt::Display for PersistErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure while resolving the target directory or saving a fetched image.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PersistError {
    pub message: String,
    pub code: PersistErrorCode,
}

impl PersistError {
    pub fn new(code: PersistErrorCode, message: impl Into<String>) -> Self {
        Self { message: message.into(), code }
    }
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
