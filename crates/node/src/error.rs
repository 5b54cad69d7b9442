//! A bunch of wrap errors.
use crate::prelude::chord_core;

/// A wrap `Result` contains custom errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors enum mapping global custom errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Core error: {0}")]
    CoreError(#[from] chord_core::error::Error),
    #[error("Http request error: {0}")]
    HttpRequestError(#[from] reqwest::Error),
    #[error("Node answered with status {0}")]
    HttpStatusError(u16),
    #[error("Invalid logging level: {0}")]
    InvalidLoggingLevel(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Create File Error: {0}")]
    CreateFileError(String),
    #[error("Open File Error: {0}")]
    OpenFileError(String),
    #[error("Cannot find home directory")]
    HomeDirError,
    #[error("Cannot find parent directory")]
    ParentDirError,
    #[error("Encode error.")]
    EncodeError,
    #[error("Serde yaml error: {0}")]
    SerdeYamlError(#[from] serde_yaml::Error),
    #[error("Bind error: {0}")]
    BindError(String),
}
