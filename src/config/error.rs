use std::fmt::Display;
use std::path::PathBuf;

use thiserror::Error;

use super::node::NodeKind;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("required config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config source '{origin}': {source}")]
    ParseError {
        origin: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid config path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("cannot write through an empty config path")]
    EmptyPath,

    #[error("cannot write '{field}': expected {expected} node at '{path}', found {found}")]
    UnexpectedNode {
        path: String,
        field: String,
        expected: NodeKind,
        found: NodeKind,
    },

    #[error("array index {index} is out of bounds at '{path}' (length {len})")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("invalid override for '{path}': {source}")]
    InvalidOverride {
        path: String,
        source: Box<ConfigError>,
    },

    #[error("failed to deserialize config: {0}")]
    Deserialize(String),
}

impl ConfigError {
    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

impl serde::de::Error for ConfigError {
    fn custom<T: Display>(msg: T) -> Self {
        ConfigError::Deserialize(msg.to_string())
    }
}
