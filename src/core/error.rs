//! Error types shared by the outline pipeline.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocOutlineError {
    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("image error")]
    Image(#[from] image::ImageError),

    #[error("{tool} failed: {message}")]
    Tool { tool: &'static str, message: String },

    #[error("invalid detection tensor: {0}")]
    InvalidTensor(String),

    #[error("unknown layout label '{0}'")]
    UnknownLabel(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DocOutlineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DocOutlineError::Io {
            path: path.into(),
            source,
        }
    }
}
