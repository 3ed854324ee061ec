//! Error types shared by the fetch pipeline.

use thiserror::Error;

/// Errors that can stop a single unit of work (a page, a release, an image).
///
/// None of these abort a batch: callers log them and drop the failing unit.
#[derive(Debug, Error)]
pub enum HunterError {
    #[error("Transport error after {attempts} attempt(s) for {url}: {source}")]
    Transport {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode image from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl HunterError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        HunterError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, HunterError>;
