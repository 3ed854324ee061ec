//! JSON result files.
//!
//! Layout under the output directory:
//! - `<artist>/<album>/<album>.json` holds the [`AlbumResult`]
//! - `<first artist>/highest_resolution_images_<timestamp>.json` holds the batch summary
//! - `config_<timestamp>.json` holds a prompted configuration

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{HunterError, Result};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Makes an artist or album name usable as a single path component.
pub fn path_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') || c.is_control() { '_' } else { c })
        .collect();
    match cleaned.trim() {
        "" | "." | ".." => "_".to_string(),
        trimmed => trimmed.to_string(),
    }
}

pub fn timestamp(now: DateTime<Local>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// `output_dir/<artist>/<album>`
pub fn album_dir(output_dir: &Path, artist: &str, album: &str) -> PathBuf {
    output_dir
        .join(path_component(artist))
        .join(path_component(album))
}

/// `output_dir/<artist>/<album>/<album>.json`
pub fn album_result_path(output_dir: &Path, artist: &str, album: &str) -> PathBuf {
    album_dir(output_dir, artist, album).join(format!("{}.json", path_component(album)))
}

/// `output_dir/<artist>/highest_resolution_images_<timestamp>.json`
pub fn summary_path(output_dir: &Path, first_artist: &str, timestamp: &str) -> PathBuf {
    output_dir
        .join(path_component(first_artist))
        .join(format!("highest_resolution_images_{}.json", timestamp))
}

/// `output_dir/config_<timestamp>.json`
pub fn config_path(output_dir: &Path, timestamp: &str) -> PathBuf {
    output_dir.join(format!("config_{}.json", timestamp))
}

/// Pretty-print `data` as JSON into `path`, creating parent directories.
pub async fn write_json<T: Serialize + ?Sized>(data: &T, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| HunterError::io(parent, e))?;
    }

    let json = serde_json::to_vec_pretty(data)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| HunterError::io(path, e))?;

    info!("Output saved to {}", path.display());
    Ok(path.to_path_buf())
}
