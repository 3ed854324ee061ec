//! The job description: which albums to hunt and what to do with the results.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::AlbumRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistAlbums {
    pub artist: String,
    pub albums: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuntConfig {
    pub artists_albums: Vec<ArtistAlbums>,
    #[serde(default)]
    pub release_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub save_images: bool,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_skip_existing")]
    pub skip_existing: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_skip_existing() -> bool {
    true
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl HuntConfig {
    /// Parse and validate a JSON job description.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Malformed configuration JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_json(&content).with_context(|| format!("Invalid config file: {:?}", path))
    }

    pub fn validate(&self) -> Result<()> {
        if self.artists_albums.is_empty() {
            bail!("artists_albums must list at least one artist");
        }
        for entry in &self.artists_albums {
            if entry.artist.trim().is_empty() {
                bail!("Artist names must not be empty");
            }
            if entry.albums.is_empty() {
                bail!("Artist {:?} has no albums", entry.artist);
            }
            if entry.albums.iter().any(|album| album.trim().is_empty()) {
                bail!("Artist {:?} has an empty album name", entry.artist);
            }
        }
        Ok(())
    }

    /// One request per (artist, album), in configuration order.
    ///
    /// Blank filters are treated as "no filter".
    pub fn album_requests(&self) -> Vec<AlbumRequest> {
        let release_type = non_empty(&self.release_type);
        let status = non_empty(&self.status);
        self.artists_albums
            .iter()
            .flat_map(|entry| {
                let release_type = release_type.clone();
                let status = status.clone();
                entry.albums.iter().map(move |album| AlbumRequest {
                    artist: entry.artist.clone(),
                    album: album.clone(),
                    release_type: release_type.clone(),
                    status: status.clone(),
                })
            })
            .collect()
    }

    /// Artist whose directory receives the batch summary.
    pub fn first_artist(&self) -> Option<&str> {
        self.artists_albums.first().map(|entry| entry.artist.as_str())
    }
}
