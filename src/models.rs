//! Data model for the cover art pipeline.
//!
//! Catalog types deserialize straight from the MusicBrainz JSON shape; result
//! types serialize into the per-album and batch summary files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One (artist, album) pair to hunt cover art for, with the job's filters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRequest {
    pub artist: String,
    pub album: String,
    pub release_type: Option<String>,
    pub status: Option<String>,
}

impl AlbumRequest {
    pub fn new(artist: impl Into<String>, album: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            album: album.into(),
            release_type: None,
            status: None,
        }
    }

    pub fn with_release_type(mut self, release_type: impl Into<String>) -> Self {
        self.release_type = Some(release_type.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Human readable "Artist - Album" label for logs and progress bars.
    pub fn label(&self) -> String {
        format!("{} - {}", self.artist, self.album)
    }
}

/// A MusicBrainz release group: every edition of one album.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseGroup {
    pub id: String,
    #[serde(default)]
    pub primary_type: Option<String>,
    #[serde(default)]
    pub releases: Vec<Release>,
}

impl ReleaseGroup {
    /// True when no filter is set or the primary type matches it exactly.
    pub fn matches_type(&self, release_type: Option<&str>) -> bool {
        match release_type {
            None => true,
            Some(wanted) => self.primary_type.as_deref() == Some(wanted),
        }
    }
}

/// A single edition inside a release group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl Release {
    pub fn matches_status(&self, status: Option<&str>) -> bool {
        match status {
            None => true,
            Some(wanted) => self.status.as_deref() == Some(wanted),
        }
    }
}

/// Front cover URLs found in the art archive for one release.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CoverArtResult {
    pub release_id: String,
    pub urls: Vec<String>,
}

/// A downloaded (or cached) image that decoded successfully.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDetail {
    pub url: String,
    /// (width, height) in pixels.
    pub dimensions: (u32, u32),
    /// width * height, the ranking key.
    pub resolution: u64,
    pub local_path: Option<PathBuf>,
}

impl ImageDetail {
    pub fn new(url: impl Into<String>, width: u32, height: u32, local_path: Option<PathBuf>) -> Self {
        Self {
            url: url.into(),
            dimensions: (width, height),
            resolution: u64::from(width) * u64::from(height),
            local_path,
        }
    }
}

/// Sorts images by resolution, highest first.
///
/// The sort is stable, so images with equal resolution keep their input order.
pub fn rank_by_resolution(images: &mut [ImageDetail]) {
    images.sort_by(|a, b| b.resolution.cmp(&a.resolution));
}

/// Everything found for one album, persisted as `<album>.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumResult {
    pub artist: String,
    pub album: String,
    pub release_type: Option<String>,
    pub status: Option<String>,
    /// Sorted by resolution, highest first. Empty when nothing was found.
    pub cover_art_images: Vec<ImageDetail>,
}

impl AlbumResult {
    pub fn empty(request: &AlbumRequest) -> Self {
        Self::with_images(request, Vec::new())
    }

    pub fn with_images(request: &AlbumRequest, cover_art_images: Vec<ImageDetail>) -> Self {
        Self {
            artist: request.artist.clone(),
            album: request.album.clone(),
            release_type: request.release_type.clone(),
            status: request.status.clone(),
            cover_art_images,
        }
    }

    /// The highest resolution image, if any.
    pub fn winner(&self) -> Option<&ImageDetail> {
        self.cover_art_images.first()
    }
}

/// One line of the batch summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub artist: String,
    pub album: String,
    pub highest_resolution_image: ImageDetail,
}

/// Winners of a whole job run, in request order.
pub type BatchSummary = Vec<SummaryEntry>;

/// Builds the summary from per-album results, skipping albums without images.
pub fn summarize(results: &[AlbumResult]) -> BatchSummary {
    results
        .iter()
        .filter_map(|result| {
            result.winner().map(|winner| SummaryEntry {
                artist: result.artist.clone(),
                album: result.album.clone(),
                highest_resolution_image: winner.clone(),
            })
        })
        .collect()
}
