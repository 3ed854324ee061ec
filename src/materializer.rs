//! Image download, measurement and local caching.

use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::error::{HunterError, Result};
use crate::fetch::{FetchClient, FetchOutcome};
use crate::models::{rank_by_resolution, ImageDetail};
use crate::progress::{AlbumProgress, Stage};

/// Where a downloaded image is stored: `save_path/basename(url)`.
///
/// Returns `None` when the URL has no usable file name.
pub fn local_image_path(save_path: &Path, url: &str) -> Option<PathBuf> {
    let name = url.rsplit('/').next().unwrap_or_default();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(save_path.join(name))
}

/// Decode `bytes` and return (width, height).
pub fn measure_bytes(url: &str, bytes: &[u8]) -> Result<(u32, u32)> {
    let image = image::load_from_memory(bytes).map_err(|source| HunterError::Decode {
        url: url.to_string(),
        source,
    })?;
    Ok((image.width(), image.height()))
}

/// Decode an image stored on disk and return (width, height).
///
/// The whole file is decoded, so a truncated download fails here instead of
/// being ranked by its header.
pub fn measure_file(path: &Path) -> Result<(u32, u32)> {
    let reader = image::ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| HunterError::io(path, e))?;
    let image = reader.decode().map_err(|source| HunterError::Decode {
        url: path.display().to_string(),
        source,
    })?;
    Ok((image.width(), image.height()))
}

/// Sibling file the download is written to before being renamed into place.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Write `bytes` to `path` through a temporary sibling, so `path` only ever
/// holds a complete file.
async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let partial = partial_path(path);
    tokio::fs::write(&partial, bytes)
        .await
        .map_err(|e| HunterError::io(&partial, e))?;
    tokio::fs::rename(&partial, path)
        .await
        .map_err(|e| HunterError::io(path, e))
}

pub struct ImageMaterializer {
    fetch: Arc<FetchClient>,
    max_concurrent_requests: usize,
}

impl ImageMaterializer {
    pub fn new(fetch: Arc<FetchClient>, max_concurrent_requests: usize) -> Self {
        Self {
            fetch,
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }

    /// Download and measure every URL, returning images sorted by resolution.
    ///
    /// With a `save_path`, images are written there; with `skip_existing`
    /// as well, an already saved file that decodes is measured instead of
    /// downloaded. A saved file that does not decode is downloaded again.
    /// URLs that fail to download or decode are logged and dropped. Equal
    /// resolutions keep `urls` order.
    pub async fn materialize(
        &self,
        urls: &[String],
        save_path: Option<&Path>,
        skip_existing: bool,
        progress: &dyn AlbumProgress,
    ) -> Vec<ImageDetail> {
        progress.stage(Stage::Images, urls.len() as u64);

        let mut downloads = stream::iter(urls.iter().enumerate())
            .map(|(index, url)| async move {
                (index, self.materialize_one(url, save_path, skip_existing).await)
            })
            .buffer_unordered(self.max_concurrent_requests);

        let mut details = Vec::with_capacity(urls.len());
        while let Some((index, outcome)) = downloads.next().await {
            progress.advance(1);
            match outcome {
                Ok(Some(detail)) => details.push((index, detail)),
                Ok(None) => {}
                Err(e) => error!("Failed to fetch image details for URL {}: {}", urls[index], e),
            }
        }

        details.sort_by_key(|(index, _)| *index);
        let mut images: Vec<ImageDetail> = details.into_iter().map(|(_, detail)| detail).collect();
        rank_by_resolution(&mut images);
        images
    }

    /// `Ok(None)` means the image host gave no usable answer (already logged).
    async fn materialize_one(
        &self,
        url: &str,
        save_path: Option<&Path>,
        skip_existing: bool,
    ) -> Result<Option<ImageDetail>> {
        let local_path = save_path.and_then(|dir| local_image_path(dir, url));

        if let Some(path) = local_path.as_ref().filter(|_| skip_existing) {
            if tokio::fs::try_exists(path)
                .await
                .map_err(|e| HunterError::io(path, e))?
            {
                let cached = path.clone();
                match tokio::task::spawn_blocking(move || measure_file(&cached)).await? {
                    Ok((width, height)) => {
                        debug!("Using cached image {:?} for {}", path, url);
                        return Ok(Some(ImageDetail::new(url, width, height, local_path)));
                    }
                    Err(e) => warn!("Cached image {:?} is unusable, downloading again: {}", path, e),
                }
            }
        }

        let bytes = match self.fetch.fetch_bytes(url).await {
            FetchOutcome::Success(bytes) => bytes,
            FetchOutcome::UpstreamRejected(_) => return Ok(None),
            FetchOutcome::TransportFailed(e) => return Err(e),
        };

        let owned_url = url.to_string();
        let (bytes, (width, height)) = tokio::task::spawn_blocking(move || {
            measure_bytes(&owned_url, &bytes).map(|dimensions| (bytes, dimensions))
        })
        .await??;

        if let Some(path) = local_path.as_ref() {
            write_atomically(path, &bytes).await?;
            debug!("Saved {} to {:?}", url, path);
        }

        Ok(Some(ImageDetail::new(url, width, height, local_path)))
    }
}
