//! Album pipelines and batch aggregation.
//!
//! Each album runs resolve -> filter -> locate -> materialize on its own;
//! albums run concurrently and never affect each other.

use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::{AppSettings, HuntConfig};
use crate::cover_art_archive::ArtLocator;
use crate::error::{HunterError, Result};
use crate::fetch::{FetchClient, RetryPolicy};
use crate::materializer::ImageMaterializer;
use crate::models::{summarize, AlbumRequest, AlbumResult, BatchSummary, ReleaseGroup};
use crate::musicbrainz::ReleaseResolver;
use crate::output;
use crate::progress::{AlbumProgress, NoProgress, ProgressReporter};

/// How a job stores what it finds.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub output_dir: PathBuf,
    pub save_images: bool,
    pub skip_existing: bool,
}

impl From<&HuntConfig> for OutputOptions {
    fn from(config: &HuntConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            save_images: config.save_images,
            skip_existing: config.skip_existing,
        }
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone)]
pub struct HuntReport {
    /// One entry per request, in request order.
    pub albums: Vec<AlbumResult>,
    pub summary: BatchSummary,
    /// Where the summary was written, if it was non-empty and writable.
    pub summary_path: Option<PathBuf>,
}

/// Keeps groups matching `release_type` and flattens their releases matching
/// `status` into release ids.
pub fn filter_release_ids(
    release_groups: &[ReleaseGroup],
    release_type: Option<&str>,
    status: Option<&str>,
) -> Vec<String> {
    release_groups
        .iter()
        .filter(|group| group.matches_type(release_type))
        .flat_map(|group| group.releases.iter())
        .filter(|release| release.matches_status(status))
        .map(|release| release.id.clone())
        .collect()
}

pub struct CoverArtHunter {
    resolver: ReleaseResolver,
    locator: ArtLocator,
    materializer: ImageMaterializer,
    max_concurrent_albums: usize,
    progress: Arc<dyn ProgressReporter>,
}

impl CoverArtHunter {
    pub fn new(settings: &AppSettings) -> Result<Self> {
        let fetch = FetchClient::new(
            &settings.user_agent,
            settings.request_timeout,
            RetryPolicy::new(&settings.retry),
        )
        .map_err(|e| HunterError::InvalidConfig(format!("Failed to create HTTP client: {}", e)))?;
        let fetch = Arc::new(fetch);

        Ok(Self {
            resolver: ReleaseResolver::new(
                fetch.clone(),
                &settings.catalog_base_url,
                settings.max_concurrent_requests,
            ),
            locator: ArtLocator::new(
                fetch.clone(),
                &settings.archive_base_url,
                settings.max_concurrent_requests,
            ),
            materializer: ImageMaterializer::new(fetch, settings.max_concurrent_requests),
            max_concurrent_albums: settings.max_concurrent_albums.max(1),
            progress: Arc::new(NoProgress),
        })
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Run the pipeline for one album.
    ///
    /// Never fails: missing data and errors are logged and yield an empty
    /// result. The per-album JSON is written only when cover art URLs were
    /// found.
    pub async fn hunt_album(&self, request: &AlbumRequest, options: &OutputOptions) -> AlbumResult {
        let progress = self.progress.album(request);
        let result = self.run_pipeline(request, options, progress.as_ref()).await;
        progress.finish();

        match result {
            Ok(Some(result)) => result,
            Ok(None) => AlbumResult::empty(request),
            Err(e) => {
                error!("Failed to process {}: {}", request.label(), e);
                AlbumResult::empty(request)
            }
        }
    }

    async fn run_pipeline(
        &self,
        request: &AlbumRequest,
        options: &OutputOptions,
        progress: &dyn AlbumProgress,
    ) -> Result<Option<AlbumResult>> {
        let release_type = request.release_type.as_deref();
        let status = request.status.as_deref();

        let release_groups = self
            .resolver
            .resolve(&request.artist, &request.album, progress)
            .await?;
        let release_groups: Vec<ReleaseGroup> = release_groups
            .into_iter()
            .filter(|group| group.matches_type(release_type))
            .collect();
        if release_groups.is_empty() {
            error!(
                "No release group found for {} matching the criteria.",
                request.label()
            );
            return Ok(None);
        }

        let release_ids = filter_release_ids(&release_groups, None, status);
        let cover_art = self.locator.locate(&release_ids, progress).await;
        let urls: Vec<String> = cover_art.into_iter().flat_map(|result| result.urls).collect();
        if urls.is_empty() {
            error!("No cover art found for {}.", request.label());
            return Ok(None);
        }

        let album_dir = output::album_dir(&options.output_dir, &request.artist, &request.album);
        tokio::fs::create_dir_all(&album_dir)
            .await
            .map_err(|e| HunterError::io(&album_dir, e))?;

        let save_path = options.save_images.then_some(album_dir.as_path());
        let images = self
            .materializer
            .materialize(&urls, save_path, options.skip_existing, progress)
            .await;

        let result = AlbumResult::with_images(request, images);
        let result_path =
            output::album_result_path(&options.output_dir, &request.artist, &request.album);
        if let Err(e) = output::write_json(&result, &result_path).await {
            error!("Failed to save results for {}: {}", request.label(), e);
        }

        Ok(Some(result))
    }

    /// Run every album concurrently, then aggregate winners in request order.
    pub async fn hunt_all(
        &self,
        requests: &[AlbumRequest],
        options: &OutputOptions,
    ) -> Vec<AlbumResult> {
        let mut pipelines = stream::iter(requests.iter().enumerate())
            .map(|(index, request)| async move { (index, self.hunt_album(request, options).await) })
            .buffer_unordered(self.max_concurrent_albums);

        let mut results = Vec::with_capacity(requests.len());
        while let Some(result) = pipelines.next().await {
            results.push(result);
        }

        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }

    /// Run a whole job and write the batch summary.
    pub async fn run(&self, config: &HuntConfig) -> HuntReport {
        let options = OutputOptions::from(config);
        let requests = config.album_requests();
        info!("Hunting cover art for {} album(s)", requests.len());

        let albums = self.hunt_all(&requests, &options).await;
        let summary = summarize(&albums);

        let summary_path = match config.first_artist() {
            Some(artist) if !summary.is_empty() => {
                write_summary(&summary, &options.output_dir, artist).await
            }
            _ => None,
        };

        HuntReport {
            albums,
            summary,
            summary_path,
        }
    }
}

async fn write_summary(summary: &BatchSummary, output_dir: &Path, artist: &str) -> Option<PathBuf> {
    let timestamp = output::timestamp(chrono::Local::now());
    let path = output::summary_path(output_dir, artist, &timestamp);
    match output::write_json(summary, &path).await {
        Ok(path) => Some(path),
        Err(e) => {
            error!("Failed to save batch summary: {}", e);
            None
        }
    }
}
