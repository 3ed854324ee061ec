//! Cover Art Archive lookups.
//!
//! See: https://musicbrainz.org/doc/Cover_Art_Archive/API

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

use crate::fetch::{FetchClient, FetchOutcome};
use crate::models::CoverArtResult;
use crate::progress::{AlbumProgress, Stage};

pub const COVER_ART_ARCHIVE_BASE: &str = "https://coverartarchive.org";

const FRONT_TYPE: &str = "Front";

#[derive(Debug, Default, Deserialize)]
struct CoverArtResponse {
    #[serde(default)]
    images: Vec<CoverArtImage>,
}

#[derive(Debug, Deserialize)]
struct CoverArtImage {
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    types: Option<Vec<String>>,
}

impl CoverArtImage {
    fn front_url(self) -> Option<String> {
        let is_front = self
            .types
            .as_ref()
            .is_some_and(|types| types.iter().any(|t| t == FRONT_TYPE));
        if is_front {
            self.image
        } else {
            None
        }
    }
}

impl CoverArtResponse {
    fn front_urls(self) -> Vec<String> {
        self.images
            .into_iter()
            .filter_map(CoverArtImage::front_url)
            .collect()
    }
}

pub struct ArtLocator {
    fetch: Arc<FetchClient>,
    base_url: String,
    max_concurrent_requests: usize,
}

impl ArtLocator {
    pub fn new(fetch: Arc<FetchClient>, base_url: &str, max_concurrent_requests: usize) -> Self {
        Self {
            fetch,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }

    /// Collect front cover URLs for every release id.
    ///
    /// Releases are queried concurrently; the result keeps `release_ids`
    /// order. A release whose lookup fails gets an empty URL list.
    pub async fn locate(
        &self,
        release_ids: &[String],
        progress: &dyn AlbumProgress,
    ) -> Vec<CoverArtResult> {
        progress.stage(Stage::CoverArtUrls, release_ids.len() as u64);

        let mut lookups = stream::iter(release_ids.iter().enumerate())
            .map(|(index, release_id)| async move { (index, self.locate_one(release_id).await) })
            .buffer_unordered(self.max_concurrent_requests);

        let mut results = Vec::with_capacity(release_ids.len());
        while let Some(result) = lookups.next().await {
            progress.advance(1);
            results.push(result);
        }

        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }

    async fn locate_one(&self, release_id: &str) -> CoverArtResult {
        let url = format!("{}/release/{}", self.base_url, release_id);
        let urls = match self.fetch.fetch_json::<CoverArtResponse>(&url, &[]).await {
            FetchOutcome::Success(response) => response.front_urls(),
            FetchOutcome::UpstreamRejected(_) => Vec::new(),
            FetchOutcome::TransportFailed(e) => {
                error!("Failed to fetch cover art for release {}: {}", release_id, e);
                Vec::new()
            }
        };

        CoverArtResult {
            release_id: release_id.to_string(),
            urls,
        }
    }
}
