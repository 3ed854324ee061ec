//! MusicBrainz release group search.
//!
//! Resolves an (artist, album) pair to every matching release group by
//! reading the first result page, then fetching the remaining pages
//! concurrently.

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::Result;
use crate::fetch::{FetchClient, FetchOutcome};
use crate::models::ReleaseGroup;
use crate::progress::{AlbumProgress, Stage};

pub const MUSICBRAINZ_API_BASE: &str = "https://musicbrainz.org/ws/2";

/// Release groups requested per page (the MusicBrainz maximum).
pub const PAGE_SIZE: u64 = 100;

#[derive(Debug, Default, Deserialize)]
struct ReleaseGroupSearchResponse {
    #[serde(default)]
    count: u64,
    #[serde(default, rename = "release-groups")]
    release_groups: Vec<ReleaseGroup>,
}

/// Offsets of every page after the first one for `count` total matches.
pub fn remaining_offsets(count: u64) -> Vec<u64> {
    (PAGE_SIZE..count).step_by(PAGE_SIZE as usize).collect()
}

/// Lucene query matching release groups by artist and title.
pub fn search_query(artist: &str, album: &str) -> String {
    format!("artist:{} AND releasegroup:{}", artist, album)
}

pub struct ReleaseResolver {
    fetch: Arc<FetchClient>,
    base_url: String,
    max_concurrent_requests: usize,
}

impl ReleaseResolver {
    pub fn new(fetch: Arc<FetchClient>, base_url: &str, max_concurrent_requests: usize) -> Self {
        Self {
            fetch,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }

    /// Fetch every release group matching `artist` and `album`.
    ///
    /// Fails only when the first page exhausts its transport retries; a
    /// rejected first page means no data. Later pages that fail contribute
    /// nothing. Merged order follows page completion, not server order.
    pub async fn resolve(
        &self,
        artist: &str,
        album: &str,
        progress: &dyn AlbumProgress,
    ) -> Result<Vec<ReleaseGroup>> {
        let first_page = match self.fetch_page(artist, album, 0).await {
            FetchOutcome::Success(page) => page,
            FetchOutcome::UpstreamRejected(_) => ReleaseGroupSearchResponse::default(),
            FetchOutcome::TransportFailed(e) => {
                error!("Failed to fetch release groups after retries: {}", e);
                return Err(e);
            }
        };

        let total_count = first_page.count;
        let mut release_groups = first_page.release_groups;
        progress.stage(Stage::ReleaseGroups, total_count);
        progress.advance(release_groups.len() as u64);

        let offsets = remaining_offsets(total_count);
        debug!(
            "{} release groups for {} - {}, fetching {} more page(s)",
            total_count,
            artist,
            album,
            offsets.len()
        );

        let mut pages = stream::iter(offsets)
            .map(|offset| async move { (offset, self.fetch_page(artist, album, offset).await) })
            .buffer_unordered(self.max_concurrent_requests);

        while let Some((offset, outcome)) = pages.next().await {
            match outcome {
                FetchOutcome::Success(page) => {
                    progress.advance(page.release_groups.len() as u64);
                    release_groups.extend(page.release_groups);
                }
                FetchOutcome::UpstreamRejected(_) => {}
                FetchOutcome::TransportFailed(e) => {
                    error!("Failed to fetch release groups at offset {}: {}", offset, e);
                }
            }
        }

        Ok(release_groups)
    }

    async fn fetch_page(
        &self,
        artist: &str,
        album: &str,
        offset: u64,
    ) -> FetchOutcome<ReleaseGroupSearchResponse> {
        let url = format!("{}/release-group/", self.base_url);
        let query = [
            ("query", search_query(artist, album)),
            ("fmt", "json".to_string()),
            ("limit", PAGE_SIZE.to_string()),
            ("offset", offset.to_string()),
        ];
        self.fetch.fetch_json(&url, &query).await
    }
}
