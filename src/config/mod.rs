mod file_config;
mod hunt_config;
pub mod prompt;

pub use file_config::{FileConfig, RetryConfig};
pub use hunt_config::{ArtistAlbums, HuntConfig};

use anyhow::{bail, Result};
use std::time::Duration;

use crate::cover_art_archive::COVER_ART_ARCHIVE_BASE;
use crate::musicbrainz::MUSICBRAINZ_API_BASE;

pub const DEFAULT_USER_AGENT: &str = concat!("cover-art-hunter/", env!("CARGO_PKG_VERSION"));

/// CLI arguments that can be used for settings resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub catalog_base_url: String,
    pub archive_base_url: String,
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
    pub max_concurrent_albums: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            catalog_base_url: MUSICBRAINZ_API_BASE.to_string(),
            archive_base_url: COVER_ART_ARCHIVE_BASE.to_string(),
            request_timeout_secs: 30,
            max_concurrent_requests: 16,
            max_concurrent_albums: 4,
        }
    }
}

/// Backoff settings for transport failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 60_000,
            backoff_multiplier: 2.0,
        }
    }
}

/// Network and concurrency settings for a run.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub catalog_base_url: String,
    pub archive_base_url: String,
    pub user_agent: String,
    pub request_timeout: Duration,
    /// Cap on in-flight requests inside one fan-out stage of one album.
    pub max_concurrent_requests: usize,
    /// Cap on album pipelines running at the same time.
    pub max_concurrent_albums: usize,
    pub retry: RetrySettings,
}

impl AppSettings {
    /// Resolve settings from CLI arguments and an optional TOML file.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let catalog_base_url = file
            .catalog_base_url
            .unwrap_or_else(|| cli.catalog_base_url.clone());
        let archive_base_url = file
            .archive_base_url
            .unwrap_or_else(|| cli.archive_base_url.clone());
        for url in [&catalog_base_url, &archive_base_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("Base URL must be http(s): {}", url);
            }
        }

        let user_agent = file
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let request_timeout_secs = file
            .request_timeout_secs
            .unwrap_or(cli.request_timeout_secs);
        let max_concurrent_requests = file
            .max_concurrent_requests
            .unwrap_or(cli.max_concurrent_requests);
        let max_concurrent_albums = file
            .max_concurrent_albums
            .unwrap_or(cli.max_concurrent_albums);

        if request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than 0");
        }
        if max_concurrent_requests == 0 || max_concurrent_albums == 0 {
            bail!("Concurrency limits must be greater than 0");
        }

        let defaults = RetrySettings::default();
        let retry_file = file.retry.unwrap_or_default();
        let retry = RetrySettings {
            max_attempts: retry_file.max_attempts.unwrap_or(defaults.max_attempts),
            initial_backoff_ms: retry_file
                .initial_backoff_ms
                .unwrap_or(defaults.initial_backoff_ms),
            max_backoff_ms: retry_file.max_backoff_ms.unwrap_or(defaults.max_backoff_ms),
            backoff_multiplier: retry_file
                .backoff_multiplier
                .unwrap_or(defaults.backoff_multiplier),
        };
        if retry.max_attempts == 0 {
            bail!("retry.max_attempts must be at least 1");
        }
        if retry.backoff_multiplier < 1.0 {
            bail!("retry.backoff_multiplier must be >= 1.0");
        }

        Ok(Self {
            catalog_base_url,
            archive_base_url,
            user_agent,
            request_timeout: Duration::from_secs(request_timeout_secs),
            max_concurrent_requests,
            max_concurrent_albums,
            retry,
        })
    }
}
