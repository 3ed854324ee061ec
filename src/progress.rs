//! Progress reporting for the album pipelines.
//!
//! The pipeline only emits completion events; rendering them is up to the
//! observer, so library code never touches the terminal.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;

use crate::models::AlbumRequest;

/// Pipeline stage an album is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ReleaseGroups,
    CoverArtUrls,
    Images,
}

impl Stage {
    pub fn describe(&self, request: &AlbumRequest) -> String {
        match self {
            Stage::ReleaseGroups => format!("Fetching release groups for {}", request.label()),
            Stage::CoverArtUrls => format!("Fetching cover art URLs for {}", request.label()),
            Stage::Images => format!("Downloading images for {}", request.label()),
        }
    }
}

/// Receives progress events for a single album.
pub trait AlbumProgress: Send + Sync {
    /// A new stage started with `total` units of work.
    fn stage(&self, stage: Stage, total: u64);

    /// `delta` units of the current stage completed.
    fn advance(&self, delta: u64);

    /// The album pipeline ended, successfully or not.
    fn finish(&self);
}

/// Hands out one [`AlbumProgress`] per album pipeline.
pub trait ProgressReporter: Send + Sync {
    fn album(&self, request: &AlbumRequest) -> Arc<dyn AlbumProgress>;
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl AlbumProgress for NoProgress {
    fn stage(&self, _stage: Stage, _total: u64) {}
    fn advance(&self, _delta: u64) {}
    fn finish(&self) {}
}

impl ProgressReporter for NoProgress {
    fn album(&self, _request: &AlbumRequest) -> Arc<dyn AlbumProgress> {
        Arc::new(NoProgress)
    }
}

/// One indicatif bar per album, stacked in a [`MultiProgress`].
pub struct TerminalProgress {
    bars: MultiProgress,
    style: ProgressStyle,
}

impl TerminalProgress {
    pub fn new() -> Self {
        let style = ProgressStyle::with_template("[{bar:30.cyan/blue}] {pos}/{len} ({elapsed}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        Self {
            bars: MultiProgress::new(),
            style,
        }
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for TerminalProgress {
    fn album(&self, request: &AlbumRequest) -> Arc<dyn AlbumProgress> {
        let bar = self.bars.add(ProgressBar::new(1));
        bar.set_style(self.style.clone());
        bar.set_message(format!("Processing {}", request.label()));
        Arc::new(AlbumBar {
            bar,
            request: request.clone(),
        })
    }
}

struct AlbumBar {
    bar: ProgressBar,
    request: AlbumRequest,
}

impl AlbumProgress for AlbumBar {
    fn stage(&self, stage: Stage, total: u64) {
        self.bar.set_message(stage.describe(&self.request));
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    fn advance(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn finish(&self) {
        self.bar.finish();
    }
}
