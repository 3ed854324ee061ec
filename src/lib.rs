//! Cover Art Hunter Library
//!
//! Finds the highest resolution front cover for (artist, album) pairs using
//! MusicBrainz release groups and the Cover Art Archive.

pub mod cli_style;
pub mod config;
pub mod cover_art_archive;
pub mod error;
pub mod fetch;
pub mod hunter;
pub mod materializer;
pub mod models;
pub mod musicbrainz;
pub mod output;
pub mod progress;

// Re-export commonly used types for convenience
pub use config::{AppSettings, HuntConfig};
pub use error::HunterError;
pub use hunter::{CoverArtHunter, HuntReport, OutputOptions};
pub use models::{AlbumRequest, AlbumResult, BatchSummary, ImageDetail};
