//! Common test infrastructure
//!
//! Provides a fake upstream (MusicBrainz, Cover Art Archive and an image
//! host in one axum server) plus fixture builders.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{ArtEntry, TestUpstream, UpstreamFixture, png_bytes};
//!
//! #[tokio::test]
//! async fn test_front_cover() {
//!     let upstream = TestUpstream::spawn(
//!         UpstreamFixture::default()
//!             .with_art("r1", vec![ArtEntry::front("1.png")])
//!             .with_image("1.png", png_bytes(10, 10)),
//!     )
//!     .await;
//! }
//! ```

#![allow(dead_code, unused_imports)]

mod fixtures;
mod upstream;

pub use fixtures::*;
pub use upstream::{ArchiveReply, ArtEntry, ImageReply, TestUpstream, UpstreamFixture};
