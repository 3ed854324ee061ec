//! Test data builders

use cover_art_hunter::config::RetrySettings;
use cover_art_hunter::fetch::{FetchClient, RetryPolicy};
use cover_art_hunter::progress::{AlbumProgress, Stage};
use cover_art_hunter::AppSettings;
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::upstream::TestUpstream;

/// Encodes a blank PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::new(width, height);
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("Failed to encode test PNG");
    buf.into_inner()
}

/// MusicBrainz-shaped release group JSON.
pub fn release_group(id: &str, primary_type: &str, releases: &[(&str, &str)]) -> Value {
    let releases: Vec<Value> = releases
        .iter()
        .map(|(id, status)| json!({"id": id, "status": status, "title": "ignored"}))
        .collect();
    json!({
        "id": id,
        "primary-type": primary_type,
        "title": "ignored",
        "releases": releases,
    })
}

/// Fast retry schedule so failing tests don't wait for real backoff.
pub fn fast_retry(max_attempts: u32) -> RetrySettings {
    RetrySettings {
        max_attempts,
        initial_backoff_ms: 1,
        max_backoff_ms: 5,
        backoff_multiplier: 2.0,
    }
}

/// Settings pointing both services at the fake upstream.
pub fn settings_for(upstream: &TestUpstream) -> AppSettings {
    AppSettings {
        catalog_base_url: upstream.catalog_url(),
        archive_base_url: upstream.base_url.clone(),
        user_agent: "cover-art-hunter-tests/0.0".to_string(),
        request_timeout: Duration::from_secs(5),
        max_concurrent_requests: 4,
        max_concurrent_albums: 2,
        retry: fast_retry(5),
    }
}

/// A base URL where nothing is listening, so every request fails to connect.
pub fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("Failed to get address").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

/// Records every progress event for assertions.
#[derive(Default)]
pub struct RecordingProgress {
    pub stages: Mutex<Vec<(Stage, u64)>>,
    pub advanced: AtomicU64,
    pub finished: AtomicBool,
}

impl RecordingProgress {
    pub fn stages(&self) -> Vec<(Stage, u64)> {
        self.stages.lock().unwrap().clone()
    }

    pub fn advanced(&self) -> u64 {
        self.advanced.load(Ordering::SeqCst)
    }
}

impl AlbumProgress for RecordingProgress {
    fn stage(&self, stage: Stage, total: u64) {
        self.stages.lock().unwrap().push((stage, total));
        self.advanced.store(0, Ordering::SeqCst);
    }

    fn advance(&self, delta: u64) {
        self.advanced.fetch_add(delta, Ordering::SeqCst);
    }

    fn finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }
}

/// Fetch client with a fast retry schedule.
pub fn fetch_client(max_attempts: u32) -> Arc<FetchClient> {
    fetch_client_with_timeout(max_attempts, Duration::from_secs(5))
}

/// Fetch client with a fast retry schedule and a custom request timeout.
pub fn fetch_client_with_timeout(max_attempts: u32, timeout: Duration) -> Arc<FetchClient> {
    Arc::new(
        FetchClient::new(
            "cover-art-hunter-tests/0.0",
            timeout,
            RetryPolicy::new(&fast_retry(max_attempts)),
        )
        .expect("Failed to build fetch client"),
    )
}
