//! Fake MusicBrainz + Cover Art Archive + image host
//!
//! A single axum app on a random port serves all three upstreams:
//! - `GET /ws/2/release-group/?offset=N&limit=M` paginates the configured release groups
//! - `GET /release/{id}` returns the configured art entries for a release
//! - `GET /images/{name}` returns the configured image bytes
//!
//! Every request is recorded so tests can assert on what was (not) fetched.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// One entry of a release's `images` array.
#[derive(Clone, Debug)]
pub struct ArtEntry {
    /// Name under `/images/`; rendered as a full URL.
    pub image: Option<String>,
    pub types: Option<Vec<String>>,
}

impl ArtEntry {
    pub fn front(name: &str) -> Self {
        Self::typed(name, &["Front"])
    }

    pub fn typed(name: &str, types: &[&str]) -> Self {
        Self {
            image: Some(name.to_string()),
            types: Some(types.iter().map(|t| t.to_string()).collect()),
        }
    }
}

#[derive(Clone, Debug)]
pub enum ArchiveReply {
    Images(Vec<ArtEntry>),
    Status(u16),
    /// 200 with a body that is not JSON.
    Garbage,
}

#[derive(Clone, Debug)]
pub enum ImageReply {
    Bytes(Vec<u8>),
    Status(u16),
    /// Waits this long before answering, to outlast the client timeout.
    Stall(Duration),
}

/// What the fake upstreams answer.
#[derive(Clone, Debug, Default)]
pub struct UpstreamFixture {
    /// Answer for any album without an entry in `album_release_groups`.
    pub release_groups: Vec<Value>,
    /// Answers keyed by the `releasegroup:` term of the search query.
    pub album_release_groups: HashMap<String, Vec<Value>>,
    /// Reported `count`; defaults to the number of release groups.
    pub count: Option<u64>,
    /// Page offsets answered with HTTP 500.
    pub failing_offsets: HashSet<u64>,
    /// Page offsets answered with 200 and a body that is not JSON.
    pub garbage_offsets: HashSet<u64>,
    pub archive: HashMap<String, ArchiveReply>,
    pub images: HashMap<String, ImageReply>,
}

impl UpstreamFixture {
    pub fn with_release_group(mut self, group: Value) -> Self {
        self.release_groups.push(group);
        self
    }

    pub fn with_album_release_group(mut self, album: &str, group: Value) -> Self {
        self.album_release_groups
            .entry(album.to_string())
            .or_default()
            .push(group);
        self
    }

    pub fn with_art(mut self, release_id: &str, entries: Vec<ArtEntry>) -> Self {
        self.archive
            .insert(release_id.to_string(), ArchiveReply::Images(entries));
        self
    }

    pub fn with_archive_reply(mut self, release_id: &str, reply: ArchiveReply) -> Self {
        self.archive.insert(release_id.to_string(), reply);
        self
    }

    pub fn with_image(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.images.insert(name.to_string(), ImageReply::Bytes(bytes));
        self
    }

    pub fn with_image_status(mut self, name: &str, status: u16) -> Self {
        self.images.insert(name.to_string(), ImageReply::Status(status));
        self
    }

    pub fn with_stalled_image(mut self, name: &str, delay: Duration) -> Self {
        self.images.insert(name.to_string(), ImageReply::Stall(delay));
        self
    }
}

#[derive(Clone)]
struct UpstreamState {
    base_url: String,
    fixture: Arc<UpstreamFixture>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl UpstreamState {
    fn record(&self, entry: String) {
        self.requests.lock().unwrap().push(entry);
    }
}

/// Running fake upstream. Shuts down when dropped.
pub struct TestUpstream {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestUpstream {
    pub async fn spawn(fixture: UpstreamFixture) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = UpstreamState {
            base_url: base_url.clone(),
            fixture: Arc::new(fixture),
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/ws/2/release-group/", get(release_groups))
            .route("/release/{id}", get(cover_art))
            .route("/images/{name}", get(image))
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        Self {
            base_url,
            requests,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn catalog_url(&self) -> String {
        format!("{}/ws/2", self.base_url)
    }

    pub fn image_url(&self, name: &str) -> String {
        format!("{}/images/{}", self.base_url, name)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn count_matching(&self, entry: &str) -> usize {
        self.requests().iter().filter(|r| r.as_str() == entry).count()
    }

    /// Offsets of every release group page requested, sorted.
    pub fn page_offsets(&self) -> Vec<u64> {
        let mut offsets: Vec<u64> = self
            .requests()
            .iter()
            .filter_map(|r| r.strip_prefix("release-group offset="))
            .filter_map(|o| o.parse().ok())
            .collect();
        offsets.sort_unstable();
        offsets
    }

    pub fn catalog_requests(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.starts_with("release-group "))
            .count()
    }

    pub fn archive_requests(&self, release_id: &str) -> usize {
        self.count_matching(&format!("release {}", release_id))
    }

    pub fn image_requests(&self, name: &str) -> usize {
        self.count_matching(&format!("image {}", name))
    }
}

async fn release_groups(
    State(state): State<UpstreamState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let offset: u64 = params
        .get("offset")
        .and_then(|o| o.parse().ok())
        .unwrap_or(0);
    let limit: u64 = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(25);
    state.record(format!("release-group offset={}", offset));

    if params.get("fmt").map(String::as_str) != Some("json") || !params.contains_key("query") {
        return StatusCode::BAD_REQUEST.into_response();
    }

    if state.fixture.failing_offsets.contains(&offset) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if state.fixture.garbage_offsets.contains(&offset) {
        return "<html>not json</html>".into_response();
    }

    let album = params
        .get("query")
        .and_then(|q| q.split("releasegroup:").nth(1))
        .unwrap_or_default();
    let groups = state
        .fixture
        .album_release_groups
        .get(album)
        .unwrap_or(&state.fixture.release_groups);
    let count = state.fixture.count.unwrap_or(groups.len() as u64);
    let page: Vec<Value> = groups
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect();

    Json(json!({
        "created": "2024-01-01T00:00:00.000Z",
        "count": count,
        "offset": offset,
        "release-groups": page,
    }))
    .into_response()
}

async fn cover_art(State(state): State<UpstreamState>, Path(id): Path<String>) -> Response {
    state.record(format!("release {}", id));

    match state.fixture.archive.get(&id) {
        None => StatusCode::NOT_FOUND.into_response(),
        Some(ArchiveReply::Status(code)) => status(*code).into_response(),
        Some(ArchiveReply::Garbage) => "<html>not json</html>".into_response(),
        Some(ArchiveReply::Images(entries)) => {
            let images: Vec<Value> = entries
                .iter()
                .map(|entry| {
                    let mut image = serde_json::Map::new();
                    if let Some(name) = &entry.image {
                        image.insert(
                            "image".to_string(),
                            json!(format!("{}/images/{}", state.base_url, name)),
                        );
                    }
                    if let Some(types) = &entry.types {
                        image.insert("types".to_string(), json!(types));
                    }
                    image.insert("approved".to_string(), json!(true));
                    Value::Object(image)
                })
                .collect();
            Json(json!({
                "images": images,
                "release": format!("https://musicbrainz.org/release/{}", id),
            }))
            .into_response()
        }
    }
}

async fn image(State(state): State<UpstreamState>, Path(name): Path<String>) -> Response {
    state.record(format!("image {}", name));

    match state.fixture.images.get(&name) {
        None => StatusCode::NOT_FOUND.into_response(),
        Some(ImageReply::Status(code)) => status(*code).into_response(),
        Some(ImageReply::Bytes(bytes)) => bytes.clone().into_response(),
        Some(ImageReply::Stall(delay)) => {
            tokio::time::sleep(*delay).await;
            StatusCode::GATEWAY_TIMEOUT.into_response()
        }
    }
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).expect("valid status code")
}
