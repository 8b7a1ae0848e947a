//! Shared helpers for lichen-swh integration tests
//!
//! Provides a scripted mock of the heritage archive (license facts endpoint
//! plus content-existence fallback) bound to an ephemeral port, and database
//! seeding utilities.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use lichen_common::config::HeritageConfig;
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Scripted reply for one license-endpoint request
#[derive(Debug, Clone)]
#[allow(dead_code)] // not every test binary uses every variant
pub enum MockReply {
    /// 200 with one fact carrying these license names
    Facts(Vec<&'static str>),
    /// 200 with an empty facts array
    NoFactsArray,
    /// 200 with a body that is not JSON
    MalformedBody,
    /// 429 with X-RateLimit-Reset = now + reset_in
    RateLimited { reset_in: i64 },
    /// 429 without the reset header
    RateLimitedMissingHeader,
    /// 404 (content endpoint decides found-ness, see [`MockArchive::mark_known`])
    NoLicenseFacts,
    /// 500
    ServerError,
}

/// Scripted heritage archive state shared with the axum handlers
#[derive(Default)]
pub struct MockArchive {
    /// Replies per sha256, consumed front-to-back; the last reply repeats
    scripts: Mutex<HashMap<String, Vec<MockReply>>>,
    /// Hashes the content-existence endpoint reports as archived
    known: Mutex<HashSet<String>>,
    license_hits: AtomicUsize,
    content_hits: AtomicUsize,
}

#[allow(dead_code)]
impl MockArchive {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Script the license-endpoint replies for a hash
    pub fn script(&self, sha256: &str, replies: Vec<MockReply>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(sha256.to_string(), replies);
    }

    /// Make the content-existence endpoint report this hash as archived
    pub fn mark_known(&self, sha256: &str) {
        self.known.lock().unwrap().insert(sha256.to_string());
    }

    pub fn license_hits(&self) -> usize {
        self.license_hits.load(Ordering::SeqCst)
    }

    pub fn content_hits(&self) -> usize {
        self.content_hits.load(Ordering::SeqCst)
    }

    fn next_reply(&self, sha256: &str) -> MockReply {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(sha256) {
            Some(replies) if replies.len() > 1 => replies.remove(0),
            Some(replies) => replies
                .first()
                .cloned()
                .unwrap_or(MockReply::NoLicenseFacts),
            None => MockReply::NoLicenseFacts,
        }
    }
}

fn hash_of(content_id: &str) -> String {
    content_id.trim_start_matches("sha256:").to_string()
}

async fn license_facts(
    State(archive): State<Arc<MockArchive>>,
    Path(content_id): Path<String>,
) -> Response {
    archive.license_hits.fetch_add(1, Ordering::SeqCst);
    match archive.next_reply(&hash_of(&content_id)) {
        MockReply::Facts(names) => Json(json!({ "facts": [{ "licenses": names }] })).into_response(),
        MockReply::NoFactsArray => Json(json!({ "facts": [] })).into_response(),
        MockReply::MalformedBody => (StatusCode::OK, "this is not json").into_response(),
        MockReply::RateLimited { reset_in } => {
            let reset_at = chrono::Utc::now().timestamp() + reset_in;
            (
                StatusCode::TOO_MANY_REQUESTS,
                [("X-RateLimit-Reset", reset_at.to_string())],
                "",
            )
                .into_response()
        }
        MockReply::RateLimitedMissingHeader => (StatusCode::TOO_MANY_REQUESTS, "").into_response(),
        MockReply::NoLicenseFacts => (
            StatusCode::NOT_FOUND,
            Json(json!({ "exception": "NotFoundExc" })),
        )
            .into_response(),
        MockReply::ServerError => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}

async fn content_info(
    State(archive): State<Arc<MockArchive>>,
    Path(content_id): Path<String>,
) -> Response {
    archive.content_hits.fetch_add(1, Ordering::SeqCst);
    let hash = hash_of(&content_id);
    if archive.known.lock().unwrap().contains(&hash) {
        Json(json!({ "status": "visible", "length": 1024 })).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "exception": "NotFoundExc" })),
        )
            .into_response()
    }
}

/// Serve the mock archive on an ephemeral local port
pub async fn spawn_mock_archive(archive: Arc<MockArchive>) -> SocketAddr {
    let app = Router::new()
        .route("/api/1/content/:content_id/license/", get(license_facts))
        .route("/api/1/content/:content_id", get(content_info))
        .with_state(archive);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Heritage config pointing at a mock archive
#[allow(dead_code)]
pub fn archive_config(addr: SocketAddr, max_sleep_secs: u64) -> HeritageConfig {
    HeritageConfig {
        base_url: format!("http://{}", addr),
        max_sleep_secs,
        ..HeritageConfig::default()
    }
}

/// In-memory database with the full lichen schema
#[allow(dead_code)]
pub async fn test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .unwrap();
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();
    lichen_common::db::init::create_schema(&pool).await.unwrap();
    pool
}
