//! Shared helpers for integration tests.
//!
//! A local axum server stands in for both the catalog API and the media CDN.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use axum::Router;
use axum::extract::{Path as UrlPath, Query};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use tunepick_core::Track;
use tunepick_gateway::{Artifact, DeliveryError, Outbound};

pub const AUDIO_SIZE: usize = 1000;
pub const BIG_SIZE: usize = 4096;
pub const SLOW_DELAY: Duration = Duration::from_secs(2);

fn song(id: Value, name: &str, artist: &str, album: &str, dt_ms: u64) -> Value {
    json!({
        "id": id,
        "name": name,
        "ar": [{ "id": 1, "name": artist }],
        "al": { "id": 2, "name": album },
        "dt": dt_ms,
    })
}

fn songs_for(keyword: &str) -> Vec<Value> {
    match keyword {
        "nothing" => Vec::new(),
        "slow" => vec![song(json!("slow"), "Slow Song", "Sleepy", "Naps", 180_000)],
        "missing" => vec![song(json!("404"), "Lost Song", "Nobody", "Void", 120_000)],
        "duet" => vec![json!({
            "id": 201,
            "name": "Duet",
            "artists": [{ "name": "A" }, { "name": "B" }],
            "album": { "name": "Pairs" },
            "duration": 200_500,
        })],
        _ => vec![
            song(json!(101), "Sunny Day", "Jay Chou", "Yeh Hui-Mei", 269_000),
            song(json!(102), "Sunny Day (Live)", "Jay Chou", "Live Tour", 301_000),
            song(json!(103), "Sunny Day", "Cover Band", "", 250_000),
        ],
    }
}

async fn search(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let keyword = params.get("keywords").cloned().unwrap_or_default();
    match keyword.as_str() {
        "boom" => return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        "sleepy" => tokio::time::sleep(SLOW_DELAY).await,
        _ => {}
    }

    let limit: usize = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(30);
    let songs: Vec<Value> = songs_for(&keyword).into_iter().take(limit).collect();
    if songs.is_empty() {
        return axum::Json(json!({ "result": { "songCount": 0 }, "code": 200 })).into_response();
    }
    axum::Json(json!({ "result": { "songs": songs, "songCount": songs.len() }, "code": 200 }))
        .into_response()
}

async fn song_url(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let id = params.get("id").cloned().unwrap_or_default();
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("127.0.0.1")
        .to_string();
    let has_cookie = headers
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|c| c.contains("MUSIC_U="));

    let url = match id.as_str() {
        "404" => return (StatusCode::NOT_FOUND, "gone").into_response(),
        "nourl" => Value::Null,
        "vip" if !has_cookie => Value::Null,
        _ => json!(format!("http://{}/media/{}.mp3", host, id)),
    };
    axum::Json(json!({ "data": [{ "id": id, "url": url }], "code": 200 })).into_response()
}

async fn media(UrlPath(name): UrlPath<String>) -> impl IntoResponse {
    let audio = |size: usize| {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "audio/mpeg")],
            vec![7u8; size],
        )
            .into_response()
    };

    match name.as_str() {
        "slow.mp3" => {
            tokio::time::sleep(SLOW_DELAY).await;
            audio(AUDIO_SIZE)
        }
        "big.mp3" => audio(BIG_SIZE),
        "empty.mp3" => audio(0),
        "page.mp3" => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            "<html></html>",
        )
            .into_response(),
        "missing.mp3" => (StatusCode::NOT_FOUND, "missing").into_response(),
        "track.flac" => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "audio/flac")],
            vec![3u8; AUDIO_SIZE],
        )
            .into_response(),
        _ => audio(AUDIO_SIZE),
    }
}

/// Start the fixture server and return its base URL.
pub async fn start_server() -> (String, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route("/search", get(search))
        .route("/song/url", get(song_url))
        .route("/media/{name}", get(media));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), handle)
}

#[allow(dead_code)]
pub fn dir_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

/// A voice delivery as seen by the outbound side.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct DeliveredVoice {
    pub track_id: String,
    pub existed: bool,
    pub len: u64,
}

#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingOutbound {
    pub texts: Mutex<Vec<String>>,
    pub voices: Mutex<Vec<DeliveredVoice>>,
    pub fail_voice: bool,
}

#[allow(dead_code)]
impl RecordingOutbound {
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    pub fn voices(&self) -> Vec<DeliveredVoice> {
        self.voices.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Outbound for RecordingOutbound {
    async fn reply_text(&self, text: &str) -> Result<(), DeliveryError> {
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn reply_image(&self, _png: Vec<u8>) -> Result<(), DeliveryError> {
        Ok(())
    }

    async fn deliver_voice(&self, track: &Track, artifact: &Artifact) -> Result<(), DeliveryError> {
        let existed = artifact.path().exists();
        let len = std::fs::metadata(artifact.path())
            .map(|m| m.len())
            .unwrap_or(0);
        self.voices.lock().unwrap().push(DeliveredVoice {
            track_id: track.id.clone(),
            existed,
            len,
        });
        if self.fail_voice {
            return Err(DeliveryError("upload rejected".to_string()));
        }
        Ok(())
    }
}
