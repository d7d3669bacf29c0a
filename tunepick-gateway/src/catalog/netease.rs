use std::time::Duration;

use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use tunepick_core::Track;

use super::{CatalogClient, CatalogError};

/// Client for a NeteaseCloudMusicApi-compatible catalog server.
#[derive(Debug, Clone)]
pub struct NeteaseCatalogClient {
    client: reqwest::Client,
    base_url: String,
    search_timeout: Duration,
    resolve_timeout: Duration,
}

impl NeteaseCatalogClient {
    pub fn new(
        base_url: &str,
        cookie: Option<&str>,
        search_timeout: Duration,
        resolve_timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let parsed = reqwest::Url::parse(base_url)
            .map_err(|_| CatalogError::InvalidBaseUrl(base_url.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => {}
            _ => return Err(CatalogError::InvalidBaseUrl(base_url.to_string())),
        }

        let mut headers = HeaderMap::new();
        if let Some(cookie) = cookie {
            headers.insert(
                COOKIE,
                HeaderValue::from_str(cookie)
                    .map_err(|e| CatalogError::RequestFailed(e.to_string()))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| CatalogError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            search_timeout,
            resolve_timeout,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T, CatalogError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .timeout(timeout)
            .query(query)
            .send()
            .await
            .map_err(|e| CatalogError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatalogError::Http(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::RequestFailed(e.to_string()))
    }
}

#[async_trait::async_trait]
impl CatalogClient for NeteaseCatalogClient {
    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<Track>, CatalogError> {
        let payload: SearchResponse = self
            .get_json(
                "/search",
                &[
                    ("keywords", keyword.to_string()),
                    ("limit", limit.to_string()),
                    ("type", "1".to_string()),
                ],
                self.search_timeout,
            )
            .await?;

        let tracks: Vec<Track> = payload
            .result
            .and_then(|result| result.songs)
            .unwrap_or_default()
            .into_iter()
            .filter_map(SearchSong::into_track)
            .take(limit)
            .collect();

        debug!("Catalog search '{}' returned {} tracks", keyword, tracks.len());
        Ok(tracks)
    }

    async fn resolve_url(&self, track_id: &str) -> Result<String, CatalogError> {
        let payload: SongUrlResponse = self
            .get_json(
                "/song/url",
                &[("id", track_id.to_string())],
                self.resolve_timeout,
            )
            .await?;

        payload
            .data
            .unwrap_or_default()
            .into_iter()
            .find_map(|entry| entry.url.filter(|url| !url.trim().is_empty()))
            .ok_or_else(|| CatalogError::NoUrl(track_id.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Option<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    songs: Option<Vec<SearchSong>>,
}

#[derive(Debug, Deserialize)]
struct SearchSong {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "ar")]
    artists: Option<Vec<NamedEntity>>,
    #[serde(default, alias = "al")]
    album: Option<NamedEntity>,
    /// Milliseconds
    #[serde(default, alias = "dt")]
    duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct NamedEntity {
    #[serde(default)]
    name: Option<String>,
}

impl SearchSong {
    fn into_track(self) -> Option<Track> {
        let id = match self.id? {
            Value::Number(n) => n.to_string(),
            Value::String(s) if !s.is_empty() => s,
            _ => return None,
        };
        let artist = self
            .artists
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| a.name)
            .collect::<Vec<_>>()
            .join(" / ");

        Some(Track {
            id,
            title: self.name.unwrap_or_else(|| "(untitled)".to_string()),
            artist,
            duration_seconds: self.duration.unwrap_or(0) / 1000,
            album: self.album.and_then(|a| a.name).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SongUrlResponse {
    #[serde(default)]
    data: Option<Vec<SongUrlEntry>>,
}

#[derive(Debug, Deserialize)]
struct SongUrlEntry {
    #[serde(default)]
    url: Option<String>,
}
