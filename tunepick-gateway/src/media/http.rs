use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{Artifact, FetchError, MediaFetcher};

#[derive(Debug, Clone)]
pub struct HttpMediaFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: u64,
    temp_dir: PathBuf,
}

impl HttpMediaFetcher {
    pub fn new(timeout: Duration, max_bytes: u64, temp_dir: PathBuf) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            timeout,
            max_bytes,
            temp_dir,
        })
    }

    fn parse_content_type(headers: &reqwest::header::HeaderMap) -> Option<String> {
        headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| {
                value
                    .split(';')
                    .next()
                    .unwrap_or(value)
                    .trim()
                    .to_lowercase()
            })
    }

    fn parse_content_length(headers: &reqwest::header::HeaderMap) -> Option<u64> {
        headers
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok())
    }

    fn is_audio_content(content_type: &str) -> bool {
        content_type.starts_with("audio/") || content_type == "application/octet-stream"
    }

    /// Pick a file suffix from the content type, then the URL path.
    fn suffix_for(content_type: Option<&str>, url: &reqwest::Url) -> &'static str {
        match content_type {
            Some("audio/mpeg") | Some("audio/mp3") => return ".mp3",
            Some("audio/flac") | Some("audio/x-flac") => return ".flac",
            Some("audio/mp4") | Some("audio/x-m4a") | Some("audio/aac") => return ".m4a",
            Some("audio/ogg") | Some("audio/opus") => return ".ogg",
            Some("audio/wav") | Some("audio/x-wav") => return ".wav",
            _ => {}
        }

        let path = url.path().to_lowercase();
        [".mp3", ".flac", ".m4a", ".ogg", ".wav"]
            .into_iter()
            .find(|ext| path.ends_with(ext))
            .unwrap_or(".mp3")
    }

    async fn download(&self, url: reqwest::Url) -> Result<Artifact, FetchError> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Http(response.status().as_u16()));
        }

        let content_type = Self::parse_content_type(response.headers());
        if let Some(ref ct) = content_type
            && !Self::is_audio_content(ct)
        {
            return Err(FetchError::UnsupportedContentType(ct.clone()));
        }

        if let Some(declared) = Self::parse_content_length(response.headers())
            && declared > self.max_bytes
        {
            return Err(FetchError::TooLarge {
                limit: self.max_bytes,
            });
        }

        let suffix = Self::suffix_for(content_type.as_deref(), &url);
        let temp_dir = self.temp_dir.clone();
        let (file, mut artifact) =
            tokio::task::spawn_blocking(move || Artifact::create_in(&temp_dir, suffix))
                .await
                .map_err(|e| FetchError::Io(std::io::Error::other(e)))??;
        let mut file = tokio::fs::File::from_std(file);

        // From here on, every early return drops `artifact`, which deletes the file.
        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?
        {
            written += chunk.len() as u64;
            if written > self.max_bytes {
                return Err(FetchError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        if written == 0 {
            return Err(FetchError::Empty);
        }

        artifact.set_len(written);
        debug!("Downloaded {} bytes to {:?}", written, artifact.path());
        Ok(artifact)
    }
}

#[async_trait::async_trait]
impl MediaFetcher for HttpMediaFetcher {
    async fn fetch(&self, url: &str) -> Result<Artifact, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|_| FetchError::InvalidUrl)?;
        match parsed.scheme() {
            "http" | "https" => {}
            _ => return Err(FetchError::InvalidUrl),
        }

        tokio::time::timeout(self.timeout, self.download(parsed))
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))?
    }
}
