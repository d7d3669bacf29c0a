//! Transient audio artifacts and the fetchers that produce them.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

pub mod http;

pub use http::HttpMediaFetcher;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid url")]
    InvalidUrl,
    #[error("media server returned HTTP {0}")]
    Http(u16),
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),
    #[error("media exceeds {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("media body is empty")]
    Empty,
    #[error("download timed out after {0:?}")]
    Timeout(Duration),
    #[error("artifact io error: {0}")]
    Io(#[from] io::Error),
    #[error("request failed: {0}")]
    RequestFailed(String),
}

/// Streams a media URL into a local [`Artifact`].
#[async_trait::async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Artifact, FetchError>;
}

/// A downloaded audio file owned by exactly one selection attempt.
///
/// The file is deleted when the artifact is released or dropped, whichever
/// comes first. `release` reports deletion errors to the caller; the drop
/// path can only log them.
#[derive(Debug)]
pub struct Artifact {
    path: PathBuf,
    len: u64,
    released: bool,
}

impl Artifact {
    /// Take ownership of an existing file.
    pub fn from_path(path: PathBuf, len: u64) -> Self {
        Self {
            path,
            len,
            released: false,
        }
    }

    /// Create a uniquely named empty file in `dir` and take ownership of it.
    pub fn create_in(dir: &Path, suffix: &str) -> io::Result<(std::fs::File, Self)> {
        std::fs::create_dir_all(dir)?;
        let named = tempfile::Builder::new()
            .prefix("tunepick-")
            .suffix(suffix)
            .tempfile_in(dir)?;
        let (file, temp_path) = named.into_parts();
        let path = temp_path.keep().map_err(|e| e.error)?;
        Ok((file, Self::from_path(path, 0)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn set_len(&mut self, len: u64) {
        self.len = len;
    }

    /// File name to present to the chat platform.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "track.mp3".to_string())
    }

    /// Delete the file now. A file that is already gone counts as released.
    pub async fn release(mut self) -> io::Result<()> {
        self.released = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Released artifact {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Drop for Artifact {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Dropped artifact {:?}", self.path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to delete artifact {:?}: {}", self.path, e),
        }
    }
}
