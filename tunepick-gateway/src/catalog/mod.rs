use tunepick_core::Track;

pub mod netease;

pub use netease::NeteaseCatalogClient;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid catalog base url: {0}")]
    InvalidBaseUrl(String),
    #[error("catalog returned HTTP {0}")]
    Http(u16),
    #[error("no playable url for track {0}")]
    NoUrl(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
}

/// Keyword search and URL resolution against a song catalog.
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Search by keyword, returning at most `limit` tracks in catalog rank order.
    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<Track>, CatalogError>;

    /// Resolve a track id to a playable media URL.
    async fn resolve_url(&self, track_id: &str) -> Result<String, CatalogError>;
}
