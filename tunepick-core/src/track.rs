use serde::{Deserialize, Serialize};

/// A catalog entry returned by a keyword search.
///
/// Tracks are produced by the catalog client and never mutated afterwards;
/// the user-visible index of a track is its position in the result list,
/// not any field of the track itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Opaque catalog key used to resolve the playable URL
    pub id: String,
    pub title: String,
    pub artist: String,
    pub duration_seconds: u64,
    pub album: String,
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        duration_seconds: u64,
        album: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            duration_seconds,
            album: album.into(),
        }
    }

    /// Duration as `m:ss`.
    pub fn duration_label(&self) -> String {
        format!(
            "{}:{:02}",
            self.duration_seconds / 60,
            self.duration_seconds % 60
        )
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.title, self.artist)
    }
}
