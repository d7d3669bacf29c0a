//! Result list rendering.
//!
//! The engine prefers the PNG table and falls back to [`render_text`] when
//! image rendering is disabled or fails.

mod list_image;

use std::time::Duration;

use tunepick_core::Track;

use crate::deterministic_messages::selection;

pub use list_image::{init_fonts, render_png};

/// Numbered plain-text list with a header and the selection hint.
pub fn render_text(keyword: &str, tracks: &[Track], ttl: Duration) -> String {
    let mut lines = Vec::with_capacity(tracks.len() + 2);
    lines.push(selection::list_header(keyword));
    for (i, track) in tracks.iter().enumerate() {
        let album = if track.album.is_empty() {
            String::new()
        } else {
            format!(" [{}]", track.album)
        };
        lines.push(format!(
            "{}. {} - {}{} ({})",
            i + 1,
            track.title,
            track.artist,
            album,
            track.duration_label()
        ));
    }
    lines.push(selection::selection_hint(tracks.len(), ttl));
    lines.join("\n")
}
