use std::sync::Arc;

use serenity::builder::{CreateAttachment, CreateMessage};
use serenity::http::Http;
use serenity::model::id::ChannelId;

use tunepick_core::Track;

use crate::deterministic_messages::discord::RESULTS_IMAGE_NAME;
use crate::media::Artifact;
use crate::selection::{DeliveryError, Outbound};

pub const DISCORD_MESSAGE_LIMIT: usize = 2000;
/// Attachment size limit on servers without boosts.
pub const DISCORD_UPLOAD_LIMIT: u64 = 10 * 1024 * 1024;
const ATTACHMENT_NAME_MAX_CHARS: usize = 100;

/// Replies into the Discord channel a message arrived in.
pub struct DiscordOutbound {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl DiscordOutbound {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait::async_trait]
impl Outbound for DiscordOutbound {
    async fn reply_text(&self, text: &str) -> Result<(), DeliveryError> {
        for chunk in split_discord_message(text) {
            self.channel_id
                .say(self.http.as_ref(), chunk)
                .await
                .map_err(|e| DeliveryError(e.to_string()))?;
        }
        Ok(())
    }

    async fn reply_image(&self, png: Vec<u8>) -> Result<(), DeliveryError> {
        let message =
            CreateMessage::new().add_file(CreateAttachment::bytes(png, RESULTS_IMAGE_NAME));
        self.channel_id
            .send_message(self.http.as_ref(), message)
            .await
            .map_err(|e| DeliveryError(e.to_string()))?;
        Ok(())
    }

    async fn deliver_voice(&self, track: &Track, artifact: &Artifact) -> Result<(), DeliveryError> {
        let mut attachment = CreateAttachment::path(artifact.path())
            .await
            .map_err(|e| DeliveryError(e.to_string()))?;
        attachment.filename = attachment_name(track, artifact);
        let message = CreateMessage::new()
            .content(format!("🎵 {} ({})", track, track.duration_label()))
            .add_file(attachment);
        self.channel_id
            .send_message(self.http.as_ref(), message)
            .await
            .map_err(|e| DeliveryError(e.to_string()))?;
        Ok(())
    }
}

/// File name shown in Discord: `Title - Artist.ext`, keeping the artifact's extension.
pub fn attachment_name(track: &Track, artifact: &Artifact) -> String {
    let extension = artifact
        .path()
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("mp3");

    let stem: String = format!("{} - {}", track.title, track.artist)
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .take(ATTACHMENT_NAME_MAX_CHARS)
        .collect();
    let stem = stem.trim().trim_matches('.');

    if stem.is_empty() || stem == "-" {
        format!("track.{}", extension)
    } else {
        format!("{}.{}", stem, extension)
    }
}

/// Split text into chunks Discord accepts, preferring line boundaries.
pub fn split_discord_message(content: &str) -> Vec<String> {
    if content.chars().count() <= DISCORD_MESSAGE_LIMIT {
        return vec![content.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    for line in content.split_inclusive('\n') {
        let line_len = line.chars().count();
        if line_len > DISCORD_MESSAGE_LIMIT {
            for ch in line.chars() {
                if current_len + 1 > DISCORD_MESSAGE_LIMIT {
                    chunks.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                current.push(ch);
                current_len += 1;
            }
            continue;
        }
        if current_len + line_len > DISCORD_MESSAGE_LIMIT && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(line);
        current_len += line_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(dir: &std::path::Path, name: &str) -> Artifact {
        Artifact::from_path(dir.join(name), 0)
    }

    #[test]
    fn attachment_named_after_track() {
        let dir = tempfile::tempdir().unwrap();
        let track = Track::new("1", "Sunny Day", "Jay Chou", 269, "Yeh Hui-Mei");

        let name = attachment_name(&track, &artifact(dir.path(), "tunepick-a1b2.flac"));
        assert_eq!(name, "Sunny Day - Jay Chou.flac");
    }

    #[test]
    fn attachment_name_replaces_path_characters() {
        let dir = tempfile::tempdir().unwrap();
        let track = Track::new("1", "AC/DC: Live?", "A / B", 1, "");

        let name = attachment_name(&track, &artifact(dir.path(), "tunepick-x.mp3"));
        assert_eq!(name, "AC_DC_ Live_ - A _ B.mp3");
    }

    #[test]
    fn attachment_name_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let track = Track::new("1", "晴".repeat(300), "Jay Chou", 1, "");

        let name = attachment_name(&track, &artifact(dir.path(), "tunepick-x"));
        assert_eq!(name.chars().count(), ATTACHMENT_NAME_MAX_CHARS + ".mp3".len());
        assert!(name.ends_with(".mp3"));
    }

    #[test]
    fn default_download_cap_fits_discord_uploads() {
        assert!(tunepick_core::FetchSettings::default().max_bytes <= DISCORD_UPLOAD_LIMIT);
    }

    #[test]
    fn short_message_is_single_chunk() {
        assert_eq!(split_discord_message("1. Sunny Day"), vec!["1. Sunny Day"]);
    }

    #[test]
    fn long_message_splits_on_lines() {
        let line = format!("{}\n", "a".repeat(999));
        let content = line.repeat(3);

        let chunks = split_discord_message(&content);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], line.repeat(2));
        assert_eq!(chunks[1], line);
    }

    #[test]
    fn oversized_line_is_hard_split() {
        let content = "晴".repeat(DISCORD_MESSAGE_LIMIT + 10);

        let chunks = split_discord_message(&content);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), DISCORD_MESSAGE_LIMIT);
        assert_eq!(chunks[1].chars().count(), 10);
    }
}
