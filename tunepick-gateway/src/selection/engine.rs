use std::sync::Arc;

use tracing::{debug, info, warn};

use tunepick_core::{Settings, Track};

use crate::catalog::CatalogClient;
use crate::deterministic_messages::selection as messages;
use crate::media::MediaFetcher;
use crate::presentation;

use super::command::{Command, ScopeKey};
use super::store::{Claim, SessionStore};
use super::{Outbound, Outcome, SelectionError};

/// Engine knobs taken from [`Settings`].
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub search_limit: usize,
    pub search_prefixes: Vec<String>,
    pub image_list: bool,
    /// Reply to an ordinal that has no session to pick from
    pub reply_no_session: bool,
    /// Reply to an ordinal from someone other than the searcher
    pub reply_not_originator: bool,
}

impl EngineOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            search_limit: settings.catalog.search_limit,
            search_prefixes: settings.commands.search_prefixes.clone(),
            image_list: settings.presentation.image_list,
            reply_no_session: settings.session.reply_no_session,
            reply_not_originator: settings.session.reply_not_originator,
        }
    }

    /// Prefix shown in usage hints.
    fn example_prefix(&self) -> &str {
        self.search_prefixes
            .iter()
            .map(|p| p.trim())
            .find(|p| !p.is_empty())
            .unwrap_or("/song")
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Single entry point between the chat transport and the session store.
pub struct SelectionEngine {
    catalog: Arc<dyn CatalogClient>,
    fetcher: Arc<dyn MediaFetcher>,
    store: Arc<SessionStore>,
    options: EngineOptions,
}

impl SelectionEngine {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        fetcher: Arc<dyn MediaFetcher>,
        store: Arc<SessionStore>,
        options: EngineOptions,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            store,
            options,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Handle one inbound text from `sender_id` in `scope`.
    pub async fn handle(
        &self,
        scope: &ScopeKey,
        sender_id: &str,
        text: &str,
        outbound: &dyn Outbound,
    ) -> Outcome {
        match Command::parse(text, &self.options.search_prefixes) {
            Command::Ignore => Outcome::Ignored,
            Command::Search(keyword) => self.search(scope, sender_id, &keyword, outbound).await,
            Command::Ordinal(ordinal) => self.select(scope, sender_id, ordinal, outbound).await,
        }
    }

    async fn search(
        &self,
        scope: &ScopeKey,
        sender_id: &str,
        keyword: &str,
        outbound: &dyn Outbound,
    ) -> Outcome {
        if keyword.is_empty() {
            return self
                .reject(scope, SelectionError::EmptyKeyword, keyword, outbound)
                .await;
        }

        info!("[scope:{}] Searching for \"{}\"", scope, keyword);
        let mut tracks = match self.catalog.search(keyword, self.options.search_limit).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!("[scope:{}] Catalog search failed: {}", scope, e);
                return self
                    .reject(scope, SelectionError::SearchFailed, keyword, outbound)
                    .await;
            }
        };
        tracks.truncate(self.options.search_limit);

        if tracks.is_empty() {
            return self
                .reject(scope, SelectionError::NoResults, keyword, outbound)
                .await;
        }

        let count = tracks.len();
        self.store.put(scope, tracks.clone(), sender_id).await;
        info!("[scope:{}] Stored {} results for {}", scope, count, sender_id);

        self.present(scope, keyword, tracks, outbound).await;
        Outcome::Listed { count }
    }

    /// Send the result list, as an image when possible and text otherwise.
    async fn present(
        &self,
        scope: &ScopeKey,
        keyword: &str,
        tracks: Vec<Track>,
        outbound: &dyn Outbound,
    ) {
        let ttl = self.store.ttl();

        if self.options.image_list {
            let rendered = tokio::task::spawn_blocking({
                let tracks = tracks.clone();
                move || presentation::render_png(&tracks)
            })
            .await;

            match rendered {
                Ok(Some(png)) => {
                    let hint = format!(
                        "{}\n{}",
                        messages::list_header(keyword),
                        messages::selection_hint(tracks.len(), ttl)
                    );
                    match outbound.reply_image(png).await {
                        Ok(()) => {
                            if let Err(e) = outbound.reply_text(&hint).await {
                                warn!("[scope:{}] Failed to send selection hint: {}", scope, e);
                            }
                            return;
                        }
                        Err(e) => {
                            warn!("[scope:{}] Image list failed, falling back to text: {}", scope, e);
                        }
                    }
                }
                Ok(None) => debug!("[scope:{}] Image list unavailable, using text", scope),
                Err(e) => warn!("[scope:{}] Image render task failed: {}", scope, e),
            }
        }

        let text = presentation::render_text(keyword, &tracks, ttl);
        if let Err(e) = outbound.reply_text(&text).await {
            warn!("[scope:{}] Failed to send result list: {}", scope, e);
        }
    }

    async fn select(
        &self,
        scope: &ScopeKey,
        sender_id: &str,
        ordinal: u64,
        outbound: &dyn Outbound,
    ) -> Outcome {
        let track = match self.store.claim(scope, sender_id, ordinal).await {
            Claim::Accepted(track) => track,
            Claim::Absent => {
                return self.reject(scope, SelectionError::NoSession, "", outbound).await;
            }
            Claim::Expired => {
                return self
                    .reject(scope, SelectionError::SessionExpired, "", outbound)
                    .await;
            }
            Claim::OutOfRange { len } => {
                return self
                    .reject(scope, SelectionError::IndexOutOfRange { len }, "", outbound)
                    .await;
            }
            Claim::NotOriginator => {
                return self
                    .reject(scope, SelectionError::NotOriginator, "", outbound)
                    .await;
            }
        };

        info!(
            "[scope:{}] {} picked #{}: {} (id {})",
            scope, sender_id, ordinal, track, track.id
        );

        let url = match self.catalog.resolve_url(&track.id).await {
            Ok(url) => url,
            Err(e) => {
                warn!("[scope:{}] Resolve failed for {}: {}", scope, track.id, e);
                return self
                    .reject(scope, SelectionError::ResolveFailed, "", outbound)
                    .await;
            }
        };

        let artifact = match self.fetcher.fetch(&url).await {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!("[scope:{}] Fetch failed for {}: {}", scope, track.id, e);
                return self
                    .reject(scope, SelectionError::FetchFailed, "", outbound)
                    .await;
            }
        };
        debug!(
            "[scope:{}] Fetched {} bytes to {:?}",
            scope,
            artifact.len(),
            artifact.path()
        );

        let delivered = outbound.deliver_voice(&track, &artifact).await;

        if let Err(e) = artifact.release().await {
            warn!("[scope:{}] Failed to release artifact: {}", scope, e);
        }

        match delivered {
            Ok(()) => {
                info!("[scope:{}] Delivered {}", scope, track);
                Outcome::Delivered { track }
            }
            Err(e) => {
                warn!("[scope:{}] Voice delivery failed: {}", scope, e);
                self.reject(scope, SelectionError::DeliveryFailed, "", outbound)
                    .await
            }
        }
    }

    async fn reject(
        &self,
        scope: &ScopeKey,
        error: SelectionError,
        keyword: &str,
        outbound: &dyn Outbound,
    ) -> Outcome {
        let silent = match error {
            SelectionError::NoSession => !self.options.reply_no_session,
            SelectionError::NotOriginator => !self.options.reply_not_originator,
            _ => false,
        };

        if silent {
            debug!("[scope:{}] Ignoring: {}", scope, error);
        } else {
            let text = messages::rejection(&error, keyword, self.options.example_prefix());
            if let Err(e) = outbound.reply_text(&text).await {
                warn!("[scope:{}] Failed to send rejection: {}", scope, e);
            }
        }

        Outcome::Rejected(error)
    }
}
