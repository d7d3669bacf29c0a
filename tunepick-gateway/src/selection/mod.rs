//! Search, list, and pick-by-ordinal flow.
//!
//! A search stores its result list per [`ScopeKey`]; a later bare ordinal in
//! the same scope picks one entry, which is resolved, downloaded, delivered
//! as voice, and then deleted.

pub mod command;
pub mod engine;
pub mod store;

use tunepick_core::Track;

use crate::media::Artifact;

pub use command::{Command, ScopeKey};
pub use engine::{EngineOptions, SelectionEngine};
pub use store::{Claim, Clock, ManualClock, SearchSession, SessionStore, SystemClock};

/// Why a request ended without a delivered voice message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("search keyword is empty")]
    EmptyKeyword,
    #[error("search returned no results")]
    NoResults,
    #[error("catalog search failed")]
    SearchFailed,
    #[error("no search session in this scope")]
    NoSession,
    #[error("search session expired")]
    SessionExpired,
    #[error("ordinal outside 1..={len}")]
    IndexOutOfRange { len: usize },
    #[error("sender did not start this search")]
    NotOriginator,
    #[error("could not resolve a playable url")]
    ResolveFailed,
    #[error("media download failed")]
    FetchFailed,
    #[error("voice delivery failed")]
    DeliveryFailed,
}

/// Terminal result of handling one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not a command; nothing was sent
    Ignored,
    /// A result list of `count` tracks was shown and stored
    Listed { count: usize },
    /// The picked track was delivered as voice
    Delivered { track: Track },
    /// The request failed; a reply may or may not have been sent
    Rejected(SelectionError),
}

#[derive(Debug, thiserror::Error)]
#[error("delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Replies back into the conversation a message came from.
#[async_trait::async_trait]
pub trait Outbound: Send + Sync {
    async fn reply_text(&self, text: &str) -> Result<(), DeliveryError>;

    async fn reply_image(&self, png: Vec<u8>) -> Result<(), DeliveryError>;

    /// Send the artifact as a voice/audio message. The artifact stays owned
    /// by the caller and must still exist when this returns.
    async fn deliver_voice(&self, track: &Track, artifact: &Artifact) -> Result<(), DeliveryError>;
}
