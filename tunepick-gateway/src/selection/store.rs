//! Per-scope search sessions with lazy expiry.
//!
//! Expiry is checked when a session is read, and `put` drops every expired
//! entry while it holds the lock; there is no background sweep. All mutation
//! goes through one mutex, and the lock is never held across I/O.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use tunepick_core::Track;

use super::command::ScopeKey;

/// Source of the current time for expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
///
/// Test clock for driving expiry without sleeping; production code uses
/// [`SystemClock`].
#[derive(Debug)]
pub struct ManualClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let by = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::MAX);
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = now.checked_add_signed(by).unwrap_or(DateTime::<Utc>::MAX_UTC);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// The most recent result list for one conversation scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSession {
    pub results: Vec<Track>,
    pub originator_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SearchSession {
    /// Live while `now <= expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Result of trying to pick an ordinal from a scope's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// The session was consumed and this track was picked
    Accepted(Track),
    /// No session for the scope
    Absent,
    /// The session had expired; it has been purged
    Expired,
    /// Ordinal outside `1..=len`; the session is untouched
    OutOfRange { len: usize },
    /// Sender did not run the search; the session is untouched.
    /// Takes precedence over `OutOfRange`.
    NotOriginator,
}

pub struct SessionStore {
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
    sessions: Mutex<HashMap<ScopeKey, SearchSession>>,
}

impl SessionStore {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            clock,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_system_clock(ttl: Duration) -> Self {
        Self::new(ttl, Arc::new(SystemClock))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl.to_std().unwrap_or(Duration::MAX)
    }

    /// Replace the scope's session with a fresh one. Empty result lists are not stored.
    ///
    /// Expired sessions of every scope are dropped on the way, so scopes that
    /// never come back do not pile up.
    pub async fn put(&self, scope: &ScopeKey, results: Vec<Track>, originator_id: &str) {
        if results.is_empty() {
            warn!("[scope:{}] Refusing to store an empty result list", scope);
            return;
        }

        let created_at = self.clock.now();
        let expires_at = created_at
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let session = SearchSession {
            results,
            originator_id: originator_id.to_string(),
            created_at,
            expires_at,
        };

        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(created_at));
        let purged = before - sessions.len();
        if purged > 0 {
            debug!("Purged {} expired search sessions", purged);
        }

        if sessions.insert(scope.clone(), session).is_some() {
            debug!("[scope:{}] Replaced previous search session", scope);
        }
    }

    /// Return the live session, purging it instead if it has expired.
    pub async fn get(&self, scope: &ScopeKey) -> Option<SearchSession> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().await;
        let expired = sessions.get(scope)?.is_expired_at(now);
        if expired {
            sessions.remove(scope);
            debug!("[scope:{}] Purged expired search session", scope);
            return None;
        }
        sessions.get(scope).cloned()
    }

    /// Delete the scope's session if there is one.
    pub async fn remove(&self, scope: &ScopeKey) {
        self.sessions.lock().await.remove(scope);
    }

    /// Validate `ordinal` for `sender_id` and consume the session on success.
    ///
    /// Check and removal happen under one lock acquisition, so of several
    /// concurrent claims on the same scope at most one is `Accepted`.
    pub async fn claim(&self, scope: &ScopeKey, sender_id: &str, ordinal: u64) -> Claim {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().await;

        let Some(session) = sessions.get(scope) else {
            return Claim::Absent;
        };

        if session.is_expired_at(now) {
            sessions.remove(scope);
            debug!("[scope:{}] Purged expired search session", scope);
            return Claim::Expired;
        }

        // Anything from a non-originator is NotOriginator, whatever the number.
        if session.originator_id != sender_id {
            return Claim::NotOriginator;
        }

        let len = session.len();
        let index = match usize::try_from(ordinal) {
            Ok(n) if (1..=len).contains(&n) => n - 1,
            _ => return Claim::OutOfRange { len },
        };

        match sessions.remove(scope) {
            Some(mut session) => Claim::Accepted(session.results.swap_remove(index)),
            None => Claim::Absent,
        }
    }

    /// Number of stored sessions, expired ones included.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
