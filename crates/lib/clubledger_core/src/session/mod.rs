//! Session lifecycle: establish, persist, restore and tear down a login.
//!
//! A session record is the pair (`currentUser`, `loginTime`) in a
//! [`SessionStore`]. It is honoured for [`SESSION_TTL_MS`] after the login
//! time. Expiry is evaluated only by [`SessionManager::restore`]; there is no
//! background timer, so a session that is live in memory is never ended by
//! the clock.

pub mod clock;
pub mod store;

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::members::{MemberBoard, MemberService};
use crate::models::{Member, User};

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{
    AUTH_TOKEN_KEY, CURRENT_USER_KEY, FileStore, LOGIN_TIME_KEY, MemoryStore, SESSION_KEYS,
    SessionStore, StoreError,
};

/// Session lifetime: 15 minutes.
pub const SESSION_TTL_MS: i64 = 15 * 60 * 1000;

/// Result of [`SessionManager::restore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Nothing usable was persisted.
    NoSession,
    /// An unexpired record was found; the session is live again.
    Restored(User),
    /// A record was found but had outlived the TTL. It has been erased.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
}

/// A persisted session record, decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub user: User,
    pub established_at: i64,
}

/// Reasons a persisted record cannot be used.
#[derive(Debug, Error)]
enum RecordError {
    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("incomplete session record (missing '{0}')")]
    Partial(&'static str),

    #[error("unparsable 'currentUser': {0}")]
    User(#[from] serde_json::Error),

    #[error("unparsable 'loginTime': {0:?}")]
    LoginTime(String),

    #[error("'loginTime' {0} is out of range")]
    LoginTimeRange(i64),
}

/// Owns the current session and its persisted record.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    ttl_ms: i64,
    current: Option<SessionRecord>,
    board: MemberBoard,
    member_service: Option<Arc<dyn MemberService>>,
    pending_fetch: Option<JoinHandle<()>>,
}

impl SessionManager {
    /// Create a logged-out manager. Call [`restore`](Self::restore) at startup.
    pub fn new(store: impl SessionStore + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            store: Arc::new(store),
            clock: Arc::new(clock),
            ttl_ms: SESSION_TTL_MS,
            current: None,
            board: MemberBoard::new(),
            member_service: None,
            pending_fetch: None,
        }
    }

    /// Fetch the member list from `service` whenever a session begins.
    pub fn with_member_service(mut self, service: Arc<dyn MemberService>) -> Self {
        self.member_service = Some(service);
        self
    }

    pub fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }

    pub fn state(&self) -> SessionState {
        match self.current {
            Some(_) => SessionState::LoggedIn,
            None => SessionState::LoggedOut,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref().map(|r| &r.user)
    }

    /// When the live session was established (epoch ms).
    pub fn established_at(&self) -> Option<i64> {
        self.current.as_ref().map(|r| r.established_at)
    }

    /// Milliseconds until the next `restore` would judge the record expired.
    /// Informational only; reaching zero does not end the live session.
    pub fn remaining_ms(&self) -> Option<i64> {
        self.established_at()
            .map(|at| {
                at.saturating_add(self.ttl_ms)
                    .saturating_sub(self.clock.now_ms())
                    .max(0)
            })
    }

    /// Domain data loaded for this session so far.
    pub fn members(&self) -> Vec<Member> {
        self.board.members()
    }

    /// Wait for the most recent member fetch to settle.
    pub async fn settle_members(&mut self) {
        if let Some(handle) = self.pending_fetch.take()
            && let Err(e) = handle.await
        {
            log::warn!("member fetch task failed: {e}");
        }
    }

    /// Begin a session for an already-authenticated user.
    ///
    /// Never fails. If the record cannot be persisted the failure is logged,
    /// any half-written record is removed, and the session still begins in
    /// memory (it just will not survive a restart).
    pub fn login(&mut self, user: User) {
        // The previous user's data must not outlive their session.
        self.board.invalidate();
        let now = self.clock.now_ms();
        if let Err(e) = self.persist(&user, now) {
            log::warn!("failed to persist session for user {}: {e}", user.id);
            for key in [CURRENT_USER_KEY, LOGIN_TIME_KEY] {
                if let Err(e) = self.store.remove(key) {
                    log::warn!("failed to remove partial session key '{key}': {e}");
                }
            }
        }
        log::info!("user {} ({}) logged in", user.id, user.role);
        self.current = Some(SessionRecord {
            user,
            established_at: now,
        });
        self.start_member_fetch();
    }

    /// Re-establish a session from storage. Intended to run once at startup.
    ///
    /// Unreadable, malformed or incomplete records are erased and reported as
    /// [`RestoreOutcome::NoSession`].
    pub fn restore(&mut self) -> RestoreOutcome {
        self.current = None;
        self.board.invalidate();

        let record = match self.read_record() {
            Ok(Some(record)) => record,
            Ok(None) => {
                log::debug!("no persisted session");
                return RestoreOutcome::NoSession;
            }
            Err(e) => {
                log::warn!("discarding persisted session: {e}");
                self.erase();
                return RestoreOutcome::NoSession;
            }
        };

        let Some(elapsed) = self.clock.now_ms().checked_sub(record.established_at) else {
            log::warn!(
                "discarding persisted session: {}",
                RecordError::LoginTimeRange(record.established_at)
            );
            self.erase();
            return RestoreOutcome::NoSession;
        };
        if elapsed >= self.ttl_ms {
            log::info!(
                "session for user {} expired ({}s old)",
                record.user.id,
                elapsed / 1000
            );
            self.erase();
            return RestoreOutcome::Expired;
        }

        log::info!("restored session for user {}", record.user.id);
        let user = record.user.clone();
        self.current = Some(record);
        self.start_member_fetch();
        RestoreOutcome::Restored(user)
    }

    /// End the session. Safe to call when already logged out.
    pub fn logout(&mut self) {
        if let Some(record) = self.current.take() {
            log::info!("user {} logged out", record.user.id);
        }
        // In-flight fetches are not cancelled; invalidating the board makes
        // their results stale.
        self.board.invalidate();
        self.erase();
    }

    fn persist(&self, user: &User, now: i64) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(user)?;
        self.store.set(CURRENT_USER_KEY, &encoded)?;
        self.store.set(LOGIN_TIME_KEY, &now.to_string())?;
        Ok(())
    }

    fn erase(&self) {
        if let Err(e) = self.store.clear_session() {
            log::warn!("failed to erase persisted session: {e}");
        }
    }

    fn read_record(&self) -> Result<Option<SessionRecord>, RecordError> {
        let user = self.store.get(CURRENT_USER_KEY)?;
        let login_time = self.store.get(LOGIN_TIME_KEY)?;

        let (user, login_time) = match (user, login_time) {
            (None, None) => {
                if self.store.get(AUTH_TOKEN_KEY)?.is_some() {
                    return Err(RecordError::Partial(CURRENT_USER_KEY));
                }
                return Ok(None);
            }
            (Some(_), None) => return Err(RecordError::Partial(LOGIN_TIME_KEY)),
            (None, Some(_)) => return Err(RecordError::Partial(CURRENT_USER_KEY)),
            (Some(u), Some(t)) => (u, t),
        };

        let user: User = serde_json::from_str(&user)?;
        let established_at = login_time
            .trim()
            .parse::<i64>()
            .map_err(|_| RecordError::LoginTime(login_time.clone()))?;

        Ok(Some(SessionRecord {
            user,
            established_at,
        }))
    }

    fn start_member_fetch(&mut self) {
        if let Some(service) = &self.member_service {
            self.pending_fetch = self.board.spawn_refresh(Arc::clone(service));
        }
    }
}
