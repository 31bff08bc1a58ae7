//! Member list: the domain data service and the in-memory board it feeds.
//!
//! A fetch is fire-and-forget relative to the session decision. Each fetch
//! carries a [`Ticket`] stamped with the board's generation; logging out bumps
//! the generation, so a result that settles afterwards is discarded instead of
//! bringing the list back.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::models::Member;

/// Errors from the domain data service.
#[derive(Debug, Error)]
pub enum MemberServiceError {
    #[error("Roster I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Roster parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Member service unavailable: {0}")]
    Unavailable(String),
}

/// Remote (or local) source of the club's member list.
#[async_trait]
pub trait MemberService: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Member>, MemberServiceError>;
}

/// Reads the `members` array of a roster JSON file.
#[derive(Debug, Clone)]
pub struct RosterMemberService {
    path: PathBuf,
}

#[derive(Deserialize)]
struct RosterMembers {
    #[serde(default)]
    members: Vec<Member>,
}

impl RosterMemberService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MemberService for RosterMemberService {
    async fn fetch_all(&self) -> Result<Vec<Member>, MemberServiceError> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let roster: RosterMembers = serde_json::from_str(&contents)?;
        Ok(roster.members)
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Proof that a fetch was started at a given board generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
struct BoardState {
    generation: u64,
    members: Vec<Member>,
}

/// Shared in-memory member list. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemberBoard {
    inner: Arc<Mutex<BoardState>>,
}

impl MemberBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a new fetch generation. Older tickets become stale.
    pub fn begin(&self) -> Ticket {
        let mut state = self.lock();
        state.generation += 1;
        Ticket(state.generation)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.lock().generation == ticket.0
    }

    /// Apply a settled fetch. Returns `false` if the ticket was stale and the
    /// result was dropped.
    pub fn apply(&self, ticket: Ticket, result: Result<Vec<Member>, MemberServiceError>) -> bool {
        let mut state = self.lock();
        if state.generation != ticket.0 {
            log::debug!(
                "discarding member fetch from generation {} (current {})",
                ticket.0,
                state.generation
            );
            return false;
        }
        match result {
            Ok(members) => {
                log::debug!("loaded {} members", members.len());
                state.members = members;
            }
            Err(e) => {
                log::warn!("member fetch failed: {e}");
                state.members.clear();
            }
        }
        true
    }

    /// Drop the current list and orphan any in-flight fetch.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.members.clear();
    }

    pub fn members(&self) -> Vec<Member> {
        self.lock().members.clone()
    }

    /// Fetch from `service` in the background.
    ///
    /// Returns `None` (and fetches nothing) when called outside a tokio runtime.
    pub fn spawn_refresh(&self, service: Arc<dyn MemberService>) -> Option<JoinHandle<()>> {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log::warn!("no async runtime; skipping member fetch");
                return None;
            }
        };
        let ticket = self.begin();
        let board = self.clone();
        Some(handle.spawn(async move {
            let result = service.fetch_all().await;
            board.apply(ticket, result);
        }))
    }
}
