//! Tournament persistence: the store interface and an in-memory implementation.

use crate::models::{OrganizerId, Tournament, TournamentId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// How many tournaments the public listing returns.
pub const PUBLIC_LISTING_LIMIT: usize = 20;

/// Errors from the persistence layer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreError {
    NotFound(TournamentId),
    /// The stored snapshot changed since it was read.
    Conflict(TournamentId),
    AlreadyExists(TournamentId),
    /// A writer panicked while holding the lock.
    Poisoned,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(_) => write!(f, "No tournament"),
            StoreError::Conflict(_) => {
                write!(f, "Tournament was changed by someone else, reload and retry")
            }
            StoreError::AlreadyExists(id) => write!(f, "Tournament {} already exists", id),
            StoreError::Poisoned => write!(f, "lock error"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Load/save tournaments by id. `save` is a compare-and-swap on `updated_at`.
pub trait TournamentStore {
    fn load(&self, id: TournamentId) -> Result<Tournament, StoreError>;

    fn insert(&self, tournament: Tournament) -> Result<Tournament, StoreError>;

    /// Replace the stored snapshot if it is still the one read at `expected`.
    fn save(
        &self,
        tournament: Tournament,
        expected: DateTime<Utc>,
    ) -> Result<Tournament, StoreError>;

    fn delete(&self, id: TournamentId) -> Result<(), StoreError>;

    /// Newest first, at most [`PUBLIC_LISTING_LIMIT`].
    fn list_public(&self) -> Result<Vec<Tournament>, StoreError>;

    /// Newest first.
    fn list_owned_by(&self, owner: OrganizerId) -> Result<Vec<Tournament>, StoreError>;
}

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

/// In-memory store. Entries untouched for `inactivity_timeout` can be evicted.
pub struct MemoryStore {
    entries: RwLock<HashMap<TournamentId, TournamentEntry>>,
    inactivity_timeout: Duration,
}

impl MemoryStore {
    pub fn new(inactivity_timeout: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            inactivity_timeout,
        }
    }

    /// Remove tournaments idle for longer than the timeout. Returns how many were removed.
    pub fn evict_inactive(&self) -> Result<usize, StoreError> {
        let mut g = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        let before = g.len();
        let timeout = self.inactivity_timeout;
        g.retain(|_, entry| entry.last_activity.elapsed() < timeout);
        Ok(before - g.len())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn newest_first(
        &self,
        keep: impl Fn(&Tournament) -> bool,
    ) -> Result<Vec<Tournament>, StoreError> {
        let g = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        let mut list: Vec<Tournament> = g
            .values()
            .map(|e| &e.tournament)
            .filter(|t| keep(t))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }
}

impl TournamentStore for MemoryStore {
    /// Touching a tournament refreshes its last activity.
    fn load(&self, id: TournamentId) -> Result<Tournament, StoreError> {
        let mut g = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        let entry = g.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        entry.last_activity = Instant::now();
        Ok(entry.tournament.clone())
    }

    fn insert(&self, tournament: Tournament) -> Result<Tournament, StoreError> {
        let mut g = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        let id = tournament.id;
        if g.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        g.insert(
            id,
            TournamentEntry {
                tournament: tournament.clone(),
                last_activity: Instant::now(),
            },
        );
        Ok(tournament)
    }

    fn save(
        &self,
        tournament: Tournament,
        expected: DateTime<Utc>,
    ) -> Result<Tournament, StoreError> {
        let mut g = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        let id = tournament.id;
        let entry = g.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if entry.tournament.updated_at != expected {
            log::warn!("Rejected stale write to tournament {}", id);
            return Err(StoreError::Conflict(id));
        }
        entry.tournament = tournament.clone();
        entry.last_activity = Instant::now();
        Ok(tournament)
    }

    fn delete(&self, id: TournamentId) -> Result<(), StoreError> {
        let mut g = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        g.remove(&id).map(|_| ()).ok_or(StoreError::NotFound(id))
    }

    fn list_public(&self) -> Result<Vec<Tournament>, StoreError> {
        let mut list = self.newest_first(|_| true)?;
        list.truncate(PUBLIC_LISTING_LIMIT);
        Ok(list)
    }

    fn list_owned_by(&self, owner: OrganizerId) -> Result<Vec<Tournament>, StoreError> {
        self.newest_first(|t| t.owner == Some(owner))
    }
}
