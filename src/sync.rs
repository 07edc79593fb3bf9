//! Staleness guard for observers that poll tournament snapshots.

use crate::models::{Tournament, TournamentId};
use chrono::{DateTime, Utc};

/// Remembers the newest snapshot an observer has applied and rejects older ones,
/// so a slow poll response cannot roll the view back.
#[derive(Clone, Debug, Default)]
pub struct SnapshotGuard {
    tournament: Option<TournamentId>,
    last_seen: Option<DateTime<Utc>>,
}

impl SnapshotGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamp of the last accepted snapshot (sent as `since` when polling).
    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.last_seen
    }

    /// True if `snapshot` should replace what the observer shows; records it if so.
    ///
    /// A snapshot of a different tournament always replaces the current one.
    pub fn accept(&mut self, snapshot: &Tournament) -> bool {
        let fresh = match (self.tournament, self.last_seen) {
            (Some(id), Some(seen)) if id == snapshot.id => snapshot.updated_at > seen,
            _ => true,
        };
        if fresh {
            self.tournament = Some(snapshot.id);
            self.last_seen = Some(snapshot.updated_at);
        }
        fresh
    }
}

/// Whether a stored snapshot is newer than what a poller last saw.
pub fn changed_since(snapshot: &Tournament, since: Option<DateTime<Utc>>) -> bool {
    since.map_or(true, |seen| snapshot.updated_at > seen)
}
