//! Data structures for the football cup: competitors, fixtures, tournament state.

mod error;
mod game;
mod player;
mod tournament;

pub use error::{ErrorKind, TournamentError};
pub use game::{GroupMatch, KnockoutMatch, MatchId, Side};
pub use player::{compare_standing, Outcome, PlayerStat, Team};
pub use tournament::{
    AdvancementPolicy, Group, OrganizerId, Tournament, TournamentFormat, TournamentId,
    TournamentState,
};
