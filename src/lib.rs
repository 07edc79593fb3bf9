//! Football cup web app: library with models, progression engine, store and exports.

pub mod config;
pub mod export;
pub mod logic;
pub mod models;
pub mod store;
pub mod sync;

pub use logic::{
    apply, apply_all, build_bracket, complete_group_stage, create_tournament, default_group_sizes,
    draw_bracket, draw_groups, generate_next_round, partition, qualifier_target, record_score,
    redraw, reset_tournament, score_group_match, select_qualifiers, Access, Clock, Command,
    SystemClock, TournamentSettings,
};
pub use models::{
    AdvancementPolicy, ErrorKind, Group, GroupMatch, KnockoutMatch, MatchId, OrganizerId,
    PlayerStat, Team, Tournament, TournamentError, TournamentFormat, TournamentId,
    TournamentState,
};
pub use store::{MemoryStore, StoreError, TournamentStore};
pub use sync::SnapshotGuard;
