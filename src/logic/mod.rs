//! Tournament business logic: setup, group stage, qualification, knockout.

mod bracket;
mod engine;
mod knockout;
mod partition;
mod qualification;
mod setup;
mod standings;

pub use bracket::{build_bracket, draw_bracket, redraw, round_count};
pub use engine::{apply, apply_all, record_score, Access, Clock, Command, SystemClock};
pub use knockout::{detect_finish, generate_next_round, record_knockout_score};
pub use partition::{
    default_group_sizes, even_group_sizes, group_label, group_sizes, max_group_count, partition,
    round_robin, MAX_GROUP_SIZE, MIN_GROUP_SIZE, TARGET_GROUP_SIZE,
};
pub use qualification::{complete_group_stage, qualifier_target, select_qualifiers, Qualification};
pub use setup::{
    create_tournament, draw_groups, form_competitors, reset_tournament, validate_player_names,
    TournamentSettings, MAX_PLAYERS, MIN_COMPETITORS,
};
pub use standings::{record_group_score, score_group_match, sort_standings, validate_score};
