//! TournamentError and the semantic kinds callers branch on.

use crate::models::game::MatchId;
use crate::models::tournament::{AdvancementPolicy, TournamentState};
use serde::Serialize;

/// Coarse error category, stable across variants (used for HTTP status mapping).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    IllegalPhase,
    IllegalState,
    DrawNotAllowed,
    Forbidden,
}

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Fewer competitors than the minimum.
    NotEnoughPlayers { required: usize, actual: usize },
    /// More entrant names than allowed.
    TooManyPlayers { max: usize, actual: usize },
    /// 2v2 needs an even number of names.
    OddPlayerCount(usize),
    EmptyPlayerName,
    /// Names are unique (case-sensitive, after trimming).
    DuplicatePlayerName(String),
    /// Requested group count would leave a group with fewer than two members.
    InvalidGroupCount { requested: usize, max: usize },
    /// Negative score.
    InvalidScore(i64),
    MatchNotFound(MatchId),
    /// Knockout match whose sides are not both known yet.
    MissingPlayers(MatchId),
    /// Knockout matches need a winner.
    DrawNotAllowed(MatchId),
    /// Operation not valid in the current phase.
    InvalidState {
        expected: TournamentState,
        actual: TournamentState,
    },
    /// Group-stage completion with matches left to play.
    GroupStageIncomplete { unplayed: usize },
    /// Redraw after a knockout match has been played.
    KnockoutStarted,
    /// Next-round generation before the current round is settled.
    RoundIncomplete { round: u32 },
    /// No round left to generate.
    BracketComplete,
    /// Next-round generation after the third-place match has been seeded.
    ThirdPlaceSeeded,
    /// Operation belongs to the other advancement policy.
    WrongAdvancementPolicy(AdvancementPolicy),
    /// Correcting a result that later matches already depend on.
    ResultAlreadyAdvanced(MatchId),
    /// Caller may not mutate this tournament.
    Forbidden,
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        use TournamentError::*;
        match self {
            NotEnoughPlayers { .. }
            | TooManyPlayers { .. }
            | OddPlayerCount(_)
            | EmptyPlayerName
            | DuplicatePlayerName(_)
            | InvalidGroupCount { .. }
            | InvalidScore(_) => ErrorKind::Validation,
            MatchNotFound(_) => ErrorKind::NotFound,
            InvalidState { .. } => ErrorKind::IllegalPhase,
            MissingPlayers(_)
            | GroupStageIncomplete { .. }
            | KnockoutStarted
            | RoundIncomplete { .. }
            | BracketComplete
            | ThirdPlaceSeeded
            | WrongAdvancementPolicy(_)
            | ResultAlreadyAdvanced(_) => ErrorKind::IllegalState,
            DrawNotAllowed(_) => ErrorKind::DrawNotAllowed,
            Forbidden => ErrorKind::Forbidden,
        }
    }
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::NotEnoughPlayers { required, actual } => {
                write!(f, "Need at least {} competitors (got {})", required, actual)
            }
            TournamentError::TooManyPlayers { max, actual } => {
                write!(f, "At most {} players allowed (got {})", max, actual)
            }
            TournamentError::OddPlayerCount(n) => {
                write!(f, "A 2v2 tournament needs an even number of players (got {})", n)
            }
            TournamentError::EmptyPlayerName => write!(f, "Player names cannot be empty"),
            TournamentError::DuplicatePlayerName(name) => {
                write!(f, "Player name '{}' is used more than once", name)
            }
            TournamentError::InvalidGroupCount { requested, max } => {
                write!(f, "Group count must be between 2 and {} (got {})", max, requested)
            }
            TournamentError::InvalidScore(s) => write!(f, "Scores cannot be negative (got {})", s),
            TournamentError::MatchNotFound(id) => write!(f, "Match '{}' not found", id),
            TournamentError::MissingPlayers(id) => {
                write!(f, "Match '{}' does not have both players yet", id)
            }
            TournamentError::DrawNotAllowed(id) => {
                write!(f, "Match '{}' is a knockout match and cannot end in a draw", id)
            }
            TournamentError::InvalidState { expected, actual } => write!(
                f,
                "Invalid state for this action (expected {}, tournament is in {})",
                expected, actual
            ),
            TournamentError::GroupStageIncomplete { unplayed } => {
                write!(f, "{} group match(es) still to be played", unplayed)
            }
            TournamentError::KnockoutStarted => {
                write!(f, "The bracket cannot be redrawn once a knockout match has been played")
            }
            TournamentError::RoundIncomplete { round } => {
                write!(f, "Round {} is not finished yet", round + 1)
            }
            TournamentError::BracketComplete => write!(f, "The final round has already been drawn"),
            TournamentError::ThirdPlaceSeeded => {
                write!(f, "The third-place match is already seeded")
            }
            TournamentError::WrongAdvancementPolicy(policy) => {
                write!(f, "Not available with the {} advancement policy", policy)
            }
            TournamentError::ResultAlreadyAdvanced(id) => write!(
                f,
                "The winner of match '{}' cannot change: the result has already been carried forward",
                id
            ),
            TournamentError::Forbidden => write!(f, "Only the organizer can change this tournament"),
        }
    }
}

impl std::error::Error for TournamentError {}
