//! Single entry point for mutations: authorize, apply one command to a copy, stamp it.

use crate::logic::bracket::{draw_bracket, redraw};
use crate::logic::knockout::{generate_next_round, record_knockout_score};
use crate::logic::qualification::complete_group_stage;
use crate::logic::setup::{draw_groups, reset_tournament};
use crate::logic::standings::record_group_score;
use crate::models::{MatchId, Tournament, TournamentError};
use chrono::{DateTime, Utc};
use rand::Rng;

/// Source of timestamps for `updated_at`.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Whether the caller may change the tournament (decided by the authorization layer).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Access {
    pub may_mutate: bool,
}

impl Access {
    pub const ORGANIZER: Access = Access { may_mutate: true };
    pub const SPECTATOR: Access = Access { may_mutate: false };
}

/// Mutating operations on an existing tournament.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Config -> Groups.
    DrawGroups,
    /// Group or knockout score, routed by where the match lives.
    RecordScore {
        match_id: MatchId,
        score1: i64,
        score2: i64,
    },
    /// Groups -> Qualified.
    CompleteGroupStage,
    /// Qualified -> Knockout.
    DrawBracket,
    Redraw,
    GenerateNextRound,
    /// Back to Config.
    Reset,
}

/// Apply `command` to a copy of `current` and return the new snapshot.
///
/// On error nothing is returned but the error: `current` is never modified.
pub fn apply<R, C>(
    current: &Tournament,
    command: &Command,
    access: Access,
    rng: &mut R,
    clock: &C,
) -> Result<Tournament, TournamentError>
where
    R: Rng + ?Sized,
    C: Clock + ?Sized,
{
    if !access.may_mutate {
        log::warn!(
            "Refused {:?} on tournament {}: caller is not the organizer",
            command,
            current.id
        );
        return Err(TournamentError::Forbidden);
    }

    let mut next = current.clone();
    match command {
        Command::DrawGroups => draw_groups(&mut next, rng)?,
        Command::RecordScore {
            match_id,
            score1,
            score2,
        } => record_score(&mut next, match_id, *score1, *score2)?,
        Command::CompleteGroupStage => complete_group_stage(&mut next)?,
        Command::DrawBracket => draw_bracket(&mut next, rng)?,
        Command::Redraw => redraw(&mut next, rng)?,
        Command::GenerateNextRound => generate_next_round(&mut next, rng)?,
        Command::Reset => reset_tournament(&mut next)?,
    }
    next.touch(clock.now());
    Ok(next)
}

/// Route a score to the group stage or the bracket depending on the match id.
pub fn record_score(
    tournament: &mut Tournament,
    match_id: &MatchId,
    score1: i64,
    score2: i64,
) -> Result<(), TournamentError> {
    if tournament.group_of_match(match_id).is_some() {
        record_group_score(tournament, match_id, score1, score2)
    } else if tournament.knockout_index(match_id).is_some() {
        record_knockout_score(tournament, match_id, score1, score2)
    } else {
        Err(TournamentError::MatchNotFound(match_id.clone()))
    }
}

/// Apply several commands as one transition (e.g. finish groups and draw the bracket).
pub fn apply_all<R, C>(
    current: &Tournament,
    commands: &[Command],
    access: Access,
    rng: &mut R,
    clock: &C,
) -> Result<Tournament, TournamentError>
where
    R: Rng + ?Sized,
    C: Clock + ?Sized,
{
    let mut snapshot = current.clone();
    for command in commands {
        snapshot = apply(&snapshot, command, access, rng, clock)?;
    }
    Ok(snapshot)
}
