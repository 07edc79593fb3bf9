//! Knockout draw: single-elimination tree with byes and a third-place decider.

use crate::logic::knockout::{propagate_byes, seed_third_place};
use crate::models::{
    AdvancementPolicy, KnockoutMatch, Tournament, TournamentError, TournamentState,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Rounds needed for `entrants` (the field is padded to the next power of two).
pub fn round_count(entrants: usize) -> u32 {
    entrants.max(2).next_power_of_two().trailing_zeros()
}

/// Build every round of the bracket from a random order of `qualified`.
///
/// Round 0 pairs neighbours; a lone entrant gets a bye. Later rounds start empty.
/// With two or more rounds a third-place match is added, sides unknown.
pub fn build_bracket<R: Rng + ?Sized>(qualified: &[String], rng: &mut R) -> Vec<KnockoutMatch> {
    if qualified.is_empty() {
        return Vec::new();
    }
    let mut field: Vec<Option<String>> = qualified.iter().cloned().map(Some).collect();
    field.shuffle(rng);
    let rounds = round_count(field.len());
    field.resize(1 << rounds, None);

    let mut matches = Vec::with_capacity(field.len());
    for (i, pair) in field.chunks_exact(2).enumerate() {
        matches.push(KnockoutMatch::with_players(
            0,
            i as u32,
            pair[0].clone(),
            pair[1].clone(),
        ));
    }
    let mut in_round = field.len() / 4;
    for round in 1..rounds {
        for i in 0..in_round {
            matches.push(KnockoutMatch::new(round, i as u32));
        }
        in_round /= 2;
    }
    if rounds >= 2 {
        matches.push(KnockoutMatch::third_place(rounds - 1));
    }
    matches
}

fn install_bracket<R: Rng + ?Sized>(tournament: &mut Tournament, rng: &mut R) {
    tournament.knockout_matches = build_bracket(&tournament.qualified_players, rng);
    if tournament.advancement == AdvancementPolicy::Fixed {
        propagate_byes(tournament);
        seed_third_place(tournament);
    }
}

/// First bracket draw. Qualified -> Knockout.
pub fn draw_bracket<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<(), TournamentError> {
    tournament.require_state(TournamentState::Qualified)?;
    install_bracket(tournament, rng);
    tournament.current_step = TournamentState::Knockout;
    log::info!(
        "Tournament {}: bracket drawn for {} qualifier(s), {} round(s)",
        tournament.id,
        tournament.qualified_players.len(),
        tournament.knockout_rounds()
    );
    Ok(())
}

/// Re-draw the whole bracket from the same qualifiers, only before any real match is played.
pub fn redraw<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<(), TournamentError> {
    tournament.require_state(TournamentState::Knockout)?;
    if tournament
        .knockout_matches
        .iter()
        .any(KnockoutMatch::is_contested)
    {
        return Err(TournamentError::KnockoutStarted);
    }
    install_bracket(tournament, rng);
    log::info!("Tournament {}: bracket redrawn", tournament.id);
    Ok(())
}
