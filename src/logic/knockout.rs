//! Knockout play: score entry, winner propagation, round re-draws and the finish line.

use crate::logic::standings::validate_score;
use crate::models::{
    AdvancementPolicy, MatchId, Side, Tournament, TournamentError, TournamentState,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// A main-bracket slot that will never hold a player: no sides and nothing can feed it.
fn is_dead(tournament: &Tournament, round: u32, index: u32) -> bool {
    let Some(slot) = tournament.bracket_slot(round, index) else {
        return true;
    };
    let m = &tournament.knockout_matches[slot];
    if m.has_any_player() || m.played {
        return false;
    }
    round == 0
        || (is_dead(tournament, round - 1, 2 * index)
            && is_dead(tournament, round - 1, 2 * index + 1))
}

/// Write the winner of (round, index) into the match it feeds. If that match has no
/// possible opponent it becomes a bye and the winner keeps moving.
fn advance_winner(tournament: &mut Tournament, round: u32, index: u32, winner: Option<String>) {
    if round + 1 >= tournament.knockout_rounds() {
        return;
    }
    let Some(next) = tournament.bracket_slot(round + 1, index / 2) else {
        return;
    };
    let opponent_dead = is_dead(tournament, round, index ^ 1);

    let m = &mut tournament.knockout_matches[next];
    let slot = m.slot_mut(Side::for_feeder(index));
    if *slot == winner {
        return;
    }
    *slot = winner;
    m.clear_result();
    if opponent_dead {
        let advancing = m.settle_bye();
        let (next_round, next_index) = (m.round, m.match_index);
        advance_winner(tournament, next_round, next_index, advancing);
    }
}

/// Carry every round-0 bye forward (fixed policy, right after the draw).
pub fn propagate_byes(tournament: &mut Tournament) {
    let byes: Vec<(u32, String)> = tournament
        .round_matches(0)
        .into_iter()
        .filter(|m| m.is_bye())
        .filter_map(|m| m.winner.clone().map(|w| (m.match_index, w)))
        .collect();
    for (index, winner) in byes {
        advance_winner(tournament, 0, index, Some(winner));
    }
}

/// Semifinal losers, once every semifinal is settled. A bye semifinal has no loser.
fn semifinal_losers(tournament: &Tournament) -> Option<Vec<Option<String>>> {
    let rounds = tournament.knockout_rounds();
    if rounds < 2 {
        return None;
    }
    let semis = tournament.round_matches(rounds - 2);
    // a semifinal still waiting for its sides is not settled
    if semis
        .iter()
        .any(|m| !m.played && !is_dead(tournament, m.round, m.match_index))
    {
        return None;
    }
    Some(semis.iter().map(|m| m.loser().cloned()).collect())
}

/// Put the semifinal losers into the third-place match while it is unplayed (fixed policy).
pub fn seed_third_place(tournament: &mut Tournament) {
    let Some(tp) = tournament.third_place_index() else {
        return;
    };
    if tournament.knockout_matches[tp].is_contested() {
        return;
    }
    let Some(losers) = semifinal_losers(tournament) else {
        return;
    };
    let mut losers = losers.into_iter();
    let m = &mut tournament.knockout_matches[tp];
    m.player1 = losers.next().flatten();
    m.player2 = losers.next().flatten();
    m.clear_result();
    m.settle_bye();
}

/// Third-place match that can never be contested: both semifinals were byes.
fn third_place_void(tournament: &Tournament) -> bool {
    match semifinal_losers(tournament) {
        Some(losers) => losers.iter().all(Option::is_none),
        None => false,
    }
}

/// True when changing the winner of match `idx` would contradict a later result.
fn result_consumed(tournament: &Tournament, idx: usize) -> bool {
    let m = &tournament.knockout_matches[idx];
    let rounds = tournament.knockout_rounds();
    if m.is_third_place() || m.round + 1 >= rounds {
        // winner / third place are write-once
        return true;
    }
    let is_semifinal = m.round + 2 == rounds;
    match tournament.advancement {
        AdvancementPolicy::Fixed => {
            if is_semifinal
                && tournament
                    .third_place_match()
                    .is_some_and(|tp| tp.is_contested())
            {
                return true;
            }
            match tournament.bracket_slot(m.round + 1, m.match_index / 2) {
                Some(next) => {
                    let fed = &tournament.knockout_matches[next];
                    fed.is_contested() || (fed.is_bye() && result_consumed(tournament, next))
                }
                None => false,
            }
        }
        AdvancementPolicy::Reshuffle => {
            tournament
                .round_matches(m.round + 1)
                .iter()
                .any(|n| n.has_any_player())
                || (is_semifinal
                    && tournament
                        .third_place_match()
                        .is_some_and(|tp| tp.has_any_player()))
        }
    }
}

/// Record (or correct) a knockout score, advance the winner and check for the finish.
pub fn record_knockout_score(
    tournament: &mut Tournament,
    match_id: &MatchId,
    score1: i64,
    score2: i64,
) -> Result<(), TournamentError> {
    tournament.require_state(TournamentState::Knockout)?;
    let idx = tournament
        .knockout_index(match_id)
        .ok_or_else(|| TournamentError::MatchNotFound(match_id.clone()))?;
    let m = &tournament.knockout_matches[idx];
    let (Some(p1), Some(p2)) = (m.player1.clone(), m.player2.clone()) else {
        return Err(TournamentError::MissingPlayers(match_id.clone()));
    };
    let score1 = validate_score(score1)?;
    let score2 = validate_score(score2)?;
    if score1 == score2 {
        return Err(TournamentError::DrawNotAllowed(match_id.clone()));
    }
    let winner = if score1 > score2 { p1 } else { p2 };
    if m.played && m.winner.as_ref() != Some(&winner) && result_consumed(tournament, idx) {
        return Err(TournamentError::ResultAlreadyAdvanced(match_id.clone()));
    }

    let m = &mut tournament.knockout_matches[idx];
    m.score1 = Some(score1);
    m.score2 = Some(score2);
    m.winner = Some(winner.clone());
    m.played = true;
    let (round, index, third_place) = (m.round, m.match_index, m.is_third_place());
    log::debug!(
        "Knockout match {} (round {}) won by {}",
        match_id,
        round + 1,
        winner
    );

    if !third_place && tournament.advancement == AdvancementPolicy::Fixed {
        advance_winner(tournament, round, index, Some(winner));
        seed_third_place(tournament);
    }
    detect_finish(tournament);
    Ok(())
}

/// Set `winner` / `third_place` from their deciding matches; Finished once both are known.
pub fn detect_finish(tournament: &mut Tournament) {
    let rounds = tournament.knockout_rounds();
    if rounds == 0 {
        return;
    }
    if tournament.winner.is_none() {
        let champion = tournament
            .bracket_slot(rounds - 1, 0)
            .map(|i| &tournament.knockout_matches[i])
            .filter(|m| m.played)
            .and_then(|m| m.winner.clone());
        tournament.winner = champion;
    }
    if tournament.third_place.is_none() {
        tournament.third_place = tournament
            .third_place_match()
            .filter(|m| m.played)
            .and_then(|m| m.winner.clone());
    }
    let third_settled = tournament.third_place.is_some()
        || tournament.third_place_match().is_none()
        || third_place_void(tournament);
    if tournament.winner.is_some() && third_settled {
        tournament.current_step = TournamentState::Finished;
        log::info!(
            "Tournament {} finished: winner {:?}, third place {:?}",
            tournament.id,
            tournament.winner,
            tournament.third_place
        );
    }
}

/// Highest main round that already has a player in it.
fn current_round(tournament: &Tournament) -> Option<u32> {
    tournament
        .knockout_matches
        .iter()
        .filter(|m| !m.is_third_place() && m.has_any_player())
        .map(|m| m.round)
        .max()
}

/// Re-draw the pairings of the next round from the winners of the current one
/// (reshuffle policy). Drawing the final also draws the third-place match.
pub fn generate_next_round<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<(), TournamentError> {
    tournament.require_state(TournamentState::Knockout)?;
    if tournament.advancement != AdvancementPolicy::Reshuffle {
        return Err(TournamentError::WrongAdvancementPolicy(
            tournament.advancement,
        ));
    }
    if tournament
        .third_place_match()
        .is_some_and(|tp| tp.has_any_player())
    {
        return Err(TournamentError::ThirdPlaceSeeded);
    }
    let rounds = tournament.knockout_rounds();
    let round = current_round(tournament).ok_or(TournamentError::BracketComplete)?;
    if round + 1 >= rounds {
        return Err(TournamentError::BracketComplete);
    }
    let current = tournament.round_matches(round);
    if current.iter().any(|m| m.has_any_player() && !m.played) {
        return Err(TournamentError::RoundIncomplete { round });
    }

    let drawn_from = current.len();
    let mut winners: Vec<String> = current.iter().filter_map(|m| m.winner.clone()).collect();
    let mut losers: Vec<String> = current.iter().filter_map(|m| m.loser().cloned()).collect();
    winners.shuffle(rng);
    losers.shuffle(rng);

    let next_round = round + 1;
    let next_count = tournament.round_matches(next_round).len();
    let mut entrants = winners.into_iter().map(Some).chain(std::iter::repeat(None));
    for index in 0..next_count as u32 {
        let Some(slot) = tournament.bracket_slot(next_round, index) else {
            continue;
        };
        let m = &mut tournament.knockout_matches[slot];
        m.player1 = entrants.next().flatten();
        m.player2 = entrants.next().flatten();
        m.clear_result();
        m.settle_bye();
    }

    if next_round + 1 == rounds {
        if let Some(tp) = tournament.third_place_index() {
            let mut losers = losers.into_iter();
            let m = &mut tournament.knockout_matches[tp];
            m.player1 = losers.next();
            m.player2 = losers.next();
            m.clear_result();
            m.settle_bye();
        }
    }
    log::info!(
        "Tournament {}: drew round {} from {} match(es)",
        tournament.id,
        next_round + 1,
        drawn_from
    );
    detect_finish(tournament);
    Ok(())
}
