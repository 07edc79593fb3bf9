//! Group standings: score entry with exact reversal, and the ranking order.

use crate::models::{
    compare_standing, Group, MatchId, Tournament, TournamentError, TournamentState,
};

/// Convert a submitted score, rejecting negatives.
pub fn validate_score(score: i64) -> Result<u32, TournamentError> {
    u32::try_from(score).map_err(|_| TournamentError::InvalidScore(score))
}

/// Record (or correct) a group match score and re-sort the group.
///
/// A previously played result is reverted first, so re-entering a score any number
/// of times leaves the same table as entering the final score once.
pub fn score_group_match(
    group: &mut Group,
    match_id: &MatchId,
    score1: i64,
    score2: i64,
) -> Result<(), TournamentError> {
    let idx = group
        .matches
        .iter()
        .position(|m| &m.id == match_id)
        .ok_or_else(|| TournamentError::MatchNotFound(match_id.clone()))?;
    let score1 = validate_score(score1)?;
    let score2 = validate_score(score2)?;

    let m = &group.matches[idx];
    let previous = m.result();
    let (p1, p2) = (m.player1.clone(), m.player2.clone());

    // Both sides must be rows of this group before anything is touched.
    let i1 = player_row(group, &p1, match_id)?;
    let i2 = player_row(group, &p2, match_id)?;

    if let Some((old1, old2)) = previous {
        group.players[i1].revert(old1, old2);
        group.players[i2].revert(old2, old1);
    }
    group.players[i1].record(score1, score2);
    group.players[i2].record(score2, score1);

    let m = &mut group.matches[idx];
    m.score1 = Some(score1);
    m.score2 = Some(score2);
    m.played = true;

    sort_standings(group);
    Ok(())
}

fn player_row(group: &Group, name: &str, match_id: &MatchId) -> Result<usize, TournamentError> {
    group
        .players
        .iter()
        .position(|p| p.name == name)
        .ok_or_else(|| TournamentError::MatchNotFound(match_id.clone()))
}

/// Stable sort by points, goal difference, goals for; refresh group positions.
pub fn sort_standings(group: &mut Group) {
    group.players.sort_by(compare_standing);
    for (i, p) in group.players.iter_mut().enumerate() {
        p.group_position = Some(i as u32 + 1);
    }
}

/// Record a group score on the tournament (Groups phase only).
pub fn record_group_score(
    tournament: &mut Tournament,
    match_id: &MatchId,
    score1: i64,
    score2: i64,
) -> Result<(), TournamentError> {
    tournament.require_state(TournamentState::Groups)?;
    let gi = tournament
        .group_of_match(match_id)
        .ok_or_else(|| TournamentError::MatchNotFound(match_id.clone()))?;
    let group = &mut tournament.groups[gi];
    score_group_match(group, match_id, score1, score2)?;
    log::debug!(
        "Group {}: match {} recorded {}-{}",
        group.name,
        match_id,
        score1,
        score2
    );
    Ok(())
}
