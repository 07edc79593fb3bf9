//! Qualification: from final group tables to the knockout field.

use crate::models::{compare_standing, Group, PlayerStat, Tournament, TournamentError, TournamentState};
use std::cmp::Ordering;

/// Qualified and eliminated names, in selection order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Qualification {
    pub qualified: Vec<String>,
    pub eliminated: Vec<String>,
}

/// Number of knockout places for `total` competitors.
pub fn qualifier_target(total: usize) -> usize {
    match total {
        0..=8 => 4,
        9..=16 => 8,
        t if t >= 24 => 16,
        _ => 8,
    }
}

/// A standings row tagged with its 1-based rank in its group.
struct Ranked<'a> {
    rank: usize,
    stat: &'a PlayerStat,
}

fn by_rank_then_standing(a: &Ranked<'_>, b: &Ranked<'_>) -> Ordering {
    a.rank
        .cmp(&b.rank)
        .then_with(|| compare_standing(a.stat, b.stat))
}

/// Pick the qualifiers from groups whose `players` are already in standings order.
///
/// Ranks `1..=per_group` of every group go through directly, with
/// `per_group = max(1, target / groups)`. Open places go to the best rank
/// `per_group + 1` rows across groups. If the direct places alone overshoot the
/// target (more groups than places), the best of them by rank and standing are kept.
pub fn select_qualifiers(groups: &[Group]) -> Qualification {
    let total: usize = groups.iter().map(|g| g.players.len()).sum();
    if groups.is_empty() {
        return Qualification::default();
    }
    let target = qualifier_target(total);
    let per_group = (target / groups.len()).max(1);

    let mut direct: Vec<Ranked<'_>> = Vec::new();
    let mut next_ranked: Vec<Ranked<'_>> = Vec::new();
    for group in groups {
        for (i, stat) in group.players.iter().enumerate() {
            let ranked = Ranked { rank: i + 1, stat };
            if ranked.rank <= per_group {
                direct.push(ranked);
            } else if ranked.rank == per_group + 1 {
                next_ranked.push(ranked);
            }
        }
    }

    if direct.len() > target {
        direct.sort_by(by_rank_then_standing);
        direct.truncate(target);
    } else {
        let open = target - direct.len();
        next_ranked.sort_by(|a, b| compare_standing(a.stat, b.stat));
        direct.extend(next_ranked.into_iter().take(open));
    }

    let qualified: Vec<String> = direct.iter().map(|r| r.stat.name.clone()).collect();
    let eliminated = groups
        .iter()
        .flat_map(|g| g.players.iter())
        .filter(|p| !qualified.contains(&p.name))
        .map(|p| p.name.clone())
        .collect();
    Qualification {
        qualified,
        eliminated,
    }
}

/// Close the group stage: every group match must be played. Groups -> Qualified.
pub fn complete_group_stage(tournament: &mut Tournament) -> Result<(), TournamentError> {
    tournament.require_state(TournamentState::Groups)?;
    let unplayed: usize = tournament.groups.iter().map(Group::unplayed_matches).sum();
    if unplayed > 0 {
        return Err(TournamentError::GroupStageIncomplete { unplayed });
    }

    let selection = select_qualifiers(&tournament.groups);
    log::info!(
        "Tournament {}: group stage complete, {} qualified, {} eliminated",
        tournament.id,
        selection.qualified.len(),
        selection.eliminated.len()
    );
    tournament.qualified_players = selection.qualified;
    tournament.eliminated_players = selection.eliminated;
    tournament.current_step = TournamentState::Qualified;
    Ok(())
}
