//! Setup phase: validate registrations, form 2v2 teams, draw groups (Config -> Groups), reset.

use crate::logic::partition::{even_group_sizes, partition};
use crate::models::{
    AdvancementPolicy, OrganizerId, Team, Tournament, TournamentError, TournamentFormat,
    TournamentState,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashSet;

/// Fewest competing entities (players in 1v1, teams in 2v2).
pub const MIN_COMPETITORS: usize = 4;
/// Most entrant names accepted.
pub const MAX_PLAYERS: usize = 64;

/// What the organizer submits to create a tournament.
#[derive(Clone, Debug, Default)]
pub struct TournamentSettings {
    pub name: Option<String>,
    pub player_names: Vec<String>,
    pub num_groups: Option<usize>,
    pub format: TournamentFormat,
    /// Defaults to [`AdvancementPolicy::default_for`] the format.
    pub advancement: Option<AdvancementPolicy>,
}

/// Trim names and check count, emptiness and uniqueness.
pub fn validate_player_names(names: &[String]) -> Result<Vec<String>, TournamentError> {
    if names.len() > MAX_PLAYERS {
        return Err(TournamentError::TooManyPlayers {
            max: MAX_PLAYERS,
            actual: names.len(),
        });
    }
    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::EmptyPlayerName);
        }
        if !seen.insert(name) {
            return Err(TournamentError::DuplicatePlayerName(name.to_string()));
        }
        cleaned.push(name.to_string());
    }
    Ok(cleaned)
}

/// Competing entities for a format. 2v2 pairs names in the order given: (1st, 2nd), (3rd, 4th)…
pub fn form_competitors(
    format: TournamentFormat,
    names: Vec<String>,
) -> Result<(Vec<String>, Vec<Team>), TournamentError> {
    match format {
        TournamentFormat::OneVOne => Ok((names, Vec::new())),
        TournamentFormat::TwoVTwo => {
            if names.len() % 2 != 0 {
                return Err(TournamentError::OddPlayerCount(names.len()));
            }
            let teams: Vec<Team> = names
                .chunks_exact(2)
                .map(|pair| Team::pair(&pair[0], &pair[1]))
                .collect();
            // different pairings can still produce the same label
            let mut seen = HashSet::new();
            if let Some(dup) = teams.iter().find(|t| !seen.insert(t.name.as_str())) {
                return Err(TournamentError::DuplicatePlayerName(dup.name.clone()));
            }
            let labels = teams.iter().map(|t| t.name.clone()).collect();
            Ok((labels, teams))
        }
    }
}

fn default_name(now: DateTime<Utc>) -> String {
    format!("Tournament {}", now.format("%d/%m/%Y"))
}

/// Validate settings and create the tournament with its groups drawn (ends in Groups).
pub fn create_tournament<R: Rng + ?Sized>(
    settings: TournamentSettings,
    owner: Option<OrganizerId>,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<Tournament, TournamentError> {
    let names = validate_player_names(&settings.player_names)?;
    let (players, teams) = form_competitors(settings.format, names)?;
    if players.len() < MIN_COMPETITORS {
        return Err(TournamentError::NotEnoughPlayers {
            required: MIN_COMPETITORS,
            actual: players.len(),
        });
    }
    if let Some(groups) = settings.num_groups {
        even_group_sizes(players.len(), groups)?;
    }

    let name = settings
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| default_name(now));
    let advancement = settings
        .advancement
        .unwrap_or_else(|| AdvancementPolicy::default_for(settings.format));

    let mut tournament = Tournament::new(
        name,
        settings.format,
        advancement,
        players,
        teams,
        settings.num_groups,
        now,
    );
    tournament.owner = owner;
    draw_groups(&mut tournament, rng)?;
    log::info!(
        "Created tournament {} '{}' ({:?}, {} competitors, {} policy)",
        tournament.id,
        tournament.name,
        tournament.format,
        tournament.players.len(),
        tournament.advancement
    );
    Ok(tournament)
}

/// Draw the groups and their fixtures. Config -> Groups.
pub fn draw_groups<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<(), TournamentError> {
    tournament.require_state(TournamentState::Config)?;
    let groups = partition(
        &tournament.players,
        tournament.requested_groups,
        |name| tournament.members_of(name).map(<[String]>::to_vec),
        rng,
    )?;
    tournament.groups = groups;
    tournament.current_step = TournamentState::Groups;
    Ok(())
}

/// Discard all progression and go back to Config, keeping settings and competitors.
pub fn reset_tournament(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.current_step == TournamentState::Config {
        return Err(TournamentError::InvalidState {
            expected: TournamentState::Groups,
            actual: TournamentState::Config,
        });
    }
    tournament.groups.clear();
    tournament.qualified_players.clear();
    tournament.eliminated_players.clear();
    tournament.knockout_matches.clear();
    tournament.winner = None;
    tournament.third_place = None;
    tournament.current_step = TournamentState::Config;
    log::info!("Tournament {} reset to config", tournament.id);
    Ok(())
}
