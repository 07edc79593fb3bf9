//! Tournament aggregate, its phases and groups.

use crate::models::error::TournamentError;
use crate::models::game::{GroupMatch, KnockoutMatch, MatchId};
use crate::models::player::{PlayerStat, Team};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Identifier of the organizer who created a tournament.
pub type OrganizerId = Uuid;

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    /// Settings known, groups not drawn.
    #[default]
    Config,
    /// Round-robin group play.
    Groups,
    /// Qualifiers chosen, bracket not drawn.
    Qualified,
    /// Knockout bracket in progress.
    Knockout,
    /// Winner and third place decided.
    Finished,
}

impl fmt::Display for TournamentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TournamentState::Config => "config",
            TournamentState::Groups => "groups",
            TournamentState::Qualified => "qualified",
            TournamentState::Knockout => "knockout",
            TournamentState::Finished => "finished",
        };
        f.write_str(s)
    }
}

/// 1v1: each entrant plays alone. 2v2: entrants are paired into fixed teams.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum TournamentFormat {
    #[default]
    #[serde(rename = "1v1")]
    OneVOne,
    #[serde(rename = "2v2")]
    TwoVTwo,
}

/// How knockout winners reach the next round.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvancementPolicy {
    /// Winners move along the bracket tree as soon as they are recorded.
    #[default]
    Fixed,
    /// The organizer re-draws the pairings of every new round.
    Reshuffle,
}

impl AdvancementPolicy {
    /// Default used when the organizer does not choose one.
    pub fn default_for(format: TournamentFormat) -> Self {
        match format {
            TournamentFormat::OneVOne => AdvancementPolicy::Fixed,
            TournamentFormat::TwoVTwo => AdvancementPolicy::Reshuffle,
        }
    }
}

impl fmt::Display for AdvancementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvancementPolicy::Fixed => f.write_str("fixed"),
            AdvancementPolicy::Reshuffle => f.write_str("reshuffle"),
        }
    }
}

/// One round-robin pool.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// A, B, C… in draw order.
    pub name: String,
    /// Kept in standings order.
    pub players: Vec<PlayerStat>,
    pub matches: Vec<GroupMatch>,
}

impl Group {
    pub fn unplayed_matches(&self) -> usize {
        self.matches.iter().filter(|m| !m.played).count()
    }
}

/// Full tournament state: settings, groups, bracket and phase.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    pub advancement: AdvancementPolicy,
    pub owner: Option<OrganizerId>,
    /// Competing entities: individuals in 1v1, team labels in 2v2.
    pub players: Vec<String>,
    /// Members behind each 2v2 label (empty in 1v1).
    #[serde(default)]
    pub teams: Vec<Team>,
    pub requested_groups: Option<usize>,
    pub current_step: TournamentState,
    pub groups: Vec<Group>,
    pub qualified_players: Vec<String>,
    pub eliminated_players: Vec<String>,
    pub knockout_matches: Vec<KnockoutMatch>,
    pub winner: Option<String>,
    pub third_place: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a tournament in Config with validated competitors (see `logic::setup`).
    pub fn new(
        name: impl Into<String>,
        format: TournamentFormat,
        advancement: AdvancementPolicy,
        players: Vec<String>,
        teams: Vec<Team>,
        requested_groups: Option<usize>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format,
            advancement,
            owner: None,
            players,
            teams,
            requested_groups,
            current_step: TournamentState::Config,
            groups: Vec::new(),
            qualified_players: Vec::new(),
            eliminated_players: Vec::new(),
            knockout_matches: Vec::new(),
            winner: None,
            third_place: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fail with `InvalidState` unless the tournament is in `expected`.
    pub fn require_state(&self, expected: TournamentState) -> Result<(), TournamentError> {
        if self.current_step != expected {
            return Err(TournamentError::InvalidState {
                expected,
                actual: self.current_step,
            });
        }
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.current_step == TournamentState::Finished
    }

    /// Team members for a 2v2 label.
    pub fn members_of(&self, name: &str) -> Option<&[String]> {
        self.teams
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.members.as_slice())
    }

    /// Index of the group holding a given match.
    pub fn group_of_match(&self, id: &MatchId) -> Option<usize> {
        self.groups
            .iter()
            .position(|g| g.matches.iter().any(|m| &m.id == id))
    }

    pub fn knockout_index(&self, id: &MatchId) -> Option<usize> {
        self.knockout_matches.iter().position(|m| &m.id == id)
    }

    /// Number of main-bracket rounds.
    pub fn knockout_rounds(&self) -> u32 {
        self.knockout_matches
            .iter()
            .filter(|m| !m.is_third_place())
            .map(|m| m.round + 1)
            .max()
            .unwrap_or(0)
    }

    /// Index of the main-bracket match at (round, match_index).
    pub fn bracket_slot(&self, round: u32, match_index: u32) -> Option<usize> {
        self.knockout_matches
            .iter()
            .position(|m| !m.is_third_place() && m.round == round && m.match_index == match_index)
    }

    /// Main-bracket matches of one round, in index order.
    pub fn round_matches(&self, round: u32) -> Vec<&KnockoutMatch> {
        let mut matches: Vec<_> = self
            .knockout_matches
            .iter()
            .filter(|m| !m.is_third_place() && m.round == round)
            .collect();
        matches.sort_by_key(|m| m.match_index);
        matches
    }

    pub fn third_place_index(&self) -> Option<usize> {
        self.knockout_matches.iter().position(|m| m.is_third_place())
    }

    pub fn third_place_match(&self) -> Option<&KnockoutMatch> {
        self.knockout_matches.iter().find(|m| m.is_third_place())
    }

    /// Stamp a mutation. Never moves `updated_at` backwards, even if the clock does.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }

    /// True when this snapshot was produced after `other` (same tournament).
    pub fn is_newer_than(&self, other: &Tournament) -> bool {
        self.updated_at > other.updated_at
    }
}
