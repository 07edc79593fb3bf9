//! Group fixtures, knockout fixtures and their identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const MATCH_PREFIX: &str = "match_";
const THIRD_PLACE_PREFIX: &str = "match_third_place_";

/// Unique identifier for a match. The third-place decider lives in its own prefix.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    /// Fresh id for a group match or a main-bracket match.
    pub fn generate() -> Self {
        Self(format!("{MATCH_PREFIX}{}", Uuid::new_v4()))
    }

    /// Fresh id in the reserved third-place namespace.
    pub fn generate_third_place() -> Self {
        Self(format!("{THIRD_PLACE_PREFIX}{}", Uuid::new_v4()))
    }

    pub fn is_third_place(&self) -> bool {
        self.0.starts_with(THIRD_PLACE_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MatchId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One side of a fixture.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

impl Side {
    /// Side fed by the match at `index` of the previous round: even indices feed `player1`.
    pub fn for_feeder(index: u32) -> Self {
        if index % 2 == 0 {
            Side::One
        } else {
            Side::Two
        }
    }
}

/// A round-robin fixture inside one group.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMatch {
    pub id: MatchId,
    pub player1: String,
    pub player2: String,
    /// None until played.
    pub score1: Option<u32>,
    pub score2: Option<u32>,
    pub played: bool,
}

impl GroupMatch {
    pub fn new(player1: impl Into<String>, player2: impl Into<String>) -> Self {
        Self {
            id: MatchId::generate(),
            player1: player1.into(),
            player2: player2.into(),
            score1: None,
            score2: None,
            played: false,
        }
    }

    /// Recorded score, only when the match has been played.
    pub fn result(&self) -> Option<(u32, u32)> {
        match (self.played, self.score1, self.score2) {
            (true, Some(s1), Some(s2)) => Some((s1, s2)),
            _ => None,
        }
    }
}

/// A knockout fixture: main bracket or the third-place decider.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnockoutMatch {
    pub id: MatchId,
    /// Zero-based round; the third-place match carries the final's round.
    pub round: u32,
    /// Position within the round (0 for the third-place match).
    pub match_index: u32,
    pub player1: Option<String>,
    pub player2: Option<String>,
    pub score1: Option<u32>,
    pub score2: Option<u32>,
    pub winner: Option<String>,
    pub played: bool,
}

impl KnockoutMatch {
    /// Empty main-bracket slot.
    pub fn new(round: u32, match_index: u32) -> Self {
        Self {
            id: MatchId::generate(),
            round,
            match_index,
            player1: None,
            player2: None,
            score1: None,
            score2: None,
            winner: None,
            played: false,
        }
    }

    /// Empty third-place decider attached to the final round.
    pub fn third_place(final_round: u32) -> Self {
        Self {
            id: MatchId::generate_third_place(),
            ..Self::new(final_round, 0)
        }
    }

    /// Main-bracket match with both sides known up front; a lone side becomes a bye.
    pub fn with_players(
        round: u32,
        match_index: u32,
        player1: Option<String>,
        player2: Option<String>,
    ) -> Self {
        let mut m = Self::new(round, match_index);
        m.player1 = player1;
        m.player2 = player2;
        m.settle_bye();
        m
    }

    pub fn is_third_place(&self) -> bool {
        self.id.is_third_place()
    }

    pub fn has_both_players(&self) -> bool {
        self.player1.is_some() && self.player2.is_some()
    }

    pub fn has_any_player(&self) -> bool {
        self.player1.is_some() || self.player2.is_some()
    }

    /// Played without an opponent.
    pub fn is_bye(&self) -> bool {
        self.played && !self.has_both_players()
    }

    /// Played with two real sides.
    pub fn is_contested(&self) -> bool {
        self.played && self.has_both_players()
    }

    /// The side that lost a contested match.
    pub fn loser(&self) -> Option<&String> {
        if !self.is_contested() {
            return None;
        }
        let winner = self.winner.as_ref()?;
        if self.player1.as_ref() == Some(winner) {
            self.player2.as_ref()
        } else {
            self.player1.as_ref()
        }
    }

    pub fn slot_mut(&mut self, side: Side) -> &mut Option<String> {
        match side {
            Side::One => &mut self.player1,
            Side::Two => &mut self.player2,
        }
    }

    /// Clear any result, keeping the sides.
    pub fn clear_result(&mut self) {
        self.score1 = None;
        self.score2 = None;
        self.winner = None;
        self.played = false;
    }

    /// Mark as a 0-0 bye when exactly one side is present. Returns the advancing side.
    pub fn settle_bye(&mut self) -> Option<String> {
        let lone = match (&self.player1, &self.player2) {
            (Some(p), None) | (None, Some(p)) => p.clone(),
            _ => return None,
        };
        self.score1 = Some(0);
        self.score2 = Some(0);
        self.winner = Some(lone.clone());
        self.played = true;
        Some(lone)
    }
}
