//! PlayerStat (a group standings row) and Team (a fixed 2v2 pairing).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Outcome of one match from one side's point of view.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    pub fn from_goals(scored: u32, conceded: u32) -> Self {
        match scored.cmp(&conceded) {
            Ordering::Greater => Outcome::Win,
            Ordering::Equal => Outcome::Draw,
            Ordering::Less => Outcome::Loss,
        }
    }
}

/// A competitor's accumulated record within one group.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStat {
    pub name: String,
    /// The two individuals behind a 2v2 team label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i64,
    pub points: u32,
    /// 1-based rank after the latest standings sort.
    pub group_position: Option<u32>,
}

impl PlayerStat {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_members(name: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            members: Some(members),
            ..Self::new(name)
        }
    }

    /// Add one played match to the record.
    pub fn record(&mut self, scored: u32, conceded: u32) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        match Outcome::from_goals(scored, conceded) {
            Outcome::Win => self.won += 1,
            Outcome::Draw => self.drawn += 1,
            Outcome::Loss => self.lost += 1,
        }
        self.refresh_derived();
    }

    /// Exact inverse of [`PlayerStat::record`] for the same goals.
    pub fn revert(&mut self, scored: u32, conceded: u32) {
        self.played -= 1;
        self.goals_for -= scored;
        self.goals_against -= conceded;
        match Outcome::from_goals(scored, conceded) {
            Outcome::Win => self.won -= 1,
            Outcome::Draw => self.drawn -= 1,
            Outcome::Loss => self.lost -= 1,
        }
        self.refresh_derived();
    }

    fn refresh_derived(&mut self) {
        self.goal_diff = i64::from(self.goals_for) - i64::from(self.goals_against);
        self.points = 3 * self.won + self.drawn;
    }
}

/// Standings order: points, then goal difference, then goals scored (all descending).
/// Equal rows compare as equal so a stable sort keeps their current order.
pub fn compare_standing(a: &PlayerStat, b: &PlayerStat) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_diff.cmp(&a.goal_diff))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
}

/// A fixed 2v2 pairing registered under one label.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub members: Vec<String>,
}

impl Team {
    pub fn pair(first: &str, second: &str) -> Self {
        Self {
            name: format!("{first} + {second}"),
            members: vec![first.to_string(), second.to_string()],
        }
    }
}
