//! CSV export of the group tables.

use crate::models::Tournament;
use serde::Serialize;
use std::io;

#[derive(Serialize)]
struct StandingRow<'a> {
    group: &'a str,
    position: usize,
    name: &'a str,
    played: u32,
    won: u32,
    drawn: u32,
    lost: u32,
    goals_for: u32,
    goals_against: u32,
    goal_diff: i64,
    points: u32,
    qualified: bool,
}

/// Write every group's table, in standings order, one row per competitor.
pub fn write_standings_csv<W: io::Write>(tournament: &Tournament, out: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(out);
    for group in &tournament.groups {
        for (i, p) in group.players.iter().enumerate() {
            wtr.serialize(StandingRow {
                group: &group.name,
                position: i + 1,
                name: &p.name,
                played: p.played,
                won: p.won,
                drawn: p.drawn,
                lost: p.lost,
                goals_for: p.goals_for,
                goals_against: p.goals_against,
                goal_diff: p.goal_diff,
                points: p.points,
                qualified: tournament.qualified_players.contains(&p.name),
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Standings as a CSV string.
pub fn standings_csv(tournament: &Tournament) -> Result<String, csv::Error> {
    let mut buf = Vec::new();
    write_standings_csv(tournament, &mut buf)?;
    String::from_utf8(buf).map_err(|e| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)))
}
