//! Integration tests for the whole progression through the command entry point.

use chrono::{DateTime, TimeZone, Utc};
use football_cup_web::logic::{create_tournament, TournamentSettings};
use football_cup_web::{
    apply, apply_all, Access, AdvancementPolicy, Clock, Command, ErrorKind, MatchId, Tournament,
    TournamentError, TournamentFormat, TournamentState,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Clock stuck at one instant; `updated_at` must still move forward.
struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 14, 18, 0, 0).unwrap()
}

fn settings(n: usize) -> TournamentSettings {
    TournamentSettings {
        name: Some("Office Cup".to_string()),
        player_names: (1..=n).map(|i| format!("P{i}")).collect(),
        ..TournamentSettings::default()
    }
}

fn new_tournament(s: TournamentSettings) -> Result<Tournament, TournamentError> {
    create_tournament(s, None, &mut StdRng::seed_from_u64(99), start())
}

fn score(id: &MatchId, score1: i64, score2: i64) -> Command {
    Command::RecordScore {
        match_id: id.clone(),
        score1,
        score2,
    }
}

/// Apply as the organizer with a seeded rng and a frozen clock.
fn run(t: &Tournament, command: Command) -> Result<Tournament, TournamentError> {
    apply(
        t,
        &command,
        Access::ORGANIZER,
        &mut StdRng::seed_from_u64(5),
        &FixedClock(start()),
    )
}

fn group_match_ids(t: &Tournament) -> Vec<MatchId> {
    t.groups
        .iter()
        .flat_map(|g| g.matches.iter().map(|m| m.id.clone()))
        .collect()
}

#[test]
fn eight_players_from_groups_to_champion() {
    let mut t = new_tournament(settings(8)).unwrap();
    assert_eq!(t.name, "Office Cup");
    assert_eq!(t.current_step, TournamentState::Groups);
    assert_eq!(t.groups.len(), 2);
    for g in &t.groups {
        assert_eq!(g.players.len(), 4);
        assert_eq!(g.matches.len(), 6);
    }

    let ids = group_match_ids(&t);
    assert_eq!(ids.len(), 12);
    for (i, id) in ids.iter().enumerate() {
        t = run(&t, score(id, (i % 4) as i64, (i % 3) as i64)).unwrap();
    }

    t = run(&t, Command::CompleteGroupStage).unwrap();
    assert_eq!(t.current_step, TournamentState::Qualified);
    assert_eq!(t.qualified_players.len(), 4);
    assert_eq!(t.eliminated_players.len(), 4);
    for g in &t.groups {
        assert!(t.qualified_players.contains(&g.players[0].name));
        assert!(t.qualified_players.contains(&g.players[1].name));
    }

    t = run(&t, Command::DrawBracket).unwrap();
    assert_eq!(t.current_step, TournamentState::Knockout);
    assert_eq!(t.knockout_matches.len(), 4);

    let semis: Vec<MatchId> = t.round_matches(0).iter().map(|m| m.id.clone()).collect();
    t = run(&t, score(&semis[0], 2, 0)).unwrap();
    t = run(&t, score(&semis[1], 1, 3)).unwrap();
    let final_id = t.round_matches(1)[0].id.clone();
    let third_id = t.third_place_match().unwrap().id.clone();

    t = run(&t, score(&final_id, 4, 2)).unwrap();
    assert_eq!(t.current_step, TournamentState::Knockout);
    t = run(&t, score(&third_id, 0, 1)).unwrap();

    assert_eq!(t.current_step, TournamentState::Finished);
    assert_eq!(t.winner, t.round_matches(1)[0].player1);
    assert_eq!(t.third_place, t.third_place_match().unwrap().player2);

    let err = run(&t, score(&final_id, 0, 1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalPhase);
}

#[test]
fn spectators_cannot_change_anything() {
    let t = new_tournament(settings(8)).unwrap();
    let id = group_match_ids(&t)[0].clone();
    let err = apply(
        &t,
        &score(&id, 1, 0),
        Access::SPECTATOR,
        &mut StdRng::seed_from_u64(1),
        &FixedClock(start()),
    )
    .unwrap_err();
    assert_eq!(err, TournamentError::Forbidden);
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[test]
fn operations_out_of_phase_are_refused() {
    let t = new_tournament(settings(8)).unwrap();
    for command in [Command::DrawBracket, Command::Redraw, Command::GenerateNextRound, Command::DrawGroups] {
        let err = run(&t, command.clone()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalPhase, "{command:?}");
    }

    let err = run(&t, Command::CompleteGroupStage).unwrap_err();
    assert_eq!(err, TournamentError::GroupStageIncomplete { unplayed: 12 });
    assert_eq!(err.kind(), ErrorKind::IllegalState);
}

#[test]
fn group_scores_are_frozen_once_knockout_starts() {
    let mut t = new_tournament(settings(8)).unwrap();
    let ids = group_match_ids(&t);
    for id in &ids {
        t = run(&t, score(id, 1, 0)).unwrap();
    }
    t = apply_all(
        &t,
        &[Command::CompleteGroupStage, Command::DrawBracket],
        Access::ORGANIZER,
        &mut StdRng::seed_from_u64(3),
        &FixedClock(start()),
    )
    .unwrap();
    assert_eq!(t.current_step, TournamentState::Knockout);

    let err = run(&t, score(&ids[0], 0, 5)).unwrap_err();
    assert!(matches!(
        err,
        TournamentError::InvalidState {
            expected: TournamentState::Groups,
            actual: TournamentState::Knockout
        }
    ));
}

#[test]
fn failed_command_leaves_the_snapshot_untouched() {
    let t = new_tournament(settings(8)).unwrap();
    let before = serde_json::to_value(&t).unwrap();
    let id = group_match_ids(&t)[0].clone();

    assert!(run(&t, score(&id, -1, 0)).is_err());
    assert!(run(&t, score(&MatchId::from("match_unknown"), 1, 0)).is_err());
    assert_eq!(serde_json::to_value(&t).unwrap(), before);

    let next = run(&t, score(&id, 1, 0)).unwrap();
    assert_eq!(serde_json::to_value(&t).unwrap(), before);
    assert_ne!(serde_json::to_value(&next).unwrap(), before);
}

#[test]
fn updated_at_always_moves_forward() {
    let mut t = new_tournament(settings(8)).unwrap();
    let mut last = t.updated_at;
    for id in group_match_ids(&t).iter().take(4) {
        let next = run(&t, score(id, 2, 2)).unwrap();
        assert!(next.updated_at > last);
        assert!(next.is_newer_than(&t));
        last = next.updated_at;
        t = next;
    }
}

#[test]
fn doubles_pairs_names_in_order() {
    let s = TournamentSettings {
        player_names: ["Ann", "Ben", "Cal", "Dan", "Eve", "Fay", "Gus", "Hal"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        format: TournamentFormat::TwoVTwo,
        ..TournamentSettings::default()
    };
    let t = new_tournament(s).unwrap();
    assert_eq!(
        t.players,
        ["Ann + Ben", "Cal + Dan", "Eve + Fay", "Gus + Hal"]
    );
    assert_eq!(t.advancement, AdvancementPolicy::Reshuffle);
    assert_eq!(t.members_of("Cal + Dan"), Some(&["Cal".to_string(), "Dan".to_string()][..]));
    let row = &t.groups[0].players[0];
    assert_eq!(row.members.as_ref().map(Vec::len), Some(2));
}

#[test]
fn registration_is_validated() {
    let check = |s: TournamentSettings| new_tournament(s).unwrap_err();

    assert_eq!(
        check(settings(3)),
        TournamentError::NotEnoughPlayers { required: 4, actual: 3 }
    );
    assert_eq!(
        check(settings(65)),
        TournamentError::TooManyPlayers { max: 64, actual: 65 }
    );

    let mut dup = settings(4);
    dup.player_names[3] = " P1 ".to_string();
    assert_eq!(check(dup), TournamentError::DuplicatePlayerName("P1".to_string()));

    let mut blank = settings(4);
    blank.player_names[0] = "   ".to_string();
    assert_eq!(check(blank), TournamentError::EmptyPlayerName);

    let mut odd = settings(9);
    odd.format = TournamentFormat::TwoVTwo;
    assert_eq!(check(odd), TournamentError::OddPlayerCount(9));

    let mut three_teams = settings(6);
    three_teams.format = TournamentFormat::TwoVTwo;
    assert_eq!(
        check(three_teams),
        TournamentError::NotEnoughPlayers { required: 4, actual: 3 }
    );

    let mut clashing_teams = settings(8);
    clashing_teams.format = TournamentFormat::TwoVTwo;
    clashing_teams.player_names = ["a + b", "c", "a", "b + c", "x", "y", "z", "w"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(
        check(clashing_teams),
        TournamentError::DuplicatePlayerName("a + b + c".to_string())
    );

    let mut one_group = settings(8);
    one_group.num_groups = Some(1);
    let err = check(one_group);
    assert_eq!(err, TournamentError::InvalidGroupCount { requested: 1, max: 4 });
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn unnamed_tournament_gets_a_dated_name() {
    let mut s = settings(4);
    s.name = Some("  ".to_string());
    let t = new_tournament(s).unwrap();
    assert_eq!(t.name, "Tournament 14/06/2024");
    assert_eq!(t.advancement, AdvancementPolicy::Fixed);
}

#[test]
fn reset_returns_to_config_and_groups_can_be_redrawn() {
    let t = new_tournament(settings(10)).unwrap();
    let id = group_match_ids(&t)[0].clone();
    let t = run(&t, score(&id, 3, 0)).unwrap();

    let t = run(&t, Command::Reset).unwrap();
    assert_eq!(t.current_step, TournamentState::Config);
    assert!(t.groups.is_empty());
    assert!(t.knockout_matches.is_empty());
    assert_eq!(t.players.len(), 10);

    let err = run(&t, Command::Reset).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalPhase);

    let t = run(&t, Command::DrawGroups).unwrap();
    assert_eq!(t.current_step, TournamentState::Groups);
    let drawn: usize = t.groups.iter().map(|g| g.players.len()).sum();
    assert_eq!(drawn, 10);
    assert!(t.groups.iter().flat_map(|g| &g.players).all(|p| p.played == 0));
}
