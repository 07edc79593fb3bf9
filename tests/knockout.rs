//! Integration tests for knockout play: advancement, third place, corrections, reshuffled rounds.

use chrono::Utc;
use football_cup_web::logic::{draw_bracket, generate_next_round, record_knockout_score};
use football_cup_web::{
    AdvancementPolicy, ErrorKind, MatchId, Tournament, TournamentError, TournamentFormat,
    TournamentState,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn knockout_with(n: usize, policy: AdvancementPolicy) -> Tournament {
    let names: Vec<String> = (1..=n).map(|i| format!("Q{i}")).collect();
    let mut t = Tournament::new(
        "Cup",
        TournamentFormat::OneVOne,
        policy,
        names.clone(),
        Vec::new(),
        None,
        Utc::now(),
    );
    t.qualified_players = names;
    t.current_step = TournamentState::Qualified;
    draw_bracket(&mut t, &mut StdRng::seed_from_u64(n as u64)).unwrap();
    t
}

fn round_ids(t: &Tournament, round: u32) -> Vec<MatchId> {
    t.round_matches(round).iter().map(|m| m.id.clone()).collect()
}

/// Play every open match of a round, player1 winning 2-1. Returns the winners.
fn play_round(t: &mut Tournament, round: u32) -> HashSet<String> {
    let open: Vec<(MatchId, String)> = t
        .round_matches(round)
        .iter()
        .filter(|m| m.has_both_players() && !m.played)
        .map(|m| (m.id.clone(), m.player1.clone().unwrap()))
        .collect();
    let mut winners = HashSet::new();
    for (id, p1) in open {
        record_knockout_score(t, &id, 2, 1).unwrap();
        winners.insert(p1);
    }
    winners
}

fn third_place_id(t: &Tournament) -> MatchId {
    t.third_place_match().unwrap().id.clone()
}

fn entrants_of(t: &Tournament, round: u32) -> HashSet<String> {
    t.round_matches(round)
        .iter()
        .flat_map(|m| [m.player1.clone(), m.player2.clone()])
        .flatten()
        .collect()
}

#[test]
fn eight_qualifiers_advance_along_the_tree() {
    let mut t = knockout_with(8, AdvancementPolicy::Fixed);

    let winners = play_round(&mut t, 0);
    assert_eq!(winners.len(), 4);
    assert!(t.round_matches(1).iter().all(|m| m.has_both_players()));
    assert_eq!(entrants_of(&t, 1), winners);
    // feeder rule: match 2i feeds player1, 2i+1 feeds player2
    let r0 = t.round_matches(0);
    let r1 = t.round_matches(1);
    assert_eq!(r1[0].player1, r0[0].winner);
    assert_eq!(r1[0].player2, r0[1].winner);
    assert_eq!(r1[1].player1, r0[2].winner);
    assert_eq!(r1[1].player2, r0[3].winner);
    assert!(!t.third_place_match().unwrap().has_any_player());

    let semi_ids = round_ids(&t, 1);
    record_knockout_score(&mut t, &semi_ids[0], 3, 0).unwrap();
    assert!(!t.third_place_match().unwrap().has_any_player());
    record_knockout_score(&mut t, &semi_ids[1], 0, 1).unwrap();

    let semis = t.round_matches(1);
    let fin = t.round_matches(2)[0];
    assert_eq!(fin.player1, semis[0].winner);
    assert_eq!(fin.player2, semis[1].winner);
    let tp = t.third_place_match().unwrap();
    assert_eq!(tp.player1.as_ref(), semis[0].loser());
    assert_eq!(tp.player2.as_ref(), semis[1].loser());
    assert_eq!(t.current_step, TournamentState::Knockout);
}

#[test]
fn third_place_waits_for_both_semifinals() {
    let mut t = knockout_with(8, AdvancementPolicy::Fixed);
    let r0 = round_ids(&t, 0);
    record_knockout_score(&mut t, &r0[0], 2, 1).unwrap();
    record_knockout_score(&mut t, &r0[1], 2, 1).unwrap();
    let semis = round_ids(&t, 1);
    record_knockout_score(&mut t, &semis[0], 1, 0).unwrap();

    // the other semifinal has no sides yet
    let tp = t.third_place_match().unwrap();
    assert!(!tp.has_any_player());
    assert!(!tp.played);
    assert!(t.third_place.is_none());

    record_knockout_score(&mut t, &r0[2], 2, 1).unwrap();
    record_knockout_score(&mut t, &r0[3], 2, 1).unwrap();
    record_knockout_score(&mut t, &semis[1], 0, 1).unwrap();
    let tp = t.third_place_match().unwrap();
    assert!(tp.has_both_players());
    assert!(!tp.played);
    assert!(t.third_place.is_none());

    let final_id = round_ids(&t, 2)[0].clone();
    record_knockout_score(&mut t, &final_id, 3, 2).unwrap();
    assert_eq!(t.current_step, TournamentState::Knockout);

    let tp_id = third_place_id(&t);
    record_knockout_score(&mut t, &tp_id, 0, 1).unwrap();
    assert_eq!(t.current_step, TournamentState::Finished);
    assert_eq!(t.third_place, t.third_place_match().unwrap().player2);
}

#[test]
fn final_first_then_third_place() {
    let mut t = knockout_with(4, AdvancementPolicy::Fixed);
    play_round(&mut t, 0);

    let final_id = round_ids(&t, 1)[0].clone();
    record_knockout_score(&mut t, &final_id, 1, 0).unwrap();
    assert!(t.winner.is_some());
    assert!(t.third_place.is_none());
    assert_eq!(t.current_step, TournamentState::Knockout);

    let tp_id = third_place_id(&t);
    record_knockout_score(&mut t, &tp_id, 0, 2).unwrap();
    assert_eq!(t.current_step, TournamentState::Finished);
    let tp = t.third_place_match().unwrap();
    assert_eq!(t.third_place, tp.player2);
}

#[test]
fn third_place_first_then_final() {
    let mut t = knockout_with(4, AdvancementPolicy::Fixed);
    play_round(&mut t, 0);

    let tp_id = third_place_id(&t);
    record_knockout_score(&mut t, &tp_id, 4, 3).unwrap();
    assert!(t.third_place.is_some());
    assert!(t.winner.is_none());
    assert_eq!(t.current_step, TournamentState::Knockout);

    let final_id = round_ids(&t, 1)[0].clone();
    record_knockout_score(&mut t, &final_id, 1, 0).unwrap();
    assert_eq!(t.current_step, TournamentState::Finished);
    assert_eq!(t.winner, t.round_matches(1)[0].player1);
}

#[test]
fn unresolved_match_cannot_be_scored() {
    let mut t = knockout_with(8, AdvancementPolicy::Fixed);
    let semi = round_ids(&t, 1)[0].clone();
    let err = record_knockout_score(&mut t, &semi, 1, 0).unwrap_err();
    assert_eq!(err, TournamentError::MissingPlayers(semi));
    assert_eq!(err.kind(), ErrorKind::IllegalState);

    let err = record_knockout_score(&mut t, &MatchId::from("match_missing"), 1, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let first = round_ids(&t, 0)[0].clone();
    let err = record_knockout_score(&mut t, &first, -2, 0).unwrap_err();
    assert_eq!(err, TournamentError::InvalidScore(-2));
}

#[test]
fn winner_can_change_until_the_next_match_is_played() {
    let mut t = knockout_with(8, AdvancementPolicy::Fixed);
    let ids = round_ids(&t, 0);
    let m0 = t.round_matches(0)[0].clone();
    let (p1, p2) = (m0.player1.clone().unwrap(), m0.player2.clone().unwrap());

    record_knockout_score(&mut t, &ids[0], 2, 0).unwrap();
    assert_eq!(t.round_matches(1)[0].player1.as_deref(), Some(p1.as_str()));

    // flip the result before the semifinal is played
    record_knockout_score(&mut t, &ids[0], 0, 1).unwrap();
    assert_eq!(t.round_matches(1)[0].player1.as_deref(), Some(p2.as_str()));

    record_knockout_score(&mut t, &ids[1], 1, 0).unwrap();
    let semi = round_ids(&t, 1)[0].clone();
    record_knockout_score(&mut t, &semi, 3, 1).unwrap();

    // score-only correction keeps the winner and is fine
    record_knockout_score(&mut t, &ids[0], 0, 4).unwrap();
    assert!(t.round_matches(1)[0].played);

    let err = record_knockout_score(&mut t, &ids[0], 5, 0).unwrap_err();
    assert_eq!(err, TournamentError::ResultAlreadyAdvanced(ids[0].clone()));
    assert_eq!(t.round_matches(0)[0].winner.as_deref(), Some(p2.as_str()));
}

#[test]
fn final_winner_is_write_once() {
    let mut t = knockout_with(4, AdvancementPolicy::Fixed);
    play_round(&mut t, 0);
    let final_id = round_ids(&t, 1)[0].clone();
    record_knockout_score(&mut t, &final_id, 1, 0).unwrap();
    let champion = t.winner.clone();

    let err = record_knockout_score(&mut t, &final_id, 0, 1).unwrap_err();
    assert!(matches!(err, TournamentError::ResultAlreadyAdvanced(_)));
    record_knockout_score(&mut t, &final_id, 3, 0).unwrap();
    assert_eq!(t.winner, champion);
}

#[test]
fn fixed_policy_has_no_round_generation() {
    let mut t = knockout_with(8, AdvancementPolicy::Fixed);
    play_round(&mut t, 0);
    let err = generate_next_round(&mut t, &mut StdRng::seed_from_u64(1)).unwrap_err();
    assert_eq!(
        err,
        TournamentError::WrongAdvancementPolicy(AdvancementPolicy::Fixed)
    );
}

#[test]
fn reshuffle_draws_each_round_from_the_winners() {
    let mut t = knockout_with(8, AdvancementPolicy::Reshuffle);
    let mut rng = StdRng::seed_from_u64(21);

    let err = generate_next_round(&mut t, &mut rng).unwrap_err();
    assert_eq!(err, TournamentError::RoundIncomplete { round: 0 });

    let winners = play_round(&mut t, 0);
    // winners stay put until the organizer draws the next round
    assert!(t.round_matches(1).iter().all(|m| !m.has_any_player()));

    generate_next_round(&mut t, &mut rng).unwrap();
    assert!(t.round_matches(1).iter().all(|m| m.has_both_players()));
    assert_eq!(entrants_of(&t, 1), winners);
    assert!(!t.third_place_match().unwrap().has_any_player());

    let err = generate_next_round(&mut t, &mut rng).unwrap_err();
    assert_eq!(err, TournamentError::RoundIncomplete { round: 1 });

    // round 0 results are now locked in
    let first = round_ids(&t, 0)[0].clone();
    let err = record_knockout_score(&mut t, &first, 0, 3).unwrap_err();
    assert_eq!(err, TournamentError::ResultAlreadyAdvanced(first));

    let finalists = play_round(&mut t, 1);
    let semi_losers: HashSet<String> = t
        .round_matches(1)
        .iter()
        .filter_map(|m| m.loser().cloned())
        .collect();
    generate_next_round(&mut t, &mut rng).unwrap();
    assert_eq!(entrants_of(&t, 2), finalists);
    let tp = t.third_place_match().unwrap();
    let tp_sides: HashSet<String> = [tp.player1.clone(), tp.player2.clone()]
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(tp_sides, semi_losers);

    let err = generate_next_round(&mut t, &mut rng).unwrap_err();
    assert_eq!(err, TournamentError::ThirdPlaceSeeded);

    play_round(&mut t, 2);
    assert_eq!(t.current_step, TournamentState::Knockout);
    let tp_id = third_place_id(&t);
    record_knockout_score(&mut t, &tp_id, 1, 0).unwrap();
    assert_eq!(t.current_step, TournamentState::Finished);
    assert!(t.winner.is_some() && t.third_place.is_some());
}

#[test]
fn reshuffle_with_byes_fills_the_gaps() {
    let mut t = knockout_with(6, AdvancementPolicy::Reshuffle);
    let mut rng = StdRng::seed_from_u64(2);

    let winners = play_round(&mut t, 0);
    assert_eq!(winners.len(), 3);
    generate_next_round(&mut t, &mut rng).unwrap();

    let semis = t.round_matches(1);
    assert_eq!(semis.iter().filter(|m| m.is_bye()).count(), 1);
    assert_eq!(semis.iter().filter(|m| m.has_both_players()).count(), 1);
    assert_eq!(entrants_of(&t, 1), winners);
}
