//! Whole-round and whole-game progression through the public executor.

use super::actions::{apply_action, PlayerAction};
use super::state::{first_seat_for_round, GameStatus, RoundPhase};
use super::test_state_helpers::{assert_card_conservation, playing_game};

/// Drive the current round to completion: the seat to act declares, every
/// other seat takes its one final turn.
fn play_out_round(state: &mut super::state::GameState) {
    let declarer = state.current_round().unwrap().turn.unwrap();
    apply_action(state, declarer, &PlayerAction::DeclareScambodia).unwrap();
    while state.status == GameStatus::Playing
        && state.current_round().unwrap().phase == RoundPhase::FinalTurn
    {
        let seat = state.current_round().unwrap().turn.unwrap();
        apply_action(state, seat, &PlayerAction::DrawFromDeck).unwrap();
        apply_action(state, seat, &PlayerAction::ExchangeCard { slot: 0 }).unwrap();
    }
}

#[test]
fn single_round_game_finishes_with_outcome() {
    let mut state = playing_game(2, 1);
    play_out_round(&mut state);

    assert_eq!(state.status, GameStatus::Finished);
    assert_eq!(state.rounds.len(), 1);
    assert_eq!(state.rounds[0].phase, RoundPhase::Complete);
    let scores = state.rounds[0].scores.clone().unwrap();
    assert_eq!(state.cumulative_scores, scores);
    assert!(state.outcome.is_some());
    assert!(!state.payout_processed, "payout gate is the service's job");
}

#[test]
fn multi_round_game_deals_next_round_in_same_mutation() {
    let mut state = playing_game(3, 3);
    play_out_round(&mut state);

    // Round 2 is dealt and waiting on peeks, cumulative totals carried.
    assert_eq!(state.status, GameStatus::Playing);
    assert_eq!(state.current_round_no, 2);
    assert_eq!(state.rounds.len(), 2);
    assert_eq!(state.rounds[0].phase, RoundPhase::Complete);
    let round = state.current_round().unwrap();
    assert_eq!(round.phase, RoundPhase::Setup);
    assert_eq!(round.turn, None);
    assert!(round.hands.iter().all(|h| h.iter().all(Option::is_some)));
    assert!(round.discard_pile.is_empty());
    assert_card_conservation(round);

    let expected: Vec<i16> = state.rounds[0].scores.clone().unwrap();
    assert_eq!(state.cumulative_scores, expected);
}

#[test]
fn full_three_round_game_reaches_finished() {
    let mut state = playing_game(2, 3);
    for round_no in 1..=3u8 {
        assert_eq!(state.current_round_no, round_no);
        if round_no > 1 {
            for seat in 0..2 {
                apply_action(&mut state, seat, &PlayerAction::ConfirmSetupPeek).unwrap();
            }
            assert_eq!(
                state.current_round().unwrap().turn,
                Some(first_seat_for_round(round_no, 2))
            );
        }
        play_out_round(&mut state);
    }

    assert_eq!(state.status, GameStatus::Finished);
    assert_eq!(state.rounds.len(), 3);
    assert!(state.outcome.is_some());
    let summed: Vec<i16> = (0..2)
        .map(|seat| {
            state
                .rounds
                .iter()
                .map(|r| r.scores.as_ref().unwrap()[seat])
                .sum()
        })
        .collect();
    assert_eq!(state.cumulative_scores, summed);
}

#[test]
fn rounds_deal_differently_but_deterministically() {
    let a = playing_game(2, 3);
    let b = playing_game(2, 3);
    assert_eq!(
        a.rounds[0].hands, b.rounds[0].hands,
        "same seed, same deal"
    );

    let mut c = playing_game(2, 3);
    play_out_round(&mut c);
    assert_ne!(
        c.rounds[0].draw_pile.len(),
        0,
        "round ended by declaration, not exhaustion"
    );
    assert_ne!(
        c.rounds[1].hands, c.rounds[0].hands,
        "round 2 deals from a different derived seed"
    );
}

#[test]
fn finished_game_rejects_further_actions() {
    let mut state = playing_game(2, 1);
    play_out_round(&mut state);
    assert_eq!(state.status, GameStatus::Finished);

    let err = apply_action(&mut state, 0, &PlayerAction::DrawFromDeck).unwrap_err();
    assert!(matches!(
        err,
        crate::errors::domain::DomainError::Validation(
            crate::errors::domain::ValidationKind::LifecycleMismatch,
            _
        )
    ));
}
