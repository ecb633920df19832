//! Property suite: card conservation and the single-actor invariant hold
//! across arbitrary legal action sequences.

use proptest::prelude::*;

use super::actions::{apply_action, PlayerAction};
use super::player_view::{legal_action_kinds, ActionKind};
use super::powers::PowerResolution;
use super::state::{GameState, GameStatus, RoundPhase, Seat};
use super::test_state_helpers::{assert_card_conservation, playing_game};

fn occupied_slots(state: &GameState, seat: Seat) -> Vec<usize> {
    state.current_round().unwrap().hands[seat as usize]
        .iter()
        .enumerate()
        .filter_map(|(slot, card)| card.map(|_| slot))
        .collect()
}

/// Expand legal action kinds into concrete, guaranteed-applicable actions.
fn concrete_candidates(state: &GameState, seat: Seat) -> Vec<PlayerAction> {
    let round = state.current_round().unwrap();
    let own_slots = occupied_slots(state, seat);
    let mut out = Vec::new();

    for kind in legal_action_kinds(state, seat) {
        match kind {
            ActionKind::ConfirmSetupPeek => out.push(PlayerAction::ConfirmSetupPeek),
            ActionKind::DrawFromDeck => {
                if !round.draw_pile.is_empty() || round.discard_pile.len() > 1 {
                    out.push(PlayerAction::DrawFromDeck);
                }
            }
            ActionKind::DrawFromDiscard => {
                // A discard draw forces an exchange; skip it when the seat
                // has no occupied slot to exchange into.
                if !own_slots.is_empty() {
                    out.push(PlayerAction::DrawFromDiscard);
                }
            }
            ActionKind::ExchangeCard => {
                for slot in &own_slots {
                    out.push(PlayerAction::ExchangeCard { slot: *slot });
                }
            }
            ActionKind::DiscardDrawnCard => out.push(PlayerAction::DiscardDrawnCard),
            ActionKind::AttemptMatch => {
                for slot in &own_slots {
                    out.push(PlayerAction::AttemptMatch { slot: *slot });
                }
            }
            ActionKind::DeclareScambodia => out.push(PlayerAction::DeclareScambodia),
            ActionKind::InitiatePower => out.push(PlayerAction::InitiatePower),
            ActionKind::SkipPower => out.push(PlayerAction::SkipPower),
            ActionKind::ResolvePowerTarget => match &round.active_power {
                Some(PowerResolution::SelectingTarget { power }) => {
                    let own = own_slots.first().copied();
                    let opp = (0..state.seat_count)
                        .filter(|s| *s != seat)
                        .find_map(|s| {
                            occupied_slots(state, s).first().map(|slot| (s, *slot))
                        });
                    let own_ok = !power.requires_own_slot() || own.is_some();
                    let opp_ok = !power.requires_opponent() || opp.is_some();
                    if own_ok && opp_ok {
                        out.push(PlayerAction::ResolvePowerTarget {
                            own_slot: if power.requires_own_slot() { own } else { None },
                            opponent: if power.requires_opponent() {
                                opp.map(|(s, _)| s)
                            } else {
                                None
                            },
                            opponent_slot: if power.requires_opponent() {
                                opp.map(|(_, slot)| slot)
                            } else {
                                None
                            },
                        });
                    }
                }
                Some(PowerResolution::ConfirmingSeenSwap { .. }) => {
                    out.push(PlayerAction::ResolvePowerTarget {
                        own_slot: None,
                        opponent: None,
                        opponent_slot: None,
                    });
                }
                None => {}
            },
        }
    }
    out
}

fn acting_seat(state: &GameState) -> Seat {
    let round = state.current_round().unwrap();
    match round.phase {
        RoundPhase::Setup => round
            .setup_confirmed
            .iter()
            .position(|c| !c)
            .map(|seat| seat as Seat)
            .expect("Setup with everyone confirmed"),
        _ => round.turn.expect("no actor in a turn phase"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_random_legal_play_preserves_invariants(
        seats in 2u8..=4,
        choices in proptest::collection::vec(any::<u8>(), 1..80),
    ) {
        let mut state = playing_game(seats, 1);

        for &choice in &choices {
            if state.status != GameStatus::Playing {
                break;
            }
            let seat = acting_seat(&state);
            let candidates = concrete_candidates(&state, seat);
            prop_assert!(
                !candidates.is_empty(),
                "live game with no applicable action for seat {seat}"
            );
            let action = candidates[choice as usize % candidates.len()].clone();

            // Single actor: nobody else's turn action may succeed.
            let round = state.current_round().unwrap();
            if matches!(round.phase, RoundPhase::Playing | RoundPhase::FinalTurn) {
                let bystander = (seat + 1) % seats;
                if Some(bystander) != round.turn {
                    let mut probe = state.clone();
                    prop_assert!(
                        apply_action(&mut probe, bystander, &PlayerAction::DrawFromDeck)
                            .is_err()
                    );
                }
            }

            apply_action(&mut state, seat, &action).unwrap();

            if state.status != GameStatus::Playing {
                continue;
            }
            let round = state.current_round().unwrap();
            assert_card_conservation(round);
            match round.phase {
                RoundPhase::Playing | RoundPhase::FinalTurn => {
                    prop_assert!(round.turn.is_some(), "turn phase without an actor")
                }
                RoundPhase::Setup => prop_assert!(round.turn.is_none()),
                RoundPhase::Scoring | RoundPhase::Complete => {}
            }
        }
    }

    /// A declaration can never be recorded twice in one round.
    #[test]
    fn prop_declaration_freezes(seats in 2u8..=4, steps in 1u8..40) {
        let mut state = playing_game(seats, 1);
        let declarer = state.current_round().unwrap().turn.unwrap();
        apply_action(&mut state, declarer, &PlayerAction::DeclareScambodia).unwrap();

        for _ in 0..steps {
            if state.status != GameStatus::Playing {
                break;
            }
            let seat = state.current_round().unwrap().turn.unwrap();
            prop_assert!(
                apply_action(&mut state, seat, &PlayerAction::DeclareScambodia).is_err()
            );
            prop_assert_eq!(state.current_round().unwrap().declared_by, Some(declarer));
            apply_action(&mut state, seat, &PlayerAction::DrawFromDeck).unwrap();
            apply_action(&mut state, seat, &PlayerAction::ExchangeCard { slot: 0 }).unwrap();
        }
    }
}
