use super::actions::{apply_action, PlayerAction};
use super::cards_types::{Card, Rank};
use super::powers::{PowerResolution, PowerType};
use super::state::{GameState, Seat};
use super::test_state_helpers::{assert_card_conservation, playing_game};
use super::visibility::can_see;
use crate::errors::domain::{DomainError, ValidationKind};

fn validation_kind(err: DomainError) -> ValidationKind {
    match err {
        DomainError::Validation(kind, _) => kind,
        other => panic!("expected validation error, got {other:?}"),
    }
}

fn bring_to_top(state: &mut GameState, pred: impl Fn(&Card) -> bool) -> Card {
    let round = state.current_round_mut().unwrap();
    let last = round.draw_pile.len() - 1;
    if let Some(pos) = round.draw_pile.iter().position(|c| pred(c)) {
        round.draw_pile.swap(pos, last);
        return round.draw_pile[last];
    }
    for hand in round.hands.iter_mut() {
        for slot in hand.iter_mut() {
            if let Some(card) = *slot {
                if pred(&card) {
                    *slot = Some(round.draw_pile[last]);
                    round.draw_pile[last] = card;
                    return card;
                }
            }
        }
    }
    panic!("no card matching predicate anywhere in play");
}

/// Draw a card of `rank`, discard it, and engage the power.
fn engage_power(state: &mut GameState, rank: Rank) -> Seat {
    let actor = state.current_round().unwrap().turn.unwrap();
    bring_to_top(state, |c| c.rank == rank);
    apply_action(state, actor, &PlayerAction::DrawFromDeck).unwrap();
    apply_action(state, actor, &PlayerAction::DiscardDrawnCard).unwrap();
    // Turn held: the power decision is open.
    assert_eq!(state.current_round().unwrap().turn, Some(actor));
    apply_action(state, actor, &PlayerAction::InitiatePower).unwrap();
    actor
}

#[test]
fn initiate_without_offer_rejected() {
    let mut state = playing_game(4, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    let err = apply_action(&mut state, actor, &PlayerAction::InitiatePower).unwrap_err();
    assert_eq!(validation_kind(err), ValidationKind::NoPowerPending);
}

#[test]
fn discarded_power_card_holds_turn_until_decided() {
    let mut state = playing_game(4, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    bring_to_top(&mut state, |c| c.rank == Rank::Seven);
    apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap();
    apply_action(&mut state, actor, &PlayerAction::DiscardDrawnCard).unwrap();

    // Cannot just draw again; the decision is outstanding.
    let err = apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap_err();
    assert_eq!(validation_kind(err), ValidationKind::PowerDecisionPending);

    apply_action(&mut state, actor, &PlayerAction::SkipPower).unwrap();
    assert_eq!(state.current_round().unwrap().turn, Some((actor + 1) % 4));
}

#[test]
fn peek_own_reveals_slot_until_next_own_turn() {
    let mut state = playing_game(4, 1);
    let actor = engage_power(&mut state, Rank::Seven);

    // Missing target rejected.
    let err = apply_action(
        &mut state,
        actor,
        &PlayerAction::ResolvePowerTarget {
            own_slot: None,
            opponent: None,
            opponent_slot: None,
        },
    )
    .unwrap_err();
    assert_eq!(validation_kind(err), ValidationKind::MissingPowerTarget);

    apply_action(
        &mut state,
        actor,
        &PlayerAction::ResolvePowerTarget {
            own_slot: Some(0),
            opponent: None,
            opponent_slot: None,
        },
    )
    .unwrap();

    let round = state.current_round().unwrap();
    assert!(can_see(&round.reveals, actor, actor, 0));
    assert_eq!(round.active_power, None);
    assert_eq!(round.turn, Some((actor + 1) % 4));

    // Grant survives other players' turns, expires when the cursor returns.
    for _ in 0..3 {
        let seat = state.current_round().unwrap().turn.unwrap();
        apply_action(&mut state, seat, &PlayerAction::DrawFromDeck).unwrap();
        apply_action(&mut state, seat, &PlayerAction::ExchangeCard { slot: 3 }).unwrap();
    }
    let round = state.current_round().unwrap();
    assert_eq!(round.turn, Some(actor));
    assert!(!can_see(&round.reveals, actor, actor, 0));
}

#[test]
fn peek_opponent_requires_a_real_opponent() {
    let mut state = playing_game(4, 1);
    let actor = engage_power(&mut state, Rank::Nine);

    let err = apply_action(
        &mut state,
        actor,
        &PlayerAction::ResolvePowerTarget {
            own_slot: None,
            opponent: Some(actor),
            opponent_slot: Some(0),
        },
    )
    .unwrap_err();
    assert_eq!(validation_kind(err), ValidationKind::InvalidTarget);

    let err = apply_action(
        &mut state,
        actor,
        &PlayerAction::ResolvePowerTarget {
            own_slot: None,
            opponent: Some(7),
            opponent_slot: Some(0),
        },
    )
    .unwrap_err();
    assert_eq!(validation_kind(err), ValidationKind::InvalidTarget);

    let opponent = (actor + 2) % 4;
    apply_action(
        &mut state,
        actor,
        &PlayerAction::ResolvePowerTarget {
            own_slot: None,
            opponent: Some(opponent),
            opponent_slot: Some(1),
        },
    )
    .unwrap();

    let round = state.current_round().unwrap();
    assert!(can_see(&round.reveals, actor, opponent, 1));
    // The opponent does not gain sight of their own card.
    assert!(!can_see(&round.reveals, opponent, opponent, 1));
    assert_eq!(round.turn, Some((actor + 1) % 4));
}

#[test]
fn peek_rejects_vanished_target_slot() {
    let mut state = playing_game(4, 1);
    let actor = engage_power(&mut state, Rank::Ten);
    let opponent = (actor + 1) % 4;
    {
        let round = state.current_round_mut().unwrap();
        let vanished = round.hands[opponent as usize][2].take().unwrap();
        // Keep the multiset intact for the remainder of the round.
        round.discard_pile.insert(0, vanished);
    }

    let err = apply_action(
        &mut state,
        actor,
        &PlayerAction::ResolvePowerTarget {
            own_slot: None,
            opponent: Some(opponent),
            opponent_slot: Some(2),
        },
    )
    .unwrap_err();
    assert_eq!(validation_kind(err), ValidationKind::VanishedSlot);
}

#[test]
fn blind_swap_exchanges_cards_without_reveal() {
    let mut state = playing_game(4, 1);
    let actor = engage_power(&mut state, Rank::Jack);
    let opponent = (actor + 1) % 4;
    let own_before = state.current_round().unwrap().hands[actor as usize][1].unwrap();
    let opp_before = state.current_round().unwrap().hands[opponent as usize][3].unwrap();

    apply_action(
        &mut state,
        actor,
        &PlayerAction::ResolvePowerTarget {
            own_slot: Some(1),
            opponent: Some(opponent),
            opponent_slot: Some(3),
        },
    )
    .unwrap();

    let round = state.current_round().unwrap();
    assert_eq!(round.hands[actor as usize][1], Some(opp_before));
    assert_eq!(round.hands[opponent as usize][3], Some(own_before));
    // Neither side sees either card.
    assert!(!can_see(&round.reveals, actor, actor, 1));
    assert!(!can_see(&round.reveals, actor, opponent, 3));
    assert!(!can_see(&round.reveals, opponent, opponent, 3));
    assert_eq!(round.turn, Some((actor + 1) % 4));
    assert_card_conservation(round);
}

#[test]
fn blind_swap_requires_all_three_targets() {
    let mut state = playing_game(4, 1);
    let actor = engage_power(&mut state, Rank::Queen);

    let err = apply_action(
        &mut state,
        actor,
        &PlayerAction::ResolvePowerTarget {
            own_slot: Some(0),
            opponent: None,
            opponent_slot: None,
        },
    )
    .unwrap_err();
    assert_eq!(validation_kind(err), ValidationKind::MissingPowerTarget);
}

#[test]
fn seen_swap_reveals_then_commits_on_second_resolve() {
    let mut state = playing_game(4, 1);
    let actor = engage_power(&mut state, Rank::King);
    let opponent = (actor + 1) % 4;
    let own_before = state.current_round().unwrap().hands[actor as usize][0].unwrap();
    let opp_before = state.current_round().unwrap().hands[opponent as usize][0].unwrap();

    apply_action(
        &mut state,
        actor,
        &PlayerAction::ResolvePowerTarget {
            own_slot: Some(0),
            opponent: Some(opponent),
            opponent_slot: Some(0),
        },
    )
    .unwrap();

    // Revealed, swap not yet committed, turn held.
    let round = state.current_round().unwrap();
    assert!(can_see(&round.reveals, actor, opponent, 0));
    assert_eq!(round.hands[actor as usize][0], Some(own_before));
    assert_eq!(
        round.active_power,
        Some(PowerResolution::ConfirmingSeenSwap {
            own_slot: 0,
            opponent,
            opponent_slot: 0,
        })
    );
    assert_eq!(round.turn, Some(actor));

    apply_action(
        &mut state,
        actor,
        &PlayerAction::ResolvePowerTarget {
            own_slot: None,
            opponent: None,
            opponent_slot: None,
        },
    )
    .unwrap();

    let round = state.current_round().unwrap();
    assert_eq!(round.hands[actor as usize][0], Some(opp_before));
    assert_eq!(round.hands[opponent as usize][0], Some(own_before));
    // The swap moved the card; the reveal on that slot is revoked.
    assert!(!can_see(&round.reveals, actor, opponent, 0));
    assert_eq!(round.active_power, None);
    assert_eq!(round.turn, Some((actor + 1) % 4));
    assert_card_conservation(round);
}

#[test]
fn seen_swap_declined_keeps_reveal_and_hands() {
    let mut state = playing_game(4, 1);
    let actor = engage_power(&mut state, Rank::King);
    let opponent = (actor + 1) % 4;
    let own_before = state.current_round().unwrap().hands[actor as usize][2].unwrap();
    let opp_before = state.current_round().unwrap().hands[opponent as usize][2].unwrap();

    apply_action(
        &mut state,
        actor,
        &PlayerAction::ResolvePowerTarget {
            own_slot: Some(2),
            opponent: Some(opponent),
            opponent_slot: Some(2),
        },
    )
    .unwrap();
    apply_action(&mut state, actor, &PlayerAction::SkipPower).unwrap();

    let round = state.current_round().unwrap();
    assert_eq!(round.hands[actor as usize][2], Some(own_before));
    assert_eq!(round.hands[opponent as usize][2], Some(opp_before));
    // The pre-reveal stands even though the swap was declined.
    assert!(can_see(&round.reveals, actor, opponent, 2));
    assert_eq!(round.active_power, None);
    assert_eq!(round.turn, Some((actor + 1) % 4));
}

#[test]
fn exchange_rejected_while_power_engaged() {
    let mut state = playing_game(4, 1);
    let actor = engage_power(&mut state, Rank::Eight);

    let err =
        apply_action(&mut state, actor, &PlayerAction::ExchangeCard { slot: 0 }).unwrap_err();
    // The drawn card is already gone; the engaged power is the blocker.
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::NoCardDrawn, _)
    ));
}

#[test]
fn initiate_with_drawn_card_in_hand_discards_it_first() {
    let mut state = playing_game(4, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    let top = bring_to_top(&mut state, |c| c.rank == Rank::Eight);
    apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap();
    apply_action(&mut state, actor, &PlayerAction::InitiatePower).unwrap();

    let round = state.current_round().unwrap();
    assert_eq!(round.discard_top(), Some(top));
    assert_eq!(round.drawn, None);
    assert_eq!(
        round.active_power,
        Some(PowerResolution::SelectingTarget {
            power: PowerType::PeekOwn
        })
    );
}

#[test]
fn skip_power_with_drawn_card_discards_it() {
    let mut state = playing_game(4, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    let top = bring_to_top(&mut state, |c| c.rank == Rank::Nine);
    apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap();
    apply_action(&mut state, actor, &PlayerAction::SkipPower).unwrap();

    let round = state.current_round().unwrap();
    assert_eq!(round.discard_top(), Some(top));
    assert_eq!(round.drawn, None);
    assert_eq!(round.pending_power, None);
    assert_eq!(round.turn, Some((actor + 1) % 4));
    assert_card_conservation(round);
}
