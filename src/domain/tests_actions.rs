use super::actions::{apply_action, PlayerAction};
use super::cards_types::{Card, Rank};
use super::rules::HAND_SLOTS;
use super::state::{first_seat_for_round, GameStatus, RoundPhase, Seat};
use super::test_state_helpers::{assert_card_conservation, playing_game, waiting_game};
use super::visibility::can_see;
use crate::domain::round_lifecycle::start_round;
use crate::errors::domain::{DomainError, ValidationKind};

fn validation_kind(err: DomainError) -> ValidationKind {
    match err {
        DomainError::Validation(kind, _) => kind,
        other => panic!("expected validation error, got {other:?}"),
    }
}

/// Put a card matching `pred` on top of the draw pile, pulling it out of a
/// hand if the pile holds none. Conservation-preserving.
fn bring_to_top(
    state: &mut super::state::GameState,
    pred: impl Fn(&Card) -> bool,
) -> Card {
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

/// Rig seat's `slot` and the draw-pile top to hold two same-rank cards.
/// Returns the shared rank. Conservation-preserving.
fn rig_match(state: &mut super::state::GameState, seat: Seat, slot: usize) -> Rank {
    let round = state.current_round_mut().unwrap();
    // Pigeonhole: the draw pile always holds some rank at least twice.
    let (i, j) = {
        let pile = &round.draw_pile;
        let mut found = None;
        'outer: for a in 0..pile.len() {
            for b in (a + 1)..pile.len() {
                if pile[a].rank == pile[b].rank {
                    found = Some((a, b));
                    break 'outer;
                }
            }
        }
        found.expect("draw pile holds no rank twice")
    };
    let rank = round.draw_pile[i].rank;
    let into_hand = round.draw_pile[i];
    let displaced = round.hands[seat as usize][slot]
        .replace(into_hand)
        .expect("rigged slot must be occupied");
    round.draw_pile[i] = displaced;
    let last = round.draw_pile.len() - 1;
    round.draw_pile.swap(j, last);
    rank
}

// ---- Setup phase ----

#[test]
fn setup_holds_until_every_seat_confirms() {
    let mut state = waiting_game(3);
    state.status = GameStatus::Playing;
    start_round(&mut state, 1).unwrap();

    apply_action(&mut state, 0, &PlayerAction::ConfirmSetupPeek).unwrap();
    apply_action(&mut state, 2, &PlayerAction::ConfirmSetupPeek).unwrap();
    assert_eq!(state.current_round().unwrap().phase, RoundPhase::Setup);
    assert_eq!(state.current_round().unwrap().turn, None);

    apply_action(&mut state, 1, &PlayerAction::ConfirmSetupPeek).unwrap();
    let round = state.current_round().unwrap();
    assert_eq!(round.phase, RoundPhase::Playing);
    assert_eq!(round.turn, Some(first_seat_for_round(1, 3)));
}

#[test]
fn setup_peek_reveals_bottom_slots_until_confirmed() {
    let mut state = waiting_game(2);
    state.status = GameStatus::Playing;
    start_round(&mut state, 1).unwrap();

    let round = state.current_round().unwrap();
    assert!(can_see(&round.reveals, 0, 0, 2));
    assert!(can_see(&round.reveals, 0, 0, 3));
    assert!(!can_see(&round.reveals, 0, 0, 0));
    assert!(!can_see(&round.reveals, 0, 1, 2));

    apply_action(&mut state, 0, &PlayerAction::ConfirmSetupPeek).unwrap();
    let round = state.current_round().unwrap();
    assert!(!can_see(&round.reveals, 0, 0, 2));
    // Seat 1 has not confirmed; its peek stands.
    assert!(can_see(&round.reveals, 1, 1, 2));
}

#[test]
fn confirm_peek_is_idempotent_and_noops_after_setup() {
    let mut state = playing_game(2, 1);
    // Round is already Playing; a late/duplicate confirm is success-no-op.
    let before = state.clone();
    apply_action(&mut state, 0, &PlayerAction::ConfirmSetupPeek).unwrap();
    assert_eq!(state, before);
}

#[test]
fn turn_actions_rejected_during_setup() {
    let mut state = waiting_game(2);
    state.status = GameStatus::Playing;
    start_round(&mut state, 1).unwrap();

    let err = apply_action(&mut state, 0, &PlayerAction::DrawFromDeck).unwrap_err();
    assert_eq!(validation_kind(err), ValidationKind::PhaseMismatch);
}

// ---- Draws ----

#[test]
fn draw_from_deck_sets_drawn_card_and_power_offer() {
    let mut state = playing_game(4, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    let top = bring_to_top(&mut state, |c| c.rank == Rank::King);

    apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap();
    let round = state.current_round().unwrap();
    let drawn = round.drawn.unwrap();
    assert_eq!(drawn.card, top);
    assert_eq!(drawn.owner, actor);
    assert_eq!(round.pending_power, Some(super::powers::PowerType::SeenSwap));
    // Drawing never advances the turn by itself.
    assert_eq!(round.turn, Some(actor));
    assert_card_conservation(round);
}

#[test]
fn draw_from_deck_without_power_rank_offers_nothing() {
    let mut state = playing_game(4, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    bring_to_top(&mut state, |c| c.rank == Rank::Three);

    apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap();
    assert_eq!(state.current_round().unwrap().pending_power, None);
}

#[test]
fn second_draw_rejected_while_one_is_outstanding() {
    let mut state = playing_game(4, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    bring_to_top(&mut state, |c| c.rank == Rank::Four);
    apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap();

    let err = apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap_err();
    assert_eq!(validation_kind(err), ValidationKind::CardAlreadyDrawn);
}

#[test]
fn out_of_turn_draw_rejected() {
    let mut state = playing_game(4, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    let bystander = (actor + 1) % 4;

    let err = apply_action(&mut state, bystander, &PlayerAction::DrawFromDeck).unwrap_err();
    assert_eq!(validation_kind(err), ValidationKind::OutOfTurn);
}

#[test]
fn draw_from_empty_discard_rejected() {
    let mut state = playing_game(2, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    let err = apply_action(&mut state, actor, &PlayerAction::DrawFromDiscard).unwrap_err();
    assert_eq!(validation_kind(err), ValidationKind::EmptyDiscardPile);
}

#[test]
fn discard_drawn_card_must_be_exchanged() {
    let mut state = playing_game(2, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    // Seed the discard pile via a draw-and-discard of a powerless card.
    bring_to_top(&mut state, |c| c.rank == Rank::Two);
    apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap();
    apply_action(&mut state, actor, &PlayerAction::DiscardDrawnCard).unwrap();

    let next = state.current_round().unwrap().turn.unwrap();
    apply_action(&mut state, next, &PlayerAction::DrawFromDiscard).unwrap();
    // No power from a discard draw, even for a power rank.
    assert_eq!(state.current_round().unwrap().pending_power, None);

    let err = apply_action(&mut state, next, &PlayerAction::DiscardDrawnCard).unwrap_err();
    assert_eq!(
        validation_kind(err),
        ValidationKind::DiscardDrawMustExchange
    );
    let err = apply_action(&mut state, next, &PlayerAction::AttemptMatch { slot: 0 }).unwrap_err();
    assert_eq!(
        validation_kind(err),
        ValidationKind::DiscardDrawMustExchange
    );

    // Exchange is the mandatory continuation.
    apply_action(&mut state, next, &PlayerAction::ExchangeCard { slot: 1 }).unwrap();
    assert_card_conservation(state.current_round().unwrap());
}

// ---- Exchange / discard / match ----

#[test]
fn exchange_pushes_old_card_to_discard_and_advances() {
    let mut state = playing_game(4, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    let top = bring_to_top(&mut state, |c| c.rank == Rank::Five);
    let old = state.current_round().unwrap().hands[actor as usize][2].unwrap();

    apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap();
    apply_action(&mut state, actor, &PlayerAction::ExchangeCard { slot: 2 }).unwrap();

    let round = state.current_round().unwrap();
    assert_eq!(round.hands[actor as usize][2], Some(top));
    assert_eq!(round.discard_top(), Some(old));
    assert_eq!(round.drawn, None);
    assert_eq!(round.turn, Some((actor + 1) % 4));
    assert_card_conservation(round);
}

#[test]
fn exchange_forfeits_an_unredeemed_power() {
    let mut state = playing_game(4, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    bring_to_top(&mut state, |c| c.rank == Rank::Seven);

    apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap();
    assert!(state.current_round().unwrap().pending_power.is_some());
    apply_action(&mut state, actor, &PlayerAction::ExchangeCard { slot: 0 }).unwrap();

    let round = state.current_round().unwrap();
    assert_eq!(round.pending_power, None);
    assert_eq!(round.active_power, None);
    assert_eq!(round.turn, Some((actor + 1) % 4));
}

#[test]
fn discard_of_powerless_card_advances_turn() {
    let mut state = playing_game(4, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    let top = bring_to_top(&mut state, |c| c.rank == Rank::Six);

    apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap();
    apply_action(&mut state, actor, &PlayerAction::DiscardDrawnCard).unwrap();

    let round = state.current_round().unwrap();
    assert_eq!(round.discard_top(), Some(top));
    assert_eq!(round.turn, Some((actor + 1) % 4));
}

#[test]
fn successful_match_vanishes_slot_and_discards_both() {
    let mut state = playing_game(4, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    let rank = rig_match(&mut state, actor, 1);
    let matched = state.current_round().unwrap().hands[actor as usize][1].unwrap();

    apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap();
    let drawn = state.current_round().unwrap().drawn.unwrap().card;
    assert_eq!(drawn.rank, rank);

    apply_action(&mut state, actor, &PlayerAction::AttemptMatch { slot: 1 }).unwrap();
    let round = state.current_round().unwrap();
    assert_eq!(round.hands[actor as usize][1], None);
    // Matched card on top, drawn card beneath it.
    let len = round.discard_pile.len();
    assert_eq!(round.discard_pile[len - 1], matched);
    assert_eq!(round.discard_pile[len - 2], drawn);
    assert_eq!(round.drawn, None);
    assert_eq!(round.turn, Some((actor + 1) % 4));
    assert_card_conservation(round);
}

#[test]
fn failed_match_installs_drawn_card_and_exposes_occupant() {
    let mut state = playing_game(4, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    let occupant = state.current_round().unwrap().hands[actor as usize][3].unwrap();
    // Pick a deck card of a different rank than the occupant.
    let top = bring_to_top(&mut state, |c| c.rank != occupant.rank);

    apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap();
    apply_action(&mut state, actor, &PlayerAction::AttemptMatch { slot: 3 }).unwrap();

    let round = state.current_round().unwrap();
    assert_eq!(round.hands[actor as usize][3], Some(top));
    assert_eq!(round.discard_top(), Some(occupant));
    assert_eq!(round.turn, Some((actor + 1) % 4));
    assert_card_conservation(round);
}

#[test]
fn match_on_vanished_slot_rejected() {
    let mut state = playing_game(4, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    rig_match(&mut state, actor, 0);
    apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap();
    apply_action(&mut state, actor, &PlayerAction::AttemptMatch { slot: 0 }).unwrap();

    // Cursor returns to the actor eventually; vanish stays. Fast-forward by
    // letting everyone else exchange.
    for _ in 0..3 {
        let seat = state.current_round().unwrap().turn.unwrap();
        apply_action(&mut state, seat, &PlayerAction::DrawFromDeck).unwrap();
        apply_action(&mut state, seat, &PlayerAction::ExchangeCard { slot: 0 }).unwrap();
    }
    assert_eq!(state.current_round().unwrap().turn, Some(actor));
    apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap();
    let err =
        apply_action(&mut state, actor, &PlayerAction::AttemptMatch { slot: 0 }).unwrap_err();
    assert_eq!(validation_kind(err), ValidationKind::VanishedSlot);
}

#[test]
fn exchange_slot_out_of_range_rejected() {
    let mut state = playing_game(2, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    bring_to_top(&mut state, |c| c.rank == Rank::Two);
    apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap();

    let err = apply_action(
        &mut state,
        actor,
        &PlayerAction::ExchangeCard { slot: HAND_SLOTS },
    )
    .unwrap_err();
    assert_eq!(validation_kind(err), ValidationKind::InvalidSlot);
}

// ---- Stock reshuffle ----

#[test]
fn exhausted_stock_rebuilds_from_discard_keeping_top() {
    let mut state = playing_game(2, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    {
        let round = state.current_round_mut().unwrap();
        // Move all but one stock card onto the discard pile.
        while round.draw_pile.len() > 1 {
            let card = round.draw_pile.pop().unwrap();
            round.discard_pile.push(card);
        }
    }

    // Burn the final stock card.
    apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap();
    apply_action(&mut state, actor, &PlayerAction::ExchangeCard { slot: 0 }).unwrap();

    let kept_top = state.current_round().unwrap().discard_top().unwrap();
    let discard_size = state.current_round().unwrap().discard_pile.len();
    let next = state.current_round().unwrap().turn.unwrap();
    apply_action(&mut state, next, &PlayerAction::DrawFromDeck).unwrap();

    let round = state.current_round().unwrap();
    assert_eq!(round.stock_cycles, 1);
    // The old top stays out as the new discard; everything beneath was
    // reshuffled into the stock, minus the card just drawn.
    assert_eq!(round.discard_pile, vec![kept_top]);
    assert_eq!(round.draw_pile.len(), discard_size - 2);
    assert!(round.draw_pile.iter().all(|c| *c != kept_top));
    assert_card_conservation(round);
}

#[test]
fn draw_with_nothing_left_to_reshuffle_rejected() {
    let mut state = playing_game(2, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    {
        let round = state.current_round_mut().unwrap();
        // Stock empty, only the public top card on the discard.
        let stock = std::mem::take(&mut round.draw_pile);
        round.discard_pile = vec![stock[0]];
    }
    let err = apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap_err();
    assert_eq!(validation_kind(err), ValidationKind::EmptyDrawPile);
}

// ---- Declaration ----

#[test]
fn declare_enters_final_turn_and_moves_cursor() {
    let mut state = playing_game(4, 1);
    let declarer = state.current_round().unwrap().turn.unwrap();
    apply_action(&mut state, declarer, &PlayerAction::DeclareScambodia).unwrap();

    let round = state.current_round().unwrap();
    assert_eq!(round.phase, RoundPhase::FinalTurn);
    assert_eq!(round.declared_by, Some(declarer));
    assert_eq!(round.turn, Some((declarer + 1) % 4));
}

#[test]
fn declare_with_outstanding_draw_rejected() {
    let mut state = playing_game(4, 1);
    let actor = state.current_round().unwrap().turn.unwrap();
    bring_to_top(&mut state, |c| c.rank == Rank::Two);
    apply_action(&mut state, actor, &PlayerAction::DrawFromDeck).unwrap();

    let err = apply_action(&mut state, actor, &PlayerAction::DeclareScambodia).unwrap_err();
    assert_eq!(validation_kind(err), ValidationKind::CardAlreadyDrawn);
}

#[test]
fn declaration_exclusivity() {
    let mut state = playing_game(4, 1);
    let declarer = state.current_round().unwrap().turn.unwrap();
    apply_action(&mut state, declarer, &PlayerAction::DeclareScambodia).unwrap();

    let next = state.current_round().unwrap().turn.unwrap();
    assert!(apply_action(&mut state, next, &PlayerAction::DeclareScambodia).is_err());
}

#[test]
fn final_turn_gives_each_other_seat_exactly_one_turn() {
    let mut state = playing_game(4, 1);
    let declarer = state.current_round().unwrap().turn.unwrap();
    apply_action(&mut state, declarer, &PlayerAction::DeclareScambodia).unwrap();

    for i in 1..4u8 {
        let seat = state.current_round().unwrap().turn.unwrap();
        assert_eq!(seat, (declarer + i) % 4);
        apply_action(&mut state, seat, &PlayerAction::DrawFromDeck).unwrap();
        apply_action(&mut state, seat, &PlayerAction::ExchangeCard { slot: 0 }).unwrap();
    }

    // Cursor returned to the declarer: single-round game is over.
    assert_eq!(state.status, GameStatus::Finished);
    let round = &state.rounds[0];
    assert_eq!(round.phase, RoundPhase::Complete);
    assert_eq!(round.turn, None);
    assert!(round.scores.is_some());
    assert!(state.outcome.is_some());
}
