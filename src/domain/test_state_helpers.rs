//! Shared constructors for domain tests.

use std::collections::HashSet;

use time::OffsetDateTime;
use uuid::Uuid;

use super::actions::{apply_action, PlayerAction};
use super::cards_types::Card;
use super::round_lifecycle::start_round;
use super::rules::DECK_SIZE;
use super::state::{GameState, GameStatus, PlayerInfo, RoundState, Seat};

/// Deterministic user id for a seat.
pub fn user(seat: Seat) -> Uuid {
    Uuid::from_u128(0x5CA3_B0D1_A000 + seat as u128)
}

/// A fully seated game that has not started dealing yet.
pub fn waiting_game(seat_count: u8) -> GameState {
    GameState {
        game_id: Uuid::from_u128(0xDEAD_BEEF),
        status: GameStatus::Waiting,
        seat_count,
        players: (0..seat_count)
            .map(|seat| PlayerInfo {
                user_id: user(seat),
                username: format!("player-{seat}"),
                seat,
            })
            .collect(),
        wager_per_player: 500,
        total_rounds: 1,
        current_round_no: 0,
        rounds: Vec::new(),
        cumulative_scores: vec![0; seat_count as usize],
        scambodia_calls: vec![0; seat_count as usize],
        outcome: None,
        payout_processed: false,
        rng_seed: 42,
        applied_keys: Vec::new(),
        version: 1,
        created_at: OffsetDateTime::UNIX_EPOCH,
        updated_at: OffsetDateTime::UNIX_EPOCH,
    }
}

/// A game in round 1 Playing phase: dealt, all peeks confirmed.
pub fn playing_game(seat_count: u8, total_rounds: u8) -> GameState {
    let mut state = waiting_game(seat_count);
    state.total_rounds = total_rounds;
    state.status = GameStatus::Playing;
    start_round(&mut state, 1).expect("deal round 1");
    for seat in 0..seat_count {
        apply_action(&mut state, seat, &PlayerAction::ConfirmSetupPeek).expect("confirm peek");
    }
    state
}

/// Every card currently in play for a round, across all piles, hands, and
/// the outstanding drawn card.
pub fn round_cards(round: &RoundState) -> Vec<Card> {
    let mut cards: Vec<Card> = round.draw_pile.clone();
    cards.extend(round.discard_pile.iter().copied());
    for hand in &round.hands {
        cards.extend(hand.iter().flatten().copied());
    }
    if let Some(drawn) = round.drawn {
        cards.push(drawn.card);
    }
    cards
}

/// Asserts the 52-card partition invariant for a live round, accounting for
/// slots permanently vanished by successful matches (those cards sit on the
/// discard pile, so the multiset stays complete).
pub fn assert_card_conservation(round: &RoundState) {
    let cards = round_cards(round);
    assert_eq!(cards.len(), DECK_SIZE, "card count drifted from 52");
    let unique: HashSet<Card> = cards.iter().copied().collect();
    assert_eq!(unique.len(), DECK_SIZE, "duplicate card in play");
}
