//! Deterministic card dealing logic.

use super::cards_types::{Card, Rank, Suit};
use super::rules::{validate_seat_count, DECK_SIZE, HAND_SLOTS};
use crate::errors::domain::DomainError;

/// Generate a full 52-card deck in standard order.
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card { suit, rank });
        }
    }
    deck
}

/// Simple deterministic RNG for shuffling.
///
/// Uses a SplitMix64-style generator for good statistical properties while
/// remaining fast and deterministic given a seed.
struct SimpleLcg {
    state: u64,
}

impl SimpleLcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u64 {
        // SplitMix64: well-distributed 64-bit generator.
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z ^= z >> 30;
        z = z.wrapping_mul(0xBF58476D1CE4E5B9);
        z ^= z >> 27;
        z = z.wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    fn next_range(&mut self, max: usize) -> usize {
        let m = max as u64;
        // Largest multiple of m that fits in u64, to avoid modulo bias.
        // Values >= limit are discarded using rejection sampling.
        let limit = u64::MAX - (u64::MAX % m);

        loop {
            let x = self.next();
            if x < limit {
                return (x % m) as usize;
            }
        }
    }
}

/// Fisher-Yates shuffle using deterministic RNG.
pub fn shuffle_with_seed(deck: &mut [Card], seed: u64) {
    let mut rng = SimpleLcg::new(seed);
    for i in (1..deck.len()).rev() {
        let j = rng.next_range(i + 1);
        deck.swap(i, j);
    }
}

/// One round's opening deal: 4 face-down slots per seat, remainder stacked
/// as the draw pile (top of pile = last element).
#[derive(Debug, Clone)]
pub struct Deal {
    pub hands: Vec<[Option<Card>; HAND_SLOTS]>,
    pub draw_pile: Vec<Card>,
}

/// Deal hands deterministically given seat count and RNG seed.
pub fn deal_round(seat_count: usize, seed: u64) -> Result<Deal, DomainError> {
    validate_seat_count(seat_count)?;

    let mut deck = full_deck();
    shuffle_with_seed(&mut deck, seed);

    let mut hands = Vec::with_capacity(seat_count);
    for seat in 0..seat_count {
        let start = seat * HAND_SLOTS;
        let mut hand: [Option<Card>; HAND_SLOTS] = [None; HAND_SLOTS];
        for (slot, card) in deck[start..start + HAND_SLOTS].iter().enumerate() {
            hand[slot] = Some(*card);
        }
        hands.push(hand);
    }

    let draw_pile = deck[seat_count * HAND_SLOTS..].to_vec();
    Ok(Deal { hands, draw_pile })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn deal_is_deterministic() {
        let d1 = deal_round(4, 12345).unwrap();
        let d2 = deal_round(4, 12345).unwrap();
        assert_eq!(d1.hands, d2.hands);
        assert_eq!(d1.draw_pile, d2.draw_pile);
    }

    #[test]
    fn deal_different_seeds_differ() {
        let d1 = deal_round(4, 12345).unwrap();
        let d2 = deal_round(4, 54321).unwrap();
        assert_ne!(d1.draw_pile, d2.draw_pile);
    }

    #[test]
    fn deal_validates_seat_count() {
        assert!(deal_round(1, 7).is_err());
        assert!(deal_round(5, 7).is_err());
        assert!(deal_round(2, 7).is_ok());
    }

    #[test]
    fn deal_partitions_whole_deck() {
        for seats in 2..=4 {
            let deal = deal_round(seats, 42).unwrap();
            let mut all: Vec<Card> = deal
                .hands
                .iter()
                .flat_map(|h| h.iter().flatten().copied())
                .collect();
            all.extend(deal.draw_pile.iter().copied());
            assert_eq!(all.len(), DECK_SIZE);
            let unique: HashSet<Card> = all.into_iter().collect();
            assert_eq!(unique.len(), DECK_SIZE, "duplicate card in deal");
        }
    }

    #[test]
    fn every_slot_filled_at_deal() {
        let deal = deal_round(3, 99).unwrap();
        for hand in &deal.hands {
            assert!(hand.iter().all(Option::is_some));
        }
        assert_eq!(deal.draw_pile.len(), DECK_SIZE - 3 * HAND_SLOTS);
    }
}
