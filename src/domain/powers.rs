//! Special-power mapping and the power resolution sub-machine.
//!
//! Rank-to-power dispatch is a pure function over a closed enum; resolution
//! logic elsewhere is a match over `PowerType`, never anything dynamic.

use serde::{Deserialize, Serialize};

use super::cards_types::Rank;
use super::state::Seat;

/// Closed set of special powers granted by ranks 7..King when the card is
/// drawn directly from the deck.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerType {
    /// Reveal one of the actor's own face-down cards to the actor.
    PeekOwn,
    /// Reveal one opponent card to the actor.
    PeekOpponent,
    /// Swap one own card with one opponent card, neither side seeing either.
    BlindSwap,
    /// Reveal the opponent's targeted card, then optionally commit the swap.
    SeenSwap,
}

/// Power granted by a rank, if any. Aces and 2..6 carry none.
pub fn power_for_rank(rank: Rank) -> Option<PowerType> {
    match rank {
        Rank::Seven | Rank::Eight => Some(PowerType::PeekOwn),
        Rank::Nine | Rank::Ten => Some(PowerType::PeekOpponent),
        Rank::Jack | Rank::Queen => Some(PowerType::BlindSwap),
        Rank::King => Some(PowerType::SeenSwap),
        _ => None,
    }
}

impl PowerType {
    /// Whether resolving this power requires a slot in the actor's own hand.
    pub fn requires_own_slot(self) -> bool {
        matches!(
            self,
            PowerType::PeekOwn | PowerType::BlindSwap | PowerType::SeenSwap
        )
    }

    /// Whether resolving this power requires an opponent seat and slot.
    pub fn requires_opponent(self) -> bool {
        matches!(
            self,
            PowerType::PeekOpponent | PowerType::BlindSwap | PowerType::SeenSwap
        )
    }
}

/// An engaged power waiting on the actor's input.
///
/// `SelectingTarget` waits for a `ResolvePowerTarget` carrying the targets
/// the power type requires. A seen swap parks in `ConfirmingSeenSwap` after
/// the reveal; a second resolve commits the swap, `SkipPower` declines it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum PowerResolution {
    SelectingTarget {
        power: PowerType,
    },
    ConfirmingSeenSwap {
        own_slot: usize,
        opponent: Seat,
        opponent_slot: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_power_mapping_is_exhaustive() {
        let expected = [
            (Rank::Ace, None),
            (Rank::Two, None),
            (Rank::Three, None),
            (Rank::Four, None),
            (Rank::Five, None),
            (Rank::Six, None),
            (Rank::Seven, Some(PowerType::PeekOwn)),
            (Rank::Eight, Some(PowerType::PeekOwn)),
            (Rank::Nine, Some(PowerType::PeekOpponent)),
            (Rank::Ten, Some(PowerType::PeekOpponent)),
            (Rank::Jack, Some(PowerType::BlindSwap)),
            (Rank::Queen, Some(PowerType::BlindSwap)),
            (Rank::King, Some(PowerType::SeenSwap)),
        ];
        for (rank, power) in expected {
            assert_eq!(power_for_rank(rank), power, "rank {rank:?}");
        }
    }

    #[test]
    fn target_requirements_by_type() {
        assert!(PowerType::PeekOwn.requires_own_slot());
        assert!(!PowerType::PeekOwn.requires_opponent());
        assert!(!PowerType::PeekOpponent.requires_own_slot());
        assert!(PowerType::PeekOpponent.requires_opponent());
        for swap in [PowerType::BlindSwap, PowerType::SeenSwap] {
            assert!(swap.requires_own_slot());
            assert!(swap.requires_opponent());
        }
    }
}
