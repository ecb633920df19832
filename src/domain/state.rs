//! Game and round state containers plus seat rotation helpers.
//!
//! The `GameState` document is the single shared mutable resource: one per
//! match, persisted whole, mutated atomically as a unit. Rounds are stored
//! in a by-number array and hands in fixed 4-slot arrays so the structural
//! invariants stay checkable.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::cards_types::Card;
use super::powers::{PowerResolution, PowerType};
use super::rules::HAND_SLOTS;
use super::visibility::RevealGrant;
use crate::errors::domain::{DomainError, ValidationKind};

pub type Seat = u8;

/// Overall game lifecycle.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    /// Created, seats still filling.
    Waiting,
    /// Seats full, rounds in progress.
    Playing,
    /// Final round scored, winner computed. Terminal; kept for audit.
    Finished,
    /// Administratively cancelled. Terminal; no payout fires.
    Cancelled,
}

/// Per-round progression phases.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundPhase {
    /// Cards dealt; players peek their bottom two slots and confirm.
    Setup,
    /// Normal turn loop.
    Playing,
    /// A declaration stands; every other seat gets exactly one more turn.
    FinalTurn,
    /// Scores being tallied (engine-internal, never observed mid-write).
    Scoring,
    /// Round complete.
    Complete,
}

/// Where the outstanding drawn card came from. A discard-drawn card never
/// redeems a power and must be exchanged.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DrawSource {
    Deck,
    Discard,
}

/// The card currently held "in hand" by the acting player after a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawnCard {
    pub card: Card,
    pub owner: Seat,
    pub source: DrawSource,
}

/// One player's identity at a fixed seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub user_id: Uuid,
    pub username: String,
    pub seat: Seat,
}

/// Final game result. A draw is an explicit outcome, not a guessed deeper
/// tie-break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameOutcome {
    Winner { seat: Seat },
    Draw { seats: Vec<Seat> },
}

/// Per-round container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    /// 1-based round number.
    pub round_no: u8,
    pub phase: RoundPhase,
    /// Seat whose action is currently legal. None during Setup/Scoring/Complete.
    pub turn: Option<Seat>,
    /// Per-seat 4-slot hands; None = slot permanently vanished.
    pub hands: Vec<[Option<Card>; HAND_SLOTS]>,
    /// Top of pile = last element.
    pub draw_pile: Vec<Card>,
    /// Top of pile = last element. The top card is public knowledge.
    pub discard_pile: Vec<Card>,
    pub drawn: Option<DrawnCard>,
    /// Power offered by the current deck-draw, not yet engaged.
    pub pending_power: Option<PowerType>,
    /// Engaged power resolution awaiting targets/confirmation.
    pub active_power: Option<PowerResolution>,
    /// Set at most once per round; freezes further declarations.
    pub declared_by: Option<Seat>,
    /// Per-seat Setup peek-complete confirmations.
    pub setup_confirmed: Vec<bool>,
    /// Explicit reveal events; visibility is derived from these.
    pub reveals: Vec<RevealGrant>,
    /// Number of times the draw pile was rebuilt from the discard pile.
    pub stock_cycles: u8,
    /// Per-seat round scores, written at Scoring.
    pub scores: Option<Vec<i16>>,
    /// Whether the declarer held the strict lowest score at Scoring.
    pub declaration_correct: Option<bool>,
}

impl RoundState {
    pub fn hand(&self, seat: Seat) -> Result<&[Option<Card>; HAND_SLOTS], DomainError> {
        self.hands.get(seat as usize).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::InvalidTarget,
                format!("No hand for seat {seat}"),
            )
        })
    }

    pub fn hand_mut(&mut self, seat: Seat) -> Result<&mut [Option<Card>; HAND_SLOTS], DomainError> {
        self.hands.get_mut(seat as usize).ok_or_else(|| {
            DomainError::validation(
                ValidationKind::InvalidTarget,
                format!("No hand for seat {seat}"),
            )
        })
    }

    pub fn discard_top(&self) -> Option<Card> {
        self.discard_pile.last().copied()
    }

    pub fn all_setup_confirmed(&self) -> bool {
        self.setup_confirmed.iter().all(|c| *c)
    }
}

/// Entire game document: the unit of persistence, publication, and audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub game_id: Uuid,
    pub status: GameStatus,
    /// Seats to fill; fixed at creation.
    pub seat_count: u8,
    /// Seated players in seat order; grows until `seat_count` while Waiting.
    pub players: Vec<PlayerInfo>,
    /// Stake per player in minor currency units.
    pub wager_per_player: u64,
    /// 1, 3 or 5.
    pub total_rounds: u8,
    /// 1-based; 0 while Waiting.
    pub current_round_no: u8,
    /// Rounds by number; `rounds[n - 1]` is round n.
    pub rounds: Vec<RoundState>,
    /// Per-seat totals over completed rounds.
    pub cumulative_scores: Vec<i16>,
    /// Per-seat count of correct declarations; the tie-break key.
    pub scambodia_calls: Vec<u8>,
    pub outcome: Option<GameOutcome>,
    /// Latches true in the commit that finishes the game; gates the ledger
    /// call so it can never fire twice.
    pub payout_processed: bool,
    /// Base seed; all dealing derives from it deterministically.
    pub rng_seed: u64,
    /// Recently applied idempotency keys (bounded ring, newest last).
    pub applied_keys: Vec<Uuid>,
    /// Bumped by the store on every committed mutation.
    pub version: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl GameState {
    pub fn seat_of(&self, user_id: Uuid) -> Option<Seat> {
        self.players
            .iter()
            .find(|p| p.user_id == user_id)
            .map(|p| p.seat)
    }

    pub fn seats_filled(&self) -> bool {
        self.players.len() == self.seat_count as usize
    }

    pub fn total_pot(&self) -> u64 {
        self.wager_per_player * self.seat_count as u64
    }

    pub fn current_round(&self) -> Result<&RoundState, DomainError> {
        let no = self.current_round_no;
        self.rounds
            .get(no.wrapping_sub(1) as usize)
            .filter(|_| no >= 1)
            .ok_or_else(|| {
                DomainError::validation_other(format!(
                    "Invariant violated: round {no} must exist (current_round)"
                ))
            })
    }

    pub fn current_round_mut(&mut self) -> Result<&mut RoundState, DomainError> {
        let no = self.current_round_no;
        if no < 1 {
            return Err(DomainError::validation_other(
                "Invariant violated: no round in progress (current_round_mut)",
            ));
        }
        self.rounds.get_mut(no as usize - 1).ok_or_else(|| {
            DomainError::validation_other(format!(
                "Invariant violated: round {no} must exist (current_round_mut)"
            ))
        })
    }

    pub fn record_applied_key(&mut self, key: Uuid) {
        self.applied_keys.push(key);
        let window = super::rules::APPLIED_KEY_WINDOW;
        if self.applied_keys.len() > window {
            let excess = self.applied_keys.len() - window;
            self.applied_keys.drain(..excess);
        }
    }
}

/// Seat / turn math helpers.
///
/// These live in `domain` so every layer (services, views, tests) shares a
/// single source of truth for rotation and "who acts next".
///
/// Clockwise direction is positive (+1).
#[inline]
pub fn seat_offset(seat: Seat, delta: i8, seat_count: u8) -> Seat {
    let seat_i = seat as i16;
    let delta_i = delta as i16;
    ((seat_i + delta_i).rem_euclid(seat_count as i16)) as Seat
}

/// Returns the next seat clockwise.
#[inline]
pub fn next_seat(seat: Seat, seat_count: u8) -> Seat {
    seat_offset(seat, 1, seat_count)
}

/// Dealer seat for a 1-based round number. Round 1 deals from seat 0, then
/// the deal rotates clockwise.
#[inline]
pub fn dealer_for_round(round_no: u8, seat_count: u8) -> Seat {
    debug_assert!(round_no >= 1, "round_no is 1-based and must be >= 1");
    ((round_no - 1) % seat_count) as Seat
}

/// Seat acting first in a round (the dealer's successor).
#[inline]
pub fn first_seat_for_round(round_no: u8, seat_count: u8) -> Seat {
    next_seat(dealer_for_round(round_no, seat_count), seat_count)
}

pub fn require_turn(round: &RoundState, ctx: &'static str) -> Result<Seat, DomainError> {
    round.turn.ok_or_else(|| {
        DomainError::validation_other(format!("Invariant violated: turn must be set ({ctx})"))
    })
}

pub fn require_drawn(round: &RoundState, ctx: &'static str) -> Result<DrawnCard, DomainError> {
    round.drawn.ok_or_else(|| {
        DomainError::validation(
            ValidationKind::NoCardDrawn,
            format!("No card drawn yet ({ctx})"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_rotation_wraps() {
        assert_eq!(next_seat(0, 4), 1);
        assert_eq!(next_seat(3, 4), 0);
        assert_eq!(next_seat(1, 2), 0);
        assert_eq!(seat_offset(0, -1, 4), 3);
    }

    #[test]
    fn dealer_rotates_per_round() {
        assert_eq!(dealer_for_round(1, 4), 0);
        assert_eq!(dealer_for_round(2, 4), 1);
        assert_eq!(dealer_for_round(5, 4), 0);
        assert_eq!(first_seat_for_round(1, 4), 1);
        assert_eq!(first_seat_for_round(3, 2), 1);
    }

    #[test]
    fn applied_key_ring_is_bounded() {
        let mut state = crate::domain::test_state_helpers::waiting_game(2);
        for _ in 0..(super::super::rules::APPLIED_KEY_WINDOW + 10) {
            state.record_applied_key(Uuid::new_v4());
        }
        assert_eq!(
            state.applied_keys.len(),
            super::super::rules::APPLIED_KEY_WINDOW
        );
    }
}
