//! Action validation and execution: the core of the rules engine.
//!
//! Every action is validated against (phase, turn ownership, outstanding
//! draw, outstanding power) before any mutation, and each successful path
//! either advances the turn or explicitly hands control to the power
//! sub-state — never both, never neither.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::powers::{power_for_rank, PowerResolution, PowerType};
use super::round_lifecycle::complete_round;
use super::rules::HAND_SLOTS;
use super::seed_derivation::derive_reshuffle_seed;
use super::state::{
    first_seat_for_round, next_seat, require_drawn, require_turn, DrawSource, DrawnCard, GameState,
    GameStatus, RoundPhase, Seat,
};
use super::visibility::{self, RevealExpiry, RevealGrant, RevealSource};
use crate::errors::domain::{DomainError, ValidationKind};

/// Player intents accepted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerAction {
    ConfirmSetupPeek,
    DrawFromDeck,
    DrawFromDiscard,
    ExchangeCard {
        slot: usize,
    },
    DiscardDrawnCard,
    AttemptMatch {
        slot: usize,
    },
    DeclareScambodia,
    InitiatePower,
    ResolvePowerTarget {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        own_slot: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        opponent: Option<Seat>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        opponent_slot: Option<usize>,
    },
    SkipPower,
}

/// Validate and apply `action` for `seat` against the live document.
///
/// Pure state-to-state: no I/O, fully re-derivable from a freshly loaded
/// document on every optimistic retry.
pub fn apply_action(
    state: &mut GameState,
    seat: Seat,
    action: &PlayerAction,
) -> Result<(), DomainError> {
    if state.status != GameStatus::Playing {
        return Err(DomainError::validation(
            ValidationKind::LifecycleMismatch,
            format!("Game is {:?}, not accepting actions", state.status),
        ));
    }

    debug!(game_id = %state.game_id, seat, action = ?action, "Applying action");

    match action {
        PlayerAction::ConfirmSetupPeek => confirm_setup_peek(state, seat),
        PlayerAction::DrawFromDeck => draw_from_deck(state, seat),
        PlayerAction::DrawFromDiscard => draw_from_discard(state, seat),
        PlayerAction::ExchangeCard { slot } => exchange_card(state, seat, *slot),
        PlayerAction::DiscardDrawnCard => discard_drawn_card(state, seat),
        PlayerAction::AttemptMatch { slot } => attempt_match(state, seat, *slot),
        PlayerAction::DeclareScambodia => declare_scambodia(state, seat),
        PlayerAction::InitiatePower => initiate_power(state, seat),
        PlayerAction::ResolvePowerTarget {
            own_slot,
            opponent,
            opponent_slot,
        } => resolve_power_target(state, seat, *own_slot, *opponent, *opponent_slot),
        PlayerAction::SkipPower => skip_power(state, seat),
    }
}

// ---- Shared validation ----

fn require_turn_phase(state: &GameState, seat: Seat) -> Result<(), DomainError> {
    let round = state.current_round()?;
    if !matches!(round.phase, RoundPhase::Playing | RoundPhase::FinalTurn) {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            format!("Round is in {:?}, not accepting turn actions", round.phase),
        ));
    }
    let turn = require_turn(round, "turn action")?;
    if turn != seat {
        return Err(DomainError::validation(
            ValidationKind::OutOfTurn,
            format!("Not your turn (seat {turn} to act)"),
        ));
    }
    Ok(())
}

fn require_no_outstanding_draw(state: &GameState) -> Result<(), DomainError> {
    let round = state.current_round()?;
    if round.drawn.is_some() {
        return Err(DomainError::validation(
            ValidationKind::CardAlreadyDrawn,
            "A drawn card is outstanding and must be resolved first",
        ));
    }
    if round.pending_power.is_some() || round.active_power.is_some() {
        return Err(DomainError::validation(
            ValidationKind::PowerDecisionPending,
            "A power decision is outstanding and must be resolved first",
        ));
    }
    Ok(())
}

fn validate_slot(
    state: &GameState,
    owner: Seat,
    slot: usize,
) -> Result<(), DomainError> {
    if slot >= HAND_SLOTS {
        return Err(DomainError::validation(
            ValidationKind::InvalidSlot,
            format!("Slot {slot} outside the {HAND_SLOTS}-slot hand"),
        ));
    }
    let round = state.current_round()?;
    if round.hand(owner)?[slot].is_none() {
        return Err(DomainError::validation(
            ValidationKind::VanishedSlot,
            format!("Seat {owner} slot {slot} was already vanished"),
        ));
    }
    Ok(())
}

/// Advance the turn cursor clockwise. In FinalTurn, the cursor returning to
/// the declarer ends the round instead.
fn advance_turn(state: &mut GameState) -> Result<(), DomainError> {
    let seat_count = state.seat_count;
    let round = state.current_round_mut()?;
    let current = require_turn(round, "advance_turn")?;
    let next = next_seat(current, seat_count);

    match round.phase {
        RoundPhase::Playing => {
            visibility::purge_on_turn_start(&mut round.reveals, next);
            round.turn = Some(next);
            Ok(())
        }
        RoundPhase::FinalTurn => {
            if round.declared_by == Some(next) {
                round.phase = RoundPhase::Scoring;
                round.turn = None;
                complete_round(state)
            } else {
                visibility::purge_on_turn_start(&mut round.reveals, next);
                round.turn = Some(next);
                Ok(())
            }
        }
        _ => Err(DomainError::validation_other(
            "Invariant violated: advance_turn outside Playing/FinalTurn",
        )),
    }
}

// ---- Setup ----

/// Peek-complete signal. Idempotent per seat; once every seat has
/// confirmed, the round enters Playing and the dealer's successor acts
/// first. Confirmations arriving after Setup are already-applied no-ops.
fn confirm_setup_peek(state: &mut GameState, seat: Seat) -> Result<(), DomainError> {
    let round_no = state.current_round_no;
    let seat_count = state.seat_count;
    let round = state.current_round_mut()?;

    if round.phase != RoundPhase::Setup {
        return Ok(());
    }
    let confirmed = round.setup_confirmed.get_mut(seat as usize).ok_or_else(|| {
        DomainError::validation(
            ValidationKind::InvalidTarget,
            format!("No seat {seat} in this game"),
        )
    })?;
    if *confirmed {
        return Ok(());
    }
    *confirmed = true;
    visibility::purge_on_setup_confirm(&mut round.reveals, seat);

    if round.all_setup_confirmed() {
        round.phase = RoundPhase::Playing;
        round.turn = Some(first_seat_for_round(round_no, seat_count));
    }
    Ok(())
}

// ---- Draws ----

fn draw_from_deck(state: &mut GameState, seat: Seat) -> Result<(), DomainError> {
    require_turn_phase(state, seat)?;
    require_no_outstanding_draw(state)?;

    let rng_seed = state.rng_seed;
    let round_no = state.current_round_no;
    let round = state.current_round_mut()?;

    if round.draw_pile.is_empty() {
        // Rebuild the stock from the discard pile, keeping its top card
        // aside as the new discard.
        if round.discard_pile.len() <= 1 {
            return Err(DomainError::validation(
                ValidationKind::EmptyDrawPile,
                "Draw pile exhausted and discard pile cannot be reshuffled",
            ));
        }
        let top = round
            .discard_pile
            .pop()
            .ok_or_else(|| DomainError::validation_other("discard emptied mid-reshuffle"))?;
        let mut stock = std::mem::take(&mut round.discard_pile);
        super::dealing::shuffle_with_seed(
            &mut stock,
            derive_reshuffle_seed(rng_seed, round_no, round.stock_cycles),
        );
        round.draw_pile = stock;
        round.discard_pile = vec![top];
        round.stock_cycles += 1;
    }

    let card = round
        .draw_pile
        .pop()
        .ok_or_else(|| DomainError::validation_other("draw pile empty after reshuffle"))?;
    round.drawn = Some(DrawnCard {
        card,
        owner: seat,
        source: DrawSource::Deck,
    });
    round.pending_power = power_for_rank(card.rank);
    Ok(())
}

fn draw_from_discard(state: &mut GameState, seat: Seat) -> Result<(), DomainError> {
    require_turn_phase(state, seat)?;
    require_no_outstanding_draw(state)?;

    let round = state.current_round_mut()?;
    let card = round.discard_pile.pop().ok_or_else(|| {
        DomainError::validation(ValidationKind::EmptyDiscardPile, "Discard pile is empty")
    })?;
    // Discard-drawn cards never redeem powers; exchange is mandatory next.
    round.drawn = Some(DrawnCard {
        card,
        owner: seat,
        source: DrawSource::Discard,
    });
    Ok(())
}

// ---- Resolving a draw ----

fn exchange_card(state: &mut GameState, seat: Seat, slot: usize) -> Result<(), DomainError> {
    require_turn_phase(state, seat)?;
    let drawn = require_drawn(state.current_round()?, "exchange")?;
    if state.current_round()?.active_power.is_some() {
        return Err(DomainError::validation(
            ValidationKind::PowerDecisionPending,
            "An engaged power must be resolved before exchanging",
        ));
    }
    validate_slot(state, seat, slot)?;

    let round = state.current_round_mut()?;
    let hand = round.hands.get_mut(seat as usize).ok_or_else(|| {
        DomainError::validation(ValidationKind::InvalidTarget, format!("No seat {seat}"))
    })?;
    let old = hand[slot].replace(drawn.card).ok_or_else(|| {
        DomainError::validation_other("exchange slot emptied after validation")
    })?;
    round.discard_pile.push(old);
    round.drawn = None;
    // A power on the exchanged-in card is forfeited: powers only trigger on
    // a deck-drawn card that is then discarded/decided.
    round.pending_power = None;
    visibility::revoke_slot(&mut round.reveals, seat, slot);

    advance_turn(state)
}

fn discard_drawn_card(state: &mut GameState, seat: Seat) -> Result<(), DomainError> {
    require_turn_phase(state, seat)?;
    let drawn = require_drawn(state.current_round()?, "discard drawn")?;
    if drawn.source != DrawSource::Deck {
        return Err(DomainError::validation(
            ValidationKind::DiscardDrawMustExchange,
            "A card taken from the discard pile must be exchanged",
        ));
    }

    let round = state.current_round_mut()?;
    round.discard_pile.push(drawn.card);
    round.drawn = None;

    if round.pending_power.is_some() {
        // The discarded power card is redeemable: the turn holds until the
        // player initiates or skips the power.
        Ok(())
    } else {
        advance_turn(state)
    }
}

fn attempt_match(state: &mut GameState, seat: Seat, slot: usize) -> Result<(), DomainError> {
    require_turn_phase(state, seat)?;
    let drawn = require_drawn(state.current_round()?, "attempt match")?;
    if drawn.source != DrawSource::Deck {
        return Err(DomainError::validation(
            ValidationKind::DiscardDrawMustExchange,
            "Only a deck-drawn card can attempt a match",
        ));
    }
    validate_slot(state, seat, slot)?;

    let round = state.current_round_mut()?;
    let hand = round.hands.get_mut(seat as usize).ok_or_else(|| {
        DomainError::validation(ValidationKind::InvalidTarget, format!("No seat {seat}"))
    })?;
    let occupant = hand[slot].ok_or_else(|| {
        DomainError::validation_other("match slot emptied after validation")
    })?;

    if occupant.rank == drawn.card.rank {
        // Match: the slot vanishes for the rest of the round; both cards
        // leave play via the discard pile, matched card on top.
        hand[slot] = None;
        round.discard_pile.push(drawn.card);
        round.discard_pile.push(occupant);
    } else {
        // Failed match penalty: the drawn card is forced into the slot and
        // the old occupant is exposed on the discard pile.
        hand[slot] = Some(drawn.card);
        round.discard_pile.push(occupant);
    }
    round.drawn = None;
    round.pending_power = None;
    visibility::revoke_slot(&mut round.reveals, seat, slot);

    advance_turn(state)
}

// ---- Declaration ----

fn declare_scambodia(state: &mut GameState, seat: Seat) -> Result<(), DomainError> {
    let round = state.current_round()?;
    if round.phase != RoundPhase::Playing {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            format!("Cannot declare during {:?}", round.phase),
        ));
    }
    require_turn_phase(state, seat)?;
    require_no_outstanding_draw(state)?;

    let round = state.current_round_mut()?;
    if round.declared_by.is_some() {
        return Err(DomainError::validation(
            ValidationKind::AlreadyDeclared,
            "A declaration already stands for this round",
        ));
    }
    round.declared_by = Some(seat);
    round.phase = RoundPhase::FinalTurn;

    advance_turn(state)
}

// ---- Powers ----

fn initiate_power(state: &mut GameState, seat: Seat) -> Result<(), DomainError> {
    require_turn_phase(state, seat)?;

    let round = state.current_round_mut()?;
    let power = round.pending_power.take().ok_or_else(|| {
        DomainError::validation(ValidationKind::NoPowerPending, "No power offer to initiate")
    })?;

    // Initiating with the drawn card still in hand discards it first; a
    // power is only ever redeemed off the discard.
    if let Some(drawn) = round.drawn.take() {
        round.discard_pile.push(drawn.card);
    }
    round.active_power = Some(PowerResolution::SelectingTarget { power });
    Ok(())
}

fn resolve_power_target(
    state: &mut GameState,
    seat: Seat,
    own_slot: Option<usize>,
    opponent: Option<Seat>,
    opponent_slot: Option<usize>,
) -> Result<(), DomainError> {
    require_turn_phase(state, seat)?;

    let active = state.current_round()?.active_power.clone().ok_or_else(|| {
        DomainError::validation(ValidationKind::NoPowerPending, "No engaged power to resolve")
    })?;

    match active {
        PowerResolution::SelectingTarget { power } => {
            resolve_selected_target(state, seat, power, own_slot, opponent, opponent_slot)
        }
        PowerResolution::ConfirmingSeenSwap {
            own_slot,
            opponent,
            opponent_slot,
        } => commit_swap(state, seat, own_slot, opponent, opponent_slot),
    }
}

fn resolve_selected_target(
    state: &mut GameState,
    seat: Seat,
    power: PowerType,
    own_slot: Option<usize>,
    opponent: Option<Seat>,
    opponent_slot: Option<usize>,
) -> Result<(), DomainError> {
    let own = if power.requires_own_slot() {
        let slot = own_slot.ok_or_else(|| {
            DomainError::validation(
                ValidationKind::MissingPowerTarget,
                format!("{power:?} requires an own slot"),
            )
        })?;
        validate_slot(state, seat, slot)?;
        Some(slot)
    } else {
        None
    };

    let opp = if power.requires_opponent() {
        let target = opponent.ok_or_else(|| {
            DomainError::validation(
                ValidationKind::MissingPowerTarget,
                format!("{power:?} requires an opponent"),
            )
        })?;
        let slot = opponent_slot.ok_or_else(|| {
            DomainError::validation(
                ValidationKind::MissingPowerTarget,
                format!("{power:?} requires an opponent slot"),
            )
        })?;
        if target == seat || target >= state.seat_count {
            return Err(DomainError::validation(
                ValidationKind::InvalidTarget,
                format!("Seat {target} is not a valid opponent"),
            ));
        }
        validate_slot(state, target, slot)?;
        Some((target, slot))
    } else {
        None
    };

    match power {
        PowerType::PeekOwn => {
            let slot = own.ok_or_else(|| {
                DomainError::validation_other("own slot lost after validation")
            })?;
            let round = state.current_round_mut()?;
            round.reveals.push(RevealGrant {
                viewer: seat,
                owner: seat,
                slot,
                source: RevealSource::PowerPeek,
                expiry: RevealExpiry::UntilViewerTurnStarts,
            });
            round.active_power = None;
            advance_turn(state)
        }
        PowerType::PeekOpponent => {
            let (target, slot) = opp.ok_or_else(|| {
                DomainError::validation_other("opponent target lost after validation")
            })?;
            let round = state.current_round_mut()?;
            round.reveals.push(RevealGrant {
                viewer: seat,
                owner: target,
                slot,
                source: RevealSource::PowerPeek,
                expiry: RevealExpiry::UntilViewerTurnStarts,
            });
            round.active_power = None;
            advance_turn(state)
        }
        PowerType::BlindSwap => {
            let own_slot = own.ok_or_else(|| {
                DomainError::validation_other("own slot lost after validation")
            })?;
            let (target, target_slot) = opp.ok_or_else(|| {
                DomainError::validation_other("opponent target lost after validation")
            })?;
            state.current_round_mut()?.active_power = None;
            swap_slots(state, seat, own_slot, target, target_slot)?;
            advance_turn(state)
        }
        PowerType::SeenSwap => {
            let own_slot = own.ok_or_else(|| {
                DomainError::validation_other("own slot lost after validation")
            })?;
            let (target, target_slot) = opp.ok_or_else(|| {
                DomainError::validation_other("opponent target lost after validation")
            })?;
            // Reveal first; the grant stands whether or not the swap is
            // committed. A second resolve commits, SkipPower declines.
            let round = state.current_round_mut()?;
            round.reveals.push(RevealGrant {
                viewer: seat,
                owner: target,
                slot: target_slot,
                source: RevealSource::SeenSwap,
                expiry: RevealExpiry::UntilViewerTurnStarts,
            });
            round.active_power = Some(PowerResolution::ConfirmingSeenSwap {
                own_slot,
                opponent: target,
                opponent_slot: target_slot,
            });
            Ok(())
        }
    }
}

fn commit_swap(
    state: &mut GameState,
    seat: Seat,
    own_slot: usize,
    opponent: Seat,
    opponent_slot: usize,
) -> Result<(), DomainError> {
    state.current_round_mut()?.active_power = None;
    swap_slots(state, seat, own_slot, opponent, opponent_slot)?;
    advance_turn(state)
}

fn swap_slots(
    state: &mut GameState,
    seat: Seat,
    own_slot: usize,
    opponent: Seat,
    opponent_slot: usize,
) -> Result<(), DomainError> {
    let round = state.current_round_mut()?;
    let own_card = round.hand(seat)?[own_slot].ok_or_else(|| {
        DomainError::validation(
            ValidationKind::VanishedSlot,
            format!("Seat {seat} slot {own_slot} was already vanished"),
        )
    })?;
    let opp_card = round.hand(opponent)?[opponent_slot].ok_or_else(|| {
        DomainError::validation(
            ValidationKind::VanishedSlot,
            format!("Seat {opponent} slot {opponent_slot} was already vanished"),
        )
    })?;
    round.hand_mut(seat)?[own_slot] = Some(opp_card);
    round.hand_mut(opponent)?[opponent_slot] = Some(own_card);
    visibility::revoke_slot(&mut round.reveals, seat, own_slot);
    visibility::revoke_slot(&mut round.reveals, opponent, opponent_slot);
    Ok(())
}

fn skip_power(state: &mut GameState, seat: Seat) -> Result<(), DomainError> {
    require_turn_phase(state, seat)?;

    let round = state.current_round_mut()?;
    if round.pending_power.is_none() && round.active_power.is_none() {
        return Err(DomainError::validation(
            ValidationKind::NoPowerPending,
            "No power to skip",
        ));
    }
    if let Some(drawn) = round.drawn.take() {
        round.discard_pile.push(drawn.card);
    }
    round.pending_power = None;
    round.active_power = None;
    advance_turn(state)
}
