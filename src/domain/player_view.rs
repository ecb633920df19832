//! Per-player redacted view of game state.
//!
//! The persisted document holds every card face; clients must only ever see
//! the faces their seat holds a reveal grant for (plus the public discard
//! top). Grants are purged eagerly at the mutations that expire them, so a
//! snapshot built from a freshly loaded document is always current.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cards_types::Card;
use super::powers::{PowerResolution, PowerType};
use super::rules::HAND_SLOTS;
use super::state::{DrawSource, GameOutcome, GameState, GameStatus, RoundPhase, Seat};
use super::visibility::can_see;
use crate::errors::domain::{DomainError, NotFoundKind};

/// What the viewer sees in one hand slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "card", rename_all = "snake_case")]
pub enum SlotView {
    /// Occupied, face unknown to the viewer.
    Hidden,
    /// Permanently vanished via a successful match.
    Vanished,
    /// Face revealed to the viewer.
    Visible(Card),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandView {
    pub seat: Seat,
    pub slots: [SlotView; HAND_SLOTS],
}

/// Fieldless action hints; the presentation layer derives its affordances
/// from these instead of re-implementing legality rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    ConfirmSetupPeek,
    DrawFromDeck,
    DrawFromDiscard,
    ExchangeCard,
    DiscardDrawnCard,
    AttemptMatch,
    DeclareScambodia,
    InitiatePower,
    ResolvePowerTarget,
    SkipPower,
}

/// Everything one seat may know at a decision point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub game_id: Uuid,
    pub viewer: Seat,
    pub status: GameStatus,
    /// 0 while the game is still Waiting.
    pub round_no: u8,
    pub phase: Option<RoundPhase>,
    pub to_act: Option<Seat>,
    pub hands: Vec<HandView>,
    pub draw_pile_size: usize,
    pub discard_top: Option<Card>,
    pub discard_size: usize,
    /// Face of the outstanding drawn card, only when the viewer drew it.
    pub drawn_card: Option<Card>,
    pub drawn_outstanding: bool,
    /// Power offered by the viewer's current deck-draw.
    pub pending_power: Option<PowerType>,
    pub awaiting_power_targets: bool,
    pub declared_by: Option<Seat>,
    pub cumulative_scores: Vec<i16>,
    pub scambodia_calls: Vec<u8>,
    pub round_scores: Option<Vec<i16>>,
    pub outcome: Option<GameOutcome>,
    pub available_actions: Vec<ActionKind>,
    pub version: u64,
}

/// Build the redacted snapshot for `viewer_user`.
pub fn player_snapshot(
    state: &GameState,
    viewer_user: Uuid,
) -> Result<PlayerSnapshot, DomainError> {
    let viewer = state.seat_of(viewer_user).ok_or_else(|| {
        DomainError::not_found(
            NotFoundKind::Player,
            format!("User {viewer_user} is not seated in game {}", state.game_id),
        )
    })?;

    let Ok(round) = state.current_round() else {
        // Waiting: no round dealt yet.
        return Ok(PlayerSnapshot {
            game_id: state.game_id,
            viewer,
            status: state.status,
            round_no: 0,
            phase: None,
            to_act: None,
            hands: Vec::new(),
            draw_pile_size: 0,
            discard_top: None,
            discard_size: 0,
            drawn_card: None,
            drawn_outstanding: false,
            pending_power: None,
            awaiting_power_targets: false,
            declared_by: None,
            cumulative_scores: state.cumulative_scores.clone(),
            scambodia_calls: state.scambodia_calls.clone(),
            round_scores: None,
            outcome: state.outcome.clone(),
            available_actions: Vec::new(),
            version: state.version,
        });
    };

    let hands = round
        .hands
        .iter()
        .enumerate()
        .map(|(owner, hand)| {
            let owner = owner as Seat;
            let mut slots = [SlotView::Hidden; HAND_SLOTS];
            for (slot, occupant) in hand.iter().enumerate() {
                slots[slot] = match occupant {
                    None => SlotView::Vanished,
                    Some(card) if can_see(&round.reveals, viewer, owner, slot) => {
                        SlotView::Visible(*card)
                    }
                    Some(_) => SlotView::Hidden,
                };
            }
            HandView { seat: owner, slots }
        })
        .collect();

    let viewer_holds_draw = round.drawn.is_some_and(|d| d.owner == viewer);

    Ok(PlayerSnapshot {
        game_id: state.game_id,
        viewer,
        status: state.status,
        round_no: round.round_no,
        phase: Some(round.phase),
        to_act: round.turn,
        hands,
        draw_pile_size: round.draw_pile.len(),
        discard_top: round.discard_top(),
        discard_size: round.discard_pile.len(),
        drawn_card: round.drawn.filter(|d| d.owner == viewer).map(|d| d.card),
        drawn_outstanding: round.drawn.is_some(),
        pending_power: if viewer_holds_draw || round.turn == Some(viewer) {
            round.pending_power
        } else {
            None
        },
        awaiting_power_targets: round.active_power.is_some(),
        declared_by: round.declared_by,
        cumulative_scores: state.cumulative_scores.clone(),
        scambodia_calls: state.scambodia_calls.clone(),
        round_scores: round.scores.clone(),
        outcome: state.outcome.clone(),
        available_actions: legal_action_kinds(state, viewer),
        version: state.version,
    })
}

/// Action kinds currently legal for `seat`, for presentation hints only.
/// The executor remains the authority; these mirror its guards.
pub fn legal_action_kinds(state: &GameState, seat: Seat) -> Vec<ActionKind> {
    if state.status != GameStatus::Playing {
        return Vec::new();
    }
    let Ok(round) = state.current_round() else {
        return Vec::new();
    };

    match round.phase {
        RoundPhase::Setup => {
            if round.setup_confirmed.get(seat as usize) == Some(&false) {
                vec![ActionKind::ConfirmSetupPeek]
            } else {
                Vec::new()
            }
        }
        RoundPhase::Playing | RoundPhase::FinalTurn => {
            if round.turn != Some(seat) {
                return Vec::new();
            }
            if let Some(active) = &round.active_power {
                return match active {
                    PowerResolution::SelectingTarget { .. }
                    | PowerResolution::ConfirmingSeenSwap { .. } => {
                        vec![ActionKind::ResolvePowerTarget, ActionKind::SkipPower]
                    }
                };
            }
            if let Some(drawn) = round.drawn {
                let mut kinds = vec![ActionKind::ExchangeCard];
                if drawn.source == DrawSource::Deck {
                    kinds.push(ActionKind::DiscardDrawnCard);
                    kinds.push(ActionKind::AttemptMatch);
                    if round.pending_power.is_some() {
                        kinds.push(ActionKind::InitiatePower);
                        kinds.push(ActionKind::SkipPower);
                    }
                }
                return kinds;
            }
            if round.pending_power.is_some() {
                return vec![ActionKind::InitiatePower, ActionKind::SkipPower];
            }
            let mut kinds = vec![ActionKind::DrawFromDeck];
            if !round.discard_pile.is_empty() {
                kinds.push(ActionKind::DrawFromDiscard);
            }
            if round.phase == RoundPhase::Playing && round.declared_by.is_none() {
                kinds.push(ActionKind::DeclareScambodia);
            }
            kinds
        }
        RoundPhase::Scoring | RoundPhase::Complete => Vec::new(),
    }
}
