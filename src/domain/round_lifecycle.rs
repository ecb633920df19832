//! Round start and completion: dealing, scoring hand-off, game finish.

use tracing::info;

use super::dealing::deal_round;
use super::rules::SETUP_PEEK_SLOTS;
use super::scoring::{apply_round_scoring, compute_outcome};
use super::seed_derivation::derive_dealing_seed;
use super::state::{GameState, GameStatus, RoundPhase, RoundState, Seat};
use super::visibility::{RevealExpiry, RevealGrant, RevealSource};
use crate::errors::domain::DomainError;

/// Deal round `round_no` and enter Setup.
///
/// Every seat gets a peek window over its own bottom two slots, recorded as
/// reveal grants that live until that seat confirms peek-complete.
pub fn start_round(state: &mut GameState, round_no: u8) -> Result<(), DomainError> {
    if state.rounds.len() != round_no as usize - 1 {
        return Err(DomainError::validation_other(format!(
            "Invariant violated: starting round {round_no} with {} rounds recorded",
            state.rounds.len()
        )));
    }

    let seat_count = state.seat_count;
    let seed = derive_dealing_seed(state.rng_seed, round_no);
    let deal = deal_round(seat_count as usize, seed)?;

    let mut reveals = Vec::with_capacity(seat_count as usize * SETUP_PEEK_SLOTS.len());
    for seat in 0..seat_count {
        for slot in SETUP_PEEK_SLOTS {
            reveals.push(RevealGrant {
                viewer: seat as Seat,
                owner: seat as Seat,
                slot,
                source: RevealSource::SetupPeek,
                expiry: RevealExpiry::UntilSetupConfirmed,
            });
        }
    }

    state.rounds.push(RoundState {
        round_no,
        phase: RoundPhase::Setup,
        turn: None,
        hands: deal.hands,
        draw_pile: deal.draw_pile,
        discard_pile: Vec::new(),
        drawn: None,
        pending_power: None,
        active_power: None,
        declared_by: None,
        setup_confirmed: vec![false; seat_count as usize],
        reveals,
        stock_cycles: 0,
        scores: None,
        declaration_correct: None,
    });
    state.current_round_no = round_no;

    info!(
        game_id = %state.game_id,
        round_no,
        "Round dealt, entering Setup"
    );
    Ok(())
}

/// Score the current round (already in Scoring) and either deal the next
/// round or finish the game, all within the same document mutation.
pub fn complete_round(state: &mut GameState) -> Result<(), DomainError> {
    apply_round_scoring(state)?;

    let finished_round = state.current_round_no;
    if finished_round < state.total_rounds {
        start_round(state, finished_round + 1)?;
    } else {
        let outcome = compute_outcome(state);
        info!(
            game_id = %state.game_id,
            round_no = finished_round,
            outcome = ?outcome,
            "Final round scored, game finished"
        );
        state.outcome = Some(outcome);
        state.status = GameStatus::Finished;
    }
    Ok(())
}
