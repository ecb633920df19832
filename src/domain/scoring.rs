//! Round scoring, cumulative totals, and game outcome computation.

use super::cards_types::Card;
use super::rules::HAND_SLOTS;
use super::state::{GameOutcome, GameState, RoundPhase, Seat};
use crate::errors::domain::DomainError;

/// A hand's round score: sum of remaining (non-null) slot values.
pub fn round_score(hand: &[Option<Card>; HAND_SLOTS]) -> i16 {
    hand.iter().flatten().map(|c| c.point_value()).sum()
}

/// Apply per-round scoring and transition the round to Complete.
///
/// No-ops unless the current round is in Scoring, so a replayed call can
/// never double-count.
pub fn apply_round_scoring(state: &mut GameState) -> Result<(), DomainError> {
    let seat_count = state.seat_count as usize;
    let round = state.current_round_mut()?;
    if round.phase != RoundPhase::Scoring {
        return Ok(());
    }

    let scores: Vec<i16> = (0..seat_count)
        .map(|seat| round_score(&round.hands[seat]))
        .collect();

    if let Some(declarer) = round.declared_by {
        let declarer_score = scores[declarer as usize];
        let strict_lowest = scores
            .iter()
            .enumerate()
            .all(|(seat, s)| seat == declarer as usize || *s > declarer_score);
        round.declaration_correct = Some(strict_lowest);
        if strict_lowest {
            state.scambodia_calls[declarer as usize] += 1;
        }
    }

    let round = state.current_round_mut()?;
    round.scores = Some(scores.clone());
    round.phase = RoundPhase::Complete;
    round.turn = None;

    for (seat, score) in scores.iter().enumerate() {
        state.cumulative_scores[seat] += score;
    }
    Ok(())
}

/// Final game outcome: lowest cumulative score wins; ties broken by the
/// higher correct-declaration count; a remaining tie is an explicit draw.
pub fn compute_outcome(state: &GameState) -> GameOutcome {
    let lowest = state
        .cumulative_scores
        .iter()
        .copied()
        .min()
        .unwrap_or_default();
    let contenders: Vec<Seat> = state
        .cumulative_scores
        .iter()
        .enumerate()
        .filter(|(_, s)| **s == lowest)
        .map(|(seat, _)| seat as Seat)
        .collect();

    if contenders.len() == 1 {
        return GameOutcome::Winner { seat: contenders[0] };
    }

    let best_calls = contenders
        .iter()
        .map(|seat| state.scambodia_calls[*seat as usize])
        .max()
        .unwrap_or_default();
    let finalists: Vec<Seat> = contenders
        .into_iter()
        .filter(|seat| state.scambodia_calls[*seat as usize] == best_calls)
        .collect();

    if finalists.len() == 1 {
        GameOutcome::Winner { seat: finalists[0] }
    } else {
        GameOutcome::Draw { seats: finalists }
    }
}
