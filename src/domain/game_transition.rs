//! Edge-triggered lifecycle transitions derived from before/after state.
//!
//! The flow service compares the document it loaded against the document it
//! is about to commit and reacts to the edges (publishing, payout), instead
//! of scattering "did the game just end?" checks through the executors.

use super::state::{GameState, GameStatus, Seat};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLifecycleView {
    pub version: u64,
    pub status: GameStatus,
    pub turn: Option<Seat>,
}

impl GameLifecycleView {
    pub fn of(state: &GameState) -> Self {
        Self {
            version: state.version,
            status: state.status,
            turn: state
                .current_round()
                .ok()
                .and_then(|round| round.turn),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameTransition {
    /// Edge-triggered: the turn became a specific seat.
    TurnBecame { seat: Seat },

    /// Edge-triggered: Waiting -> Playing.
    GameStarted,

    /// Edge-triggered: Playing -> Finished.
    GameEnded,

    /// Edge-triggered: Waiting/Playing -> Cancelled.
    GameCancelled,
}

/// Derive domain transitions from before/after lifecycle state.
pub fn derive_game_transitions(
    before: &GameLifecycleView,
    after: &GameLifecycleView,
) -> Vec<GameTransition> {
    let mut transitions = Vec::new();

    if let Some(seat) = after.turn {
        if before.turn != Some(seat) {
            transitions.push(GameTransition::TurnBecame { seat });
        }
    }

    if before.status == GameStatus::Waiting && after.status == GameStatus::Playing {
        transitions.push(GameTransition::GameStarted);
    }

    if before.status != GameStatus::Finished && after.status == GameStatus::Finished {
        transitions.push(GameTransition::GameEnded);
    }

    if before.status != GameStatus::Cancelled && after.status == GameStatus::Cancelled {
        transitions.push(GameTransition::GameCancelled);
    }

    transitions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(status: GameStatus, turn: Option<Seat>) -> GameLifecycleView {
        GameLifecycleView {
            version: 1,
            status,
            turn,
        }
    }

    #[test]
    fn derive_game_started() {
        let before = view(GameStatus::Waiting, None);
        let after = view(GameStatus::Playing, None);
        let transitions = derive_game_transitions(&before, &after);
        assert!(transitions.contains(&GameTransition::GameStarted));
    }

    #[test]
    fn derive_game_ended() {
        let before = view(GameStatus::Playing, Some(2));
        let after = view(GameStatus::Finished, None);
        let transitions = derive_game_transitions(&before, &after);
        assert!(transitions.contains(&GameTransition::GameEnded));
    }

    #[test]
    fn derive_game_cancelled_without_start() {
        let before = view(GameStatus::Waiting, None);
        let after = view(GameStatus::Cancelled, None);
        let transitions = derive_game_transitions(&before, &after);
        assert!(transitions.contains(&GameTransition::GameCancelled));
        assert!(!transitions.contains(&GameTransition::GameStarted));
    }

    #[test]
    fn derive_turn_change() {
        let before = view(GameStatus::Playing, Some(0));
        let after = view(GameStatus::Playing, Some(1));
        let transitions = derive_game_transitions(&before, &after);
        assert!(transitions.contains(&GameTransition::TurnBecame { seat: 1 }));
    }

    #[test]
    fn repeated_finished_state_is_not_an_edge() {
        let before = view(GameStatus::Finished, None);
        let after = view(GameStatus::Finished, None);
        assert!(derive_game_transitions(&before, &after).is_empty());
    }
}
