//! Orchestration services bridging pure domain logic with the document
//! store, realtime feed, and ledger boundary.

pub mod game_flow;
pub mod games;

#[cfg(test)]
mod tests_game_flow;
#[cfg(test)]
mod tests_games;

pub use game_flow::GameFlowService;
pub use games::{GameService, NewPlayer};
