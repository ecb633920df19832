#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

//! Authoritative game-state engine for Scambodia: a concurrent state
//! machine over a single per-game document, with per-player visibility,
//! a special-power sub-protocol, and at-most-once payout arithmetic.

pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod feed;
pub mod payout;
pub mod protocol;
pub mod services;
pub mod store;
pub mod telemetry;

#[cfg(test)]
pub mod test_bootstrap;

// Re-exports for public API
pub use config::EngineConfig;
pub use domain::player_view::{player_snapshot, PlayerSnapshot};
pub use domain::{GameOutcome, GameState, GameStatus, PlayerAction, RoundPhase, Seat};
pub use error::EngineError;
pub use errors::{DomainError, ErrorCode};
pub use feed::GameFeed;
pub use payout::{LedgerService, PayoutRequest, RecordingLedger};
pub use protocol::{ActionOutcome, ActionRequest, ActionResponse};
pub use services::{GameFlowService, GameService, NewPlayer};
pub use store::{GameStore, MemoryStore};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
