//! Document store boundary: transactional `load` / `commit_if_unchanged`.
//!
//! The engine assumes nothing about the backing store beyond this contract:
//! one authoritative document per game, atomic compare-and-swap on the
//! document version. A commit against a stale version fails with
//! `ConflictKind::OptimisticLock`; the caller retries the whole
//! validate-then-write cycle against a fresh load.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::GameState;
use crate::error::EngineError;

pub mod memory;

pub use memory::MemoryStore;

#[async_trait]
pub trait GameStore: Send + Sync {
    /// Create the document for a new game. Fails if the game id exists.
    async fn insert(&self, state: GameState) -> Result<GameState, EngineError>;

    /// Load the current document.
    async fn load(&self, game_id: Uuid) -> Result<GameState, EngineError>;

    /// Write `state` only if the stored version still equals
    /// `expected_version`. Bumps the version and `updated_at` on success
    /// and returns the committed document.
    async fn commit_if_unchanged(
        &self,
        expected_version: u64,
        state: GameState,
    ) -> Result<GameState, EngineError>;
}
