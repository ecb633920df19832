//! In-memory `GameStore` for tests and single-process embedding.

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::GameStore;
use crate::domain::GameState;
use crate::error::EngineError;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};

#[derive(Default)]
pub struct MemoryStore {
    games: DashMap<Uuid, GameState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn insert(&self, state: GameState) -> Result<GameState, EngineError> {
        let game_id = state.game_id;
        match self.games.entry(game_id) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(DomainError::conflict(
                ConflictKind::Other("DUPLICATE_GAME".into()),
                format!("Game {game_id} already exists"),
            )
            .into()),
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                let stored = vacant.insert(state);
                Ok(stored.clone())
            }
        }
    }

    async fn load(&self, game_id: Uuid) -> Result<GameState, EngineError> {
        self.games
            .get(&game_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Game, format!("Unknown game {game_id}"))
                    .into()
            })
    }

    async fn commit_if_unchanged(
        &self,
        expected_version: u64,
        mut state: GameState,
    ) -> Result<GameState, EngineError> {
        let game_id = state.game_id;
        let mut entry = self.games.get_mut(&game_id).ok_or_else(|| {
            EngineError::from(DomainError::not_found(
                NotFoundKind::Game,
                format!("Unknown game {game_id}"),
            ))
        })?;

        if entry.version != expected_version {
            debug!(
                %game_id,
                expected_version,
                actual_version = entry.version,
                "Optimistic commit lost the race"
            );
            return Err(DomainError::conflict(
                ConflictKind::OptimisticLock,
                format!(
                    "Game {game_id} changed since read (expected version {expected_version}, actual {})",
                    entry.version
                ),
            )
            .into());
        }

        state.version = expected_version + 1;
        state.updated_at = OffsetDateTime::now_utc();
        *entry = state.clone();
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GameStatus;
    use crate::errors::ErrorCode;

    fn seed_game() -> GameState {
        crate::domain::test_state_helpers::waiting_game(2)
    }

    #[tokio::test]
    async fn insert_then_load_roundtrips() {
        let store = MemoryStore::new();
        let state = seed_game();
        store.insert(state.clone()).await.unwrap();
        let loaded = store.load(state.game_id).await.unwrap();
        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn duplicate_insert_rejected() {
        let store = MemoryStore::new();
        let state = seed_game();
        store.insert(state.clone()).await.unwrap();
        assert!(store.insert(state).await.is_err());
    }

    #[tokio::test]
    async fn load_unknown_game_not_found() {
        let store = MemoryStore::new();
        let err = store.load(Uuid::from_u128(99)).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::GameNotFound);
    }

    #[tokio::test]
    async fn commit_bumps_version() {
        let store = MemoryStore::new();
        let state = seed_game();
        store.insert(state.clone()).await.unwrap();

        let mut update = state.clone();
        update.status = GameStatus::Cancelled;
        let committed = store.commit_if_unchanged(1, update).await.unwrap();
        assert_eq!(committed.version, 2);
        assert_eq!(store.load(state.game_id).await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn stale_commit_conflicts() {
        let store = MemoryStore::new();
        let state = seed_game();
        store.insert(state.clone()).await.unwrap();
        store
            .commit_if_unchanged(1, state.clone())
            .await
            .unwrap();

        // A second writer still holding version 1 must lose.
        let err = store.commit_if_unchanged(1, state).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::StaleState);
        assert!(err.is_retryable());
    }
}
