//! Game lifecycle: creation, seat filling, cancellation, player views.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::domain::player_view::{player_snapshot, PlayerSnapshot};
use crate::domain::round_lifecycle::start_round;
use crate::domain::rules::{validate_seat_count, validate_total_rounds, validate_wager};
use crate::domain::state::PlayerInfo;
use crate::domain::{GameState, GameStatus};
use crate::error::EngineError;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::feed::GameFeed;
use crate::store::GameStore;

/// A joining player's identity, as supplied by the identity provider.
#[derive(Debug, Clone)]
pub struct NewPlayer {
    pub user_id: Uuid,
    pub username: String,
}

pub struct GameService {
    store: Arc<dyn GameStore>,
    feed: Arc<GameFeed>,
    config: EngineConfig,
}

impl GameService {
    pub fn new(store: Arc<dyn GameStore>, feed: Arc<GameFeed>, config: EngineConfig) -> Self {
        Self {
            store,
            feed,
            config,
        }
    }

    /// Create a Waiting game with the host seated at seat 0.
    pub async fn create_game(
        &self,
        host: NewPlayer,
        seat_count: u8,
        total_rounds: u8,
        wager_per_player: u64,
    ) -> Result<GameState, EngineError> {
        validate_seat_count(seat_count as usize)?;
        validate_total_rounds(total_rounds)?;
        validate_wager(wager_per_player)?;

        let now = OffsetDateTime::now_utc();
        let state = GameState {
            game_id: Uuid::new_v4(),
            status: GameStatus::Waiting,
            seat_count,
            players: vec![PlayerInfo {
                user_id: host.user_id,
                username: host.username,
                seat: 0,
            }],
            wager_per_player,
            total_rounds,
            current_round_no: 0,
            rounds: Vec::new(),
            cumulative_scores: vec![0; seat_count as usize],
            scambodia_calls: vec![0; seat_count as usize],
            outcome: None,
            payout_processed: false,
            rng_seed: rand::random(),
            applied_keys: Vec::new(),
            version: 1,
            created_at: now,
            updated_at: now,
        };

        let committed = self.store.insert(state).await?;
        info!(
            game_id = %committed.game_id,
            seat_count,
            total_rounds,
            wager_per_player,
            "Game created"
        );
        self.feed.publish(&committed);
        Ok(committed)
    }

    /// Seat a player. Once the last seat fills the game starts: round 1 is
    /// dealt into Setup within the same commit. Re-joining an already held
    /// seat is an idempotent no-op.
    pub async fn join_game(
        &self,
        game_id: Uuid,
        player: NewPlayer,
    ) -> Result<GameState, EngineError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut state = self.store.load(game_id).await?;

            if state.seat_of(player.user_id).is_some() {
                return Ok(state);
            }
            if state.status != GameStatus::Waiting {
                return Err(DomainError::validation(
                    ValidationKind::LifecycleMismatch,
                    format!("Game is {:?}, not joinable", state.status),
                )
                .into());
            }
            if state.seats_filled() {
                return Err(DomainError::conflict(
                    ConflictKind::SeatTaken,
                    "All seats are taken",
                )
                .into());
            }

            let seat = state.players.len() as u8;
            state.players.push(PlayerInfo {
                user_id: player.user_id,
                username: player.username.clone(),
                seat,
            });
            if state.seats_filled() {
                state.status = GameStatus::Playing;
                start_round(&mut state, 1)?;
            }

            let expected = state.version;
            match self.store.commit_if_unchanged(expected, state).await {
                Ok(committed) => {
                    info!(
                        %game_id,
                        user_id = %player.user_id,
                        seat,
                        started = committed.status == GameStatus::Playing,
                        "Player seated"
                    );
                    self.feed.publish(&committed);
                    return Ok(committed);
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_commit_retries => {
                    warn!(%game_id, attempt, "Join lost a commit race, retrying");
                    continue;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Administrative cancellation of a Waiting/Playing game. No payout
    /// fires for a cancelled game; refund policy belongs to the ledger.
    /// Cancelling an already cancelled game is an idempotent no-op.
    pub async fn cancel_game(&self, game_id: Uuid) -> Result<GameState, EngineError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut state = self.store.load(game_id).await?;

            match state.status {
                GameStatus::Cancelled => return Ok(state),
                GameStatus::Finished => {
                    return Err(DomainError::validation(
                        ValidationKind::LifecycleMismatch,
                        "A finished game cannot be cancelled",
                    )
                    .into());
                }
                GameStatus::Waiting | GameStatus::Playing => {}
            }

            state.status = GameStatus::Cancelled;
            if let Ok(round) = state.current_round_mut() {
                round.turn = None;
            }

            let expected = state.version;
            match self.store.commit_if_unchanged(expected, state).await {
                Ok(committed) => {
                    info!(%game_id, "Game cancelled");
                    self.feed.publish(&committed);
                    return Ok(committed);
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_commit_retries => {
                    warn!(%game_id, attempt, "Cancel lost a commit race, retrying");
                    continue;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Redacted per-seat view of the current document.
    pub async fn player_view(
        &self,
        game_id: Uuid,
        user_id: Uuid,
    ) -> Result<PlayerSnapshot, EngineError> {
        let state = self.store.load(game_id).await?;
        Ok(player_snapshot(&state, user_id)?)
    }
}
