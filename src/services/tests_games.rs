use std::sync::Arc;

use uuid::Uuid;

use super::games::{GameService, NewPlayer};
use crate::config::EngineConfig;
use crate::domain::player_view::SlotView;
use crate::domain::{GameStatus, RoundPhase};
use crate::errors::ErrorCode;
use crate::feed::GameFeed;
use crate::store::MemoryStore;

fn service() -> GameService {
    GameService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(GameFeed::new(16)),
        EngineConfig::default(),
    )
}

fn player(tag: u128) -> NewPlayer {
    NewPlayer {
        user_id: Uuid::from_u128(tag),
        username: format!("user-{tag}"),
    }
}

#[tokio::test]
async fn create_validates_parameters() {
    let games = service();
    assert!(games.create_game(player(1), 1, 1, 100).await.is_err());
    assert!(games.create_game(player(1), 5, 1, 100).await.is_err());
    assert!(games.create_game(player(1), 2, 2, 100).await.is_err());
    assert!(games.create_game(player(1), 2, 1, 0).await.is_err());
    assert!(games.create_game(player(1), 2, 1, 100).await.is_ok());
}

#[tokio::test]
async fn game_starts_when_last_seat_fills() {
    let games = service();
    let created = games.create_game(player(1), 3, 3, 250).await.unwrap();
    assert_eq!(created.status, GameStatus::Waiting);
    assert_eq!(created.players.len(), 1);

    let after_second = games.join_game(created.game_id, player(2)).await.unwrap();
    assert_eq!(after_second.status, GameStatus::Waiting);

    let started = games.join_game(created.game_id, player(3)).await.unwrap();
    assert_eq!(started.status, GameStatus::Playing);
    assert_eq!(started.current_round_no, 1);
    let round = started.current_round().unwrap();
    assert_eq!(round.phase, RoundPhase::Setup);
    assert_eq!(round.hands.len(), 3);
}

#[tokio::test]
async fn rejoining_a_held_seat_is_noop() {
    let games = service();
    let created = games.create_game(player(1), 2, 1, 100).await.unwrap();
    let again = games.join_game(created.game_id, player(1)).await.unwrap();
    assert_eq!(again.players.len(), 1);
}

#[tokio::test]
async fn join_after_start_rejected() {
    let games = service();
    let created = games.create_game(player(1), 2, 1, 100).await.unwrap();
    games.join_game(created.game_id, player(2)).await.unwrap();

    let err = games
        .join_game(created.game_id, player(3))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::LifecycleMismatch);
}

#[tokio::test]
async fn cancel_is_idempotent_but_finished_games_stay_finished() {
    let games = service();
    let created = games.create_game(player(1), 2, 1, 100).await.unwrap();

    let cancelled = games.cancel_game(created.game_id).await.unwrap();
    assert_eq!(cancelled.status, GameStatus::Cancelled);
    assert!(!cancelled.payout_processed);

    let again = games.cancel_game(created.game_id).await.unwrap();
    assert_eq!(again.version, cancelled.version, "second cancel is a no-op");
}

#[tokio::test]
async fn player_view_redacts_unrevealed_faces() {
    let games = service();
    let created = games.create_game(player(1), 2, 1, 100).await.unwrap();
    let started = games.join_game(created.game_id, player(2)).await.unwrap();
    assert_eq!(started.current_round().unwrap().phase, RoundPhase::Setup);

    let view = games
        .player_view(created.game_id, Uuid::from_u128(1))
        .await
        .unwrap();
    assert_eq!(view.viewer, 0);
    // Own bottom two visible during the Setup peek, top two hidden.
    let own = &view.hands[0];
    assert!(matches!(own.slots[0], SlotView::Hidden));
    assert!(matches!(own.slots[1], SlotView::Hidden));
    assert!(matches!(own.slots[2], SlotView::Visible(_)));
    assert!(matches!(own.slots[3], SlotView::Visible(_)));
    // Nothing of the opponent's hand is visible.
    assert!(view.hands[1]
        .slots
        .iter()
        .all(|slot| matches!(slot, SlotView::Hidden)));
}

#[tokio::test]
async fn player_view_for_stranger_rejected() {
    let games = service();
    let created = games.create_game(player(1), 2, 1, 100).await.unwrap();
    let err = games
        .player_view(created.game_id, Uuid::from_u128(42))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PlayerNotFound);
}
