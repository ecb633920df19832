use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio_stream::StreamExt;
use uuid::Uuid;

use super::game_flow::GameFlowService;
use super::games::{GameService, NewPlayer};
use crate::config::EngineConfig;
use crate::domain::{GameState, GameStatus, PlayerAction, RoundPhase, Seat};
use crate::error::EngineError;
use crate::errors::domain::{ConflictKind, DomainError};
use crate::errors::ErrorCode;
use crate::feed::GameFeed;
use crate::payout::RecordingLedger;
use crate::protocol::{ActionOutcome, ActionRequest};
use crate::store::{GameStore, MemoryStore};

struct Harness {
    store: Arc<dyn GameStore>,
    games: GameService,
    flow: GameFlowService,
    ledger: Arc<RecordingLedger>,
    feed: Arc<GameFeed>,
}

fn harness_with_store(store: Arc<dyn GameStore>) -> Harness {
    let feed = Arc::new(GameFeed::new(64));
    let ledger = Arc::new(RecordingLedger::new());
    Harness {
        games: GameService::new(store.clone(), feed.clone(), EngineConfig::default()),
        flow: GameFlowService::new(
            store.clone(),
            feed.clone(),
            ledger.clone(),
            EngineConfig::default(),
        ),
        store,
        ledger,
        feed,
    }
}

fn harness() -> Harness {
    harness_with_store(Arc::new(MemoryStore::new()))
}

fn user(seat: Seat) -> Uuid {
    Uuid::from_u128(0xACE0 + seat as u128)
}

fn player(seat: Seat) -> NewPlayer {
    NewPlayer {
        user_id: user(seat),
        username: format!("user-{seat}"),
    }
}

impl Harness {
    /// Create and fill a 2-player game; round 1 sits in Setup.
    async fn two_player_game(&self) -> GameState {
        let created = self.games.create_game(player(0), 2, 1, 500).await.unwrap();
        self.games.join_game(created.game_id, player(1)).await.unwrap()
    }

    async fn act(&self, state: &GameState, seat: Seat, action: PlayerAction) -> ActionRequest {
        let request = ActionRequest {
            game_id: state.game_id,
            user_id: user(seat),
            round_no: state.current_round_no,
            action,
            idempotency_key: Uuid::new_v4(),
        };
        self.flow.handle_action(&request).await.unwrap();
        request
    }

    async fn game(&self, game_id: Uuid) -> GameState {
        self.store.load(game_id).await.unwrap()
    }

    /// Drive a freshly set-up 2-player game to Finished.
    async fn finish_two_player_game(&self, state: &GameState) -> ActionRequest {
        self.act(state, 0, PlayerAction::ConfirmSetupPeek).await;
        self.act(state, 1, PlayerAction::ConfirmSetupPeek).await;

        let live = self.game(state.game_id).await;
        let declarer = live.current_round().unwrap().turn.unwrap();
        let other = (declarer + 1) % 2;
        self.act(&live, declarer, PlayerAction::DeclareScambodia).await;
        self.act(&live, other, PlayerAction::DrawFromDeck).await;
        // This exchange ends the final turn, scores the round, and
        // finishes the game in one commit.
        self.act(&live, other, PlayerAction::ExchangeCard { slot: 0 }).await
    }
}

#[tokio::test]
async fn actions_advance_the_document_version() {
    let harness = harness();
    let state = harness.two_player_game().await;
    let version_before = state.version;

    harness.act(&state, 0, PlayerAction::ConfirmSetupPeek).await;
    let after = harness.game(state.game_id).await;
    assert_eq!(after.version, version_before + 1);

    harness.act(&state, 1, PlayerAction::ConfirmSetupPeek).await;
    let after = harness.game(state.game_id).await;
    assert_eq!(after.version, version_before + 2);
    assert_eq!(after.current_round().unwrap().phase, RoundPhase::Playing);
}

#[tokio::test]
async fn replayed_idempotency_key_is_a_noop() {
    let harness = harness();
    let state = harness.two_player_game().await;

    let request = harness.act(&state, 0, PlayerAction::ConfirmSetupPeek).await;
    let snapshot = harness.game(state.game_id).await;

    let replay = harness.flow.handle_action(&request).await.unwrap();
    assert_eq!(replay.outcome, ActionOutcome::AlreadyApplied);
    assert_eq!(replay.version, snapshot.version);
    assert_eq!(harness.game(state.game_id).await, snapshot);
}

#[tokio::test]
async fn superseded_round_is_a_noop() {
    let harness = harness();
    let state = harness.two_player_game().await;
    harness.act(&state, 0, PlayerAction::ConfirmSetupPeek).await;
    harness.act(&state, 1, PlayerAction::ConfirmSetupPeek).await;

    let stale = ActionRequest {
        game_id: state.game_id,
        user_id: user(0),
        round_no: 0,
        action: PlayerAction::DrawFromDeck,
        idempotency_key: Uuid::new_v4(),
    };
    let response = harness.flow.handle_action(&stale).await.unwrap();
    assert_eq!(response.outcome, ActionOutcome::AlreadyApplied);
}

#[tokio::test]
async fn future_round_rejected() {
    let harness = harness();
    let state = harness.two_player_game().await;

    let request = ActionRequest {
        game_id: state.game_id,
        user_id: user(0),
        round_no: 2,
        action: PlayerAction::ConfirmSetupPeek,
        idempotency_key: Uuid::new_v4(),
    };
    let err = harness.flow.handle_action(&request).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::FutureRound);
}

#[tokio::test]
async fn wrong_turn_surfaces_specific_reason() {
    let harness = harness();
    let state = harness.two_player_game().await;
    harness.act(&state, 0, PlayerAction::ConfirmSetupPeek).await;
    harness.act(&state, 1, PlayerAction::ConfirmSetupPeek).await;

    let live = harness.game(state.game_id).await;
    let bystander = (live.current_round().unwrap().turn.unwrap() + 1) % 2;
    let request = ActionRequest {
        game_id: state.game_id,
        user_id: user(bystander),
        round_no: 1,
        action: PlayerAction::DrawFromDeck,
        idempotency_key: Uuid::new_v4(),
    };
    let err = harness.flow.handle_action(&request).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::OutOfTurn);
    // Nothing mutated, nothing consumed.
    assert_eq!(harness.game(state.game_id).await, live);
}

#[tokio::test]
async fn unknown_game_and_stranger_are_not_found() {
    let harness = harness();
    let state = harness.two_player_game().await;

    let request = ActionRequest {
        game_id: Uuid::from_u128(0xBAD),
        user_id: user(0),
        round_no: 1,
        action: PlayerAction::ConfirmSetupPeek,
        idempotency_key: Uuid::new_v4(),
    };
    let err = harness.flow.handle_action(&request).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::GameNotFound);

    let request = ActionRequest {
        game_id: state.game_id,
        user_id: Uuid::from_u128(0xBAD),
        round_no: 1,
        action: PlayerAction::ConfirmSetupPeek,
        idempotency_key: Uuid::new_v4(),
    };
    let err = harness.flow.handle_action(&request).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::PlayerNotFound);
}

#[tokio::test]
async fn finished_game_pays_out_exactly_once() {
    let harness = harness();
    let state = harness.two_player_game().await;
    let finishing_request = harness.finish_two_player_game(&state).await;

    let finished = harness.game(state.game_id).await;
    assert_eq!(finished.status, GameStatus::Finished);
    assert!(finished.payout_processed);
    assert!(finished.outcome.is_some());

    let payouts = harness.ledger.requests();
    assert_eq!(payouts.len(), 1);
    assert_eq!(payouts[0].game_id, state.game_id);
    assert_eq!(payouts[0].amount, 1000);
    assert_eq!(Some(&payouts[0].outcome), finished.outcome.as_ref());

    // Replaying the finishing action cannot re-trigger the payout.
    let replay = harness.flow.handle_action(&finishing_request).await.unwrap();
    assert_eq!(replay.outcome, ActionOutcome::AlreadyApplied);
    assert_eq!(harness.ledger.requests().len(), 1);

    // Any fresh action against the finished game is a safe no-op too.
    let late = ActionRequest {
        game_id: state.game_id,
        user_id: user(0),
        round_no: 1,
        action: PlayerAction::DrawFromDeck,
        idempotency_key: Uuid::new_v4(),
    };
    let response = harness.flow.handle_action(&late).await.unwrap();
    assert_eq!(response.outcome, ActionOutcome::AlreadyApplied);
    assert_eq!(harness.ledger.requests().len(), 1);
}

#[tokio::test]
async fn feed_receives_committed_documents_in_order() {
    let harness = harness();
    let state = harness.two_player_game().await;
    let mut stream = harness.feed.subscribe(state.game_id);

    harness.act(&state, 0, PlayerAction::ConfirmSetupPeek).await;
    harness.act(&state, 1, PlayerAction::ConfirmSetupPeek).await;

    let first = stream.next().await.unwrap().unwrap();
    let second = stream.next().await.unwrap().unwrap();
    assert!(first.version < second.version);
    assert_eq!(second.current_round().unwrap().phase, RoundPhase::Playing);
}

// ---- Optimistic conflict handling ----

/// Store decorator that makes the next `fail_next` commits lose the race.
struct ContendedStore {
    inner: MemoryStore,
    fail_next: AtomicU32,
}

impl ContendedStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_next: AtomicU32::new(0),
        }
    }

    fn arm(&self, fail_next: u32) {
        self.fail_next.store(fail_next, Ordering::SeqCst);
    }
}

#[async_trait]
impl GameStore for ContendedStore {
    async fn insert(&self, state: GameState) -> Result<GameState, EngineError> {
        self.inner.insert(state).await
    }

    async fn load(&self, game_id: Uuid) -> Result<GameState, EngineError> {
        self.inner.load(game_id).await
    }

    async fn commit_if_unchanged(
        &self,
        expected_version: u64,
        state: GameState,
    ) -> Result<GameState, EngineError> {
        let remaining = self.fail_next.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_next.store(remaining - 1, Ordering::SeqCst);
            return Err(DomainError::conflict(
                ConflictKind::OptimisticLock,
                "Injected contention",
            )
            .into());
        }
        self.inner.commit_if_unchanged(expected_version, state).await
    }
}

#[tokio::test]
async fn transient_conflicts_are_retried_invisibly() {
    let store = Arc::new(ContendedStore::new());
    let harness = harness_with_store(store.clone());
    let state = harness.two_player_game().await;
    store.arm(2);

    let response = harness
        .flow
        .handle_action(&ActionRequest {
            game_id: state.game_id,
            user_id: user(0),
            round_no: 1,
            action: PlayerAction::ConfirmSetupPeek,
            idempotency_key: Uuid::new_v4(),
        })
        .await
        .unwrap();
    assert_eq!(response.outcome, ActionOutcome::Applied);
}

#[tokio::test]
async fn exhausted_retries_surface_stale_state() {
    let store = Arc::new(ContendedStore::new());
    let harness = harness_with_store(store.clone());
    let state = harness.two_player_game().await;
    store.arm(u32::MAX);

    let err = harness
        .flow
        .handle_action(&ActionRequest {
            game_id: state.game_id,
            user_id: user(0),
            round_no: 1,
            action: PlayerAction::ConfirmSetupPeek,
            idempotency_key: Uuid::new_v4(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::StaleState);
    assert!(super::game_flow::is_stale_state(&err));
}
