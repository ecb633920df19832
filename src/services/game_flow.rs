//! Action handling: the load → validate → apply → commit-if-unchanged loop.
//!
//! The engine is stateless between invocations; every attempt re-reads the
//! document and re-derives all validation from it, so losing an optimistic
//! race costs nothing but the retry. Publication and the payout trigger run
//! only after a successful commit, reacting to lifecycle edges derived from
//! the before/after documents.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::domain::actions::apply_action;
use crate::domain::game_transition::{derive_game_transitions, GameLifecycleView, GameTransition};
use crate::domain::{GameState, GameStatus};
use crate::error::EngineError;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
use crate::feed::GameFeed;
use crate::payout::{LedgerService, PayoutRequest};
use crate::protocol::{ActionRequest, ActionResponse};
use crate::store::GameStore;

pub struct GameFlowService {
    store: Arc<dyn GameStore>,
    feed: Arc<GameFeed>,
    ledger: Arc<dyn LedgerService>,
    config: EngineConfig,
}

impl GameFlowService {
    pub fn new(
        store: Arc<dyn GameStore>,
        feed: Arc<GameFeed>,
        ledger: Arc<dyn LedgerService>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            feed,
            ledger,
            config,
        }
    }

    /// Validate and apply one action request.
    ///
    /// Replays (same idempotency key) and requests addressed to a
    /// superseded round or an already-terminal game return
    /// `AlreadyApplied`, never an error, so client retries are safe.
    pub async fn handle_action(
        &self,
        request: &ActionRequest,
    ) -> Result<ActionResponse, EngineError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut state = self.store.load(request.game_id).await?;

            if let Some(response) = already_applied(&state, request) {
                return Ok(response);
            }

            if state.status == GameStatus::Playing && request.round_no > state.current_round_no {
                return Err(DomainError::validation(
                    ValidationKind::FutureRound,
                    format!(
                        "Round {} has not started (current round {})",
                        request.round_no, state.current_round_no
                    ),
                )
                .into());
            }

            let seat = state.seat_of(request.user_id).ok_or_else(|| {
                DomainError::not_found(
                    NotFoundKind::Player,
                    format!(
                        "User {} is not seated in game {}",
                        request.user_id, request.game_id
                    ),
                )
            })?;

            let before = GameLifecycleView::of(&state);
            apply_action(&mut state, seat, &request.action)?;
            state.record_applied_key(request.idempotency_key);

            let after = GameLifecycleView::of(&state);
            let transitions = derive_game_transitions(&before, &after);
            let payout = self.arm_payout(&mut state, &transitions)?;

            let expected = state.version;
            match self.store.commit_if_unchanged(expected, state).await {
                Ok(committed) => {
                    debug!(
                        game_id = %request.game_id,
                        seat,
                        version = committed.version,
                        ?transitions,
                        "Action committed"
                    );
                    self.feed.publish(&committed);
                    if let Some(payout) = payout {
                        self.fire_payout(payout).await;
                    }
                    return Ok(ActionResponse::applied(committed.version));
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_commit_retries => {
                    warn!(
                        game_id = %request.game_id,
                        attempt,
                        "Commit lost the race, retrying against fresh state"
                    );
                    continue;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// On the edge into Finished, latch `payout_processed` inside the same
    /// commit and hand back the request to fire once the commit lands. The
    /// latch means a replayed or retried finishing write can never arm a
    /// second payout.
    fn arm_payout(
        &self,
        state: &mut GameState,
        transitions: &[GameTransition],
    ) -> Result<Option<PayoutRequest>, EngineError> {
        if !transitions.contains(&GameTransition::GameEnded) || state.payout_processed {
            return Ok(None);
        }
        let outcome = state.outcome.clone().ok_or_else(|| {
            EngineError::from(DomainError::validation_other(
                "Invariant violated: finished game without an outcome",
            ))
        })?;
        state.payout_processed = true;
        Ok(Some(PayoutRequest {
            game_id: state.game_id,
            outcome,
            amount: state.total_pot(),
        }))
    }

    async fn fire_payout(&self, request: PayoutRequest) {
        let game_id = request.game_id;
        info!(
            %game_id,
            amount = request.amount,
            outcome = ?request.outcome,
            "Requesting payout"
        );
        match self.ledger.request_payout(request).await {
            Ok(true) => {}
            Ok(false) => warn!(
                %game_id,
                "Ledger rejected the payout request; retry is the ledger's responsibility"
            ),
            Err(err) => warn!(
                %game_id,
                error = %err,
                "Payout request failed; retry is the ledger's responsibility"
            ),
        }
    }
}

/// Success-no-op policy: replayed keys, terminal games, and superseded
/// rounds were all "already applied" from the client's point of view.
fn already_applied(state: &GameState, request: &ActionRequest) -> Option<ActionResponse> {
    if state.applied_keys.contains(&request.idempotency_key) {
        return Some(ActionResponse::already_applied(state.version));
    }
    if matches!(state.status, GameStatus::Finished | GameStatus::Cancelled) {
        return Some(ActionResponse::already_applied(state.version));
    }
    if state.status == GameStatus::Playing && request.round_no < state.current_round_no {
        return Some(ActionResponse::already_applied(state.version));
    }
    None
}

/// Surface of [`GameFlowService::handle_action`] errors that callers may
/// retry after a refresh, kept here for embedders mapping to transports.
pub fn is_stale_state(err: &EngineError) -> bool {
    matches!(
        err,
        EngineError::Domain(DomainError::Conflict(ConflictKind::OptimisticLock, _))
    )
}
