//! Ledger boundary: the at-most-once payout trigger.
//!
//! The engine emits one payout request per finished game, gated by the
//! document's `payout_processed` latch. Crediting funds, retrying transient
//! failures, and recording the transaction are the ledger's concerns.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::GameOutcome;
use crate::error::EngineError;

/// One payout instruction. A drawn game carries the tied seats so the
/// ledger can split the pot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRequest {
    pub game_id: Uuid,
    pub outcome: GameOutcome,
    /// Total pot: wager per player times seat count, in minor units.
    pub amount: u64,
}

#[async_trait]
pub trait LedgerService: Send + Sync {
    /// Invoked at most once per game by the engine. Returns whether the
    /// ledger accepted the request; rejection or failure is the ledger's to
    /// retry — the engine never re-fires.
    async fn request_payout(&self, request: PayoutRequest) -> Result<bool, EngineError>;
}

/// Recording in-memory ledger for tests and embedding demos.
#[derive(Default)]
pub struct RecordingLedger {
    reject: bool,
    requests: Mutex<Vec<PayoutRequest>>,
}

impl RecordingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger that records but rejects every request.
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<PayoutRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LedgerService for RecordingLedger {
    async fn request_payout(&self, request: PayoutRequest) -> Result<bool, EngineError> {
        self.requests.lock().push(request);
        Ok(!self.reject)
    }
}
