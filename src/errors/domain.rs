//! Domain-level error type used across the engine and its services.
//!
//! This error type is transport- and store-agnostic. Callers embedding the
//! engine should convert from `DomainError` to their own surface via the
//! provided `ErrorCode` mapping.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Validation failure kinds surfaced to the acting player.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    /// It is not this player's turn to act.
    OutOfTurn,
    /// The round is not in a phase where this action is legal.
    PhaseMismatch,
    /// The action needs an outstanding drawn card and there is none.
    NoCardDrawn,
    /// A card is already drawn and must be resolved first.
    CardAlreadyDrawn,
    /// A card taken from the discard pile must be exchanged, nothing else.
    DiscardDrawMustExchange,
    /// Slot index outside the 4-slot hand.
    InvalidSlot,
    /// The targeted slot was permanently vanished earlier in the round.
    VanishedSlot,
    /// Power target references a seat that cannot be targeted.
    InvalidTarget,
    /// Required power target parameters are missing.
    MissingPowerTarget,
    /// A declaration already stands for this round.
    AlreadyDeclared,
    /// An un-redeemed power decision blocks this action.
    PowerDecisionPending,
    /// No power is pending or engaged for this player.
    NoPowerPending,
    /// Both the draw pile and the reshufflable discard are exhausted.
    EmptyDrawPile,
    /// The discard pile holds no card to take.
    EmptyDiscardPile,
    InvalidPlayerCount,
    InvalidRoundCount,
    InvalidWager,
    /// The game is not accepting this lifecycle operation.
    LifecycleMismatch,
    /// The request addresses a round the game has not reached yet.
    FutureRound,
    ParseCard,
    Other(String),
}

/// Domain-level not found entities (minimal set; extend as needed)
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Game,
    Player,
    Other(String),
}

/// Domain-level conflict kinds (extend as needed)
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    SeatTaken,
    OptimisticLock,
    Other(String),
}

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Timeout,
    StoreUnavailable,
    DataCorruption,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input/user validation or game rule violation
    Validation(ValidationKind, String),
    /// Semantic conflict
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn validation_other(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::Validation(ValidationKind::Other(detail.clone()), detail)
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    /// True for errors a caller may resolve by reloading state and retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Conflict(ConflictKind::OptimisticLock, _))
    }
}
