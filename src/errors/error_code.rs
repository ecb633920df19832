//! Error codes for the Scambodia engine.
//!
//! This module defines all error codes surfaced across the engine boundary.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that
//! appear in action responses.

use core::fmt;

use super::domain::{DomainError, ValidationKind};

/// Centralized error codes for the engine boundary.
///
/// This enum ensures type safety and prevents the use of ad-hoc error codes.
/// Each variant maps to a canonical SCREAMING_SNAKE_CASE string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Turn and phase validation
    /// Out of turn
    OutOfTurn,
    /// Phase mismatch
    PhaseMismatch,
    /// No card drawn yet
    NoCardDrawn,
    /// Card already drawn
    CardAlreadyDrawn,
    /// Discard-drawn card must be exchanged
    DiscardDrawMustExchange,
    /// Invalid hand slot
    InvalidSlot,
    /// Slot already vanished
    VanishedSlot,
    /// Invalid power target
    InvalidTarget,
    /// Missing power target
    MissingPowerTarget,
    /// Scambodia already declared this round
    AlreadyDeclared,
    /// Unresolved power decision
    PowerDecisionPending,
    /// No power pending
    NoPowerPending,
    /// Draw pile exhausted
    EmptyDrawPile,
    /// Discard pile empty
    EmptyDiscardPile,

    // Lifecycle validation
    /// Invalid player count
    InvalidPlayerCount,
    /// Invalid round count
    InvalidRoundCount,
    /// Invalid wager
    InvalidWager,
    /// Game lifecycle does not permit the operation
    LifecycleMismatch,
    /// Request addresses a round not yet reached
    FutureRound,
    /// Card parse error
    ParseCard,
    /// General validation error
    ValidationError,

    // Conflicts and lookups
    /// Seat already taken
    SeatTaken,
    /// Document changed since read
    StaleState,
    /// General conflict
    Conflict,
    /// Game not found
    GameNotFound,
    /// Player not found
    PlayerNotFound,
    /// General not found
    NotFound,

    // Operational
    /// Infrastructure failure
    InfraError,
    /// Internal error
    InternalError,
}

impl ErrorCode {
    /// Canonical string for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::OutOfTurn => "OUT_OF_TURN",
            ErrorCode::PhaseMismatch => "PHASE_MISMATCH",
            ErrorCode::NoCardDrawn => "NO_CARD_DRAWN",
            ErrorCode::CardAlreadyDrawn => "CARD_ALREADY_DRAWN",
            ErrorCode::DiscardDrawMustExchange => "DISCARD_DRAW_MUST_EXCHANGE",
            ErrorCode::InvalidSlot => "INVALID_SLOT",
            ErrorCode::VanishedSlot => "VANISHED_SLOT",
            ErrorCode::InvalidTarget => "INVALID_TARGET",
            ErrorCode::MissingPowerTarget => "MISSING_POWER_TARGET",
            ErrorCode::AlreadyDeclared => "ALREADY_DECLARED",
            ErrorCode::PowerDecisionPending => "POWER_DECISION_PENDING",
            ErrorCode::NoPowerPending => "NO_POWER_PENDING",
            ErrorCode::EmptyDrawPile => "EMPTY_DRAW_PILE",
            ErrorCode::EmptyDiscardPile => "EMPTY_DISCARD_PILE",
            ErrorCode::InvalidPlayerCount => "INVALID_PLAYER_COUNT",
            ErrorCode::InvalidRoundCount => "INVALID_ROUND_COUNT",
            ErrorCode::InvalidWager => "INVALID_WAGER",
            ErrorCode::LifecycleMismatch => "LIFECYCLE_MISMATCH",
            ErrorCode::FutureRound => "FUTURE_ROUND",
            ErrorCode::ParseCard => "PARSE_CARD",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::SeatTaken => "SEAT_TAKEN",
            ErrorCode::StaleState => "STALE_STATE",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::GameNotFound => "GAME_NOT_FOUND",
            ErrorCode::PlayerNotFound => "PLAYER_NOT_FOUND",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InfraError => "INFRA_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&DomainError> for ErrorCode {
    fn from(err: &DomainError) -> Self {
        use super::domain::{ConflictKind, NotFoundKind};

        match err {
            DomainError::Validation(kind, _) => match kind {
                ValidationKind::OutOfTurn => ErrorCode::OutOfTurn,
                ValidationKind::PhaseMismatch => ErrorCode::PhaseMismatch,
                ValidationKind::NoCardDrawn => ErrorCode::NoCardDrawn,
                ValidationKind::CardAlreadyDrawn => ErrorCode::CardAlreadyDrawn,
                ValidationKind::DiscardDrawMustExchange => ErrorCode::DiscardDrawMustExchange,
                ValidationKind::InvalidSlot => ErrorCode::InvalidSlot,
                ValidationKind::VanishedSlot => ErrorCode::VanishedSlot,
                ValidationKind::InvalidTarget => ErrorCode::InvalidTarget,
                ValidationKind::MissingPowerTarget => ErrorCode::MissingPowerTarget,
                ValidationKind::AlreadyDeclared => ErrorCode::AlreadyDeclared,
                ValidationKind::PowerDecisionPending => ErrorCode::PowerDecisionPending,
                ValidationKind::NoPowerPending => ErrorCode::NoPowerPending,
                ValidationKind::EmptyDrawPile => ErrorCode::EmptyDrawPile,
                ValidationKind::EmptyDiscardPile => ErrorCode::EmptyDiscardPile,
                ValidationKind::InvalidPlayerCount => ErrorCode::InvalidPlayerCount,
                ValidationKind::InvalidRoundCount => ErrorCode::InvalidRoundCount,
                ValidationKind::InvalidWager => ErrorCode::InvalidWager,
                ValidationKind::LifecycleMismatch => ErrorCode::LifecycleMismatch,
                ValidationKind::FutureRound => ErrorCode::FutureRound,
                ValidationKind::ParseCard => ErrorCode::ParseCard,
                _ => ErrorCode::ValidationError,
            },
            DomainError::Conflict(kind, _) => match kind {
                ConflictKind::SeatTaken => ErrorCode::SeatTaken,
                ConflictKind::OptimisticLock => ErrorCode::StaleState,
                _ => ErrorCode::Conflict,
            },
            DomainError::NotFound(kind, _) => match kind {
                NotFoundKind::Game => ErrorCode::GameNotFound,
                NotFoundKind::Player => ErrorCode::PlayerNotFound,
                _ => ErrorCode::NotFound,
            },
            DomainError::Infra(_, _) => ErrorCode::InfraError,
        }
    }
}
