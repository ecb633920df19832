use crate::errors::domain::{DomainError, ValidationKind};

/// Fixed number of hand slots per seat. Slots are nulled in place when a
/// card vanishes; the hand never shrinks structurally.
pub const HAND_SLOTS: usize = 4;

pub const MIN_SEATS: usize = 2;
pub const MAX_SEATS: usize = 4;

pub const DECK_SIZE: usize = 52;

/// Slots revealed to their owner during the Setup peek (the two "bottom"
/// positions of the 2x2 layout).
pub const SETUP_PEEK_SLOTS: [usize; 2] = [2, 3];

/// Keep this many recently applied idempotency keys on the document.
pub const APPLIED_KEY_WINDOW: usize = 64;

pub fn validate_seat_count(count: usize) -> Result<(), DomainError> {
    if !(MIN_SEATS..=MAX_SEATS).contains(&count) {
        return Err(DomainError::validation(
            ValidationKind::InvalidPlayerCount,
            format!("Seat count must be {MIN_SEATS}..={MAX_SEATS}, got {count}"),
        ));
    }
    Ok(())
}

pub fn validate_total_rounds(total_rounds: u8) -> Result<(), DomainError> {
    if !matches!(total_rounds, 1 | 3 | 5) {
        return Err(DomainError::validation(
            ValidationKind::InvalidRoundCount,
            format!("Total rounds must be 1, 3 or 5, got {total_rounds}"),
        ));
    }
    Ok(())
}

pub fn validate_wager(wager_per_player: u64) -> Result<(), DomainError> {
    if wager_per_player == 0 {
        return Err(DomainError::validation(
            ValidationKind::InvalidWager,
            "Wager must be positive",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_count_bounds() {
        assert!(validate_seat_count(1).is_err());
        assert!(validate_seat_count(2).is_ok());
        assert!(validate_seat_count(4).is_ok());
        assert!(validate_seat_count(5).is_err());
    }

    #[test]
    fn round_counts() {
        for n in [1u8, 3, 5] {
            assert!(validate_total_rounds(n).is_ok());
        }
        for n in [0u8, 2, 4, 6] {
            assert!(validate_total_rounds(n).is_err());
        }
    }

    #[test]
    fn wager_must_be_positive() {
        assert!(validate_wager(0).is_err());
        assert!(validate_wager(100).is_ok());
    }
}
