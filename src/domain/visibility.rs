//! Visibility tracking via explicit reveal-grant events.
//!
//! Card faces reach a player only through the Setup peek, a resolved peek
//! power, the seen-swap pre-reveal, or the public discard top. The first
//! three are recorded as `RevealGrant` events on the round; what a viewer
//! may currently see is always derived by filtering the grant list, never
//! kept as a mutable per-player set. The discard top is public and derived
//! directly from the pile.

use serde::{Deserialize, Serialize};

use super::state::Seat;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RevealSource {
    /// Own bottom-two peek during Setup.
    SetupPeek,
    /// Resolved PeekOwn / PeekOpponent power.
    PowerPeek,
    /// Seen-swap pre-reveal, granted before the swap decision.
    SeenSwap,
}

/// When a grant stops being served.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RevealExpiry {
    /// Purged when the viewer confirms their Setup peek.
    UntilSetupConfirmed,
    /// Purged when the viewer's next turn starts.
    UntilViewerTurnStarts,
}

/// One reveal event: `viewer` may see the card in `owner`'s `slot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealGrant {
    pub viewer: Seat,
    pub owner: Seat,
    pub slot: usize,
    pub source: RevealSource,
    pub expiry: RevealExpiry,
}

/// Whether `viewer` currently holds a grant for `owner`'s `slot`.
pub fn can_see(grants: &[RevealGrant], viewer: Seat, owner: Seat, slot: usize) -> bool {
    grants
        .iter()
        .any(|g| g.viewer == viewer && g.owner == owner && g.slot == slot)
}

/// Purge grants that expire when `seat`'s turn starts.
pub fn purge_on_turn_start(grants: &mut Vec<RevealGrant>, seat: Seat) {
    grants.retain(|g| !(g.viewer == seat && g.expiry == RevealExpiry::UntilViewerTurnStarts));
}

/// Purge `seat`'s Setup-peek grants once they confirm peek-complete.
pub fn purge_on_setup_confirm(grants: &mut Vec<RevealGrant>, seat: Seat) {
    grants.retain(|g| !(g.viewer == seat && g.expiry == RevealExpiry::UntilSetupConfirmed));
}

/// Revoke every grant referencing `owner`'s `slot`.
///
/// Called whenever a slot's occupant changes (exchange, match placement,
/// either swap); a grant must never serve the slot's new card.
pub fn revoke_slot(grants: &mut Vec<RevealGrant>, owner: Seat, slot: usize) {
    grants.retain(|g| !(g.owner == owner && g.slot == slot));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(viewer: Seat, owner: Seat, slot: usize, expiry: RevealExpiry) -> RevealGrant {
        RevealGrant {
            viewer,
            owner,
            slot,
            source: RevealSource::PowerPeek,
            expiry,
        }
    }

    #[test]
    fn can_see_matches_exact_grant_only() {
        let grants = vec![grant(0, 1, 2, RevealExpiry::UntilViewerTurnStarts)];
        assert!(can_see(&grants, 0, 1, 2));
        assert!(!can_see(&grants, 1, 1, 2));
        assert!(!can_see(&grants, 0, 1, 3));
        assert!(!can_see(&grants, 0, 0, 2));
    }

    #[test]
    fn turn_start_purges_only_that_viewer() {
        let mut grants = vec![
            grant(0, 1, 2, RevealExpiry::UntilViewerTurnStarts),
            grant(1, 0, 1, RevealExpiry::UntilViewerTurnStarts),
            grant(0, 0, 3, RevealExpiry::UntilSetupConfirmed),
        ];
        purge_on_turn_start(&mut grants, 0);
        assert_eq!(grants.len(), 2);
        assert!(!can_see(&grants, 0, 1, 2));
        assert!(can_see(&grants, 1, 0, 1));
        // Setup grants survive turn starts
        assert!(can_see(&grants, 0, 0, 3));
    }

    #[test]
    fn setup_confirm_purges_setup_grants() {
        let mut grants = vec![
            grant(2, 2, 2, RevealExpiry::UntilSetupConfirmed),
            grant(2, 2, 3, RevealExpiry::UntilSetupConfirmed),
            grant(3, 3, 2, RevealExpiry::UntilSetupConfirmed),
        ];
        purge_on_setup_confirm(&mut grants, 2);
        assert!(!can_see(&grants, 2, 2, 2));
        assert!(!can_see(&grants, 2, 2, 3));
        assert!(can_see(&grants, 3, 3, 2));
    }

    #[test]
    fn slot_revocation_hits_all_viewers() {
        let mut grants = vec![
            grant(0, 1, 2, RevealExpiry::UntilViewerTurnStarts),
            grant(3, 1, 2, RevealExpiry::UntilViewerTurnStarts),
            grant(0, 1, 1, RevealExpiry::UntilViewerTurnStarts),
        ];
        revoke_slot(&mut grants, 1, 2);
        assert!(!can_see(&grants, 0, 1, 2));
        assert!(!can_see(&grants, 3, 1, 2));
        assert!(can_see(&grants, 0, 1, 1));
    }
}
