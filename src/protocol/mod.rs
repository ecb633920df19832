//! Request/response envelopes crossing the engine boundary.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::PlayerAction;

/// One player intent against one game document.
///
/// `user_id` comes from the identity provider; the engine maps it to a
/// seat. `round_no` states which round the client believes it is acting in,
/// so requests addressed to a superseded round can be answered as
/// already-applied no-ops. `idempotency_key` makes client retries safe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub game_id: Uuid,
    pub user_id: Uuid,
    pub round_no: u8,
    pub action: PlayerAction,
    pub idempotency_key: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionOutcome {
    /// The action mutated the document.
    Applied,
    /// The action had already taken effect (replay or superseded target);
    /// returned as success so client retries stay safe.
    AlreadyApplied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub outcome: ActionOutcome,
    /// Document version after (or at the time of) the action.
    pub version: u64,
}

impl ActionResponse {
    pub fn applied(version: u64) -> Self {
        Self {
            outcome: ActionOutcome::Applied,
            version,
        }
    }

    pub fn already_applied(version: u64) -> Self {
        Self {
            outcome: ActionOutcome::AlreadyApplied,
            version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Seat;

    #[test]
    fn action_request_json_shape() {
        let request = ActionRequest {
            game_id: Uuid::from_u128(1),
            user_id: Uuid::from_u128(2),
            round_no: 1,
            action: PlayerAction::ResolvePowerTarget {
                own_slot: Some(1),
                opponent: Some(2 as Seat),
                opponent_slot: Some(0),
            },
            idempotency_key: Uuid::from_u128(3),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"type\":\"resolve_power_target\""));
        let decoded: ActionRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn plain_actions_omit_absent_targets() {
        let json = serde_json::to_string(&PlayerAction::SkipPower).unwrap();
        assert_eq!(json, "{\"type\":\"skip_power\"}");
        let json = serde_json::to_string(&PlayerAction::ResolvePowerTarget {
            own_slot: Some(0),
            opponent: None,
            opponent_slot: None,
        })
        .unwrap();
        assert!(!json.contains("opponent"));
    }
}
