//! Typed action inputs and the MoveResult every accepted action returns.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::{Phase, Seat};
use crate::events::EventType;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveStatus {
    Accepted,
    Rejected,
}

/// Outcome of an accepted player action. Stored in the idempotency index
/// and returned unchanged on a duplicate `client_action_id`.
#[derive(Debug, Clone, Serialize)]
pub struct MoveResult {
    pub move_id: Uuid,
    pub client_action_id: String,
    pub status: MoveStatus,
    pub turn_id: u64,
    pub state_version: u64,
    /// Event types the mutation emitted, in order.
    pub effects: Vec<EventType>,
    /// True when the action was synthesized by the core (bot seat or turn
    /// timeout) rather than submitted by the seat's owner.
    pub system_generated: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}

/// Who is acting and under which at-most-once/optimistic-concurrency keys.
#[derive(Debug, Clone)]
pub struct ActionCtx {
    pub seat: Seat,
    pub client_action_id: String,
    /// When set, the action is rejected unless it matches the game's
    /// current state version.
    pub expected_version: Option<u64>,
    pub system_generated: bool,
}

impl ActionCtx {
    pub fn new(seat: Seat, client_action_id: impl Into<String>) -> Self {
        Self {
            seat,
            client_action_id: client_action_id.into(),
            expected_version: None,
            system_generated: false,
        }
    }

    pub fn with_expected_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }

    pub fn system(mut self) -> Self {
        self.system_generated = true;
        self
    }
}

/// Whose turn it is, under which turn counter.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub struct TurnInfo {
    pub turn_id: u64,
    /// Seat expected to act; `None` while scoring or after completion.
    pub seat: Option<Seat>,
    pub phase: Phase,
}
