//! Event envelope: the one record shape that flows through log, fan-out,
//! and replay.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use ulid::Ulid;

use crate::ids::{GameId, PlayerId, RoomId};

/// Every event type the core emits, public and private.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventType {
    RoomUpdated,
    RoomPlayerJoined,
    RoomPlayerLeft,
    RoomGameStarted,
    RoundStarted,
    /// Private: a seat's freshly dealt hand.
    HandDealt,
    BidPlaced,
    BidPassed,
    BidDoubled,
    BidRedoubled,
    /// Four passes with no standing bid; the hands are thrown in.
    RedealRequired,
    ContractFinalized,
    MoveAccepted,
    MoveRejected,
    /// Private: a seat's hand after a card left it.
    HandUpdated,
    TrickCompleted,
    TurnChanged,
    RoundCompleted,
    GameCompleted,
    GameCancelled,
    GameAborted,
    MoveInvalidated,
    SystemHeartbeat,
}

impl EventType {
    /// Canonical dotted wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RoomUpdated => "room.updated",
            Self::RoomPlayerJoined => "room.player_joined",
            Self::RoomPlayerLeft => "room.player_left",
            Self::RoomGameStarted => "room.game_started",
            Self::RoundStarted => "round.started",
            Self::HandDealt => "hand.dealt",
            Self::BidPlaced => "bid.placed",
            Self::BidPassed => "bid.passed",
            Self::BidDoubled => "bid.doubled",
            Self::BidRedoubled => "bid.redoubled",
            Self::RedealRequired => "redeal.required",
            Self::ContractFinalized => "contract.finalized",
            Self::MoveAccepted => "move.accepted",
            Self::MoveRejected => "move.rejected",
            Self::HandUpdated => "hand.updated",
            Self::TrickCompleted => "trick.completed",
            Self::TurnChanged => "turn.changed",
            Self::RoundCompleted => "round.completed",
            Self::GameCompleted => "game.completed",
            Self::GameCancelled => "game.cancelled",
            Self::GameAborted => "game.aborted",
            Self::MoveInvalidated => "move.invalidated",
            Self::SystemHeartbeat => "system.heartbeat",
        }
    }

    /// Whether events of this type carry hidden information and must never
    /// reach a subscriber other than their addressee.
    pub const fn is_private(&self) -> bool {
        matches!(self, Self::HandDealt | Self::HandUpdated)
    }
}

impl Serialize for EventType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ALL_EVENT_TYPES
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| serde::de::Error::custom(format!("unknown event type {s:?}")))
    }
}

pub const ALL_EVENT_TYPES: [EventType; 23] = [
    EventType::RoomUpdated,
    EventType::RoomPlayerJoined,
    EventType::RoomPlayerLeft,
    EventType::RoomGameStarted,
    EventType::RoundStarted,
    EventType::HandDealt,
    EventType::BidPlaced,
    EventType::BidPassed,
    EventType::BidDoubled,
    EventType::BidRedoubled,
    EventType::RedealRequired,
    EventType::ContractFinalized,
    EventType::MoveAccepted,
    EventType::MoveRejected,
    EventType::HandUpdated,
    EventType::TrickCompleted,
    EventType::TurnChanged,
    EventType::RoundCompleted,
    EventType::GameCompleted,
    EventType::GameCancelled,
    EventType::GameAborted,
    EventType::MoveInvalidated,
    EventType::SystemHeartbeat,
];

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// Emitted by an accepted mutation of an aggregate.
    Core,
    /// Informational, outside the versioned log (heartbeats, rejections).
    System,
}

/// The envelope appended to logs and pushed to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub event_type: EventType,
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
    pub source: EventSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<GameId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomId>,
    pub payload: serde_json::Value,
    /// State version produced by the causing mutation; informational events
    /// carry the last known version.
    pub version: u64,
}

impl Event {
    pub fn for_game(
        game_id: GameId,
        event_type: EventType,
        version: u64,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: Ulid::new().to_string(),
            event_type,
            occurred_at: OffsetDateTime::now_utc(),
            source: EventSource::Core,
            game_id: Some(game_id),
            room_id: None,
            payload,
            version,
        }
    }

    pub fn for_room(
        room_id: RoomId,
        event_type: EventType,
        version: u64,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: Ulid::new().to_string(),
            event_type,
            occurred_at: OffsetDateTime::now_utc(),
            source: EventSource::Core,
            game_id: None,
            room_id: Some(room_id),
            payload,
            version,
        }
    }

    pub fn system(game_id: GameId, event_type: EventType, version: u64) -> Self {
        Self {
            event_id: Ulid::new().to_string(),
            event_type,
            occurred_at: OffsetDateTime::now_utc(),
            source: EventSource::System,
            game_id: Some(game_id),
            room_id: None,
            payload: serde_json::Value::Null,
            version,
        }
    }
}

/// Who may see an event.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Audience {
    Public,
    /// Only the subscriber holding this player identity.
    Player(PlayerId),
}

/// An event paired with its audience, as produced by a mutation.
#[derive(Debug, Clone)]
pub struct OutboundEvent {
    pub event: Event,
    pub audience: Audience,
}

impl OutboundEvent {
    pub fn public(event: Event) -> Self {
        Self {
            event,
            audience: Audience::Public,
        }
    }

    pub fn private(event: Event, player: PlayerId) -> Self {
        Self {
            event,
            audience: Audience::Player(player),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_wire_names_are_dotted() {
        assert_eq!(EventType::RoundStarted.as_str(), "round.started");
        assert_eq!(EventType::HandDealt.as_str(), "hand.dealt");
        assert_eq!(EventType::SystemHeartbeat.as_str(), "system.heartbeat");
        assert_eq!(EventType::RoomPlayerJoined.as_str(), "room.player_joined");
    }

    #[test]
    fn event_type_serde_roundtrip() {
        for t in ALL_EVENT_TYPES {
            let s = serde_json::to_string(&t).unwrap();
            let back: EventType = serde_json::from_str(&s).unwrap();
            assert_eq!(back, t);
        }
    }

    #[test]
    fn only_hand_events_are_private() {
        for t in ALL_EVENT_TYPES {
            let expected = matches!(t, EventType::HandDealt | EventType::HandUpdated);
            assert_eq!(t.is_private(), expected, "{t:?}");
        }
    }
}
