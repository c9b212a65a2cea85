//! Per-game append-only event log with cursor replay.

use super::envelope::{Audience, Event, OutboundEvent};
use crate::ids::PlayerId;

/// The view a reader holds when replaying: the public stream, or the public
/// stream interleaved with one player's private events.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Scope {
    Public,
    Private(PlayerId),
}

impl Scope {
    pub fn can_see(&self, audience: Audience) -> bool {
        match audience {
            Audience::Public => true,
            Audience::Player(owner) => matches!(self, Scope::Private(p) if *p == owner),
        }
    }
}

/// Append-only sequence of a game's events, in commit order.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<OutboundEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn append(&mut self, entries: &[OutboundEvent]) {
        self.entries.extend_from_slice(entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The suffix of the log following `after_event_id`, filtered to what
    /// `scope` may see. An unknown or absent cursor returns the whole
    /// visible log: a caller with a cursor the log does not know has lost
    /// context and needs a fresh baseline.
    pub fn list_since(&self, after_event_id: Option<&str>, scope: Scope) -> Vec<Event> {
        let start = after_event_id
            .and_then(|id| self.entries.iter().position(|e| e.event.event_id == id))
            .map(|pos| pos + 1)
            .unwrap_or(0);

        self.entries[start..]
            .iter()
            .filter(|e| scope.can_see(e.audience))
            .map(|e| e.event.clone())
            .collect()
    }

    /// Full unfiltered entries, for invariant checks and replay tooling.
    pub fn entries(&self) -> &[OutboundEvent] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::envelope::EventType;

    fn public_event(version: u64) -> OutboundEvent {
        OutboundEvent::public(Event::for_game(
            1,
            EventType::BidPlaced,
            version,
            serde_json::Value::Null,
        ))
    }

    fn private_event(version: u64, player: PlayerId) -> OutboundEvent {
        OutboundEvent::private(
            Event::for_game(1, EventType::HandUpdated, version, serde_json::Value::Null),
            player,
        )
    }

    #[test]
    fn replay_from_cursor_returns_suffix() {
        let mut log = EventLog::new();
        log.append(&[public_event(1), public_event(2), public_event(3)]);
        let all = log.list_since(None, Scope::Public);
        assert_eq!(all.len(), 3);

        let suffix = log.list_since(Some(&all[0].event_id), Scope::Public);
        assert_eq!(suffix.len(), 2);
        assert_eq!(suffix[0].version, 2);
    }

    #[test]
    fn unknown_cursor_returns_everything() {
        let mut log = EventLog::new();
        log.append(&[public_event(1), public_event(2)]);
        let events = log.list_since(Some("nonexistent"), Scope::Public);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn private_events_are_scoped_to_their_player() {
        let mut log = EventLog::new();
        log.append(&[public_event(1), private_event(1, 42), private_event(1, 7)]);

        assert_eq!(log.list_since(None, Scope::Public).len(), 1);
        let for_42 = log.list_since(None, Scope::Private(42));
        assert_eq!(for_42.len(), 2);
        assert_eq!(log.list_since(None, Scope::Private(7)).len(), 2);
        assert_eq!(log.list_since(None, Scope::Private(99)).len(), 1);
    }
}
