//! Pub/sub dispatcher: fan-out of game and room events to subscribers.
//!
//! Subscribers hold bounded channels. Fan-out never waits on a subscriber:
//! a receiver that cannot keep up (or has gone away) fails `try_send` and
//! is dropped from the registry, so a slow consumer can never stall the
//! game that is publishing. Delivery per surviving subscriber is in commit
//! order because publishing happens while the owning aggregate's token is
//! held.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::envelope::{Event, EventType, OutboundEvent};
use super::log::Scope;
use crate::ids::{GameId, RoomId};

/// Events buffered per subscriber before it is considered too slow.
pub const SUBSCRIBER_BUFFER: usize = 256;

/// A fan-out channel key: one per game, one per room lobby.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topic {
    Game(GameId),
    Room(RoomId),
}

/// Handle returned to a subscriber; dropping the receiver ends delivery.
pub struct Subscription {
    pub token: u64,
    pub topic: Topic,
    pub receiver: mpsc::Receiver<Event>,
}

struct SubscriberEntry {
    scope: Scope,
    sender: mpsc::Sender<Event>,
}

#[derive(Default)]
struct ChannelState {
    subscribers: DashMap<u64, SubscriberEntry>,
    /// Highest version dispatched on this topic; heartbeats carry it.
    last_version: AtomicU64,
}

/// Shared dispatcher; registries are partitioned per topic so games never
/// contend with each other.
pub struct EventFabric {
    channels: DashMap<Topic, Arc<ChannelState>>,
    next_token: AtomicU64,
    active_subscribers: AtomicUsize,
}

impl EventFabric {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
            next_token: AtomicU64::new(1),
            active_subscribers: AtomicUsize::new(0),
        }
    }

    pub fn subscribe_game(&self, game_id: GameId, scope: Scope) -> Subscription {
        self.subscribe(Topic::Game(game_id), scope)
    }

    pub fn subscribe_room(&self, room_id: RoomId) -> Subscription {
        self.subscribe(Topic::Room(room_id), Scope::Public)
    }

    fn subscribe(&self, topic: Topic, scope: Scope) -> Subscription {
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_BUFFER);
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let channel = self
            .channels
            .entry(topic)
            .or_insert_with(|| Arc::new(ChannelState::default()))
            .clone();
        channel.subscribers.insert(token, SubscriberEntry { scope, sender });

        let active = self.active_subscribers.fetch_add(1, Ordering::Relaxed) + 1;
        info!(?topic, token, active_subscribers = active, "subscriber registered");

        Subscription {
            token,
            topic,
            receiver,
        }
    }

    pub fn unsubscribe(&self, topic: Topic, token: u64) {
        let mut removed = false;
        if let Some(channel) = self.channels.get(&topic) {
            removed = channel.subscribers.remove(&token).is_some();
        }
        if removed {
            self.active_subscribers.fetch_sub(1, Ordering::Relaxed);
            info!(?topic, token, "subscriber unregistered");
        } else {
            warn!(?topic, token, "unsubscribe for unknown subscriber");
        }
    }

    /// Dispatch a batch of events in order. Must be called while the
    /// publishing aggregate's serialization token is held, which is what
    /// makes per-subscriber ordering equal to commit ordering.
    pub fn publish(&self, topic: Topic, entries: &[OutboundEvent]) {
        let Some(channel) = self.channels.get(&topic).map(|c| c.clone()) else {
            return;
        };

        if let Some(max) = entries.iter().map(|e| e.event.version).max() {
            channel.last_version.fetch_max(max, Ordering::Relaxed);
        }

        let mut dead: Vec<u64> = Vec::new();
        for entry in entries {
            for sub in channel.subscribers.iter() {
                if dead.contains(sub.key()) {
                    continue;
                }
                if !sub.value().scope.can_see(entry.audience) {
                    continue;
                }
                if let Err(err) = sub.value().sender.try_send(entry.event.clone()) {
                    warn!(
                        ?topic,
                        token = sub.key(),
                        event_type = entry.event.event_type.as_str(),
                        error = %err,
                        "subscriber cannot keep up, dropping"
                    );
                    dead.push(*sub.key());
                }
            }
        }

        for token in dead {
            channel.subscribers.remove(&token);
            self.active_subscribers.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// One heartbeat sweep over all game topics. Heartbeats are
    /// informational: no version increment, never appended to any log.
    pub fn heartbeat_tick(&self) {
        for channel in self.channels.iter() {
            let Topic::Game(game_id) = *channel.key() else {
                continue;
            };
            let version = channel.value().last_version.load(Ordering::Relaxed);
            let event = Event::system(game_id, EventType::SystemHeartbeat, version);

            let mut dead: Vec<u64> = Vec::new();
            for sub in channel.value().subscribers.iter() {
                if sub.value().sender.try_send(event.clone()).is_err() {
                    dead.push(*sub.key());
                }
            }
            for token in dead {
                channel.value().subscribers.remove(&token);
                self.active_subscribers.fetch_sub(1, Ordering::Relaxed);
            }
        }
    }

    pub fn active_subscriber_count(&self) -> usize {
        self.active_subscribers.load(Ordering::Relaxed)
    }

    /// Drop a game's channel once the game is gone.
    pub fn retire_topic(&self, topic: Topic) {
        if let Some((_, channel)) = self.channels.remove(&topic) {
            let count = channel.subscribers.len();
            if count > 0 {
                self.active_subscribers.fetch_sub(count, Ordering::Relaxed);
            }
            debug!(?topic, dropped_subscribers = count, "topic retired");
        }
    }
}

impl Default for EventFabric {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodic heartbeat task. Holds only a weak reference so the task winds
/// down once the fabric's owner drops it.
pub fn spawn_heartbeat(fabric: &Arc<EventFabric>, period: Duration) -> tokio::task::JoinHandle<()> {
    let weak: Weak<EventFabric> = Arc::downgrade(fabric);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick fires immediately; skip it so a fresh fabric does
        // not heartbeat before anyone subscribed.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(fabric) = weak.upgrade() else {
                break;
            };
            fabric.heartbeat_tick();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::envelope::Audience;

    fn event(version: u64) -> Event {
        Event::for_game(1, EventType::BidPlaced, version, serde_json::Value::Null)
    }

    #[tokio::test]
    async fn public_and_private_scoping() {
        let fabric = EventFabric::new();
        let mut public = fabric.subscribe_game(1, Scope::Public);
        let mut owner = fabric.subscribe_game(1, Scope::Private(42));

        fabric.publish(
            Topic::Game(1),
            &[
                OutboundEvent::public(event(1)),
                OutboundEvent {
                    event: Event::for_game(1, EventType::HandUpdated, 1, serde_json::Value::Null),
                    audience: Audience::Player(42),
                },
            ],
        );

        assert_eq!(public.receiver.recv().await.unwrap().version, 1);
        assert!(public.receiver.try_recv().is_err());

        let first = owner.receiver.recv().await.unwrap();
        let second = owner.receiver.recv().await.unwrap();
        assert_eq!(first.event_type, EventType::BidPlaced);
        assert_eq!(second.event_type, EventType::HandUpdated);
    }

    #[tokio::test]
    async fn slow_subscriber_is_dropped_without_blocking() {
        let fabric = EventFabric::new();
        let _stuck = fabric.subscribe_game(1, Scope::Public);
        assert_eq!(fabric.active_subscriber_count(), 1);

        // Overflow the bounded buffer; publish must not block and the
        // subscriber must be gone afterwards.
        for version in 0..(SUBSCRIBER_BUFFER as u64 + 2) {
            fabric.publish(Topic::Game(1), &[OutboundEvent::public(event(version))]);
        }
        assert_eq!(fabric.active_subscriber_count(), 0);
    }

    #[tokio::test]
    async fn heartbeat_carries_last_version_and_skips_log() {
        let fabric = EventFabric::new();
        let mut sub = fabric.subscribe_game(1, Scope::Public);
        fabric.publish(Topic::Game(1), &[OutboundEvent::public(event(9))]);
        let _ = sub.receiver.recv().await.unwrap();

        fabric.heartbeat_tick();
        let beat = sub.receiver.recv().await.unwrap();
        assert_eq!(beat.event_type, EventType::SystemHeartbeat);
        assert_eq!(beat.version, 9);
    }
}
