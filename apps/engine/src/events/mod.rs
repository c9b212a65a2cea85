//! Event fabric: envelopes, per-game append-only logs, subscriber fan-out,
//! and replay.

pub mod envelope;
pub mod fabric;
pub mod log;
pub mod replay;

pub use envelope::{Audience, Event, EventSource, EventType, OutboundEvent};
pub use fabric::{spawn_heartbeat, EventFabric, Subscription, Topic, SUBSCRIBER_BUFFER};
pub use log::{EventLog, Scope};
pub use replay::replay_cumulative_score;
