#![cfg_attr(not(test), deny(clippy::expect_used, clippy::unwrap_used, clippy::panic, clippy::todo, clippy::unimplemented))]

//! Authoritative core of a coinche (belote coinchée) game server.
//!
//! Four layers, leaves first: the pure rules kernel (`domain`), the game
//! state machine (`engine`), the event fabric (`events`), and the
//! orchestration services with the bot driver (`services`, `ai`).
//! Transport framing, auth, and persistence live outside this crate and
//! talk to it through the service types re-exported below.

pub mod ai;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod errors;
pub mod events;
pub mod ids;
pub mod services;

// Re-exports for public API
pub use config::EngineConfig;
pub use engine::{ActionCtx, Game, MoveResult, MoveStatus, PrivateHandView, PublicSnapshot, TurnInfo};
pub use error::{CoreError, RuleViolation};
pub use errors::ErrorCode;
pub use events::{Event, EventType, Subscription};
pub use ids::{GameId, PlayerId, RoomId};
pub use services::{ActionKeys, GameFlowService, Role, RoomService};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    engine_test_support::logging::init();
}
