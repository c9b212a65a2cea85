//! Game flow orchestration: routes caller actions to the owning aggregate,
//! fans out events, and drives bot seats and turn timeouts.
//!
//! Concurrency model: one `parking_lot::Mutex` per game is the
//! serialization token. Every mutation takes it, validates and mutates
//! CPU-bound, publishes the emitted events to the fabric (non-blocking
//! `try_send`) and releases. Cross-game there are no locks; the registry is
//! a sharded map.

mod bot_coordinator;
mod player_actions;
mod queries;

pub use player_actions::ActionKeys;

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use rand::RngCore;
use tracing::info;

use crate::ai::{BotPlayer, HeuristicBot};
use crate::config::EngineConfig;
use crate::domain::{Card, Phase};
use crate::engine::{Game, SeatAssignment};
use crate::error::CoreError;
use crate::errors::ErrorCode;
use crate::events::{spawn_heartbeat, EventFabric, Topic};
use crate::ids::{GameId, PlayerId, RoomId};

/// Caller privilege, established by the transport's auth layer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Player,
    Admin,
}

/// One game behind its serialization token.
pub struct GameHandle {
    inner: Mutex<Game>,
}

impl GameHandle {
    fn new(game: Game) -> Self {
        Self {
            inner: Mutex::new(game),
        }
    }

    pub(crate) fn lock(&self) -> parking_lot::MutexGuard<'_, Game> {
        self.inner.lock()
    }
}

pub struct GameFlowService {
    games: DashMap<GameId, Arc<GameHandle>>,
    fabric: Arc<EventFabric>,
    config: EngineConfig,
    bot: Box<dyn BotPlayer>,
    next_game_id: AtomicI64,
}

impl GameFlowService {
    pub fn new(config: EngineConfig) -> Arc<Self> {
        Self::with_bot(config, Box::new(HeuristicBot::new(None)))
    }

    /// Inject the bot policy, e.g. a seeded one for deterministic tests.
    pub fn with_bot(config: EngineConfig, bot: Box<dyn BotPlayer>) -> Arc<Self> {
        Arc::new(Self {
            games: DashMap::new(),
            fabric: Arc::new(EventFabric::new()),
            config,
            bot,
            next_game_id: AtomicI64::new(1),
        })
    }

    pub fn fabric(&self) -> &Arc<EventFabric> {
        &self.fabric
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start the periodic heartbeat task. Call once from the embedder after
    /// a runtime exists; the task stops when the fabric is dropped.
    pub fn start_heartbeat(&self) -> tokio::task::JoinHandle<()> {
        spawn_heartbeat(&self.fabric, self.config.heartbeat_period)
    }

    // ----- game construction ----------------------------------------------

    /// Build a game from a started room's seating and deal its first round.
    pub fn create_game(
        self: &Arc<Self>,
        room_id: RoomId,
        host: PlayerId,
        seating: [SeatAssignment; 4],
        turn_timeout: Option<Duration>,
    ) -> Result<GameId, CoreError> {
        self.create_game_inner(room_id, host, seating, turn_timeout, None)
    }

    /// Like `create_game` but with a fixed first deal; fixture entry point
    /// for scripted integration tests.
    pub fn create_game_with_deal(
        self: &Arc<Self>,
        room_id: RoomId,
        host: PlayerId,
        seating: [SeatAssignment; 4],
        turn_timeout: Option<Duration>,
        deal: [Vec<Card>; 4],
    ) -> Result<GameId, CoreError> {
        self.create_game_inner(room_id, host, seating, turn_timeout, Some(deal))
    }

    fn create_game_inner(
        self: &Arc<Self>,
        room_id: RoomId,
        host: PlayerId,
        seating: [SeatAssignment; 4],
        turn_timeout: Option<Duration>,
        deal: Option<[Vec<Card>; 4]>,
    ) -> Result<GameId, CoreError> {
        let game_id = self.next_game_id.fetch_add(1, Ordering::SeqCst);
        let mut seed = [0u8; 32];
        rand::rng().fill_bytes(&mut seed);

        let mut game = Game::new(
            game_id,
            room_id,
            host,
            seating,
            seed,
            self.config.target_score,
            turn_timeout.or(self.config.default_turn_timeout),
        );
        if let Some(hands) = deal {
            game.preset_next_deal(hands);
        }
        game.start_game()?;

        let handle = Arc::new(GameHandle::new(game));
        self.games.insert(game_id, handle.clone());

        // First round's events are pending; flush and kick the drivers.
        {
            let mut game = handle.lock();
            let outbound = game.take_pending();
            self.fabric.publish(Topic::Game(game_id), &outbound);
        }
        self.schedule_followups(game_id);

        info!(game_id, room_id, "game created");
        Ok(game_id)
    }

    // ----- serialized access ----------------------------------------------

    pub(crate) fn handle(&self, game_id: GameId) -> Result<Arc<GameHandle>, CoreError> {
        self.games
            .get(&game_id)
            .map(|h| h.clone())
            .ok_or_else(|| {
                CoreError::not_found(ErrorCode::GameNotFound, format!("game {game_id} not found"))
            })
    }

    /// Run one serialized step against a game: take the token, apply `f`,
    /// fan out whatever it emitted (also on failure, e.g. rejection
    /// notices or an abort), release, then drive bots/timeouts.
    pub(crate) fn with_game<R>(
        self: &Arc<Self>,
        game_id: GameId,
        f: impl FnOnce(&mut Game) -> Result<R, CoreError>,
    ) -> Result<R, CoreError> {
        let handle = self.handle(game_id)?;
        let (result, active) = {
            let mut game = handle.lock();
            let result = f(&mut game);
            let outbound = game.take_pending();
            if !outbound.is_empty() {
                self.fabric.publish(Topic::Game(game_id), &outbound);
            }
            let active = matches!(game.phase(), Phase::Bidding | Phase::Playing);
            (result, active)
        };
        if active {
            self.schedule_followups(game_id);
        }
        result
    }
}
