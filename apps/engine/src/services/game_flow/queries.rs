//! Read-side operations: snapshots, private hands, event replay,
//! subscriptions. Coherent reads take the game's token briefly.

use super::GameFlowService;
use crate::engine::{PrivateHandView, PublicSnapshot, TurnInfo};
use crate::error::CoreError;
use crate::errors::ErrorCode;
use crate::events::{Event, Scope, Subscription};
use crate::ids::{GameId, PlayerId};

impl GameFlowService {
    pub fn get_state(&self, game_id: GameId) -> Result<PublicSnapshot, CoreError> {
        let handle = self.handle(game_id)?;
        let game = handle.lock();
        Ok(game.public_snapshot())
    }

    /// Snapshot only if the game has moved past `version`; `None` tells the
    /// caller its copy is current.
    pub fn get_state_since(
        &self,
        game_id: GameId,
        version: u64,
    ) -> Result<Option<PublicSnapshot>, CoreError> {
        let handle = self.handle(game_id)?;
        let game = handle.lock();
        if game.state_version() <= version {
            return Ok(None);
        }
        Ok(Some(game.public_snapshot()))
    }

    pub fn get_turn(&self, game_id: GameId) -> Result<TurnInfo, CoreError> {
        let handle = self.handle(game_id)?;
        let game = handle.lock();
        Ok(game.turn_info())
    }

    /// A seat's private hand; only its owner may read it.
    pub fn get_private_hand(
        &self,
        game_id: GameId,
        caller: PlayerId,
    ) -> Result<PrivateHandView, CoreError> {
        let handle = self.handle(game_id)?;
        let game = handle.lock();
        let seat = game.seat_of(caller).ok_or_else(|| {
            CoreError::forbidden(
                ErrorCode::ForbiddenNotSeated,
                format!("player {caller} holds no seat in game {game_id}"),
            )
        })?;
        game.private_hand(seat)
    }

    /// Replay the log after a cursor. Seated callers see their own private
    /// events interleaved; everyone else gets the public stream.
    pub fn list_events(
        &self,
        game_id: GameId,
        caller: Option<PlayerId>,
        after_event_id: Option<&str>,
    ) -> Result<Vec<Event>, CoreError> {
        let handle = self.handle(game_id)?;
        let game = handle.lock();
        let scope = match caller.and_then(|p| game.seat_of(p).map(|_| p)) {
            Some(player) => Scope::Private(player),
            None => Scope::Public,
        };
        Ok(game.list_events(scope, after_event_id))
    }

    /// Live subscription to a game's events. A seated caller receives
    /// private events for their own seat interleaved in version order.
    pub fn subscribe(
        &self,
        game_id: GameId,
        caller: Option<PlayerId>,
    ) -> Result<Subscription, CoreError> {
        let handle = self.handle(game_id)?;
        let scope = {
            let game = handle.lock();
            match caller.and_then(|p| game.seat_of(p).map(|_| p)) {
                Some(player) => Scope::Private(player),
                None => Scope::Public,
            }
        };
        Ok(self.fabric().subscribe_game(game_id, scope))
    }
}
