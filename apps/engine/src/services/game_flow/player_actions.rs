//! Inbound player actions, routed through the game's serialization token.
//!
//! Each entry point resolves the caller to a seat, builds the action
//! context, and lets the aggregate validate. Rule rejections additionally
//! push a transient `move.rejected` notice onto the caller's private
//! channel; the aggregate itself stays untouched.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::{GameFlowService, Role};
use crate::domain::{Card, ContractType};
use crate::engine::{ActionCtx, ActionOutcome, Game, MoveResult};
use crate::error::CoreError;
use crate::errors::ErrorCode;
use crate::ids::{GameId, PlayerId};

/// At-most-once and optimistic-concurrency keys accompanying every player
/// action.
#[derive(Debug, Clone)]
pub struct ActionKeys {
    pub client_action_id: String,
    pub expected_version: Option<u64>,
}

impl ActionKeys {
    pub fn new(client_action_id: impl Into<String>) -> Self {
        Self {
            client_action_id: client_action_id.into(),
            expected_version: None,
        }
    }

    pub fn at_version(client_action_id: impl Into<String>, version: u64) -> Self {
        Self {
            client_action_id: client_action_id.into(),
            expected_version: Some(version),
        }
    }
}

impl GameFlowService {
    pub fn submit_bid(
        self: &Arc<Self>,
        game_id: GameId,
        caller: PlayerId,
        contract_type: ContractType,
        value: u16,
        keys: ActionKeys,
    ) -> Result<MoveResult, CoreError> {
        debug!(game_id, caller, ?contract_type, value, "submit bid");
        self.submit_action(game_id, caller, keys, false, move |game, ctx| {
            game.submit_bid(ctx, contract_type, value)
        })
    }

    pub fn submit_pass(
        self: &Arc<Self>,
        game_id: GameId,
        caller: PlayerId,
        keys: ActionKeys,
    ) -> Result<MoveResult, CoreError> {
        debug!(game_id, caller, "submit pass");
        self.submit_action(game_id, caller, keys, false, |game, ctx| {
            game.submit_pass(ctx)
        })
    }

    pub fn submit_coinche(
        self: &Arc<Self>,
        game_id: GameId,
        caller: PlayerId,
        keys: ActionKeys,
    ) -> Result<MoveResult, CoreError> {
        debug!(game_id, caller, "submit coinche");
        self.submit_action(game_id, caller, keys, false, |game, ctx| {
            game.submit_coinche(ctx)
        })
    }

    pub fn submit_surcoinche(
        self: &Arc<Self>,
        game_id: GameId,
        caller: PlayerId,
        keys: ActionKeys,
    ) -> Result<MoveResult, CoreError> {
        debug!(game_id, caller, "submit surcoinche");
        self.submit_action(game_id, caller, keys, false, |game, ctx| {
            game.submit_surcoinche(ctx)
        })
    }

    pub fn submit_play(
        self: &Arc<Self>,
        game_id: GameId,
        caller: PlayerId,
        card: Card,
        keys: ActionKeys,
    ) -> Result<MoveResult, CoreError> {
        debug!(game_id, caller, card = %card, "submit play");
        self.submit_action(game_id, caller, keys, false, move |game, ctx| {
            game.submit_play(ctx, card)
        })
    }

    /// Shared path for human and synthesized actions.
    pub(super) fn submit_action(
        self: &Arc<Self>,
        game_id: GameId,
        caller: PlayerId,
        keys: ActionKeys,
        system_generated: bool,
        op: impl FnOnce(&mut Game, &ActionCtx) -> Result<ActionOutcome, CoreError>,
    ) -> Result<MoveResult, CoreError> {
        self.with_game(game_id, move |game| {
            let seat = game.seat_of(caller).ok_or_else(|| {
                CoreError::forbidden(
                    ErrorCode::ForbiddenNotSeated,
                    format!("player {caller} is not seated at game {game_id}"),
                )
            })?;
            let mut ctx = ActionCtx::new(seat, keys.client_action_id);
            ctx.expected_version = keys.expected_version;
            ctx.system_generated = system_generated;

            match op(game, &ctx) {
                Ok(outcome) => Ok(outcome.result),
                Err(err @ CoreError::IllegalMove { .. }) => {
                    // Informational only: no log append, no version bump.
                    let notice = game.rejection_notice(seat, &err);
                    game.pending.push(notice);
                    Err(err)
                }
                Err(err) => Err(err),
            }
        })
    }

    // ----- administrative --------------------------------------------------

    /// Tournament-only escape hatch; flags a move for operator workflow.
    pub fn invalidate_move(
        self: &Arc<Self>,
        game_id: GameId,
        role: Role,
        move_id: Uuid,
    ) -> Result<(), CoreError> {
        if role != Role::Admin {
            return Err(CoreError::forbidden(
                ErrorCode::ForbiddenNotAdmin,
                "invalidate-move requires the admin role",
            ));
        }
        self.with_game(game_id, |game| game.invalidate_move(move_id))
    }

    /// External cancellation: admins always, the room host otherwise.
    pub fn cancel_game(
        self: &Arc<Self>,
        game_id: GameId,
        caller: PlayerId,
        role: Role,
        reason: &str,
    ) -> Result<(), CoreError> {
        self.with_game(game_id, |game| {
            if role != Role::Admin && game.host() != caller {
                return Err(CoreError::forbidden(
                    ErrorCode::ForbiddenNotHost,
                    "only the host or an admin may cancel a game",
                ));
            }
            game.cancel(reason)
        })
    }
}
