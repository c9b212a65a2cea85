//! Bot driver and turn-timeout scheduler.
//!
//! After every committed mutation the orchestration inspects the cursor.
//! A bot seat gets a deferred action with a bounded random delay; a human
//! seat with a room deadline gets a forfeit timer. Both re-enter the state
//! machine through the same serialized entry points as a human action and
//! revalidate everything inside the token; a schedule that fires after the
//! world moved on (another action landed, game cancelled) finds a changed
//! turn epoch and gives up quietly.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use super::player_actions::ActionKeys;
use super::GameFlowService;
use crate::ai::BidDecision;
use crate::domain::{Phase, Seat};
use crate::ids::{GameId, PlayerId};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum SynthOrigin {
    BotSeat,
    TurnTimeout,
}

enum Followup {
    Bot { seat: Seat, epoch: u64, delay: Duration },
    Timeout { seat: Seat, epoch: u64, deadline: Duration },
}

impl GameFlowService {
    /// Inspect the cursor after a mutation and arm whichever driver the
    /// occupying seat needs.
    pub(crate) fn schedule_followups(self: &Arc<Self>, game_id: GameId) {
        let Ok(handle) = self.handle(game_id) else {
            return;
        };

        let planned = {
            let mut game = handle.lock();
            match (game.phase(), game.turn_info().seat) {
                (Phase::Bidding | Phase::Playing, Some(seat)) => {
                    let epoch = game.turn_epoch();
                    if game.seat_assignment(seat).is_bot {
                        // Single-in-flight per seat: a pending schedule wins.
                        if game.bot_pending[seat as usize] {
                            None
                        } else {
                            game.bot_pending[seat as usize] = true;
                            Some(Followup::Bot {
                                seat,
                                epoch,
                                delay: self.pick_bot_delay(),
                            })
                        }
                    } else {
                        game.turn_timeout().map(|deadline| Followup::Timeout {
                            seat,
                            epoch,
                            deadline,
                        })
                    }
                }
                _ => None,
            }
        };

        let Some(followup) = planned else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(game_id, "no async runtime; skipping scheduled follow-up");
            return;
        };

        let service = self.clone();
        match followup {
            Followup::Bot { seat, epoch, delay } => {
                runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    service.run_synthesized_action(game_id, seat, epoch, SynthOrigin::BotSeat);
                });
            }
            Followup::Timeout {
                seat,
                epoch,
                deadline,
            } => {
                runtime.spawn(async move {
                    tokio::time::sleep(deadline).await;
                    service.run_synthesized_action(game_id, seat, epoch, SynthOrigin::TurnTimeout);
                });
            }
        }
    }

    fn pick_bot_delay(&self) -> Duration {
        let min = self.config().bot_delay_min;
        let max = self.config().bot_delay_max;
        if max <= min {
            return min;
        }
        let millis = rand::rng().random_range(min.as_millis() as u64..=max.as_millis() as u64);
        Duration::from_millis(millis)
    }

    /// The scheduled action body. Preconditions are re-checked inside the
    /// token; any failure is logged and swallowed, never retried.
    fn run_synthesized_action(
        self: &Arc<Self>,
        game_id: GameId,
        seat: Seat,
        epoch: u64,
        origin: SynthOrigin,
    ) {
        let Ok(handle) = self.handle(game_id) else {
            return;
        };

        let prepared: Option<(Phase, crate::ai::BotView, PlayerId)> = {
            let mut game = handle.lock();
            if origin == SynthOrigin::BotSeat {
                game.bot_pending[seat as usize] = false;
            }
            if game.turn_epoch() != epoch
                || game.turn_info().seat != Some(seat)
                || !matches!(game.phase(), Phase::Bidding | Phase::Playing)
            {
                None
            } else {
                Some((
                    game.phase(),
                    game.bot_view(seat),
                    game.seat_assignment(seat).player_id,
                ))
            }
        };

        let Some((phase, view, player)) = prepared else {
            debug!(game_id, seat, epoch, ?origin, "stale schedule discarded");
            return;
        };

        let keys = ActionKeys::new(format!("synth-{game_id}-{epoch}-{seat}"));
        let submitted = match phase {
            Phase::Bidding => match self.bot.choose_bid(&view) {
                Ok(BidDecision::Pass) => {
                    self.submit_action(game_id, player, keys, true, |game, ctx| {
                        game.submit_pass(ctx)
                    })
                }
                Ok(BidDecision::Bid {
                    contract_type,
                    value,
                }) => self.submit_action(game_id, player, keys, true, move |game, ctx| {
                    game.submit_bid(ctx, contract_type, value)
                }),
                Err(err) => {
                    warn!(game_id, seat, error = %err, "bot bid decision failed");
                    return;
                }
            },
            Phase::Playing => match self.bot.choose_play(&view) {
                Ok(card) => self.submit_action(game_id, player, keys, true, move |game, ctx| {
                    game.submit_play(ctx, card)
                }),
                Err(err) => {
                    warn!(game_id, seat, error = %err, "bot play decision failed");
                    return;
                }
            },
            _ => return,
        };

        if let Err(err) = submitted {
            debug!(game_id, seat, ?origin, error = %err, "synthesized action rejected");
        }
    }
}
