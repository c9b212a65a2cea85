//! Mutating operations on the `Game` aggregate.
//!
//! Every operation follows the same contract: consult the idempotency
//! index, check the expected version, validate preconditions against the
//! rules kernel, then mutate, bump the version, and emit events. A failed
//! precondition leaves the aggregate untouched: no event, no version bump.

use serde_json::json;
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::domain::bidding::{validate_surcoinche, PassOutcome};
use crate::domain::{legal_plays, next_seat, Bid, Card, Contract, ContractType, Phase};
use crate::engine::actions::{ActionCtx, MoveResult, MoveStatus};
use crate::engine::game::{Completion, Game};
use crate::error::{CoreError, RuleViolation};
use crate::errors::ErrorCode;
use crate::events::{Event, EventType, OutboundEvent};

/// What an accepted action hands back to orchestration.
#[derive(Debug)]
pub struct ActionOutcome {
    pub result: MoveResult,
    /// True when this call was answered from the idempotency index and did
    /// not mutate anything.
    pub replayed: bool,
}

impl Game {
    // ----- shared preamble -------------------------------------------------

    fn illegal(&self, violation: RuleViolation) -> CoreError {
        CoreError::IllegalMove {
            violations: vec![violation],
            state_version: Some(self.state_version),
        }
    }

    fn phase_violation(&self, wanted: &str) -> CoreError {
        self.illegal(RuleViolation::new(
            ErrorCode::PhaseMismatch,
            format!("action requires the {wanted} phase"),
        ))
    }

    /// Idempotency and version gate, common to all player actions.
    fn begin(&mut self, ctx: &ActionCtx) -> Result<Option<ActionOutcome>, CoreError> {
        if let Some(prior) = self.idempotency.get(&ctx.client_action_id) {
            return Ok(Some(ActionOutcome {
                result: prior.clone(),
                replayed: true,
            }));
        }
        if let Some(expected) = ctx.expected_version {
            if expected != self.state_version {
                return Err(CoreError::VersionConflict {
                    expected,
                    current: self.state_version,
                });
            }
        }
        Ok(None)
    }

    fn require_turn(&self, ctx: &ActionCtx) -> Result<(), CoreError> {
        if self.turn != Some(ctx.seat) {
            return Err(self.illegal(RuleViolation::new(
                ErrorCode::OutOfTurn,
                format!("seat {} is not on turn", ctx.seat),
            )));
        }
        Ok(())
    }

    /// Seal an accepted mutation: record the MoveResult for at-most-once
    /// replay and report the effects emitted since `effects_mark`.
    fn finish(&mut self, ctx: &ActionCtx, effects_mark: usize) -> ActionOutcome {
        self.touch();
        let effects: Vec<EventType> = self.pending[effects_mark..]
            .iter()
            .map(|e| e.event.event_type)
            .collect();
        let result = MoveResult {
            move_id: Uuid::new_v4(),
            client_action_id: ctx.client_action_id.clone(),
            status: MoveStatus::Accepted,
            turn_id: self.turn_id,
            state_version: self.state_version,
            effects,
            system_generated: ctx.system_generated,
            occurred_at: OffsetDateTime::now_utc(),
        };
        self.idempotency
            .insert(ctx.client_action_id.clone(), result.clone());
        ActionOutcome {
            result,
            replayed: false,
        }
    }

    // ----- lifecycle entry points ------------------------------------------

    /// Deal the first round of a freshly constructed game.
    pub fn start_game(&mut self) -> Result<(), CoreError> {
        if self.phase != Phase::Init {
            return Err(CoreError::internal("start_game outside Init phase"));
        }
        self.start_round_internal();
        self.touch();
        Ok(())
    }

    // ----- bidding ---------------------------------------------------------

    pub fn submit_bid(
        &mut self,
        ctx: &ActionCtx,
        contract_type: ContractType,
        value: u16,
    ) -> Result<ActionOutcome, CoreError> {
        if let Some(replayed) = self.begin(ctx)? {
            return Ok(replayed);
        }
        if self.phase != Phase::Bidding {
            return Err(self.phase_violation("bidding"));
        }
        self.require_turn(ctx)?;

        let bid = Bid {
            seat: ctx.seat,
            contract_type,
            value,
            at: OffsetDateTime::now_utc(),
        };
        let Some(bidding) = self.bidding.as_ref() else {
            return Err(CoreError::internal("bidding phase without auction state"));
        };
        bidding
            .validate_bid(&bid)
            .map_err(|v| self.illegal(v))?;

        let mark = self.pending.len();
        if let Some(bidding) = self.bidding.as_mut() {
            bidding.apply_bid(bid);
        }
        self.set_turn(Some(next_seat(ctx.seat)));
        let version = self.bump_version();
        let event = Event::for_game(
            self.game_id,
            EventType::BidPlaced,
            version,
            json!({
                "seat": ctx.seat,
                "contract_type": contract_type,
                "value": value,
            }),
        );
        self.emit(OutboundEvent::public(event));
        self.emit_turn_changed(version);

        Ok(self.finish(ctx, mark))
    }

    pub fn submit_pass(&mut self, ctx: &ActionCtx) -> Result<ActionOutcome, CoreError> {
        if let Some(replayed) = self.begin(ctx)? {
            return Ok(replayed);
        }
        if self.phase != Phase::Bidding {
            return Err(self.phase_violation("bidding"));
        }
        self.require_turn(ctx)?;

        let mark = self.pending.len();
        let outcome = match self.bidding.as_mut() {
            Some(bidding) => bidding.apply_pass(ctx.seat),
            None => return Err(CoreError::internal("bidding phase without auction state")),
        };
        self.set_turn(Some(next_seat(ctx.seat)));
        let version = self.bump_version();
        let event = Event::for_game(
            self.game_id,
            EventType::BidPassed,
            version,
            json!({ "seat": ctx.seat, "consecutive_passes": self.consecutive_passes() }),
        );
        self.emit(OutboundEvent::public(event));
        self.emit_turn_changed(version);

        match outcome {
            PassOutcome::Continue => {}
            PassOutcome::Finalized(bid) => {
                self.finalize_contract(Contract::from_winning_bid(&bid));
            }
            PassOutcome::Redeal => {
                let version = self.bump_version();
                let event = Event::for_game(
                    self.game_id,
                    EventType::RedealRequired,
                    version,
                    json!({ "round_number": self.round_number }),
                );
                self.emit(OutboundEvent::public(event));
                // Throw the hands in and deal again under the next round
                // number: the dealer advances and the shuffle seed moves on.
                self.phase = Phase::Init;
                self.start_round_internal();
            }
        }

        Ok(self.finish(ctx, mark))
    }

    pub fn submit_coinche(&mut self, ctx: &ActionCtx) -> Result<ActionOutcome, CoreError> {
        if let Some(replayed) = self.begin(ctx)? {
            return Ok(replayed);
        }
        if self.phase != Phase::Bidding {
            return Err(self.phase_violation("bidding"));
        }
        // Out-of-turn by design: no cursor check.

        let Some(bidding) = self.bidding.as_ref() else {
            return Err(CoreError::internal("bidding phase without auction state"));
        };
        bidding
            .validate_coinche(ctx.seat)
            .map_err(|v| self.illegal(v))?;

        let mark = self.pending.len();
        let bid = match self.bidding.as_mut().and_then(|b| b.apply_coinche(ctx.seat)) {
            Some(bid) => bid,
            None => return Err(CoreError::internal("coinche accepted without a live bid")),
        };
        let version = self.bump_version();
        let event = Event::for_game(
            self.game_id,
            EventType::BidDoubled,
            version,
            json!({ "seat": ctx.seat }),
        );
        self.emit(OutboundEvent::public(event));

        let mut contract = Contract::from_winning_bid(&bid);
        contract.doubled = true;
        contract.doubled_by = Some(ctx.seat);
        self.finalize_contract(contract);

        Ok(self.finish(ctx, mark))
    }

    /// A surcoinche answers a coinche. Because the coinche has already
    /// closed the auction and moved the game to `Playing`, it is accepted
    /// until the first card of the round hits the table.
    pub fn submit_surcoinche(&mut self, ctx: &ActionCtx) -> Result<ActionOutcome, CoreError> {
        if let Some(replayed) = self.begin(ctx)? {
            return Ok(replayed);
        }
        let round_untouched = self.current_trick.is_empty() && self.completed_tricks.is_empty();
        if self.phase != Phase::Playing || !round_untouched {
            return Err(self.illegal(RuleViolation::new(
                ErrorCode::SurcoincheNotAvailable,
                "surcoinche is only available before the first card is played",
            )));
        }
        let Some(contract) = self.contract.as_ref() else {
            return Err(CoreError::internal("playing phase without a contract"));
        };
        validate_surcoinche(
            contract.doubled,
            contract.redoubled,
            contract.declarer_team,
            ctx.seat,
        )
        .map_err(|v| self.illegal(v))?;

        let mark = self.pending.len();
        if let Some(contract) = self.contract.as_mut() {
            contract.redoubled = true;
        }
        let version = self.bump_version();
        let event = Event::for_game(
            self.game_id,
            EventType::BidRedoubled,
            version,
            json!({ "seat": ctx.seat }),
        );
        self.emit(OutboundEvent::public(event));
        self.emit_contract_finalized(version);

        Ok(self.finish(ctx, mark))
    }

    fn consecutive_passes(&self) -> u8 {
        self.bidding
            .as_ref()
            .map(|b| b.consecutive_passes)
            .unwrap_or(0)
    }

    /// Close the auction: install the contract, move to play, first leader
    /// is the seat left of the dealer.
    fn finalize_contract(&mut self, contract: Contract) {
        self.contract = Some(contract);
        self.bidding = None;
        self.phase = Phase::Playing;
        self.set_turn(Some(next_seat(self.dealer)));
        let version = self.bump_version();
        self.emit_contract_finalized(version);
        self.emit_turn_changed(version);
    }

    fn emit_contract_finalized(&mut self, version: u64) {
        let Some(contract) = self.contract.clone() else {
            return;
        };
        let event = Event::for_game(
            self.game_id,
            EventType::ContractFinalized,
            version,
            json!({ "contract": contract }),
        );
        self.emit(OutboundEvent::public(event));
    }

    // ----- card play -------------------------------------------------------

    pub fn submit_play(&mut self, ctx: &ActionCtx, card: Card) -> Result<ActionOutcome, CoreError> {
        if let Some(replayed) = self.begin(ctx)? {
            return Ok(replayed);
        }
        if self.phase != Phase::Playing {
            return Err(self.phase_violation("playing"));
        }
        self.require_turn(ctx)?;

        let Some(contract_type) = self.contract.as_ref().map(|c| c.contract_type) else {
            return Err(CoreError::internal("playing phase without a contract"));
        };
        let hand = &self.hands[ctx.seat as usize];
        if !hand.cards.contains(&card) {
            return Err(self.illegal(RuleViolation::new(
                ErrorCode::CardNotInHand,
                format!("card {card} is not in hand"),
            )));
        }
        let legal = legal_plays(&hand.cards, &self.current_trick, contract_type, ctx.seat);
        if !legal.contains(&card) {
            let violation = classify_play_violation(
                &hand.cards,
                &self.current_trick,
                contract_type,
                card,
            );
            return Err(self.illegal(violation));
        }

        let mark = self.pending.len();

        // Card leaves the hand and lands on the table.
        let hand = &mut self.hands[ctx.seat as usize];
        hand.cards.retain(|c| *c != card);
        hand.version += 1;
        let hand_version = hand.version;
        let remaining = hand.cards.clone();
        self.current_trick.push(crate::domain::TrickPlay {
            seat: ctx.seat,
            card,
        });

        let trick_complete = crate::domain::tricks::is_complete(&self.current_trick);
        if !trick_complete {
            self.set_turn(Some(next_seat(ctx.seat)));
        }

        let version = self.bump_version();
        let accepted = Event::for_game(
            self.game_id,
            EventType::MoveAccepted,
            version,
            json!({
                "seat": ctx.seat,
                "card": card,
                "trick_position": self.current_trick.len(),
                "system_generated": ctx.system_generated,
            }),
        );
        self.emit(OutboundEvent::public(accepted));
        let updated = Event::for_game(
            self.game_id,
            EventType::HandUpdated,
            version,
            json!({
                "seat": ctx.seat,
                "cards": remaining,
                "hand_version": hand_version,
            }),
        );
        self.emit(OutboundEvent::private(
            updated,
            self.seating[ctx.seat as usize].player_id,
        ));
        if !trick_complete {
            self.emit_turn_changed(version);
        }

        if trick_complete {
            self.resolve_trick();
            if self.completed_tricks.len() == crate::domain::HAND_SIZE {
                self.score_round_internal();
            }
        }

        if let Err(detail) = self.check_card_conservation() {
            self.abort(&detail);
            return Err(CoreError::internal(format!(
                "game {} aborted: {detail}",
                self.game_id
            )));
        }

        Ok(self.finish(ctx, mark))
    }

    // ----- administrative --------------------------------------------------

    /// Tournament escape hatch: flag a past move for operator review. No
    /// rollback is attempted.
    pub fn invalidate_move(&mut self, move_id: Uuid) -> Result<(), CoreError> {
        let known = self.idempotency.values().any(|r| r.move_id == move_id);
        if !known {
            return Err(CoreError::not_found(
                ErrorCode::MoveNotFound,
                format!("move {move_id} not found"),
            ));
        }
        let version = self.bump_version();
        let event = Event::for_game(
            self.game_id,
            EventType::MoveInvalidated,
            version,
            json!({ "move_id": move_id }),
        );
        self.emit(OutboundEvent::public(event));
        self.touch();
        Ok(())
    }

    /// External cancellation by host or admin.
    pub fn cancel(&mut self, reason: &str) -> Result<(), CoreError> {
        if self.phase == Phase::Completed {
            return Err(self.illegal(RuleViolation::new(
                ErrorCode::PhaseMismatch,
                "game is already completed",
            )));
        }
        self.phase = Phase::Completed;
        self.completion = Some(Completion::Cancelled {
            reason: reason.to_string(),
        });
        self.set_turn(None);
        let version = self.bump_version();
        let event = Event::for_game(
            self.game_id,
            EventType::GameCancelled,
            version,
            json!({ "reason": reason }),
        );
        self.emit(OutboundEvent::public(event));
        self.touch();
        Ok(())
    }

    /// Internal invariant violation: fatal for this game only.
    pub(crate) fn abort(&mut self, detail: &str) {
        warn!(game_id = self.game_id, detail, "aborting game");
        self.phase = Phase::Completed;
        self.completion = Some(Completion::Aborted {
            detail: detail.to_string(),
        });
        self.set_turn(None);
        let version = self.bump_version();
        let event = Event::for_game(
            self.game_id,
            EventType::GameAborted,
            version,
            json!({ "detail": detail }),
        );
        self.emit(OutboundEvent::public(event));
        self.touch();
    }

    /// Build the transient rejection notice for a seat whose action the
    /// rules kernel refused. Informational: not logged, no version bump.
    pub fn rejection_notice(&self, seat: crate::domain::Seat, error: &CoreError) -> OutboundEvent {
        let event = Event {
            payload: json!({
                "seat": seat,
                "code": error.code().as_str(),
                "detail": error.to_string(),
            }),
            ..Event::system(self.game_id, EventType::MoveRejected, self.state_version)
        };
        OutboundEvent::private(event, self.seating[seat as usize].player_id)
    }
}

/// Name the specific obligation an illegal card failed, for the violation
/// list of the rejection.
fn classify_play_violation(
    hand: &[Card],
    trick: &[crate::domain::TrickPlay],
    contract_type: ContractType,
    card: Card,
) -> RuleViolation {
    let Some(first) = trick.first() else {
        // An empty trick accepts any held card, so an illegal play on an
        // empty trick cannot happen; keep a readable fallback anyway.
        return RuleViolation::new(ErrorCode::ValidationError, "illegal play");
    };
    let lead = first.card.suit;
    if crate::domain::hand_has_suit(hand, lead) {
        if card.suit != lead {
            return RuleViolation::new(
                ErrorCode::MustFollowSuit,
                format!("must follow {lead:?}"),
            );
        }
        return RuleViolation::new(
            ErrorCode::MustOvertrump,
            "must play a higher trump than the one on the table",
        );
    }
    if let Some(trump_suit) = contract_type.trump_suit() {
        if card.suit != trump_suit && crate::domain::hand_has_suit(hand, trump_suit) {
            return RuleViolation::new(
                ErrorCode::MustPlayTrump,
                format!("void in {lead:?}: must play {trump_suit:?}"),
            );
        }
        return RuleViolation::new(
            ErrorCode::MustOvertrump,
            "must play a higher trump than the one on the table",
        );
    }
    RuleViolation::new(ErrorCode::ValidationError, "illegal play")
}
