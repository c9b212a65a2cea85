//! The `Game` aggregate: the sole owner of one match's authoritative state.
//!
//! Everything here runs while the caller holds the game's serialization
//! token; methods are plain `&mut self` and never suspend. Mutating
//! operations live in `ops.rs`; this file holds the aggregate itself and
//! the round-lifecycle internals it shares.
//!
//! Events are appended to the per-game log the moment they are emitted and
//! buffered in `pending` until the orchestration layer drains them for
//! fan-out, still under the game's token. Log order therefore always equals
//! commit order equals dispatch order.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::json;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::domain::{
    deal_hands, derive_deal_seed, next_seat, score_round, trick_points, winning_team, BiddingState,
    Card, CompletedTrick, Contract, Phase, Rank, RoundTally, Seat, Team, TeamScores, TrickPlay,
    SEATS,
};
use crate::engine::actions::{MoveResult, TurnInfo};
use crate::events::{Event, EventLog, EventType, OutboundEvent};
use crate::ids::{GameId, PlayerId, RoomId};

/// One seat's private cards plus the per-hand change counter.
#[derive(Debug, Clone, Default)]
pub struct Hand {
    pub cards: Vec<Card>,
    pub version: u64,
}

/// Who occupies a seat for the lifetime of a game.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SeatAssignment {
    pub player_id: PlayerId,
    pub is_bot: bool,
}

/// Why a game reached `Completed`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Completion {
    Won { winner: Team },
    Cancelled { reason: String },
    Aborted { detail: String },
}

pub struct Game {
    pub game_id: GameId,
    pub room_id: RoomId,
    /// The room host; may cancel the game without the admin role.
    pub(crate) host: PlayerId,
    pub(crate) seating: [SeatAssignment; 4],
    pub(crate) hands: [Hand; 4],
    pub(crate) bidding: Option<BiddingState>,
    pub(crate) contract: Option<Contract>,
    pub(crate) current_trick: Vec<TrickPlay>,
    pub(crate) completed_tricks: Vec<CompletedTrick>,
    pub(crate) round_number: u32,
    pub(crate) cumulative: TeamScores,
    pub(crate) turn: Option<Seat>,
    pub(crate) turn_id: u64,
    pub(crate) phase: Phase,
    pub(crate) state_version: u64,
    pub(crate) idempotency: HashMap<String, MoveResult>,
    pub(crate) last_updated_at: OffsetDateTime,
    pub(crate) dealer: Seat,
    pub(crate) game_seed: [u8; 32],
    pub(crate) target_score: i32,
    pub(crate) completion: Option<Completion>,
    pub(crate) log: EventLog,
    /// Emitted but not yet fanned out; drained by orchestration under the
    /// game's token.
    pub(crate) pending: Vec<OutboundEvent>,
    /// Bumped whenever the turn moves; stale bot/timeout schedules compare
    /// against it inside the token and give up quietly.
    pub(crate) turn_epoch: u64,
    /// Single-in-flight guard: at most one scheduled bot action per seat.
    pub(crate) bot_pending: [bool; 4],
    pub(crate) turn_timeout: Option<Duration>,
    /// Set by fixtures to deal fixed hands instead of from the seed.
    pub(crate) fixed_deal: Option<[Vec<Card>; 4]>,
}

impl Game {
    pub fn new(
        game_id: GameId,
        room_id: RoomId,
        host: PlayerId,
        seating: [SeatAssignment; 4],
        game_seed: [u8; 32],
        target_score: i32,
        turn_timeout: Option<Duration>,
    ) -> Self {
        Self {
            game_id,
            room_id,
            host,
            seating,
            hands: Default::default(),
            bidding: None,
            contract: None,
            current_trick: Vec::new(),
            completed_tricks: Vec::new(),
            round_number: 0,
            cumulative: TeamScores::default(),
            turn: None,
            turn_id: 0,
            phase: Phase::Init,
            state_version: 0,
            idempotency: HashMap::new(),
            last_updated_at: OffsetDateTime::now_utc(),
            dealer: 0,
            game_seed,
            target_score,
            completion: None,
            log: EventLog::new(),
            pending: Vec::new(),
            turn_epoch: 0,
            bot_pending: [false; 4],
            turn_timeout,
            fixed_deal: None,
        }
    }

    // ----- plain accessors -------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn host(&self) -> PlayerId {
        self.host
    }

    pub fn state_version(&self) -> u64 {
        self.state_version
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn cumulative_score(&self) -> TeamScores {
        self.cumulative
    }

    pub fn dealer(&self) -> Seat {
        self.dealer
    }

    pub fn contract(&self) -> Option<&Contract> {
        self.contract.as_ref()
    }

    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    pub fn turn_timeout(&self) -> Option<Duration> {
        self.turn_timeout
    }

    pub fn turn_epoch(&self) -> u64 {
        self.turn_epoch
    }

    pub fn turn_info(&self) -> TurnInfo {
        TurnInfo {
            turn_id: self.turn_id,
            seat: self.turn,
            phase: self.phase,
        }
    }

    pub fn seat_of(&self, player_id: PlayerId) -> Option<Seat> {
        self.seating
            .iter()
            .position(|s| s.player_id == player_id)
            .map(|i| i as Seat)
    }

    pub fn seat_assignment(&self, seat: Seat) -> SeatAssignment {
        self.seating[seat as usize]
    }

    pub fn turn_order(&self) -> [PlayerId; 4] {
        [
            self.seating[0].player_id,
            self.seating[1].player_id,
            self.seating[2].player_id,
            self.seating[3].player_id,
        ]
    }

    /// Fix the next deal to the given hands. Fixture-only entry point used
    /// by scripted round tests; a live deal always comes from the seed.
    pub fn preset_next_deal(&mut self, hands: [Vec<Card>; 4]) {
        self.fixed_deal = Some(hands);
    }

    // ----- event plumbing --------------------------------------------------

    /// Append to the log and queue for fan-out, preserving one order.
    pub(crate) fn emit(&mut self, event: OutboundEvent) {
        self.log.append(std::slice::from_ref(&event));
        self.pending.push(event);
    }

    /// Drain events awaiting fan-out. Orchestration calls this under the
    /// game's token after every operation, successful or not.
    pub fn take_pending(&mut self) -> Vec<OutboundEvent> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn bump_version(&mut self) -> u64 {
        self.state_version += 1;
        self.state_version
    }

    pub(crate) fn touch(&mut self) {
        self.last_updated_at = OffsetDateTime::now_utc();
    }

    /// Move the turn cursor, bumping the turn counter and epoch.
    pub(crate) fn set_turn(&mut self, seat: Option<Seat>) {
        self.turn = seat;
        self.turn_id += 1;
        self.turn_epoch += 1;
    }

    pub(crate) fn emit_turn_changed(&mut self, version: u64) {
        let event = Event::for_game(
            self.game_id,
            EventType::TurnChanged,
            version,
            json!({
                "turn_id": self.turn_id,
                "seat": self.turn,
                "phase": self.phase,
            }),
        );
        self.emit(OutboundEvent::public(event));
    }

    // ----- round lifecycle -------------------------------------------------

    /// Deal a fresh round: shuffle (or take the preset fixture deal),
    /// install bidding state, hand the cursor to the seat left of the
    /// dealer. Caller has already validated the phase.
    pub(crate) fn start_round_internal(&mut self) {
        self.round_number += 1;
        if self.round_number > 1 {
            self.dealer = next_seat(self.dealer);
        }

        let hands = match self.fixed_deal.take() {
            Some(fixed) => fixed,
            None => {
                let seed = derive_deal_seed(&self.game_seed, self.round_number);
                deal_hands(seed, self.dealer)
            }
        };
        for (seat, cards) in hands.into_iter().enumerate() {
            self.hands[seat].cards = cards;
            self.hands[seat].version += 1;
        }

        self.bidding = Some(BiddingState::new());
        self.contract = None;
        self.current_trick.clear();
        self.completed_tricks.clear();
        self.phase = Phase::Bidding;
        self.set_turn(Some(next_seat(self.dealer)));

        let version = self.bump_version();
        let started = Event::for_game(
            self.game_id,
            EventType::RoundStarted,
            version,
            json!({
                "round_number": self.round_number,
                "dealer": self.dealer,
                "first_to_act": self.turn,
            }),
        );
        self.emit(OutboundEvent::public(started));

        for seat in 0..SEATS {
            let payload = json!({
                "seat": seat,
                "cards": self.hands[seat].cards,
                "hand_version": self.hands[seat].version,
            });
            let dealt = Event::for_game(self.game_id, EventType::HandDealt, version, payload);
            self.emit(OutboundEvent::private(dealt, self.seating[seat].player_id));
        }
        self.emit_turn_changed(version);

        info!(
            game_id = self.game_id,
            round = self.round_number,
            dealer = self.dealer,
            "round dealt"
        );
    }

    /// Resolve a full trick: winner takes the lead, trick moves to history.
    pub(crate) fn resolve_trick(&mut self) {
        let contract_type = match &self.contract {
            Some(c) => c.contract_type,
            None => return,
        };
        let Some(winner) = crate::domain::current_winner(&self.current_trick, contract_type) else {
            return;
        };
        let points = trick_points(&self.current_trick, contract_type);
        let plays = std::mem::take(&mut self.current_trick);
        self.completed_tricks.push(CompletedTrick {
            plays,
            winner,
            points,
        });
        self.set_turn(Some(winner));

        let version = self.bump_version();
        let event = Event::for_game(
            self.game_id,
            EventType::TrickCompleted,
            version,
            json!({
                "trick_number": self.completed_tricks.len(),
                "winner": winner,
                "points": points,
            }),
        );
        self.emit(OutboundEvent::public(event));
        self.emit_turn_changed(version);

        debug!(
            game_id = self.game_id,
            trick = self.completed_tricks.len(),
            winner,
            points,
            "trick resolved"
        );
    }

    /// After the eighth trick: tally, award, and either finish the game or
    /// deal the next round.
    pub(crate) fn score_round_internal(&mut self) {
        let Some(contract) = self.contract.clone() else {
            return;
        };
        self.phase = Phase::Scoring;
        self.set_turn(None);

        let tally = self.build_round_tally(&contract);
        let score = score_round(&tally);
        self.cumulative.team_a += score.awarded[Team::A.index()];
        self.cumulative.team_b += score.awarded[Team::B.index()];

        let version = self.bump_version();
        let event = Event::for_game(
            self.game_id,
            EventType::RoundCompleted,
            version,
            json!({
                "round_number": self.round_number,
                "contract": contract,
                "fulfilled": score.fulfilled,
                "capot": score.capot,
                "belote": score.belote,
                "raw_totals": {
                    "team_a": score.raw_totals[Team::A.index()],
                    "team_b": score.raw_totals[Team::B.index()],
                },
                "awarded": {
                    "team_a": score.awarded[Team::A.index()],
                    "team_b": score.awarded[Team::B.index()],
                },
                "cumulative": self.cumulative,
            }),
        );
        self.emit(OutboundEvent::public(event));

        info!(
            game_id = self.game_id,
            round = self.round_number,
            fulfilled = score.fulfilled,
            team_a = self.cumulative.team_a,
            team_b = self.cumulative.team_b,
            "round scored"
        );

        let cumulative = [self.cumulative.team_a, self.cumulative.team_b];
        if let Some(winner) = winning_team(cumulative, self.target_score) {
            self.phase = Phase::Completed;
            self.completion = Some(Completion::Won { winner });
            let version = self.bump_version();
            let event = Event::for_game(
                self.game_id,
                EventType::GameCompleted,
                version,
                json!({
                    "winner": winner,
                    "cumulative": self.cumulative,
                    "rounds_played": self.round_number,
                }),
            );
            self.emit(OutboundEvent::public(event));
            info!(game_id = self.game_id, ?winner, "game completed");
        } else {
            self.start_round_internal();
        }
    }

    fn build_round_tally(&self, contract: &Contract) -> RoundTally {
        let mut trick_points = [0i32; 2];
        let mut tricks_won = [0u8; 2];
        let mut last_trick_winner = Team::A;
        for trick in &self.completed_tricks {
            let team = Team::of_seat(trick.winner);
            trick_points[team.index()] += trick.points;
            tricks_won[team.index()] += 1;
            last_trick_winner = team;
        }

        RoundTally {
            contract: contract.clone(),
            trick_points,
            tricks_won,
            last_trick_winner,
            belote: self.detect_belote(contract),
        }
    }

    /// Belote/Rebelote: one seat played both king and queen of a trump
    /// suit this round. Not applicable under no-trump; under all-trump the
    /// pair may come from any single suit.
    fn detect_belote(&self, contract: &Contract) -> Option<Team> {
        let mut played: HashMap<(Seat, crate::domain::Suit), (bool, bool)> = HashMap::new();
        for play in self
            .completed_tricks
            .iter()
            .flat_map(|t| t.plays.iter())
            .chain(self.current_trick.iter())
        {
            if !contract.contract_type.is_trump(play.card.suit) {
                continue;
            }
            let entry = played.entry((play.seat, play.card.suit)).or_default();
            match play.card.rank {
                Rank::King => entry.0 = true,
                Rank::Queen => entry.1 = true,
                _ => {}
            }
        }
        played
            .iter()
            .find(|(_, (king, queen))| *king && *queen)
            .map(|((seat, _), _)| Team::of_seat(*seat))
    }

    // ----- invariants ------------------------------------------------------

    /// The 32 cards of the round must sit in exactly one place: a hand, the
    /// current trick, or a completed trick. Returns a description of the
    /// first violation found.
    pub(crate) fn check_card_conservation(&self) -> Result<(), String> {
        if !matches!(self.phase, Phase::Bidding | Phase::Playing) {
            return Ok(());
        }
        let mut seen = std::collections::HashSet::new();
        let mut total = 0usize;
        let all = self
            .hands
            .iter()
            .flat_map(|h| h.cards.iter().copied())
            .chain(self.current_trick.iter().map(|p| p.card))
            .chain(
                self.completed_tricks
                    .iter()
                    .flat_map(|t| t.plays.iter().map(|p| p.card)),
            );
        for card in all {
            total += 1;
            if !seen.insert(card) {
                return Err(format!("card {card} present twice"));
            }
        }
        if total != 32 {
            return Err(format!("expected 32 cards in play, found {total}"));
        }
        Ok(())
    }
}
