//! Projections of the aggregate for the outside world.
//!
//! The public snapshot is materialized field by field from the aggregate;
//! it never holds a reference into the hands, and hands only ever appear as
//! counts. Filtering a full DTO down would risk leaking hidden cards, so
//! nothing here works that way.

use serde::Serialize;
use time::OffsetDateTime;

use crate::ai::BotView;
use crate::domain::{
    current_winner, legal_plays, partner_of, Bid, Card, Contract, Phase, Seat, TeamScores,
    TrickPlay,
};
use crate::engine::actions::TurnInfo;
use crate::engine::game::Game;
use crate::error::CoreError;
use crate::errors::ErrorCode;
use crate::events::{Event, Scope};
use crate::ids::{GameId, PlayerId, RoomId};

/// Aggregate card-container facts safe for any observer.
#[derive(Debug, Clone, Serialize)]
pub struct PublicContainers {
    /// Always zero once dealt; the full deck goes out 3-2-3.
    pub draw_pile_count: u8,
    pub current_trick: Vec<TrickPlay>,
    pub trick_history_count: u8,
    pub hand_counts: [u8; 4],
}

/// Auction facts visible to everyone while bidding runs.
#[derive(Debug, Clone, Serialize)]
pub struct AuctionSnapshot {
    pub current_bid: Option<Bid>,
    pub consecutive_passes: u8,
    pub doubled: bool,
    pub redoubled: bool,
}

/// The public state of one game, safe to hand to any subscriber.
#[derive(Debug, Clone, Serialize)]
pub struct PublicSnapshot {
    pub game_id: GameId,
    pub room_id: RoomId,
    pub status: Phase,
    pub turn: TurnInfo,
    pub turn_order: [PlayerId; 4],
    pub dealer: Seat,
    pub round_number: u32,
    pub state_version: u64,
    pub cumulative_score: TeamScores,
    pub contract: Option<Contract>,
    pub auction: Option<AuctionSnapshot>,
    pub public_containers: PublicContainers,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated_at: OffsetDateTime,
}

/// One seat's cards, returned only to that seat's owner.
#[derive(Debug, Clone, Serialize)]
pub struct PrivateHandView {
    pub game_id: GameId,
    pub seat: Seat,
    pub player_id: PlayerId,
    pub cards: Vec<Card>,
    pub hand_version: u64,
    /// Cards the rules kernel currently accepts from this seat; empty when
    /// it is not the seat's turn to play.
    pub legal_plays: Vec<Card>,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated_at: OffsetDateTime,
}

impl Game {
    /// Materialize the public projection. Built from scratch on purpose:
    /// only public fields are ever read.
    pub fn public_snapshot(&self) -> PublicSnapshot {
        let hand_counts = [
            self.hands[0].cards.len() as u8,
            self.hands[1].cards.len() as u8,
            self.hands[2].cards.len() as u8,
            self.hands[3].cards.len() as u8,
        ];
        PublicSnapshot {
            game_id: self.game_id,
            room_id: self.room_id,
            status: self.phase,
            turn: self.turn_info(),
            turn_order: self.turn_order(),
            dealer: self.dealer,
            round_number: self.round_number,
            state_version: self.state_version,
            cumulative_score: self.cumulative,
            contract: self.contract.clone(),
            auction: self.bidding.as_ref().map(|b| AuctionSnapshot {
                current_bid: b.current_bid,
                consecutive_passes: b.consecutive_passes,
                doubled: b.doubled,
                redoubled: b.redoubled,
            }),
            public_containers: PublicContainers {
                draw_pile_count: 0,
                current_trick: self.current_trick.clone(),
                trick_history_count: self.completed_tricks.len() as u8,
                hand_counts,
            },
            last_updated_at: self.last_updated_at,
        }
    }

    /// The private hand of `seat`. Caller identity has been checked by
    /// orchestration before this runs.
    pub fn private_hand(&self, seat: Seat) -> Result<PrivateHandView, CoreError> {
        if usize::from(seat) >= 4 {
            return Err(CoreError::invalid_payload(
                ErrorCode::InvalidSeat,
                format!("seat {seat} out of range"),
            ));
        }
        let hand = &self.hands[seat as usize];
        let legal = if self.phase == Phase::Playing && self.turn == Some(seat) {
            match self.contract.as_ref() {
                Some(c) => legal_plays(&hand.cards, &self.current_trick, c.contract_type, seat),
                None => Vec::new(),
            }
        } else {
            Vec::new()
        };
        Ok(PrivateHandView {
            game_id: self.game_id,
            seat,
            player_id: self.seating[seat as usize].player_id,
            cards: hand.cards.clone(),
            hand_version: hand.version,
            legal_plays: legal,
            last_updated_at: self.last_updated_at,
        })
    }

    /// What a bot is allowed to know when deciding: its own hand plus the
    /// public table facts.
    pub fn bot_view(&self, seat: Seat) -> BotView {
        let hand = self.hands[seat as usize].cards.clone();
        let contract_type = self.contract.as_ref().map(|c| c.contract_type);
        let legal = match (self.phase, contract_type) {
            (Phase::Playing, Some(ct)) => legal_plays(&hand, &self.current_trick, ct, seat),
            _ => Vec::new(),
        };
        let partner_winning = contract_type
            .and_then(|ct| current_winner(&self.current_trick, ct))
            .map(|winner| winner == partner_of(seat))
            .unwrap_or(false);
        BotView {
            seat,
            hand,
            phase: self.phase,
            current_bid: self
                .bidding
                .as_ref()
                .and_then(|b| b.current_bid)
                .map(|b| (b.contract_type, b.value)),
            contract_type,
            trick_empty: self.current_trick.is_empty(),
            partner_winning,
            legal_plays: legal,
        }
    }

    /// Replay the event log for one reader scope.
    pub fn list_events(&self, scope: Scope, after_event_id: Option<&str>) -> Vec<Event> {
        self.log.list_since(after_event_id, scope)
    }
}
