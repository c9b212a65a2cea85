//! Contracts and bids: trump modes, priority ordering, dominance.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::cards::Suit;
use super::state::{Seat, Team};

/// What a bid commits to: a trump suit, no-trump, or all-trump.
///
/// Priority order (low to high): clubs, diamonds, hearts, spades, no-trump,
/// all-trump. A bid at equal value wins only with a strictly higher
/// priority.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
    NoTrump,
    AllTrump,
}

pub const ALL_CONTRACT_TYPES: [ContractType; 6] = [
    ContractType::Clubs,
    ContractType::Diamonds,
    ContractType::Hearts,
    ContractType::Spades,
    ContractType::NoTrump,
    ContractType::AllTrump,
];

impl ContractType {
    pub fn priority(self) -> u8 {
        match self {
            ContractType::Clubs => 0,
            ContractType::Diamonds => 1,
            ContractType::Hearts => 2,
            ContractType::Spades => 3,
            ContractType::NoTrump => 4,
            ContractType::AllTrump => 5,
        }
    }

    /// The single trump suit, when the mode names one.
    pub fn trump_suit(self) -> Option<Suit> {
        match self {
            ContractType::Clubs => Some(Suit::Clubs),
            ContractType::Diamonds => Some(Suit::Diamonds),
            ContractType::Hearts => Some(Suit::Hearts),
            ContractType::Spades => Some(Suit::Spades),
            ContractType::NoTrump | ContractType::AllTrump => None,
        }
    }

    /// Whether `suit` counts as trump under this mode.
    pub fn is_trump(self, suit: Suit) -> bool {
        match self {
            ContractType::NoTrump => false,
            ContractType::AllTrump => true,
            other => other.trump_suit() == Some(suit),
        }
    }
}

impl From<Suit> for ContractType {
    fn from(suit: Suit) -> Self {
        match suit {
            Suit::Clubs => ContractType::Clubs,
            Suit::Diamonds => ContractType::Diamonds,
            Suit::Hearts => ContractType::Hearts,
            Suit::Spades => ContractType::Spades,
        }
    }
}

/// The opening floor: no contract may be bid below 80 points.
pub const MIN_BID_VALUE: u16 = 80;

/// One entry of the bid log.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub seat: Seat,
    pub contract_type: ContractType,
    pub value: u16,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

impl Bid {
    /// Strict dominance: higher value, or equal value with higher priority.
    pub fn dominates(&self, prior: &Bid) -> bool {
        self.value > prior.value
            || (self.value == prior.value
                && self.contract_type.priority() > prior.contract_type.priority())
    }
}

/// The resolved contract a round is played under.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub contract_type: ContractType,
    /// Point target, >= 80.
    pub value: u16,
    pub declarer: Seat,
    pub declarer_team: Team,
    pub doubled: bool,
    pub doubled_by: Option<Seat>,
    pub redoubled: bool,
}

impl Contract {
    pub fn from_winning_bid(bid: &Bid) -> Self {
        Self {
            contract_type: bid.contract_type,
            value: bid.value,
            declarer: bid.seat,
            declarer_team: Team::of_seat(bid.seat),
            doubled: false,
            doubled_by: None,
            redoubled: false,
        }
    }

    /// Stake multiplier: x2 when doubled, x4 when redoubled.
    pub fn multiplier(&self) -> i32 {
        if self.redoubled {
            4
        } else if self.doubled {
            2
        } else {
            1
        }
    }
}
