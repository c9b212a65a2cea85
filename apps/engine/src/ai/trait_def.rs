//! Bot player trait definition.

use std::fmt;

use crate::domain::{Card, ContractType, Phase, Seat};

/// Errors that can occur during bot decision-making.
#[derive(Debug)]
pub enum BotError {
    /// No legal option existed for the requested decision
    NoLegalOption,
    /// Bot encountered an internal error
    Internal(String),
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotError::NoLegalOption => write!(f, "bot has no legal option"),
            BotError::Internal(msg) => write!(f, "bot internal error: {msg}"),
        }
    }
}

impl std::error::Error for BotError {}

/// Everything a bot may look at when deciding: its own hand plus public
/// table facts. Built by the aggregate so a bot can never reach hidden
/// state.
#[derive(Debug, Clone)]
pub struct BotView {
    pub seat: Seat,
    pub hand: Vec<Card>,
    pub phase: Phase,
    /// Standing bid, if any, as (mode, value).
    pub current_bid: Option<(ContractType, u16)>,
    /// Resolved contract mode once play has started.
    pub contract_type: Option<ContractType>,
    pub trick_empty: bool,
    /// Whether the seat's partner currently holds the trick.
    pub partner_winning: bool,
    /// Legal cards in play phase; empty otherwise.
    pub legal_plays: Vec<Card>,
}

/// A bot's answer during the auction. Bots never coinche or surcoinche.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BidDecision {
    Pass,
    Bid { contract_type: ContractType, value: u16 },
}

/// Trait for bot players filling otherwise-empty seats.
///
/// Implementations must be `Send + Sync`; the driver calls them from
/// scheduled tasks. Decisions must come from the view's legal options,
/// the driver revalidates them through the same entry points as human
/// actions.
pub trait BotPlayer: Send + Sync {
    /// Decide the auction action for the seat.
    fn choose_bid(&self, view: &BotView) -> Result<BidDecision, BotError>;

    /// Choose a card from `view.legal_plays`.
    fn choose_play(&self, view: &BotView) -> Result<Card, BotError>;
}
