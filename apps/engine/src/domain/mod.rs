//! Rules kernel: pure game logic over plain values.
//!
//! Nothing in this module touches clocks, I/O, or shared state; every
//! function is a value-in value-out resolver, which is what makes the
//! property suites over generated deals possible.

pub mod bidding;
pub mod cards;
pub mod contract;
pub mod dealing;
pub mod fixtures;
pub mod ranking;
pub mod scoring;
pub mod seed_derivation;
pub mod state;
mod tests_props;
pub mod tricks;

// Re-exports for ergonomics
pub use bidding::{AuctionPhase, BiddingState, PassOutcome};
pub use cards::{fresh_deck, hand_has_suit, parse_card_str, Card, Rank, Suit};
pub use contract::{Bid, Contract, ContractType, MIN_BID_VALUE};
pub use dealing::{deal_hands, HAND_SIZE};
pub use ranking::{card_beats, card_points, effective_trump};
pub use scoring::{score_round, winning_team, RoundScore, RoundTally};
pub use seed_derivation::derive_deal_seed;
pub use state::{next_seat, partner_of, Phase, Seat, Team, TeamScores, SEATS};
pub use tricks::{current_winner, legal_plays, trick_points, CompletedTrick, TrickPlay};
