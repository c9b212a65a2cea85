//! Bidding: auction state and the legality of bids, coinche, surcoinche.

use serde::{Deserialize, Serialize};

use super::contract::{Bid, MIN_BID_VALUE};
use super::state::{Seat, Team};
use crate::error::RuleViolation;
use crate::errors::ErrorCode;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionPhase {
    Active,
    Ended,
    Redeal,
}

/// One recorded auction action, for the bid log.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuctionEntry {
    Bid(Bid),
    Pass { seat: Seat },
    Coinche { seat: Seat },
    Surcoinche { seat: Seat },
}

/// The auction of one round.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BiddingState {
    pub current_bid: Option<Bid>,
    pub doubled: bool,
    pub doubled_by: Option<Seat>,
    pub redoubled: bool,
    pub consecutive_passes: u8,
    pub bid_log: Vec<AuctionEntry>,
    pub phase: AuctionPhase,
    pub winning_bid: Option<Bid>,
}

impl BiddingState {
    pub fn new() -> Self {
        Self {
            current_bid: None,
            doubled: false,
            doubled_by: None,
            redoubled: false,
            consecutive_passes: 0,
            bid_log: Vec::new(),
            phase: AuctionPhase::Active,
            winning_bid: None,
        }
    }

    /// Check a new bid against the standing auction.
    pub fn validate_bid(&self, bid: &Bid) -> Result<(), RuleViolation> {
        if self.doubled || self.redoubled {
            return Err(RuleViolation::new(
                ErrorCode::BiddingClosed,
                "bidding is closed by a double",
            ));
        }
        match &self.current_bid {
            None => {
                if bid.value < MIN_BID_VALUE {
                    return Err(RuleViolation::new(
                        ErrorCode::BidBelowMinimum,
                        format!("opening bid must be at least {MIN_BID_VALUE}, got {}", bid.value),
                    ));
                }
            }
            Some(prior) => {
                if !bid.dominates(prior) {
                    return Err(RuleViolation::new(
                        ErrorCode::BidNotHigher,
                        format!(
                            "bid {} {:?} does not beat {} {:?}",
                            bid.value, bid.contract_type, prior.value, prior.contract_type
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    /// A coinche needs a live bid, not yet doubled, from the declarer's
    /// opponents. It is the one out-of-turn call of the auction.
    pub fn validate_coinche(&self, caller: Seat) -> Result<(), RuleViolation> {
        let Some(bid) = &self.current_bid else {
            return Err(RuleViolation::new(
                ErrorCode::CoincheNotAvailable,
                "no bid to coinche",
            ));
        };
        if self.doubled {
            return Err(RuleViolation::new(
                ErrorCode::CoincheNotAvailable,
                "bid is already doubled",
            ));
        }
        if Team::of_seat(caller) == Team::of_seat(bid.seat) {
            return Err(RuleViolation::new(
                ErrorCode::CoincheNotAvailable,
                "cannot coinche your own team's bid",
            ));
        }
        Ok(())
    }

    /// Record an accepted bid.
    pub fn apply_bid(&mut self, bid: Bid) {
        self.current_bid = Some(bid);
        self.consecutive_passes = 0;
        self.bid_log.push(AuctionEntry::Bid(bid));
    }

    /// Record a pass and report what it closes, if anything.
    pub fn apply_pass(&mut self, seat: Seat) -> PassOutcome {
        self.consecutive_passes += 1;
        self.bid_log.push(AuctionEntry::Pass { seat });
        match &self.current_bid {
            None if self.consecutive_passes >= 4 => {
                self.phase = AuctionPhase::Redeal;
                PassOutcome::Redeal
            }
            Some(bid) if self.consecutive_passes >= 3 => {
                self.winning_bid = Some(*bid);
                self.phase = AuctionPhase::Ended;
                PassOutcome::Finalized(*bid)
            }
            _ => PassOutcome::Continue,
        }
    }

    /// Record a coinche; the standing bid freezes as the winner. Returns
    /// `None` when no bid stands, which `validate_coinche` rules out.
    pub fn apply_coinche(&mut self, seat: Seat) -> Option<Bid> {
        let bid = self.current_bid?;
        self.doubled = true;
        self.doubled_by = Some(seat);
        self.bid_log.push(AuctionEntry::Coinche { seat });
        self.phase = AuctionPhase::Ended;
        self.winning_bid = Some(bid);
        Some(bid)
    }
}

impl Default for BiddingState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PassOutcome {
    Continue,
    /// Four passes with no standing bid: throw the hands in and redeal.
    Redeal,
    /// Three passes after a bid: the auction closes on that bid.
    Finalized(Bid),
}

/// A surcoinche answers a coinche: already doubled, not yet redoubled, and
/// called by the declaring side. Validated against the resolved contract
/// because the coinche has already closed the auction by then.
pub fn validate_surcoinche(
    doubled: bool,
    redoubled: bool,
    declarer_team: Team,
    caller: Seat,
) -> Result<(), RuleViolation> {
    if !doubled {
        return Err(RuleViolation::new(
            ErrorCode::SurcoincheNotAvailable,
            "contract has not been doubled",
        ));
    }
    if redoubled {
        return Err(RuleViolation::new(
            ErrorCode::SurcoincheNotAvailable,
            "contract is already redoubled",
        ));
    }
    if Team::of_seat(caller) != declarer_team {
        return Err(RuleViolation::new(
            ErrorCode::SurcoincheNotAvailable,
            "only the declaring team may surcoinche",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::ContractType;
    use time::OffsetDateTime;

    fn bid(seat: Seat, contract_type: ContractType, value: u16) -> Bid {
        Bid {
            seat,
            contract_type,
            value,
            at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn opening_bid_floor_is_80() {
        let auction = BiddingState::new();
        assert!(auction.validate_bid(&bid(0, ContractType::Hearts, 79)).is_err());
        assert!(auction.validate_bid(&bid(0, ContractType::Hearts, 80)).is_ok());
    }

    #[test]
    fn follow_on_bid_must_dominate() {
        let mut auction = BiddingState::new();
        auction.apply_bid(bid(0, ContractType::Hearts, 80));
        assert!(auction.validate_bid(&bid(1, ContractType::Clubs, 80)).is_err());
        assert!(auction.validate_bid(&bid(1, ContractType::Spades, 80)).is_ok());
        assert!(auction.validate_bid(&bid(1, ContractType::Clubs, 90)).is_ok());
    }

    #[test]
    fn four_passes_without_a_bid_redeal() {
        let mut auction = BiddingState::new();
        for seat in 0..3u8 {
            assert_eq!(auction.apply_pass(seat), PassOutcome::Continue);
        }
        assert_eq!(auction.apply_pass(3), PassOutcome::Redeal);
        assert_eq!(auction.phase, AuctionPhase::Redeal);
    }

    #[test]
    fn three_passes_after_a_bid_finalize() {
        let mut auction = BiddingState::new();
        let opening = bid(0, ContractType::Spades, 80);
        auction.apply_bid(opening);
        assert_eq!(auction.apply_pass(1), PassOutcome::Continue);
        assert_eq!(auction.apply_pass(2), PassOutcome::Continue);
        assert_eq!(auction.apply_pass(3), PassOutcome::Finalized(opening));
        assert_eq!(auction.winning_bid, Some(opening));
    }

    #[test]
    fn a_bid_resets_the_pass_counter() {
        let mut auction = BiddingState::new();
        auction.apply_pass(0);
        auction.apply_pass(1);
        auction.apply_bid(bid(2, ContractType::Diamonds, 80));
        assert_eq!(auction.consecutive_passes, 0);
        assert_eq!(auction.apply_pass(3), PassOutcome::Continue);
    }

    #[test]
    fn coinche_only_from_the_defending_team() {
        let mut auction = BiddingState::new();
        assert!(auction.validate_coinche(1).is_err());
        auction.apply_bid(bid(0, ContractType::Spades, 80));
        // seat 2 is the declarer's partner
        assert!(auction.validate_coinche(2).is_err());
        assert!(auction.validate_coinche(1).is_ok());
        assert!(auction.apply_coinche(1).is_some());
        assert!(auction.validate_coinche(3).is_err());
    }

    #[test]
    fn surcoinche_needs_a_double_and_the_declaring_side() {
        assert!(validate_surcoinche(false, false, Team::A, 0).is_err());
        assert!(validate_surcoinche(true, true, Team::A, 0).is_err());
        assert!(validate_surcoinche(true, false, Team::A, 1).is_err());
        assert!(validate_surcoinche(true, false, Team::A, 2).is_ok());
    }
}
