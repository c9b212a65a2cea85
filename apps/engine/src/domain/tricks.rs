//! Trick play: legality, current-winner resolution, trick points.

use serde::{Deserialize, Serialize};

use super::cards::{hand_has_suit, Card, Suit};
use super::contract::ContractType;
use super::ranking::{card_beats, card_points, card_strength, effective_trump};
use super::state::{partner_of, Seat, SEATS};

/// One card on the table, with the seat that played it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TrickPlay {
    pub seat: Seat,
    pub card: Card,
}

/// A finished trick with its winner and point value under the contract.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CompletedTrick {
    pub plays: Vec<TrickPlay>,
    pub winner: Seat,
    pub points: i32,
}

/// Seat currently winning an in-progress, non-empty trick.
pub fn current_winner(plays: &[TrickPlay], contract_type: ContractType) -> Option<Seat> {
    let first = plays.first()?;
    let lead = first.card.suit;
    let mut winner = *first;
    for play in &plays[1..] {
        if card_beats(play.card, winner.card, lead, contract_type) {
            winner = *play;
        }
    }
    Some(winner.seat)
}

/// Total card points lying in a trick under the contract mode.
pub fn trick_points(plays: &[TrickPlay], contract_type: ContractType) -> i32 {
    plays.iter().map(|p| card_points(p.card, contract_type)).sum()
}

pub fn is_complete(plays: &[TrickPlay]) -> bool {
    plays.len() == SEATS
}

/// Legal cards for `seat` holding `hand`, given the in-progress trick.
///
/// Rules, in order:
/// - empty trick: anything;
/// - holding the led suit: must follow, and when the led suit competes as
///   trump, must beat the strongest trump on the table if able;
/// - void with the partner currently winning: anything;
/// - void otherwise: must trump if holding trump, overtrumping if able;
/// - void and out of trump: anything.
pub fn legal_plays(
    hand: &[Card],
    plays: &[TrickPlay],
    contract_type: ContractType,
    seat: Seat,
) -> Vec<Card> {
    let Some(first) = plays.first() else {
        return hand.to_vec();
    };
    let lead = first.card.suit;
    let trump = effective_trump(contract_type, lead);

    if hand_has_suit(hand, lead) {
        let follows: Vec<Card> = hand.iter().copied().filter(|c| c.suit == lead).collect();
        // Overtrump obligation applies within the led suit only when the led
        // suit itself competes as trump (suit-contract trump lead, or any
        // lead under all-trump).
        if trump == Some(lead) {
            if let Some(best) = strongest_of_suit(plays, lead) {
                let beating: Vec<Card> = follows
                    .iter()
                    .copied()
                    .filter(|c| card_strength(*c, true) > card_strength(best, true))
                    .collect();
                if !beating.is_empty() {
                    return beating;
                }
            }
        }
        return follows;
    }

    // Void in the led suit. A partner holding the trick lifts all
    // obligations.
    if let Some(winner) = current_winner(plays, contract_type) {
        if winner == partner_of(seat) {
            return hand.to_vec();
        }
    }

    // Must trump when able; only meaningful for suit contracts (under
    // all-trump no off-suit card competes, under no-trump nothing is trump).
    let Some(trump_suit) = trump.filter(|_| contract_type.trump_suit().is_some()) else {
        return hand.to_vec();
    };

    let trumps_in_hand: Vec<Card> = hand
        .iter()
        .copied()
        .filter(|c| c.suit == trump_suit)
        .collect();
    if trumps_in_hand.is_empty() {
        return hand.to_vec();
    }

    if let Some(best) = strongest_of_suit(plays, trump_suit) {
        let beating: Vec<Card> = trumps_in_hand
            .iter()
            .copied()
            .filter(|c| card_strength(*c, true) > card_strength(best, true))
            .collect();
        if !beating.is_empty() {
            return beating;
        }
    }
    trumps_in_hand
}

fn strongest_of_suit(plays: &[TrickPlay], suit: Suit) -> Option<Card> {
    plays
        .iter()
        .map(|p| p.card)
        .filter(|c| c.suit == suit)
        .max_by_key(|c| card_strength(*c, true))
}
