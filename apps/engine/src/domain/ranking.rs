//! Card strength and point tables, trump vs non-trump.
//!
//! Two orderings exist side by side: inside the trump suit the jack and
//! nine jump to the top (J, 9, A, 10, K, Q, 8, 7); everywhere else the
//! natural order applies (A, 10, K, Q, J, 9, 8, 7). Under all-trump every
//! suit uses the trump tables, under no-trump none does.

use super::cards::{Card, Rank, Suit};
use super::contract::ContractType;

/// Strength inside the trump suit; higher wins.
pub fn trump_strength(rank: Rank) -> u8 {
    match rank {
        Rank::Jack => 8,
        Rank::Nine => 7,
        Rank::Ace => 6,
        Rank::Ten => 5,
        Rank::King => 4,
        Rank::Queen => 3,
        Rank::Eight => 2,
        Rank::Seven => 1,
    }
}

/// Strength outside the trump suit; higher wins.
pub fn plain_strength(rank: Rank) -> u8 {
    match rank {
        Rank::Ace => 8,
        Rank::Ten => 7,
        Rank::King => 6,
        Rank::Queen => 5,
        Rank::Jack => 4,
        Rank::Nine => 3,
        Rank::Eight => 2,
        Rank::Seven => 1,
    }
}

pub fn trump_points(rank: Rank) -> i32 {
    match rank {
        Rank::Jack => 20,
        Rank::Nine => 14,
        Rank::Ace => 11,
        Rank::Ten => 10,
        Rank::King => 4,
        Rank::Queen => 3,
        Rank::Eight | Rank::Seven => 0,
    }
}

pub fn plain_points(rank: Rank) -> i32 {
    match rank {
        Rank::Ace => 11,
        Rank::Ten => 10,
        Rank::King => 4,
        Rank::Queen => 3,
        Rank::Jack => 2,
        Rank::Nine | Rank::Eight | Rank::Seven => 0,
    }
}

/// Point value of a card under the active contract mode.
pub fn card_points(card: Card, contract_type: ContractType) -> i32 {
    if contract_type.is_trump(card.suit) {
        trump_points(card.rank)
    } else {
        plain_points(card.rank)
    }
}

/// The suit that competes as trump within one trick: the contract suit for
/// suit contracts, the led suit under all-trump, none under no-trump.
pub fn effective_trump(contract_type: ContractType, lead: Suit) -> Option<Suit> {
    match contract_type {
        ContractType::NoTrump => None,
        ContractType::AllTrump => Some(lead),
        other => other.trump_suit(),
    }
}

pub fn card_strength(card: Card, as_trump: bool) -> u8 {
    if as_trump {
        trump_strength(card.rank)
    } else {
        plain_strength(card.rank)
    }
}

/// Whether `challenger` beats `incumbent` in a trick led with `lead` under
/// `contract_type`.
pub fn card_beats(challenger: Card, incumbent: Card, lead: Suit, contract_type: ContractType) -> bool {
    let trump = effective_trump(contract_type, lead);

    let ch_trump = trump == Some(challenger.suit);
    let inc_trump = trump == Some(incumbent.suit);
    if ch_trump && !inc_trump {
        return true;
    }
    if inc_trump && !ch_trump {
        return false;
    }
    if ch_trump && inc_trump {
        return trump_strength(challenger.rank) > trump_strength(incumbent.rank);
    }

    // Neither is trump: only lead-suit cards compete.
    let ch_follows = challenger.suit == lead;
    let inc_follows = incumbent.suit == lead;
    if ch_follows && !inc_follows {
        return true;
    }
    if inc_follows && !ch_follows {
        return false;
    }
    if ch_follows && inc_follows {
        return plain_strength(challenger.rank) > plain_strength(incumbent.rank);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cards::parse_card_str;

    fn c(token: &str) -> Card {
        parse_card_str(token).unwrap()
    }

    #[test]
    fn point_tables_sum_per_suit() {
        let trump_total: i32 = crate::domain::cards::ALL_RANKS
            .iter()
            .map(|&r| trump_points(r))
            .sum();
        let plain_total: i32 = crate::domain::cards::ALL_RANKS
            .iter()
            .map(|&r| plain_points(r))
            .sum();
        assert_eq!(trump_total, 62);
        assert_eq!(plain_total, 30);
        // One trump suit + three plain suits = 152 card points per round.
        assert_eq!(trump_total + 3 * plain_total, 152);
    }

    #[test]
    fn jack_and_nine_rule_the_trump_suit() {
        assert!(card_beats(c("JS"), c("AS"), Suit::Spades, ContractType::Spades));
        assert!(card_beats(c("9S"), c("AS"), Suit::Spades, ContractType::Spades));
        assert!(!card_beats(c("AS"), c("9S"), Suit::Spades, ContractType::Spades));
    }

    #[test]
    fn trump_beats_any_lead_card() {
        // lead hearts, trump spades: 7S beats AH
        assert!(card_beats(c("7S"), c("AH"), Suit::Hearts, ContractType::Spades));
        assert!(!card_beats(c("AH"), c("7S"), Suit::Hearts, ContractType::Spades));
    }

    #[test]
    fn no_trump_only_lead_suit_competes() {
        assert!(!card_beats(c("AS"), c("7H"), Suit::Hearts, ContractType::NoTrump));
        assert!(card_beats(c("TH"), c("KH"), Suit::Hearts, ContractType::NoTrump));
        assert!(!card_beats(c("JH"), c("TH"), Suit::Hearts, ContractType::NoTrump));
    }

    #[test]
    fn all_trump_uses_trump_order_within_the_led_suit() {
        assert!(card_beats(c("JH"), c("AH"), Suit::Hearts, ContractType::AllTrump));
        // an off-suit card never competes, every suit being "trump" only
        // matters for the suit that was led
        assert!(!card_beats(c("JS"), c("7H"), Suit::Hearts, ContractType::AllTrump));
    }

    #[test]
    fn off_suit_cards_never_beat_each_other() {
        assert!(!card_beats(c("AD"), c("AC"), Suit::Hearts, ContractType::Spades));
        assert!(!card_beats(c("AC"), c("AD"), Suit::Hearts, ContractType::Spades));
    }
}
