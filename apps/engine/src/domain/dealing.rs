//! Seeded shuffling and the 3-2-3 deal.

use rand::seq::SliceRandom;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::cards::{fresh_deck, Card};
use super::state::{next_seat, Seat, SEATS};

/// Cards per seat in a coinche deal.
pub const HAND_SIZE: usize = 8;

/// The ruleset's deal pattern: three cards around, then two, then three.
const DEAL_PATTERN: [usize; 3] = [3, 2, 3];

/// Shuffle a fresh 32-card deck with the given seed.
pub fn shuffled_deck(seed: [u8; 32]) -> Vec<Card> {
    let mut deck = fresh_deck();
    let mut rng = ChaCha8Rng::from_seed(seed);
    deck.shuffle(&mut rng);
    deck
}

/// Deal eight cards to each seat in the 3-2-3 pattern, starting with the
/// seat left of the dealer. Hands come back sorted for stable display.
pub fn deal_hands(seed: [u8; 32], dealer: Seat) -> [Vec<Card>; 4] {
    let deck = shuffled_deck(seed);
    let mut hands: [Vec<Card>; 4] = Default::default();

    let mut next = deck.into_iter();
    for batch in DEAL_PATTERN {
        let mut seat = next_seat(dealer);
        for _ in 0..SEATS {
            for _ in 0..batch {
                if let Some(card) = next.next() {
                    hands[seat as usize].push(card);
                }
            }
            seat = next_seat(seat);
        }
    }

    for hand in &mut hands {
        hand.sort();
    }
    hands
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn deal_is_deterministic_per_seed() {
        let h1 = deal_hands([1u8; 32], 0);
        let h2 = deal_hands([1u8; 32], 0);
        assert_eq!(h1, h2);
        let h3 = deal_hands([2u8; 32], 0);
        assert_ne!(h1, h3);
    }

    #[test]
    fn every_seat_gets_eight_distinct_cards() {
        let hands = deal_hands([42u8; 32], 2);
        let mut seen = HashSet::new();
        for hand in &hands {
            assert_eq!(hand.len(), HAND_SIZE);
            for card in hand {
                assert!(seen.insert(*card), "duplicate card {card}");
            }
        }
        assert_eq!(seen.len(), 32);
    }

    #[test]
    fn hands_are_sorted() {
        let hands = deal_hands([9u8; 32], 1);
        for hand in &hands {
            let mut sorted = hand.clone();
            sorted.sort();
            assert_eq!(hand, &sorted);
        }
    }
}
