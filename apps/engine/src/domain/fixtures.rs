//! Fixed deals for scripted rounds.
//!
//! Each fixture returns four 8-card hands (seat 0..=3) forming the full
//! 32-card deck. They are built so that a known sequence of legal plays
//! produces a known score split; the integration suites drive entire rounds
//! against them.

use super::cards::Card;

/// Parse hardcoded card tokens. The tokens are fixture constants known to
/// be valid, hence the single allow.
fn hand(tokens: [&str; 8]) -> Vec<Card> {
    tokens
        .iter()
        .map(|s| {
            #[allow(clippy::expect_used)]
            super::cards::parse_card_str(s).expect("hardcoded valid card token")
        })
        .collect()
}

/// Deal for a fulfilled 80-spades contract declared by seat 1.
///
/// Scripted cleanly (every seat can always follow suit), the declaring team
/// takes 82 card points plus the last trick, the defenders 70.
pub fn fulfilled_spades_deal() -> [Vec<Card>; 4] {
    [
        hand(["7C", "8C", "7D", "QD", "8H", "TH", "9S", "TS"]),
        hand(["TC", "QC", "9D", "KD", "AH", "QH", "JS", "AS"]),
        hand(["9C", "AC", "8D", "AD", "7H", "KH", "8S", "KS"]),
        hand(["JC", "KC", "TD", "JD", "9H", "JH", "7S", "QS"]),
    ]
}

/// Deal for a failed 100-hearts contract declared by seat 1.
///
/// The declaring team collects only 60 card points; the defenders take 92
/// and the last trick.
pub fn failed_hearts_deal() -> [Vec<Card>; 4] {
    [
        hand(["8C", "KC", "8D", "QD", "9H", "AH", "AS", "TS"]),
        hand(["TC", "JC", "7D", "9D", "JH", "QH", "7S", "JS"]),
        hand(["7C", "AC", "TD", "KD", "7H", "KH", "8S", "QS"]),
        hand(["9C", "QC", "AD", "JD", "8H", "TH", "9S", "KS"]),
    ]
}

/// Deal where seat 1 holds every spade: bidding spades and leading them out
/// sweeps all eight tricks for the declaring team.
pub fn capot_spades_deal() -> [Vec<Card>; 4] {
    [
        hand(["7H", "8H", "9H", "TH", "JH", "QH", "KH", "AH"]),
        hand(["7S", "8S", "9S", "TS", "JS", "QS", "KS", "AS"]),
        hand(["7D", "8D", "9D", "TD", "JD", "QD", "KD", "AD"]),
        hand(["7C", "8C", "9C", "TC", "JC", "QC", "KC", "AC"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_full_deck(hands: &[Vec<Card>; 4]) {
        let mut seen = HashSet::new();
        for hand in hands {
            assert_eq!(hand.len(), 8);
            for card in hand {
                assert!(seen.insert(*card), "duplicate card {card}");
            }
        }
        assert_eq!(seen.len(), 32);
    }

    #[test]
    fn fixtures_cover_the_deck_exactly_once() {
        assert_full_deck(&fulfilled_spades_deal());
        assert_full_deck(&failed_hearts_deal());
        assert_full_deck(&capot_spades_deal());
    }
}
