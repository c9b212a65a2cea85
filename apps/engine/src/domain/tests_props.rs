#![cfg(test)]
//! Property suites over generated deals: play-legality and point
//! conservation laws that must hold for any seed and any contract mode.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use rand::prelude::*;

use super::cards::Card;
use super::contract::ContractType;
use super::dealing::deal_hands;
use super::state::{next_seat, Seat, SEATS};
use super::tricks::{current_winner, legal_plays, trick_points, TrickPlay};

const MODES: [ContractType; 6] = [
    ContractType::Clubs,
    ContractType::Diamonds,
    ContractType::Hearts,
    ContractType::Spades,
    ContractType::NoTrump,
    ContractType::AllTrump,
];

fn total_card_points(contract_type: ContractType) -> i32 {
    match contract_type {
        ContractType::NoTrump => 120,
        ContractType::AllTrump => 248,
        _ => 152,
    }
}

/// Play a whole round with uniformly random legal choices, checking the
/// kernel's own laws at every step.
fn simulate_round(
    seed: [u8; 32],
    dealer: Seat,
    contract_type: ContractType,
    choice_seed: u64,
) -> Result<i32, TestCaseError> {
    let mut hands = deal_hands(seed, dealer);
    let mut rng = StdRng::seed_from_u64(choice_seed);
    let mut leader = next_seat(dealer);
    let mut points_seen = 0i32;

    for _ in 0..8 {
        let mut plays: Vec<TrickPlay> = Vec::new();
        for offset in 0..SEATS as u8 {
            let seat = (leader + offset) % SEATS as u8;
            let hand = &hands[seat as usize];
            let legal = legal_plays(hand, &plays, contract_type, seat);
            prop_assert!(!legal.is_empty(), "no legal play with cards in hand");
            for card in &legal {
                prop_assert!(hand.contains(card), "legal play not in hand");
            }
            let card: Card = *legal.choose(&mut rng).expect("nonempty legal set");
            hands[seat as usize].retain(|c| *c != card);
            plays.push(TrickPlay { seat, card });
        }
        let winner = current_winner(&plays, contract_type).expect("complete trick has a winner");
        prop_assert!(plays.iter().any(|p| p.seat == winner));
        points_seen += trick_points(&plays, contract_type);
        leader = winner;
    }

    for hand in &hands {
        prop_assert!(hand.is_empty(), "cards left over after eight tricks");
    }
    Ok(points_seen)
}

proptest! {
    #[test]
    fn any_deal_covers_the_deck(seed in any::<[u8; 32]>(), dealer in 0u8..4) {
        let hands = deal_hands(seed, dealer);
        let mut seen = std::collections::HashSet::new();
        for hand in &hands {
            prop_assert_eq!(hand.len(), 8);
            for card in hand {
                prop_assert!(seen.insert(*card));
            }
        }
        prop_assert_eq!(seen.len(), 32);
    }

    #[test]
    fn random_legal_rounds_conserve_card_points(
        seed in any::<[u8; 32]>(),
        dealer in 0u8..4,
        mode in 0usize..6,
        choice_seed in any::<u64>(),
    ) {
        let contract_type = MODES[mode];
        let total = simulate_round(seed, dealer, contract_type, choice_seed)?;
        prop_assert_eq!(total, total_card_points(contract_type));
    }
}
