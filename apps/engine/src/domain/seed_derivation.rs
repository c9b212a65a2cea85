//! RNG seed derivation for deterministic dealing.
//!
//! A game carries one 32-byte seed drawn from OS entropy at creation; every
//! round's shuffle seed is derived from it. Same game seed + round number =
//! same deal, which keeps completed games replayable without storing decks.

/// Derive the shuffle seed for one round of a game.
///
/// Domain-separated blake3 over the game seed and round number, so dealing
/// seeds can never collide with any future derivation context.
pub fn derive_deal_seed(game_seed: &[u8; 32], round_number: u32) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key("coinche-engine 2026 round deal v1");
    hasher.update(game_seed);
    hasher.update(&round_number.to_le_bytes());
    *hasher.finalize().as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deal_seed_is_deterministic() {
        let game_seed = [7u8; 32];
        assert_eq!(
            derive_deal_seed(&game_seed, 3),
            derive_deal_seed(&game_seed, 3)
        );
    }

    #[test]
    fn deal_seed_differs_per_round_and_game() {
        let game_seed = [7u8; 32];
        assert_ne!(
            derive_deal_seed(&game_seed, 1),
            derive_deal_seed(&game_seed, 2)
        );
        assert_ne!(
            derive_deal_seed(&[7u8; 32], 1),
            derive_deal_seed(&[8u8; 32], 1)
        );
    }
}
