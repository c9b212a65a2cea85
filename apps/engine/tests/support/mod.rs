//! Shared helpers for the integration suites.
#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use coinche_engine::domain::{parse_card_str, Card, ContractType};
use coinche_engine::engine::SeatAssignment;
use coinche_engine::{ActionKeys, EngineConfig, GameFlowService, GameId, MoveResult, PlayerId};

#[ctor::ctor]
fn init_logging() {
    engine_test_support::logging::init();
}

/// Four human players, seats 0..=3; seat 0 hosts.
pub const PLAYERS: [PlayerId; 4] = [10, 11, 12, 13];

pub fn human_seating() -> [SeatAssignment; 4] {
    PLAYERS.map(|player_id| SeatAssignment {
        player_id,
        is_bot: false,
    })
}

pub fn scripted_service() -> Arc<GameFlowService> {
    GameFlowService::new(EngineConfig::instant())
}

/// A game of four humans with a fixed first deal, ready for scripting.
pub fn start_with_deal(deal: [Vec<Card>; 4]) -> (Arc<GameFlowService>, GameId) {
    let service = scripted_service();
    let game_id = service
        .create_game_with_deal(1, PLAYERS[0], human_seating(), None, deal)
        .expect("create scripted game");
    (service, game_id)
}

pub fn card(token: &str) -> Card {
    parse_card_str(token).expect("valid fixture card token")
}

static NEXT_ACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Fresh idempotency key per action.
pub fn keys() -> ActionKeys {
    ActionKeys::new(format!("test-{}", NEXT_ACTION_ID.fetch_add(1, Ordering::SeqCst)))
}

pub fn bid(
    service: &Arc<GameFlowService>,
    game_id: GameId,
    seat: usize,
    contract_type: ContractType,
    value: u16,
) -> MoveResult {
    service
        .submit_bid(game_id, PLAYERS[seat], contract_type, value, keys())
        .expect("bid accepted")
}

pub fn pass(service: &Arc<GameFlowService>, game_id: GameId, seat: usize) -> MoveResult {
    service
        .submit_pass(game_id, PLAYERS[seat], keys())
        .expect("pass accepted")
}

pub fn play(
    service: &Arc<GameFlowService>,
    game_id: GameId,
    seat: usize,
    token: &str,
) -> MoveResult {
    service
        .submit_play(game_id, PLAYERS[seat], card(token), keys())
        .unwrap_or_else(|e| panic!("play {token} by seat {seat} rejected: {e}"))
}

/// Run a scripted sequence of plays, seat indices paired with card tokens.
pub fn play_script(
    service: &Arc<GameFlowService>,
    game_id: GameId,
    plays: &[(usize, &str)],
) -> Vec<MoveResult> {
    plays
        .iter()
        .map(|(seat, token)| play(service, game_id, *seat, token))
        .collect()
}

/// The 32 plays of the fulfilled-spades fixture round: the declaring team
/// (seats 1 and 3) takes 82 card points plus the last trick, the defenders
/// take 70.
pub const FULFILLED_SPADES_SCRIPT: [(usize, &str); 32] = [
    (1, "JS"), (2, "8S"), (3, "7S"), (0, "9S"),
    (1, "AS"), (2, "KS"), (3, "QS"), (0, "TS"),
    (1, "AH"), (2, "7H"), (3, "9H"), (0, "8H"),
    (1, "9D"), (2, "8D"), (3, "JD"), (0, "7D"),
    (3, "JH"), (0, "TH"), (1, "QH"), (2, "KH"),
    (0, "QD"), (1, "KD"), (2, "AD"), (3, "TD"),
    (2, "AC"), (3, "JC"), (0, "8C"), (1, "TC"),
    (2, "9C"), (3, "KC"), (0, "7C"), (1, "QC"),
];

/// The 32 plays of the failed-hearts fixture round: the declaring team
/// collects only 60 card points against a 100 contract.
pub const FAILED_HEARTS_SCRIPT: [(usize, &str); 32] = [
    (1, "JH"), (2, "7H"), (3, "8H"), (0, "9H"),
    (1, "7D"), (2, "TD"), (3, "AD"), (0, "QD"),
    (3, "9C"), (0, "8C"), (1, "JC"), (2, "7C"),
    (1, "QH"), (2, "KH"), (3, "TH"), (0, "AH"),
    (0, "AS"), (1, "7S"), (2, "8S"), (3, "9S"),
    (0, "TS"), (1, "JS"), (2, "QS"), (3, "KS"),
    (0, "8D"), (1, "9D"), (2, "KD"), (3, "JD"),
    (2, "AC"), (3, "QC"), (0, "KC"), (1, "TC"),
];
