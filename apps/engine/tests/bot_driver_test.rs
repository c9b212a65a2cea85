//! Bot driver and room-to-game flow under the scheduler: bots fill seats,
//! act after their delay, never race a cancellation, and timeouts forfeit
//! for absent humans.

mod support;

use std::time::Duration;

use coinche_engine::domain::Phase;
use coinche_engine::events::EventType;
use coinche_engine::services::rooms::RoomService;
use coinche_engine::services::Visibility;
use coinche_engine::{EngineConfig, GameFlowService, Role};
use support::*;

fn quick_config(target_score: i32) -> EngineConfig {
    EngineConfig {
        target_score,
        ..EngineConfig::instant()
    }
}

/// Wait until `predicate` holds or the deadline passes.
async fn wait_for(
    mut predicate: impl FnMut() -> bool,
    deadline: Duration,
    what: &str,
) {
    let end = tokio::time::Instant::now() + deadline;
    while !predicate() {
        if tokio::time::Instant::now() >= end {
            panic!("timed out waiting for {what}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn a_table_of_bots_plays_a_game_to_completion() {
    let game_flow = GameFlowService::new(quick_config(200));
    let rooms = RoomService::new(game_flow.clone());

    let host = 50;
    let room = rooms.create_room(host, "coinche", Visibility::Public, Some(Duration::from_millis(5)));
    rooms.toggle_ready(room.room_id, host).unwrap();
    rooms.fill_with_bots(room.room_id, host).unwrap();
    let game_id = rooms.start(room.room_id, host).unwrap();

    // Three bot seats act on their own; the human host is carried by the
    // turn timeout forfeiting on their behalf. The game must run itself to
    // completion.
    wait_for(
        || {
            game_flow
                .get_state(game_id)
                .map(|s| s.status == Phase::Completed)
                .unwrap_or(false)
        },
        Duration::from_secs(120),
        "bot game completion",
    )
    .await;

    let state = game_flow.get_state(game_id).unwrap();
    let (a, b) = (state.cumulative_score.team_a, state.cumulative_score.team_b);
    let winner = a.max(b);
    let loser = a.min(b);
    assert!(winner >= 200);
    assert!(winner > loser);

    // The log ends with game.completed and every mutation versioned.
    let events = game_flow.list_events(game_id, None, None).unwrap();
    assert!(events
        .iter()
        .any(|e| e.event_type == EventType::GameCompleted));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn turn_timeout_synthesizes_actions_for_absent_humans() {
    let game_flow = GameFlowService::new(quick_config(1000));
    // Humans only, with a tiny per-turn deadline: the core synthesizes
    // every action.
    let game_id = game_flow
        .create_game_with_deal(
            1,
            PLAYERS[0],
            human_seating(),
            Some(Duration::from_millis(5)),
            coinche_engine::domain::fixtures::fulfilled_spades_deal(),
        )
        .unwrap();

    let mut sub = game_flow.subscribe(game_id, None).unwrap();
    // Every bidding action will be a synthesized pass; wait for the forfeit
    // machinery to have acted at least once.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    let mut saw_synthesized = false;
    while tokio::time::Instant::now() < deadline && !saw_synthesized {
        match tokio::time::timeout(Duration::from_secs(1), sub.receiver.recv()).await {
            Ok(Some(event)) => {
                if event.event_type == EventType::BidPassed {
                    saw_synthesized = true;
                }
            }
            _ => break,
        }
    }
    assert!(saw_synthesized, "no synthesized action observed");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancellation_wins_the_race_against_scheduled_bots() {
    let game_flow = GameFlowService::new(EngineConfig {
        // Slow bots: the cancel always lands first.
        bot_delay_min: Duration::from_millis(200),
        bot_delay_max: Duration::from_millis(300),
        ..EngineConfig::default()
    });
    let rooms = RoomService::new(game_flow.clone());

    let host = 60;
    let room = rooms.create_room(host, "coinche", Visibility::Private, None);
    rooms.toggle_ready(room.room_id, host).unwrap();
    rooms.fill_with_bots(room.room_id, host).unwrap();
    let game_id = rooms.start(room.room_id, host).unwrap();

    game_flow
        .cancel_game(game_id, host, Role::Player, "host closed the table")
        .unwrap();
    let state = game_flow.get_state(game_id).unwrap();
    assert_eq!(state.status, Phase::Completed);
    let version_after_cancel = state.state_version;

    // Give the in-flight bot schedules time to fire; their precondition
    // check inside the token must discard them without mutating anything.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let state = game_flow.get_state(game_id).unwrap();
    assert_eq!(state.state_version, version_after_cancel);

    let events = game_flow.list_events(game_id, None, None).unwrap();
    assert!(events
        .iter()
        .any(|e| e.event_type == EventType::GameCancelled));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn admin_can_cancel_but_strangers_cannot() {
    let game_flow = GameFlowService::new(EngineConfig::default());
    let game_id = game_flow
        .create_game(1, PLAYERS[0], human_seating(), None)
        .unwrap();

    let err = game_flow
        .cancel_game(game_id, 999, Role::Player, "nope")
        .expect_err("stranger cannot cancel");
    assert_eq!(err.code(), coinche_engine::ErrorCode::ForbiddenNotHost);

    game_flow
        .cancel_game(game_id, 999, Role::Admin, "operator abort")
        .unwrap();
    assert_eq!(
        game_flow.get_state(game_id).unwrap().status,
        Phase::Completed
    );
}
