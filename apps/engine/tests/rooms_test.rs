//! Room lifecycle coverage: create, join, ready, lock, kick, fill, start,
//! listing filters, and lobby events.

mod support;

use coinche_engine::domain::Phase;
use coinche_engine::events::EventType;
use coinche_engine::services::rooms::{RoomFilter, RoomService, RoomStatus, Visibility};
use coinche_engine::{EngineConfig, ErrorCode, GameFlowService};
use support::*;

fn setup() -> (std::sync::Arc<GameFlowService>, std::sync::Arc<RoomService>) {
    let game_flow = GameFlowService::new(EngineConfig::default());
    let rooms = RoomService::new(game_flow.clone());
    (game_flow, rooms)
}

#[test]
fn host_creates_and_occupies_the_first_seat() {
    let (_, rooms) = setup();
    let room = rooms.create_room(10, "coinche", Visibility::Public, None);
    assert_eq!(room.status, RoomStatus::Lobby);
    assert_eq!(room.host, 10);
    assert_eq!(room.seats[0].occupant.unwrap().player_id, 10);
    assert!(room.seats[1].occupant.is_none());
}

#[test]
fn join_takes_requested_or_first_free_seat() {
    let (_, rooms) = setup();
    let room = rooms.create_room(10, "coinche", Visibility::Public, None);

    let snapshot = rooms.join_room(room.room_id, 11, Some(2), false).unwrap();
    assert_eq!(snapshot.seats[2].occupant.unwrap().player_id, 11);

    let snapshot = rooms.join_room(room.room_id, 12, None, false).unwrap();
    assert_eq!(snapshot.seats[1].occupant.unwrap().player_id, 12);

    let err = rooms
        .join_room(room.room_id, 13, Some(2), false)
        .expect_err("seat 2 is taken");
    assert_eq!(err.code(), ErrorCode::SeatTaken);

    let err = rooms
        .join_room(room.room_id, 11, None, false)
        .expect_err("already seated");
    assert_eq!(err.code(), ErrorCode::SeatTaken);
}

#[test]
fn spectators_join_without_a_seat() {
    let (_, rooms) = setup();
    let room = rooms.create_room(10, "coinche", Visibility::Public, None);
    let snapshot = rooms.join_room(room.room_id, 99, None, true).unwrap();
    assert_eq!(snapshot.spectator_count, 1);
    assert!(snapshot.seats[1].occupant.is_none());
}

#[test]
fn start_requires_full_ready_unlocked() {
    let (_, rooms) = setup();
    let room = rooms.create_room(10, "coinche", Visibility::Public, None);
    let room_id = room.room_id;

    let err = rooms.start(room_id, 10).expect_err("table not full");
    assert_eq!(err.code(), ErrorCode::RoomNotStartable);

    rooms.fill_with_bots(room_id, 10).unwrap();
    let err = rooms.start(room_id, 10).expect_err("host not ready");
    assert_eq!(err.code(), ErrorCode::RoomNotStartable);

    rooms.toggle_ready(room_id, 10).unwrap();
    rooms.set_locked(room_id, 10, true).unwrap();
    let err = rooms.start(room_id, 10).expect_err("room locked");
    assert_eq!(err.code(), ErrorCode::RoomLocked);
    rooms.set_locked(room_id, 10, false).unwrap();

    let err = rooms.start(room_id, 11).expect_err("not the host");
    assert_eq!(err.code(), ErrorCode::ForbiddenNotHost);

    let game_id = rooms.start(room_id, 10).unwrap();
    let snapshot = rooms.get_room(room_id).unwrap();
    assert_eq!(snapshot.status, RoomStatus::InProgress);
    assert!(snapshot.locked);
    assert_eq!(snapshot.game_id, Some(game_id));
    // Ready flags cleared for the post-game lobby.
    assert!(snapshot.seats.iter().all(|s| !s.ready));

    // The game exists, dealt, in bidding.
    let state = rooms.game_flow().get_state(game_id).unwrap();
    assert_eq!(state.status, Phase::Bidding);
    assert_eq!(state.room_id, room_id);

    // A started room is closed to further joins.
    let err = rooms
        .join_room(room_id, 77, None, false)
        .expect_err("room in progress");
    assert_eq!(err.code(), ErrorCode::RoomNotJoinable);
}

#[test]
fn fill_with_bots_auto_readies_them() {
    let (_, rooms) = setup();
    let room = rooms.create_room(10, "coinche", Visibility::Public, None);
    let snapshot = rooms.fill_with_bots(room.room_id, 10).unwrap();
    for seat in &snapshot.seats[1..] {
        let occupant = seat.occupant.unwrap();
        assert!(occupant.player_id < 0, "bot ids are negative");
        assert!(seat.ready);
    }
    // Host is seated but not auto-readied.
    assert!(!snapshot.seats[0].ready);
}

#[test]
fn host_kick_and_leave() {
    let (_, rooms) = setup();
    let room = rooms.create_room(10, "coinche", Visibility::Public, None);
    rooms.join_room(room.room_id, 11, Some(1), false).unwrap();

    let err = rooms
        .remove_seat(room.room_id, 11, 0)
        .expect_err("only the host kicks");
    assert_eq!(err.code(), ErrorCode::ForbiddenNotHost);

    let snapshot = rooms.remove_seat(room.room_id, 10, 1).unwrap();
    assert!(snapshot.seats[1].occupant.is_none());

    rooms.join_room(room.room_id, 11, Some(1), false).unwrap();
    let snapshot = rooms.leave_room(room.room_id, 11).unwrap();
    assert!(snapshot.seats[1].occupant.is_none());

    // The host leaving closes the lobby.
    let snapshot = rooms.leave_room(room.room_id, 10).unwrap();
    assert_eq!(snapshot.status, RoomStatus::Completed);
}

#[test]
fn listing_is_filtered_and_paginated() {
    let (_, rooms) = setup();
    for i in 0..5 {
        let visibility = if i % 2 == 0 {
            Visibility::Public
        } else {
            Visibility::Private
        };
        rooms.create_room(100 + i, "coinche", visibility, None);
    }
    rooms.create_room(200, "belote", Visibility::Public, None);

    let all = rooms.list_rooms(&RoomFilter::default(), 0, 50);
    assert_eq!(all.total, 6);

    let public_coinche = rooms.list_rooms(
        &RoomFilter {
            game_type: Some("coinche".into()),
            visibility: Some(Visibility::Public),
            status: None,
        },
        0,
        50,
    );
    assert_eq!(public_coinche.total, 3);

    let page = rooms.list_rooms(&RoomFilter::default(), 2, 2);
    assert_eq!(page.rooms.len(), 2);
    assert_eq!(page.total, 6);
    assert_eq!(page.offset, 2);
}

#[test]
fn lobby_mutations_emit_versioned_room_events() {
    let (_, rooms) = setup();
    let room = rooms.create_room(10, "coinche", Visibility::Public, None);
    let mut sub = rooms.subscribe(room.room_id).unwrap();

    rooms.join_room(room.room_id, 11, None, false).unwrap();
    rooms.toggle_ready(room.room_id, 11).unwrap();

    let mut events = Vec::new();
    while let Ok(event) = sub.receiver.try_recv() {
        events.push(event);
    }
    assert!(events
        .iter()
        .any(|e| e.event_type == EventType::RoomPlayerJoined));
    let updates: Vec<u64> = events
        .iter()
        .filter(|e| e.event_type == EventType::RoomUpdated)
        .map(|e| e.version)
        .collect();
    assert_eq!(updates.len(), 2);
    assert!(updates[0] < updates[1]);
}
