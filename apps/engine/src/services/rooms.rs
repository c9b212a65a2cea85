//! Room lifecycle: the pre-game lobby state and the hand-off into a game.
//!
//! Rooms are lightweight aggregates of their own: a per-room mutex
//! serializes lobby mutations, a version counter orders `room.updated`
//! events, and starting a room constructs the game through
//! `GameFlowService` from the final seat order.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::json;
use time::OffsetDateTime;
use tracing::info;

use super::game_flow::GameFlowService;
use crate::domain::{Seat, SEATS};
use crate::engine::SeatAssignment;
use crate::error::CoreError;
use crate::errors::ErrorCode;
use crate::events::{Event, EventType, OutboundEvent, Subscription, Topic};
use crate::ids::{GameId, PlayerId, RoomId};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Lobby,
    InProgress,
    Completed,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupantKind {
    Human,
    Bot,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub struct SeatOccupant {
    pub player_id: PlayerId,
    pub kind: OccupantKind,
}

#[derive(Debug, Copy, Clone, Default, Serialize)]
pub struct SeatState {
    pub occupant: Option<SeatOccupant>,
    pub ready: bool,
}

/// The ruleset implemented by this engine; rooms carry it so clients can
/// pin score semantics. The failed-contract and all-trump coefficient
/// choices are documented against this tag.
pub const RULESET_VERSION: &str = "coinche-1";

pub struct Room {
    pub room_id: RoomId,
    pub game_type: String,
    pub seats: [SeatState; 4],
    pub host: PlayerId,
    pub visibility: Visibility,
    pub ruleset_version: String,
    pub status: RoomStatus,
    pub locked: bool,
    pub version: u64,
    pub turn_timeout: Option<Duration>,
    pub game_id: Option<GameId>,
    pub spectators: Vec<PlayerId>,
    pub created_at: OffsetDateTime,
}

/// Public projection of a room for list/get responses.
#[derive(Debug, Clone, Serialize)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub game_type: String,
    pub seats: [SeatState; 4],
    pub host: PlayerId,
    pub visibility: Visibility,
    pub ruleset_version: String,
    pub status: RoomStatus,
    pub locked: bool,
    pub version: u64,
    pub game_id: Option<GameId>,
    pub spectator_count: usize,
}

impl Room {
    fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.room_id,
            game_type: self.game_type.clone(),
            seats: self.seats,
            host: self.host,
            visibility: self.visibility,
            ruleset_version: self.ruleset_version.clone(),
            status: self.status,
            locked: self.locked,
            version: self.version,
            game_id: self.game_id,
            spectator_count: self.spectators.len(),
        }
    }

    fn seat_of(&self, player_id: PlayerId) -> Option<Seat> {
        self.seats
            .iter()
            .position(|s| s.occupant.map(|o| o.player_id) == Some(player_id))
            .map(|i| i as Seat)
    }
}

/// Filters for the paginated room listing.
#[derive(Debug, Default, Clone)]
pub struct RoomFilter {
    pub game_type: Option<String>,
    pub visibility: Option<Visibility>,
    pub status: Option<RoomStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomPage {
    pub rooms: Vec<RoomSnapshot>,
    pub total: usize,
    pub offset: usize,
}

pub struct RoomService {
    rooms: DashMap<RoomId, Arc<Mutex<Room>>>,
    game_flow: Arc<GameFlowService>,
    next_room_id: AtomicI64,
    /// Bot identities are negative so they can never collide with
    /// transport-issued player ids.
    next_bot_id: AtomicI64,
}

impl RoomService {
    pub fn new(game_flow: Arc<GameFlowService>) -> Arc<Self> {
        Arc::new(Self {
            rooms: DashMap::new(),
            game_flow,
            next_room_id: AtomicI64::new(1),
            next_bot_id: AtomicI64::new(-1),
        })
    }

    pub fn game_flow(&self) -> &Arc<GameFlowService> {
        &self.game_flow
    }

    /// Live subscription to a room's lobby events.
    pub fn subscribe(&self, room_id: RoomId) -> Result<Subscription, CoreError> {
        self.room(room_id)?;
        Ok(self.game_flow.fabric().subscribe_room(room_id))
    }

    // ----- lifecycle -------------------------------------------------------

    pub fn create_room(
        &self,
        host: PlayerId,
        game_type: impl Into<String>,
        visibility: Visibility,
        turn_timeout: Option<Duration>,
    ) -> RoomSnapshot {
        let room_id = self.next_room_id.fetch_add(1, Ordering::SeqCst);
        let mut room = Room {
            room_id,
            game_type: game_type.into(),
            seats: [SeatState::default(); 4],
            host,
            visibility,
            ruleset_version: RULESET_VERSION.to_string(),
            status: RoomStatus::Lobby,
            locked: false,
            version: 0,
            turn_timeout,
            game_id: None,
            spectators: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        };
        // The host takes the first seat on creation.
        room.seats[0].occupant = Some(SeatOccupant {
            player_id: host,
            kind: OccupantKind::Human,
        });
        let snapshot = room.snapshot();
        self.rooms.insert(room_id, Arc::new(Mutex::new(room)));
        info!(room_id, host, "room created");
        snapshot
    }

    pub fn list_rooms(&self, filter: &RoomFilter, offset: usize, limit: usize) -> RoomPage {
        let mut rooms: Vec<RoomSnapshot> = self
            .rooms
            .iter()
            .map(|entry| entry.value().lock().snapshot())
            .filter(|r| {
                filter
                    .game_type
                    .as_ref()
                    .map(|t| &r.game_type == t)
                    .unwrap_or(true)
                    && filter.visibility.map(|v| r.visibility == v).unwrap_or(true)
                    && filter.status.map(|s| r.status == s).unwrap_or(true)
            })
            .collect();
        rooms.sort_by_key(|r| r.room_id);
        let total = rooms.len();
        let rooms = rooms.into_iter().skip(offset).take(limit).collect();
        RoomPage {
            rooms,
            total,
            offset,
        }
    }

    pub fn get_room(&self, room_id: RoomId) -> Result<RoomSnapshot, CoreError> {
        let room = self.room(room_id)?;
        let room = room.lock();
        Ok(room.snapshot())
    }

    /// Take a seat (a specific one or the first free), or join as a
    /// spectator.
    pub fn join_room(
        &self,
        room_id: RoomId,
        caller: PlayerId,
        seat: Option<Seat>,
        spectator: bool,
    ) -> Result<RoomSnapshot, CoreError> {
        self.mutate(room_id, |room| {
            if spectator {
                if !room.spectators.contains(&caller) {
                    room.spectators.push(caller);
                }
                return Ok(vec![player_event(room, EventType::RoomPlayerJoined, caller, None)]);
            }

            if room.status != RoomStatus::Lobby {
                return Err(CoreError::forbidden(
                    ErrorCode::RoomNotJoinable,
                    "room is no longer accepting players",
                ));
            }
            if room.locked {
                return Err(CoreError::forbidden(ErrorCode::RoomLocked, "room is locked"));
            }
            if room.seat_of(caller).is_some() {
                return Err(CoreError::forbidden(
                    ErrorCode::SeatTaken,
                    "caller is already seated",
                ));
            }
            let index = match seat {
                Some(seat) => {
                    if usize::from(seat) >= SEATS {
                        return Err(CoreError::invalid_payload(
                            ErrorCode::InvalidSeat,
                            format!("seat {seat} out of range"),
                        ));
                    }
                    if room.seats[seat as usize].occupant.is_some() {
                        return Err(CoreError::forbidden(
                            ErrorCode::SeatTaken,
                            format!("seat {seat} is occupied"),
                        ));
                    }
                    seat
                }
                None => room
                    .seats
                    .iter()
                    .position(|s| s.occupant.is_none())
                    .map(|i| i as Seat)
                    .ok_or_else(|| {
                        CoreError::forbidden(ErrorCode::SeatTaken, "no free seat")
                    })?,
            };
            room.seats[index as usize].occupant = Some(SeatOccupant {
                player_id: caller,
                kind: OccupantKind::Human,
            });
            room.seats[index as usize].ready = false;
            Ok(vec![player_event(
                room,
                EventType::RoomPlayerJoined,
                caller,
                Some(index),
            )])
        })
    }

    pub fn leave_room(&self, room_id: RoomId, caller: PlayerId) -> Result<RoomSnapshot, CoreError> {
        self.mutate(room_id, |room| {
            if let Some(pos) = room.spectators.iter().position(|p| *p == caller) {
                room.spectators.remove(pos);
                return Ok(vec![player_event(room, EventType::RoomPlayerLeft, caller, None)]);
            }
            let seat = room.seat_of(caller).ok_or_else(|| {
                CoreError::not_found(ErrorCode::SeatNotFound, "caller is not in this room")
            })?;
            if room.status != RoomStatus::Lobby {
                return Err(CoreError::forbidden(
                    ErrorCode::RoomLocked,
                    "cannot leave a started game's room",
                ));
            }
            room.seats[seat as usize] = SeatState::default();
            // A departing host closes the lobby; remaining players must
            // re-create.
            if caller == room.host {
                room.status = RoomStatus::Completed;
            }
            Ok(vec![player_event(
                room,
                EventType::RoomPlayerLeft,
                caller,
                Some(seat),
            )])
        })
    }

    /// Host kicks a seat's occupant back to the lobby list.
    pub fn remove_seat(
        &self,
        room_id: RoomId,
        caller: PlayerId,
        seat: Seat,
    ) -> Result<RoomSnapshot, CoreError> {
        self.mutate(room_id, |room| {
            require_host(room, caller)?;
            require_lobby(room)?;
            if usize::from(seat) >= SEATS {
                return Err(CoreError::invalid_payload(
                    ErrorCode::InvalidSeat,
                    format!("seat {seat} out of range"),
                ));
            }
            let occupant = room.seats[seat as usize].occupant.ok_or_else(|| {
                CoreError::not_found(ErrorCode::SeatNotFound, format!("seat {seat} is empty"))
            })?;
            room.seats[seat as usize] = SeatState::default();
            Ok(vec![player_event(
                room,
                EventType::RoomPlayerLeft,
                occupant.player_id,
                Some(seat),
            )])
        })
    }

    pub fn toggle_ready(&self, room_id: RoomId, caller: PlayerId) -> Result<RoomSnapshot, CoreError> {
        self.mutate(room_id, |room| {
            require_lobby(room)?;
            let seat = room.seat_of(caller).ok_or_else(|| {
                CoreError::forbidden(ErrorCode::ForbiddenNotSeated, "caller is not seated")
            })?;
            room.seats[seat as usize].ready = !room.seats[seat as usize].ready;
            Ok(Vec::new())
        })
    }

    pub fn set_locked(
        &self,
        room_id: RoomId,
        caller: PlayerId,
        locked: bool,
    ) -> Result<RoomSnapshot, CoreError> {
        self.mutate(room_id, |room| {
            require_host(room, caller)?;
            require_lobby(room)?;
            room.locked = locked;
            Ok(Vec::new())
        })
    }

    /// Seat bots on every empty chair, auto-readied.
    pub fn fill_with_bots(&self, room_id: RoomId, caller: PlayerId) -> Result<RoomSnapshot, CoreError> {
        self.mutate(room_id, |room| {
            require_host(room, caller)?;
            require_lobby(room)?;
            let mut events = Vec::new();
            for index in 0..SEATS {
                if room.seats[index].occupant.is_some() {
                    continue;
                }
                let bot_id = self.next_bot_id.fetch_sub(1, Ordering::SeqCst);
                room.seats[index] = SeatState {
                    occupant: Some(SeatOccupant {
                        player_id: bot_id,
                        kind: OccupantKind::Bot,
                    }),
                    ready: true,
                };
                events.push(player_event(
                    room,
                    EventType::RoomPlayerJoined,
                    bot_id,
                    Some(index as Seat),
                ));
            }
            Ok(events)
        })
    }

    /// Start the game: full table, everyone ready, room unlocked.
    pub fn start(&self, room_id: RoomId, caller: PlayerId) -> Result<GameId, CoreError> {
        // Phase 1: validate and freeze the seating under the room lock.
        let (seating, host, turn_timeout) = {
            let room = self.room(room_id)?;
            let room = room.lock();
            require_host(&room, caller)?;
            require_lobby(&room)?;
            if room.locked {
                return Err(CoreError::forbidden(ErrorCode::RoomLocked, "room is locked"));
            }
            let mut seating = [SeatAssignment {
                player_id: 0,
                is_bot: false,
            }; 4];
            for (index, seat) in room.seats.iter().enumerate() {
                let occupant = seat.occupant.ok_or_else(|| {
                    CoreError::forbidden(
                        ErrorCode::RoomNotStartable,
                        format!("seat {index} is empty"),
                    )
                })?;
                if !seat.ready {
                    return Err(CoreError::forbidden(
                        ErrorCode::RoomNotStartable,
                        format!("seat {index} is not ready"),
                    ));
                }
                seating[index] = SeatAssignment {
                    player_id: occupant.player_id,
                    is_bot: occupant.kind == OccupantKind::Bot,
                };
            }
            (seating, room.host, room.turn_timeout)
        };

        // Phase 2: construct the game outside the room lock; deal runs
        // under the game's own token.
        let game_id = self
            .game_flow
            .create_game(room_id, host, seating, turn_timeout)?;

        // Phase 3: commit the room transition.
        self.mutate(room_id, |room| {
            room.status = RoomStatus::InProgress;
            room.locked = true;
            room.game_id = Some(game_id);
            for seat in &mut room.seats {
                seat.ready = false;
            }
            let event = Event::for_room(
                room.room_id,
                EventType::RoomGameStarted,
                room.version + 1,
                json!({ "game_id": game_id }),
            );
            Ok(vec![OutboundEvent::public(event)])
        })?;

        info!(room_id, game_id, "room started");
        Ok(game_id)
    }

    // ----- internals -------------------------------------------------------

    fn room(&self, room_id: RoomId) -> Result<Arc<Mutex<Room>>, CoreError> {
        self.rooms
            .get(&room_id)
            .map(|r| r.clone())
            .ok_or_else(|| {
                CoreError::not_found(ErrorCode::RoomNotFound, format!("room {room_id} not found"))
            })
    }

    /// Serialized room mutation: apply `f`, bump the room version, emit the
    /// returned events plus a trailing `room.updated`, fan out in order.
    fn mutate(
        &self,
        room_id: RoomId,
        f: impl FnOnce(&mut Room) -> Result<Vec<OutboundEvent>, CoreError>,
    ) -> Result<RoomSnapshot, CoreError> {
        let room = self.room(room_id)?;
        let mut room = room.lock();
        let mut events = f(&mut room)?;
        room.version += 1;
        let version = room.version;
        // Stamp the batch with the committed room version.
        for event in &mut events {
            event.event.version = version;
        }
        events.push(OutboundEvent::public(Event::for_room(
            room.room_id,
            EventType::RoomUpdated,
            version,
            json!({ "room": room.snapshot() }),
        )));
        self.game_flow
            .fabric()
            .publish(Topic::Room(room_id), &events);
        Ok(room.snapshot())
    }
}

fn require_host(room: &Room, caller: PlayerId) -> Result<(), CoreError> {
    if room.host != caller {
        return Err(CoreError::forbidden(
            ErrorCode::ForbiddenNotHost,
            "operation requires the room host",
        ));
    }
    Ok(())
}

fn require_lobby(room: &Room) -> Result<(), CoreError> {
    if room.status != RoomStatus::Lobby {
        return Err(CoreError::forbidden(
            ErrorCode::RoomNotJoinable,
            "room is not in the lobby state",
        ));
    }
    Ok(())
}

fn player_event(
    room: &Room,
    event_type: EventType,
    player_id: PlayerId,
    seat: Option<Seat>,
) -> OutboundEvent {
    OutboundEvent::public(Event::for_room(
        room.room_id,
        event_type,
        room.version,
        json!({ "player_id": player_id, "seat": seat }),
    ))
}
