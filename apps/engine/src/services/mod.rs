//! Orchestration services: room lifecycle and game flow.

pub mod game_flow;
pub mod rooms;

pub use game_flow::{ActionKeys, GameFlowService, Role};
pub use rooms::{RoomFilter, RoomService, RoomStatus, Visibility};
