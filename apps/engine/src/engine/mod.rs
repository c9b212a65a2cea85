//! Game state machine: the `Game` aggregate, its typed actions, and its
//! public projections.

pub mod actions;
pub mod game;
pub mod ops;
pub mod snapshot;

pub use actions::{ActionCtx, MoveResult, MoveStatus, TurnInfo};
pub use game::{Completion, Game, Hand, SeatAssignment};
pub use ops::ActionOutcome;
pub use snapshot::{AuctionSnapshot, PrivateHandView, PublicContainers, PublicSnapshot};
