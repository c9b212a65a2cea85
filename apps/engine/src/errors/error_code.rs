//! Error codes for the coinche engine core.
//!
//! This module defines all error codes used throughout the crate.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that transports put on the wire.

use core::fmt;

/// Centralized error codes for the coinche engine core.
///
/// Each variant maps to a canonical SCREAMING_SNAKE_CASE string. Transports
/// decide how a code maps onto their own status scheme; the core only
/// guarantees the code and its meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Identity & roles
    /// Caller identity unknown
    Unauthorized,
    /// Caller lacks the required role for the operation
    Forbidden,
    /// Caller is not seated at this game
    ForbiddenNotSeated,
    /// Caller is not the room host
    ForbiddenNotHost,
    /// Operation requires the admin role
    ForbiddenNotAdmin,

    // Payload validation
    /// Card token could not be parsed
    InvalidCard,
    /// Seat index outside 0..=3
    InvalidSeat,
    /// General validation error
    ValidationError,

    // Resource lookup
    /// Room not found
    RoomNotFound,
    /// Game not found
    GameNotFound,
    /// Seat not found or empty
    SeatNotFound,
    /// Move not found
    MoveNotFound,

    // Optimistic concurrency
    /// Caller's expected state version is stale
    VersionConflict,

    // Rule violations (illegal-move details)
    /// Action submitted outside the required phase
    PhaseMismatch,
    /// Action submitted by a seat that is not on turn
    OutOfTurn,
    /// Opening bid below the 80-point floor
    BidBelowMinimum,
    /// Bid does not strictly dominate the standing bid
    BidNotHigher,
    /// Bidding already closed by a double or redouble
    BiddingClosed,
    /// Coinche unavailable (no live bid, already doubled, or own team)
    CoincheNotAvailable,
    /// Surcoinche unavailable (not doubled, already redoubled, wrong team)
    SurcoincheNotAvailable,
    /// Card is not in the caller's hand
    CardNotInHand,
    /// A card of the led suit must be played
    MustFollowSuit,
    /// A higher trump must be played
    MustOvertrump,
    /// A trump must be played when void in the led suit
    MustPlayTrump,

    // Room lifecycle conflicts
    /// Seat already occupied
    SeatTaken,
    /// Room is locked
    RoomLocked,
    /// Room is not ready to start
    RoomNotStartable,
    /// Room already in progress or completed
    RoomNotJoinable,

    // System
    /// Game aborted after an internal invariant violation
    GameAborted,
    /// Internal error
    Internal,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::ForbiddenNotSeated => "FORBIDDEN_NOT_SEATED",
            Self::ForbiddenNotHost => "FORBIDDEN_NOT_HOST",
            Self::ForbiddenNotAdmin => "FORBIDDEN_NOT_ADMIN",

            Self::InvalidCard => "INVALID_CARD",
            Self::InvalidSeat => "INVALID_SEAT",
            Self::ValidationError => "VALIDATION_ERROR",

            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::SeatNotFound => "SEAT_NOT_FOUND",
            Self::MoveNotFound => "MOVE_NOT_FOUND",

            Self::VersionConflict => "VERSION_CONFLICT",

            Self::PhaseMismatch => "PHASE_MISMATCH",
            Self::OutOfTurn => "OUT_OF_TURN",
            Self::BidBelowMinimum => "BID_BELOW_MINIMUM",
            Self::BidNotHigher => "BID_NOT_HIGHER",
            Self::BiddingClosed => "BIDDING_CLOSED",
            Self::CoincheNotAvailable => "COINCHE_NOT_AVAILABLE",
            Self::SurcoincheNotAvailable => "SURCOINCHE_NOT_AVAILABLE",
            Self::CardNotInHand => "CARD_NOT_IN_HAND",
            Self::MustFollowSuit => "MUST_FOLLOW_SUIT",
            Self::MustOvertrump => "MUST_OVERTRUMP",
            Self::MustPlayTrump => "MUST_PLAY_TRUMP",

            Self::SeatTaken => "SEAT_TAKEN",
            Self::RoomLocked => "ROOM_LOCKED",
            Self::RoomNotStartable => "ROOM_NOT_STARTABLE",
            Self::RoomNotJoinable => "ROOM_NOT_JOINABLE",

            Self::GameAborted => "GAME_ABORTED",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
