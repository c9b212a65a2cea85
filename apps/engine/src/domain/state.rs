//! Seats, teams, and the per-game phase enum.

use serde::{Deserialize, Serialize};

/// Table position 0..=3. Team membership and partnership derive from it.
pub type Seat = u8;

pub const SEATS: usize = 4;

/// Next seat clockwise.
pub fn next_seat(seat: Seat) -> Seat {
    (seat + 1) % SEATS as u8
}

/// The partner sits two seats away.
pub fn partner_of(seat: Seat) -> Seat {
    (seat + 2) % SEATS as u8
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    pub fn of_seat(seat: Seat) -> Team {
        if seat % 2 == 0 {
            Team::A
        } else {
            Team::B
        }
    }

    pub fn opponent(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Team::A => 0,
            Team::B => 1,
        }
    }
}

/// Cumulative or per-round score pair, indexed by team.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamScores {
    pub team_a: i32,
    pub team_b: i32,
}

impl TeamScores {
    pub fn get(&self, team: Team) -> i32 {
        match team {
            Team::A => self.team_a,
            Team::B => self.team_b,
        }
    }

    pub fn add(&mut self, team: Team, points: i32) {
        match team {
            Team::A => self.team_a += points,
            Team::B => self.team_b += points,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Created from a room, first round not dealt yet.
    Init,
    Bidding,
    Playing,
    Scoring,
    Completed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partners_are_two_apart_and_on_the_same_team() {
        for seat in 0..4u8 {
            let partner = partner_of(seat);
            assert_eq!((seat + 2) % 4, partner);
            assert_eq!(Team::of_seat(seat), Team::of_seat(partner));
        }
        assert_eq!(Team::of_seat(0), Team::A);
        assert_eq!(Team::of_seat(1), Team::B);
    }

    #[test]
    fn team_scores_indexing() {
        let mut scores = TeamScores::default();
        scores.add(Team::A, 90);
        scores.add(Team::B, 70);
        assert_eq!(scores.get(Team::A), 90);
        assert_eq!(scores.get(Team::B), 70);
    }
}
