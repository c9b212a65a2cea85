//! Round scoring: dix-de-der, Belote/Rebelote, capot, fulfilment,
//! coinche multipliers, rounding, and the game-over check.

use serde::{Deserialize, Serialize};

use super::contract::Contract;
use super::state::Team;

/// Ten points to the team taking the last trick of a round.
pub const DIX_DE_DER: i32 = 10;
/// Twenty points for king + queen of trump played by a single seat.
pub const BELOTE_BONUS: i32 = 20;
/// Declaring team sweeping all eight tricks.
pub const CAPOT_DECLARER: i32 = 250;
/// Defending team sweeping all eight tricks.
pub const CAPOT_DEFENDERS: i32 = 500;
/// Flat penalty base awarded to defenders on a failed contract.
pub const FAILED_CONTRACT_BASE: i32 = 160;

/// Everything the scorer needs once the eighth trick is resolved.
#[derive(Debug, Clone)]
pub struct RoundTally {
    pub contract: Contract,
    /// Card points from won tricks, per team, before any bonus.
    pub trick_points: [i32; 2],
    /// Trick counts per team; sums to 8.
    pub tricks_won: [u8; 2],
    pub last_trick_winner: Team,
    /// Team holding Belote/Rebelote, if a single seat played both the king
    /// and queen of a trump suit this round.
    pub belote: Option<Team>,
}

/// The outcome of scoring one round.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundScore {
    pub fulfilled: bool,
    pub capot: Option<Team>,
    pub belote: Option<Team>,
    /// Awarded points per team after multiplier and rounding; the values
    /// added to the cumulative score.
    pub awarded: [i32; 2],
    /// Pre-multiplier, pre-rounding totals; kept for audit payloads.
    pub raw_totals: [i32; 2],
}

/// Score a finished round.
///
/// Order of application: trick points, dix-de-der, capot reassignment,
/// fulfilment check and reassignment, Belote (never lost by its holder),
/// stake multiplier, rounding to the nearest 10.
pub fn score_round(tally: &RoundTally) -> RoundScore {
    let declarer = tally.contract.declarer_team;
    let defenders = declarer.opponent();

    let mut totals = tally.trick_points;
    totals[tally.last_trick_winner.index()] += DIX_DE_DER;

    let capot = capot_team(&tally.tricks_won);
    let fulfilled;
    match capot {
        Some(team) if team == declarer => {
            totals = [0, 0];
            totals[declarer.index()] = CAPOT_DECLARER;
            fulfilled = true;
        }
        Some(team) => {
            debug_assert_eq!(team, defenders);
            totals = [0, 0];
            totals[defenders.index()] = CAPOT_DEFENDERS;
            fulfilled = false;
        }
        None => {
            // Belote counts toward the declarer's target.
            let belote_credit = if tally.belote == Some(declarer) {
                BELOTE_BONUS
            } else {
                0
            };
            fulfilled =
                totals[declarer.index()] + belote_credit >= i32::from(tally.contract.value);
            if !fulfilled {
                let all_card_points = tally.trick_points[0] + tally.trick_points[1];
                totals[declarer.index()] = 0;
                totals[defenders.index()] = FAILED_CONTRACT_BASE + all_card_points + DIX_DE_DER;
            }
        }
    }

    // Belote sticks to its holder through every reassignment.
    if let Some(team) = tally.belote {
        totals[team.index()] += BELOTE_BONUS;
    }

    let raw_totals = totals;
    let multiplier = tally.contract.multiplier();
    let awarded = [
        round_to_ten(totals[0] * multiplier),
        round_to_ten(totals[1] * multiplier),
    ];

    RoundScore {
        fulfilled,
        capot,
        belote: tally.belote,
        awarded,
        raw_totals,
    }
}

fn capot_team(tricks_won: &[u8; 2]) -> Option<Team> {
    if tricks_won[0] == 8 {
        Some(Team::A)
    } else if tricks_won[1] == 8 {
        Some(Team::B)
    } else {
        None
    }
}

/// Round to the nearest multiple of 10, halves up. Inputs are non-negative.
pub fn round_to_ten(points: i32) -> i32 {
    (points + 5) / 10 * 10
}

/// The team that has won, if the higher cumulative score reached the target
/// and strictly exceeds the other. Equal scores above the target continue
/// play.
pub fn winning_team(cumulative: [i32; 2], target: i32) -> Option<Team> {
    let (a, b) = (cumulative[0], cumulative[1]);
    if a >= target && a > b {
        Some(Team::A)
    } else if b >= target && b > a {
        Some(Team::B)
    } else {
        None
    }
}
