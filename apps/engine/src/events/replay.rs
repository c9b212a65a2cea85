//! Rebuilding score state from an event log.
//!
//! The log is the source of truth for what happened; folding the
//! `round.completed` events of a finished game over a fresh score pair must
//! land on exactly the cumulative score the aggregate reports.

use serde::Deserialize;

use super::envelope::{Event, EventType};
use crate::domain::TeamScores;

#[derive(Debug, Deserialize)]
struct RoundCompletedPayload {
    awarded: AwardedPair,
}

#[derive(Debug, Deserialize)]
struct AwardedPair {
    team_a: i32,
    team_b: i32,
}

/// Fold a game's public event stream into the cumulative score it produced.
///
/// Events other than `round.completed` are skipped; malformed payloads are
/// reported rather than silently ignored, because a log that cannot be
/// folded is a corrupted log.
pub fn replay_cumulative_score(events: &[Event]) -> Result<TeamScores, String> {
    let mut scores = TeamScores::default();
    for event in events {
        if event.event_type != EventType::RoundCompleted {
            continue;
        }
        let payload: RoundCompletedPayload = serde_json::from_value(event.payload.clone())
            .map_err(|e| format!("unreadable round.completed payload: {e}"))?;
        scores.team_a += payload.awarded.team_a;
        scores.team_b += payload.awarded.team_b;
    }
    Ok(scores)
}
