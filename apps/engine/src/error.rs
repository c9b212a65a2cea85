//! Error handling for the coinche engine core.
//!
//! The core surfaces five caller-visible kinds (invalid payload,
//! unauthorized/forbidden, not found, version conflict, illegal move) plus
//! an `Internal` kind that transports map to their own 5xx equivalent.
//! Mapping onto HTTP/WebSocket framing is the transport's concern; the
//! core only guarantees codes and shapes.

use serde::Serialize;
use thiserror::Error;

use crate::errors::ErrorCode;

/// A single rule violation inside an `IllegalMove` rejection.
///
/// Carries the machine-readable code and a human-oriented detail such as
/// "must follow HEARTS".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleViolation {
    pub code: ErrorCode,
    pub detail: String,
}

impl RuleViolation {
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.detail)
    }
}

impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Central error type returned from every core operation.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Caller-supplied data is malformed. Not retryable.
    #[error("invalid payload: {detail}")]
    InvalidPayload { code: ErrorCode, detail: String },

    /// Caller identity unknown.
    #[error("unauthorized: {detail}")]
    Unauthorized { detail: String },

    /// Caller lacks the required role (host, player-on-turn, admin).
    #[error("forbidden: {detail}")]
    Forbidden { code: ErrorCode, detail: String },

    /// Named resource does not exist.
    #[error("not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },

    /// Caller's expected state version is stale. Carries the current
    /// version so the caller can refresh and retry.
    #[error("version conflict: expected {expected}, current {current}")]
    VersionConflict { expected: u64, current: u64 },

    /// The rules kernel rejected the action. Carries the specific
    /// violations and, when the game exists, its current version.
    #[error("illegal move: {}", format_violations(.violations))]
    IllegalMove {
        violations: Vec<RuleViolation>,
        state_version: Option<u64>,
    },

    #[error("internal error: {detail}")]
    Internal { detail: String },
}

fn format_violations(violations: &[RuleViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl CoreError {
    pub fn invalid_payload(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::InvalidPayload {
            code,
            detail: detail.into(),
        }
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::Unauthorized {
            detail: detail.into(),
        }
    }

    pub fn forbidden(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Forbidden {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn illegal(violation: RuleViolation, state_version: Option<u64>) -> Self {
        Self::IllegalMove {
            violations: vec![violation],
            state_version,
        }
    }

    /// Primary code for this error, e.g. for metrics or wire mapping.
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::InvalidPayload { code, .. } => *code,
            CoreError::Unauthorized { .. } => ErrorCode::Unauthorized,
            CoreError::Forbidden { code, .. } => *code,
            CoreError::NotFound { code, .. } => *code,
            CoreError::VersionConflict { .. } => ErrorCode::VersionConflict,
            CoreError::IllegalMove { violations, .. } => violations
                .first()
                .map(|v| v.code)
                .unwrap_or(ErrorCode::ValidationError),
            CoreError::Internal { .. } => ErrorCode::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_move_reports_first_violation_code() {
        let err = CoreError::IllegalMove {
            violations: vec![
                RuleViolation::new(ErrorCode::MustFollowSuit, "must follow HEARTS"),
                RuleViolation::new(ErrorCode::MustOvertrump, "must beat JACK of SPADES"),
            ],
            state_version: Some(7),
        };
        assert_eq!(err.code(), ErrorCode::MustFollowSuit);
        let msg = err.to_string();
        assert!(msg.contains("MUST_FOLLOW_SUIT"));
        assert!(msg.contains("MUST_OVERTRUMP"));
    }

    #[test]
    fn version_conflict_carries_current() {
        let err = CoreError::VersionConflict {
            expected: 3,
            current: 5,
        };
        assert_eq!(err.code(), ErrorCode::VersionConflict);
        assert!(err.to_string().contains("current 5"));
    }
}
