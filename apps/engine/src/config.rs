//! Engine configuration, read from the environment with defaults.

use std::time::Duration;

use crate::error::CoreError;

/// Cumulative score a team must reach (and strictly exceed the other by)
/// to win a game.
pub const DEFAULT_TARGET_SCORE: i32 = 1000;
/// Bot thinking delay bounds, milliseconds.
pub const DEFAULT_BOT_DELAY_MS: (u64, u64) = (1000, 2000);
/// Heartbeat cadence on every game channel.
pub const DEFAULT_HEARTBEAT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub target_score: i32,
    /// Uniform range the bot scheduler draws its delay from.
    pub bot_delay_min: Duration,
    pub bot_delay_max: Duration,
    pub heartbeat_period: Duration,
    /// Per-turn deadline applied to rooms that do not set their own; `None`
    /// disables turn timeouts.
    pub default_turn_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_score: DEFAULT_TARGET_SCORE,
            bot_delay_min: Duration::from_millis(DEFAULT_BOT_DELAY_MS.0),
            bot_delay_max: Duration::from_millis(DEFAULT_BOT_DELAY_MS.1),
            heartbeat_period: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            default_turn_timeout: None,
        }
    }
}

impl EngineConfig {
    /// Read configuration from `COINCHE_*` environment variables, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Result<Self, CoreError> {
        let mut config = Self::default();
        if let Some(value) = read_var("COINCHE_TARGET_SCORE")? {
            config.target_score = parse_var("COINCHE_TARGET_SCORE", &value)?;
        }
        if let Some(value) = read_var("COINCHE_BOT_DELAY_MS_MIN")? {
            config.bot_delay_min = Duration::from_millis(parse_var("COINCHE_BOT_DELAY_MS_MIN", &value)?);
        }
        if let Some(value) = read_var("COINCHE_BOT_DELAY_MS_MAX")? {
            config.bot_delay_max = Duration::from_millis(parse_var("COINCHE_BOT_DELAY_MS_MAX", &value)?);
        }
        if let Some(value) = read_var("COINCHE_HEARTBEAT_SECS")? {
            config.heartbeat_period = Duration::from_secs(parse_var("COINCHE_HEARTBEAT_SECS", &value)?);
        }
        if let Some(value) = read_var("COINCHE_TURN_TIMEOUT_SECS")? {
            let secs: u64 = parse_var("COINCHE_TURN_TIMEOUT_SECS", &value)?;
            config.default_turn_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if config.bot_delay_max < config.bot_delay_min {
            return Err(CoreError::internal(
                "COINCHE_BOT_DELAY_MS_MAX is below COINCHE_BOT_DELAY_MS_MIN",
            ));
        }
        Ok(config)
    }

    /// Zero-delay bots and a fast heartbeat, for tests.
    pub fn instant() -> Self {
        Self {
            bot_delay_min: Duration::ZERO,
            bot_delay_max: Duration::from_millis(1),
            heartbeat_period: Duration::from_millis(50),
            ..Self::default()
        }
    }
}

fn read_var(name: &str) -> Result<Option<String>, CoreError> {
    match std::env::var(name) {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(CoreError::internal(format!("env var {name}: {err}"))),
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, CoreError>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| CoreError::internal(format!("env var {name}={value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_ruleset() {
        let config = EngineConfig::default();
        assert_eq!(config.target_score, 1000);
        assert_eq!(config.heartbeat_period, Duration::from_secs(15));
        assert!(config.default_turn_timeout.is_none());
        assert!(config.bot_delay_min <= config.bot_delay_max);
    }
}
