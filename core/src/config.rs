//! Gateway configuration.
//!
//! Loaded once at startup by an external collaborator (`gateway::config`)
//! and immutable after [`crate::gateway::Gateway::start`] — test
//! scaffolding is the only thing allowed to mutate it beforehand, per
//! spec.md's `Config` lifecycle note.

/// Regular (coarse) sleep used by both actors when the next session edge
/// is far away. ~1ms, matching `original_source`'s `REGULAR_SLEEP_TIME_NS`.
pub const DEFAULT_REGULAR_SLEEP_NS: u64 = 1_000_000;

/// Short sleep/yield used when busy-polling near a session edge or while
/// rate-limited. 1ns, matching `original_source`'s `SHORT_SLEEP_TIME_NS`.
pub const DEFAULT_SHORT_SLEEP_NS: u64 = 1;

/// Close-guard `ε`: the exchange is marked closed this many nanoseconds
/// before the configured close offset, so the transmitter has a chance
/// to observe `open == false` before the instant itself.
pub const DEFAULT_CLOSE_GUARD_NS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// Nanosecond offset into the UTC day at which the session opens.
    pub open_offset_ns: u64,
    /// Nanosecond offset into the UTC day at which the session closes.
    pub close_offset_ns: u64,
    /// Sliding window width, in seconds, for rate accounting.
    pub window_sec: u64,
    /// Maximum transmissions admitted per window (inclusive boundary —
    /// see spec.md's open question: `window.len() <= rate` admits `rate + 1`).
    pub rate: u64,
    pub username: String,
    pub password: String,

    /// Coarse sleep used when the next session edge is far away.
    pub regular_sleep_ns: u64,
    /// Fine sleep/yield used when busy-polling near an edge, or while
    /// rate-limited.
    pub short_sleep_ns: u64,
    /// Below this distance-to-edge, switch from coarse sleeping to
    /// busy-polling. Defaults to `3 * regular_sleep_ns`.
    pub edge_threshold_ns: u64,
    /// `ε`: how far before `close_offset_ns` the session is actually
    /// marked closed.
    pub close_guard_ns: u64,
}

impl Config {
    /// Builds a config from the required fields, filling the
    /// wait/poll-strategy knobs with spec.md's defaults.
    pub fn new(
        open_offset_ns: u64,
        close_offset_ns: u64,
        window_sec: u64,
        rate: u64,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ConfigValidationError> {
        let config = Self {
            open_offset_ns,
            close_offset_ns,
            window_sec,
            rate,
            username: username.into(),
            password: password.into(),
            regular_sleep_ns: DEFAULT_REGULAR_SLEEP_NS,
            short_sleep_ns: DEFAULT_SHORT_SLEEP_NS,
            edge_threshold_ns: 3 * DEFAULT_REGULAR_SLEEP_NS,
            close_guard_ns: DEFAULT_CLOSE_GUARD_NS,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.open_offset_ns >= self.close_offset_ns {
            return Err(ConfigValidationError::OpenNotBeforeClose {
                open_offset_ns: self.open_offset_ns,
                close_offset_ns: self.close_offset_ns,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("open offset {open_offset_ns} is not before close offset {close_offset_ns}")]
    OpenNotBeforeClose {
        open_offset_ns: u64,
        close_offset_ns: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_open_after_close() {
        let err = Config::new(10, 5, 1, 1, "u", "p").unwrap_err();
        assert!(matches!(err, ConfigValidationError::OpenNotBeforeClose { .. }));
    }

    #[test]
    fn accepts_valid_window() {
        let config = Config::new(1, 10, 1, 1, "u", "p").unwrap();
        assert_eq!(config.edge_threshold_ns, 3 * DEFAULT_REGULAR_SLEEP_NS);
    }
}
