//! Per-list limits controlling error windows, revival and DNS behavior.

use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// The minimum fraction of `revive_time` a jittered revival delay is
/// allowed to shrink to, so that a large negative jitter draw can never
/// produce an (almost) immediate revival and cause flapping.
const MIN_REVIVE_FRACTION: f64 = 0.1;

/// Limits governing a [`crate::List`]'s error accounting, revival timing
/// and DNS query behavior. Defaults mirror the constants documented
/// alongside `original_source/upstream.h`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    /// Seconds a dead endpoint stays out of rotation before it is
    /// eligible for revival.
    pub revive_time: Duration,
    /// Fractional jitter in `[0, 1]` applied symmetrically around
    /// `revive_time`.
    pub revive_jitter: f64,
    /// Width of the rolling window over which errors are counted.
    pub error_time: Duration,
    /// Per-query DNS timeout.
    pub dns_timeout: Duration,
    /// Number of failures within `error_time` that marks an endpoint dead.
    pub max_errors: u32,
    /// Number of DNS retransmits attempted before giving up on a query.
    pub dns_retransmits: u32,
}

impl Limits {
    /// Computes a jittered revive duration, clamped so it never falls
    /// below [`MIN_REVIVE_FRACTION`] of `revive_time`.
    pub(crate) fn jittered_revive_time(&self, draw: f64) -> Duration {
        let jitter = self.revive_jitter.clamp(0.0, 1.0);
        let frac = (1.0 + draw * jitter).max(MIN_REVIVE_FRACTION);
        self.revive_time.mul_f64(frac)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            revive_time: Duration::from_secs(60),
            revive_jitter: 0.4,
            error_time: Duration::from_secs(10),
            dns_timeout: Duration::from_secs(1),
            max_errors: 2,
            dns_retransmits: 2,
        }
    }
}

/// Shadow struct used purely to drive [`serde::Deserialize`] for
/// [`Limits`], since seconds-as-`f64` is a friendlier wire format than
/// [`Duration`]'s own representation.
#[derive(Deserialize)]
#[serde(default)]
struct LimitsConfig {
    revive_time_secs: f64,
    revive_jitter: f64,
    error_time_secs: f64,
    dns_timeout_secs: f64,
    max_errors: u32,
    dns_retransmits: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        let d = Limits::default();
        Self {
            revive_time_secs: d.revive_time.as_secs_f64(),
            revive_jitter: d.revive_jitter,
            error_time_secs: d.error_time.as_secs_f64(),
            dns_timeout_secs: d.dns_timeout.as_secs_f64(),
            max_errors: d.max_errors,
            dns_retransmits: d.dns_retransmits,
        }
    }
}

impl<'de> Deserialize<'de> for Limits {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let cfg = LimitsConfig::deserialize(deserializer)?;
        Ok(Limits {
            revive_time: Duration::from_secs_f64(cfg.revive_time_secs.max(0.0)),
            revive_jitter: cfg.revive_jitter,
            error_time: Duration::from_secs_f64(cfg.error_time_secs.max(0.0)),
            dns_timeout: Duration::from_secs_f64(cfg.dns_timeout_secs.max(0.0)),
            max_errors: cfg.max_errors,
            dns_retransmits: cfg.dns_retransmits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_match_documented_constants() {
        let l = Limits::default();
        assert_eq!(l.revive_time, Duration::from_secs(60));
        assert_eq!(l.max_errors, 2);
        assert_eq!(l.dns_retransmits, 2);
    }

    #[test]
    fn jittered_revive_time_never_collapses_to_zero() {
        let l = Limits::default();
        let worst_case = l.jittered_revive_time(-1.0);
        assert!(worst_case >= l.revive_time.mul_f64(MIN_REVIVE_FRACTION));
    }

    #[test]
    fn deserializes_from_seconds() {
        let json = serde_json::json!({
            "revive_time_secs": 30.0,
            "revive_jitter": 0.1,
            "error_time_secs": 5.0,
            "dns_timeout_secs": 2.0,
            "max_errors": 3,
            "dns_retransmits": 1
        });
        let limits: Limits = serde_json::from_value(json).unwrap();
        assert_eq!(limits.revive_time, Duration::from_secs(30));
        assert_eq!(limits.max_errors, 3);
    }

    #[test]
    fn deserializes_with_defaults() {
        let limits: Limits = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(limits, Limits::default());
    }
}
