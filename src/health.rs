//! Revival sweeps and all-dead recovery over a set of endpoints.
//!
//! These operate generically over any `&[Arc<Endpoint<D>>]` slice so the
//! same logic applies whether the caller is walking a list's full
//! member set or a caller-filtered candidate set passed to
//! `get_except`.

use crate::endpoint::Endpoint;
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;

/// Revives any endpoint in `endpoints` whose scheduled `revive_at` has
/// passed. Returns the number of endpoints revived.
pub(crate) fn check_revivals<D>(endpoints: &[Arc<Endpoint<D>>]) -> usize {
    let now = Instant::now();
    let mut revived = 0;
    for ep in endpoints {
        if !ep.is_alive() {
            if let Some(at) = ep.revive_at() {
                if now >= at {
                    ep.revive_now();
                    revived += 1;
                }
            }
        }
    }
    revived
}

/// If every endpoint in `endpoints` is dead, revives all of them at
/// once so the pool never deadlocks with no eligible candidate: an
/// outage that takes out every backend must not permanently wedge the
/// caller, and the next round of `fail` calls will re-sort the field.
/// Returns `true` if a revival was forced.
///
/// No-op if `endpoints` is empty or at least one endpoint is already
/// alive.
pub(crate) fn ensure_not_all_dead<D>(endpoints: &[Arc<Endpoint<D>>]) -> bool {
    if endpoints.is_empty() || endpoints.iter().any(|ep| ep.is_alive()) {
        return false;
    }
    for ep in endpoints {
        ep.revive_now();
    }
    true
}

/// Draws a jitter value in `[-1, 1]` for use with
/// [`crate::limits::Limits::jittered_revive_time`].
pub(crate) fn jitter_draw(rng: &mut impl Rng) -> f64 {
    rng.random_range(-1.0..=1.0)
}
