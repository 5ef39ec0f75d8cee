//! Selection strategies over a flattened candidate slice.
//!
//! Each function here is pure with respect to the candidate slice it is
//! given; [`crate::List`] is responsible for assembling that slice
//! (direct members plus expanded SRV children) and for running the
//! all-dead recovery and revival sweeps before calling in.

use crate::endpoint::Endpoint;
use crate::policy::{HashRing, Policy};
use parking_lot::Mutex;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Picks one endpoint from `candidates` per `policy`. Returns `None`
/// only if `candidates` is empty or none are alive.
///
/// [`crate::List`] always resolves [`Policy::Undef`] to a concrete
/// policy (the owning [`crate::Context`]'s default, or
/// [`Policy::default`] absent one) before calling in here; the `Undef`
/// arm below is a defensive fallback for that invariant, not a path
/// this crate's own selection entry points exercise.
#[allow(clippy::too_many_arguments)]
pub(crate) fn select<D>(
    candidates: &[Arc<Endpoint<D>>],
    policy: Policy,
    ring: Option<&HashRing>,
    hash_key: Option<&[u8]>,
    rr_lock: &Mutex<()>,
    global_rr_cursor: &AtomicUsize,
    rng: &mut impl Rng,
) -> Option<Arc<Endpoint<D>>> {
    match policy {
        Policy::Undef => None,
        Policy::Sequential => select_sequential(candidates),
        Policy::MasterSlave => select_master_slave(candidates, rng),
        Policy::Hashed => match hash_key {
            // No key to hash on is a caller programming error; fall back to
            // round-robin for this call rather than failing the selection.
            None => select_round_robin(candidates, rr_lock, global_rr_cursor, rng),
            Some(key) => select_hashed(candidates, ring, key, rr_lock, global_rr_cursor, rng),
        },
        Policy::RoundRobin => select_round_robin(candidates, rr_lock, global_rr_cursor, rng),
        Policy::Random => select_random(candidates, rng),
    }
}

fn alive_indices<D>(candidates: &[Arc<Endpoint<D>>]) -> Vec<usize> {
    candidates
        .iter()
        .enumerate()
        .filter(|(_, ep)| ep.is_alive())
        .map(|(idx, _)| idx)
        .collect()
}

/// Weighted random choice; uniform among alive candidates if every
/// alive candidate has weight 0.
pub(crate) fn select_random<D>(
    candidates: &[Arc<Endpoint<D>>],
    rng: &mut impl Rng,
) -> Option<Arc<Endpoint<D>>> {
    let alive = alive_indices(candidates);
    if alive.is_empty() {
        return None;
    }
    let total_weight: u64 = alive.iter().map(|&i| candidates[i].weight() as u64).sum();
    if total_weight == 0 {
        let idx = alive[rng.random_range(0..alive.len())];
        return Some(candidates[idx].clone());
    }
    let mut draw = rng.random_range(0..total_weight);
    for &idx in &alive {
        let w = candidates[idx].weight() as u64;
        if draw < w {
            return Some(candidates[idx].clone());
        }
        draw -= w;
    }
    unreachable!("weighted draw must land on a candidate")
}

/// Smooth weighted round robin (Nginx algorithm). Falls back to a
/// cursor shared across every list using the same [`crate::Context`]
/// when every alive candidate has weight 0, so a degenerate
/// all-zero-weight pool still rotates rather than collapsing to a
/// single repeated pick.
pub(crate) fn select_round_robin<D>(
    candidates: &[Arc<Endpoint<D>>],
    rr_lock: &Mutex<()>,
    global_rr_cursor: &AtomicUsize,
    rng: &mut impl Rng,
) -> Option<Arc<Endpoint<D>>> {
    let alive = alive_indices(candidates);
    if alive.is_empty() {
        return None;
    }
    let total_weight: i64 = alive.iter().map(|&i| candidates[i].weight() as i64).sum();
    if total_weight == 0 {
        let idx = alive[global_rr_cursor.fetch_add(1, Ordering::Relaxed) % alive.len()];
        return Some(candidates[idx].clone());
    }

    let _guard = rr_lock.lock();
    let mut best: Option<(usize, i64)> = None;
    for &idx in &alive {
        let ep = &candidates[idx];
        let cw = ep
            .current_weight_cell()
            .fetch_add(ep.weight() as i64, Ordering::AcqRel)
            + ep.weight() as i64;
        if best.map(|(_, best_cw)| cw > best_cw).unwrap_or(true) {
            best = Some((idx, cw));
        }
    }
    let (winner, winner_cw) = best.expect("alive is non-empty");
    candidates[winner]
        .current_weight_cell()
        .store(winner_cw - total_weight, Ordering::Release);
    let _ = rng;
    Some(candidates[winner].clone())
}

/// Highest-priority group with at least one alive member wins; ties
/// within the group broken by insertion order (first match in
/// `candidates`).
pub(crate) fn select_master_slave<D>(
    candidates: &[Arc<Endpoint<D>>],
    _rng: &mut impl Rng,
) -> Option<Arc<Endpoint<D>>> {
    let best_priority = candidates
        .iter()
        .filter(|ep| ep.is_alive())
        .map(|ep| ep.priority())
        .max()?;
    candidates
        .iter()
        .find(|ep| ep.is_alive() && ep.priority() == best_priority)
        .cloned()
}

/// First alive candidate in list order.
pub(crate) fn select_sequential<D>(candidates: &[Arc<Endpoint<D>>]) -> Option<Arc<Endpoint<D>>> {
    candidates.iter().find(|ep| ep.is_alive()).cloned()
}

/// Consistent-hash lookup keyed by `key`. Falls back to round-robin (the
/// same degraded path taken when `key` is missing entirely, per §4.2) if
/// no ring is available yet, e.g. the first call after invalidation,
/// before `List` has rebuilt it.
pub(crate) fn select_hashed<D>(
    candidates: &[Arc<Endpoint<D>>],
    ring: Option<&HashRing>,
    key: &[u8],
    rr_lock: &Mutex<()>,
    global_rr_cursor: &AtomicUsize,
    rng: &mut impl Rng,
) -> Option<Arc<Endpoint<D>>> {
    match ring {
        Some(ring) if !ring.is_empty() => {
            let idx = ring.get_alive(key, |idx| {
                candidates
                    .get(idx as usize)
                    .map(|ep| ep.is_alive())
                    .unwrap_or(false)
            })?;
            candidates.get(idx as usize).cloned()
        }
        _ => select_round_robin(candidates, rr_lock, global_rr_cursor, rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::List;
    use rand::SeedableRng;

    #[test]
    fn round_robin_cycles_equal_weights() {
        let list: List<()> = List::new();
        list.set_policy(Policy::RoundRobin);
        list.add_endpoint("a", 1, ()).unwrap();
        list.add_endpoint("b", 1, ()).unwrap();
        list.add_endpoint("c", 1, ()).unwrap();
        let mut names = Vec::new();
        for _ in 0..6 {
            let ep = list.get(None).unwrap();
            names.push(ep.name().to_string());
        }
        assert_eq!(
            names,
            vec!["a", "b", "c", "a", "b", "c"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn sequential_always_picks_first_alive() {
        let list: List<()> = List::new();
        list.set_policy(Policy::Sequential);
        list.add_endpoint("a", 1, ()).unwrap();
        list.add_endpoint("b", 1, ()).unwrap();
        list.endpoints_snapshot()[0].mark_dead(0.0);
        let ep = list.get(None).unwrap();
        assert_eq!(ep.name(), "b");
    }

    #[test]
    fn hashed_selection_is_stable_for_same_key() {
        let list: List<()> = List::new();
        list.set_policy(Policy::Hashed);
        list.add_endpoint("a", 1, ()).unwrap();
        list.add_endpoint("b", 1, ()).unwrap();
        list.add_endpoint("c", 1, ()).unwrap();
        let first = list.get(Some(b"session-42")).unwrap();
        let second = list.get(Some(b"session-42")).unwrap();
        assert_eq!(first.name(), second.name());
    }

    #[test]
    fn hashed_without_a_key_falls_back_to_round_robin() {
        let list: List<()> = List::new();
        list.set_policy(Policy::Hashed);
        list.add_endpoint("a", 1, ()).unwrap();
        list.add_endpoint("b", 1, ()).unwrap();
        let mut names = Vec::new();
        for _ in 0..4 {
            names.push(list.get(None).unwrap().name().to_string());
        }
        assert_eq!(names, vec!["a", "b", "a", "b"]);
    }

    #[test]
    fn master_slave_prefers_highest_priority_alive_group() {
        let list: List<()> = List::new();
        list.set_policy(Policy::MasterSlave);
        list.add_endpoint_full("master", 1, 10, ()).unwrap();
        list.add_endpoint_full("slave", 1, 0, ()).unwrap();
        assert_eq!(list.get(None).unwrap().name(), "master");
        list.endpoints_snapshot()[0].mark_dead(0.0);
        assert_eq!(list.get(None).unwrap().name(), "slave");
    }

    #[test]
    fn master_slave_matches_spec_scenario_two() {
        let list: List<()> = List::new();
        list.set_policy(Policy::MasterSlave);
        list.add_endpoint_full("a", 1, 2, ()).unwrap();
        list.add_endpoint_full("b", 1, 1, ()).unwrap();
        list.add_endpoint_full("c", 1, 0, ()).unwrap();
        assert_eq!(list.get(None).unwrap().name(), "a");
    }

    #[test]
    fn random_weighted_favors_heavier_endpoint() {
        let list: List<()> = List::new();
        list.add_endpoint("light", 1, ()).unwrap();
        list.add_endpoint("heavy", 9, ()).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut heavy_wins = 0;
        for _ in 0..200 {
            let alive = list.endpoints_snapshot();
            if select_random(&alive, &mut rng).unwrap().name() == "heavy" {
                heavy_wins += 1;
            }
        }
        assert!(heavy_wins > 150, "heavy should win most draws, got {heavy_wins}");
    }
}
