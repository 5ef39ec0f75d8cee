//! Selection policies and the consistent hash ring backing [`Policy::Hashed`].

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// How a [`crate::List`] picks among its alive endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// Uniform random choice among alive endpoints, weighted by
    /// `weight` when any endpoint's weight differs from 1.
    #[default]
    Random,
    /// Consistent-hash the caller-supplied key onto the ring built from
    /// alive endpoints. Keys map to the same endpoint across calls as
    /// long as the alive set doesn't change. A call made with no key
    /// (or before a ring has been built) falls back to
    /// [`Policy::RoundRobin`] for that one call rather than failing.
    Hashed,
    /// Nginx-style smooth weighted round robin.
    RoundRobin,
    /// Always prefer the highest-priority (master) endpoints; fall back
    /// to lower-priority (slave) endpoints only once every master is
    /// dead.
    MasterSlave,
    /// Walk endpoints in list order, returning the first alive one.
    Sequential,
    /// No policy configured; selection is an error.
    Undef,
}

/// Virtual nodes placed per unit of endpoint weight. Higher values
/// smooth out the distribution at the cost of a larger ring.
const REPLICAS_PER_WEIGHT: u32 = 16;

/// A consistent hash ring over a snapshot of alive endpoints, indexed
/// by position in the caller's slice.
///
/// Rebuilt whenever the underlying alive set changes; not updated
/// incrementally.
#[derive(Debug, Default)]
pub struct HashRing {
    /// Sorted `(point_hash, member_index)` pairs.
    points: Vec<(u64, u32)>,
}

impl HashRing {
    /// Builds a ring over `members`, each contributing
    /// `weight * REPLICAS_PER_WEIGHT` points, derived from `key_of`. A
    /// member whose `key_of` weight is 0 gets no points at all, so it is
    /// never selected by [`Self::get_alive`] (consistent with
    /// `Random`/`RoundRobin` excluding weight-0 candidates whenever a
    /// weighted candidate is also available).
    pub fn build<T>(members: &[T], key_of: impl Fn(&T) -> (&[u8], u32)) -> Self {
        let mut points = Vec::new();
        for (idx, member) in members.iter().enumerate() {
            let (key, weight) = key_of(member);
            if weight == 0 {
                continue;
            }
            let replicas = weight * REPLICAS_PER_WEIGHT;
            for replica in 0..replicas {
                points.push((hash_bytes(key, replica), idx as u32));
            }
        }
        points.sort_unstable_by_key(|(hash, _)| *hash);
        Self { points }
    }

    /// Returns `true` if the ring has no points (i.e. was built over no
    /// members).
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Looks up the member index owning `key`'s position on the ring,
    /// walking forward (with wraparound) until `is_alive` accepts a
    /// candidate. Returns `None` if every member is rejected.
    pub fn get_alive(&self, key: &[u8], is_alive: impl Fn(u32) -> bool) -> Option<u32> {
        if self.points.is_empty() {
            return None;
        }
        let target = hash_bytes(key, 0);
        let start = self
            .points
            .partition_point(|(hash, _)| *hash < target)
            % self.points.len();
        for offset in 0..self.points.len() {
            let (_, idx) = self.points[(start + offset) % self.points.len()];
            if is_alive(idx) {
                return Some(idx);
            }
        }
        None
    }
}

fn hash_bytes(key: &[u8], replica: u32) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    replica.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_maps_to_same_member_when_ring_unchanged() {
        let members = vec![("a", 1u32), ("b", 1u32), ("c", 1u32)];
        let ring = HashRing::build(&members, |(name, w)| (name.as_bytes(), *w));
        let alive = |_: u32| true;
        let first = ring.get_alive(b"some-key", alive);
        let second = ring.get_alive(b"some-key", alive);
        assert_eq!(first, second);
    }

    #[test]
    fn skips_dead_members() {
        let members = vec![("a", 1u32), ("b", 1u32)];
        let ring = HashRing::build(&members, |(name, w)| (name.as_bytes(), *w));
        for probe in 0..32u32 {
            let key = probe.to_be_bytes();
            let idx = ring.get_alive(&key, |i| i == 1).unwrap();
            assert_eq!(idx, 1);
        }
    }

    #[test]
    fn weight_zero_member_gets_no_ring_points() {
        let members = vec![("a", 1u32), ("b", 0u32)];
        let ring = HashRing::build(&members, |(name, w)| (name.as_bytes(), *w));
        for probe in 0..32u32 {
            let key = probe.to_be_bytes();
            let idx = ring.get_alive(&key, |_| true).unwrap();
            assert_eq!(idx, 0, "weight-0 member must never own a ring position");
        }
    }

    #[test]
    fn empty_ring_returns_none() {
        let members: Vec<(&str, u32)> = vec![];
        let ring = HashRing::build(&members, |(name, w)| (name.as_bytes(), *w));
        assert!(ring.is_empty());
        assert_eq!(ring.get_alive(b"key", |_| true), None);
    }
}
