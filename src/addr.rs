//! Lock-free address sets with a round-robin cursor.

use arc_swap::ArcSwap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// The set of socket addresses currently resolved for one endpoint.
///
/// Resolution replaces the whole vector atomically; readers never observe
/// a partially-updated set. The cursor is only reset when the new set
/// actually differs from the old one, so an unrelated re-resolution that
/// returns the same addresses does not perturb an in-progress
/// round-robin walk over them.
#[derive(Debug)]
pub struct AddressSet {
    addrs: ArcSwap<Vec<SocketAddr>>,
    cursor: AtomicUsize,
}

impl AddressSet {
    /// Creates a set from an initial list of addresses.
    pub fn new(addrs: Vec<SocketAddr>) -> Self {
        Self {
            addrs: ArcSwap::from_pointee(addrs),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Returns the number of addresses currently held.
    pub fn len(&self) -> usize {
        self.addrs.load().len()
    }

    /// Returns `true` if no addresses are currently held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a snapshot of the current address list.
    pub fn snapshot(&self) -> Arc<Vec<SocketAddr>> {
        self.addrs.load_full()
    }

    /// Replaces the address set. Resets the cursor only if `new` differs
    /// from the set currently held.
    pub fn replace(&self, new: Vec<SocketAddr>) {
        let changed = {
            let cur = self.addrs.load();
            cur.as_slice() != new.as_slice()
        };
        self.addrs.store(Arc::new(new));
        if changed {
            self.cursor.store(0, Ordering::Relaxed);
        }
    }

    /// Appends a single address without disturbing the cursor.
    pub fn push(&self, addr: SocketAddr) {
        self.addrs.rcu(|cur| {
            let mut next = (**cur).clone();
            next.push(addr);
            next
        });
    }

    /// Returns the address the cursor currently points at, without
    /// advancing it.
    pub fn cur(&self) -> Option<SocketAddr> {
        let addrs = self.addrs.load();
        if addrs.is_empty() {
            return None;
        }
        let idx = self.cursor.load(Ordering::Relaxed) % addrs.len();
        Some(addrs[idx])
    }

    /// Returns the address the cursor currently points at and advances
    /// it to the next one, wrapping around.
    pub fn next(&self) -> Option<SocketAddr> {
        let addrs = self.addrs.load();
        if addrs.is_empty() {
            return None;
        }
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % addrs.len();
        Some(addrs[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> SocketAddr {
        format!("127.0.0.1:{port}").parse().unwrap()
    }

    #[test]
    fn next_wraps_around() {
        let set = AddressSet::new(vec![addr(1), addr(2)]);
        assert_eq!(set.next(), Some(addr(1)));
        assert_eq!(set.next(), Some(addr(2)));
        assert_eq!(set.next(), Some(addr(1)));
    }

    #[test]
    fn replace_with_same_addrs_preserves_cursor() {
        let set = AddressSet::new(vec![addr(1), addr(2)]);
        let _ = set.next();
        set.replace(vec![addr(1), addr(2)]);
        assert_eq!(set.next(), Some(addr(2)));
    }

    #[test]
    fn replace_with_new_addrs_resets_cursor() {
        let set = AddressSet::new(vec![addr(1), addr(2)]);
        let _ = set.next();
        set.replace(vec![addr(3), addr(4)]);
        assert_eq!(set.cur(), Some(addr(3)));
    }

    #[test]
    fn empty_set_returns_none() {
        let set = AddressSet::new(vec![]);
        assert!(set.is_empty());
        assert_eq!(set.next(), None);
    }
}
