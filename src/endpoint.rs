//! A single endpoint: its resolved addresses, health state and weight.

use crate::addr::AddressSet;
use crate::list::ListInner;
use crate::watcher::WatchEvent;
use parking_lot::Mutex;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
use std::sync::Weak;
use std::time::Instant;

/// Rolling error-window and revival bookkeeping for one endpoint.
///
/// Kept behind a single lock because the two fields are always read and
/// updated together; this is the only lock touched per `fail()`/`ok()`
/// call.
#[derive(Debug, Clone, Copy)]
struct Timing {
    /// When the current error-counting window started.
    window_start: Instant,
    /// When a dead endpoint becomes eligible for revival, if any.
    revive_at: Option<Instant>,
}

/// One endpoint in a [`crate::List`]: a name, its resolved addresses,
/// health state, and an embedder-supplied payload `D`.
///
/// Health and address state use lock-free primitives so that `ok()`,
/// `fail()` and address lookups never block a caller on another
/// caller's concurrent call; only the rarely-touched [`Timing`] pair
/// uses a short-lived lock.
pub struct Endpoint<D = ()> {
    name: String,
    /// Port combined with freshly resolved IPs on re-resolution; `0`
    /// for endpoints whose addresses are always supplied whole (e.g.
    /// literal socket addresses or SRV children, which carry their own
    /// port from the SRV target).
    port: u16,
    addrs: AddressSet,
    weight: u32,
    priority: i32,
    data: D,
    alive: AtomicBool,
    errors: AtomicU32,
    timing: Mutex<Timing>,
    /// Smooth weighted round-robin accumulator (Nginx algorithm).
    current_weight: AtomicI64,
    parent: Weak<ListInner<D>>,
}

impl<D> Endpoint<D> {
    pub(crate) fn new(
        name: String,
        port: u16,
        addrs: Vec<SocketAddr>,
        weight: u32,
        priority: i32,
        data: D,
        parent: Weak<ListInner<D>>,
    ) -> Self {
        Self {
            name,
            port,
            addrs: AddressSet::new(addrs),
            weight,
            priority,
            data,
            alive: AtomicBool::new(true),
            errors: AtomicU32::new(0),
            timing: Mutex::new(Timing {
                window_start: Instant::now(),
                revive_at: None,
            }),
            current_weight: AtomicI64::new(0),
            parent,
        }
    }

    /// The endpoint's configured name (hostname, IP literal, or SRV
    /// target name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The port combined with freshly resolved addresses when this
    /// endpoint is re-resolved by hostname. `0` if this endpoint's
    /// addresses are always supplied whole.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The endpoint's static weight, used by [`crate::Policy::Random`]
    /// and [`crate::Policy::RoundRobin`].
    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// The endpoint's static priority. Higher values are preferred by
    /// [`crate::Policy::MasterSlave`].
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// The embedder-supplied payload attached at construction.
    pub fn data(&self) -> &D {
        &self.data
    }

    /// `true` if the endpoint is currently considered healthy and
    /// eligible for selection.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Number of resolved addresses currently held.
    pub fn addr_count(&self) -> usize {
        self.addrs.len()
    }

    /// Returns the address the round-robin cursor currently points at
    /// without advancing it.
    pub fn cur_addr(&self) -> Option<SocketAddr> {
        self.addrs.cur()
    }

    /// Returns the address the round-robin cursor points at and
    /// advances it, wrapping across this endpoint's address set.
    pub fn next_addr(&self) -> Option<SocketAddr> {
        self.addrs.next()
    }

    pub(crate) fn current_weight_cell(&self) -> &AtomicI64 {
        &self.current_weight
    }

    /// Records a successful use of this endpoint: clears its error
    /// count and, if it was dead, revives it immediately.
    pub fn ok(&self) {
        let was_dead = !self.alive.swap(true, Ordering::AcqRel);
        self.errors.store(0, Ordering::Relaxed);
        {
            let mut timing = self.timing.lock();
            timing.revive_at = None;
            timing.window_start = Instant::now();
        }
        if let Some(parent) = self.parent.upgrade() {
            parent.invalidate_hash_ring();
            if was_dead {
                #[cfg(feature = "log")]
                tracing::info!(endpoint = %self.name, "endpoint revived");
                parent.fire_watchers(self, WatchEvent::ONLINE, 0);
            }
            parent.fire_watchers(self, WatchEvent::SUCCESS, 0);
        }
    }

    /// Records a failed use of this endpoint. If `max_errors` failures
    /// have now occurred within `error_time`, marks the endpoint dead
    /// and schedules its jittered revival, drawing the jitter fraction
    /// internally so callers never need to supply their own randomness.
    ///
    /// Idempotent while the endpoint is already dead: the error count
    /// and window are left untouched, though `FAILURE` watchers still
    /// fire so a subscriber can observe repeated failures against a
    /// dead endpoint.
    pub fn fail(&self) {
        let Some(parent) = self.parent.upgrade() else {
            return;
        };
        if !self.alive.load(Ordering::Acquire) {
            parent.fire_watchers(self, WatchEvent::FAILURE, self.errors.load(Ordering::Relaxed));
            return;
        }
        let limits = parent.limits();
        let now = Instant::now();
        let errors = {
            let mut timing = self.timing.lock();
            if now.duration_since(timing.window_start) >= limits.error_time {
                timing.window_start = now;
                self.errors.store(0, Ordering::Relaxed);
            }
            self.errors.fetch_add(1, Ordering::Relaxed) + 1
        };
        parent.fire_watchers(self, WatchEvent::FAILURE, errors);

        if errors >= limits.max_errors && self.alive.swap(false, Ordering::AcqRel) {
            let draw = crate::health::jitter_draw(&mut rand::rng());
            let revive_in = limits.jittered_revive_time(draw);
            let mut timing = self.timing.lock();
            timing.revive_at = Some(now + revive_in);
            drop(timing);
            parent.invalidate_hash_ring();
            #[cfg(feature = "log")]
            tracing::warn!(endpoint = %self.name, errors, "endpoint marked dead");
            parent.fire_watchers(self, WatchEvent::OFFLINE, errors);
        }
    }

    /// As [`Self::fail`], for a failure that was specific to the address
    /// currently in use (e.g. a single resolved IP refusing the
    /// connection) rather than the endpoint as a whole. Advances the
    /// address cursor in addition to the usual error bookkeeping, so a
    /// caller's next attempt targets a different resolved address
    /// without the endpoint being marked down prematurely over what may
    /// be one bad IP among several.
    pub fn fail_addr(&self) {
        self.addrs.next();
        self.fail();
    }

    /// Unconditionally marks the endpoint dead, scheduling revival as
    /// if its error threshold had just been crossed. A test-only escape
    /// hatch for exercising dead/all-dead behavior without driving
    /// `fail()` through the real error threshold. `jitter` is the draw
    /// in `[-1, 1]` passed straight to [`Limits::jittered_revive_time`]
    /// so tests can pin a deterministic `revive_at`.
    #[cfg(test)]
    pub(crate) fn mark_dead(&self, jitter: f64) {
        let Some(parent) = self.parent.upgrade() else {
            return;
        };
        if self.alive.swap(false, Ordering::AcqRel) {
            let limits = parent.limits();
            let revive_in = limits.jittered_revive_time(jitter);
            let mut timing = self.timing.lock();
            timing.revive_at = Some(Instant::now() + revive_in);
            drop(timing);
            parent.invalidate_hash_ring();
            parent.fire_watchers(self, WatchEvent::OFFLINE, self.errors.load(Ordering::Relaxed));
        }
    }

    /// Revives the endpoint immediately, bypassing its scheduled
    /// `revive_at`. Used both by the periodic revival sweep once
    /// `revive_at` has passed and by the all-dead recovery path.
    pub(crate) fn revive_now(&self) {
        let Some(parent) = self.parent.upgrade() else {
            return;
        };
        if !self.alive.swap(true, Ordering::AcqRel) {
            self.errors.store(0, Ordering::Relaxed);
            {
                let mut timing = self.timing.lock();
                timing.revive_at = None;
                timing.window_start = Instant::now();
            }
            parent.invalidate_hash_ring();
            #[cfg(feature = "log")]
            tracing::info!(endpoint = %self.name, "endpoint revived");
            parent.fire_watchers(self, WatchEvent::ONLINE, 0);
        }
    }

    /// Returns the instant this dead endpoint becomes eligible for
    /// revival, or `None` if it is alive or has no schedule yet.
    pub(crate) fn revive_at(&self) -> Option<Instant> {
        self.timing.lock().revive_at
    }

    /// Replaces this endpoint's resolved addresses in place, as the
    /// result of a re-resolution.
    pub(crate) fn replace_addrs(&self, addrs: Vec<SocketAddr>) {
        self.addrs.replace(addrs);
    }

    /// Appends a caller-supplied address to this endpoint's address
    /// set without disturbing the cursor.
    ///
    /// Survives re-resolution only if the owning list carries the
    /// [`crate::Flags::NO_RESOLVE`] flag; otherwise the next
    /// resolution sweep replaces the whole set wholesale and this
    /// address is lost, per the dynamic address injection semantics
    /// documented on [`crate::List::resolve_all`].
    pub fn add_addr(&self, addr: SocketAddr) {
        self.addrs.push(addr);
    }
}

impl<D: fmt::Debug> fmt::Debug for Endpoint<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .field("priority", &self.priority)
            .field("alive", &self.is_alive())
            .field("addr_count", &self.addr_count())
            .field("data", &self.data)
            .finish()
    }
}
