//! Watcher registration for upstream health transition notifications.

use crate::endpoint::Endpoint;
use bitflags::bitflags;

bitflags! {
    /// Events a [`Watcher`] can subscribe to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WatchEvent: u8 {
        /// Fired on every successful `ok()` call against a live endpoint.
        const SUCCESS = 1 << 0;
        /// Fired on every `fail()` call, whether or not it causes a
        /// state transition.
        const FAILURE = 1 << 1;
        /// Fired when an endpoint transitions Alive -> Dead.
        const OFFLINE = 1 << 2;
        /// Fired when an endpoint transitions Dead -> Alive.
        const ONLINE = 1 << 3;
    }
}

impl WatchEvent {
    /// All four event kinds, for callers that want to observe everything.
    pub const ALL: WatchEvent = WatchEvent::SUCCESS
        .union(WatchEvent::FAILURE)
        .union(WatchEvent::OFFLINE)
        .union(WatchEvent::ONLINE);
}

/// A watcher's notification callback. Receives the endpoint that
/// transitioned, the event that fired, and the endpoint's current error
/// count at the time of firing.
pub type WatchCallback<D> = Box<dyn Fn(&Endpoint<D>, WatchEvent, u32) + Send + Sync>;

/// A callback run once, when the owning list (and thus this watcher) is
/// dropped.
pub type FreeCallback = Box<dyn FnOnce() + Send + Sync>;

/// One registered watcher on a [`crate::List`].
pub struct Watcher<D> {
    events: WatchEvent,
    callback: WatchCallback<D>,
    free: Option<FreeCallback>,
}

impl<D> Watcher<D> {
    /// Creates a watcher firing on any event in `events`.
    pub fn new(events: WatchEvent, callback: WatchCallback<D>) -> Self {
        Self {
            events,
            callback,
            free: None,
        }
    }

    /// Attaches a free-callback, run when this watcher is dropped (i.e.
    /// when the owning list is destroyed).
    #[must_use]
    pub fn with_free(mut self, free: FreeCallback) -> Self {
        self.free = Some(free);
        self
    }

    pub(crate) fn fire(&self, endpoint: &Endpoint<D>, event: WatchEvent, cur_errors: u32) {
        if self.events.contains(event) {
            (self.callback)(endpoint, event, cur_errors);
        }
    }
}

impl<D> Drop for Watcher<D> {
    fn drop(&mut self) {
        if let Some(free) = self.free.take() {
            free();
        }
    }
}
