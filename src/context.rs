//! A host-driven scheduling point for periodic re-resolution and
//! revival sweeps across many [`crate::List`] instances.
//!
//! `Context` never spawns its own background task: the event loop is
//! an external collaborator, so the host calls
//! [`Context::reresolve_all`] and [`Context::check_all_revivals`] from
//! whatever timer or scheduler it already runs.

use crate::limits::Limits;
use crate::policy::Policy;
use crate::resolver::Resolver;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Weak};

/// Object-safe hook letting [`Context`] drive re-resolution and
/// revival sweeps over a [`crate::List<D>`] without being generic over
/// `D` itself.
#[async_trait]
pub(crate) trait ListSweep: Send + Sync {
    async fn sweep_resolve(&self, resolver: &dyn Resolver);
    fn sweep_revivals(&self) -> usize;
}

/// Tracks a set of lists for periodic maintenance and hands out a
/// round-robin cursor shared by lists using [`crate::Policy::RoundRobin`]
/// whose candidates all carry weight 0, plus the default limits and
/// policy a list created with [`crate::List::with_context`] starts
/// from and that [`crate::Policy::Undef`] falls back to at selection
/// time.
pub struct Context {
    lists: RwLock<Vec<Weak<dyn ListSweep>>>,
    rr_cursor: Arc<AtomicUsize>,
    default_limits: RwLock<Limits>,
    default_policy: RwLock<Policy>,
}

impl Context {
    /// Creates an empty context with library-default limits and
    /// [`Policy::Random`] as the default policy.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            lists: RwLock::new(Vec::new()),
            rr_cursor: Arc::new(AtomicUsize::new(0)),
            default_limits: RwLock::new(Limits::default()),
            default_policy: RwLock::new(Policy::default()),
        })
    }

    /// The shared cursor handed to lists registered via
    /// [`Self::register_list`] or created with [`crate::List::with_context`].
    pub(crate) fn rr_cursor(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.rr_cursor)
    }

    /// Limits a list created with [`crate::List::with_context`] starts
    /// from, absent its own override.
    pub fn default_limits(&self) -> Limits {
        *self.default_limits.read()
    }

    /// Replaces the default limits handed to lists created from this
    /// context from now on. Does not retroactively update lists
    /// already created.
    pub fn set_default_limits(&self, limits: Limits) {
        *self.default_limits.write() = limits;
    }

    /// The policy [`crate::Policy::Undef`] resolves to at selection
    /// time for a list registered with this context.
    pub fn default_policy(&self) -> Policy {
        *self.default_policy.read()
    }

    /// Replaces the default policy [`crate::Policy::Undef`] resolves
    /// to for lists registered with this context.
    pub fn set_default_policy(&self, policy: Policy) {
        *self.default_policy.write() = policy;
    }

    pub(crate) fn register_list(&self, list: Weak<dyn ListSweep>) {
        let mut lists = self.lists.write();
        lists.retain(|l| l.strong_count() > 0);
        lists.push(list);
    }

    /// Re-resolves every registered list's endpoints against `resolver`.
    /// Dropped lists are pruned lazily as they're encountered.
    pub async fn reresolve_all(&self, resolver: &dyn Resolver) {
        let snapshot: Vec<_> = {
            let lists = self.lists.read();
            lists.iter().filter_map(Weak::upgrade).collect()
        };
        for list in snapshot {
            list.sweep_resolve(resolver).await;
        }
    }

    /// Runs the revival sweep across every registered list. Returns the
    /// total number of endpoints revived.
    pub fn check_all_revivals(&self) -> usize {
        let snapshot: Vec<_> = {
            let lists = self.lists.read();
            lists.iter().filter_map(Weak::upgrade).collect()
        };
        let revived: usize = snapshot.iter().map(|list| list.sweep_revivals()).sum();
        if revived > 0 {
            #[cfg(feature = "log")]
            tracing::debug!(revived, lists = snapshot.len(), "revival sweep complete");
        }
        revived
    }
}

impl Default for Context {
    fn default() -> Self {
        Self {
            lists: RwLock::new(Vec::new()),
            rr_cursor: Arc::new(AtomicUsize::new(0)),
            default_limits: RwLock::new(Limits::default()),
            default_policy: RwLock::new(Policy::default()),
        }
    }
}
