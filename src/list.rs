//! A pool of endpoints sharing limits, a selection policy and watchers.

use crate::context::{Context, ListSweep};
use crate::endpoint::Endpoint;
use crate::error::ParseError;
use crate::flags::Flags;
use crate::health;
use crate::limits::Limits;
use crate::parse::{self, EndpointConfig, ParseKind, ParsedEndpoint};
use crate::policy::{HashRing, Policy};
use crate::resolver::{resolve_with_retry, Resolver};
use crate::select;
use crate::watcher::Watcher;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// A group of endpoints resolved from a single SRV record, replaced
/// wholesale on each re-resolution.
pub(crate) struct SrvGroup<D> {
    name: String,
    children: RwLock<Vec<Arc<Endpoint<D>>>>,
}

/// One slot in a list's member vector: either a directly-configured
/// endpoint, or an SRV record whose children are expanded and replaced
/// as a unit on resolution.
pub(crate) enum Member<D> {
    Direct(Arc<Endpoint<D>>),
    Srv(Arc<SrvGroup<D>>),
}

/// Shared state behind every clone of a [`List`]. Endpoints hold a
/// [`Weak`] pointer back here (via [`Arc::new_cyclic`]) so they can
/// reach limits and watchers without the list needing to track them
/// separately.
pub(crate) struct ListInner<D> {
    flags: RwLock<Flags>,
    limits: RwLock<Limits>,
    policy: RwLock<Policy>,
    members: RwLock<Vec<Member<D>>>,
    watchers: RwLock<Vec<Watcher<D>>>,
    hash_ring: RwLock<Option<HashRing>>,
    rr_lock: Mutex<()>,
    rr_cursor: Arc<AtomicUsize>,
    /// Set only for lists created with [`List::with_context`]; used to
    /// resolve [`Policy::Undef`] to the context's configured default at
    /// selection time.
    ctx: Option<Arc<Context>>,
    self_weak: Weak<ListInner<D>>,
}

impl<D> ListInner<D> {
    pub(crate) fn limits(&self) -> Limits {
        *self.limits.read()
    }

    pub(crate) fn invalidate_hash_ring(&self) {
        *self.hash_ring.write() = None;
    }

    pub(crate) fn fire_watchers(
        &self,
        endpoint: &Endpoint<D>,
        event: crate::watcher::WatchEvent,
        errors: u32,
    ) {
        for watcher in self.watchers.read().iter() {
            watcher.fire(endpoint, event, errors);
        }
    }
}

/// A pool of endpoints: resolved addresses, health tracking and a
/// selection policy, shared cheaply by cloning.
///
/// `List` is a thin, `Clone`-able handle around an `Arc`-shared inner
/// state; endpoints hold a [`Weak`] back-reference to that same state
/// so they can fire watchers and read limits without the list needing
/// a second, separately-locked index of them.
pub struct List<D = ()>(pub(crate) Arc<ListInner<D>>);

impl<D> Clone for List<D> {
    fn clone(&self) -> Self {
        List(Arc::clone(&self.0))
    }
}

impl<D> Default for List<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> List<D> {
    /// Creates an empty list with default limits, [`Policy::Random`]
    /// and no registered watchers.
    pub fn new() -> Self {
        Self::with_rr_cursor(Arc::new(AtomicUsize::new(0)), None, Limits::default())
    }

    /// Creates a list registered with `ctx`, so [`Context::reresolve_all`]
    /// and [`Context::check_all_revivals`] sweep it, an all-zero-weight
    /// [`Policy::RoundRobin`] draws from the cursor shared by every
    /// other list on `ctx`, and [`Policy::Undef`] resolves to
    /// `ctx.default_policy()` at selection time. The list's limits are
    /// seeded from `ctx.default_limits()` at creation (a later call to
    /// [`Context::set_default_limits`] does not retroactively affect
    /// it).
    pub fn with_context(ctx: &Arc<Context>) -> Self
    where
        D: Send + Sync + Default + 'static,
    {
        let list = Self::with_rr_cursor(ctx.rr_cursor(), Some(Arc::clone(ctx)), ctx.default_limits());
        let sweep: Weak<dyn ListSweep> = Arc::downgrade(&list.0) as Weak<dyn ListSweep>;
        ctx.register_list(sweep);
        list
    }

    fn with_rr_cursor(rr_cursor: Arc<AtomicUsize>, ctx: Option<Arc<Context>>, limits: Limits) -> Self {
        let inner = Arc::new_cyclic(|weak| ListInner {
            flags: RwLock::new(Flags::default()),
            limits: RwLock::new(limits),
            policy: RwLock::new(Policy::default()),
            members: RwLock::new(Vec::new()),
            watchers: RwLock::new(Vec::new()),
            hash_ring: RwLock::new(None),
            rr_lock: Mutex::new(()),
            rr_cursor,
            ctx,
            self_weak: weak.clone(),
        });
        List(inner)
    }

    /// Adds a single endpoint parsed from `name` (`host[:port[:priority]]`
    /// or a literal IP), with the given weight and data. If `name`
    /// doesn't carry the `:priority` shorthand, the endpoint's priority
    /// defaults to 0.
    pub fn add_endpoint(&self, name: &str, weight: u32, data: D) -> Result<(), ParseError> {
        self.add_endpoint_full(name, weight, 0, data)
    }

    /// As [`Self::add_endpoint`], with a `priority` used whenever `name`
    /// doesn't itself carry the `:priority` shorthand (used by
    /// [`Policy::MasterSlave`]); an embedded shorthand always wins.
    pub fn add_endpoint_full(
        &self,
        name: &str,
        weight: u32,
        priority: i32,
        data: D,
    ) -> Result<(), ParseError> {
        let parsed = parse::parse_endpoint(name, 0)?;
        self.push_parsed(parsed, weight, priority, data);
        Ok(())
    }

    /// Adds every endpoint in `names`, cloning `data` for each.
    pub fn add_endpoints(&self, names: &[&str], weight: u32, data: D) -> Result<(), ParseError>
    where
        D: Clone,
    {
        for name in names {
            self.add_endpoint_full(name, weight, 0, data.clone())?;
        }
        Ok(())
    }

    /// Parses `line` as a `[,;\s]+`-separated run of `name[:port[:priority]]`
    /// entries against `default_port`, adding each one that parses
    /// successfully with `weight` and a clone of `data`. Malformed
    /// entries are skipped and logged rather than failing the whole
    /// call. Returns `true` if at least one endpoint was added.
    pub fn add_endpoint_list(&self, line: &str, default_port: u16, weight: u32, data: D) -> bool
    where
        D: Clone,
    {
        let parsed = parse::parse_endpoint_list(line, default_port);
        let added = !parsed.is_empty();
        for entry in parsed {
            self.push_parsed(entry, weight, 0, data.clone());
        }
        added
    }

    /// Adds the endpoint(s) described by a structured config value,
    /// per the three shapes a host's config loader may hand back for
    /// one list entry: a bare `name[:port[:priority]]` scalar
    /// (delegated to the line parser, so it may itself expand into
    /// several endpoints), an array of such scalars (each parsed
    /// independently), or a fully keyed object naming `weight`,
    /// `priority` and `srv` explicitly and expanding into an SRV group
    /// when `srv` is set. Returns `true` if at least one endpoint was
    /// added. `default_port` fills in the port wherever the config
    /// value didn't carry its own.
    pub fn add_config(&self, cfg: EndpointConfig, default_port: u16, data: D) -> bool
    where
        D: Clone,
    {
        match cfg {
            EndpointConfig::Scalar(line) => self.add_endpoint_list(&line, default_port, 1, data),
            EndpointConfig::Array(lines) => {
                let mut added = false;
                for line in lines {
                    if self.add_endpoint_list(&line, default_port, 1, data.clone()) {
                        added = true;
                    }
                }
                added
            }
            EndpointConfig::Object(obj) => {
                let parsed = obj.into_parsed(default_port);
                self.push_parsed(parsed, obj.weight, obj.priority, data);
                true
            }
        }
    }

    /// Adds a literal nameserver address, bypassing parsing and
    /// resolution entirely (mirrors `RSPAMD_UPSTREAM_PARSE_NAMESERVER`
    /// in `original_source/`).
    pub fn add_nameserver(&self, addr: SocketAddr, data: D) {
        let ep = Arc::new(Endpoint::new(
            addr.ip().to_string(),
            addr.port(),
            vec![addr],
            1,
            0,
            data,
            self.0.self_weak.clone(),
        ));
        self.0.members.write().push(Member::Direct(ep));
        self.0.invalidate_hash_ring();
    }

    /// As [`Self::add_nameserver`], parsing `line` (`ip[:port]`, port
    /// defaulting to 53) rather than taking an already-constructed
    /// [`SocketAddr`] (1's
    /// `RSPAMD_UPSTREAM_PARSE_NAMESERVER` supplement).
    pub fn add_nameserver_line(&self, line: &str, weight: u32, data: D) -> Result<(), ParseError> {
        let parsed = parse::parse_nameserver(line)?;
        self.push_parsed(parsed, weight, 0, data);
        Ok(())
    }

    /// `priority` is the caller's default, overridden by a priority
    /// embedded in the parsed name itself (the `name:port:priority`
    /// shorthand, 1).
    ///
    /// A hostname entry is treated as an SRV target instead of a direct
    /// A/AAAA lookup whenever this list carries the
    /// [`Flags::SRV_RESOLVE`] flag, independent of whichever parse path
    /// (line, list, or structured-config scalar/array) produced it; the
    /// structured-config object form's own `srv` field (already folded
    /// into `parsed.kind` by [`EndpointConfigObject::into_parsed`]) is a
    /// separate, per-entry way to request the same thing.
    fn push_parsed(&self, parsed: ParsedEndpoint, weight: u32, priority: i32, data: D) {
        let priority = if parsed.priority != 0 {
            parsed.priority
        } else {
            priority
        };
        let kind = if parsed.kind == ParseKind::Hostname && self.0.flags.read().contains(Flags::SRV_RESOLVE) {
            ParseKind::Srv
        } else {
            parsed.kind
        };
        match kind {
            ParseKind::Srv => {
                self.0.members.write().push(Member::Srv(Arc::new(SrvGroup {
                    name: parsed.name,
                    children: RwLock::new(Vec::new()),
                })));
            }
            // Literal IPs and nameserver entries are both concrete
            // addresses the moment they're parsed; neither is ever
            // handed to the resolver.
            ParseKind::Literal | ParseKind::Nameserver => {
                let port = parsed.port;
                let addrs = parsed
                    .name
                    .parse::<IpAddr>()
                    .map(|ip| vec![SocketAddr::new(ip, port)])
                    .unwrap_or_default();
                let ep = Arc::new(Endpoint::new(
                    parsed.name,
                    port,
                    addrs,
                    weight,
                    priority,
                    data,
                    self.0.self_weak.clone(),
                ));
                self.0.members.write().push(Member::Direct(ep));
            }
            ParseKind::Hostname => {
                let port = parsed.port;
                let ep = Arc::new(Endpoint::new(
                    parsed.name,
                    port,
                    Vec::new(),
                    weight,
                    priority,
                    data,
                    self.0.self_weak.clone(),
                ));
                self.0.members.write().push(Member::Direct(ep));
            }
        }
        self.0.invalidate_hash_ring();
    }

    /// Registers a watcher, invoked for every matching health
    /// transition on this list's endpoints until the list is dropped.
    pub fn watch(&self, watcher: Watcher<D>) {
        self.0.watchers.write().push(watcher);
    }

    /// Replaces this list's limits.
    pub fn set_limits(&self, limits: Limits) {
        *self.0.limits.write() = limits;
    }

    /// The list's current limits.
    pub fn limits(&self) -> Limits {
        self.0.limits()
    }

    /// Replaces this list's behavior flags.
    pub fn set_flags(&self, flags: Flags) {
        *self.0.flags.write() = flags;
    }

    /// The list's current behavior flags.
    pub fn flags(&self) -> Flags {
        *self.0.flags.read()
    }

    /// Replaces this list's selection policy, invalidating any cached
    /// hash ring so the next [`Policy::Hashed`] call rebuilds it.
    pub fn set_policy(&self, policy: Policy) {
        *self.0.policy.write() = policy;
        self.0.invalidate_hash_ring();
    }

    /// The list's current selection policy.
    pub fn policy(&self) -> Policy {
        *self.0.policy.read()
    }

    /// Total number of leaf endpoints, counting SRV children.
    pub fn count(&self) -> usize {
        self.flatten_candidates().len()
    }

    /// Number of leaf endpoints currently considered alive.
    pub fn alive_count(&self) -> usize {
        self.flatten_candidates().iter().filter(|ep| ep.is_alive()).count()
    }

    /// Runs `f` over every leaf endpoint.
    pub fn foreach(&self, mut f: impl FnMut(&Endpoint<D>)) {
        for ep in self.flatten_candidates() {
            f(&ep);
        }
    }

    pub(crate) fn endpoints_snapshot(&self) -> Vec<Arc<Endpoint<D>>> {
        self.flatten_candidates()
    }

    fn flatten_candidates(&self) -> Vec<Arc<Endpoint<D>>> {
        let members = self.0.members.read();
        let mut out = Vec::new();
        for member in members.iter() {
            match member {
                Member::Direct(ep) => out.push(Arc::clone(ep)),
                Member::Srv(group) => out.extend(group.children.read().iter().cloned()),
            }
        }
        out
    }

    fn rebuild_hash_ring_if_needed(&self, candidates: &[Arc<Endpoint<D>>]) {
        let needs_build = self.0.hash_ring.read().is_none();
        if needs_build {
            let ring = HashRing::build(candidates, |ep| (ep.name().as_bytes(), ep.weight()));
            *self.0.hash_ring.write() = Some(ring);
        }
    }

    /// Picks one endpoint per the configured policy. `key` selects the
    /// hash-ring position under [`Policy::Hashed`] and is ignored by
    /// every other policy.
    pub fn get(&self, key: Option<&[u8]>) -> Option<Arc<Endpoint<D>>> {
        let candidates = self.flatten_candidates();
        health::check_revivals(&candidates);
        health::ensure_not_all_dead(&candidates);
        self.select_from(&candidates, key)
    }

    /// As [`Self::get`], but selects under `policy` rather than this
    /// list's own configured default, without changing it. Useful for a
    /// caller that wants a one-off pick under a different policy (e.g.
    /// falling back to [`Policy::Sequential`] for a single retry)
    /// without calling [`Self::set_policy`] and racing other concurrent
    /// callers that still want the list's configured policy.
    pub fn get_forced(&self, policy: Policy, key: Option<&[u8]>) -> Option<Arc<Endpoint<D>>> {
        let candidates = self.flatten_candidates();
        health::check_revivals(&candidates);
        health::ensure_not_all_dead(&candidates);
        self.select_from_with(policy, &candidates, key)
    }

    /// As [`Self::get`], restricted to endpoints for which `exclude`
    /// returns `false`. Used by callers retrying against a different
    /// endpoint than one that just failed; `exclude` is applied even to
    /// an endpoint that's already dead, so a caller can express
    /// "anything but the one I just failed on" unconditionally.
    pub fn get_except(
        &self,
        exclude: impl Fn(&Endpoint<D>) -> bool,
        key: Option<&[u8]>,
    ) -> Option<Arc<Endpoint<D>>> {
        let candidates: Vec<_> = self
            .flatten_candidates()
            .into_iter()
            .filter(|ep| !exclude(ep))
            .collect();
        health::check_revivals(&candidates);
        health::ensure_not_all_dead(&candidates);
        self.select_from(&candidates, key)
    }

    fn select_from(&self, candidates: &[Arc<Endpoint<D>>], key: Option<&[u8]>) -> Option<Arc<Endpoint<D>>> {
        self.select_from_with(self.policy(), candidates, key)
    }

    fn select_from_with(
        &self,
        policy: Policy,
        candidates: &[Arc<Endpoint<D>>],
        key: Option<&[u8]>,
    ) -> Option<Arc<Endpoint<D>>> {
        let policy = if policy == Policy::Undef {
            self.0.ctx.as_ref().map(|ctx| ctx.default_policy()).unwrap_or_default()
        } else {
            policy
        };
        if policy == Policy::Hashed {
            self.rebuild_hash_ring_if_needed(candidates);
        }
        let ring_guard = self.0.hash_ring.read();
        let mut rng = rand::rng();
        let picked = select::select(
            candidates,
            policy,
            ring_guard.as_ref(),
            key,
            &self.0.rr_lock,
            &self.0.rr_cursor,
            &mut rng,
        );
        // Every successful pick also rotates the winner's own address
        // cursor, so repeatedly selecting the same endpoint (e.g. under
        // `Policy::Sequential`, or a single-member list) still yields a
        // rotating view of its resolved addresses via `next_addr`.
        if let Some(ep) = &picked {
            ep.next_addr();
        }
        picked
    }

    /// Re-resolves every member's name (and every SRV group's targets)
    /// against `resolver`. A member whose lookup fails or times out
    /// keeps its previous addresses; one that succeeds but returns no
    /// addresses is also left untouched. SRV children are synthesized
    /// with `D::default()`, since the parent
    /// SRV entry (not any one child) is where an embedder's data
    /// naturally belongs.
    pub async fn resolve_all(&self, resolver: &dyn Resolver)
    where
        D: Default,
    {
        if self.0.flags.read().contains(Flags::NO_RESOLVE) {
            return;
        }
        let members: Vec<_> = self.0.members.read().iter().map(clone_member).collect();
        let limits = self.0.limits();
        for member in &members {
            match member {
                Member::Direct(ep) => {
                    resolve_direct(ep, resolver, &limits).await;
                }
                Member::Srv(group) => {
                    resolve_srv_group(group, resolver, &limits, &self.0.self_weak).await;
                }
            }
        }
        self.0.invalidate_hash_ring();
    }
}

fn clone_member<D>(member: &Member<D>) -> Member<D> {
    match member {
        Member::Direct(ep) => Member::Direct(Arc::clone(ep)),
        Member::Srv(group) => Member::Srv(Arc::clone(group)),
    }
}

/// Literal IP endpoints are never re-resolved; everything else is
/// looked up by name and has its addresses atomically replaced on
/// success.
async fn resolve_direct<D>(ep: &Arc<Endpoint<D>>, resolver: &dyn Resolver, limits: &Limits) {
    if ep.name().parse::<IpAddr>().is_ok() {
        return;
    }
    match resolve_with_retry(ep.name(), limits, || resolver.lookup_ip(ep.name())).await {
        Ok(ips) if !ips.is_empty() => {
            #[cfg(feature = "log")]
            tracing::debug!(host = %ep.name(), count = ips.len(), "re-resolved endpoint");
            let addrs: Vec<SocketAddr> = ips.into_iter().map(|ip| SocketAddr::new(ip, ep.port())).collect();
            ep.replace_addrs(addrs);
        }
        Ok(_) => {
            #[cfg(feature = "log")]
            tracing::debug!(host = %ep.name(), "re-resolution returned no addresses, keeping previous");
        }
        Err(err) => {
            #[cfg(feature = "log")]
            tracing::warn!(host = %ep.name(), error = %err, "re-resolution failed, keeping previous addresses");
        }
    }
}

async fn resolve_srv_group<D: Default>(
    group: &Arc<SrvGroup<D>>,
    resolver: &dyn Resolver,
    limits: &Limits,
    parent: &Weak<ListInner<D>>,
) {
    let targets = match resolve_with_retry(&group.name, limits, || resolver.lookup_srv(&group.name)).await {
        Ok(targets) if !targets.is_empty() => targets,
        Ok(_) => {
            #[cfg(feature = "log")]
            tracing::debug!(srv = %group.name, "SRV lookup returned no targets, keeping previous children");
            return;
        }
        Err(err) => {
            #[cfg(feature = "log")]
            tracing::warn!(srv = %group.name, error = %err, "SRV lookup failed, keeping previous children");
            return;
        }
    };
    #[cfg(feature = "log")]
    tracing::debug!(srv = %group.name, count = targets.len(), "re-resolved SRV group");
    let mut new_children = Vec::with_capacity(targets.len());
    for target in targets {
        let addrs = resolve_with_retry(&target.target, limits, || resolver.lookup_ip(&target.target))
            .await
            .map(|ips| {
                ips.into_iter()
                    .map(|ip| SocketAddr::new(ip, target.port))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        new_children.push(Arc::new(Endpoint::new(
            target.target.clone(),
            target.port,
            addrs,
            target.weight as u32,
            target.priority as i32,
            D::default(),
            parent.clone(),
        )));
    }
    *group.children.write() = new_children;
}

#[async_trait]
impl<D: Send + Sync + Default + 'static> ListSweep for ListInner<D> {
    async fn sweep_resolve(&self, resolver: &dyn Resolver) {
        let handle = List(self.self_weak.upgrade().expect("sweep runs on a live list"));
        handle.resolve_all(resolver).await;
    }

    fn sweep_revivals(&self) -> usize {
        let members = self.members.read();
        let mut candidates = Vec::new();
        for member in members.iter() {
            match member {
                Member::Direct(ep) => candidates.push(Arc::clone(ep)),
                Member::Srv(group) => candidates.extend(group.children.read().iter().cloned()),
            }
        }
        drop(members);
        health::check_revivals(&candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_endpoint_list_skips_bad_entries_but_adds_the_rest() {
        let list: List<()> = List::new();
        let added = list.add_endpoint_list("good.example.com, [::1:25, also-good.example.com", 80, 1, ());
        assert!(added);
        assert_eq!(list.count(), 2);
    }

    #[test]
    fn add_endpoint_list_reports_false_when_nothing_parsed() {
        let list: List<()> = List::new();
        let added = list.add_endpoint_list("   ", 80, 1, ());
        assert!(!added);
        assert_eq!(list.count(), 0);
    }

    #[test]
    fn add_config_handles_all_three_structured_shapes() {
        let scalars: List<()> = List::new();
        let cfg: EndpointConfig = serde_json::from_str(r#""a.example.com, b.example.com""#).unwrap();
        assert!(scalars.add_config(cfg, 80, ()));
        assert_eq!(scalars.count(), 2);

        let arrays: List<()> = List::new();
        let cfg: EndpointConfig = serde_json::from_str(r#"["a.example.com", "b.example.com"]"#).unwrap();
        assert!(arrays.add_config(cfg, 80, ()));
        assert_eq!(arrays.count(), 2);

        let objects: List<()> = List::new();
        let cfg: EndpointConfig =
            serde_json::from_str(r#"{"name": "a.example.com", "weight": 3, "priority": 2}"#).unwrap();
        assert!(objects.add_config(cfg, 80, ()));
        let ep = objects.get(None).unwrap();
        assert_eq!(ep.weight(), 3);
        assert_eq!(ep.priority(), 2);
    }

    #[test]
    fn add_nameserver_line_defaults_port_and_skips_resolution() {
        let list: List<()> = List::new();
        list.add_nameserver_line("10.0.0.53", 1, ()).unwrap();
        let ep = list.get(None).unwrap();
        assert_eq!(ep.cur_addr().unwrap().port(), 53);
    }

    #[test]
    fn undef_policy_resolves_to_context_default() {
        let ctx = Context::new();
        ctx.set_default_policy(Policy::Sequential);
        let list: List<()> = List::with_context(&ctx);
        list.set_policy(Policy::Undef);
        list.add_endpoint("a", 1, ()).unwrap();
        list.add_endpoint("b", 1, ()).unwrap();
        list.endpoints_snapshot()[0].mark_dead(0.0);
        assert_eq!(list.get(None).unwrap().name(), "b");
    }

    #[test]
    fn undef_policy_falls_back_to_random_without_a_context() {
        let list: List<()> = List::new();
        list.set_policy(Policy::Undef);
        list.add_endpoint("a", 1, ()).unwrap();
        assert_eq!(list.get(None).unwrap().name(), "a");
    }

    #[test]
    fn get_forced_overrides_configured_policy_without_changing_it() {
        let list: List<()> = List::new();
        list.set_policy(Policy::RoundRobin);
        list.add_endpoint("a", 1, ()).unwrap();
        list.add_endpoint("b", 1, ()).unwrap();
        list.endpoints_snapshot()[1].mark_dead(0.0);

        let ep = list.get_forced(Policy::Sequential, None).unwrap();
        assert_eq!(ep.name(), "a");
        assert_eq!(list.policy(), Policy::RoundRobin, "get_forced must not mutate the list's own policy");
    }

    #[test]
    fn priority_shorthand_in_line_overrides_caller_default() {
        let list: List<()> = List::new();
        list.set_policy(Policy::MasterSlave);
        list.add_endpoint_full("master:80:10", 1, 99, ()).unwrap();
        list.add_endpoint_full("slave:80:-1", 1, 99, ()).unwrap();
        assert_eq!(list.get(None).unwrap().name(), "master");
    }

    #[test]
    fn repeated_selection_of_the_same_endpoint_rotates_its_addresses() {
        let list: List<()> = List::new();
        list.set_policy(Policy::Sequential);
        list.add_endpoint("a", 1, ()).unwrap();
        let ep = list.endpoints_snapshot().into_iter().next().unwrap();
        let a1 = "10.0.0.1:80".parse().unwrap();
        let a2 = "10.0.0.2:80".parse().unwrap();
        ep.add_addr(a1);
        ep.add_addr(a2);

        assert_eq!(list.get(None).unwrap().cur_addr(), Some(a2));
        assert_eq!(list.get(None).unwrap().cur_addr(), Some(a1));
    }
}
