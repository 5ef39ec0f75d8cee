//! End-to-end scenarios driven by a mock resolver instead of real DNS.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use upstream_rs::{Limits, List, Policy, ResolveError, Resolver};

struct MockResolver {
    ips: Mutex<HashMap<String, Vec<IpAddr>>>,
    srvs: Mutex<HashMap<String, Vec<upstream_rs::resolver::SrvTarget>>>,
}

impl MockResolver {
    fn new() -> Self {
        Self {
            ips: Mutex::new(HashMap::new()),
            srvs: Mutex::new(HashMap::new()),
        }
    }

    fn set(&self, host: &str, ips: Vec<IpAddr>) {
        self.ips.lock().insert(host.to_string(), ips);
    }

    fn set_srv(&self, name: &str, targets: Vec<upstream_rs::resolver::SrvTarget>) {
        self.srvs.lock().insert(name.to_string(), targets);
    }
}

#[async_trait]
impl Resolver for MockResolver {
    async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        self.ips
            .lock()
            .get(host)
            .cloned()
            .ok_or_else(|| ResolveError::Lookup {
                name: host.to_string(),
                source: "no such host in mock resolver".into(),
            })
    }

    async fn lookup_srv(&self, name: &str) -> Result<Vec<upstream_rs::resolver::SrvTarget>, ResolveError> {
        self.srvs.lock().get(name).cloned().ok_or_else(|| ResolveError::Lookup {
            name: name.to_string(),
            source: "no such srv name in mock resolver".into(),
        })
    }
}

fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(a, b, c, d))
}

fn fast_limits() -> Limits {
    Limits {
        revive_time: Duration::from_millis(10),
        revive_jitter: 0.0,
        error_time: Duration::from_secs(60),
        dns_timeout: Duration::from_secs(1),
        max_errors: 2,
        dns_retransmits: 1,
    }
}

#[tokio::test]
async fn round_robin_rotates_in_insertion_order() {
    let list: List = List::new();
    list.set_policy(Policy::RoundRobin);
    list.add_endpoint("a.internal:80", 1, ()).unwrap();
    list.add_endpoint("b.internal:80", 1, ()).unwrap();
    list.add_endpoint("c.internal:80", 1, ()).unwrap();

    let mut order = Vec::new();
    for _ in 0..6 {
        order.push(list.get(None).unwrap().name().to_string());
    }
    assert_eq!(order, vec!["a.internal", "b.internal", "c.internal", "a.internal", "b.internal", "c.internal"]);
}

#[tokio::test]
async fn master_slave_falls_back_then_recovers() {
    let list: List = List::new();
    list.set_policy(Policy::MasterSlave);
    list.set_limits(fast_limits());
    list.add_endpoint_full("master.internal:80", 1, 10, ()).unwrap();
    list.add_endpoint_full("slave.internal:80", 1, 0, ()).unwrap();

    let master = list.get(None).unwrap();
    assert_eq!(master.name(), "master.internal");

    master.fail();
    master.fail();
    assert!(!master.is_alive());

    let slave = list.get(None).unwrap();
    assert_eq!(slave.name(), "slave.internal");

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(list.get(None).unwrap().name(), "master.internal");
}

#[tokio::test]
async fn all_dead_pool_still_yields_a_candidate() {
    let list: List = List::new();
    list.set_limits(fast_limits());
    list.add_endpoint("a.internal:80", 1, ()).unwrap();
    list.add_endpoint("b.internal:80", 1, ()).unwrap();

    list.foreach(|ep| {
        ep.fail();
        ep.fail();
    });
    assert_eq!(list.alive_count(), 0);

    let ep = list.get(None);
    assert!(ep.is_some(), "all-dead recovery must still hand back a candidate");
    assert_eq!(list.alive_count(), 2, "all-dead recovery revives every endpoint at once");
}

#[tokio::test]
async fn hashed_policy_is_stable_across_calls() {
    let list: List = List::new();
    list.set_policy(Policy::Hashed);
    for name in ["a.internal:80", "b.internal:80", "c.internal:80", "d.internal:80"] {
        list.add_endpoint(name, 1, ()).unwrap();
    }
    let first = list.get(Some(b"customer-123")).unwrap().name().to_string();
    for _ in 0..10 {
        assert_eq!(list.get(Some(b"customer-123")).unwrap().name(), first);
    }
}

#[tokio::test]
async fn resolve_all_replaces_addresses_and_keeps_stale_on_failure() {
    let list: List = List::new();
    list.add_endpoint("db.internal:5432", 1, ()).unwrap();
    let resolver = MockResolver::new();
    resolver.set("db.internal", vec![v4(10, 0, 0, 1)]);

    list.resolve_all(&resolver).await;
    let ep = list.get(None).unwrap();
    assert_eq!(ep.cur_addr(), Some(SocketAddr::new(v4(10, 0, 0, 1), 5432)));

    resolver.set("db.internal", vec![v4(10, 0, 0, 2)]);
    list.resolve_all(&resolver).await;
    assert_eq!(ep.cur_addr(), Some(SocketAddr::new(v4(10, 0, 0, 2), 5432)));

    // Resolution failure (host removed from the mock) must not clear
    // the address set already in place.
    resolver.ips.lock().remove("db.internal");
    list.resolve_all(&resolver).await;
    assert_eq!(ep.cur_addr(), Some(SocketAddr::new(v4(10, 0, 0, 2), 5432)));
}

#[tokio::test]
async fn weighted_random_favors_heavier_endpoint_over_many_draws() {
    let list: List = List::new();
    list.add_endpoint("light.internal:80", 1, ()).unwrap();
    list.add_endpoint("heavy.internal:80", 9, ()).unwrap();

    let mut heavy = 0;
    for _ in 0..500 {
        if list.get(None).unwrap().name() == "heavy.internal" {
            heavy += 1;
        }
    }
    assert!(heavy > 350, "expected heavy endpoint to win ~90% of draws, got {heavy}/500");
}

#[tokio::test]
async fn parses_and_adds_a_batch_of_endpoints() {
    let list: List = List::new();
    list.add_endpoints(&["a.internal:80", "b.internal:80:5"], 1, ())
        .unwrap();
    assert_eq!(list.count(), 2);
}

#[tokio::test]
async fn srv_resolve_flag_expands_plain_hostnames_added_through_the_line_parser() {
    let list: List = List::new();
    list.set_flags(upstream_rs::Flags::SRV_RESOLVE);
    list.add_endpoint("_svc._tcp.example.com", 1, ()).unwrap();

    let resolver = MockResolver::new();
    resolver.set_srv(
        "_svc._tcp.example.com",
        vec![upstream_rs::resolver::SrvTarget {
            target: "node1.internal".to_string(),
            port: 5000,
            priority: 0,
            weight: 1,
        }],
    );
    resolver.set("node1.internal", vec![v4(10, 0, 0, 1)]);

    list.resolve_all(&resolver).await;
    assert_eq!(list.count(), 1);
    let ep = list.get(None).unwrap();
    assert_eq!(ep.name(), "node1.internal");
    assert_eq!(ep.cur_addr(), Some(SocketAddr::new(v4(10, 0, 0, 1), 5000)));
}

#[tokio::test]
async fn injected_address_survives_under_no_resolve_but_not_otherwise() {
    let no_resolve: List = List::new();
    no_resolve.set_flags(upstream_rs::Flags::NO_RESOLVE);
    no_resolve.add_endpoint("db.internal:5432", 1, ()).unwrap();
    let ep = no_resolve.get(None).unwrap();
    ep.add_addr(SocketAddr::new(v4(192, 168, 1, 1), 5432));
    assert_eq!(ep.addr_count(), 1);

    let resolver = MockResolver::new();
    resolver.set("db.internal", vec![v4(10, 0, 0, 1)]);
    no_resolve.resolve_all(&resolver).await;
    assert_eq!(ep.addr_count(), 1, "no-resolve lists must never call the resolver");

    let resolved: List = List::new();
    resolved.add_endpoint("db.internal:5432", 1, ()).unwrap();
    let ep = resolved.get(None).unwrap();
    ep.add_addr(SocketAddr::new(v4(192, 168, 1, 1), 5432));
    assert_eq!(ep.addr_count(), 1);

    resolved.resolve_all(&resolver).await;
    assert_eq!(
        ep.cur_addr(),
        Some(SocketAddr::new(v4(10, 0, 0, 1), 5432)),
        "re-resolution replaces injected addresses wholesale unless no-resolve is set"
    );
}
