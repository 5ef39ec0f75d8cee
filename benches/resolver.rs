//! Benchmarks for the re-resolution sweep over a list of endpoints.

use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, Criterion};
use std::net::{IpAddr, Ipv4Addr};
use upstream_rs::resolver::SrvTarget;
use upstream_rs::{List, ResolveError, Resolver};

struct FixedResolver {
    addr: IpAddr,
}

#[async_trait]
impl Resolver for FixedResolver {
    async fn lookup_ip(&self, _host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        Ok(vec![self.addr])
    }

    async fn lookup_srv(&self, _name: &str) -> Result<Vec<SrvTarget>, ResolveError> {
        Ok(Vec::new())
    }
}

fn bench_resolve_all(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let list: List = List::new();
    for i in 0..64 {
        list.add_endpoint(&format!("host-{i}.internal:80"), 1, ()).unwrap();
    }
    let resolver = FixedResolver {
        addr: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
    };

    c.bench_function("resolve_all_64_hosts", |b| {
        b.iter(|| runtime.block_on(list.resolve_all(&resolver)));
    });
}

criterion_group!(benches, bench_resolve_all);
criterion_main!(benches);
