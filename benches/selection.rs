//! Benchmarks for endpoint selection under each policy.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use upstream_rs::{List, Policy};

fn build_list(n: usize, policy: Policy) -> List {
    let list: List = List::new();
    list.set_policy(policy);
    for i in 0..n {
        list.add_endpoint(&format!("host-{i}.internal:80"), 1, ()).unwrap();
    }
    list
}

fn bench_policies(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");
    for &n in &[4usize, 16, 64, 256] {
        for policy in [
            Policy::Random,
            Policy::RoundRobin,
            Policy::Hashed,
            Policy::Sequential,
        ] {
            let list = build_list(n, policy);
            group.bench_with_input(BenchmarkId::new(format!("{policy:?}"), n), &n, |b, _| {
                b.iter(|| list.get(Some(b"benchmark-key")));
            });
        }
    }
    group.finish();
}

fn bench_all_dead_recovery(c: &mut Criterion) {
    let list = build_list(32, Policy::Random);
    list.foreach(|ep| {
        ep.fail();
        ep.fail();
    });
    c.bench_function("get_with_all_dead", |b| {
        b.iter(|| list.get(None));
    });
}

criterion_group!(benches, bench_policies, bench_all_dead_recovery);
criterion_main!(benches);
