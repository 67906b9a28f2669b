//! Criterion micro-benchmarks for the probing index and key map.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use strata_bench::index_keys;
use strata_index::{KeyMap, ProbingIndex};

/// Benchmark: insert, look up and remove 256 keys in a 4096-slot index.
fn bench_index_roundtrip_256(c: &mut Criterion) {
    let keys = index_keys(0, 256);
    c.bench_function("index_roundtrip_256", |b| {
        b.iter(|| {
            let mut index = ProbingIndex::with_capacity(4096).unwrap();
            for &key in &keys {
                index.insert(key).unwrap();
            }
            for &key in &keys {
                black_box(index.lookup(key));
            }
            for &key in &keys {
                index.remove(key);
            }
        });
    });
}

/// Benchmark: lookups at half load, where probe runs are longest.
fn bench_index_lookup_half_load(c: &mut Criterion) {
    let keys = index_keys(1, 2048);
    let mut index = ProbingIndex::with_capacity(4096).unwrap();
    for &key in &keys {
        index.insert(key).unwrap();
    }
    let misses = index_keys(2, 2048);
    c.bench_function("index_lookup_half_load", |b| {
        b.iter(|| {
            for (&hit, &miss) in keys.iter().zip(&misses) {
                black_box(index.lookup(hit));
                black_box(index.lookup(miss));
            }
        });
    });
}

/// Benchmark: map insert + get with `u64` values.
fn bench_map_insert_get(c: &mut Criterion) {
    let keys = index_keys(3, 1024);
    c.bench_function("map_insert_get_1k", |b| {
        b.iter(|| {
            let mut map = KeyMap::with_capacity(2048).unwrap();
            for (n, &key) in keys.iter().enumerate() {
                map.insert(key, n as u64).unwrap();
            }
            for &key in &keys {
                black_box(map.get(key));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_index_roundtrip_256,
    bench_index_lookup_half_load,
    bench_map_insert_get
);
criterion_main!(benches);
