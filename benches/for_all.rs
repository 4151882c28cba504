//! Parallel-for benchmark suite for cosync.
//!
//! Benchmarks:
//! - Dispatch overhead on tiny and empty sequences
//! - Throughput of `for_all` across worker counts
//! - In-place mutation through `for_each_mut`
//!
//! Run:
//!   cargo bench --bench for_all

#![allow(missing_docs)]
#![allow(clippy::semicolon_if_nothing_returned)]

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};

use cosync::combinator::Parallel;

// =============================================================================
// HELPERS
// =============================================================================

fn workload(len: usize) -> Vec<u64> {
    (0..len as u64).map(|i| i.wrapping_mul(0x9E37_79B9_7F4A_7C15)).collect()
}

// =============================================================================
// DISPATCH OVERHEAD
// =============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("for_all/dispatch");

    let empty: Vec<u64> = Vec::new();
    group.bench_function("empty", |b| {
        let parallel = Parallel::new(8);
        b.iter(|| {
            parallel.for_all(black_box(&empty), |i| {
                black_box(i);
            })
        })
    });

    for &workers in &[1usize, 2, 4, 8] {
        let data = workload(workers);
        group.bench_with_input(
            BenchmarkId::new("one_per_worker", workers),
            &workers,
            |b, &workers| {
                let parallel = Parallel::new(workers);
                b.iter(|| {
                    parallel.for_all(&data, |i| {
                        black_box(data[i]);
                    })
                })
            },
        );
    }

    group.finish();
}

// =============================================================================
// THROUGHPUT
// =============================================================================

fn bench_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("for_all/sum");
    let len = 1 << 16;
    let data = workload(len);
    group.throughput(Throughput::Elements(len as u64));

    for &workers in &[1usize, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            let parallel = Parallel::new(workers);
            b.iter(|| {
                let total = AtomicU64::new(0);
                parallel.for_all(&data, |i| {
                    total.fetch_add(data[i] >> 32, Ordering::Relaxed);
                });
                black_box(total.into_inner())
            })
        });
    }

    group.finish();
}

fn bench_for_each_mut(c: &mut Criterion) {
    let mut group = c.benchmark_group("for_all/for_each_mut");
    let len = 1 << 16;
    group.throughput(Throughput::Elements(len as u64));

    for &workers in &[1usize, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            let parallel = Parallel::new(workers);
            b.iter_batched(
                || workload(len),
                |mut data| {
                    parallel.for_each_mut(&mut data, |i, x| *x = x.rotate_left((i % 64) as u32));
                    data
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dispatch, bench_sum, bench_for_each_mut);
criterion_main!(benches);
