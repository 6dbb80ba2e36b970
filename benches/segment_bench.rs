// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

// Segment benchmarks, against Vec as a baseline where one makes sense.
//
// - append: push to the end
// - head_insert: insert at index 0
// - random_get: positional reads
// - sorted_insert: random adds into a sorted set

use std::collections::BTreeSet;

use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput,
};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use strata::Composite;
use strata::Segment;
use strata::SortedSegment;

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

fn random_values(count: usize, seed: u64) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    return (0..count).map(|_| rng.gen_range(0..count as u64 * 4)).collect();
}

// =============================================================================
// Positional Edits
// =============================================================================

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");

    for size in SIZES {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("Flat", size), &size, |b, &size| {
            b.iter(|| {
                let mut seq = Composite::flat();
                for i in 0..size as u64 {
                    seq.push(i).unwrap();
                }
                black_box(seq.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("Nested", size), &size, |b, &size| {
            b.iter(|| {
                let mut seq = Composite::nested();
                for i in 0..size as u64 {
                    seq.push(i).unwrap();
                }
                black_box(seq.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |b, &size| {
            b.iter(|| {
                let mut seq = Vec::new();
                for i in 0..size as u64 {
                    seq.push(i);
                }
                black_box(seq.len())
            });
        });
    }

    group.finish();
}

fn bench_head_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("head_insert");
    group.sample_size(20);

    for size in SIZES {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("Flat", size), &size, |b, &size| {
            b.iter(|| {
                let mut seq = Composite::flat();
                for i in 0..size as u64 {
                    seq.insert(0, i).unwrap();
                }
                black_box(seq.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("Nested", size), &size, |b, &size| {
            b.iter(|| {
                let mut seq = Composite::nested();
                for i in 0..size as u64 {
                    seq.insert(0, i).unwrap();
                }
                black_box(seq.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |b, &size| {
            b.iter(|| {
                let mut seq = Vec::new();
                for i in 0..size as u64 {
                    seq.insert(0, i);
                }
                black_box(seq.len())
            });
        });
    }

    group.finish();
}

// =============================================================================
// Reads
// =============================================================================

fn bench_random_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_get");

    for size in SIZES {
        let seq: Composite<u64> = (0..size as u64).collect();
        let nested = Composite::from_vec(strata::NestedPolicy::default().shared(), (0..size as u64).collect());
        let indexes: Vec<usize> = random_values(1_000, 1)
            .into_iter()
            .map(|value| value as usize % size)
            .collect();
        group.throughput(Throughput::Elements(indexes.len() as u64));

        group.bench_with_input(BenchmarkId::new("Flat", size), &indexes, |b, indexes| {
            b.iter(|| {
                let mut sum = 0u64;
                for &index in indexes {
                    sum = sum.wrapping_add(*seq.get(index).unwrap());
                }
                black_box(sum)
            });
        });

        group.bench_with_input(BenchmarkId::new("Nested", size), &indexes, |b, indexes| {
            b.iter(|| {
                let mut sum = 0u64;
                for &index in indexes {
                    sum = sum.wrapping_add(*nested.get(index).unwrap());
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

// =============================================================================
// Sorted
// =============================================================================

fn bench_sorted_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("sorted_insert");

    for size in SIZES {
        let values = random_values(size, 2);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("Sorted", size), &values, |b, values| {
            b.iter(|| {
                let mut set = SortedSegment::ascending();
                for &value in values {
                    set.add(value).unwrap();
                }
                black_box(set.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), &values, |b, values| {
            b.iter(|| {
                let mut set = BTreeSet::new();
                for &value in values {
                    set.insert(value);
                }
                black_box(set.len())
            });
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(
    benches,
    bench_append,
    bench_head_insert,
    bench_random_get,
    bench_sorted_insert,
);

criterion_main!(benches);
