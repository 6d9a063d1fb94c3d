//! Benchmarks for duration accounting.
//!
//! `rescan` attaches a fresh cache every iteration; the other cases measure
//! one update after a single edit, which is the intended steady state.

use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion};
use gradsonic::{Block, DurationCache, Timeline};

use super::timeline;
use crate::BLOCK_COUNTS;

pub fn bench_duration(c: &mut Criterion) {
    let mut group = c.benchmark_group("duration");

    for &count in BLOCK_COUNTS {
        let base = timeline(count);

        group.bench_with_input(BenchmarkId::new("rescan", count), &count, |b, _| {
            b.iter(|| {
                let mut cache = DurationCache::new();
                cache.update(black_box(&base), true)
            })
        });

        for (name, append_only) in [("append", true), ("general", false)] {
            group.bench_with_input(BenchmarkId::new(name, count), &count, |b, _| {
                b.iter_batched(
                    || {
                        let mut timeline = base.clone();
                        let mut cache = DurationCache::new();
                        cache.update(&timeline, append_only);
                        timeline.push(Block::new(1e-3));
                        (timeline, cache)
                    },
                    |(timeline, mut cache)| {
                        let total = cache.update(black_box(&timeline), append_only);
                        debug_assert_eq!(timeline.len(), count + 1);
                        total
                    },
                    BatchSize::SmallInput,
                )
            });
        }
    }

    group.finish();
}
