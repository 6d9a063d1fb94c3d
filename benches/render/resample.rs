//! Benchmarks for uniform-grid resampling.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput};
use gradsonic::render::{assemble, GridPolicy, Resampler};
use gradsonic::{Channel, TimeRange, DEFAULT_RATE};

use super::timeline;
use crate::BLOCK_COUNTS;

pub fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/resample");
    group.sample_size(20);

    for &count in BLOCK_COUNTS {
        let breakpoints = assemble(&timeline(count), &Channel::ALL, TimeRange::all(), 1e-3);

        for (name, policy) in [
            ("global", GridPolicy::Global),
            ("per_segment", GridPolicy::PerSegment),
        ] {
            let resampler = Resampler::new(DEFAULT_RATE, policy);
            let samples = resampler.run(&breakpoints).len();
            group.throughput(Throughput::Elements(samples as u64));
            group.bench_with_input(BenchmarkId::new(name, count), &count, |b, _| {
                b.iter(|| resampler.run(black_box(&breakpoints)))
            });
        }
    }

    group.finish();
}
