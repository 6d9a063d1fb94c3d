//! Benchmarks for descriptor expansion and timeline assembly.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput};
use gradsonic::render::{assemble, expand_into};
use gradsonic::{Channel, TimeRange};

use super::{pattern, timeline};
use crate::BLOCK_COUNTS;

pub fn bench_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/expand");
    let blocks = pattern();

    for (name, block, channel) in [
        ("trapezoid", &blocks[0], Channel::Z),
        ("arbitrary", &blocks[2], Channel::X),
    ] {
        let Some(desc) = block.channel(channel) else {
            continue;
        };
        let mut times = Vec::with_capacity(512);
        let mut amps = Vec::with_capacity(512);
        group.bench_function(name, |b| {
            b.iter(|| {
                times.clear();
                amps.clear();
                expand_into(black_box(desc), black_box(1.0), 1e-3, &mut times, &mut amps)
            })
        });
    }

    group.finish();
}

pub fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/assemble");

    for &count in BLOCK_COUNTS {
        let timeline = timeline(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("all", count), &count, |b, _| {
            b.iter(|| assemble(black_box(&timeline), &Channel::ALL, TimeRange::all(), 1e-3))
        });

        // Second half only: the walk still visits every block
        let half = timeline.total_duration() / 2.0;
        let window = TimeRange::new(half, f64::INFINITY);
        group.bench_with_input(BenchmarkId::new("window", count), &count, |b, _| {
            b.iter(|| assemble(black_box(&timeline), &Channel::ALL, window, 1e-3))
        });
    }

    group.finish();
}
