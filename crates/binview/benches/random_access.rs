// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Random Access Benchmark
//!
//! Measures element access over fixed and variable layouts:
//! - Fixed grid: random vs sequential element reads (pure offset arithmetic)
//! - Variable stream: first-time resolution cost vs memoized access
//! - Cached handler: block cache over a slow-ish memory source

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]

use binview::{
    CachedHandler, CompositeBuilder, DataContext, Endianness, MemoryHandler, PrimitiveKind,
    TypeDescriptor,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

fn sample_grid(count: usize) -> (Arc<TypeDescriptor>, Vec<u8>) {
    let sample = CompositeBuilder::new("Sample")
        .field("id", PrimitiveKind::U32)
        .field("value", PrimitiveKind::F64)
        .build_shared()
        .expect("Sample type");
    let grid = Arc::new(TypeDescriptor::array(sample, count).expect("grid type"));
    let mut data = Vec::with_capacity(count * 12);
    for i in 0..count {
        data.extend_from_slice(&(i as u32).to_be_bytes());
        data.extend_from_slice(&(i as f64).to_be_bytes());
    }
    (grid, data)
}

fn blob_stream(count: usize) -> (Arc<TypeDescriptor>, Vec<u8>) {
    let blob = CompositeBuilder::new("Blob")
        .field("n", PrimitiveKind::U16)
        .sequence_field("payload", PrimitiveKind::U8, "n")
        .build_shared()
        .expect("Blob type");
    let stream = Arc::new(TypeDescriptor::remaining(blob).expect("stream type"));
    let mut rng = fastrand::Rng::with_seed(7);
    let mut data = Vec::new();
    for _ in 0..count {
        let len = rng.usize(0..64);
        data.extend_from_slice(&(len as u16).to_be_bytes());
        data.extend((0..len).map(|_| rng.u8(..)));
    }
    (stream, data)
}

/// Benchmark: fixed-layout element access in random and sequential order
fn bench_fixed_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixed_access");
    for &count in &[1_000usize, 100_000] {
        let (grid, data) = sample_grid(count);
        let ctx = DataContext::new(grid, MemoryHandler::new(data), Endianness::Big)
            .expect("context");
        let root = ctx.root().expect("root").clone();

        let mut rng = fastrand::Rng::with_seed(42);
        let order: Vec<i64> = (0..1_000).map(|_| rng.usize(..count) as i64).collect();

        group.bench_with_input(BenchmarkId::new("random", count), &order, |b, order| {
            b.iter(|| {
                for &i in order {
                    let sample = root.get_element(i).expect("element").into_instance().expect("composite");
                    black_box(sample.get::<f64>("value").expect("value"));
                }
            });
        });
        group.bench_with_input(BenchmarkId::new("sequential", count), &count, |b, &count| {
            b.iter(|| {
                for i in 0..count.min(1_000) {
                    let sample = root
                        .get_element(i as i64)
                        .expect("element")
                        .into_instance()
                        .expect("composite");
                    black_box(sample.get::<f64>("value").expect("value"));
                }
            });
        });
    }
    group.finish();
}

/// Benchmark: resolving a variable stream from scratch vs memoized lookups
fn bench_variable_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("variable_resolution");
    for &count in &[100usize, 1_000] {
        let (stream, data) = blob_stream(count);

        group.bench_with_input(BenchmarkId::new("cold", count), &count, |b, &count| {
            b.iter(|| {
                let ctx = DataContext::new(stream.clone(), MemoryHandler::new(data.clone()), Endianness::Big)
                    .expect("context");
                let root = ctx.root().expect("root");
                black_box(root.element_offset(count as i64 - 1).expect("offset"));
            });
        });

        let ctx = DataContext::new(stream.clone(), MemoryHandler::new(data.clone()), Endianness::Big)
            .expect("context");
        let root = ctx.root().expect("root").clone();
        root.resolve().expect("resolve");
        group.bench_with_input(BenchmarkId::new("memoized", count), &count, |b, &count| {
            b.iter(|| {
                for i in (0..count).step_by(7) {
                    black_box(root.element_offset(i as i64).expect("offset"));
                }
            });
        });
    }
    group.finish();
}

/// Benchmark: repeated scalar reads through the block cache
fn bench_cached_reads(c: &mut Criterion) {
    let (grid, data) = sample_grid(10_000);
    let ctx = DataContext::new(
        grid,
        CachedHandler::new(MemoryHandler::new(data)),
        Endianness::Big,
    )
    .expect("context");
    let root = ctx.root().expect("root").clone();

    c.bench_function("cached_handler_reads", |b| {
        b.iter(|| {
            for i in 0..256 {
                let sample = root.get_element(i).expect("element").into_instance().expect("composite");
                black_box(sample.get::<u32>("id").expect("id"));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_fixed_access,
    bench_variable_resolution,
    bench_cached_reads
);
criterion_main!(benches);
