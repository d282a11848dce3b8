// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)] // Test assertions with constants
#![allow(clippy::cast_possible_truncation)] // Test parameters
#![allow(clippy::cast_possible_wrap)] // Test conversions

//! Randomized access order must never change what is read.

use binview::{
    CompositeBuilder, DataContext, Endianness, MemoryHandler, PrimitiveKind, TypeDescriptor,
};
use std::sync::Arc;

const SEED: u64 = 0x5EED_B1A5;

fn pixel_grid(rows: usize, cols: usize) -> (Arc<TypeDescriptor>, Vec<u8>) {
    let pixel = CompositeBuilder::new("Pixel")
        .field("row", PrimitiveKind::U16)
        .field("col", PrimitiveKind::U16)
        .field("value", PrimitiveKind::F32)
        .build_shared()
        .unwrap();
    let row = Arc::new(TypeDescriptor::array(pixel, cols).unwrap());
    let grid = Arc::new(TypeDescriptor::array(row, rows).unwrap());

    let mut data = Vec::with_capacity(rows * cols * 8);
    for r in 0..rows {
        for c in 0..cols {
            data.extend_from_slice(&(r as u16).to_le_bytes());
            data.extend_from_slice(&(c as u16).to_le_bytes());
            data.extend_from_slice(&((r * cols + c) as f32).to_le_bytes());
        }
    }
    (grid, data)
}

#[test]
fn test_random_order_fixed_grid() {
    let (rows, cols) = (64, 48);
    let (grid, data) = pixel_grid(rows, cols);
    let ctx = DataContext::new(grid, MemoryHandler::new(data), Endianness::Little).unwrap();
    let root = ctx.root().unwrap();
    assert!(root.is_fixed_layout());
    assert_eq!(root.size().unwrap(), (rows * cols * 8) as u64);

    let mut rng = fastrand::Rng::with_seed(SEED);
    for _ in 0..2000 {
        let r = rng.usize(..rows);
        let c = rng.usize(..cols);
        let row = root.get_element(r as i64).unwrap().into_instance().unwrap();
        let pixel = row.get_element(c as i64).unwrap().into_instance().unwrap();
        assert_eq!(pixel.get::<u16>("row").unwrap() as usize, r);
        assert_eq!(pixel.get::<u16>("col").unwrap() as usize, c);
        assert_eq!(pixel.get::<f32>("value").unwrap(), (r * cols + c) as f32);
    }
}

/// Blob { n: u16, payload: u8[n] } repeated, lengths chosen at random.
fn blob_stream(rng: &mut fastrand::Rng, count: usize) -> (Arc<TypeDescriptor>, Vec<u8>, Vec<Vec<u8>>) {
    let blob = CompositeBuilder::new("Blob")
        .field("n", PrimitiveKind::U16)
        .sequence_field("payload", PrimitiveKind::U8, "n")
        .build_shared()
        .unwrap();
    let stream = Arc::new(TypeDescriptor::remaining(blob).unwrap());

    let mut data = Vec::new();
    let mut payloads = Vec::with_capacity(count);
    for _ in 0..count {
        let len = rng.usize(0..40);
        let payload: Vec<u8> = (0..len).map(|_| rng.u8(..)).collect();
        data.extend_from_slice(&(len as u16).to_be_bytes());
        data.extend_from_slice(&payload);
        payloads.push(payload);
    }
    (stream, data, payloads)
}

#[test]
fn test_random_order_variable_stream() {
    let mut rng = fastrand::Rng::with_seed(SEED);
    let (stream, data, payloads) = blob_stream(&mut rng, 300);
    let ctx = DataContext::new(stream, MemoryHandler::new(data), Endianness::Big).unwrap();
    let root = ctx.root().unwrap();

    for _ in 0..1000 {
        let index = rng.usize(..payloads.len());
        let blob = root.get_element(index as i64).unwrap().into_instance().unwrap();
        let payload = blob.collection("payload").unwrap();
        let expected = &payloads[index];
        assert_eq!(payload.element_count().unwrap(), expected.len());
        if !expected.is_empty() {
            let k = rng.usize(..expected.len());
            assert_eq!(payload.element::<u8>(k as i64).unwrap(), expected[k]);
        }
    }
    assert_eq!(root.element_count().unwrap(), payloads.len());
    assert!(root.is_resolved());
    assert!(root.get_element(payloads.len() as i64).unwrap_err().is_out_of_range());
}

#[test]
fn test_random_order_matches_sequential() {
    let mut rng = fastrand::Rng::with_seed(SEED ^ 1);
    let (stream, data, _) = blob_stream(&mut rng, 120);

    let sequential = DataContext::new(stream.clone(), MemoryHandler::new(data.clone()), Endianness::Big)
        .unwrap();
    let seq_root = sequential.root().unwrap();
    let offsets: Vec<u64> = (0..120)
        .map(|i| seq_root.element_offset(i).unwrap())
        .collect();

    let shuffled = DataContext::new(stream, MemoryHandler::new(data), Endianness::Big).unwrap();
    let shuf_root = shuffled.root().unwrap();
    let mut order: Vec<usize> = (0..120).collect();
    rng.shuffle(&mut order);
    for i in order {
        assert_eq!(shuf_root.element_offset(i as i64).unwrap(), offsets[i]);
    }
}
