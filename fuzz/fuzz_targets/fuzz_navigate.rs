// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use binview::{CompositeBuilder, CountRule, DataContext, Endianness, MemoryHandler, PrimitiveKind, TypeDescriptor};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    let Ok(item) = CompositeBuilder::new("Item")
        .field("len", PrimitiveKind::U8)
        .sequence_field("bytes", PrimitiveKind::U8, "len")
        .field("tag", PrimitiveKind::I16)
        .build_shared()
    else {
        return;
    };
    let Ok(frame) = CompositeBuilder::new("Frame")
        .field("n", PrimitiveKind::I32)
        .sequence_of("items", item, CountRule::field("n"))
        .field("crc", PrimitiveKind::U32)
        .build_shared()
    else {
        return;
    };
    let Ok(stream) = TypeDescriptor::remaining(frame) else {
        return;
    };

    // Any input must yield values or errors, never a panic or a hang.
    let Ok(ctx) = DataContext::new(Arc::new(stream), MemoryHandler::new(data.to_vec()), Endianness::Big) else {
        return;
    };
    let Ok(root) = ctx.root() else {
        return;
    };
    let _ = root.element_count();
    for i in 0..4 {
        let Ok(field) = root.get_element(i) else {
            break;
        };
        let Some(frame) = field.as_instance() else {
            break;
        };
        let _ = frame.get::<u32>("crc");
        if let Ok(items) = frame.collection("items") {
            let _ = items.get_element(-1);
            let _ = items.get_element(0);
            let _ = items.size();
        }
    }
    let _ = root.resolve();

    // 64-bit counts over 8-byte elements reach the edge of the address space.
    for kind in [PrimitiveKind::U64, PrimitiveKind::I64] {
        let Ok(wide) = CompositeBuilder::new("Wide")
            .field("n", kind)
            .sequence_field("values", PrimitiveKind::F64, "n")
            .field("tail", PrimitiveKind::U8)
            .build_shared()
        else {
            return;
        };
        let Ok(ctx) = DataContext::new(wide, MemoryHandler::new(data.to_vec()), byte_order(data)) else {
            return;
        };
        let Ok(root) = ctx.root() else {
            return;
        };
        let _ = root.get::<u8>("tail");
        if let Ok(values) = root.collection("values") {
            if let Ok(n) = values.element_count() {
                let last = i64::try_from(n).unwrap_or(i64::MAX).saturating_sub(1);
                let _ = values.element::<f64>(last);
                let _ = values.read_values::<f64>(0, n);
            }
        }
        let _ = root.size();
    }
});

fn byte_order(data: &[u8]) -> Endianness {
    if data.last().is_some_and(|b| b & 1 == 1) {
        Endianness::Little
    } else {
        Endianness::Big
    }
}
