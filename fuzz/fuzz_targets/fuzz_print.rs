// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use binview::{print_instance, CompositeBuilder, DataContext, Endianness, MemoryHandler, PrimitiveKind, PrintConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Fuzz the printer over a record with a text field and a counted list
    let Ok(record) = CompositeBuilder::new("Record")
        .text_field("name", 8)
        .field("count", PrimitiveKind::U16)
        .sequence_field("values", PrimitiveKind::F32, "count")
        .build_shared()
    else {
        return;
    };
    let Ok(ctx) = DataContext::new(record, MemoryHandler::new(data.to_vec()), Endianness::Little) else {
        return;
    };
    if let Ok(root) = ctx.root() {
        let config = PrintConfig::builder().max_elements(16).build();
        let _ = print_instance(root, &config);
    }
});
