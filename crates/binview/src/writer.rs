// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sequential writer with explicit offset bookkeeping.
//!
//! Reads infer layout from the data; writes do not. Values with a
//! runtime-determined size are appended in order and the caller tracks where
//! things went. A count that is only known after its elements have been
//! written is handled with [`DataWriter::reserve`] and [`DataWriter::patch`].

use crate::context::{ContextShared, DataContext};
use crate::error::{Error, Result};
use crate::types::PrimitiveKind;
use crate::value::Scalar;
use std::io;
use std::sync::Arc;

#[derive(Debug)]
pub struct DataWriter {
    shared: Arc<ContextShared>,
    position: u64,
}

impl DataWriter {
    /// Writer appending at `start`, using the context's byte order.
    pub fn new(context: &DataContext, start: u64) -> Self {
        Self {
            shared: context.shared().clone(),
            position: start,
        }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn seek(&mut self, position: u64) {
        self.position = position;
    }

    /// Encode `value` as `kind` at the current position and advance.
    ///
    /// Returns the offset the value was written at.
    pub fn write(&mut self, kind: PrimitiveKind, value: impl Into<Scalar>) -> Result<u64> {
        let offset = self.position;
        let next = advance(offset, kind.size())?;
        self.shared.write_scalar(kind, offset, &value.into())?;
        self.position = next;
        log::trace!("[writer] {} @{}", kind.name(), offset);
        Ok(offset)
    }

    /// Write `text` as a zero-padded fixed-length field of `length` bytes.
    pub fn write_text(&mut self, text: &str, length: usize) -> Result<u64> {
        self.write(PrimitiveKind::Text(length), text)
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<u64> {
        let offset = self.position;
        let next = advance(offset, data.len())?;
        self.shared.write_bytes(offset, data)?;
        self.position = next;
        Ok(offset)
    }

    /// Write a zero placeholder for `kind` and return its offset for [`patch`](Self::patch).
    pub fn reserve(&mut self, kind: PrimitiveKind) -> Result<u64> {
        let zeros = vec![0u8; kind.size()];
        self.write_bytes(&zeros)
    }

    /// Overwrite a previously reserved (or written) field without moving.
    pub fn patch(&mut self, offset: u64, kind: PrimitiveKind, value: impl Into<Scalar>) -> Result<()> {
        let end = advance(offset, kind.size())?;
        let len = self.shared.data_len()?;
        if end > len {
            return Err(Error::TruncatedData {
                offset,
                expected: kind.size() as u64,
                actual: len.saturating_sub(offset),
            });
        }
        self.shared.write_scalar(kind, offset, &value.into())?;
        log::trace!("[writer] patched {} @{}", kind.name(), offset);
        Ok(())
    }

    /// Advance with zero bytes until the position is a multiple of `alignment`.
    pub fn align(&mut self, alignment: u64) -> Result<()> {
        if alignment <= 1 {
            return Ok(());
        }
        let padding = (alignment - self.position % alignment) % alignment;
        if padding > 0 {
            self.write_bytes(&vec![0u8; padding as usize])?;
        }
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        self.shared.flush()
    }
}

/// Offset just past `len` bytes written at `offset`.
fn advance(offset: u64, len: usize) -> Result<u64> {
    offset.checked_add(len as u64).ok_or_else(|| {
        Error::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("write of {} bytes at {} exceeds the address space", len, offset),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Endianness;
    use crate::io::MemoryHandler;
    use crate::types::CompositeBuilder;

    #[test]
    fn test_reserve_and_patch_count() {
        let record = CompositeBuilder::new("Record")
            .text_field("name", 4)
            .field("count", PrimitiveKind::U16)
            .sequence_field("values", PrimitiveKind::F32, "count")
            .build_shared()
            .unwrap();
        let ctx = DataContext::new(record, MemoryHandler::default(), Endianness::Little).unwrap();

        let mut writer = DataWriter::new(&ctx, 0);
        writer.write_text("ab", 4).unwrap();
        let count_at = writer.reserve(PrimitiveKind::U16).unwrap();
        assert_eq!(count_at, 4);
        let values = [1.5f32, -2.0, 8.25];
        for v in values {
            writer.write(PrimitiveKind::F32, v).unwrap();
        }
        writer.patch(count_at, PrimitiveKind::U16, values.len() as u16).unwrap();
        assert_eq!(writer.position(), 4 + 2 + 12);

        let root = ctx.root().unwrap();
        assert_eq!(root.get::<String>("name").unwrap(), "ab");
        let list = root.collection("values").unwrap();
        assert_eq!(list.element_count().unwrap(), 3);
        assert_eq!(list.read_values::<f32>(0, 3).unwrap(), values.to_vec());
    }

    #[test]
    fn test_patch_past_end_rejected() {
        let record = CompositeBuilder::new("R")
            .field("a", PrimitiveKind::U8)
            .build_shared()
            .unwrap();
        let ctx = DataContext::new(record, MemoryHandler::default(), Endianness::Big).unwrap();
        let mut writer = DataWriter::new(&ctx, 0);
        writer.write(PrimitiveKind::U8, 1u8).unwrap();
        assert!(writer.patch(0, PrimitiveKind::U32, 5u32).unwrap_err().is_truncated());
    }

    #[test]
    fn test_value_range_checked() {
        let record = CompositeBuilder::new("R")
            .field("a", PrimitiveKind::U8)
            .build_shared()
            .unwrap();
        let ctx = DataContext::new(record, MemoryHandler::default(), Endianness::Big).unwrap();
        let mut writer = DataWriter::new(&ctx, 0);
        assert!(matches!(
            writer.write(PrimitiveKind::U8, 300i32),
            Err(Error::TypeMismatch { .. })
        ));
        assert_eq!(writer.position(), 0);
        assert!(writer.write_text("too long", 4).is_err());
    }

    #[test]
    fn test_align_and_seek() {
        let record = CompositeBuilder::new("R")
            .field("a", PrimitiveKind::U8)
            .build_shared()
            .unwrap();
        let ctx = DataContext::new(record, MemoryHandler::default(), Endianness::Big).unwrap();
        let mut writer = DataWriter::new(&ctx, 0);
        writer.write(PrimitiveKind::U8, 1u8).unwrap();
        writer.align(4).unwrap();
        assert_eq!(writer.position(), 4);
        writer.write(PrimitiveKind::U32, 7u32).unwrap();
        writer.seek(2);
        writer.write_bytes(&[0xAB]).unwrap();
        assert_eq!(ctx.data_len().unwrap(), 8);
    }

    #[test]
    fn test_offsets_near_address_space_end() {
        let record = CompositeBuilder::new("R")
            .field("a", PrimitiveKind::U8)
            .build_shared()
            .unwrap();
        let ctx = DataContext::new(record, MemoryHandler::default(), Endianness::Big).unwrap();
        let mut writer = DataWriter::new(&ctx, 0);

        match writer.patch(u64::MAX - 1, PrimitiveKind::U32, 1u32).unwrap_err() {
            Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::InvalidInput),
            other => panic!("unexpected error: {other}"),
        }

        writer.seek(u64::MAX - 1);
        match writer.write(PrimitiveKind::U32, 1u32).unwrap_err() {
            Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::InvalidInput),
            other => panic!("unexpected error: {other}"),
        }
        assert!(writer.write_bytes(&[0; 4]).is_err());
        assert_eq!(writer.position(), u64::MAX - 1);
        assert_eq!(ctx.data_len().unwrap(), 0);
    }
}
