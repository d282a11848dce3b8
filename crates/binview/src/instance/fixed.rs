// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-layout instances: every offset is plain arithmetic on the type.

use super::{cached_child, factory, field_at, read_packed, span_end, Base, Field, Instance};
use crate::context::ContextShared;
use crate::error::{Error, Result};
use crate::types::TypeDescriptor;
use crate::value::Scalar;
use std::sync::{Arc, OnceLock};

/// Composite whose members all have a known size.
#[derive(Debug)]
pub struct FixedComposite {
    pub(crate) base: Base,
    children: Box<[OnceLock<Instance>]>,
}

impl FixedComposite {
    pub(crate) fn new(shared: &Arc<ContextShared>, type_desc: &Arc<TypeDescriptor>, position: u64) -> Self {
        let members = type_desc.as_composite().map_or(0, |c| c.member_count());
        Self {
            base: Base::new(shared, type_desc, position),
            children: (0..members).map(|_| OnceLock::new()).collect(),
        }
    }

    pub(crate) fn size(&self) -> u64 {
        self.base.type_desc.size().unwrap_or(0)
    }

    pub(crate) fn member_offset(&self, index: usize) -> Result<u64> {
        let offset = self
            .base
            .composite()?
            .static_offset(index)
            .filter(|_| index < self.children.len())
            .ok_or_else(|| self.base.member_not_found(index))?;
        Ok(self.base.position + offset)
    }

    pub(crate) fn member(&self, index: usize) -> Result<Field> {
        let offset = self.member_offset(index)?;
        let member_type = self.base.composite()?.members()[index].type_desc();
        field_at(&self.base, member_type, offset, || {
            cached_child(&self.children[index], || {
                factory::create(&self.base.shared, member_type, offset, None)
            })
        })
    }
}

/// Collection with a known count of fixed-size elements.
///
/// Elements are not cached: creating one is pure arithmetic. The factory
/// only builds one when `position + count * element_size` fits a `u64`.
#[derive(Debug)]
pub struct FixedCollection {
    pub(crate) base: Base,
    element_type: Arc<TypeDescriptor>,
    count: usize,
    element_size: u64,
}

impl FixedCollection {
    pub(crate) fn new(
        shared: &Arc<ContextShared>,
        type_desc: &Arc<TypeDescriptor>,
        position: u64,
        count: usize,
        element_size: u64,
    ) -> Self {
        let element_type = type_desc
            .as_collection()
            .map(|c| c.element_type().clone())
            .unwrap_or_else(|| type_desc.clone());
        Self {
            base: Base::new(shared, type_desc, position),
            element_type,
            count,
            element_size,
        }
    }

    pub(crate) fn element_count(&self) -> usize {
        self.count
    }

    pub(crate) fn size(&self) -> u64 {
        self.element_size * self.count as u64
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.count {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index: index as i64,
                count: self.count,
            })
        }
    }

    pub(crate) fn element_offset(&self, index: usize) -> Result<u64> {
        self.check_index(index)?;
        span_end(&self.base.type_desc, self.base.position, self.element_size, index as u64)
    }

    pub(crate) fn element(&self, index: usize) -> Result<Field> {
        let offset = self.element_offset(index)?;
        field_at(&self.base, &self.element_type, offset, || {
            factory::create(&self.base.shared, &self.element_type, offset, None)
        })
    }

    pub(crate) fn read_scalars(&self, start: usize, len: usize) -> Result<Vec<Scalar>> {
        let kind = self
            .element_type
            .as_primitive()
            .ok_or_else(|| Error::mismatch("collection of primitives", self.base.type_desc.name()))?;
        let end = start.checked_add(len).filter(|&end| end <= self.count).ok_or(
            Error::IndexOutOfRange {
                index: start.saturating_add(len) as i64,
                count: self.count,
            },
        )?;
        if start == end {
            return Ok(Vec::new());
        }
        read_packed(&self.base.shared, kind, self.element_offset(start)?, len)
    }
}

#[cfg(test)]
mod tests {
    use crate::codec::Endianness;
    use crate::context::DataContext;
    use crate::error::Error;
    use crate::io::MemoryHandler;
    use crate::types::{CompositeBuilder, PrimitiveKind, TypeDescriptor};
    use crate::value::Scalar;
    use std::sync::Arc;

    fn grid_context() -> DataContext {
        let cell = CompositeBuilder::new("Cell")
            .field("id", PrimitiveKind::U16)
            .field("value", PrimitiveKind::F32)
            .build_shared()
            .unwrap();
        let grid = CompositeBuilder::new("Grid")
            .text_field("name", 4)
            .array_of("cells", cell, 3)
            .array_field("flags", PrimitiveKind::U8, 2)
            .build_shared()
            .unwrap();

        let mut data = b"abc\0".to_vec();
        for (id, value) in [(1u16, 0.5f32), (2, 1.5), (3, 2.5)] {
            data.extend_from_slice(&id.to_be_bytes());
            data.extend_from_slice(&value.to_be_bytes());
        }
        data.extend_from_slice(&[7, 9]);
        DataContext::new(grid, MemoryHandler::new(data), Endianness::Big).unwrap()
    }

    #[test]
    fn test_fixed_navigation() {
        let ctx = grid_context();
        let root = ctx.root().unwrap();
        assert!(root.is_fixed_layout());
        assert_eq!(root.size().unwrap(), 4 + 18 + 2);
        assert_eq!(root.get::<String>("name").unwrap(), "abc");

        let cells = root.collection("cells").unwrap();
        assert_eq!(cells.element_count().unwrap(), 3);
        assert_eq!(cells.element_offset(2).unwrap(), 4 + 12);

        let last = cells.get_element(2).unwrap().into_instance().unwrap();
        assert_eq!(last.position(), 16);
        assert_eq!(last.get::<u16>("id").unwrap(), 3);
        assert_eq!(last.get::<f32>("value").unwrap(), 2.5);

        let flags = root.collection("flags").unwrap();
        assert_eq!(flags.element::<u8>(1).unwrap(), 9);
    }

    #[test]
    fn test_member_children_cached() {
        let ctx = grid_context();
        let root = ctx.root().unwrap();
        let a = root.collection("cells").unwrap();
        let b = root.collection("cells").unwrap();
        assert!(a.same_instance(&b));
    }

    #[test]
    fn test_fixed_out_of_range() {
        let ctx = grid_context();
        let root = ctx.root().unwrap();
        assert!(matches!(root.get_member("nonexistent"), Err(Error::MemberNotFound(_))));
        assert!(matches!(root.get_member_at(3), Err(Error::MemberNotFound(_))));

        let cells = root.collection("cells").unwrap();
        assert!(matches!(
            cells.get_element(3),
            Err(Error::IndexOutOfRange { index: 3, count: 3 })
        ));
        assert!(cells.get_element(-1).unwrap_err().is_out_of_range());
        assert!(matches!(cells.get_member("id"), Err(Error::TypeMismatch { .. })));
        assert!(matches!(root.element_count(), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_read_scalars() {
        let data: Vec<u8> = (1..=8u16).flat_map(|v| v.to_le_bytes()).collect();
        let arr = Arc::new(
            TypeDescriptor::array(Arc::new(TypeDescriptor::primitive(PrimitiveKind::U16)), 8)
                .unwrap(),
        );
        let ctx = DataContext::new(arr, MemoryHandler::new(data), Endianness::Little).unwrap();
        let root = ctx.root().unwrap();
        let values = root.read_scalars(2, 3).unwrap();
        assert_eq!(values, vec![Scalar::U16(3), Scalar::U16(4), Scalar::U16(5)]);
        assert_eq!(root.read_values::<u16>(6, 2).unwrap(), vec![7, 8]);
        assert!(root.read_scalars(0, 0).unwrap().is_empty());
        assert!(root.read_scalars(7, 2).unwrap_err().is_out_of_range());
    }
}
