// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Variable-layout instances, resolved lazily and memoized.
//!
//! Offsets are computed front to back: the start of member (or element) `k`
//! is the start of `k - 1` plus its actual size, which may require reading a
//! count field or sizing a nested variable instance. The known prefix is kept
//! in a per-instance layout behind a mutex, so exactly one thread performs a
//! given resolution step and the others reuse its result. Once the whole
//! table is known it is published into a `OnceLock` and every further access
//! is plain arithmetic without locking.
//!
//! Lock order is always parent before child: a child never refers back to
//! its parent, the parent hands it a count when creating it.

use super::{factory, field_at, read_packed, span_end, Base, Field, Instance};
use crate::context::ContextShared;
use crate::error::{Error, Result};
use crate::types::{CompositeDescriptor, TypeDescriptor};
use crate::value::Scalar;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};

/// Resolution progress of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveState {
    /// Nothing beyond the statically known prefix has been computed.
    Unresolved,
    /// A resolution step is running; seen again only on a cyclic layout.
    Resolving,
    /// A prefix of the offset table is known and kept.
    Partial,
    /// Every offset is known; the table is immutable.
    Resolved,
    /// The last step failed; the prefix is kept and the next access retries.
    Failed,
}

// ----------------------------------------------------------------------
// Composite
// ----------------------------------------------------------------------

#[derive(Debug)]
struct CompositeLayout {
    state: ResolveState,
    /// Absolute start of member `k` for every `k < offsets.len()`;
    /// `offsets[member_count]` is the end of the composite.
    offsets: Vec<u64>,
    /// Element counts of sibling-counted members, once read.
    counts: Vec<Option<usize>>,
}

/// Composite with at least one member of unknown size.
#[derive(Debug)]
pub struct VariableComposite {
    pub(crate) base: Base,
    layout: Mutex<CompositeLayout>,
    table: OnceLock<Box<[u64]>>,
    children: Box<[OnceLock<Instance>]>,
}

impl VariableComposite {
    pub(crate) fn new(shared: &Arc<ContextShared>, type_desc: &Arc<TypeDescriptor>, position: u64) -> Self {
        let (members, offsets) = match type_desc.as_composite() {
            Some(c) => (
                c.member_count(),
                c.static_prefix()
                    .iter()
                    .map_while(|p| position.checked_add(*p))
                    .collect(),
            ),
            None => (0, vec![position]),
        };
        Self {
            base: Base::new(shared, type_desc, position),
            layout: Mutex::new(CompositeLayout {
                state: ResolveState::Unresolved,
                offsets,
                counts: vec![None; members],
            }),
            table: OnceLock::new(),
            children: (0..members).map(|_| OnceLock::new()).collect(),
        }
    }

    fn desc(&self) -> Result<&CompositeDescriptor> {
        self.base.composite()
    }

    pub(crate) fn state(&self) -> ResolveState {
        if self.table.get().is_some() {
            return ResolveState::Resolved;
        }
        self.layout.lock().state
    }

    pub(crate) fn member_offset(&self, index: usize) -> Result<u64> {
        if index >= self.children.len() {
            return Err(self.base.member_not_found(index));
        }
        if let Some(table) = self.table.get() {
            return Ok(table[index]);
        }
        let mut layout = self.layout.lock();
        self.resolve_through(&mut layout, index)
    }

    pub(crate) fn member(&self, index: usize) -> Result<Field> {
        let offset = self.member_offset(index)?;
        let member_type = self.desc()?.members()[index].type_desc();
        field_at(&self.base, member_type, offset, || self.child(index, offset))
    }

    pub(crate) fn resolve(&self) -> Result<()> {
        self.end().map(|_| ())
    }

    pub(crate) fn size(&self) -> Result<u64> {
        Ok(self.end()? - self.base.position)
    }

    fn end(&self) -> Result<u64> {
        let n = self.children.len();
        if let Some(table) = self.table.get() {
            return Ok(table[n]);
        }
        let mut layout = self.layout.lock();
        self.resolve_through(&mut layout, n)
    }

    fn child(&self, index: usize, offset: u64) -> Result<Instance> {
        if let Some(child) = self.children[index].get() {
            return Ok(child.clone());
        }
        let mut layout = self.layout.lock();
        self.child_locked(&mut layout, index, offset)
    }

    fn child_locked(&self, layout: &mut CompositeLayout, index: usize, offset: u64) -> Result<Instance> {
        if let Some(child) = self.children[index].get() {
            return Ok(child.clone());
        }
        let count = self.count_locked(layout, index)?;
        let member_type = self.desc()?.members()[index].type_desc();
        let child = factory::create(&self.base.shared, member_type, offset, count)?;
        Ok(self.children[index].get_or_init(|| child).clone())
    }

    /// Element count of member `index` when it is counted by a sibling field.
    fn count_locked(&self, layout: &mut CompositeLayout, index: usize) -> Result<Option<usize>> {
        let desc = self.desc()?;
        let member = &desc.members()[index];
        let Some(rule) = member.type_desc().as_collection().and_then(|c| c.count().rule()) else {
            return Ok(None);
        };
        if let Some(count) = layout.counts[index] {
            return Ok(Some(count));
        }

        let field_index = desc.member_index(rule.field_name()).ok_or_else(|| {
            Error::malformed(format!("count field '{}' does not exist", rule.field_name()))
        })?;
        let field_offset = match layout.offsets.get(field_index) {
            Some(&offset) => offset,
            // The count field sits behind a member whose size is being computed.
            None if layout.state == ResolveState::Resolving => {
                return Err(self.cyclic(member.name()));
            }
            None => self.resolve_through(layout, field_index)?,
        };
        let kind = desc.members()[field_index]
            .type_desc()
            .as_primitive()
            .ok_or_else(|| Error::malformed(format!("count field '{}' is not a primitive", rule.field_name())))?;

        let raw = self.base.shared.read_scalar(kind, field_offset)?;
        let count = raw
            .as_i64()
            .and_then(|value| rule.apply(value))
            .ok_or_else(|| {
                Error::CorruptData(format!(
                    "count field '{}' of '{}' holds {} which is not a valid element count for '{}'",
                    rule.field_name(),
                    self.base.type_desc.name(),
                    raw,
                    member.name()
                ))
            })?;
        log::trace!(
            "[resolve] '{}'.{} has {} elements",
            self.base.type_desc.name(),
            member.name(),
            count
        );
        layout.counts[index] = Some(count);
        Ok(Some(count))
    }

    fn cyclic(&self, member: &str) -> Error {
        Error::CyclicDependency {
            type_name: self.base.type_desc.name().to_string(),
            member: member.to_string(),
        }
    }

    /// Absolute start of member `index` (`member_count` for the end).
    fn resolve_through(&self, layout: &mut CompositeLayout, index: usize) -> Result<u64> {
        if let Some(&offset) = layout.offsets.get(index) {
            return Ok(offset);
        }
        if layout.state == ResolveState::Resolving {
            let name = self
                .desc()?
                .member(index)
                .map_or("<end>", |m| m.name())
                .to_string();
            return Err(self.cyclic(&name));
        }

        layout.state = ResolveState::Resolving;
        let result = self.extend_through(layout, index);
        match &result {
            Ok(_) if layout.offsets.len() == self.children.len() + 1 => {
                let _ = self.table.set(layout.offsets.clone().into_boxed_slice());
                layout.state = ResolveState::Resolved;
                log::debug!(
                    "[resolve] '{}' @{} resolved ({} bytes)",
                    self.base.type_desc.name(),
                    self.base.position,
                    layout.offsets[self.children.len()] - self.base.position
                );
            }
            Ok(_) => layout.state = ResolveState::Partial,
            Err(e) => {
                layout.state = ResolveState::Failed;
                log::debug!(
                    "[resolve] '{}' @{} failed after {} members: {}",
                    self.base.type_desc.name(),
                    self.base.position,
                    layout.offsets.len() - 1,
                    e
                );
            }
        }
        result
    }

    fn extend_through(&self, layout: &mut CompositeLayout, index: usize) -> Result<u64> {
        while layout.offsets.len() <= index {
            let k = layout.offsets.len() - 1;
            let start = layout.offsets[k];
            let size = self.member_size(layout, k, start)?;
            let next = start.checked_add(size).ok_or_else(|| {
                Error::CorruptData(format!(
                    "member #{} of '{}' overflows the address space",
                    k,
                    self.base.type_desc.name()
                ))
            })?;
            layout.offsets.push(next);
        }
        Ok(layout.offsets[index])
    }

    fn member_size(&self, layout: &mut CompositeLayout, index: usize, start: u64) -> Result<u64> {
        let member_type = self.desc()?.members()[index].type_desc();
        if let Some(size) = member_type.size() {
            return Ok(size);
        }
        self.child_locked(layout, index, start)?.size()
    }
}

// ----------------------------------------------------------------------
// Collection
// ----------------------------------------------------------------------

#[derive(Debug)]
struct CollectionLayout {
    state: ResolveState,
    /// `None` until known for collections spanning the remaining data.
    count: Option<usize>,
    /// End of the available data, read once.
    end: Option<u64>,
    /// Absolute start of element `e` for every `e < starts.len()`.
    starts: Vec<u64>,
}

/// Collection whose element count or element sizes are only known at read time.
#[derive(Debug)]
pub struct VariableCollection {
    pub(crate) base: Base,
    element_type: Arc<TypeDescriptor>,
    /// Set when every element has the same known size.
    element_size: Option<u64>,
    layout: Mutex<CollectionLayout>,
    count: OnceLock<usize>,
    table: OnceLock<Box<[u64]>>,
    elements: DashMap<usize, Instance>,
}

impl VariableCollection {
    pub(crate) fn new(
        shared: &Arc<ContextShared>,
        type_desc: &Arc<TypeDescriptor>,
        position: u64,
        count: Option<usize>,
    ) -> Self {
        let element_type = type_desc
            .as_collection()
            .map(|c| c.element_type().clone())
            .unwrap_or_else(|| type_desc.clone());
        let element_size = element_type.size();
        let collection = Self {
            base: Base::new(shared, type_desc, position),
            element_type,
            element_size,
            layout: Mutex::new(CollectionLayout {
                state: ResolveState::Unresolved,
                count,
                end: None,
                starts: vec![position],
            }),
            count: OnceLock::new(),
            table: OnceLock::new(),
            elements: DashMap::new(),
        };
        {
            let mut layout = collection.layout.lock();
            let state = collection.settle(&mut layout);
            layout.state = state;
        }
        collection
    }

    pub(crate) fn state(&self) -> ResolveState {
        if self.table.get().is_some() {
            return ResolveState::Resolved;
        }
        self.layout.lock().state
    }

    pub(crate) fn known_count(&self) -> Option<usize> {
        self.count.get().copied()
    }

    pub(crate) fn element_count(&self) -> Result<usize> {
        if let Some(&count) = self.count.get() {
            return Ok(count);
        }
        let mut layout = self.layout.lock();
        self.run(&mut layout, |this, layout| this.count_locked(layout))
    }

    pub(crate) fn element_offset(&self, index: usize) -> Result<u64> {
        if let Some(width) = self.element_size {
            let count = self.element_count()?;
            if index >= count {
                return Err(Error::IndexOutOfRange {
                    index: index as i64,
                    count,
                });
            }
            return span_end(&self.base.type_desc, self.base.position, width, index as u64);
        }
        if let Some(table) = self.table.get() {
            let count = table.len() - 1;
            if index >= count {
                return Err(Error::IndexOutOfRange {
                    index: index as i64,
                    count,
                });
            }
            return Ok(table[index]);
        }
        let mut layout = self.layout.lock();
        self.run(&mut layout, |this, layout| this.start_of(layout, index))
    }

    pub(crate) fn element(&self, index: usize) -> Result<Field> {
        let offset = self.element_offset(index)?;
        field_at(&self.base, &self.element_type, offset, || {
            self.element_at(index, offset)
        })
    }

    pub(crate) fn resolve(&self) -> Result<()> {
        self.end().map(|_| ())
    }

    pub(crate) fn size(&self) -> Result<u64> {
        Ok(self.end()? - self.base.position)
    }

    pub(crate) fn read_scalars(&self, start: usize, len: usize) -> Result<Vec<Scalar>> {
        let kind = self
            .element_type
            .as_primitive()
            .ok_or_else(|| Error::mismatch("collection of primitives", self.base.type_desc.name()))?;
        let count = self.element_count()?;
        let end = start.checked_add(len).filter(|&end| end <= count).ok_or(
            Error::IndexOutOfRange {
                index: start.saturating_add(len) as i64,
                count,
            },
        )?;
        if start == end {
            return Ok(Vec::new());
        }
        read_packed(&self.base.shared, kind, self.element_offset(start)?, len)
    }

    fn end(&self) -> Result<u64> {
        if let Some(width) = self.element_size {
            let count = self.element_count()? as u64;
            return span_end(&self.base.type_desc, self.base.position, width, count);
        }
        if let Some(table) = self.table.get() {
            return Ok(table[table.len() - 1]);
        }
        let mut layout = self.layout.lock();
        self.run(&mut layout, |this, layout| {
            let count = this.count_locked(layout)?;
            while layout.starts.len() <= count {
                this.extend(layout)?;
            }
            Ok(layout.starts[count])
        })
    }

    /// Run one resolution step and record the resulting state.
    fn run<T>(
        &self,
        layout: &mut CollectionLayout,
        step: impl FnOnce(&Self, &mut CollectionLayout) -> Result<T>,
    ) -> Result<T> {
        if layout.state == ResolveState::Resolved {
            return step(self, layout);
        }
        layout.state = ResolveState::Resolving;
        let result = step(self, layout);
        layout.state = match &result {
            Err(e) if !e.is_out_of_range() => {
                log::debug!(
                    "[resolve] '{}' @{} failed after {} elements: {}",
                    self.base.type_desc.name(),
                    self.base.position,
                    layout.starts.len() - 1,
                    e
                );
                ResolveState::Failed
            }
            _ => self.settle(layout),
        };
        result
    }

    /// Publish whatever became known and derive the state from it.
    fn settle(&self, layout: &mut CollectionLayout) -> ResolveState {
        let Some(count) = layout.count else {
            return if layout.starts.len() > 1 {
                ResolveState::Partial
            } else {
                ResolveState::Unresolved
            };
        };
        let _ = self.count.set(count);
        if self.element_size.is_some() {
            return ResolveState::Resolved;
        }
        if layout.starts.len() == count + 1 {
            if self.table.set(layout.starts.clone().into_boxed_slice()).is_ok() {
                log::debug!(
                    "[resolve] '{}' @{} resolved ({} elements)",
                    self.base.type_desc.name(),
                    self.base.position,
                    count
                );
            }
            ResolveState::Resolved
        } else if layout.starts.len() > 1 {
            ResolveState::Partial
        } else {
            ResolveState::Unresolved
        }
    }

    fn data_end(&self, layout: &mut CollectionLayout) -> Result<u64> {
        if let Some(end) = layout.end {
            return Ok(end);
        }
        let end = self.base.shared.data_len()?;
        if end < self.base.position {
            return Err(Error::TruncatedData {
                offset: end,
                expected: self.base.position - end,
                actual: 0,
            });
        }
        layout.end = Some(end);
        Ok(end)
    }

    fn count_locked(&self, layout: &mut CollectionLayout) -> Result<usize> {
        if let Some(count) = layout.count {
            return Ok(count);
        }
        if let Some(width) = self.element_size {
            let end = self.data_end(layout)?;
            let count = usize::try_from((end - self.base.position) / width.max(1)).map_err(|_| {
                Error::CorruptData(format!("'{}' has too many elements", self.base.type_desc.name()))
            })?;
            layout.count = Some(count);
            return Ok(count);
        }
        loop {
            if let Some(count) = layout.count {
                return Ok(count);
            }
            self.extend(layout)?;
        }
    }

    /// Start of element `index`, sizing earlier elements as needed.
    fn start_of(&self, layout: &mut CollectionLayout, index: usize) -> Result<u64> {
        loop {
            match layout.count {
                Some(count) if index >= count => {
                    return Err(Error::IndexOutOfRange {
                        index: index as i64,
                        count,
                    });
                }
                Some(_) if index < layout.starts.len() => return Ok(layout.starts[index]),
                // Without a count, element `index` exists once its end is known.
                None if index + 1 < layout.starts.len() => return Ok(layout.starts[index]),
                _ => self.extend(layout)?,
            }
        }
    }

    /// Size the last element whose start is known, or detect the end of the data.
    fn extend(&self, layout: &mut CollectionLayout) -> Result<()> {
        let e = layout.starts.len() - 1;
        let start = layout.starts[e];
        if layout.count.is_some() {
            let size = self.element_at(e, start)?.size()?;
            let next = start.checked_add(size).ok_or_else(|| {
                Error::CorruptData(format!(
                    "element #{} of '{}' overflows the address space",
                    e,
                    self.base.type_desc.name()
                ))
            })?;
            layout.starts.push(next);
            return Ok(());
        }

        let end = self.data_end(layout)?;
        if start == end {
            layout.count = Some(e);
            return Ok(());
        }
        let size = self.element_at(e, start)?.size()?;
        if size == 0 {
            return Err(Error::CorruptData(format!(
                "element #{} of '{}' is empty and the data does not end",
                e,
                self.base.type_desc.name()
            )));
        }
        let next = start.saturating_add(size);
        if next > end {
            return Err(Error::TruncatedData {
                offset: start,
                expected: size,
                actual: end - start,
            });
        }
        layout.starts.push(next);
        Ok(())
    }

    fn element_at(&self, index: usize, offset: u64) -> Result<Instance> {
        if let Some(element) = self.elements.get(&index) {
            return Ok(element.value().clone());
        }
        let element = factory::create(&self.base.shared, &self.element_type, offset, None)?;
        Ok(self.elements.entry(index).or_insert(element).value().clone())
    }
}
