// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Positioned views over binary data.
//!
//! An [`Instance`] is a typed window at an absolute byte position of a data
//! context. It comes in four shapes, chosen once by the factory:
//!
//! | shape                | offsets known            | child cache            |
//! |----------------------|--------------------------|------------------------|
//! | `FixedComposite`     | from the type            | one slot per member    |
//! | `VariableComposite`  | lazily, in member order  | one slot per member    |
//! | `FixedCollection`    | from the type and count  | none (cheap to create) |
//! | `VariableCollection` | lazily, element by element | concurrent map       |
//!
//! All four answer the same navigation calls. Variable shapes resolve only
//! as far as the requested member or element and publish an immutable offset
//! table once fully resolved; from then on they are served lock-free like
//! the fixed shapes.

pub(crate) mod factory;
mod fixed;
mod variable;

pub use fixed::{FixedCollection, FixedComposite};
pub use variable::{ResolveState, VariableCollection, VariableComposite};

use crate::context::ContextShared;
use crate::error::{Error, Result};
use crate::types::{CompositeDescriptor, PrimitiveKind, TypeDescriptor};
use crate::value::{FromScalar, Scalar};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Type, context and position shared by every instance shape.
pub(crate) struct Base {
    pub(crate) shared: Arc<ContextShared>,
    pub(crate) type_desc: Arc<TypeDescriptor>,
    pub(crate) position: u64,
}

impl Base {
    pub(crate) fn new(shared: &Arc<ContextShared>, type_desc: &Arc<TypeDescriptor>, position: u64) -> Self {
        Self {
            shared: shared.clone(),
            type_desc: type_desc.clone(),
            position,
        }
    }

    /// Composite descriptor of this instance's type.
    pub(crate) fn composite(&self) -> Result<&CompositeDescriptor> {
        self.type_desc
            .as_composite()
            .ok_or_else(|| Error::mismatch("composite", self.type_desc.name()))
    }

    pub(crate) fn member_not_found(&self, index: usize) -> Error {
        Error::MemberNotFound(format!("#{} in '{}'", index, self.type_desc.name()))
    }
}

impl fmt::Debug for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.type_desc.name(), self.position)
    }
}

/// Read a primitive at `offset` or produce the child instance through `child`.
pub(crate) fn field_at(
    base: &Base,
    type_desc: &Arc<TypeDescriptor>,
    offset: u64,
    child: impl FnOnce() -> Result<Instance>,
) -> Result<Field> {
    match type_desc.as_primitive() {
        Some(kind) => Ok(Field::Scalar(base.shared.read_scalar(kind, offset)?)),
        None => Ok(Field::Instance(child()?)),
    }
}

/// End of `count` items of `width` bytes starting at `position`.
///
/// Counts come from the data, so the product may not fit a `u64`.
pub(crate) fn span_end(type_desc: &TypeDescriptor, position: u64, width: u64, count: u64) -> Result<u64> {
    width
        .checked_mul(count)
        .and_then(|len| position.checked_add(len))
        .ok_or_else(|| {
            Error::CorruptData(format!(
                "'{}' at {} with {} x {} bytes overflows the address space",
                type_desc.name(),
                position,
                count,
                width
            ))
        })
}

/// Child from a once-slot, created by `create` on first use.
pub(crate) fn cached_child(
    slot: &OnceLock<Instance>,
    create: impl FnOnce() -> Result<Instance>,
) -> Result<Instance> {
    if let Some(child) = slot.get() {
        return Ok(child.clone());
    }
    let child = create()?;
    Ok(slot.get_or_init(|| child).clone())
}

/// Result of navigating to a member or element.
#[derive(Debug, Clone)]
pub enum Field {
    Scalar(Scalar),
    Instance(Instance),
}

impl Field {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Instance(_) => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Self::Instance(i) => Some(i),
            Self::Scalar(_) => None,
        }
    }

    pub fn into_scalar(self) -> Result<Scalar> {
        match self {
            Self::Scalar(s) => Ok(s),
            Self::Instance(i) => Err(Error::mismatch("primitive", i.type_name())),
        }
    }

    pub fn into_instance(self) -> Result<Instance> {
        match self {
            Self::Instance(i) => Ok(i),
            Self::Scalar(s) => Err(Error::mismatch("composite or collection", s.kind().name())),
        }
    }

    /// Convert a primitive field into a native value.
    pub fn value<T: FromScalar>(self) -> Result<T> {
        T::from_scalar(self.into_scalar()?)
    }
}

/// Composite or collection view at a byte position.
///
/// Cloning is cheap and yields a handle to the same underlying instance,
/// sharing its resolution state and child caches.
#[derive(Debug, Clone)]
pub enum Instance {
    FixedComposite(Arc<FixedComposite>),
    VariableComposite(Arc<VariableComposite>),
    FixedCollection(Arc<FixedCollection>),
    VariableCollection(Arc<VariableCollection>),
}

impl Instance {
    fn base(&self) -> &Base {
        match self {
            Self::FixedComposite(i) => &i.base,
            Self::VariableComposite(i) => &i.base,
            Self::FixedCollection(i) => &i.base,
            Self::VariableCollection(i) => &i.base,
        }
    }

    pub fn type_desc(&self) -> &Arc<TypeDescriptor> {
        &self.base().type_desc
    }

    pub fn type_name(&self) -> &str {
        self.base().type_desc.name()
    }

    /// Absolute byte position of the first byte.
    pub fn position(&self) -> u64 {
        self.base().position
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Self::FixedComposite(_) | Self::VariableComposite(_))
    }

    pub fn is_collection(&self) -> bool {
        !self.is_composite()
    }

    /// True for the shapes whose offsets are known from the type alone.
    pub fn is_fixed_layout(&self) -> bool {
        matches!(self, Self::FixedComposite(_) | Self::FixedCollection(_))
    }

    /// Whether two handles point at the same underlying instance.
    pub fn same_instance(&self, other: &Instance) -> bool {
        match (self, other) {
            (Self::FixedComposite(a), Self::FixedComposite(b)) => Arc::ptr_eq(a, b),
            (Self::VariableComposite(a), Self::VariableComposite(b)) => Arc::ptr_eq(a, b),
            (Self::FixedCollection(a), Self::FixedCollection(b)) => Arc::ptr_eq(a, b),
            (Self::VariableCollection(a), Self::VariableCollection(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Size in bytes. Resolves variable layouts completely.
    pub fn size(&self) -> Result<u64> {
        match self {
            Self::FixedComposite(i) => Ok(i.size()),
            Self::VariableComposite(i) => i.size(),
            Self::FixedCollection(i) => Ok(i.size()),
            Self::VariableCollection(i) => i.size(),
        }
    }

    pub fn resolve_state(&self) -> ResolveState {
        match self {
            Self::FixedComposite(_) | Self::FixedCollection(_) => ResolveState::Resolved,
            Self::VariableComposite(i) => i.state(),
            Self::VariableCollection(i) => i.state(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolve_state() == ResolveState::Resolved
    }

    /// Resolve every offset of this instance (not of its children).
    pub fn resolve(&self) -> Result<()> {
        match self {
            Self::FixedComposite(_) | Self::FixedCollection(_) => Ok(()),
            Self::VariableComposite(i) => i.resolve(),
            Self::VariableCollection(i) => i.resolve(),
        }
    }

    // ------------------------------------------------------------------
    // Composite navigation
    // ------------------------------------------------------------------

    fn composite_desc(&self) -> Result<&CompositeDescriptor> {
        match self {
            Self::FixedComposite(i) => i.base.composite(),
            Self::VariableComposite(i) => i.base.composite(),
            _ => Err(Error::mismatch("composite", self.type_name())),
        }
    }

    pub fn member_count(&self) -> Result<usize> {
        Ok(self.composite_desc()?.member_count())
    }

    /// Index of a member by name; `None` for unknown names or collections.
    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.type_desc().as_composite()?.member_index(name)
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.composite_desc()?.member_index(name).ok_or_else(|| {
            Error::MemberNotFound(format!("'{}' in '{}'", name, self.type_name()))
        })
    }

    pub fn get_member(&self, name: &str) -> Result<Field> {
        let index = self.index_of(name)?;
        self.get_member_at(index)
    }

    pub fn get_member_at(&self, index: usize) -> Result<Field> {
        match self {
            Self::FixedComposite(i) => i.member(index),
            Self::VariableComposite(i) => i.member(index),
            _ => Err(Error::mismatch("composite", self.type_name())),
        }
    }

    /// Absolute position of a member, resolving earlier members if needed.
    pub fn member_offset(&self, name: &str) -> Result<u64> {
        let index = self.index_of(name)?;
        match self {
            Self::FixedComposite(i) => i.member_offset(index),
            Self::VariableComposite(i) => i.member_offset(index),
            _ => Err(Error::mismatch("composite", self.type_name())),
        }
    }

    /// Typed value of a primitive member.
    pub fn get<T: FromScalar>(&self, name: &str) -> Result<T> {
        self.get_member(name)?.value()
    }

    /// Composite member as an instance.
    pub fn composite(&self, name: &str) -> Result<Instance> {
        let child = self.get_member(name)?.into_instance()?;
        if child.is_composite() {
            Ok(child)
        } else {
            Err(Error::mismatch("composite", child.type_name()))
        }
    }

    /// Collection member as an instance.
    pub fn collection(&self, name: &str) -> Result<Instance> {
        let child = self.get_member(name)?.into_instance()?;
        if child.is_collection() {
            Ok(child)
        } else {
            Err(Error::mismatch("collection", child.type_name()))
        }
    }

    /// Encode `value` into a primitive member at its resolved offset.
    ///
    /// Writing a count field does not re-layout instances that already
    /// resolved with the old count.
    pub fn set_member(&self, name: &str, value: impl Into<Scalar>) -> Result<()> {
        let index = self.index_of(name)?;
        let member_type = self.composite_desc()?.members()[index].type_desc().clone();
        let kind = primitive_of(&member_type)?;
        let offset = self.member_offset(name)?;
        self.base().shared.write_scalar(kind, offset, &value.into())
    }

    // ------------------------------------------------------------------
    // Collection navigation
    // ------------------------------------------------------------------

    pub fn element_count(&self) -> Result<usize> {
        match self {
            Self::FixedCollection(i) => Ok(i.element_count()),
            Self::VariableCollection(i) => i.element_count(),
            _ => Err(Error::mismatch("collection", self.type_name())),
        }
    }

    fn element_index(&self, index: i64) -> Result<usize> {
        if !self.is_collection() {
            return Err(Error::mismatch("collection", self.type_name()));
        }
        usize::try_from(index).map_err(|_| Error::IndexOutOfRange {
            index,
            count: self.known_count().unwrap_or(0),
        })
    }

    fn known_count(&self) -> Option<usize> {
        match self {
            Self::FixedCollection(i) => Some(i.element_count()),
            Self::VariableCollection(i) => i.known_count(),
            _ => None,
        }
    }

    /// Element at `index`. Negative or past-the-end indices are out of range.
    pub fn get_element(&self, index: i64) -> Result<Field> {
        let i = self.element_index(index)?;
        match self {
            Self::FixedCollection(c) => c.element(i),
            Self::VariableCollection(c) => c.element(i),
            _ => Err(Error::mismatch("collection", self.type_name())),
        }
    }

    /// Absolute position of an element.
    pub fn element_offset(&self, index: i64) -> Result<u64> {
        let i = self.element_index(index)?;
        match self {
            Self::FixedCollection(c) => c.element_offset(i),
            Self::VariableCollection(c) => c.element_offset(i),
            _ => Err(Error::mismatch("collection", self.type_name())),
        }
    }

    /// Typed value of a primitive element.
    pub fn element<T: FromScalar>(&self, index: i64) -> Result<T> {
        self.get_element(index)?.value()
    }

    /// Encode `value` into a primitive element.
    pub fn set_element(&self, index: i64, value: impl Into<Scalar>) -> Result<()> {
        let element_type = self
            .type_desc()
            .as_collection()
            .map(|c| c.element_type().clone())
            .ok_or_else(|| Error::mismatch("collection", self.type_name()))?;
        let kind = primitive_of(&element_type)?;
        let offset = self.element_offset(index)?;
        self.base().shared.write_scalar(kind, offset, &value.into())
    }

    /// Read `len` primitive elements starting at `start`.
    ///
    /// Fixed-layout collections fetch the whole range with one handler read.
    pub fn read_scalars(&self, start: usize, len: usize) -> Result<Vec<Scalar>> {
        match self {
            Self::FixedCollection(c) => c.read_scalars(start, len),
            Self::VariableCollection(c) => c.read_scalars(start, len),
            _ => Err(Error::mismatch("collection", self.type_name())),
        }
    }

    /// Typed bulk read of primitive elements.
    pub fn read_values<T: FromScalar>(&self, start: usize, len: usize) -> Result<Vec<T>> {
        self.read_scalars(start, len)?
            .into_iter()
            .map(T::from_scalar)
            .collect()
    }
}

fn primitive_of(type_desc: &TypeDescriptor) -> Result<PrimitiveKind> {
    type_desc
        .as_primitive()
        .ok_or_else(|| Error::mismatch("primitive", type_desc.name()))
}

/// Single-read bulk decode of `len` primitives laid out back to back.
pub(crate) fn read_packed(
    shared: &ContextShared,
    kind: PrimitiveKind,
    offset: u64,
    len: usize,
) -> Result<Vec<Scalar>> {
    let width = kind.size();
    if len == 0 {
        return Ok(Vec::new());
    }
    if width == 0 {
        return Ok(vec![Scalar::Text(Vec::new()); len]);
    }
    let total = width
        .checked_mul(len)
        .ok_or_else(|| Error::CorruptData(format!("{} x {} bytes overflows the address space", len, width)))?;
    // Check against the data before allocating a buffer sized from a count.
    let available = shared.data_len()?.saturating_sub(offset);
    if (total as u64) > available {
        return Err(Error::TruncatedData {
            offset,
            expected: total as u64,
            actual: available,
        });
    }
    let mut buf = vec![0u8; total];
    shared.read_into(offset, &mut buf)?;
    Ok(buf
        .chunks_exact(width)
        .map(|chunk| crate::codec::decode(kind, chunk, shared.endianness()))
        .collect())
}
