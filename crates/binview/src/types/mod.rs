// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors: immutable, composable descriptions of binary layouts.
//!
//! A descriptor is either a primitive, a composite (ordered named members)
//! or a collection (element type + count). Descriptors are shared through
//! `Arc` and never perform I/O. Whether the byte size is known is computed
//! once at construction from the children, so size-unknown-ness propagates
//! upward through every enclosing type.

mod builder;
mod collection;
mod composite;
mod primitive;

pub use builder::CompositeBuilder;
pub use collection::{CollectionDescriptor, CountFn, CountRule, ElementCount};
pub use composite::{CompositeDescriptor, MemberDescriptor};
pub use primitive::{PrimitiveInfo, PrimitiveKind};

use crate::error::{Error, Result};
use std::sync::Arc;

/// Type kind enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    Composite(CompositeDescriptor),
    Collection(CollectionDescriptor),
}

/// A complete type descriptor.
///
/// Equality is structural: two descriptors are equal when their kinds are
/// equal (member names and types, element types and counts), regardless of
/// the descriptor name or identity.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    size: Option<u64>,
}

impl TypeDescriptor {
    /// Create a primitive type descriptor named after its kind.
    pub fn primitive(kind: PrimitiveKind) -> Self {
        let name = match kind {
            PrimitiveKind::Text(len) => format!("text[{}]", len),
            _ => kind.name().to_string(),
        };
        Self {
            name,
            kind: TypeKind::Primitive(kind),
            size: Some(kind.size() as u64),
        }
    }

    /// Create a composite type descriptor.
    pub fn composite(name: impl Into<String>, members: Vec<MemberDescriptor>) -> Result<Self> {
        let name = name.into();
        let composite = CompositeDescriptor::new(&name, members)?;
        let size = composite.compute_size();
        Ok(Self {
            name,
            kind: TypeKind::Composite(composite),
            size,
        })
    }

    /// Create a collection type descriptor.
    ///
    /// Fails when the element type is itself a collection counted by a
    /// sibling field (there is no enclosing composite to read it from), or
    /// when a `Remaining` collection has zero-sized elements.
    pub fn collection(
        name: impl Into<String>,
        element_type: Arc<TypeDescriptor>,
        count: ElementCount,
    ) -> Result<Self> {
        let name = name.into();
        if element_type.requires_enclosing_composite() {
            return Err(Error::malformed(format!(
                "collection '{}' has an element type counted by a sibling field",
                name
            )));
        }
        if count == ElementCount::Remaining && element_type.size() == Some(0) {
            return Err(Error::malformed(format!(
                "collection '{}' spans the remaining data with zero-sized elements",
                name
            )));
        }
        let collection = CollectionDescriptor::new(element_type, count);
        let size = collection.compute_size();
        Ok(Self {
            name,
            kind: TypeKind::Collection(collection),
            size,
        })
    }

    /// Fixed-length collection (`element[n]`).
    pub fn array(element_type: Arc<TypeDescriptor>, length: usize) -> Result<Self> {
        let name = format!("{}[{}]", element_type.name, length);
        Self::collection(name, element_type, ElementCount::Known(length))
    }

    /// Collection whose count is read from a sibling field.
    pub fn sequence(element_type: Arc<TypeDescriptor>, rule: CountRule) -> Result<Self> {
        let name = format!("{}[{}]", element_type.name, rule.field_name());
        Self::collection(name, element_type, ElementCount::Field(rule))
    }

    /// Collection covering the rest of the available data.
    pub fn remaining(element_type: Arc<TypeDescriptor>) -> Result<Self> {
        let name = format!("{}[]", element_type.name);
        Self::collection(name, element_type, ElementCount::Remaining)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Byte size, `None` when it depends on the data.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn is_size_known(&self) -> bool {
        self.size.is_some()
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(_))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, TypeKind::Composite(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, TypeKind::Collection(_))
    }

    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self.kind {
            TypeKind::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeDescriptor> {
        match &self.kind {
            TypeKind::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&CollectionDescriptor> {
        match &self.kind {
            TypeKind::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Get a composite member by name.
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.as_composite()?.member_by_name(name)
    }

    /// True for a collection whose count comes from a sibling field.
    pub(crate) fn requires_enclosing_composite(&self) -> bool {
        self.as_collection()
            .is_some_and(|c| matches!(c.count(), ElementCount::Field(_)))
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || self.kind == other.kind
    }
}
