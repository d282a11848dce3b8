// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for composite type descriptors.

use crate::error::Result;
use crate::types::{CountRule, MemberDescriptor, PrimitiveKind, TypeDescriptor};
use std::sync::Arc;

/// Builder for composite [`TypeDescriptor`]s.
///
/// Collection helpers that can fail (a nested sibling-counted element, for
/// instance) record the first error; [`build`](Self::build) reports it
/// together with the composite validation errors.
#[derive(Debug)]
pub struct CompositeBuilder {
    name: String,
    members: Vec<MemberDescriptor>,
    error: Option<crate::Error>,
}

impl CompositeBuilder {
    /// Create a new builder for a composite type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            error: None,
        }
    }

    /// Add a primitive member.
    pub fn field(mut self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        let type_desc = Arc::new(TypeDescriptor::primitive(kind));
        self.members.push(MemberDescriptor::new(name, type_desc));
        self
    }

    /// Add a fixed-length text member.
    pub fn text_field(self, name: impl Into<String>, length: usize) -> Self {
        self.field(name, PrimitiveKind::Text(length))
    }

    /// Add a member with an arbitrary type descriptor.
    pub fn member(mut self, name: impl Into<String>, type_desc: Arc<TypeDescriptor>) -> Self {
        self.members.push(MemberDescriptor::new(name, type_desc));
        self
    }

    /// Add a fixed-length array of primitives.
    pub fn array_field(self, name: impl Into<String>, kind: PrimitiveKind, length: usize) -> Self {
        let element = Arc::new(TypeDescriptor::primitive(kind));
        self.array_of(name, element, length)
    }

    /// Add a fixed-length array of any element type.
    pub fn array_of(
        self,
        name: impl Into<String>,
        element: Arc<TypeDescriptor>,
        length: usize,
    ) -> Self {
        let collection = TypeDescriptor::array(element, length);
        self.push_result(name, collection)
    }

    /// Add a sequence of primitives counted by the sibling field `count_field`.
    pub fn sequence_field(
        self,
        name: impl Into<String>,
        kind: PrimitiveKind,
        count_field: impl Into<String>,
    ) -> Self {
        let element = Arc::new(TypeDescriptor::primitive(kind));
        self.sequence_of(name, element, CountRule::field(count_field))
    }

    /// Add a sequence of any element type with a count rule.
    pub fn sequence_of(
        self,
        name: impl Into<String>,
        element: Arc<TypeDescriptor>,
        rule: CountRule,
    ) -> Self {
        let collection = TypeDescriptor::sequence(element, rule);
        self.push_result(name, collection)
    }

    /// Add a collection spanning the rest of the available data.
    pub fn remaining_of(self, name: impl Into<String>, element: Arc<TypeDescriptor>) -> Self {
        let collection = TypeDescriptor::remaining(element);
        self.push_result(name, collection)
    }

    fn push_result(mut self, name: impl Into<String>, collection: Result<TypeDescriptor>) -> Self {
        match collection {
            Ok(desc) => self.members.push(MemberDescriptor::new(name, Arc::new(desc))),
            Err(e) => {
                if self.error.is_none() {
                    self.error = Some(e);
                }
            }
        }
        self
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> Result<TypeDescriptor> {
        if let Some(e) = self.error {
            return Err(e);
        }
        TypeDescriptor::composite(self.name, self.members)
    }

    /// Build and wrap in an `Arc` for sharing.
    pub fn build_shared(self) -> Result<Arc<TypeDescriptor>> {
        self.build().map(Arc::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ElementCount, TypeKind};

    #[test]
    fn test_builder_fixed_record() {
        let desc = CompositeBuilder::new("Header")
            .field("id", PrimitiveKind::U16)
            .text_field("label", 6)
            .array_field("coeffs", PrimitiveKind::F32, 3)
            .build()
            .unwrap();
        assert_eq!(desc.size(), Some(2 + 6 + 12));
        assert_eq!(desc.as_composite().map(|c| c.member_count()), Some(3));
    }

    #[test]
    fn test_builder_variable_record() {
        let desc = CompositeBuilder::new("Samples")
            .field("count", PrimitiveKind::I32)
            .sequence_field("list", PrimitiveKind::F64, "count")
            .build()
            .unwrap();
        assert!(!desc.is_size_known());
        let list = desc.member("list").unwrap();
        match list.type_desc().kind() {
            TypeKind::Collection(c) => {
                assert_eq!(c.count().rule().map(|r| r.field_name()), Some("count"));
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_builder_reports_first_error() {
        let nested = Arc::new(
            TypeDescriptor::sequence(
                Arc::new(TypeDescriptor::primitive(PrimitiveKind::U8)),
                CountRule::field("n"),
            )
            .unwrap(),
        );
        let result = CompositeBuilder::new("Bad")
            .field("n", PrimitiveKind::U8)
            .array_of("rows", nested, 2)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_remaining() {
        let desc = CompositeBuilder::new("Tail")
            .field("magic", PrimitiveKind::U32)
            .remaining_of("rest", Arc::new(TypeDescriptor::primitive(PrimitiveKind::U8)))
            .build()
            .unwrap();
        let rest = desc.member("rest").unwrap();
        assert_eq!(
            rest.type_desc().as_collection().map(|c| c.count().clone()),
            Some(ElementCount::Remaining)
        );
        assert!(!desc.is_size_known());
    }
}
