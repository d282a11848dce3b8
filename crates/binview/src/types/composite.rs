// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Composite (record) type descriptors.

use crate::error::{Error, Result};
use crate::types::{ElementCount, TypeDescriptor, TypeKind};
use std::collections::HashMap;
use std::sync::Arc;

/// Named, typed member of a composite.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDescriptor {
    name: String,
    type_desc: Arc<TypeDescriptor>,
}

impl MemberDescriptor {
    pub fn new(name: impl Into<String>, type_desc: Arc<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            type_desc,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_desc(&self) -> &Arc<TypeDescriptor> {
        &self.type_desc
    }
}

/// Ordered member list with O(1) name lookup.
#[derive(Debug, Clone)]
pub struct CompositeDescriptor {
    members: Vec<MemberDescriptor>,
    index: HashMap<String, usize>,
    /// Offsets known from the type alone: `prefix[k]` is the start of member
    /// `k` while every member before `k` has a known size. When the whole
    /// composite is fixed this holds `members.len() + 1` entries.
    prefix: Vec<u64>,
}

impl CompositeDescriptor {
    /// Validate and index a member list.
    ///
    /// Rejects duplicate names and count rules that do not point at an
    /// integer primitive member of this composite.
    pub(crate) fn new(type_name: &str, members: Vec<MemberDescriptor>) -> Result<Self> {
        let mut index = HashMap::with_capacity(members.len());
        for (i, member) in members.iter().enumerate() {
            if index.insert(member.name.clone(), i).is_some() {
                return Err(Error::malformed(format!(
                    "duplicate member '{}' in composite '{}'",
                    member.name, type_name
                )));
            }
        }

        for member in &members {
            let TypeKind::Collection(coll) = member.type_desc.kind() else {
                continue;
            };
            let ElementCount::Field(rule) = coll.count() else {
                continue;
            };
            let target = index
                .get(rule.field_name())
                .map(|&i| &members[i])
                .ok_or_else(|| {
                    Error::malformed(format!(
                        "count field '{}' of member '{}' does not exist in composite '{}'",
                        rule.field_name(),
                        member.name,
                        type_name
                    ))
                })?;
            let is_integer = target
                .type_desc
                .as_primitive()
                .is_some_and(|kind| kind.is_integer());
            if !is_integer {
                return Err(Error::malformed(format!(
                    "count field '{}' of member '{}' in composite '{}' is not an integer primitive",
                    rule.field_name(),
                    member.name,
                    type_name
                )));
            }
        }

        let mut prefix = Vec::with_capacity(members.len() + 1);
        prefix.push(0u64);
        for member in &members {
            let Some(size) = member.type_desc.size() else {
                break;
            };
            let Some(last) = prefix.last().copied() else {
                break;
            };
            match last.checked_add(size) {
                Some(next) => prefix.push(next),
                None => break,
            }
        }

        Ok(Self {
            members,
            index,
            prefix,
        })
    }

    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn member(&self, index: usize) -> Option<&MemberDescriptor> {
        self.members.get(index)
    }

    /// Index of a member by name, `None` when unknown.
    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn member_by_name(&self, name: &str) -> Option<&MemberDescriptor> {
        self.member_index(name).map(|i| &self.members[i])
    }

    /// Offset of member `index` relative to the composite start, if it can be
    /// computed from the type alone. `index == member_count()` yields the size.
    pub fn static_offset(&self, index: usize) -> Option<u64> {
        self.prefix.get(index).copied()
    }

    /// Leading offsets that are known statically.
    pub(crate) fn static_prefix(&self) -> &[u64] {
        &self.prefix
    }

    pub(crate) fn compute_size(&self) -> Option<u64> {
        if self.prefix.len() == self.members.len() + 1 {
            self.prefix.last().copied()
        } else {
            None
        }
    }
}

impl PartialEq for CompositeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CountRule, PrimitiveKind};

    fn prim(kind: PrimitiveKind) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::primitive(kind))
    }

    #[test]
    fn test_duplicate_member_rejected() {
        let members = vec![
            MemberDescriptor::new("a", prim(PrimitiveKind::U8)),
            MemberDescriptor::new("a", prim(PrimitiveKind::U16)),
        ];
        let err = CompositeDescriptor::new("Dup", members).unwrap_err();
        assert!(matches!(err, Error::MalformedType(_)));
    }

    #[test]
    fn test_dangling_count_field_rejected() {
        let seq = Arc::new(
            TypeDescriptor::sequence(prim(PrimitiveKind::F64), CountRule::field("n")).unwrap(),
        );
        let members = vec![MemberDescriptor::new("values", seq)];
        let err = CompositeDescriptor::new("Dangling", members).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_non_integer_count_field_rejected() {
        let seq = Arc::new(
            TypeDescriptor::sequence(prim(PrimitiveKind::F64), CountRule::field("n")).unwrap(),
        );
        let members = vec![
            MemberDescriptor::new("n", prim(PrimitiveKind::F32)),
            MemberDescriptor::new("values", seq),
        ];
        let err = CompositeDescriptor::new("FloatCount", members).unwrap_err();
        assert!(err.to_string().contains("not an integer"));
    }

    #[test]
    fn test_static_prefix() {
        let seq = Arc::new(
            TypeDescriptor::sequence(prim(PrimitiveKind::F64), CountRule::field("n")).unwrap(),
        );
        let members = vec![
            MemberDescriptor::new("n", prim(PrimitiveKind::I32)),
            MemberDescriptor::new("flag", prim(PrimitiveKind::U8)),
            MemberDescriptor::new("values", seq),
            MemberDescriptor::new("tail", prim(PrimitiveKind::U16)),
        ];
        let comp = CompositeDescriptor::new("Rec", members).unwrap();
        assert_eq!(comp.static_offset(0), Some(0));
        assert_eq!(comp.static_offset(1), Some(4));
        assert_eq!(comp.static_offset(2), Some(5));
        assert_eq!(comp.static_offset(3), None);
        assert_eq!(comp.compute_size(), None);
        assert_eq!(comp.member_index("values"), Some(2));
        assert_eq!(comp.member_index("missing"), None);
    }
}
