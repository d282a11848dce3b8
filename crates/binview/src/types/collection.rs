// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Collection type descriptors.

use crate::types::TypeDescriptor;
use std::fmt;
use std::sync::Arc;

/// Maps the raw value of a count field to an element count.
///
/// `None` marks the raw value as invalid (reported as corrupt data).
pub type CountFn = dyn Fn(i64) -> Option<usize> + Send + Sync;

/// Count-resolution rule bound to a sibling field of the enclosing composite.
#[derive(Clone)]
pub struct CountRule {
    field: String,
    map: Option<Arc<CountFn>>,
}

impl CountRule {
    /// The count is the value of `field`.
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            map: None,
        }
    }

    /// The count is `map(value of field)`.
    pub fn mapped(
        field: impl Into<String>,
        map: impl Fn(i64) -> Option<usize> + Send + Sync + 'static,
    ) -> Self {
        Self {
            field: field.into(),
            map: Some(Arc::new(map)),
        }
    }

    /// Name of the sibling count field.
    pub fn field_name(&self) -> &str {
        &self.field
    }

    /// Convert a raw field value into an element count.
    pub fn apply(&self, raw: i64) -> Option<usize> {
        match &self.map {
            Some(map) => map(raw),
            None => usize::try_from(raw).ok(),
        }
    }
}

impl PartialEq for CountRule {
    fn eq(&self, other: &Self) -> bool {
        let same_map = match (&self.map, &other.map) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.field == other.field && same_map
    }
}

impl fmt::Debug for CountRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountRule")
            .field("field", &self.field)
            .field("mapped", &self.map.is_some())
            .finish()
    }
}

/// How many elements a collection holds.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementCount {
    /// Fixed at design time.
    Known(usize),
    /// Everything up to the end of the available data.
    Remaining,
    /// Read from a sibling field when the instance is resolved.
    Field(CountRule),
}

impl ElementCount {
    pub fn known(&self) -> Option<usize> {
        match self {
            Self::Known(n) => Some(*n),
            _ => None,
        }
    }

    pub fn rule(&self) -> Option<&CountRule> {
        match self {
            Self::Field(rule) => Some(rule),
            _ => None,
        }
    }
}

/// Homogeneous repetition of one element type.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionDescriptor {
    element_type: Arc<TypeDescriptor>,
    count: ElementCount,
}

impl CollectionDescriptor {
    pub(crate) fn new(element_type: Arc<TypeDescriptor>, count: ElementCount) -> Self {
        Self {
            element_type,
            count,
        }
    }

    pub fn element_type(&self) -> &Arc<TypeDescriptor> {
        &self.element_type
    }

    pub fn count(&self) -> &ElementCount {
        &self.count
    }

    /// Byte size, if the count is known and the element size is known.
    pub(crate) fn compute_size(&self) -> Option<u64> {
        let n = self.count.known()?;
        let element = self.element_type.size()?;
        element.checked_mul(n as u64)
    }
}
