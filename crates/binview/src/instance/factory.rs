// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Instance factory: the single place that picks an instance shape.

use super::{
    span_end, FixedCollection, FixedComposite, Instance, VariableCollection, VariableComposite,
};
use crate::context::ContextShared;
use crate::error::{Error, Result};
use crate::types::{ElementCount, TypeDescriptor, TypeKind};
use std::sync::Arc;

/// Create an instance of `type_desc` at `position`.
///
/// `count` carries the element count of a collection counted by a sibling
/// field; the enclosing composite reads it before calling in here. No I/O is
/// performed.
pub(crate) fn create(
    shared: &Arc<ContextShared>,
    type_desc: &Arc<TypeDescriptor>,
    position: u64,
    count: Option<usize>,
) -> Result<Instance> {
    match type_desc.kind() {
        TypeKind::Primitive(_) => Err(Error::mismatch(
            "composite or collection",
            type_desc.name(),
        )),
        TypeKind::Composite(_) => {
            if let Some(size) = type_desc.size() {
                span_end(type_desc, position, size, 1)?;
                log::trace!("[factory] fixed composite '{}' @{}", type_desc.name(), position);
                Ok(Instance::FixedComposite(Arc::new(FixedComposite::new(
                    shared, type_desc, position,
                ))))
            } else {
                log::trace!("[factory] variable composite '{}' @{}", type_desc.name(), position);
                Ok(Instance::VariableComposite(Arc::new(VariableComposite::new(
                    shared, type_desc, position,
                ))))
            }
        }
        TypeKind::Collection(coll) => {
            let count = match coll.count() {
                ElementCount::Known(n) => Some(*n),
                ElementCount::Remaining => None,
                ElementCount::Field(rule) => Some(count.ok_or_else(|| {
                    Error::malformed(format!(
                        "collection '{}' needs the value of field '{}' from an enclosing composite",
                        type_desc.name(),
                        rule.field_name()
                    ))
                })?),
            };
            match (count, coll.element_type().size()) {
                (Some(count), Some(element_size)) => {
                    // Element offsets below the end cannot overflow once the end fits.
                    span_end(type_desc, position, element_size, count as u64)?;
                    log::trace!(
                        "[factory] fixed collection '{}' @{} ({} x {} bytes)",
                        type_desc.name(),
                        position,
                        count,
                        element_size
                    );
                    Ok(Instance::FixedCollection(Arc::new(FixedCollection::new(
                        shared,
                        type_desc,
                        position,
                        count,
                        element_size,
                    ))))
                }
                (count, _) => {
                    log::trace!(
                        "[factory] variable collection '{}' @{} (count {:?})",
                        type_desc.name(),
                        position,
                        count
                    );
                    Ok(Instance::VariableCollection(Arc::new(VariableCollection::new(
                        shared, type_desc, position, count,
                    ))))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Endianness;
    use crate::io::MemoryHandler;
    use crate::types::{CompositeBuilder, CountRule, PrimitiveKind};

    fn shared() -> Arc<ContextShared> {
        Arc::new(ContextShared::new(
            Box::new(MemoryHandler::default()),
            Endianness::Big,
        ))
    }

    fn prim(kind: PrimitiveKind) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::primitive(kind))
    }

    #[test]
    fn test_shape_selection() {
        let shared = shared();
        let fixed = CompositeBuilder::new("Fixed")
            .field("a", PrimitiveKind::U8)
            .build_shared()
            .unwrap();
        let variable = CompositeBuilder::new("Var")
            .field("n", PrimitiveKind::U8)
            .sequence_field("v", PrimitiveKind::U8, "n")
            .build_shared()
            .unwrap();
        let array = Arc::new(TypeDescriptor::array(prim(PrimitiveKind::U16), 4).unwrap());
        let var_array = Arc::new(TypeDescriptor::array(variable.clone(), 2).unwrap());
        let rest = Arc::new(TypeDescriptor::remaining(prim(PrimitiveKind::U8)).unwrap());

        assert!(matches!(
            create(&shared, &fixed, 0, None).unwrap(),
            Instance::FixedComposite(_)
        ));
        assert!(matches!(
            create(&shared, &variable, 0, None).unwrap(),
            Instance::VariableComposite(_)
        ));
        assert!(matches!(
            create(&shared, &array, 0, None).unwrap(),
            Instance::FixedCollection(_)
        ));
        assert!(matches!(
            create(&shared, &var_array, 0, None).unwrap(),
            Instance::VariableCollection(_)
        ));
        assert!(matches!(
            create(&shared, &rest, 0, None).unwrap(),
            Instance::VariableCollection(_)
        ));
    }

    #[test]
    fn test_field_counted_collection_needs_count() {
        let shared = shared();
        let seq = Arc::new(
            TypeDescriptor::sequence(prim(PrimitiveKind::F64), CountRule::field("n")).unwrap(),
        );
        assert!(matches!(
            create(&shared, &seq, 0, None),
            Err(Error::MalformedType(_))
        ));
        let instance = create(&shared, &seq, 4, Some(3)).unwrap();
        assert!(instance.is_fixed_layout());
        assert_eq!(instance.element_count().unwrap(), 3);
        assert_eq!(instance.size().unwrap(), 24);
    }

    #[test]
    fn test_primitive_rejected() {
        let shared = shared();
        let err = create(&shared, &prim(PrimitiveKind::I32), 0, None).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }
}
