// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Named binary formats.
//!
//! A [`DataFormat`] bundles the root type of a file dialect with its byte
//! order and a registry of reusable type fragments. Formats may extend a
//! basis format; definition lookups fall back to the basis when a name is
//! not defined locally.

use crate::codec::Endianness;
use crate::config::DEFAULT_ENDIANNESS;
use crate::error::{Error, Result};
use crate::types::{PrimitiveKind, TypeDescriptor};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct DataFormat {
    name: String,
    version: Option<String>,
    root_type: Arc<TypeDescriptor>,
    endianness: Endianness,
    type_defs: HashMap<String, Arc<TypeDescriptor>>,
    basis: Option<Arc<DataFormat>>,
}

impl DataFormat {
    pub fn new(name: impl Into<String>, root_type: Arc<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            version: None,
            root_type,
            endianness: DEFAULT_ENDIANNESS,
            type_defs: HashMap::new(),
            basis: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    /// Extend `basis`: unknown type definitions are looked up there.
    pub fn with_basis(mut self, basis: Arc<DataFormat>) -> Self {
        self.basis = Some(basis);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn root_type(&self) -> &Arc<TypeDescriptor> {
        &self.root_type
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn basis(&self) -> Option<&Arc<DataFormat>> {
        self.basis.as_ref()
    }

    /// Register a type fragment under its own name.
    pub fn add_type_def(&mut self, type_desc: Arc<TypeDescriptor>) -> Result<()> {
        self.add_type_def_as(type_desc.name().to_string(), type_desc)
    }

    /// Register a type fragment under an alias.
    pub fn add_type_def_as(
        &mut self,
        name: impl Into<String>,
        type_desc: Arc<TypeDescriptor>,
    ) -> Result<()> {
        let name = name.into();
        if self.type_defs.contains_key(&name) {
            return Err(Error::malformed(format!(
                "type '{}' is already defined in format '{}'",
                name, self.name
            )));
        }
        self.type_defs.insert(name, type_desc);
        Ok(())
    }

    /// Look up a type by name: local definitions, then the basis chain,
    /// then the primitive registry.
    pub fn type_def(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        if let Some(found) = self.local_or_basis(name) {
            return Some(found);
        }
        PrimitiveKind::from_name(name).map(|kind| Arc::new(TypeDescriptor::primitive(kind)))
    }

    fn local_or_basis(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        if let Some(found) = self.type_defs.get(name) {
            return Some(found.clone());
        }
        self.basis.as_ref()?.local_or_basis(name)
    }

    pub fn is_type_defined(&self, name: &str) -> bool {
        self.type_def(name).is_some()
    }

    /// Names defined directly in this format (not in its basis), sorted.
    pub fn type_def_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.type_defs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
