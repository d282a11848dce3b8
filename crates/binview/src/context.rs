// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Data context: one open binding session over a byte source.
//!
//! A [`DataContext`] owns the byte order, the I/O handler and the root
//! instance. Every instance created from it shares the same
//! [`ContextShared`] state, so all primitive reads go through one handler
//! and one byte-order setting.
//!
//! # Lifecycle
//!
//! ```text
//! new/open -> root() / create_instance() -> ... -> close() (or drop)
//! ```
//!
//! After `close()` every read or write through an instance of this context
//! fails with [`Error::ContextClosed`].

use crate::codec::{self, Endianness};
use crate::error::{Error, Result};
use crate::format::DataFormat;
use crate::instance::{factory, Instance};
use crate::io::IoHandler;
use crate::types::{ElementCount, PrimitiveKind, TypeDescriptor};
use crate::value::Scalar;
use parking_lot::Mutex;
use std::io;
use std::sync::{Arc, OnceLock};

/// State shared between a context and all of its instances.
pub(crate) struct ContextShared {
    endianness: Endianness,
    handler: Mutex<Option<Box<dyn IoHandler>>>,
}

impl std::fmt::Debug for ContextShared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextShared")
            .field("endianness", &self.endianness)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl ContextShared {
    pub(crate) fn new(handler: Box<dyn IoHandler>, endianness: Endianness) -> Self {
        Self {
            endianness,
            handler: Mutex::new(Some(handler)),
        }
    }

    pub(crate) fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.handler.lock().is_none()
    }

    fn with_handler<T>(&self, f: impl FnOnce(&mut dyn IoHandler) -> Result<T>) -> Result<T> {
        let mut guard = self.handler.lock();
        let handler = guard.as_mut().ok_or(Error::ContextClosed)?;
        f(handler.as_mut())
    }

    /// Fill `buf` from `offset`; a short read is truncated data.
    pub(crate) fn read_into(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.with_handler(|handler| match handler.read_bytes(offset, buf) {
            Ok(n) if n == buf.len() => Ok(()),
            Ok(n) => Err(Error::TruncatedData {
                offset,
                expected: buf.len() as u64,
                actual: n as u64,
            }),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(Error::TruncatedData {
                offset,
                expected: buf.len() as u64,
                actual: 0,
            }),
            Err(e) => Err(Error::Io(e)),
        })
    }

    pub(crate) fn read_scalar(&self, kind: PrimitiveKind, offset: u64) -> Result<Scalar> {
        let width = kind.size();
        if width <= 8 {
            let mut buf = [0u8; 8];
            self.read_into(offset, &mut buf[..width])?;
            Ok(codec::decode(kind, &buf[..width], self.endianness))
        } else {
            let mut buf = vec![0u8; width];
            self.read_into(offset, &mut buf)?;
            Ok(codec::decode(kind, &buf, self.endianness))
        }
    }

    pub(crate) fn write_scalar(&self, kind: PrimitiveKind, offset: u64, value: &Scalar) -> Result<()> {
        let mut buf = vec![0u8; kind.size()];
        codec::encode(kind, value, self.endianness, &mut buf)?;
        self.write_bytes(offset, &buf)
    }

    pub(crate) fn write_bytes(&self, offset: u64, data: &[u8]) -> Result<()> {
        self.with_handler(|handler| Ok(handler.write_bytes(offset, data)?))
    }

    /// Total length of the underlying data.
    pub(crate) fn data_len(&self) -> Result<u64> {
        self.with_handler(|handler| Ok(handler.len()?))
    }

    pub(crate) fn flush(&self) -> Result<()> {
        self.with_handler(|handler| Ok(handler.flush()?))
    }

    /// Close and release the handler. Closing twice is a no-op.
    pub(crate) fn close(&self) -> Result<()> {
        let handler = self.handler.lock().take();
        if let Some(mut handler) = handler {
            handler.close()?;
            log::debug!("[context] handler closed");
        }
        Ok(())
    }
}

/// Open binding session over one I/O handler.
#[derive(Debug)]
pub struct DataContext {
    shared: Arc<ContextShared>,
    root_type: Arc<TypeDescriptor>,
    format: Option<Arc<DataFormat>>,
    root: OnceLock<Instance>,
}

impl DataContext {
    /// Open a context over `handler` with `root_type` at offset 0.
    ///
    /// The root must be a composite or a collection that does not depend on
    /// a sibling count field.
    pub fn new<H: IoHandler + 'static>(
        root_type: Arc<TypeDescriptor>,
        handler: H,
        endianness: Endianness,
    ) -> Result<Self> {
        Self::with_parts(root_type, None, Box::new(handler), endianness)
    }

    /// Open a context for a named format; the byte order comes from the format.
    pub fn open<H: IoHandler + 'static>(format: Arc<DataFormat>, handler: H) -> Result<Self> {
        let root_type = format.root_type().clone();
        let endianness = format.endianness();
        Self::with_parts(root_type, Some(format), Box::new(handler), endianness)
    }

    fn with_parts(
        root_type: Arc<TypeDescriptor>,
        format: Option<Arc<DataFormat>>,
        handler: Box<dyn IoHandler>,
        endianness: Endianness,
    ) -> Result<Self> {
        check_root(&root_type)?;
        log::debug!(
            "[context] opened root '{}' ({:?} endian)",
            root_type.name(),
            endianness
        );
        Ok(Self {
            shared: Arc::new(ContextShared::new(handler, endianness)),
            root_type,
            format,
            root: OnceLock::new(),
        })
    }

    pub fn endianness(&self) -> Endianness {
        self.shared.endianness()
    }

    pub fn root_type(&self) -> &Arc<TypeDescriptor> {
        &self.root_type
    }

    pub fn format(&self) -> Option<&Arc<DataFormat>> {
        self.format.as_ref()
    }

    /// Root instance at offset 0, created on first call.
    pub fn root(&self) -> Result<&Instance> {
        if let Some(root) = self.root.get() {
            return Ok(root);
        }
        if self.shared.is_closed() {
            return Err(Error::ContextClosed);
        }
        let instance = factory::create(&self.shared, &self.root_type, 0, None)?;
        Ok(self.root.get_or_init(|| instance))
    }

    /// Standalone instance of `type_desc` at an absolute position.
    pub fn create_instance(&self, type_desc: &Arc<TypeDescriptor>, position: u64) -> Result<Instance> {
        check_root(type_desc)?;
        if self.shared.is_closed() {
            return Err(Error::ContextClosed);
        }
        factory::create(&self.shared, type_desc, position, None)
    }

    /// Total number of bytes available from the handler.
    pub fn data_len(&self) -> Result<u64> {
        self.shared.data_len()
    }

    pub fn flush(&self) -> Result<()> {
        self.shared.flush()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Close the handler. Instances created from this context stay valid
    /// as values but every further read fails with `ContextClosed`.
    pub fn close(&self) -> Result<()> {
        self.shared.close()
    }

    pub(crate) fn shared(&self) -> &Arc<ContextShared> {
        &self.shared
    }
}

impl Drop for DataContext {
    fn drop(&mut self) {
        if let Err(e) = self.shared.close() {
            log::warn!("[context] closing handler on drop failed: {}", e);
        }
    }
}

fn check_root(type_desc: &TypeDescriptor) -> Result<()> {
    if type_desc.is_primitive() {
        return Err(Error::malformed(format!(
            "instance type '{}' must be a composite or a collection",
            type_desc.name()
        )));
    }
    if let Some(coll) = type_desc.as_collection() {
        if let ElementCount::Field(rule) = coll.count() {
            return Err(Error::malformed(format!(
                "collection '{}' is counted by field '{}' and needs an enclosing composite",
                type_desc.name(),
                rule.field_name()
            )));
        }
    }
    Ok(())
}
