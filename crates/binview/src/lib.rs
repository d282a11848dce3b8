// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # binview - binary data-binding engine
//!
//! Describe a binary record layout once, open it over any byte source, and
//! navigate it with random access. Nothing is parsed up front: fixed-size
//! parts are addressed by offset arithmetic, and parts whose size depends on
//! earlier data (count fields, variable-size elements, "rest of the file")
//! are resolved lazily and memoized on first access.
//!
//! ## Quick Start
//!
//! ```rust
//! use binview::{CompositeBuilder, DataContext, Endianness, MemoryHandler, PrimitiveKind, Result};
//!
//! fn main() -> Result<()> {
//!     let record = CompositeBuilder::new("Record")
//!         .field("count", PrimitiveKind::I32)
//!         .sequence_field("list", PrimitiveKind::F64, "count")
//!         .build_shared()?;
//!
//!     let mut bytes = 2i32.to_be_bytes().to_vec();
//!     bytes.extend_from_slice(&1.5f64.to_be_bytes());
//!     bytes.extend_from_slice(&2.5f64.to_be_bytes());
//!
//!     let context = DataContext::new(record, MemoryHandler::new(bytes), Endianness::Big)?;
//!     let list = context.root()?.collection("list")?;
//!     assert_eq!(list.element_count()?, 2);
//!     assert_eq!(list.element::<f64>(1)?, 2.5);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  TypeDescriptor tree (primitive / composite / collection), immutable |
//! +---------------------------------------------------------------------+
//! |  DataContext: byte order + IoHandler + root instance                 |
//! +---------------------------------------------------------------------+
//! |  Instance factory -> Fixed/Variable x Composite/Collection           |
//! +---------------------------------------------------------------------+
//! |  IoHandler: MemoryHandler | FileHandler | CachedHandler<H>           |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TypeDescriptor`] | Layout description, with structural equality |
//! | [`CompositeBuilder`] | Fluent construction of composite layouts |
//! | [`DataContext`] | Open session over one byte source |
//! | [`Instance`] | Positioned composite or collection view |
//! | [`DataWriter`] | Sequential writes with explicit offsets |
//!
//! ## Concurrency
//!
//! Instances are `Send + Sync`. Resolution of one instance is serialized by a
//! per-instance mutex; once resolved, its offset table is immutable and read
//! without locking. Handler access is serialized by the context.

/// Scalar encoding with a context-wide byte order.
pub mod codec;
/// Compile-time defaults and runtime configuration builders.
pub mod config;
/// Data context (handler ownership, root instance).
pub mod context;
/// Error and result types.
pub mod error;
/// Named formats with reusable type definitions.
pub mod format;
/// Positioned instance views and the instance factory.
pub mod instance;
/// Byte-level I/O handlers.
pub mod io;
/// Instance tree printer.
pub mod printer;
/// Type descriptor model.
pub mod types;
/// Scalar values and rationals.
pub mod value;
/// Sequential writer.
pub mod writer;

pub use codec::Endianness;
pub use config::{CacheConfig, PrintConfig};
pub use context::DataContext;
pub use error::{Error, ErrorKind, Result};
pub use format::DataFormat;
pub use instance::{Field, Instance, ResolveState};
pub use io::{CacheStats, CachedHandler, FileHandler, IoHandler, MemoryHandler};
pub use printer::print_instance;
pub use types::{
    CollectionDescriptor, CompositeBuilder, CompositeDescriptor, CountRule, ElementCount,
    MemberDescriptor, PrimitiveInfo, PrimitiveKind, TypeDescriptor, TypeKind,
};
pub use value::{FromScalar, Rational, Scalar};
pub use writer::DataWriter;

/// binview version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
