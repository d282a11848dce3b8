// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte-level I/O handlers.
//!
//! The engine only needs positioned reads and writes plus the total length;
//! every handler is interchangeable behind [`IoHandler`]:
//!
//! - [`MemoryHandler`]: growable in-memory buffer
//! - [`FileHandler`]: file on disk
//! - [`CachedHandler`]: block LRU cache wrapping any other handler
//!
//! Handlers are used from one thread at a time; the data context serializes
//! access behind a mutex.

mod cached;
mod file;
mod memory;

pub use cached::{CacheStats, CachedHandler};
pub use file::FileHandler;
pub use memory::MemoryHandler;

use std::fmt;
use std::io;

/// Positioned, synchronous access to raw bytes.
pub trait IoHandler: Send + fmt::Debug {
    /// Read up to `buf.len()` bytes starting at `offset`.
    ///
    /// Returns the number of bytes read; fewer than requested means the end
    /// of the data was reached. Reading at or past the end returns `Ok(0)`.
    fn read_bytes(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Write all of `data` starting at `offset`.
    fn write_bytes(&mut self, offset: u64, data: &[u8]) -> io::Result<()>;

    /// Total number of bytes currently available.
    fn len(&mut self) -> io::Result<u64>;

    fn is_empty(&mut self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Release underlying resources. Called once by the data context.
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl<H: IoHandler + ?Sized> IoHandler for Box<H> {
    fn read_bytes(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_bytes(offset, buf)
    }

    fn write_bytes(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        (**self).write_bytes(offset, data)
    }

    fn len(&mut self) -> io::Result<u64> {
        (**self).len()
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}
