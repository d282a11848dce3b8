// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! binview configuration
//!
//! - **Static**: compile-time defaults below. **Never hardcode them elsewhere.**
//! - **Runtime**: [`CacheConfig`] for [`CachedHandler`](crate::io::CachedHandler)
//!   and [`PrintConfig`] for [`print_instance`](crate::print_instance), each
//!   with a fluent builder.

use crate::codec::Endianness;

/// Byte order used when a format does not specify one.
pub const DEFAULT_ENDIANNESS: Endianness = Endianness::Big;

/// Block size of the handler cache (64 KiB).
pub const DEFAULT_CACHE_BLOCK_SIZE: usize = 64 * 1024;

/// Number of blocks kept by the handler cache (16 MiB with the default block size).
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Collection elements printed before eliding the rest.
pub const DEFAULT_PRINT_MAX_ELEMENTS: usize = 16;

/// Spaces per nesting level in printed output.
pub const DEFAULT_PRINT_INDENT: usize = 2;

/// Block cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Size of one cached block in bytes.
    pub block_size: usize,
    /// Maximum number of cached blocks.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_CACHE_BLOCK_SIZE,
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl CacheConfig {
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }
}

/// Builder for [`CacheConfig`]. Zero sizes are clamped to 1.
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    block_size: Option<usize>,
    capacity: Option<usize>,
}

impl CacheConfigBuilder {
    /// Set the block size in bytes.
    pub fn block_size(mut self, bytes: usize) -> Self {
        self.block_size = Some(bytes);
        self
    }

    /// Set the number of cached blocks.
    pub fn capacity(mut self, blocks: usize) -> Self {
        self.capacity = Some(blocks);
        self
    }

    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();
        CacheConfig {
            block_size: self.block_size.unwrap_or(defaults.block_size).max(1),
            capacity: self.capacity.unwrap_or(defaults.capacity).max(1),
        }
    }
}

/// Printer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintConfig {
    /// Elements printed per collection; the rest is summarized.
    pub max_elements: usize,
    /// Spaces per nesting level.
    pub indent: usize,
    /// Prefix every line with the absolute byte position.
    pub show_offsets: bool,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            max_elements: DEFAULT_PRINT_MAX_ELEMENTS,
            indent: DEFAULT_PRINT_INDENT,
            show_offsets: false,
        }
    }
}

impl PrintConfig {
    pub fn builder() -> PrintConfigBuilder {
        PrintConfigBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct PrintConfigBuilder {
    max_elements: Option<usize>,
    indent: Option<usize>,
    show_offsets: Option<bool>,
}

impl PrintConfigBuilder {
    pub fn max_elements(mut self, n: usize) -> Self {
        self.max_elements = Some(n);
        self
    }

    pub fn indent(mut self, spaces: usize) -> Self {
        self.indent = Some(spaces);
        self
    }

    pub fn show_offsets(mut self, show: bool) -> Self {
        self.show_offsets = Some(show);
        self
    }

    pub fn build(self) -> PrintConfig {
        let defaults = PrintConfig::default();
        PrintConfig {
            max_elements: self.max_elements.unwrap_or(defaults.max_elements),
            indent: self.indent.unwrap_or(defaults.indent),
            show_offsets: self.show_offsets.unwrap_or(defaults.show_offsets),
        }
    }
}
