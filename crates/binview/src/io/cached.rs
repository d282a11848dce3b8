// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Block cache over any handler, for streaming or high-latency sources.
//!
//! Reads are served from fixed-size blocks kept in an LRU cache. Writes go
//! straight through to the inner handler and evict the blocks they touch.

use super::IoHandler;
use crate::config::CacheConfig;
use lru::LruCache;
use std::io;
use std::num::NonZeroUsize;

/// Hit/miss counters of a [`CachedHandler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// LRU block cache wrapping another handler.
#[derive(Debug)]
pub struct CachedHandler<H: IoHandler> {
    inner: H,
    block_size: usize,
    blocks: LruCache<u64, Box<[u8]>>,
    len: Option<u64>,
    stats: CacheStats,
}

impl<H: IoHandler> CachedHandler<H> {
    pub fn new(inner: H) -> Self {
        Self::with_config(inner, CacheConfig::default())
    }

    pub fn with_config(inner: H, config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            block_size: config.block_size.max(1),
            blocks: LruCache::new(capacity),
            len: None,
            stats: CacheStats::default(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    pub fn into_inner(self) -> H {
        self.inner
    }

    /// Drop every cached block.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.len = None;
    }

    fn load_block(&mut self, block: u64) -> io::Result<&[u8]> {
        if self.blocks.contains(&block) {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
            let mut buf = vec![0u8; self.block_size];
            let n = self
                .inner
                .read_bytes(block * self.block_size as u64, &mut buf)?;
            buf.truncate(n);
            log::trace!("[cache] loaded block {} ({} bytes)", block, n);
            self.blocks.put(block, buf.into_boxed_slice());
        }
        self.blocks
            .get(&block)
            .map(|b| &**b)
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "cache block evicted"))
    }
}

impl<H: IoHandler> IoHandler for CachedHandler<H> {
    fn read_bytes(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let full = self.block_size;
        let block_size = full as u64;
        let mut done = 0usize;
        while done < buf.len() {
            let Some(pos) = offset.checked_add(done as u64) else {
                break;
            };
            let block = pos / block_size;
            let within = (pos % block_size) as usize;
            let data = self.load_block(block)?;
            if within >= data.len() {
                break;
            }
            let n = (data.len() - within).min(buf.len() - done);
            buf[done..done + n].copy_from_slice(&data[within..within + n]);
            done += n;
            if data.len() < full {
                break;
            }
        }
        Ok(done)
    }

    fn write_bytes(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        self.inner.write_bytes(offset, data)?;
        if data.is_empty() {
            return Ok(());
        }
        let block_size = self.block_size as u64;
        let first = offset / block_size;
        let last = offset.saturating_add(data.len() as u64 - 1) / block_size;
        for block in first..=last {
            self.blocks.pop(&block);
        }
        // A write may extend the data, which changes any short trailing block.
        let short: Vec<u64> = self
            .blocks
            .iter()
            .filter(|(_, bytes)| bytes.len() < self.block_size)
            .map(|(block, _)| *block)
            .collect();
        for block in short {
            self.blocks.pop(&block);
        }
        self.len = None;
        Ok(())
    }

    fn len(&mut self) -> io::Result<u64> {
        if let Some(len) = self.len {
            return Ok(len);
        }
        let len = self.inner.len()?;
        self.len = Some(len);
        Ok(len)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        self.clear();
        self.inner.close()
    }
}
