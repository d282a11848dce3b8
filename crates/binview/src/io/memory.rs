// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::IoHandler;
use std::io;

/// Handler backed by an in-memory buffer.
///
/// Writes past the end grow the buffer; any gap is zero-filled.
#[derive(Debug, Default, Clone)]
pub struct MemoryHandler {
    data: Vec<u8>,
}

impl MemoryHandler {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for MemoryHandler {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl IoHandler for MemoryHandler {
    fn read_bytes(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let Ok(start) = usize::try_from(offset) else {
            return Ok(0);
        };
        if start >= self.data.len() {
            return Ok(0);
        }
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }

    fn write_bytes(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        let start = usize::try_from(offset)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset exceeds memory"))?;
        let end = start
            .checked_add(data.len())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "write overflows"))?;
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(data);
        Ok(())
    }

    fn len(&mut self) -> io::Result<u64> {
        Ok(self.data.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_read() {
        let mut data = vec![0xCC_u8; 64];
        data[10..15].fill(0xBB);
        let mut handler = MemoryHandler::new(data);

        let mut buf = [0u8; 5];
        assert_eq!(handler.read_bytes(10, &mut buf).unwrap(), 5);
        assert_eq!(buf, [0xBB; 5]);
        assert_eq!(handler.len().unwrap(), 64);
    }

    #[test]
    fn test_memory_short_read() {
        let mut handler = MemoryHandler::new(vec![1, 2, 3]);
        let mut buf = [0u8; 8];
        assert_eq!(handler.read_bytes(1, &mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[2, 3]);
        assert_eq!(handler.read_bytes(3, &mut buf).unwrap(), 0);
        assert_eq!(handler.read_bytes(u64::MAX, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_memory_write_grows() {
        let mut handler = MemoryHandler::default();
        assert!(handler.is_empty().unwrap());
        handler.write_bytes(4, &[9, 9]).unwrap();
        assert_eq!(handler.data(), &[0, 0, 0, 0, 9, 9]);
        handler.write_bytes(0, &[1]).unwrap();
        assert_eq!(handler.into_inner(), vec![1, 0, 0, 0, 9, 9]);
    }
}
