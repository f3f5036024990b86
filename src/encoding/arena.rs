//! # ByteArena - Forward-Allocated Encode Buffer
//!
//! `ByteArena` is the single growable buffer an encode call writes into.
//! Space is handed out strictly forward; callers receive the offset of each
//! reserved region and may later overwrite it with `write_at`. That pair of
//! operations is how header pointer slots are reserved before the value
//! bodies exist and backpatched once their offsets are known.
//!
//! ## Layout Discipline
//!
//! ```text
//! allocate(5) -> 7           write_at(7, ptr)
//!        │                          │
//!        ▼                          ▼
//! +---------+-----------+  +---------+-----------+-----------+
//! | 0..7    | 7..12 (0) |  | 0..7    | 7..12 ptr | body ...  |
//! +---------+-----------+  +---------+-----------+-----------+
//! ```
//!
//! - Allocated bytes are zeroed, so an untouched pointer slot reads as the
//!   null pointer.
//! - `write_at` never extends the buffer; it only overwrites bytes that were
//!   previously allocated.
//! - Growth doubles capacity, giving amortized O(1) allocation.

use eyre::{ensure, Result};

use crate::config::DEFAULT_ARENA_CAPACITY;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteArena {
    bytes: Vec<u8>,
}

impl ByteArena {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_ARENA_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Reserves `n` zeroed bytes at the end of the arena and returns the
    /// offset of the first one.
    pub fn allocate(&mut self, n: usize) -> usize {
        let offset = self.bytes.len();
        let needed = offset + n;
        if needed > self.bytes.capacity() {
            let grown = (self.bytes.capacity() * 2).max(needed);
            self.bytes.reserve_exact(grown - offset);
        }
        self.bytes.resize(needed, 0);
        offset
    }

    /// Appends `data` and returns the offset it was written at.
    pub fn append(&mut self, data: &[u8]) -> usize {
        let offset = self.allocate(data.len());
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        offset
    }

    /// Overwrites previously allocated bytes starting at `offset`.
    pub fn write_at(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let end = offset
            .checked_add(data.len())
            .ok_or_else(|| eyre::eyre!("write_at offset {} overflows", offset))?;
        ensure!(
            end <= self.bytes.len(),
            "write_at range {}..{} exceeds arena length {}",
            offset,
            end,
            self.bytes.len()
        );
        self.bytes[offset..end].copy_from_slice(data);
        Ok(())
    }
}
