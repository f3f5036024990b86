//! # ByteReader - Seekable Decode Cursor
//!
//! `ByteReader` is the decode-side view of an encoded record: a borrowed
//! byte slice plus a cursor. The cursor advances as primitives are consumed
//! and can be repositioned with `seek`, which is how the decoder jumps from
//! a header entry into the body and back again.
//!
//! ## Zero-Copy Design
//!
//! The reader borrows the input; `read_bytes` returns sub-slices of it. The
//! input may be a heap buffer or a memory-mapped file.
//!
//! ## Visit Budget
//!
//! A well-formed encoding gives every body exactly one pointer, so a decode
//! reads each input byte at most once. The reader counts the bytes it hands
//! out and refuses to read more than the input length between two calls to
//! `reset_budget`. Input whose pointers share bodies, and would otherwise
//! be decoded once per path to them, fails instead of fanning out.
//!
//! ## Error Handling
//!
//! Every read past the end of the input, and every seek outside it, is a
//! [`CodecError::MalformedInput`] carrying the offset where the problem was
//! detected.

use eyre::Result;

use crate::error::CodecError;

#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
    visited: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            visited: 0,
        }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes read since the budget was last reset.
    pub fn visited(&self) -> usize {
        self.visited
    }

    pub fn reset_budget(&mut self) {
        self.visited = 0;
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(CodecError::malformed(
                self.position,
                format!("seek to {} beyond input length {}", offset, self.data.len()),
            )
            .into());
        }
        self.position = offset;
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let start = self.position;
        let end = start
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                CodecError::malformed(
                    start,
                    format!(
                        "need {} bytes, {} remain",
                        n,
                        self.data.len().saturating_sub(start)
                    ),
                )
            })?;
        if self.visited + n > self.data.len() {
            return Err(CodecError::malformed(
                start,
                format!(
                    "decode visited more than the {} input bytes; value bodies overlap",
                    self.data.len()
                ),
            )
            .into());
        }
        self.visited += n;
        self.position = end;
        Ok(&self.data[start..end])
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }
}
