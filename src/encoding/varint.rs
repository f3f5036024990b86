//! # Variable-Length Integer Encoding
//!
//! This module provides the base-128 varint used for every integer-like
//! scalar in a record: field name lengths, property ids, collection sizes,
//! link coordinates and INTEGER / LONG / SHORT / DATE / DATETIME values.
//!
//! ## Encoding Format
//!
//! Little-endian groups of 7 bits. The high bit of each byte is set when
//! another byte follows.
//!
//! | Value Range              | Bytes |
//! |--------------------------|-------|
//! | 0 - 127                  | 1     |
//! | 128 - 16383              | 2     |
//! | 16384 - 2097151          | 3     |
//! | ...                      | ...   |
//! | 2^63 - u64::MAX          | 10    |
//!
//! ## Signed Values
//!
//! Signed integers are written as their two's-complement `u64` bit pattern.
//! There is no zig-zag step, so every negative value occupies the full ten
//! bytes. Property ids in record headers rely on this: they are written as
//! `-(id + 1)` and are therefore always distinguishable from name lengths.
//!
//! ## Boundary Values
//!
//! - 127: Maximum 1-byte value
//! - 128: Minimum 2-byte value
//! - 16383: Maximum 2-byte value
//! - 16384: Minimum 3-byte value
//! - u64::MAX: Maximum 10-byte value
//!
//! ## Usage Example
//!
//! ```rust
//! use docbin::encoding::varint::{decode_varint, encode_varint, varint_len};
//!
//! let mut buf = [0u8; 10];
//! let written = encode_varint(300, &mut buf);
//! assert_eq!(written, 2);
//! assert_eq!(varint_len(300), 2);
//!
//! let (value, read) = decode_varint(&buf).unwrap();
//! assert_eq!(value, 300);
//! assert_eq!(read, 2);
//! ```
//!
//! ## Error Handling
//!
//! `decode_varint` returns `eyre::Result` with descriptive error messages:
//! - Empty buffer: "empty buffer for varint decode"
//! - Truncated encoding: "truncated varint after N bytes"
//! - Overlong encoding: "varint exceeds 10 bytes"

use eyre::{bail, ensure, Result};

use crate::config::MAX_VARINT_LEN;

const CONTINUATION: u8 = 0x80;
const PAYLOAD_MASK: u8 = 0x7F;

pub fn varint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

pub fn signed_varint_len(value: i64) -> usize {
    varint_len(value as u64)
}

pub fn encode_varint(mut value: u64, buf: &mut [u8]) -> usize {
    let mut written = 0;
    loop {
        let byte = (value as u8) & PAYLOAD_MASK;
        value >>= 7;
        if value == 0 {
            buf[written] = byte;
            return written + 1;
        }
        buf[written] = byte | CONTINUATION;
        written += 1;
    }
}

pub fn encode_signed_varint(value: i64, buf: &mut [u8]) -> usize {
    encode_varint(value as u64, buf)
}

pub fn decode_varint(buf: &[u8]) -> Result<(u64, usize)> {
    ensure!(!buf.is_empty(), "empty buffer for varint decode");

    let mut value: u64 = 0;
    for (idx, &byte) in buf.iter().enumerate() {
        if idx == MAX_VARINT_LEN {
            bail!("varint exceeds {} bytes", MAX_VARINT_LEN);
        }
        let payload = (byte & PAYLOAD_MASK) as u64;
        if idx == MAX_VARINT_LEN - 1 && payload > 1 {
            bail!("varint overflows 64 bits");
        }
        value |= payload << (idx * 7);
        if byte & CONTINUATION == 0 {
            return Ok((value, idx + 1));
        }
    }

    bail!("truncated varint after {} bytes", buf.len())
}

pub fn decode_signed_varint(buf: &[u8]) -> Result<(i64, usize)> {
    let (value, len) = decode_varint(buf)?;
    Ok((value as i64, len))
}
