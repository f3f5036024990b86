//! # Primitive Codecs
//!
//! Scalar encode/decode routines shared by the header and value codecs.
//! Writers append to a [`ByteArena`] and return the offset where the value
//! starts; readers consume from a [`ByteReader`].
//!
//! ## Formats
//!
//! | Primitive | Encoding |
//! |-----------|----------|
//! | varint | base-128, see [`crate::encoding::varint`] |
//! | i32 / i64 literal | 4 / 8 bytes big-endian |
//! | f32 / f64 | IEEE-754 bit pattern as a big-endian literal |
//! | string | varint byte length + UTF-8 bytes |
//! | binary | varint byte length + raw bytes |
//!
//! Fixed-width literals go through `zerocopy::big_endian` wrappers so the
//! byte order lives in the type rather than in shift arithmetic.

use eyre::Result;
use zerocopy::big_endian::{I32, I64};
use zerocopy::{FromBytes, IntoBytes};

use crate::config::MAX_VARINT_LEN;
use crate::encoding::arena::ByteArena;
use crate::encoding::reader::ByteReader;
use crate::encoding::varint::{decode_varint, encode_varint};
use crate::error::CodecError;

pub fn write_varint(arena: &mut ByteArena, value: u64) -> usize {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_varint(value, &mut buf);
    arena.append(&buf[..len])
}

pub fn write_signed_varint(arena: &mut ByteArena, value: i64) -> usize {
    write_varint(arena, value as u64)
}

pub fn write_u8(arena: &mut ByteArena, value: u8) -> usize {
    arena.append(&[value])
}

pub fn write_i32_literal(arena: &mut ByteArena, value: i32) -> usize {
    arena.append(I32::new(value).as_bytes())
}

/// Overwrites a previously reserved 4-byte slot.
pub fn patch_i32_literal(arena: &mut ByteArena, offset: usize, value: i32) -> Result<()> {
    arena.write_at(offset, I32::new(value).as_bytes())
}

pub fn write_i64_literal(arena: &mut ByteArena, value: i64) -> usize {
    arena.append(I64::new(value).as_bytes())
}

pub fn write_f32(arena: &mut ByteArena, value: f32) -> usize {
    write_i32_literal(arena, value.to_bits() as i32)
}

pub fn write_f64(arena: &mut ByteArena, value: f64) -> usize {
    write_i64_literal(arena, value.to_bits() as i64)
}

pub fn write_binary(arena: &mut ByteArena, bytes: &[u8]) -> usize {
    let offset = write_varint(arena, bytes.len() as u64);
    arena.append(bytes);
    offset
}

pub fn write_string(arena: &mut ByteArena, value: &str) -> usize {
    write_binary(arena, value.as_bytes())
}

pub fn read_varint(reader: &mut ByteReader<'_>) -> Result<u64> {
    let start = reader.position();
    let (value, len) =
        decode_varint(reader.remaining()).map_err(|e| CodecError::malformed(start, e.to_string()))?;
    reader.skip(len)?;
    Ok(value)
}

pub fn read_signed_varint(reader: &mut ByteReader<'_>) -> Result<i64> {
    Ok(read_varint(reader)? as i64)
}

pub fn read_i32_varint(reader: &mut ByteReader<'_>) -> Result<i32> {
    let start = reader.position();
    let value = read_signed_varint(reader)?;
    i32::try_from(value)
        .map_err(|_| CodecError::malformed(start, format!("varint {} overflows i32", value)).into())
}

pub fn read_i16_varint(reader: &mut ByteReader<'_>) -> Result<i16> {
    let start = reader.position();
    let value = read_signed_varint(reader)?;
    i16::try_from(value)
        .map_err(|_| CodecError::malformed(start, format!("varint {} overflows i16", value)).into())
}

/// Reads a non-negative length or element count.
pub fn read_length(reader: &mut ByteReader<'_>) -> Result<usize> {
    let start = reader.position();
    let value = read_i32_varint(reader)?;
    usize::try_from(value)
        .map_err(|_| CodecError::malformed(start, format!("negative length {}", value)).into())
}

pub fn read_i32_literal(reader: &mut ByteReader<'_>) -> Result<i32> {
    let start = reader.position();
    let bytes = reader.read_bytes(4)?;
    I32::read_from_bytes(bytes)
        .map(|v| v.get())
        .map_err(|_| CodecError::malformed(start, "short i32 literal").into())
}

pub fn read_i64_literal(reader: &mut ByteReader<'_>) -> Result<i64> {
    let start = reader.position();
    let bytes = reader.read_bytes(8)?;
    I64::read_from_bytes(bytes)
        .map(|v| v.get())
        .map_err(|_| CodecError::malformed(start, "short i64 literal").into())
}

pub fn read_f32(reader: &mut ByteReader<'_>) -> Result<f32> {
    Ok(f32::from_bits(read_i32_literal(reader)? as u32))
}

pub fn read_f64(reader: &mut ByteReader<'_>) -> Result<f64> {
    Ok(f64::from_bits(read_i64_literal(reader)? as u64))
}

pub fn read_binary<'a>(reader: &mut ByteReader<'a>) -> Result<&'a [u8]> {
    let len = read_length(reader)?;
    reader.read_bytes(len)
}

pub fn read_str<'a>(reader: &mut ByteReader<'a>) -> Result<&'a str> {
    let start = reader.position();
    let bytes = read_binary(reader)?;
    std::str::from_utf8(bytes)
        .map_err(|e| CodecError::malformed(start, format!("invalid UTF-8 in string: {}", e)).into())
}

pub fn read_string(reader: &mut ByteReader<'_>) -> Result<String> {
    read_str(reader).map(str::to_owned)
}
