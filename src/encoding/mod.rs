//! # Encoding Module
//!
//! Low-level building blocks for the record codec:
//!
//! - **Byte arena**: growable, offset-addressed encode buffer with backpatching
//! - **Byte reader**: borrowed decode cursor with seek/restore
//! - **Varint encoding**: base-128 integers for lengths, ids and scalars
//! - **Primitives**: fixed-width literals, strings and binary blobs

pub mod arena;
pub mod primitives;
pub mod reader;
pub mod varint;

pub use arena::ByteArena;
pub use reader::ByteReader;
pub use varint::{decode_varint, encode_varint, varint_len};
