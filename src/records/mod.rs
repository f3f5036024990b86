//! # Binary Record Codec
//!
//! Converts a [`Record`](crate::types::Record) to a self-describing byte
//! string and back. Each record is a header of per-field entries followed
//! by a body of values; header slots hold absolute pointers into the body,
//! so a decoder can reach any field without parsing the ones before it.
//!
//! ## Record Binary Layout
//!
//! ```text
//! +------------+------------------------------+------------+--------------+
//! | Class Name | Header Entries               | Terminator | Body         |
//! | (string)   | id/name, pointer [, tag] ... | (varint 0) | values ...   |
//! +------------+------------------------------+------------+--------------+
//! ```
//!
//! | Component | Encoding | Description |
//! |-----------|----------|-------------|
//! | **Class Name** | varint length + UTF-8 | empty when the record is untyped |
//! | **Named entry** | varint `len > 0` + name | 4-byte pointer + 1-byte tag |
//! | **Property entry** | varint `-(id+1)` | 4-byte pointer, plus tag unless the schema pins the type |
//! | **Terminator** | varint `0` | ends the header |
//! | **Body** | per-tag encoding | values in header order; see `value_codec` |
//!
//! A zero pointer means the field is null and has no body.
//!
//! ## Type Resolution
//!
//! The tag stored for a field is, in order of preference:
//!
//! 1. the field's explicit type override,
//! 2. the concrete type declared by the schema property,
//! 3. the tag inferred from the runtime value.
//!
//! An override that contradicts a pinned schema type is rejected, because
//! the pinned slot has no tag byte to carry it.
//!
//! ## Module Structure
//!
//! - `context`: `CodecContext`, the per-call collaborators and options
//! - `serializer`: encode engine and the `RecordSerializer` facade
//! - `deserializer`: decode engine with selective decode
//! - `value_codec`: one body encoding per type tag

pub mod context;
mod deserializer;
pub mod serializer;
mod value_codec;

#[cfg(test)]
mod tests;

pub use context::CodecContext;
pub use serializer::RecordSerializer;
