//! # docbin - Binary Record Codec for Document Stores
//!
//! docbin converts schema-flexible document records to a compact,
//! self-describing byte format and back. A record carries an optional class
//! name and an ordered set of named fields; a field holds a scalar, a nested
//! record, a container or a link to another record.
//!
//! - **Random field access**: header slots point straight at value bodies
//! - **Schema optional**: fields are named inline or by a global property id
//! - **Selective decode**: read only the fields a caller asks for
//!
//! ## Quick Start
//!
//! ```
//! use docbin::{decode, encode, CodecContext, Record, Value};
//!
//! let ctx = CodecContext::new();
//! let record = Record::with_class("Person")
//!     .with("name", "Ada")
//!     .with("born", 1815i32);
//!
//! let bytes = encode(&record, &ctx)?;
//!
//! let mut decoded = Record::new();
//! decode(&bytes, &mut decoded, None, &ctx)?;
//! assert_eq!(decoded.field("name"), Some(&Value::from("Ada")));
//! # Ok::<(), eyre::Report>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   encode / decode, RecordSerializer  │
//! ├─────────────────────────────────────┤
//! │  Header/Body engine │ Value codecs   │
//! ├─────────────────────┼───────────────┤
//! │ Schema │ Links │ Type registry       │
//! ├─────────────────────────────────────┤
//! │  Byte arena / reader, varints        │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`encoding`]: byte arena, bounded reader, varints and literals
//! - [`types`]: `TypeTag`, `Value`, `Record`, `RecordId`
//! - [`records`]: the header/body codec and per-tag value codecs
//! - [`schema`]: read-only schema snapshots and an in-memory catalog
//! - [`links`]: link resolution through a caller-supplied resolver
//! - [`registry`]: factories for custom and serializable types
//! - [`config`]: wire constants and `CodecOptions`
//! - [`error`]: the `CodecError` taxonomy

pub mod config;
pub mod encoding;
pub mod error;
pub mod links;
pub mod records;
pub mod registry;
pub mod schema;
pub mod types;

pub use config::CodecOptions;
pub use encoding::ByteArena;
pub use error::{codec_error, CodecError};
pub use links::{LinkResolver, LinkTarget, PersistError};
pub use records::{CodecContext, RecordSerializer};
pub use registry::{DocumentSerializable, StreamSerializable, TypeRegistry};
pub use schema::{MemorySchema, SchemaProperty, SchemaSnapshot};
pub use types::{Field, Identifiable, Record, RecordId, TypeTag, Value};

use eyre::Result;

/// Encodes `record` into a fresh byte vector.
pub fn encode(record: &Record, ctx: &CodecContext<'_>) -> Result<Vec<u8>> {
    RecordSerializer::new(ctx.clone()).serialize(record)
}

/// Decodes `bytes` into `target`, optionally restricted to `fields`, and
/// returns the cursor position after the furthest byte consumed.
pub fn decode(
    bytes: &[u8],
    target: &mut Record,
    fields: Option<&[&str]>,
    ctx: &CodecContext<'_>,
) -> Result<usize> {
    let serializer = RecordSerializer::new(ctx.clone());
    match fields {
        Some(fields) => serializer.deserialize_fields(bytes, target, fields),
        None => serializer.deserialize(bytes, target),
    }
}
