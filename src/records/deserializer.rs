//! # Record Decoder
//!
//! Mirror of the encoder: a single linear walk of the header with one
//! save/jump/restore per decoded field. The walk tracks a high-water mark,
//! the furthest byte consumed by any value body, and leaves the cursor
//! there when the header ends earlier. A caller reading several records
//! back to back therefore resumes after the last body, not after the last
//! header slot.
//!
//! ## Header Entries
//!
//! | Leading varint | Meaning | Slot |
//! |----------------|---------|------|
//! | `0` | end of header | - |
//! | `n > 0` | field name of `n` bytes | pointer + type |
//! | `n < 0` | property id `-n - 1` | pointer (+ type unless pinned) |
//!
//! ## Selective Decode
//!
//! With a projection, fields outside it are stepped over without visiting
//! their bodies, and the walk stops once every requested field is bound.
//! Fields already present on the target are skipped the same way, which
//! lets a caller fill a partially decoded record in several calls.

use eyre::Result;
use tracing::{debug, trace};

use crate::config::{NULL_POINTER, TYPED_SLOT_SIZE, UNTYPED_SLOT_SIZE};
use crate::encoding::primitives::{read_i32_literal, read_i32_varint, read_str};
use crate::encoding::ByteReader;
use crate::error::CodecError;
use crate::records::context::CodecContext;
use crate::records::value_codec::{pointer_target, read_tag, read_value};
use crate::types::{Record, TypeTag, Value};

struct HeaderEntry {
    name: String,
    pinned: Option<TypeTag>,
}

fn read_header_entry(
    ctx: &CodecContext<'_>,
    reader: &mut ByteReader<'_>,
) -> Result<Option<HeaderEntry>> {
    let entry_offset = reader.position();
    let len = read_i32_varint(reader)?;

    if len == 0 {
        return Ok(None);
    }

    if len > 0 {
        let raw = reader.read_bytes(len as usize)?;
        let name = std::str::from_utf8(raw)
            .map_err(|_| CodecError::malformed(entry_offset, "field name is not valid UTF-8"))?;
        return Ok(Some(HeaderEntry {
            name: name.to_string(),
            pinned: None,
        }));
    }

    let id = -(len as i64) - 1;
    let unresolved = || CodecError::UnresolvedSchemaReference {
        property_id: id as i32,
        offset: entry_offset,
    };
    let schema = ctx.schema().ok_or_else(unresolved)?;
    let property = schema.property_by_id(id as i32).ok_or_else(unresolved)?;
    Ok(Some(HeaderEntry {
        name: property.name().to_string(),
        pinned: property.concrete_type(),
    }))
}

/// Decodes the record at the reader's cursor into `target`.
pub(crate) fn read_record(
    ctx: &CodecContext<'_>,
    reader: &mut ByteReader<'_>,
    target: &mut Record,
    projection: Option<&[&str]>,
    depth: usize,
) -> Result<()> {
    let class_name = read_str(reader)?;
    if !class_name.is_empty() {
        target.set_class_name(class_name);
    }

    let mut last = 0usize;
    let mut bound = 0usize;

    while let Some(entry) = read_header_entry(ctx, reader)? {
        let slot_size = if entry.pinned.is_some() {
            TYPED_SLOT_SIZE
        } else {
            UNTYPED_SLOT_SIZE
        };

        let wanted = projection.map_or(true, |fields| fields.contains(&entry.name.as_str()));
        if !wanted || target.contains_field(&entry.name) {
            trace!(field = %entry.name, "skipped header entry");
            reader.skip(slot_size)?;
            continue;
        }

        let slot_offset = reader.position();
        let pointer = read_i32_literal(reader)?;
        let tag = match entry.pinned {
            Some(tag) => tag,
            None => read_tag(reader)?,
        };

        if pointer == NULL_POINTER {
            target.bind_decoded(entry.name, Value::Null, None);
        } else {
            let header_cursor = reader.position();
            reader.seek(pointer_target(pointer, slot_offset)?)?;
            let value = read_value(ctx, reader, tag, depth)?;
            last = last.max(reader.position());
            reader.seek(header_cursor)?;
            trace!(field = %entry.name, tag = %tag, pointer, "decoded field");
            target.bind_decoded(entry.name, value, Some(tag));
        }

        if let Some(fields) = projection {
            bound += 1;
            if bound >= fields.len() {
                break;
            }
        }
    }

    if last > reader.position() {
        reader.seek(last)?;
    }

    if depth == 0 {
        debug!(
            class = target.class_name().unwrap_or(""),
            fields = target.len(),
            cursor = reader.position(),
            "decoded record"
        );
    }
    Ok(())
}
