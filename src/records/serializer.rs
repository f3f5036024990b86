//! # Record Encoder
//!
//! Two passes over one forward-only arena. The header pass emits every
//! field's identifier and reserves a zeroed slot for it; the body pass
//! appends each non-null value and backpatches the slot with the value's
//! absolute offset (and its type byte, when the slot has one).
//!
//! ```text
//! pass 1:  class | id a [ptr ty] | id b [ptr ty] | 0
//! pass 2:                                           | body a | body b
//!                         ^ patched with offset of body a
//! ```
//!
//! Nested records reuse the same arena, so their pointers are absolute
//! offsets too and the decoder can jump to them without rebasing.

use eyre::Result;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::config::{
    DEFAULT_ARENA_CAPACITY, HEADER_TERMINATOR, POINTER_SIZE, TYPED_SLOT_SIZE, UNTYPED_SLOT_SIZE,
};
use crate::encoding::primitives::{write_signed_varint, write_string};
use crate::encoding::{ByteArena, ByteReader};
use crate::error::CodecError;
use crate::records::context::CodecContext;
use crate::records::deserializer::read_record;
use crate::records::value_codec::{patch_pointer, write_value};
use crate::types::{Field, Record, TypeTag};

/// Encodes and decodes records against one [`CodecContext`].
#[derive(Debug, Clone, Default)]
pub struct RecordSerializer<'a> {
    ctx: CodecContext<'a>,
}

impl<'a> RecordSerializer<'a> {
    pub fn new(ctx: CodecContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &CodecContext<'a> {
        &self.ctx
    }

    pub fn serialize(&self, record: &Record) -> Result<Vec<u8>> {
        let mut arena = ByteArena::with_capacity(DEFAULT_ARENA_CAPACITY);
        self.serialize_into(record, &mut arena)?;
        Ok(arena.into_bytes())
    }

    /// Appends `record` to `arena` and returns its start offset. Pointers
    /// are absolute, so decode the result with the whole arena and a reader
    /// seeked to the returned offset.
    pub fn serialize_into(&self, record: &Record, arena: &mut ByteArena) -> Result<usize> {
        write_record(&self.ctx, arena, record, 0)
    }

    /// Decodes every field into `target` and returns the final cursor.
    pub fn deserialize(&self, bytes: &[u8], target: &mut Record) -> Result<usize> {
        let mut reader = ByteReader::new(bytes);
        self.deserialize_from(&mut reader, target, None)?;
        Ok(reader.position())
    }

    /// Decodes only `fields` into `target` and returns the final cursor.
    pub fn deserialize_fields(&self, bytes: &[u8], target: &mut Record, fields: &[&str]) -> Result<usize> {
        let mut reader = ByteReader::new(bytes);
        self.deserialize_from(&mut reader, target, Some(fields))?;
        Ok(reader.position())
    }

    /// Decodes the record at the reader's cursor. Each call may read at most
    /// as many bytes as the whole input holds.
    pub fn deserialize_from(
        &self,
        reader: &mut ByteReader<'_>,
        target: &mut Record,
        projection: Option<&[&str]>,
    ) -> Result<()> {
        reader.reset_budget();
        read_record(&self.ctx, reader, target, projection, 0)
    }
}

struct HeaderSlot<'r> {
    field: &'r Field,
    offset: usize,
    pinned: Option<TypeTag>,
    linked: Option<TypeTag>,
}

fn is_omitted(field: &Field) -> bool {
    field.value().is_transient() || field.type_override() == Some(TypeTag::Transient)
}

fn field_type(slot: &HeaderSlot<'_>) -> Result<TypeTag> {
    let field = slot.field;
    let explicit = field.type_override().filter(|t| t.is_concrete());
    match (explicit, slot.pinned) {
        (Some(explicit), Some(pinned)) if explicit != pinned => Err(CodecError::unsupported(
            field.name(),
            field.value().kind_name(),
            format!("type {} conflicts with schema type {}", explicit, pinned),
        )
        .into()),
        (Some(tag), _) | (None, Some(tag)) => Ok(tag),
        (None, None) => field.value().infer_tag().ok_or_else(|| {
            CodecError::unsupported(field.name(), field.value().kind_name(), "no storable type")
                .into()
        }),
    }
}

/// Writes `record` at the arena's end and returns its start offset.
pub(crate) fn write_record(
    ctx: &CodecContext<'_>,
    arena: &mut ByteArena,
    record: &Record,
    depth: usize,
) -> Result<usize> {
    let start = write_string(arena, record.class_name().unwrap_or(""));
    let class_schema = ctx.schema().zip(record.class_name());

    let mut slots: SmallVec<[HeaderSlot<'_>; 16]> = SmallVec::new();
    for field in record.fields().filter(|f| !is_omitted(f)) {
        let property = class_schema.and_then(|(schema, class)| schema.class_property(class, field.name()));
        let slot = match property {
            Some(property) => {
                write_signed_varint(arena, -(property.id() as i64) - 1);
                let pinned = property.concrete_type();
                let size = if pinned.is_some() {
                    TYPED_SLOT_SIZE
                } else {
                    UNTYPED_SLOT_SIZE
                };
                HeaderSlot {
                    field,
                    offset: arena.allocate(size),
                    pinned,
                    linked: property.linked_type(),
                }
            }
            None => {
                write_string(arena, field.name());
                HeaderSlot {
                    field,
                    offset: arena.allocate(UNTYPED_SLOT_SIZE),
                    pinned: None,
                    linked: None,
                }
            }
        };
        slots.push(slot);
    }
    write_signed_varint(arena, HEADER_TERMINATOR);

    for slot in &slots {
        let name = slot.field.name();
        let value = slot.field.value();
        if value.is_null() {
            trace!(field = name, "null field, pointer left zero");
            continue;
        }

        let tag = field_type(slot)?;
        let pointer = write_value(ctx, arena, name, value, tag, slot.linked, depth)?;
        patch_pointer(arena, slot.offset, pointer, name, value)?;
        if slot.pinned.is_none() {
            arena.write_at(slot.offset + POINTER_SIZE, &[tag.id()])?;
        }
        trace!(field = name, tag = %tag, pointer, "encoded field");
    }

    if depth == 0 {
        debug!(
            class = record.class_name().unwrap_or(""),
            fields = slots.len(),
            bytes = arena.len() - start,
            "encoded record"
        );
    }
    Ok(start)
}
