//! # Value Kind Codecs
//!
//! One body encoding per [`TypeTag`]. Both directions are a single
//! exhaustive match over the tag, so a new tag cannot be added without
//! deciding how it is written and read.
//!
//! ## Body Layouts
//!
//! | Tag | Body |
//! |-----|------|
//! | `INTEGER` `LONG` `SHORT` | signed varint |
//! | `DOUBLE` `FLOAT` | 8 / 4 byte big-endian IEEE-754 bits |
//! | `BYTE` `BOOLEAN` | 1 byte |
//! | `DATETIME` | varint epoch millis |
//! | `DATE` | varint day number in the configured time zone |
//! | `DECIMAL` | scale `i32` + length `i32` + unscaled two's-complement bytes |
//! | `STRING` `BINARY` `LINKBAG` | varint length + bytes |
//! | `EMBEDDED` | nested record (header + body) |
//! | `EMBEDDEDLIST` `EMBEDDEDSET` | count, `ANY`, then `tag + body` per element |
//! | `EMBEDDEDMAP` | count, `STRING key + pointer + tag` per entry, then bodies |
//! | `LINK` | varint cluster + varint position |
//! | `LINKLIST` `LINKSET` | count, then one link per element |
//! | `LINKMAP` | count, then `STRING key + link` per entry |
//! | `CUSTOM` | type name string + binary stream |
//!
//! Absent link elements are written as the null-link sentinel `#-2:-1` and
//! read back as `None`. Pointers inside maps are absolute offsets into the
//! same buffer as the enclosing record.

use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use eyre::Result;
use num_bigint::BigInt;
use smallvec::SmallVec;

use crate::config::{MILLIS_PER_DAY, NULL_POINTER, POINTER_SIZE, SERIALIZABLE_CLASS_FIELD, UNTYPED_SLOT_SIZE};
use crate::encoding::primitives::{
    patch_i32_literal, read_binary, read_f32, read_f64, read_i16_varint, read_i32_literal,
    read_i32_varint, read_length, read_signed_varint, read_str, read_string, write_binary,
    write_f32, write_f64, write_i32_literal, write_signed_varint, write_string, write_u8,
    write_varint,
};
use crate::encoding::{ByteArena, ByteReader};
use crate::error::CodecError;
use crate::links::{resolve_link, LinkTarget};
use crate::records::context::CodecContext;
use crate::records::deserializer::read_record;
use crate::records::serializer::write_record;
use crate::types::{Identifiable, Record, RecordId, TypeTag, Value};

/// Enters one container level, failing past the configured limit.
pub(crate) fn descend(ctx: &CodecContext<'_>, depth: usize) -> Result<usize> {
    let next = depth + 1;
    let limit = ctx.options().max_depth();
    if next > limit {
        return Err(CodecError::NestingTooDeep { depth: next, limit }.into());
    }
    Ok(next)
}

fn mismatch(field: &str, value: &Value, tag: TypeTag) -> eyre::Report {
    CodecError::unsupported(field, value.kind_name(), format!("value cannot be written as {}", tag))
        .into()
}

/// Writes a body offset into a reserved pointer slot.
pub(crate) fn patch_pointer(
    arena: &mut ByteArena,
    slot: usize,
    pointer: usize,
    field: &str,
    value: &Value,
) -> Result<()> {
    let pointer = i32::try_from(pointer).map_err(|_| {
        CodecError::unsupported(field, value.kind_name(), "body offset exceeds the pointer range")
    })?;
    patch_i32_literal(arena, slot, pointer)
}

pub(crate) fn pointer_target(pointer: i32, slot_offset: usize) -> Result<usize> {
    usize::try_from(pointer).map_err(|_| {
        CodecError::malformed(slot_offset, format!("negative body pointer {}", pointer)).into()
    })
}

pub(crate) fn read_tag(reader: &mut ByteReader<'_>) -> Result<TypeTag> {
    let offset = reader.position();
    let id = reader.read_u8()?;
    TypeTag::from_id(id)
        .ok_or_else(|| CodecError::malformed(offset, format!("unknown type tag {}", id)).into())
}

fn integer_in_range(field: &str, value: &Value, tag: TypeTag) -> Result<i64> {
    let v = value.as_i64().ok_or_else(|| mismatch(field, value, tag))?;
    let fits = match tag {
        TypeTag::Short => i16::try_from(v).is_ok(),
        TypeTag::Integer => i32::try_from(v).is_ok(),
        _ => true,
    };
    if !fits {
        return Err(CodecError::unsupported(
            field,
            value.kind_name(),
            format!("{} is out of range for {}", v, tag),
        )
        .into());
    }
    Ok(v)
}

/// Appends the body of `value` under `tag` and returns its start offset.
pub(crate) fn write_value(
    ctx: &CodecContext<'_>,
    arena: &mut ByteArena,
    field: &str,
    value: &Value,
    tag: TypeTag,
    linked: Option<TypeTag>,
    depth: usize,
) -> Result<usize> {
    let offset = match tag {
        TypeTag::Integer | TypeTag::Long | TypeTag::Short => {
            let v = integer_in_range(field, value, tag)?;
            write_signed_varint(arena, v)
        }
        TypeTag::String => match value {
            Value::String(s) => write_string(arena, s),
            other => return Err(mismatch(field, other, tag)),
        },
        TypeTag::Double => match value {
            Value::Double(v) => write_f64(arena, *v),
            Value::Float(v) => write_f64(arena, *v as f64),
            other => return Err(mismatch(field, other, tag)),
        },
        TypeTag::Float => match value {
            Value::Float(v) => write_f32(arena, *v),
            other => return Err(mismatch(field, other, tag)),
        },
        TypeTag::Byte => match value {
            Value::Byte(v) => write_u8(arena, *v as u8),
            other => return Err(mismatch(field, other, tag)),
        },
        TypeTag::Boolean => match value {
            Value::Boolean(v) => write_u8(arena, u8::from(*v)),
            other => return Err(mismatch(field, other, tag)),
        },
        TypeTag::DateTime => match value {
            Value::DateTime(ms) | Value::Date(ms) | Value::Long(ms) => write_signed_varint(arena, *ms),
            other => return Err(mismatch(field, other, tag)),
        },
        TypeTag::Date => match value {
            Value::Date(ms) | Value::DateTime(ms) | Value::Long(ms) => write_date(ctx, arena, *ms),
            other => return Err(mismatch(field, other, tag)),
        },
        TypeTag::Embedded => match value {
            Value::Embedded(record) => {
                let next = descend(ctx, depth)?;
                write_record(ctx, arena, record, next)?
            }
            Value::Serializable(obj) => {
                let next = descend(ctx, depth)?;
                let mut record = obj.to_record();
                record.set(SERIALIZABLE_CLASS_FIELD, obj.class_name());
                write_record(ctx, arena, &record, next)?
            }
            other => return Err(mismatch(field, other, tag)),
        },
        TypeTag::EmbeddedList | TypeTag::EmbeddedSet => match value {
            Value::EmbeddedList(items) | Value::EmbeddedSet(items) => {
                write_embedded_collection(ctx, arena, field, items, linked, depth)?
            }
            other => return Err(mismatch(field, other, tag)),
        },
        TypeTag::EmbeddedMap => match value {
            Value::EmbeddedMap(map) => write_embedded_map(ctx, arena, field, map, depth)?,
            other => return Err(mismatch(field, other, tag)),
        },
        TypeTag::Decimal => match value {
            Value::Decimal(d) => write_decimal(arena, field, d)?,
            other => return Err(mismatch(field, other, tag)),
        },
        TypeTag::Binary => match value {
            Value::Binary(bytes) => write_binary(arena, bytes),
            other => return Err(mismatch(field, other, tag)),
        },
        TypeTag::LinkBag => match value {
            Value::LinkBag(bytes) => write_binary(arena, bytes),
            other => return Err(mismatch(field, other, tag)),
        },
        TypeTag::Link => match value {
            Value::Link(target) => write_link(ctx, arena, target.into())?,
            Value::Embedded(record) => write_link(ctx, arena, LinkTarget::Record(&**record))?,
            other => return Err(mismatch(field, other, tag)),
        },
        TypeTag::LinkList | TypeTag::LinkSet => match value {
            Value::LinkList(items) | Value::LinkSet(items) => {
                let offset = write_varint(arena, items.len() as u64);
                for item in items {
                    write_link_element(ctx, arena, item.as_ref())?;
                }
                offset
            }
            other => return Err(mismatch(field, other, tag)),
        },
        TypeTag::LinkMap => match value {
            Value::LinkMap(map) => {
                let offset = write_varint(arena, map.len() as u64);
                for (key, item) in map {
                    write_u8(arena, TypeTag::String.id());
                    write_string(arena, key);
                    write_link_element(ctx, arena, item.as_ref())?;
                }
                offset
            }
            other => return Err(mismatch(field, other, tag)),
        },
        TypeTag::Custom => match value {
            Value::Custom(obj) => {
                let name = obj.type_name();
                if !ctx.registry().is_some_and(|r| r.has_custom(name)) {
                    return Err(CodecError::unsupported(
                        field,
                        value.kind_name(),
                        format!("custom type '{}' is not registered", name),
                    )
                    .into());
                }
                let offset = write_string(arena, name);
                write_binary(arena, &obj.to_stream());
                offset
            }
            other => return Err(mismatch(field, other, tag)),
        },
        TypeTag::Transient | TypeTag::Any => {
            return Err(CodecError::unsupported(
                field,
                value.kind_name(),
                format!("{} has no body encoding", tag),
            )
            .into())
        }
    };
    Ok(offset)
}

fn write_date(ctx: &CodecContext<'_>, arena: &mut ByteArena, millis: i64) -> usize {
    let zone = ctx.options().time_zone().offset_millis(millis);
    let days = millis.saturating_add(zone).div_euclid(MILLIS_PER_DAY);
    write_signed_varint(arena, days)
}

fn write_decimal(arena: &mut ByteArena, field: &str, value: &BigDecimal) -> Result<usize> {
    let (unscaled, scale) = value.as_bigint_and_exponent();
    let scale = i32::try_from(scale)
        .map_err(|_| CodecError::unsupported(field, "decimal", format!("scale {} exceeds 32 bits", scale)))?;
    let bytes = unscaled.to_signed_bytes_be();
    let len = i32::try_from(bytes.len())
        .map_err(|_| CodecError::unsupported(field, "decimal", "unscaled value is too large"))?;

    let offset = write_i32_literal(arena, scale);
    write_i32_literal(arena, len);
    arena.append(&bytes);
    Ok(offset)
}

fn write_rid(arena: &mut ByteArena, rid: RecordId) -> usize {
    let offset = write_signed_varint(arena, rid.cluster() as i64);
    write_signed_varint(arena, rid.position());
    offset
}

fn write_link(ctx: &CodecContext<'_>, arena: &mut ByteArena, target: LinkTarget<'_>) -> Result<usize> {
    let rid = resolve_link(target, ctx.resolver(), ctx.options().proxy_storage())?;
    Ok(write_rid(arena, rid))
}

fn write_link_element(
    ctx: &CodecContext<'_>,
    arena: &mut ByteArena,
    item: Option<&Identifiable>,
) -> Result<usize> {
    match item {
        Some(target) => write_link(ctx, arena, target.into()),
        None => Ok(write_rid(arena, RecordId::NULL_LINK)),
    }
}

fn write_embedded_collection(
    ctx: &CodecContext<'_>,
    arena: &mut ByteArena,
    field: &str,
    items: &[Value],
    linked: Option<TypeTag>,
    depth: usize,
) -> Result<usize> {
    let next = descend(ctx, depth)?;
    let kept: SmallVec<[&Value; 16]> = items.iter().filter(|v| !v.is_transient()).collect();
    let linked = linked.filter(|t| t.is_concrete());

    let offset = write_varint(arena, kept.len() as u64);
    write_u8(arena, TypeTag::Any.id());
    for item in kept {
        if item.is_null() {
            write_u8(arena, TypeTag::Any.id());
            continue;
        }
        let tag = match linked {
            Some(tag) => tag,
            None => item.infer_tag().ok_or_else(|| {
                CodecError::unsupported(field, item.kind_name(), "collection element has no storable type")
            })?,
        };
        write_u8(arena, tag.id());
        write_value(ctx, arena, field, item, tag, None, next)?;
    }
    Ok(offset)
}

fn write_embedded_map(
    ctx: &CodecContext<'_>,
    arena: &mut ByteArena,
    field: &str,
    map: &BTreeMap<String, Value>,
    depth: usize,
) -> Result<usize> {
    let next = descend(ctx, depth)?;
    let entries: SmallVec<[(&String, &Value); 16]> =
        map.iter().filter(|(_, v)| !v.is_transient()).collect();

    let offset = write_varint(arena, entries.len() as u64);
    let mut slots: SmallVec<[usize; 16]> = SmallVec::with_capacity(entries.len());
    for (key, _) in &entries {
        write_u8(arena, TypeTag::String.id());
        write_string(arena, key);
        slots.push(arena.allocate(UNTYPED_SLOT_SIZE));
    }

    for ((_, value), slot) in entries.iter().zip(&slots) {
        if value.is_null() {
            continue;
        }
        let tag = value.infer_tag().ok_or_else(|| {
            CodecError::unsupported(field, value.kind_name(), "map value has no storable type")
        })?;
        let pointer = write_value(ctx, arena, field, value, tag, None, next)?;
        patch_pointer(arena, *slot, pointer, field, value)?;
        arena.write_at(slot + POINTER_SIZE, &[tag.id()])?;
    }
    Ok(offset)
}

/// Decodes one body of kind `tag` starting at the reader's cursor.
pub(crate) fn read_value(
    ctx: &CodecContext<'_>,
    reader: &mut ByteReader<'_>,
    tag: TypeTag,
    depth: usize,
) -> Result<Value> {
    let value = match tag {
        TypeTag::Integer => Value::Integer(read_i32_varint(reader)?),
        TypeTag::Long => Value::Long(read_signed_varint(reader)?),
        TypeTag::Short => Value::Short(read_i16_varint(reader)?),
        TypeTag::String => Value::String(read_string(reader)?),
        TypeTag::Double => Value::Double(read_f64(reader)?),
        TypeTag::Float => Value::Float(read_f32(reader)?),
        TypeTag::Byte => Value::Byte(reader.read_u8()? as i8),
        TypeTag::Boolean => Value::Boolean(reader.read_u8()? == 1),
        TypeTag::DateTime => Value::DateTime(read_signed_varint(reader)?),
        TypeTag::Date => read_date(ctx, reader)?,
        TypeTag::Embedded => read_embedded(ctx, reader, depth)?,
        TypeTag::EmbeddedList => Value::EmbeddedList(read_embedded_collection(ctx, reader, depth)?),
        TypeTag::EmbeddedSet => Value::EmbeddedSet(read_embedded_collection(ctx, reader, depth)?),
        TypeTag::EmbeddedMap => Value::EmbeddedMap(read_embedded_map(ctx, reader, depth)?),
        TypeTag::Decimal => Value::Decimal(read_decimal(reader)?),
        TypeTag::Binary => Value::Binary(read_binary(reader)?.to_vec()),
        TypeTag::LinkBag => Value::LinkBag(read_binary(reader)?.to_vec()),
        TypeTag::Link => Value::Link(Identifiable::Id(read_rid(reader)?)),
        TypeTag::LinkList => Value::LinkList(read_link_collection(reader)?),
        TypeTag::LinkSet => Value::LinkSet(read_link_collection(reader)?),
        TypeTag::LinkMap => Value::LinkMap(read_link_map(reader)?),
        TypeTag::Custom => read_custom(ctx, reader)?,
        TypeTag::Transient | TypeTag::Any => Value::Null,
    };
    Ok(value)
}

fn read_date(ctx: &CodecContext<'_>, reader: &mut ByteReader<'_>) -> Result<Value> {
    let offset = reader.position();
    let days = read_signed_varint(reader)?;
    let saved = days
        .checked_mul(MILLIS_PER_DAY)
        .ok_or_else(|| CodecError::malformed(offset, format!("day number {} out of range", days)))?;
    let zone = ctx.options().time_zone().offset_millis(saved);
    Ok(Value::Date(saved.saturating_sub(zone)))
}

fn read_decimal(reader: &mut ByteReader<'_>) -> Result<BigDecimal> {
    let scale = read_i32_literal(reader)?;
    let len_offset = reader.position();
    let len = read_i32_literal(reader)?;
    let len = usize::try_from(len)
        .map_err(|_| CodecError::malformed(len_offset, format!("negative decimal length {}", len)))?;
    let bytes = reader.read_bytes(len)?;
    Ok(BigDecimal::new(BigInt::from_signed_bytes_be(bytes), scale as i64))
}

fn read_embedded(ctx: &CodecContext<'_>, reader: &mut ByteReader<'_>, depth: usize) -> Result<Value> {
    let next = descend(ctx, depth)?;
    let mut record = Record::new();
    read_record(ctx, reader, &mut record, None, next)?;

    let marker = match record.field(SERIALIZABLE_CLASS_FIELD) {
        Some(Value::String(class)) => Some(class.clone()),
        _ => None,
    };
    let Some(class) = marker else {
        record.set_embedded(true);
        return Ok(Value::Embedded(Box::new(record)));
    };

    record.remove(SERIALIZABLE_CLASS_FIELD);
    let registry = ctx.registry().ok_or_else(|| CodecError::UnregisteredType {
        type_name: class.clone(),
    })?;
    Ok(Value::Serializable(registry.reconstruct_serializable(&class, &record)?))
}

fn read_embedded_collection(
    ctx: &CodecContext<'_>,
    reader: &mut ByteReader<'_>,
    depth: usize,
) -> Result<Vec<Value>> {
    let next = descend(ctx, depth)?;
    let count = read_length(reader)?;
    let header_offset = reader.position();
    let declared = read_tag(reader)?;
    if declared == TypeTag::Transient {
        return Err(CodecError::malformed(header_offset, "collection of TRANSIENT elements").into());
    }

    let mut items = Vec::with_capacity(count.min(reader.remaining().len()));
    for _ in 0..count {
        let tag = if declared == TypeTag::Any {
            read_tag(reader)?
        } else {
            declared
        };
        let item = match tag {
            TypeTag::Any => Value::Null,
            tag => read_value(ctx, reader, tag, next)?,
        };
        items.push(item);
    }
    Ok(items)
}

fn read_map_key(reader: &mut ByteReader<'_>) -> Result<String> {
    let offset = reader.position();
    let tag = read_tag(reader)?;
    if tag != TypeTag::String {
        return Err(CodecError::malformed(offset, format!("map key of type {} is not supported", tag)).into());
    }
    read_string(reader)
}

fn read_embedded_map(
    ctx: &CodecContext<'_>,
    reader: &mut ByteReader<'_>,
    depth: usize,
) -> Result<BTreeMap<String, Value>> {
    let next = descend(ctx, depth)?;
    let count = read_length(reader)?;
    let mut map = BTreeMap::new();
    let mut last = 0;

    for _ in 0..count {
        let key = read_map_key(reader)?;
        let slot_offset = reader.position();
        let pointer = read_i32_literal(reader)?;
        let tag = read_tag(reader)?;

        let value = if pointer == NULL_POINTER {
            Value::Null
        } else {
            let resume = reader.position();
            reader.seek(pointer_target(pointer, slot_offset)?)?;
            let value = read_value(ctx, reader, tag, next)?;
            last = last.max(reader.position());
            reader.seek(resume)?;
            value
        };
        map.insert(key, value);
    }

    if last > reader.position() {
        reader.seek(last)?;
    }
    Ok(map)
}

fn read_rid(reader: &mut ByteReader<'_>) -> Result<RecordId> {
    let cluster = read_i32_varint(reader)?;
    let position = read_signed_varint(reader)?;
    Ok(RecordId::new(cluster, position))
}

fn read_link_element(reader: &mut ByteReader<'_>) -> Result<Option<Identifiable>> {
    let rid = read_rid(reader)?;
    Ok((!rid.is_null_link()).then_some(Identifiable::Id(rid)))
}

fn read_link_collection(reader: &mut ByteReader<'_>) -> Result<Vec<Option<Identifiable>>> {
    let count = read_length(reader)?;
    let mut items = Vec::with_capacity(count.min(reader.remaining().len() / 2));
    for _ in 0..count {
        items.push(read_link_element(reader)?);
    }
    Ok(items)
}

fn read_link_map(reader: &mut ByteReader<'_>) -> Result<BTreeMap<String, Option<Identifiable>>> {
    let count = read_length(reader)?;
    let mut map = BTreeMap::new();
    for _ in 0..count {
        let key = read_map_key(reader)?;
        map.insert(key, read_link_element(reader)?);
    }
    Ok(map)
}

fn read_custom(ctx: &CodecContext<'_>, reader: &mut ByteReader<'_>) -> Result<Value> {
    let type_name = read_str(reader)?;
    let stream = read_binary(reader)?;
    let registry = ctx.registry().ok_or_else(|| CodecError::UnregisteredType {
        type_name: type_name.to_string(),
    })?;
    Ok(Value::Custom(registry.reconstruct_custom(type_name, stream)?))
}
