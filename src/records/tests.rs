//! Tests for the records module

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use eyre::Result;

use super::*;
use crate::config::CodecOptions;
use crate::encoding::{ByteArena, ByteReader};
use crate::error::{codec_error, CodecError};
use crate::links::{LinkResolver, LinkTarget, PersistError};
use crate::registry::{DocumentSerializable, StreamSerializable, TypeRegistry};
use crate::schema::MemorySchema;
use crate::types::{Identifiable, Record, RecordId, TypeTag, Value};

#[derive(Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

impl StreamSerializable for Point {
    fn type_name(&self) -> &str {
        "Point"
    }

    fn to_stream(&self) -> Vec<u8> {
        let mut out = self.x.to_be_bytes().to_vec();
        out.extend_from_slice(&self.y.to_be_bytes());
        out
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn point_from_stream(bytes: &[u8]) -> Result<Arc<dyn StreamSerializable>> {
    eyre::ensure!(bytes.len() == 8, "point stream must be 8 bytes");
    let x = i32::from_be_bytes(bytes[..4].try_into()?);
    let y = i32::from_be_bytes(bytes[4..].try_into()?);
    Ok(Arc::new(Point { x, y }))
}

#[derive(Debug, PartialEq)]
struct Money {
    cents: i64,
    currency: String,
}

impl DocumentSerializable for Money {
    fn class_name(&self) -> &str {
        "Money"
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("cents", self.cents)
            .with("currency", self.currency.as_str())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn money_from_record(record: &Record) -> Result<Arc<dyn DocumentSerializable>> {
    let cents = record
        .field("cents")
        .and_then(Value::as_i64)
        .ok_or_else(|| eyre::eyre!("missing cents"))?;
    let currency = record
        .field("currency")
        .and_then(Value::as_str)
        .ok_or_else(|| eyre::eyre!("missing currency"))?;
    Ok(Arc::new(Money {
        cents,
        currency: currency.to_string(),
    }))
}

fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry
        .register_custom("Point", point_from_stream)
        .register_serializable("Money", money_from_record);
    registry
}

struct FixedIds;

impl LinkResolver for FixedIds {
    fn persist_if_unidentified(&self, _target: LinkTarget<'_>) -> Result<RecordId, PersistError> {
        Ok(RecordId::new(9, 1))
    }
}

fn round_trip(record: &Record, serializer: &RecordSerializer<'_>) -> Record {
    let bytes = serializer.serialize(record).unwrap();
    let mut decoded = Record::new();
    let cursor = serializer.deserialize(&bytes, &mut decoded).unwrap();
    assert_eq!(cursor, bytes.len());
    decoded
}

fn err_kind(err: &eyre::Report) -> &CodecError {
    codec_error(err).unwrap_or_else(|| panic!("not a codec error: {:?}", err))
}

#[test]
fn untyped_record_layout_is_exact() {
    let serializer = RecordSerializer::default();
    let record = Record::new().with("a", 7i32);

    let bytes = serializer.serialize(&record).unwrap();

    assert_eq!(bytes, vec![0, 1, b'a', 0, 0, 0, 9, TypeTag::Integer.id(), 0, 7]);
}

#[test]
fn null_field_has_zero_pointer_and_no_body() {
    let serializer = RecordSerializer::default();
    let record = Record::new().with("n", Value::Null);

    let bytes = serializer.serialize(&record).unwrap();
    assert_eq!(bytes, vec![0, 1, b'n', 0, 0, 0, 0, 0, 0]);

    let mut decoded = Record::new();
    serializer.deserialize(&bytes, &mut decoded).unwrap();
    assert_eq!(decoded.field("n"), Some(&Value::Null));
    assert_eq!(decoded.field_type("n"), None);
}

#[test]
fn failed_field_leaves_earlier_bytes_in_arena() {
    let serializer = RecordSerializer::default();
    let record = Record::new()
        .with("a", 7i32)
        .with("b", Value::Custom(Arc::new(Point { x: 1, y: 2 })));
    let mut arena = ByteArena::new();

    let err = serializer.serialize_into(&record, &mut arena).unwrap_err();

    match err_kind(&err) {
        CodecError::UnsupportedValue { field, kind, .. } => {
            assert_eq!(field, "b");
            assert_eq!(*kind, "Custom");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    let bytes = arena.as_bytes();
    assert_eq!(bytes.len(), 17);
    assert_eq!(&bytes[3..7], &16i32.to_be_bytes());
    assert_eq!(bytes[7], TypeTag::Integer.id());
    assert_eq!(&bytes[10..14], &[0, 0, 0, 0]);
}

#[test]
fn scalar_kinds_round_trip() {
    let serializer = RecordSerializer::default();
    let record = Record::with_class("Sample")
        .with("flag", true)
        .with("byte", -3i8)
        .with("short", -300i16)
        .with("int", i32::MIN)
        .with("long", i64::MAX)
        .with("float", 0.25f32)
        .with("double", -1e300f64)
        .with("text", "héllo")
        .with("bytes", Value::Binary(vec![0, 255, 7]))
        .with("when", Value::DateTime(-1))
        .with("day", Value::Date(3 * crate::config::MILLIS_PER_DAY))
        .with("amount", Value::Decimal("1234567890123456789.0042".parse().unwrap()))
        .with("bag", Value::LinkBag(vec![1, 2, 3]));

    let decoded = round_trip(&record, &serializer);

    assert_eq!(decoded, record);
    assert_eq!(decoded.field_type("short"), Some(TypeTag::Short));
    assert_eq!(decoded.field_type("day"), Some(TypeTag::Date));
}

#[test]
fn explicit_type_override_is_preserved() {
    let serializer = RecordSerializer::default();
    let record = Record::new().with_typed("n", 5i32, TypeTag::Long);

    let decoded = round_trip(&record, &serializer);

    assert_eq!(decoded.field("n"), Some(&Value::Long(5)));
    assert_eq!(decoded.field_type("n"), Some(TypeTag::Long));
}

#[test]
fn transient_fields_are_omitted() {
    let serializer = RecordSerializer::default();
    let record = Record::new()
        .with("keep", 1i32)
        .with("scratch", Value::Transient)
        .with_typed("cache", 2i32, TypeTag::Transient);

    let decoded = round_trip(&record, &serializer);

    let names: Vec<_> = decoded.field_names().collect();
    assert_eq!(names, vec!["keep"]);
}

#[test]
fn schema_bound_field_uses_property_id_and_short_slot() {
    let mut schema = MemorySchema::new();
    schema.add_property("Person", "age", Some(TypeTag::Integer)).unwrap();
    let serializer = RecordSerializer::new(CodecContext::new().with_schema(&schema));
    let record = Record::with_class("Person").with("age", 30i32);

    let bytes = serializer.serialize(&record).unwrap();

    assert_eq!(&bytes[..7], b"\x06Person");
    assert_eq!(&bytes[7..17], &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]);
    assert_eq!(&bytes[17..21], &22i32.to_be_bytes());
    assert_eq!(bytes[21], 0);
    assert_eq!(bytes[22], 30);
    assert_eq!(bytes.len(), 23);
}

#[test]
fn schema_and_schemaless_encodings_decode_equally() {
    let mut schema = MemorySchema::new();
    schema.add_property("Person", "name", Some(TypeTag::String)).unwrap();
    schema.add_property("Person", "nick", None).unwrap();
    let with_schema = RecordSerializer::new(CodecContext::new().with_schema(&schema));
    let without = RecordSerializer::default();
    let record = Record::with_class("Person")
        .with("name", "Ada")
        .with("nick", "ada")
        .with("extra", 1i64);

    let bound = with_schema.serialize(&record).unwrap();
    let named = without.serialize(&record).unwrap();
    assert_ne!(bound, named);

    let mut a = Record::new();
    let mut b = Record::new();
    with_schema.deserialize(&bound, &mut a).unwrap();
    with_schema.deserialize(&named, &mut b).unwrap();
    assert_eq!(a, record);
    assert_eq!(a, b);
}

#[test]
fn property_reference_without_schema_fails() {
    let mut schema = MemorySchema::new();
    schema.add_property("Person", "age", Some(TypeTag::Integer)).unwrap();
    let bytes = RecordSerializer::new(CodecContext::new().with_schema(&schema))
        .serialize(&Record::with_class("Person").with("age", 30i32))
        .unwrap();

    let mut target = Record::new();
    let err = RecordSerializer::default()
        .deserialize(&bytes, &mut target)
        .unwrap_err();

    assert_eq!(
        err_kind(&err),
        &CodecError::UnresolvedSchemaReference {
            property_id: 0,
            offset: 7
        }
    );
}

#[test]
fn override_conflicting_with_pinned_schema_type_fails() {
    let mut schema = MemorySchema::new();
    schema.add_property("Person", "age", Some(TypeTag::Integer)).unwrap();
    let serializer = RecordSerializer::new(CodecContext::new().with_schema(&schema));
    let record = Record::with_class("Person").with_typed("age", 30i32, TypeTag::Long);

    let err = serializer.serialize(&record).unwrap_err();

    assert!(matches!(err_kind(&err), CodecError::UnsupportedValue { .. }));
}

#[test]
fn linked_type_drives_collection_element_tags() {
    let mut schema = MemorySchema::new();
    schema
        .add_property_with_linked("Series", "points", Some(TypeTag::EmbeddedList), Some(TypeTag::Long))
        .unwrap();
    let serializer = RecordSerializer::new(CodecContext::new().with_schema(&schema));
    let record = Record::with_class("Series").with(
        "points",
        Value::EmbeddedList(vec![Value::Integer(1), Value::Integer(2)]),
    );

    let decoded = round_trip(&record, &serializer);

    assert_eq!(
        decoded.field("points"),
        Some(&Value::EmbeddedList(vec![Value::Long(1), Value::Long(2)]))
    );
}

#[test]
fn selective_decode_binds_only_requested_fields() {
    let serializer = RecordSerializer::default();
    let record = Record::new()
        .with("a", 1i32)
        .with("b", "bee")
        .with("c", 3i64)
        .with("d", "dee");
    let bytes = serializer.serialize(&record).unwrap();

    let mut target = Record::new();
    let cursor = serializer
        .deserialize_fields(&bytes, &mut target, &["a", "c"])
        .unwrap();

    let names: Vec<_> = target.field_names().collect();
    assert_eq!(names, vec!["a", "c"]);
    assert_eq!(target.field("c"), Some(&Value::Long(3)));

    // Only d's body lies past c's.
    let d_body_len = 4;
    assert_eq!(cursor, bytes.len() - d_body_len);
}

#[test]
fn cursor_ends_at_high_water_mark() {
    let serializer = RecordSerializer::default();
    let record = Record::new()
        .with("first", "x".repeat(40))
        .with("second", Value::Null);
    let bytes = serializer.serialize(&record).unwrap();

    let mut target = Record::new();
    let cursor = serializer.deserialize(&bytes, &mut target).unwrap();

    assert_eq!(cursor, bytes.len());
}

#[test]
fn already_bound_fields_are_skipped() {
    let serializer = RecordSerializer::default();
    let bytes = serializer
        .serialize(&Record::new().with("a", "new").with("b", 2i32))
        .unwrap();

    let mut target = Record::new().with("a", "kept");
    serializer.deserialize(&bytes, &mut target).unwrap();

    assert_eq!(target.field("a"), Some(&Value::from("kept")));
    assert_eq!(target.field("b"), Some(&Value::Integer(2)));
}

#[test]
fn already_bound_last_field_does_not_move_high_water_mark() {
    let serializer = RecordSerializer::default();
    let bytes = serializer
        .serialize(&Record::new().with("a", 1i32).with("b", "x".repeat(50)))
        .unwrap();

    let mut target = Record::new().with("b", "kept");
    let cursor = serializer.deserialize(&bytes, &mut target).unwrap();

    // class, two 7-byte header entries, terminator, then one byte of `a`
    assert_eq!(cursor, 17);
    assert_eq!(target.field("a"), Some(&Value::Integer(1)));
    assert_eq!(target.field("b"), Some(&Value::from("kept")));
}

#[test]
fn wide_record_decodes_and_refills_by_name() {
    let serializer = RecordSerializer::default();
    let mut record = Record::new();
    for i in 0..20_000 {
        record.set(format!("n{}", i), Value::Null);
    }
    record.set("last", 7i32);
    let bytes = serializer.serialize(&record).unwrap();

    let mut target = Record::new();
    serializer.deserialize_fields(&bytes, &mut target, &["last"]).unwrap();
    serializer.deserialize(&bytes, &mut target).unwrap();

    assert_eq!(target.len(), 20_001);
    assert_eq!(target.field_names().next(), Some("last"));
    assert_eq!(target.field("n19999"), Some(&Value::Null));
    assert_eq!(target.field("last"), Some(&Value::Integer(7)));
}

#[test]
fn shared_map_bodies_exhaust_the_visit_budget() {
    use crate::encoding::primitives::{
        patch_i32_literal, write_i32_literal, write_string, write_u8, write_varint,
    };

    let mut arena = ByteArena::new();
    write_string(&mut arena, "");
    write_string(&mut arena, "m");
    let slot = write_i32_literal(&mut arena, 0);
    write_u8(&mut arena, TypeTag::EmbeddedMap.id());
    write_varint(&mut arena, 0);

    // every level holds two entries pointing at the same child map
    let mut child = write_varint(&mut arena, 0);
    for _ in 0..24 {
        let level = write_varint(&mut arena, 2);
        for key in ["a", "b"] {
            write_u8(&mut arena, TypeTag::String.id());
            write_string(&mut arena, key);
            write_i32_literal(&mut arena, child as i32);
            write_u8(&mut arena, TypeTag::EmbeddedMap.id());
        }
        child = level;
    }
    patch_i32_literal(&mut arena, slot, child as i32).unwrap();

    let serializer = RecordSerializer::default();
    let mut target = Record::new();
    let err = serializer.deserialize(arena.as_bytes(), &mut target).unwrap_err();

    assert!(matches!(err_kind(&err), CodecError::MalformedInput { .. }));
}

#[test]
fn reused_reader_gets_a_fresh_budget_per_record() {
    let serializer = RecordSerializer::default();
    let record = Record::new()
        .with("m", Value::EmbeddedMap(BTreeMap::from([("k".to_string(), Value::from("v"))])));
    let mut arena = ByteArena::new();
    for _ in 0..3 {
        serializer.serialize_into(&record, &mut arena).unwrap();
    }

    let mut reader = ByteReader::new(arena.as_bytes());
    for _ in 0..3 {
        let mut decoded = Record::new();
        serializer.deserialize_from(&mut reader, &mut decoded, None).unwrap();
        assert_eq!(decoded, record);
    }
    assert_eq!(reader.position(), arena.len());

    reader.seek(0).unwrap();
    let mut again = Record::new();
    serializer.deserialize_from(&mut reader, &mut again, None).unwrap();
    assert_eq!(again, record);
}

#[test]
fn embedded_record_round_trips_owned_by_parent() {
    let serializer = RecordSerializer::default();
    let address = Record::with_class("Address").with("city", "Rome");
    let record = Record::with_class("Person")
        .with("name", "Ada")
        .with("address", address.clone());

    let decoded = round_trip(&record, &serializer);

    let inner = decoded.field("address").and_then(Value::as_record).unwrap();
    assert_eq!(inner, &address);
    assert!(inner.is_embedded());
}

#[test]
fn records_written_mid_arena_keep_absolute_pointers() {
    let serializer = RecordSerializer::default();
    let record = Record::new()
        .with("inner", Record::new().with("v", 1i32))
        .with("tail", "t");
    let mut arena = ByteArena::new();
    arena.append(&[0xAA; 5]);

    let start = serializer.serialize_into(&record, &mut arena).unwrap();
    assert_eq!(start, 5);

    let mut reader = ByteReader::new(arena.as_bytes());
    reader.seek(start).unwrap();
    let mut decoded = Record::new();
    serializer.deserialize_from(&mut reader, &mut decoded, None).unwrap();

    assert_eq!(decoded, record);
    assert_eq!(reader.position(), arena.len());
}

#[test]
fn persistent_nested_record_is_written_as_link() {
    let serializer = RecordSerializer::default();
    let owner = Record::with_class("Person").with_identity(RecordId::new(5, 2));
    let record = Record::new().with("owner", owner);

    let decoded = round_trip(&record, &serializer);

    assert_eq!(decoded.field("owner"), Some(&Value::from(RecordId::new(5, 2))));
    assert_eq!(decoded.field_type("owner"), Some(TypeTag::Link));
}

#[test]
fn link_collections_round_trip_absent_elements() {
    let serializer = RecordSerializer::default();
    let mut by_role = BTreeMap::new();
    by_role.insert("admin".to_string(), Some(Identifiable::from(RecordId::new(4, 0))));
    by_role.insert("guest".to_string(), None);
    let record = Record::new()
        .with("list", Value::LinkList(vec![Some(RecordId::new(1, 2).into()), None]))
        .with("set", Value::LinkSet(vec![None]))
        .with("map", Value::LinkMap(by_role));

    let decoded = round_trip(&record, &serializer);

    assert_eq!(decoded, record);
}

#[test]
fn unsaved_link_target_needs_a_resolver() {
    let record = Record::new().with(
        "friend",
        Value::Link(Identifiable::from(Record::with_class("Person"))),
    );

    let err = RecordSerializer::default().serialize(&record).unwrap_err();
    assert!(matches!(
        err_kind(&err),
        CodecError::LinkResolutionFailure { cluster: -1, position: -1, .. }
    ));

    let resolver = FixedIds;
    let serializer = RecordSerializer::new(CodecContext::new().with_resolver(&resolver));
    let decoded = round_trip(&record, &serializer);
    assert_eq!(decoded.field("friend"), Some(&Value::from(RecordId::new(9, 1))));
}

#[test]
fn proxy_storage_writes_unresolved_links() {
    let options = CodecOptions::builder().proxy_storage(true).build();
    let serializer = RecordSerializer::new(CodecContext::new().with_options(options));
    let record = Record::new().with("tmp", RecordId::new(-1, -7));

    let decoded = round_trip(&record, &serializer);

    assert_eq!(decoded.field("tmp"), Some(&Value::from(RecordId::new(-1, -7))));
}

#[test]
fn custom_values_use_the_registry() {
    let registry = registry();
    let serializer = RecordSerializer::new(CodecContext::new().with_registry(&registry));
    let record = Record::new().with("at", Value::Custom(Arc::new(Point { x: -4, y: 9 })));

    let bytes = serializer.serialize(&record).unwrap();
    let mut decoded = Record::new();
    serializer.deserialize(&bytes, &mut decoded).unwrap();

    match decoded.field("at") {
        Some(Value::Custom(obj)) => {
            assert_eq!(obj.as_any().downcast_ref::<Point>(), Some(&Point { x: -4, y: 9 }));
        }
        other => panic!("unexpected value: {:?}", other),
    }

    let mut target = Record::new();
    let err = RecordSerializer::default()
        .deserialize(&bytes, &mut target)
        .unwrap_err();
    assert_eq!(
        err_kind(&err),
        &CodecError::UnregisteredType {
            type_name: "Point".to_string()
        }
    );
}

#[test]
fn serializable_values_round_trip_through_marker_field() {
    let registry = registry();
    let serializer = RecordSerializer::new(CodecContext::new().with_registry(&registry));
    let money = Money {
        cents: 1999,
        currency: "EUR".to_string(),
    };
    let record = Record::new().with("price", Value::Serializable(Arc::new(money)));

    let decoded = round_trip(&record, &serializer);

    assert_eq!(decoded, record);
    assert_eq!(decoded.field_type("price"), Some(TypeTag::Embedded));
}

#[test]
fn embedded_map_with_nested_record_round_trips() {
    let serializer = RecordSerializer::default();
    let mut attrs = BTreeMap::new();
    attrs.insert("color".to_string(), Value::from("red"));
    attrs.insert("size".to_string(), Value::Integer(3));
    attrs.insert("dims".to_string(), Value::from(Record::new().with("w", 1.5f64)));
    attrs.insert("none".to_string(), Value::Null);
    let record = Record::new()
        .with("attrs", Value::EmbeddedMap(attrs))
        .with("after", "z");

    let decoded = round_trip(&record, &serializer);

    assert_eq!(decoded, record);
}

#[test]
fn nesting_limit_applies_to_both_directions() {
    let record = Record::new().with(
        "l1",
        Record::new().with("l2", Record::new().with("x", 1i32)),
    );
    let bytes = RecordSerializer::default().serialize(&record).unwrap();
    let shallow = RecordSerializer::new(
        CodecContext::new().with_options(CodecOptions::builder().max_depth(1).build()),
    );

    let err = shallow.serialize(&record).unwrap_err();
    assert_eq!(err_kind(&err), &CodecError::NestingTooDeep { depth: 2, limit: 1 });

    let mut target = Record::new();
    let err = shallow.deserialize(&bytes, &mut target).unwrap_err();
    assert_eq!(err_kind(&err), &CodecError::NestingTooDeep { depth: 2, limit: 1 });
}

#[test]
fn truncated_input_is_malformed() {
    let serializer = RecordSerializer::default();
    let bytes = serializer.serialize(&Record::new().with("a", 7i32)).unwrap();

    for cut in [0, 2, 5, 9] {
        let mut target = Record::new();
        let err = serializer.deserialize(&bytes[..cut], &mut target).unwrap_err();
        assert!(
            matches!(err_kind(&err), CodecError::MalformedInput { .. }),
            "cut at {}: {:?}",
            cut,
            err
        );
    }
}

#[test]
fn pointer_past_end_is_malformed() {
    let serializer = RecordSerializer::default();
    let mut bytes = serializer.serialize(&Record::new().with("a", 7i32)).unwrap();
    bytes[3..7].copy_from_slice(&200i32.to_be_bytes());

    let mut target = Record::new();
    let err = serializer.deserialize(&bytes, &mut target).unwrap_err();

    assert!(matches!(err_kind(&err), CodecError::MalformedInput { .. }));
}

#[test]
fn negative_pointer_is_malformed() {
    let serializer = RecordSerializer::default();
    let mut bytes = serializer.serialize(&Record::new().with("a", 7i32)).unwrap();
    bytes[3..7].copy_from_slice(&(-4i32).to_be_bytes());

    let mut target = Record::new();
    let err = serializer.deserialize(&bytes, &mut target).unwrap_err();

    assert_eq!(
        err_kind(&err),
        &CodecError::MalformedInput {
            offset: 3,
            reason: "negative body pointer -4".to_string()
        }
    );
}

#[test]
fn heterogeneous_list_keeps_order() {
    let serializer = RecordSerializer::default();
    let list = Value::EmbeddedList(vec![
        Value::Integer(1),
        Value::from("two"),
        Value::Null,
        Value::Double(3.0),
    ]);
    let record = Record::new().with("mixed", list.clone());

    let decoded = round_trip(&record, &serializer);

    assert_eq!(decoded.field("mixed"), Some(&list));
}

#[test]
fn link_list_with_leading_null_round_trips() {
    let serializer = RecordSerializer::default();
    let links = Value::LinkList(vec![
        None,
        Some(RecordId::new(1, 2).into()),
        Some(RecordId::new(3, 4).into()),
    ]);
    let record = Record::new().with("links", links.clone());

    let decoded = round_trip(&record, &serializer);

    assert_eq!(decoded.field("links"), Some(&links));
}

#[test]
fn empty_containers_round_trip() {
    let serializer = RecordSerializer::default();
    let record = Record::new()
        .with("list", Value::EmbeddedList(Vec::new()))
        .with("set", Value::EmbeddedSet(Vec::new()))
        .with("map", Value::EmbeddedMap(BTreeMap::new()))
        .with("links", Value::LinkSet(Vec::new()))
        .with("nested", Record::new())
        .with("text", "")
        .with("blob", Value::Binary(Vec::new()));

    let decoded = round_trip(&record, &serializer);

    assert_eq!(decoded, record);
}
