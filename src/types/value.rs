//! # Runtime Field Values
//!
//! `Value` is the closed set of things a record field can hold. Every
//! variant maps to exactly one default [`TypeTag`] through
//! [`Value::infer_tag`], except `Null` and `Transient` which are never
//! written as bodies.
//!
//! ## Variants by Category
//!
//! | Category | Variants |
//! |----------|----------|
//! | Absent | `Null`, `Transient` |
//! | Scalars | `Boolean`, `Byte`, `Short`, `Integer`, `Long`, `Float`, `Double` |
//! | Text / bytes | `String`, `Binary` |
//! | Time | `Date` (epoch millis, day granularity), `DateTime` (epoch millis) |
//! | Numeric | `Decimal` (arbitrary precision) |
//! | Embedded | `Embedded`, `EmbeddedList`, `EmbeddedSet`, `EmbeddedMap` |
//! | Links | `Link`, `LinkList`, `LinkSet`, `LinkMap`, `LinkBag` |
//! | Extension | `Custom`, `Serializable` |
//!
//! Map keys are `String` by construction; the wire format only carries
//! string-keyed maps.
//!
//! ## Equality
//!
//! `Custom` values compare by type name and stream bytes, `Serializable`
//! values by class name and record form. Everything else compares
//! structurally.

use std::collections::BTreeMap;
use std::sync::Arc;

use bigdecimal::BigDecimal;

use crate::registry::{DocumentSerializable, StreamSerializable};
use crate::types::record::Record;
use crate::types::record_id::{Identifiable, RecordId};
use crate::types::type_tag::TypeTag;

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Transient,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Binary(Vec<u8>),
    Date(i64),
    DateTime(i64),
    Decimal(BigDecimal),
    Embedded(Box<Record>),
    EmbeddedList(Vec<Value>),
    EmbeddedSet(Vec<Value>),
    EmbeddedMap(BTreeMap<String, Value>),
    Link(Identifiable),
    LinkList(Vec<Option<Identifiable>>),
    LinkSet(Vec<Option<Identifiable>>),
    LinkMap(BTreeMap<String, Option<Identifiable>>),
    LinkBag(Vec<u8>),
    Custom(Arc<dyn StreamSerializable>),
    Serializable(Arc<dyn DocumentSerializable>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Value::Transient)
    }

    /// Name of the runtime kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Transient => "Transient",
            Value::Boolean(_) => "Boolean",
            Value::Byte(_) => "Byte",
            Value::Short(_) => "Short",
            Value::Integer(_) => "Integer",
            Value::Long(_) => "Long",
            Value::Float(_) => "Float",
            Value::Double(_) => "Double",
            Value::String(_) => "String",
            Value::Binary(_) => "Binary",
            Value::Date(_) => "Date",
            Value::DateTime(_) => "DateTime",
            Value::Decimal(_) => "Decimal",
            Value::Embedded(_) => "Embedded",
            Value::EmbeddedList(_) => "EmbeddedList",
            Value::EmbeddedSet(_) => "EmbeddedSet",
            Value::EmbeddedMap(_) => "EmbeddedMap",
            Value::Link(_) => "Link",
            Value::LinkList(_) => "LinkList",
            Value::LinkSet(_) => "LinkSet",
            Value::LinkMap(_) => "LinkMap",
            Value::LinkBag(_) => "LinkBag",
            Value::Custom(_) => "Custom",
            Value::Serializable(_) => "Serializable",
        }
    }

    /// Default tag for this value. A record infers `LINK` only when it has
    /// a persistent identity and is not owned by an enclosing record.
    pub fn infer_tag(&self) -> Option<TypeTag> {
        let tag = match self {
            Value::Null | Value::Transient => return None,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::Byte(_) => TypeTag::Byte,
            Value::Short(_) => TypeTag::Short,
            Value::Integer(_) => TypeTag::Integer,
            Value::Long(_) => TypeTag::Long,
            Value::Float(_) => TypeTag::Float,
            Value::Double(_) => TypeTag::Double,
            Value::String(_) => TypeTag::String,
            Value::Binary(_) => TypeTag::Binary,
            Value::Date(_) => TypeTag::Date,
            Value::DateTime(_) => TypeTag::DateTime,
            Value::Decimal(_) => TypeTag::Decimal,
            Value::Embedded(record) => {
                if record.identity().is_persistent() && !record.is_embedded() {
                    TypeTag::Link
                } else {
                    TypeTag::Embedded
                }
            }
            Value::EmbeddedList(_) => TypeTag::EmbeddedList,
            Value::EmbeddedSet(_) => TypeTag::EmbeddedSet,
            Value::EmbeddedMap(_) => TypeTag::EmbeddedMap,
            Value::Link(_) => TypeTag::Link,
            Value::LinkList(_) => TypeTag::LinkList,
            Value::LinkSet(_) => TypeTag::LinkSet,
            Value::LinkMap(_) => TypeTag::LinkMap,
            Value::LinkBag(_) => TypeTag::LinkBag,
            Value::Custom(_) => TypeTag::Custom,
            Value::Serializable(_) => TypeTag::Embedded,
        };
        Some(tag)
    }

    /// Integer payload of any integer-valued variant.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(*v as i64),
            Value::Short(v) => Some(*v as i64),
            Value::Integer(v) => Some(*v as i64),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Embedded(record) => Some(record),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Transient, Value::Transient) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Embedded(a), Value::Embedded(b)) => a == b,
            (Value::EmbeddedList(a), Value::EmbeddedList(b)) => a == b,
            (Value::EmbeddedSet(a), Value::EmbeddedSet(b)) => a == b,
            (Value::EmbeddedMap(a), Value::EmbeddedMap(b)) => a == b,
            (Value::Link(a), Value::Link(b)) => a == b,
            (Value::LinkList(a), Value::LinkList(b)) => a == b,
            (Value::LinkSet(a), Value::LinkSet(b)) => a == b,
            (Value::LinkMap(a), Value::LinkMap(b)) => a == b,
            (Value::LinkBag(a), Value::LinkBag(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => {
                a.type_name() == b.type_name() && a.to_stream() == b.to_stream()
            }
            (Value::Serializable(a), Value::Serializable(b)) => {
                a.class_name() == b.class_name() && a.to_record() == b.to_record()
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Byte(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Short(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<BigDecimal> for Value {
    fn from(v: BigDecimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Embedded(Box::new(v))
    }
}

impl From<RecordId> for Value {
    fn from(v: RecordId) -> Self {
        Value::Link(Identifiable::Id(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
