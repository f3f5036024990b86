//! # Type Tags
//!
//! `TypeTag` is the closed set of value kinds a record field can carry.
//! Each tag has a stable single-byte id that appears in header slots,
//! collection element prefixes and map entries.
//!
//! ## Discriminant Values
//!
//! | Id | Tag | Id | Tag |
//! |----|-----|----|-----|
//! | 0 | BOOLEAN | 12 | EMBEDDEDMAP |
//! | 1 | INTEGER | 13 | LINK |
//! | 2 | SHORT | 14 | LINKLIST |
//! | 3 | LONG | 15 | LINKSET |
//! | 4 | FLOAT | 16 | LINKMAP |
//! | 5 | DOUBLE | 17 | BYTE |
//! | 6 | DATETIME | 18 | TRANSIENT |
//! | 7 | STRING | 19 | DATE |
//! | 8 | BINARY | 20 | CUSTOM |
//! | 9 | EMBEDDED | 21 | DECIMAL |
//! | 10 | EMBEDDEDLIST | 22 | LINKBAG |
//! | 11 | EMBEDDEDSET | 23 | ANY |
//!
//! `ANY` doubles as the heterogeneous-collection marker and as the tag of a
//! null collection element.

use std::fmt;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Boolean = 0,
    Integer = 1,
    Short = 2,
    Long = 3,
    Float = 4,
    Double = 5,
    DateTime = 6,
    String = 7,
    Binary = 8,
    Embedded = 9,
    EmbeddedList = 10,
    EmbeddedSet = 11,
    EmbeddedMap = 12,
    Link = 13,
    LinkList = 14,
    LinkSet = 15,
    LinkMap = 16,
    Byte = 17,
    Transient = 18,
    Date = 19,
    Custom = 20,
    Decimal = 21,
    LinkBag = 22,
    Any = 23,
}

impl TypeTag {
    pub const ALL: [TypeTag; 24] = [
        TypeTag::Boolean,
        TypeTag::Integer,
        TypeTag::Short,
        TypeTag::Long,
        TypeTag::Float,
        TypeTag::Double,
        TypeTag::DateTime,
        TypeTag::String,
        TypeTag::Binary,
        TypeTag::Embedded,
        TypeTag::EmbeddedList,
        TypeTag::EmbeddedSet,
        TypeTag::EmbeddedMap,
        TypeTag::Link,
        TypeTag::LinkList,
        TypeTag::LinkSet,
        TypeTag::LinkMap,
        TypeTag::Byte,
        TypeTag::Transient,
        TypeTag::Date,
        TypeTag::Custom,
        TypeTag::Decimal,
        TypeTag::LinkBag,
        TypeTag::Any,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Boolean => "BOOLEAN",
            TypeTag::Integer => "INTEGER",
            TypeTag::Short => "SHORT",
            TypeTag::Long => "LONG",
            TypeTag::Float => "FLOAT",
            TypeTag::Double => "DOUBLE",
            TypeTag::DateTime => "DATETIME",
            TypeTag::String => "STRING",
            TypeTag::Binary => "BINARY",
            TypeTag::Embedded => "EMBEDDED",
            TypeTag::EmbeddedList => "EMBEDDEDLIST",
            TypeTag::EmbeddedSet => "EMBEDDEDSET",
            TypeTag::EmbeddedMap => "EMBEDDEDMAP",
            TypeTag::Link => "LINK",
            TypeTag::LinkList => "LINKLIST",
            TypeTag::LinkSet => "LINKSET",
            TypeTag::LinkMap => "LINKMAP",
            TypeTag::Byte => "BYTE",
            TypeTag::Transient => "TRANSIENT",
            TypeTag::Date => "DATE",
            TypeTag::Custom => "CUSTOM",
            TypeTag::Decimal => "DECIMAL",
            TypeTag::LinkBag => "LINKBAG",
            TypeTag::Any => "ANY",
        }
    }

    /// A concrete tag pins a field's type; `ANY` leaves it open.
    pub fn is_concrete(self) -> bool {
        self != TypeTag::Any
    }

    /// True for tags whose decode recurses into nested values.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            TypeTag::Embedded | TypeTag::EmbeddedList | TypeTag::EmbeddedSet | TypeTag::EmbeddedMap
        )
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
