//! # Schema Snapshots
//!
//! The codec does not manage schemas; it consults a read-only snapshot to
//! decide how each field is identified in a record header.
//!
//! ## Field Binding
//!
//! | Schema knows `(class, field)`? | Declared type | Header entry |
//! |--------------------------------|---------------|--------------|
//! | no | - | name string + pointer + type byte |
//! | yes | concrete | varint `-(id+1)` + pointer |
//! | yes | absent / `ANY` | varint `-(id+1)` + pointer + type byte |
//!
//! Property ids are global: the same id decodes to the same name and type
//! regardless of the record's class.
//!
//! ## Module Structure
//!
//! - [`SchemaSnapshot`]: the lookup contract the codec consumes
//! - [`SchemaProperty`]: one global property binding
//! - `catalog`: `MemorySchema`, an in-memory snapshot implementation

mod catalog;

pub use catalog::MemorySchema;

use crate::types::TypeTag;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaProperty {
    id: i32,
    name: String,
    declared_type: Option<TypeTag>,
    linked_type: Option<TypeTag>,
}

impl SchemaProperty {
    pub fn new(id: i32, name: impl Into<String>, declared_type: Option<TypeTag>) -> Self {
        Self {
            id,
            name: name.into(),
            declared_type,
            linked_type: None,
        }
    }

    pub fn with_linked_type(mut self, linked_type: TypeTag) -> Self {
        self.linked_type = Some(linked_type);
        self
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> Option<TypeTag> {
        self.declared_type
    }

    /// The declared type when it pins the field; `None` for absent or `ANY`.
    pub fn concrete_type(&self) -> Option<TypeTag> {
        self.declared_type.filter(|t| t.is_concrete())
    }

    /// Element type for embedded collections of this property.
    pub fn linked_type(&self) -> Option<TypeTag> {
        self.linked_type
    }
}

/// Read-only view of property bindings, stable for one codec call.
pub trait SchemaSnapshot: Send + Sync {
    fn property_by_id(&self, id: i32) -> Option<&SchemaProperty>;

    fn class_property(&self, class_name: &str, field: &str) -> Option<&SchemaProperty>;
}
