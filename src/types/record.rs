//! # Record - Schema-Flexible Document
//!
//! A `Record` is an ordered set of named fields, optionally tagged with a
//! class name and an identity. Field order is insertion order and is
//! preserved by the codec: it is the order of the header entries.
//!
//! ## Field Types
//!
//! Each field may carry an explicit type override. The encoder prefers the
//! override over the schema's declared type and over inference, and the
//! decoder records the tag it decoded with, so a decoded record re-encodes
//! with the same tags.
//!
//! ## Ownership
//!
//! Records reconstituted as the value of another record's field are marked
//! embedded: they belong to the enclosing record and are never written as
//! links.
//!
//! ## Lookup
//!
//! Fields live in a `Vec` for order and a name index maps each name to its
//! slot, so lookups and inserts stay constant-time on wide records.
//!
//! ## Equality
//!
//! Two records are equal when their class names and identities match and
//! their ordered `(name, value)` pairs match. Type overrides, the name index
//! and the embedded mark are bookkeeping and do not participate.

use hashbrown::HashMap;

use crate::types::record_id::RecordId;
use crate::types::type_tag::TypeTag;
use crate::types::value::Value;

#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    value: Value,
    type_override: Option<TypeTag>,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn type_override(&self) -> Option<TypeTag> {
        self.type_override
    }
}

#[derive(Debug, Clone, Default)]
pub struct Record {
    class_name: Option<String>,
    identity: RecordId,
    fields: Vec<Field>,
    index: HashMap<String, usize>,
    embedded: bool,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.class_name == other.class_name
            && self.identity == other.identity
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|(a, b)| a.name == b.name && a.value == b.value)
    }
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            ..Self::default()
        }
    }

    /// Builder-style field insertion.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_typed(mut self, name: impl Into<String>, value: impl Into<Value>, tag: TypeTag) -> Self {
        self.set_typed(name, value, tag);
        self
    }

    pub fn with_identity(mut self, identity: RecordId) -> Self {
        self.identity = identity;
        self
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn set_class_name(&mut self, class_name: impl Into<String>) {
        self.class_name = Some(class_name.into());
    }

    pub fn identity(&self) -> RecordId {
        self.identity
    }

    pub fn set_identity(&mut self, identity: RecordId) {
        self.identity = identity;
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    pub fn set_embedded(&mut self, embedded: bool) {
        self.embedded = embedded;
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    fn push_field(&mut self, name: String, value: Value, type_override: Option<TypeTag>) {
        self.index.insert(name.clone(), self.fields.len());
        self.fields.push(Field {
            name,
            value,
            type_override,
        });
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.position(name).map(|idx| &self.fields[idx].value)
    }

    pub fn field_type(&self, name: &str) -> Option<TypeTag> {
        self.position(name).and_then(|idx| self.fields[idx].type_override)
    }

    /// Sets a field's value. An existing field keeps its position and its
    /// type override; a new field is appended.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.fields[idx].value = value,
            None => self.push_field(name, value, None),
        }
    }

    pub fn set_typed(&mut self, name: impl Into<String>, value: impl Into<Value>, tag: TypeTag) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => {
                self.fields[idx].value = value;
                self.fields[idx].type_override = Some(tag);
            }
            None => self.push_field(name, value, Some(tag)),
        }
    }

    /// Overrides the type of an existing field. Returns false if the field
    /// does not exist.
    pub fn set_field_type(&mut self, name: &str, tag: Option<TypeTag>) -> bool {
        match self.position(name) {
            Some(idx) => {
                self.fields[idx].type_override = tag;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.index.remove(name)?;
        let field = self.fields.remove(idx);
        for later in &self.fields[idx..] {
            if let Some(slot) = self.index.get_mut(later.name.as_str()) {
                *slot -= 1;
            }
        }
        Some(field.value)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Appends a decoded value. The decoder checks for an existing field
    /// before binding.
    pub(crate) fn bind_decoded(&mut self, name: String, value: Value, tag: Option<TypeTag>) {
        self.push_field(name, value, tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_preserved() {
        let record = Record::new().with("z", 1i32).with("a", 2i32).with("m", 3i32);

        let names: Vec<_> = record.field_names().collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn set_existing_field_keeps_position_and_type() {
        let mut record = Record::new()
            .with_typed("a", 1i32, TypeTag::Long)
            .with("b", 2i32);

        record.set("a", 10i32);

        let names: Vec<_> = record.field_names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(record.field("a"), Some(&Value::Integer(10)));
        assert_eq!(record.field_type("a"), Some(TypeTag::Long));
    }

    #[test]
    fn set_field_type_on_missing_field_fails() {
        let mut record = Record::new().with("a", 1i32);

        assert!(record.set_field_type("a", Some(TypeTag::Short)));
        assert!(!record.set_field_type("b", Some(TypeTag::Short)));
        assert_eq!(record.field_type("a"), Some(TypeTag::Short));
    }

    #[test]
    fn equality_ignores_overrides_and_ownership() {
        let a = Record::with_class("Person").with("name", "Ada");
        let mut b = Record::with_class("Person").with_typed("name", "Ada", TypeTag::String);
        b.set_embedded(true);

        assert_eq!(a, b);
    }

    #[test]
    fn equality_respects_field_order() {
        let a = Record::new().with("x", 1i32).with("y", 2i32);
        let b = Record::new().with("y", 2i32).with("x", 1i32);

        assert_ne!(a, b);
    }

    #[test]
    fn remove_returns_value() {
        let mut record = Record::new().with("a", "v");

        assert_eq!(record.remove("a"), Some(Value::from("v")));
        assert!(record.is_empty());
        assert_eq!(record.remove("a"), None);
    }

    #[test]
    fn remove_keeps_later_lookups_in_place() {
        let mut record = Record::new().with("a", 1i32).with("b", 2i32).with("c", 3i32);

        record.remove("a");
        record.set("c", 30i32);
        record.set("d", 4i32);

        let names: Vec<_> = record.field_names().collect();
        assert_eq!(names, vec!["b", "c", "d"]);
        assert_eq!(record.field("b"), Some(&Value::Integer(2)));
        assert_eq!(record.field("c"), Some(&Value::Integer(30)));
        assert_eq!(record.field("d"), Some(&Value::Integer(4)));
    }

    #[test]
    fn wide_record_lookups_hit_every_field() {
        let mut record = Record::new();
        for i in 0..10_000 {
            record.set(format!("f{}", i), i as i64);
        }

        assert_eq!(record.len(), 10_000);
        assert_eq!(record.field("f0"), Some(&Value::Long(0)));
        assert_eq!(record.field("f9999"), Some(&Value::Long(9999)));
        assert!(!record.contains_field("f10000"));
    }
}
