//! # In-Memory Schema Catalog
//!
//! `MemorySchema` holds global properties (indexed by id) and the per-class
//! bindings that point at them. Two classes declaring the same name with the
//! same types share one global property, so ids stay stable across classes.

use eyre::{ensure, Result};
use hashbrown::HashMap;

use super::{SchemaProperty, SchemaSnapshot};
use crate::types::TypeTag;

#[derive(Debug, Default, Clone)]
pub struct MemorySchema {
    properties: Vec<SchemaProperty>,
    classes: HashMap<String, HashMap<String, i32>>,
}

impl MemorySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `field` on `class_name` and returns its global property id.
    pub fn add_property(
        &mut self,
        class_name: &str,
        field: &str,
        declared_type: Option<TypeTag>,
    ) -> Result<i32> {
        self.add_property_with_linked(class_name, field, declared_type, None)
    }

    pub fn add_property_with_linked(
        &mut self,
        class_name: &str,
        field: &str,
        declared_type: Option<TypeTag>,
        linked_type: Option<TypeTag>,
    ) -> Result<i32> {
        ensure!(!field.is_empty(), "property name cannot be empty");
        ensure!(
            !self
                .classes
                .get(class_name)
                .is_some_and(|props| props.contains_key(field)),
            "property '{}' already exists on class '{}'",
            field,
            class_name
        );

        let id = self.global_property(field, declared_type, linked_type)?;
        self.classes
            .entry(class_name.to_string())
            .or_default()
            .insert(field.to_string(), id);
        Ok(id)
    }

    fn global_property(
        &mut self,
        name: &str,
        declared_type: Option<TypeTag>,
        linked_type: Option<TypeTag>,
    ) -> Result<i32> {
        if let Some(existing) = self.properties.iter().find(|p| {
            p.name() == name && p.declared_type() == declared_type && p.linked_type() == linked_type
        }) {
            return Ok(existing.id());
        }

        let id = i32::try_from(self.properties.len())
            .map_err(|_| eyre::eyre!("global property table is full"))?;
        let mut property = SchemaProperty::new(id, name, declared_type);
        if let Some(linked) = linked_type {
            property = property.with_linked_type(linked);
        }
        self.properties.push(property);
        Ok(id)
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    pub fn class_exists(&self, class_name: &str) -> bool {
        self.classes.contains_key(class_name)
    }
}

impl SchemaSnapshot for MemorySchema {
    fn property_by_id(&self, id: i32) -> Option<&SchemaProperty> {
        usize::try_from(id).ok().and_then(|idx| self.properties.get(idx))
    }

    fn class_property(&self, class_name: &str, field: &str) -> Option<&SchemaProperty> {
        let id = *self.classes.get(class_name)?.get(field)?;
        self.property_by_id(id)
    }
}
