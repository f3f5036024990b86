//! # Type Registry
//!
//! The registry maps type names to factories that rebuild domain objects
//! from their stored form. Two kinds of payload rely on it:
//!
//! | Payload | Stored as | Factory input |
//! |---------|-----------|---------------|
//! | `CUSTOM` value | type name + opaque bytes | the opaque bytes |
//! | serializable object | embedded record with a class marker field | the decoded record |
//!
//! Factories are registered up front; during an encode or decode call the
//! registry is only read.
//!
//! ## Usage
//!
//! ```ignore
//! let mut registry = TypeRegistry::new();
//! registry.register_custom("geo.Point", |bytes| Ok(Arc::new(Point::from_stream(bytes)?)));
//! registry.register_serializable("app.Money", |record| Ok(Arc::new(Money::from_record(record)?)));
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use eyre::Result;
use hashbrown::HashMap;

use crate::error::CodecError;
use crate::types::Record;

/// A value that stores itself as an opaque byte stream under `CUSTOM`.
pub trait StreamSerializable: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &str;
    fn to_stream(&self) -> Vec<u8>;
    fn as_any(&self) -> &dyn Any;
}

/// A domain object that stores itself as an embedded record.
pub trait DocumentSerializable: fmt::Debug + Send + Sync {
    fn class_name(&self) -> &str;
    fn to_record(&self) -> Record;
    fn as_any(&self) -> &dyn Any;
}

pub type CustomFactory = Box<dyn Fn(&[u8]) -> Result<Arc<dyn StreamSerializable>> + Send + Sync>;
pub type SerializableFactory =
    Box<dyn Fn(&Record) -> Result<Arc<dyn DocumentSerializable>> + Send + Sync>;

#[derive(Default)]
pub struct TypeRegistry {
    custom: HashMap<String, CustomFactory>,
    serializable: HashMap<String, SerializableFactory>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .field("serializable", &self.serializable.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_custom<F>(&mut self, type_name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&[u8]) -> Result<Arc<dyn StreamSerializable>> + Send + Sync + 'static,
    {
        self.custom.insert(type_name.into(), Box::new(factory));
        self
    }

    pub fn register_serializable<F>(&mut self, class_name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&Record) -> Result<Arc<dyn DocumentSerializable>> + Send + Sync + 'static,
    {
        self.serializable.insert(class_name.into(), Box::new(factory));
        self
    }

    pub fn has_custom(&self, type_name: &str) -> bool {
        self.custom.contains_key(type_name)
    }

    pub fn has_serializable(&self, class_name: &str) -> bool {
        self.serializable.contains_key(class_name)
    }

    pub fn reconstruct_custom(
        &self,
        type_name: &str,
        bytes: &[u8],
    ) -> Result<Arc<dyn StreamSerializable>> {
        let factory = self
            .custom
            .get(type_name)
            .ok_or_else(|| CodecError::UnregisteredType {
                type_name: type_name.to_string(),
            })?;
        factory(bytes)
    }

    pub fn reconstruct_serializable(
        &self,
        class_name: &str,
        record: &Record,
    ) -> Result<Arc<dyn DocumentSerializable>> {
        let factory = self
            .serializable
            .get(class_name)
            .ok_or_else(|| CodecError::UnregisteredType {
                type_name: class_name.to_string(),
            })?;
        factory(record)
    }
}
