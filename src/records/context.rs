//! # Codec Context
//!
//! Everything a single encode or decode call may consult, passed explicitly
//! instead of living in ambient session state. A context borrows its
//! collaborators, so it is cheap to build per call and safe to share across
//! threads when the collaborators are.
//!
//! | Collaborator | Needed for | When absent |
//! |--------------|------------|-------------|
//! | `CodecOptions` | depth limit, proxy mode, time zone | defaults |
//! | `SchemaSnapshot` | schema-bound header entries | every field is named; property refs fail to decode |
//! | `TypeRegistry` | `CUSTOM` and serializable values | those values fail |
//! | `LinkResolver` | links to unsaved records | such links fail unless proxy mode |
//!
//! ## Usage
//!
//! ```ignore
//! let ctx = CodecContext::new()
//!     .with_schema(&schema)
//!     .with_registry(&registry);
//! let bytes = encode(&record, &ctx)?;
//! ```

use std::fmt;

use crate::config::CodecOptions;
use crate::links::LinkResolver;
use crate::registry::TypeRegistry;
use crate::schema::SchemaSnapshot;

#[derive(Clone, Default)]
pub struct CodecContext<'a> {
    options: CodecOptions,
    schema: Option<&'a dyn SchemaSnapshot>,
    registry: Option<&'a TypeRegistry>,
    resolver: Option<&'a dyn LinkResolver>,
}

impl<'a> CodecContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_schema(mut self, schema: &'a dyn SchemaSnapshot) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_registry(mut self, registry: &'a TypeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_resolver(mut self, resolver: &'a dyn LinkResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn schema(&self) -> Option<&'a dyn SchemaSnapshot> {
        self.schema
    }

    pub fn registry(&self) -> Option<&'a TypeRegistry> {
        self.registry
    }

    pub fn resolver(&self) -> Option<&'a dyn LinkResolver> {
        self.resolver
    }
}

impl fmt::Debug for CodecContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecContext")
            .field("options", &self.options)
            .field("schema", &self.schema.is_some())
            .field("registry", &self.registry.is_some())
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}
