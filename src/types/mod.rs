//! # Record Data Model
//!
//! The in-memory shapes the codec converts to and from bytes.
//!
//! ## Module Structure
//!
//! - `type_tag`: Closed `TypeTag` enum with stable wire ids
//! - `value`: Runtime `Value` enum and tag inference
//! - `record`: Ordered, optionally classed `Record`
//! - `record_id`: `RecordId` identities and link targets
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | `TypeTag` | Wire-level kind discriminant |
//! | `Value` | Field value (owned) |
//! | `Record` | Document: class, identity, ordered fields |
//! | `RecordId` | Cluster/position identity |
//! | `Identifiable` | Link target (identity or in-memory record) |

mod record;
mod record_id;
mod type_tag;
mod value;

pub use record::{Field, Record};
pub use record_id::{Identifiable, RecordId};
pub use type_tag::TypeTag;
pub use value::Value;
