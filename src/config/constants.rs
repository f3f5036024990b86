//! # Codec Configuration Constants
//!
//! This module centralizes the fixed sizes, sentinels and limits used by the
//! record codec. Values that the wire format depends on are co-located so a
//! change to one is checked against the others.
//!
//! ## Dependency Graph
//!
//! ```text
//! POINTER_SIZE (4 bytes, big-endian i32)
//!       │
//!       ├─> TYPE_TAG_SIZE (1 byte)
//!       │
//!       └─> UNTYPED_SLOT_SIZE (derived: POINTER_SIZE + TYPE_TAG_SIZE)
//!             Header slot for name-addressed fields and for schema
//!             properties without a concrete declared type.
//!
//! MAX_VARINT_LEN (10 bytes)
//!       │
//!       └─> Maximum encoded size of a 64-bit two's-complement varint.
//!           Negative values (property ids) always take the full length.
//!
//! DEFAULT_MAX_NESTING_DEPTH (32)
//!       │
//!       └─> Bounds recursion through embedded records, collections and
//!           maps on both encode and decode.
//! ```
//!
//! ## Critical Invariants
//!
//! 1. `UNTYPED_SLOT_SIZE == POINTER_SIZE + TYPE_TAG_SIZE`
//! 2. `POINTER_SIZE` matches the width of the backpatched pointer literal
//! 3. The null-link sentinel is never a valid persistent identity

// ============================================================================
// HEADER SLOT LAYOUT
// ============================================================================

/// Width of a header value pointer. Pointers are absolute arena offsets.
pub const POINTER_SIZE: usize = 4;

/// Width of an inline type tag.
pub const TYPE_TAG_SIZE: usize = 1;

/// Slot reserved for a field whose type must be carried in the header.
pub const UNTYPED_SLOT_SIZE: usize = POINTER_SIZE + TYPE_TAG_SIZE;

/// Slot reserved for a schema property that pins a concrete type.
pub const TYPED_SLOT_SIZE: usize = POINTER_SIZE;

const _: () = assert!(
    UNTYPED_SLOT_SIZE == POINTER_SIZE + TYPE_TAG_SIZE,
    "UNTYPED_SLOT_SIZE derivation mismatch"
);

const _: () = assert!(
    POINTER_SIZE == std::mem::size_of::<i32>(),
    "header pointers are i32 literals"
);

/// Value of the varint that terminates a header stream (an empty name).
pub const HEADER_TERMINATOR: i64 = 0;

/// Pointer value marking a field without a body.
pub const NULL_POINTER: i32 = 0;

// ============================================================================
// PRIMITIVE LIMITS
// ============================================================================

/// Maximum number of bytes a 64-bit varint can occupy.
pub const MAX_VARINT_LEN: usize = 10;

// ============================================================================
// DATE HANDLING
// ============================================================================

/// Milliseconds in one calendar day; DATE values are stored as day numbers.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

// ============================================================================
// RECORD IDENTITY
// ============================================================================

/// Cluster id of the reserved identity that encodes a null link.
pub const NULL_LINK_CLUSTER: i32 = -2;

/// Cluster position meaning "no position assigned".
pub const INVALID_POSITION: i64 = -1;

/// Cluster id carried by records that were never assigned to a cluster.
pub const INVALID_CLUSTER: i32 = -1;

// ============================================================================
// NESTING AND RECONSTRUCTION
// ============================================================================

/// Default bound on embedding depth for encode and decode.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 32;

/// Reserved field carrying the class of a serializable domain object
/// stored as an embedded record.
pub const SERIALIZABLE_CLASS_FIELD: &str = "__orientdb_serilized_class__ ";

/// Initial capacity of an encode arena.
pub const DEFAULT_ARENA_CAPACITY: usize = 256;
