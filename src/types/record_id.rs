//! # Record Identity
//!
//! A `RecordId` addresses a stored record by cluster and position within
//! the cluster. Identities are assigned by the persistence layer; the codec
//! only reads them and, for links, asks the persistence bridge to assign one
//! when it is missing.
//!
//! ## Identity States
//!
//! | Cluster | Position | Meaning |
//! |---------|----------|---------|
//! | any     | `>= 0`   | persistent, safe to encode as a link |
//! | any     | `-1`     | invalid (never assigned) |
//! | `-1`    | `< -1`   | temporary, inside an uncommitted transaction |
//! | `-2`    | `-1`     | reserved null-link sentinel |

use std::fmt;

use crate::config::{INVALID_CLUSTER, INVALID_POSITION, NULL_LINK_CLUSTER};
use crate::types::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    cluster: i32,
    position: i64,
}

impl RecordId {
    /// Identity of a record that has never been assigned to a cluster.
    pub const EMPTY: RecordId = RecordId {
        cluster: INVALID_CLUSTER,
        position: INVALID_POSITION,
    };

    /// Written in place of a null element of a link collection or map.
    pub const NULL_LINK: RecordId = RecordId {
        cluster: NULL_LINK_CLUSTER,
        position: INVALID_POSITION,
    };

    pub const fn new(cluster: i32, position: i64) -> Self {
        Self { cluster, position }
    }

    pub fn cluster(&self) -> i32 {
        self.cluster
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn is_valid(&self) -> bool {
        self.position != INVALID_POSITION
    }

    pub fn is_new(&self) -> bool {
        self.position < 0
    }

    pub fn is_temporary(&self) -> bool {
        self.cluster == INVALID_CLUSTER && self.position < INVALID_POSITION
    }

    pub fn is_persistent(&self) -> bool {
        self.is_valid() && !self.is_new()
    }

    pub fn is_null_link(&self) -> bool {
        *self == Self::NULL_LINK
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.cluster, self.position)
    }
}

/// Target of a link: a bare identity, or an in-memory record that may not
/// have been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub enum Identifiable {
    Id(RecordId),
    Record(Box<Record>),
}

impl Identifiable {
    pub fn identity(&self) -> RecordId {
        match self {
            Identifiable::Id(rid) => *rid,
            Identifiable::Record(record) => record.identity(),
        }
    }

    pub fn record(&self) -> Option<&Record> {
        match self {
            Identifiable::Id(_) => None,
            Identifiable::Record(record) => Some(record),
        }
    }
}

impl From<RecordId> for Identifiable {
    fn from(rid: RecordId) -> Self {
        Identifiable::Id(rid)
    }
}

impl From<Record> for Identifiable {
    fn from(record: Record) -> Self {
        Identifiable::Record(Box::new(record))
    }
}
