//! # Link Resolution Bridge
//!
//! A link is written as the `(cluster, position)` of its target. Targets
//! that are not yet persistent (an in-memory record, or a temporary identity
//! from an open transaction) must be given an identity first. The codec
//! delegates that to a [`LinkResolver`] supplied by the caller; it never
//! decides persistence policy itself.
//!
//! ## Resolution Rules
//!
//! | Target identity | Action |
//! |-----------------|--------|
//! | persistent | written as-is, resolver not called |
//! | null-link sentinel | written as-is |
//! | invalid / temporary | resolver called once, its identity written |
//!
//! Without a usable identity from the resolver the encode fails with
//! `LinkResolutionFailure`. In proxy-storage mode the unresolved identity is
//! written instead and a warning is logged.

use eyre::Result;
use thiserror::Error;

use crate::error::CodecError;
use crate::types::{Identifiable, Record, RecordId};

/// Borrowed view of a link target handed to the resolver.
#[derive(Debug, Clone, Copy)]
pub enum LinkTarget<'a> {
    Id(RecordId),
    Record(&'a Record),
}

impl LinkTarget<'_> {
    pub fn identity(&self) -> RecordId {
        match self {
            LinkTarget::Id(rid) => *rid,
            LinkTarget::Record(record) => record.identity(),
        }
    }
}

impl<'a> From<&'a Identifiable> for LinkTarget<'a> {
    fn from(target: &'a Identifiable) -> Self {
        match target {
            Identifiable::Id(rid) => LinkTarget::Id(*rid),
            Identifiable::Record(record) => LinkTarget::Record(&**record),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistError {
    #[error("persistence is unavailable: {0}")]
    Unavailable(String),
    #[error("save failed: {0}")]
    SaveFailed(String),
}

/// Persistence capability consulted before a link is encoded.
pub trait LinkResolver: Send + Sync {
    /// Persists `target` if needed and returns its identity.
    fn persist_if_unidentified(&self, target: LinkTarget<'_>) -> Result<RecordId, PersistError>;
}

pub(crate) fn needs_resolution(rid: RecordId) -> bool {
    !rid.is_persistent() && !rid.is_null_link()
}

pub(crate) fn resolve_link(
    target: LinkTarget<'_>,
    resolver: Option<&dyn LinkResolver>,
    proxy_storage: bool,
) -> Result<RecordId> {
    let rid = target.identity();
    if !needs_resolution(rid) {
        return Ok(rid);
    }

    let reason = match resolver {
        Some(resolver) => match resolver.persist_if_unidentified(target) {
            Ok(resolved) if resolved.is_valid() => {
                tracing::trace!(from = %rid, to = %resolved, "resolved link identity");
                return Ok(resolved);
            }
            Ok(resolved) => format!("resolver returned invalid identity {}", resolved),
            Err(e) => e.to_string(),
        },
        None => "no link resolver supplied".to_string(),
    };

    if proxy_storage {
        tracing::warn!(link = %rid, reason = %reason, "writing unresolved link to proxy storage");
        return Ok(rid);
    }

    Err(CodecError::LinkResolutionFailure {
        cluster: rid.cluster(),
        position: rid.position(),
        reason,
    }
    .into())
}
