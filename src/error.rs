//! # Codec Errors
//!
//! Every failure raised by the codec is a [`CodecError`] wrapped in an
//! `eyre::Report`. Callers that need to branch on the failure kind recover
//! it with `report.downcast_ref::<CodecError>()`.
//!
//! | Variant | Raised | Context carried |
//! |---------|--------|-----------------|
//! | `MalformedInput` | decode | byte offset of detection |
//! | `UnsupportedValue` | encode | field name, runtime kind |
//! | `UnresolvedSchemaReference` | decode | property id, byte offset |
//! | `LinkResolutionFailure` | encode | offending identity |
//! | `UnregisteredType` | decode | type or class name |
//! | `NestingTooDeep` | both | depth reached, configured limit |
//!
//! None of these are retried inside the codec.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed input at offset {offset}: {reason}")]
    MalformedInput { offset: usize, reason: String },

    #[error("cannot encode field '{field}' holding {kind}: {reason}")]
    UnsupportedValue {
        field: String,
        kind: &'static str,
        reason: String,
    },

    #[error("property id {property_id} at offset {offset} is not in the schema snapshot")]
    UnresolvedSchemaReference { property_id: i32, offset: usize },

    #[error("cannot resolve link #{cluster}:{position}: {reason}")]
    LinkResolutionFailure {
        cluster: i32,
        position: i64,
        reason: String,
    },

    #[error("no factory registered for type '{type_name}'")]
    UnregisteredType { type_name: String },

    #[error("nesting depth {depth} exceeds maximum {limit}")]
    NestingTooDeep { depth: usize, limit: usize },
}

impl CodecError {
    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        CodecError::MalformedInput {
            offset,
            reason: reason.into(),
        }
    }

    pub fn unsupported(field: &str, kind: &'static str, reason: impl Into<String>) -> Self {
        CodecError::UnsupportedValue {
            field: field.to_string(),
            kind,
            reason: reason.into(),
        }
    }
}

/// Extracts the [`CodecError`] carried by a report, if any.
pub fn codec_error(report: &eyre::Report) -> Option<&CodecError> {
    report.downcast_ref::<CodecError>()
}
