//! # Codec Options
//!
//! This module provides `CodecOptions`, the per-call configuration of the
//! record codec, and the `CodecOptionsBuilder` used to construct it.
//!
//! ## Configuration Options
//!
//! | Option          | Default | Description                                   |
//! |-----------------|---------|-----------------------------------------------|
//! | max_depth       | 32      | Maximum embedding depth on encode and decode  |
//! | proxy_storage   | false   | Accept unresolved link identities             |
//! | time_zone       | UTC     | Offset source applied to DATE day numbers     |
//!
//! ## Usage
//!
//! ```ignore
//! let options = CodecOptions::builder()
//!     .max_depth(8)
//!     .time_zone(FixedOffset::hours(2))
//!     .build();
//! ```
//!
//! ## Time Zones
//!
//! DATE values are stored as day numbers shifted by the configured zone's
//! UTC offset at that instant. They round-trip only when the encoder and the
//! decoder use the same `TimeZoneSource`.

use std::fmt;
use std::sync::Arc;

use crate::config::constants::DEFAULT_MAX_NESTING_DEPTH;

/// Supplies the UTC offset, in milliseconds, in effect at an instant.
pub trait TimeZoneSource: Send + Sync {
    fn offset_millis(&self, epoch_millis: i64) -> i64;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utc;

impl TimeZoneSource for Utc {
    fn offset_millis(&self, _epoch_millis: i64) -> i64 {
        0
    }
}

/// A zone with a constant offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedOffset {
    millis: i64,
}

impl FixedOffset {
    pub fn millis(millis: i64) -> Self {
        Self { millis }
    }

    pub fn minutes(minutes: i64) -> Self {
        Self::millis(minutes * 60_000)
    }

    pub fn hours(hours: i64) -> Self {
        Self::minutes(hours * 60)
    }
}

impl TimeZoneSource for FixedOffset {
    fn offset_millis(&self, _epoch_millis: i64) -> i64 {
        self.millis
    }
}

#[derive(Clone)]
pub struct CodecOptions {
    max_depth: usize,
    proxy_storage: bool,
    time_zone: Arc<dyn TimeZoneSource>,
}

impl fmt::Debug for CodecOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecOptions")
            .field("max_depth", &self.max_depth)
            .field("proxy_storage", &self.proxy_storage)
            .field("utc_offset_millis_at_epoch", &self.time_zone.offset_millis(0))
            .finish()
    }
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptionsBuilder::new().build()
    }
}

impl CodecOptions {
    pub fn builder() -> CodecOptionsBuilder {
        CodecOptionsBuilder::new()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// True when the active storage is a non-authoritative proxy, in which
    /// case links without a valid identity are written as-is.
    pub fn proxy_storage(&self) -> bool {
        self.proxy_storage
    }

    pub fn time_zone(&self) -> &dyn TimeZoneSource {
        self.time_zone.as_ref()
    }
}

/// Builder for [`CodecOptions`].
pub struct CodecOptionsBuilder {
    max_depth: Option<usize>,
    proxy_storage: Option<bool>,
    time_zone: Option<Arc<dyn TimeZoneSource>>,
}

impl Default for CodecOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecOptionsBuilder {
    pub fn new() -> Self {
        Self {
            max_depth: None,
            proxy_storage: None,
            time_zone: None,
        }
    }

    /// Sets the maximum embedding depth. A depth of zero still permits the
    /// top-level record but rejects any embedded record, collection or map.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn proxy_storage(mut self, enabled: bool) -> Self {
        self.proxy_storage = Some(enabled);
        self
    }

    pub fn time_zone<Z: TimeZoneSource + 'static>(mut self, zone: Z) -> Self {
        self.time_zone = Some(Arc::new(zone));
        self
    }

    pub fn shared_time_zone(mut self, zone: Arc<dyn TimeZoneSource>) -> Self {
        self.time_zone = Some(zone);
        self
    }

    pub fn build(self) -> CodecOptions {
        CodecOptions {
            max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_NESTING_DEPTH),
            proxy_storage: self.proxy_storage.unwrap_or(false),
            time_zone: self.time_zone.unwrap_or_else(|| Arc::new(Utc)),
        }
    }
}
