//! # Codec Configuration
//!
//! Wire-format constants and the runtime options that govern a single
//! encode or decode call.
//!
//! ## Module Organization
//!
//! - [`constants`]: Slot sizes, sentinels and limits shared by the codec
//! - [`options`]: `CodecOptions` and its builder, plus time zone sources
//!   used by DATE encoding

pub mod constants;
pub mod options;

pub use constants::*;
pub use options::{CodecOptions, CodecOptionsBuilder, FixedOffset, TimeZoneSource, Utc};
