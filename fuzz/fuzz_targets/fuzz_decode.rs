//! Fuzz testing for the record decoder.
//!
//! Arbitrary bytes are decoded with and without a projection against a small
//! schema. Bad input must surface as an error, never as a panic or an
//! allocation sized by an untrusted count. Whatever decodes is encoded again
//! to exercise the writer on decoder-shaped records.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use docbin::{encode, decode, CodecContext, CodecOptions, MemorySchema, Record, TypeTag};

#[derive(Debug, Arbitrary)]
struct DecodeInput {
    max_depth: u8,
    projection: Option<Vec<String>>,
    data: Vec<u8>,
}

fn schema() -> MemorySchema {
    let mut schema = MemorySchema::new();
    let _ = schema.add_property("A", "x", Some(TypeTag::Integer));
    let _ = schema.add_property("A", "y", None);
    let _ = schema.add_property("B", "list", Some(TypeTag::EmbeddedList));
    schema
}

fuzz_target!(|input: DecodeInput| {
    let schema = schema();
    let options = CodecOptions::builder()
        .max_depth(usize::from(input.max_depth % 64))
        .proxy_storage(true)
        .build();
    let ctx = CodecContext::new().with_schema(&schema).with_options(options);

    let projection: Option<Vec<&str>> = input
        .projection
        .as_ref()
        .map(|names| names.iter().map(String::as_str).collect());

    let mut record = Record::new();
    if let Ok(cursor) = decode(&input.data, &mut record, projection.as_deref(), &ctx) {
        assert!(cursor <= input.data.len());
        let _ = encode(&record, &ctx);
    }
});
