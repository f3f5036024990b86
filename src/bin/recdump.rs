//! # recdump - Record Inspector
//!
//! Memory-maps a file holding one encoded record and prints its decoded
//! fields. Schema-bound property references cannot be resolved without a
//! schema and are reported as errors.
//!
//! ## Usage
//!
//! ```bash
//! # Dump every field
//! recdump record.bin
//!
//! # Dump selected fields of a record stored at byte 128
//! recdump --offset 128 --fields name,age pages.bin
//! ```

use std::env;
use std::fs::File;
use std::path::PathBuf;

use docbin::encoding::ByteReader;
use docbin::{CodecContext, Record, RecordSerializer, Value};
use eyre::{bail, Result, WrapErr};
use memmap2::Mmap;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut offset = 0usize;
    let mut fields: Option<Vec<String>> = None;
    let mut path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--version" | "-v" => {
                println!("recdump {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--offset" | "-o" => {
                i += 1;
                let raw = args.get(i).ok_or_else(|| eyre::eyre!("--offset needs a value"))?;
                offset = raw
                    .parse()
                    .wrap_err_with(|| format!("invalid offset '{}'", raw))?;
            }
            "--fields" | "-f" => {
                i += 1;
                let raw = args.get(i).ok_or_else(|| eyre::eyre!("--fields needs a value"))?;
                fields = Some(raw.split(',').map(str::to_string).collect());
            }
            arg if arg.starts_with('-') => {
                bail!("Unknown option: {}", arg);
            }
            file => {
                if path.is_some() {
                    bail!("Multiple input files specified");
                }
                path = Some(PathBuf::from(file));
            }
        }
        i += 1;
    }

    let Some(path) = path else {
        print_usage();
        return Ok(());
    };

    let file = File::open(&path).wrap_err_with(|| format!("failed to open {}", path.display()))?;
    // SAFETY: the map is read-only and dropped before the function returns;
    // concurrent truncation of the file by another process is not supported.
    let map = unsafe { Mmap::map(&file) }.wrap_err("failed to map input file")?;

    let serializer = RecordSerializer::new(CodecContext::new());
    let mut reader = ByteReader::new(&map);
    reader.seek(offset)?;

    let projection: Option<Vec<&str>> = fields
        .as_ref()
        .map(|names| names.iter().map(String::as_str).collect());
    let mut record = Record::new();
    serializer.deserialize_from(&mut reader, &mut record, projection.as_deref())?;

    print_record(&record, 0);
    println!("-- {} bytes consumed", reader.position() - offset);
    Ok(())
}

fn print_record(record: &Record, indent: usize) {
    let pad = "  ".repeat(indent);
    println!("{}@class {}", pad, record.class_name().unwrap_or("<none>"));
    for field in record.fields() {
        let tag = field
            .type_override()
            .map(|t| t.name())
            .unwrap_or("NULL");
        match field.value() {
            Value::Embedded(inner) => {
                println!("{}{} ({}):", pad, field.name(), tag);
                print_record(inner, indent + 1);
            }
            value => println!("{}{} ({}) = {:?}", pad, field.name(), tag, value),
        }
    }
}

fn print_usage() {
    println!(
        r#"recdump - print a binary-encoded record

USAGE:
    recdump [OPTIONS] <FILE>

OPTIONS:
    -o, --offset <N>       Byte offset of the record in the file (default 0)
    -f, --fields <A,B>     Decode only the listed fields
    -h, --help             Print help information
    -v, --version          Print version information
"#
    );
}
