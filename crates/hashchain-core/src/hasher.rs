//! Content hashing for blocks and other structured records.
//!
//! Records are rendered to canonical JSON (keys sorted, `", "` and `": "`
//! separators, non-ASCII and DEL escaped as `\uXXXX`) and hashed with SHA-256.
//! The canonical text does not depend on field declaration order, so two
//! records with equal field contents always share a digest.

use serde::Serialize;
use serde_json::ser::Formatter;
use sha2::{Digest, Sha256};
use std::io::{self, Write};

/// SHA-256 of raw bytes as lowercase hex.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// SHA-256 of a string's UTF-8 bytes as lowercase hex.
pub fn hash_str(s: &str) -> String {
    hash_bytes(s.as_bytes())
}

/// Hash a structured record through its canonical JSON form.
///
/// # Panics
///
/// Panics if `record` cannot be represented as JSON (for example a map
/// with non-string keys). Every record type in this crate serializes.
pub fn hash_record<T: Serialize + ?Sized>(record: &T) -> String {
    hash_bytes(&canonical_json(record))
}

/// Canonical JSON bytes for `record`.
///
/// # Panics
///
/// See [`hash_record`].
pub fn canonical_json<T: Serialize + ?Sized>(record: &T) -> Vec<u8> {
    let mut value = serde_json::to_value(record).expect("record is not representable as JSON");
    // no-op unless serde_json/preserve_order got enabled somewhere in the graph
    value.sort_all_objects();

    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, CanonicalFormatter);
    value
        .serialize(&mut ser)
        .expect("serializing a JSON value into memory cannot fail");
    buf
}

struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let bytes = fragment.as_bytes();
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            // DEL is escaped alongside non-ASCII, as Python's ensure_ascii does
            if ch.is_ascii() && ch != '\x7f' {
                continue;
            }
            writer.write_all(&bytes[start..i])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(&bytes[start..])
    }
}
