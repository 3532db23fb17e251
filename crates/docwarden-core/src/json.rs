//! Indented JSON output shared by the snapshot and template writers.

use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::Result;

const INDENT: &[u8] = b"    ";

/// Serialize a value as JSON indented with four spaces.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Overwrite `path` with the indented JSON form of `value`.
pub fn write_pretty_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = to_pretty_json(value)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
