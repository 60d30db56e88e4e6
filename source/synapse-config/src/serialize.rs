use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::common_types::document::Document;

/// Serializes `document` to canonical bytes: keys sorted (via
/// `serde_json::Value`'s `BTreeMap`-backed object, not insertion order),
/// 4-space indent. Two compiles of identical input always produce
/// byte-identical output (testable property 1), which is what makes the
/// idempotent-write check in `synapse_tools::writer` a plain byte compare.
pub fn canonical_json(document: &Document) -> serde_json::Result<Vec<u8>> {
    let value = serde_json::to_value(document)?;
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}
