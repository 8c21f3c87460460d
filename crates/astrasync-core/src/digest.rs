//! Canonical JSON digests for normalized records.
//!
//! Object keys are ordered by UTF-16 code units (RFC 8785 §3.2.3) so the
//! digest does not depend on how the map was built or on serde_json's
//! `preserve_order` feature being enabled somewhere in the dependency graph.

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::Result;

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_by(|a, b| a.encode_utf16().cmp(b.encode_utf16()));

            let mut sorted = Map::new();
            for key in keys {
                if let Some(v) = map.get(key) {
                    sorted.insert(key.clone(), canonicalize(v));
                }
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Serialize `value` to canonical JSON bytes.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let json = serde_json::to_value(value)?;
    Ok(serde_json::to_vec(&canonicalize(&json))?)
}

/// SHA-256 hex digest of the canonical JSON form of `value`.
pub fn compute_digest<T: Serialize>(value: &T) -> Result<String> {
    let bytes = canonical_json(value)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
