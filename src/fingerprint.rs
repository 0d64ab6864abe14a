//! Canonical form of a forest.
//!
//! The sync controller compares fingerprints instead of whole forests. A
//! fingerprint is the SHA-256 of the forest's JSON serialization; maps are
//! ordered, so equal forests always serialize identically.

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::node::CanvasNode;

fn hex_digest(hasher: Sha256) -> String {
    format!("{:x}", hasher.finalize())
}

/// Digest covering everything, ids included.
pub fn forest_fingerprint(nodes: &[CanvasNode]) -> String {
    let mut hasher = Sha256::new();
    if let Err(err) = serde_json::to_writer(&mut hasher, nodes) {
        // Unreachable for string-keyed maps; fall back to the debug form.
        debug!(error = %err, "forest serialization failed, hashing debug form");
        hasher.update(format!("{:?}", nodes).as_bytes());
    }
    hex_digest(hasher)
}

/// Digest that ignores `id` and `parentId`: two forests with the same shape,
/// props, styles and events match even when their ids were minted separately.
pub fn structural_fingerprint(nodes: &[CanvasNode]) -> String {
    let mut hasher = Sha256::new();
    match serde_json::to_value(nodes) {
        Ok(mut value) => {
            strip_ids(&mut value);
            hasher.update(value.to_string().as_bytes());
        }
        Err(err) => {
            debug!(error = %err, "forest serialization failed, hashing debug form");
            hasher.update(format!("{:?}", nodes).as_bytes());
        }
    }
    hex_digest(hasher)
}

fn strip_ids(value: &mut Value) {
    match value {
        Value::Array(items) => items.iter_mut().for_each(strip_ids),
        Value::Object(map) => {
            map.remove("id");
            map.remove("parentId");
            if let Some(children) = map.get_mut("children") {
                strip_ids(children);
            }
        }
        _ => {}
    }
}
