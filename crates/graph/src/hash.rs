//! Deterministic structural hashing
//!
//! A node's structural hash is determined by its concrete type name, an
//! ordered list of `(field_name, field_content_hash)` pairs, and — for
//! hierarchical edges — each child's own structural hash folded in under
//! its field. Container ordering is fixed by the field's
//! [`crate::ContainerKind`]: lists and tuples preserve declaration order,
//! sets sort by element hash, and maps sort by key, so the same logical
//! content always hashes the same way regardless of, say, `HashMap`
//! iteration order upstream.

use crate::edge::{ContainerKind, IndexOrKey};
use entity_core::EcsId;
use xxhash_rust::xxh3::Xxh3;

/// The hash contribution of a reference edge: recursion stops at
/// references (§4.A), so all a reference can contribute to its parent's
/// structural hash is its target's identity, not its content.
pub fn hash_reference(target: EcsId) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.update(target.as_uuid().as_bytes());
    hasher.digest()
}

/// Combine the per-element hashes of one container-valued field into a
/// single field-level hash, applying the ordering rule for `kind`.
pub fn combine_container(kind: ContainerKind, mut entries: Vec<(IndexOrKey, u64)>) -> u64 {
    match kind {
        ContainerKind::Direct => {
            return entries.first().map(|(_, h)| *h).unwrap_or(0);
        }
        ContainerKind::List | ContainerKind::Tuple => {
            // Declaration/insertion order is already the canonical order.
        }
        ContainerKind::Set => {
            entries.sort_by_key(|(_, h)| *h);
        }
        ContainerKind::Map => {
            entries.sort_by(|(a, _), (b, _)| map_key(a).cmp(map_key(b)));
        }
    }
    let mut hasher = Xxh3::new();
    for (_, h) in &entries {
        hasher.update(&h.to_le_bytes());
    }
    hasher.digest()
}

fn map_key(index: &IndexOrKey) -> &str {
    match index {
        IndexOrKey::Key(k) => k.as_str(),
        _ => "",
    }
}

/// Combine a node's type name, its own leaf-field content hash, and its
/// already-ordered list of `(field_name, field_hash)` pairs into the
/// node's structural hash.
pub fn hash_node(type_name: &str, own_content_hash: u64, field_hashes: &[(String, u64)]) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.update(type_name.as_bytes());
    hasher.update(&own_content_hash.to_le_bytes());
    for (field_name, hash) in field_hashes {
        hasher.update(field_name.as_bytes());
        hasher.update(&hash.to_le_bytes());
    }
    hasher.digest()
}
