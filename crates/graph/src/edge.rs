//! Edge metadata between a tree node and its parent

use serde::{Deserialize, Serialize};

/// The kind of container a child was reached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerKind {
    /// A plain, non-container field holding one entity directly.
    Direct,
    /// An element of a `Vec`-like field.
    List,
    /// An element of a set-like field (positional key is the element's
    /// content hash, since sets have no intrinsic order).
    Set,
    /// An element of a fixed-arity tuple field.
    Tuple,
    /// A value in a string-keyed map field.
    Map,
}

/// The positional key of a child within its container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexOrKey {
    /// Not inside a container (`ContainerKind::Direct`).
    None,
    /// Position within a list, tuple, or set (set position is the
    /// element's content hash).
    Index(usize),
    /// Key within a map.
    Key(String),
}

/// Whether a child is owned by this tree or merely pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ownership {
    /// The child belongs to exactly one parent tree; its content
    /// contributes to the parent's structural hash.
    Hierarchical,
    /// The child is another tree's root (or would create a cycle); it is
    /// addressed by id only and does not contribute to this tree's hash.
    Reference,
}

/// Metadata describing one parent → child edge in a [`crate::BuiltTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeInfo {
    /// The field name on the parent this edge was reached through.
    pub field_name: String,
    /// The container kind of that field.
    pub container_kind: ContainerKind,
    /// The child's position within the container.
    pub index_or_key: IndexOrKey,
    /// Hierarchical or reference.
    pub ownership: Ownership,
}
