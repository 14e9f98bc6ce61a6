//! The trait tree-walkable entities implement
//!
//! Rust has no runtime field reflection, so unlike a dynamically typed
//! host, domain entities here describe their own hierarchical structure
//! explicitly via [`Traversable::children`]. This keeps the entity itself
//! pure data (the implementation is expected to be a few lines of
//! delegation per field) while letting the builder walk arbitrary domain
//! graphs without knowing their concrete types.

use crate::edge::{ContainerKind, IndexOrKey, Ownership};
use entity_core::{Entity, EcsId, Value};
use std::collections::BTreeMap;

/// One edge from a node to a child, as reported by that node's
/// [`Traversable::children`].
pub struct ChildEdge<'a> {
    /// Field name the child was reached through.
    pub field_name: String,
    /// Container kind of that field.
    pub container: ContainerKind,
    /// Position within the container.
    pub index_or_key: IndexOrKey,
    /// The ownership the domain model declares for this edge. The builder
    /// may upgrade `Hierarchical` to `Reference` (never the reverse) if
    /// the child is already a registered root or completing the edge
    /// would form a cycle.
    pub declared_ownership: Ownership,
    /// The child itself.
    pub child: &'a dyn Traversable,
}

/// Queries the registry for whether an `ecs_id` is already a tree root.
///
/// Implemented by the registry crate; injected into the builder so that
/// `entity-graph` never depends on `entity-registry`.
pub trait RootOracle {
    /// True if `ecs_id` is currently registered as a tree root.
    fn is_registered_root(&self, ecs_id: EcsId) -> bool;
}

/// An oracle that reports nothing is registered yet — useful for building
/// a tree in isolation (tests, or a first-time `promote_to_root`).
pub struct NoRegisteredRoots;

impl RootOracle for NoRegisteredRoots {
    fn is_registered_root(&self, _ecs_id: EcsId) -> bool {
        false
    }
}

/// An entity that can report its hierarchical/reference children.
///
/// Implement this alongside [`Entity`] for every domain type that should
/// participate in tree building. Non-entity leaf fields never appear here;
/// they are folded into [`Traversable::own_content_hash`] instead.
pub trait Traversable: Entity + 'static {
    /// The edges reachable directly from this node's fields, in a stable,
    /// deterministic order (declaration order is fine; the builder imposes
    /// its own canonical ordering for hashing).
    fn children(&self) -> Vec<ChildEdge<'_>>;

    /// A content hash over this node's own non-entity field values only
    /// (not including children). Implementations typically hash each
    /// leaf field's `Debug` or `Display` representation, or a
    /// domain-specific stable encoding.
    fn own_content_hash(&self) -> u64;

    /// Clone this node into an owned, type-erased box. Required because
    /// [`crate::BuiltTree`] must hold owned snapshots of every node it
    /// indexes, not borrows tied to the caller's original graph.
    fn clone_box(&self) -> Box<dyn Traversable>;

    /// This node's non-entity field values, by name, for address
    /// resolution past the last entity hop of a path. Container-valued
    /// leaf fields report as `Value::List`/`Value::Map` so a trailing
    /// `[idx]` segment can still index them. Entities that are not meant
    /// to be addressed past their entity-valued fields can leave this at
    /// its default empty map.
    fn leaf_fields(&self) -> BTreeMap<String, Value> {
        BTreeMap::new()
    }

    /// Type-erase this owned node back to `Any` so callers that know the
    /// concrete domain type (e.g. a registered callable unpacking its own
    /// arguments) can downcast it. Every implementor's body is always just
    /// `self` — there is no sound way to override it meaningfully.
    fn into_any(self: Box<Self>) -> Box<dyn std::any::Any>;
}
