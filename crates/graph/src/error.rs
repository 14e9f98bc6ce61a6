//! Failures raised while building a tree

use entity_core::EcsId;
use thiserror::Error;

/// Errors raised while walking an entity graph into a [`crate::BuiltTree`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A hierarchical cycle was detected: some entity is its own
    /// hierarchical ancestor. Hierarchical edges must form a forest;
    /// cycles are only permitted across reference edges.
    #[error("cyclic hierarchy detected at {0}")]
    CyclicHierarchy(EcsId),

    /// A child referenced by an edge was not reachable during traversal
    /// (e.g. the field reported a child that could not be resolved).
    #[error("unreachable child referenced from field '{field}'")]
    UnreachableChild {
        /// The field name that pointed at the missing child.
        field: String,
    },

    /// The same entity was claimed as a hierarchical child by two
    /// different parents within one build (Invariant 8: a hierarchical
    /// child belongs to exactly one parent tree).
    #[error("entity {child} is claimed as a hierarchical child by both {first_parent} and {second_parent}")]
    IncoherentOwnership {
        /// The entity claimed twice.
        child: EcsId,
        /// The first parent that claimed it.
        first_parent: EcsId,
        /// The second parent that claimed it.
        second_parent: EcsId,
    },
}
