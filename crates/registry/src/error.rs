//! Registry failure modes (§4.B Failures, §7 Consistency errors)

use entity_core::{EcsId, LiveId};
use thiserror::Error;

/// Result alias for registry operations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Errors raised by the registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// `register_root` was called for an entity that already has a root
    /// registration.
    #[error("entity {0} is already registered as a root")]
    AlreadyRegistered(EcsId),

    /// A lookup by `ecs_id`, `live_id`, or lineage found nothing.
    #[error("no entity found for {0}")]
    NotFound(String),

    /// `version_if_diverged` was called with a `live_id` the registry has
    /// no record of, or whose recorded tree no longer matches what the
    /// caller believes is live.
    #[error("live_id {0} is stale or unknown")]
    StaleLiveId(LiveId),

    /// `detach` was called on a node that is not currently a hierarchical
    /// child of anything (it is already a root, per the boundary rule
    /// that detaching a root is a no-op rather than an error — this
    /// variant is reserved for detaching a node that is a *reference*
    /// child, which has no parent edge to sever).
    #[error("{0} is not a hierarchical child of any tree")]
    DetachNonHierarchical(EcsId),

    /// The underlying tree build failed.
    #[error(transparent)]
    Graph(#[from] entity_graph::GraphError),
}
