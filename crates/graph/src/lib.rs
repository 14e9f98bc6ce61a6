//! Entity tree builder and structural hashing (component A)
//!
//! Walks an entity's in-memory graph along hierarchical edges, producing a
//! [`BuiltTree`] snapshot: every reachable node, the edge metadata that
//! connects them, ancestry paths to the root, and a deterministic
//! structural hash. Building a tree is pure — it never touches the
//! registry; the registry crate calls into this one, not the other way
//! around.

pub mod edge;
pub mod error;
pub mod hash;
pub mod traversable;
pub mod tree;

pub use edge::{ContainerKind, EdgeInfo, IndexOrKey, Ownership};
pub use error::GraphError;
pub use traversable::{ChildEdge, RootOracle, Traversable};
pub use tree::{BuiltTree, TreeBuilder};
