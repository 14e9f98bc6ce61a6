//! Address grammar, resolution, borrowing, and input classification
//! (component C)
//!
//! Addresses are plain strings (`@<ecs_id>[.field]*[ [idx] ]*`) so they
//! stay portable across process boundaries even though this port has no
//! on-disk format. Resolution walks the registry's stored trees, not the
//! caller's live objects, so an address always answers against committed
//! state.

pub mod address;
pub mod borrow;
pub mod classify;
pub mod error;
pub mod resolve;

pub use address::{Address, PathSegment};
pub use borrow::{borrow, borrow_from, record_list_element, record_map_entry};
pub use classify::{classify, DeclaredParamKind, InputPattern, ParamSpec, RawInput};
pub use error::{ResolverError, ResolverResult};
pub use resolve::{resolve, ResolvedValue};
