//! Authoritative entity registry (component B)
//!
//! The registry is the process-wide store of record: it maps identities to
//! trees, detects when a live graph has diverged from its registered
//! version, forks new versions for changed nodes, and supports detaching
//! and re-attaching sub-entities. All index mutations serialize through
//! one lock; reads may proceed concurrently (§4.B, §5).

pub mod error;
pub mod indexes;
pub mod registry;
pub mod versioning;

pub use error::{RegistryError, RegistryResult};
pub use registry::Registry;
pub use versioning::DivergenceOutcome;
