//! Core types for the entity substrate
//!
//! This crate defines the foundational vocabulary shared by every other
//! crate in the workspace:
//! - [`EcsId`], [`LiveId`], [`LineageId`]: the three identities every entity carries
//! - [`EntityMeta`]: the essential bookkeeping fields every entity is built from
//! - [`Entity`]: the trait that gives data-only records access to their identity
//! - [`Value`]: a free-form payload type for dynamic/untyped fields
//! - [`AttributeSource`]: per-field provenance tracking
//! - [`ConfigEntity`]: marker trait for top-level parameter-bundle entities
//! - [`FunctionExecution`]: the entity subtype recording one call
//! - [`Timestamp`]: a small wrapper over wall-clock time

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attribute_source;
pub mod config_entity;
pub mod entity;
pub mod error;
pub mod function_execution;
pub mod ids;
pub mod timestamp;
pub mod value;

pub use attribute_source::AttributeSource;
pub use config_entity::ConfigEntity;
pub use entity::{Entity, EntityMeta};
pub use error::{CoreError, CoreResult};
pub use function_execution::{ExecutionSemantic, FunctionExecution};
pub use ids::{EcsId, LineageId, LiveId};
pub use timestamp::Timestamp;
pub use value::Value;
