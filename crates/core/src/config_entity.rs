//! Marker trait for parameter-bundle entities
//!
//! A `ConfigEntity` is an ordinary [`Entity`] intended for use as a
//! top-level function parameter that bundles primitive configuration
//! (§4.E.3). The executor synthesizes one from caller-supplied primitives
//! when a registered function declares a `ConfigEntity` parameter but the
//! caller passed loose fields instead.

use crate::entity::Entity;
use crate::error::CoreError;
use crate::value::Value;
use std::collections::BTreeMap;

/// An entity type that can be synthesized from a flat map of primitive
/// fields.
pub trait ConfigEntity: Entity + Sized {
    /// Build an instance from caller-supplied primitive fields.
    ///
    /// Implementations should return [`CoreError::UnknownField`] for keys
    /// they do not recognize and [`CoreError::TypeMismatch`] when a known
    /// key's value has the wrong shape.
    fn from_primitives(fields: BTreeMap<String, Value>) -> Result<Self, CoreError>;
}
