//! Address evaluation (§4.C Resolution)

use crate::address::{Address, PathSegment, Position};
use crate::error::{ResolverError, ResolverResult};
use entity_core::{EcsId, Value};
use entity_graph::{IndexOrKey, Traversable};
use entity_registry::Registry;

/// What an address resolved to: either a nested entity or a plain value,
/// tagged with the `ecs_id` of the entity the value was actually read
/// from (for provenance recording by [`crate::borrow`]).
pub enum ResolvedValue {
    /// The address named an entity-valued field (or the bare root).
    Entity(Box<dyn Traversable>),
    /// The address terminated at a non-entity field.
    Value {
        /// The resolved value.
        value: Value,
        /// `ecs_id` of the entity this value was read from.
        source: EcsId,
    },
}

/// Resolve an address against the registry's committed state.
pub fn resolve(registry: &Registry, address: &Address) -> ResolverResult<ResolvedValue> {
    let root = registry
        .get_by_ecs_id(address.root)
        .map_err(|_| ResolverError::UnknownEntity(address.root))?;
    let mut current = ResolvedValue::Entity(root);
    for segment in &address.segments {
        current = step(current, segment)?;
    }
    Ok(current)
}

fn step(current: ResolvedValue, segment: &PathSegment) -> ResolverResult<ResolvedValue> {
    let PathSegment::Field { name, position } = segment;
    match current {
        ResolvedValue::Value { value, source } => {
            let field_value = match &value {
                Value::Map(entries) => entries
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ResolverError::FieldNotFound { type_name: "map", field: name.clone() })?,
                _ => return Err(ResolverError::AddressTypeError { field: name.clone() }),
            };
            apply_position(field_value, position, name, source)
        }
        ResolvedValue::Entity(entity) => {
            let wanted = to_index_or_key(position);
            let child = entity
                .children()
                .into_iter()
                .find(|edge| edge.field_name == *name && edge.index_or_key == wanted);
            if let Some(edge) = child {
                return Ok(ResolvedValue::Entity(edge.child.clone_box()));
            }

            let source = entity.meta().ecs_id;
            let leaf = entity
                .leaf_fields()
                .get(name)
                .cloned()
                .ok_or_else(|| ResolverError::FieldNotFound { type_name: entity.type_name(), field: name.clone() })?;
            apply_position(leaf, position, name, source)
        }
    }
}

fn apply_position(
    value: Value,
    position: &Option<Position>,
    field: &str,
    source: EcsId,
) -> ResolverResult<ResolvedValue> {
    match position {
        None => Ok(ResolvedValue::Value { value, source }),
        Some(pos) => {
            let key = match pos {
                Position::Index(i) => i.to_string(),
                Position::Key(k) => k.clone(),
            };
            value
                .get_index(&key)
                .cloned()
                .map(|value| ResolvedValue::Value { value, source })
                .ok_or_else(|| ResolverError::IndexOutOfRange { field: field.to_string(), index: key })
        }
    }
}

fn to_index_or_key(position: &Option<Position>) -> IndexOrKey {
    match position {
        None => IndexOrKey::None,
        Some(Position::Index(i)) => IndexOrKey::Index(*i),
        Some(Position::Key(k)) => IndexOrKey::Key(k.clone()),
    }
}
