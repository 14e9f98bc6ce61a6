//! Borrowing: recording per-field provenance when a value is pulled from
//! another entity rather than supplied as a literal (§4.C Borrowing)
//!
//! Rust has no field reflection, so there is no generic `dest.field = value`
//! this crate can perform on an arbitrary `&mut dyn Entity`. Borrowing here
//! resolves the source and stamps [`entity_core::AttributeSource`] on the
//! destination's [`entity_core::EntityMeta`]; assigning the resolved value
//! into the destination's concrete field is left to the caller's own
//! delegation code, exactly as field access already is.

use crate::address::{parse, Address};
use crate::error::ResolverResult;
use crate::resolve::{resolve, ResolvedValue};
use entity_core::{AttributeSource, EcsId, Entity};
use entity_graph::{IndexOrKey, Traversable};
use entity_registry::Registry;

/// Resolve `address` and stamp `dest`'s provenance for `dest_field`
/// accordingly. Returns the resolved value (or entity) for the caller to
/// assign into its own typed field.
pub fn borrow(
    registry: &Registry,
    dest: &mut dyn Entity,
    dest_field: &str,
    address: &str,
) -> ResolverResult<ResolvedValue> {
    let address: Address = parse(address)?;
    let resolved = resolve(registry, &address)?;
    record_single(dest, dest_field, source_of(&resolved));
    Ok(resolved)
}

/// Borrow directly from an in-hand entity's field, without going through an
/// address string. Used when the source is already resolved (e.g. another
/// parameter to the same call) rather than looked up from the registry.
pub fn borrow_from(
    dest: &mut dyn Entity,
    source: &dyn Traversable,
    source_field: &str,
    dest_field: &str,
) -> ResolverResult<ResolvedValue> {
    if let Some(edge) = source
        .children()
        .into_iter()
        .find(|edge| edge.field_name == source_field && edge.index_or_key == IndexOrKey::None)
    {
        let child = edge.child.clone_box();
        record_single(dest, dest_field, child.meta().ecs_id);
        return Ok(ResolvedValue::Entity(child));
    }

    let source_id = source.meta().ecs_id;
    let value = source
        .leaf_fields()
        .get(source_field)
        .cloned()
        .ok_or_else(|| crate::error::ResolverError::FieldNotFound {
            type_name: source.type_name(),
            field: source_field.to_string(),
        })?;
    record_single(dest, dest_field, source_id);
    Ok(ResolvedValue::Value { value, source: source_id })
}

/// Record provenance for one element of a container-valued field (a list,
/// tuple, set, or map entry borrowed independently of its siblings).
/// `index` is the element's position for list/tuple/set fields; callers
/// addressing a map field should use [`record_map_entry`] instead.
pub fn record_list_element(dest: &mut dyn Entity, dest_field: &str, index: usize, source: Option<EcsId>) {
    let entry = dest
        .meta_mut()
        .attribute_source
        .entry(dest_field.to_string())
        .or_insert_with(|| AttributeSource::List(Vec::new()));
    if let AttributeSource::List(elements) = entry {
        if elements.len() <= index {
            elements.resize(index + 1, None);
        }
        elements[index] = source;
    }
}

/// Record provenance for one entry of a map-valued field.
pub fn record_map_entry(dest: &mut dyn Entity, dest_field: &str, key: &str, source: Option<EcsId>) {
    let entry = dest
        .meta_mut()
        .attribute_source
        .entry(dest_field.to_string())
        .or_insert_with(|| AttributeSource::Map(Default::default()));
    if let AttributeSource::Map(elements) = entry {
        elements.insert(key.to_string(), source);
    }
}

fn record_single(dest: &mut dyn Entity, dest_field: &str, source: EcsId) {
    dest.meta_mut()
        .attribute_source
        .insert(dest_field.to_string(), AttributeSource::Single(source));
}

fn source_of(resolved: &ResolvedValue) -> EcsId {
    match resolved {
        ResolvedValue::Entity(entity) => entity.meta().ecs_id,
        ResolvedValue::Value { source, .. } => *source,
    }
}
