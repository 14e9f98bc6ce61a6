//! The auto-generated output wrapper for a bare scalar return (§4.E.2 `B7`)
//!
//! `entity-executor` has no per-registration generated record types (see
//! `return_pattern`'s doc comment), so there is one fixed wrapper entity
//! instead of a cached type keyed per function: any callable that returns a
//! plain [`Value`] rather than an entity gets that value wrapped in a
//! `ScalarOutput` before it's committed, so it still gets an `ecs_id`,
//! a `lineage_id`, and a place in the registry like any other creation.

use entity_core::{Entity, EntityMeta, Value};
use entity_graph::{ChildEdge, Traversable};
use std::collections::BTreeMap;

/// A registered entity holding exactly the scalar value a callable handed
/// back directly, with no entity-typed return of its own.
#[derive(Debug, Clone)]
pub struct ScalarOutput {
    meta: EntityMeta,
    value: Value,
}

impl ScalarOutput {
    /// Wrap `value` as a fresh root entity.
    pub fn new(value: Value) -> Self {
        Self { meta: EntityMeta::new(), value }
    }
}

impl Entity for ScalarOutput {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
    fn type_name(&self) -> &'static str {
        "ScalarOutput"
    }
}

impl Traversable for ScalarOutput {
    fn children(&self) -> Vec<ChildEdge<'_>> {
        Vec::new()
    }
    fn own_content_hash(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.value.to_string().hash(&mut hasher);
        hasher.finish()
    }
    fn clone_box(&self) -> Box<dyn Traversable> {
        Box::new(self.clone())
    }
    fn leaf_fields(&self) -> BTreeMap<String, Value> {
        BTreeMap::from([("value".to_string(), self.value.clone())])
    }
    fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
        self
    }
}
