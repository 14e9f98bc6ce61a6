//! The registry's internal indexes (§4.B)
//!
//! Held behind a single `parking_lot::RwLock` by [`crate::Registry`]; every
//! method here assumes exclusive or shared access has already been taken
//! by the caller.

use entity_core::{EcsId, Entity, LineageId, LiveId};
use entity_graph::BuiltTree;
use std::collections::{HashMap, HashSet};

#[derive(Default)]
pub(crate) struct RegistryInner {
    /// Built trees keyed by their current root `ecs_id`.
    pub(crate) trees: HashMap<EcsId, BuiltTree>,
    /// `live_id` → (root_ecs_id, ecs_id) for every node of every tree.
    pub(crate) live_index: HashMap<LiveId, (EcsId, EcsId)>,
    /// `ecs_id` → root_ecs_id for every node of every tree.
    pub(crate) ecs_index: HashMap<EcsId, EcsId>,
    /// `lineage_id` → every `ecs_id` that logical entity has ever held,
    /// oldest first.
    pub(crate) lineage_index: HashMap<LineageId, Vec<EcsId>>,
    /// Root type name → set of root `ecs_id`s of that type.
    pub(crate) type_index: HashMap<String, HashSet<EcsId>>,
}

impl RegistryInner {
    /// Index every node of `tree` and record the root under its type.
    pub(crate) fn index_tree(&mut self, tree: &BuiltTree) {
        let root_id = tree.root_ecs_id;
        for (ecs_id, node) in &tree.nodes {
            self.ecs_index.insert(*ecs_id, root_id);
            self.live_index
                .insert(node.meta().live_id, (root_id, *ecs_id));
            self.lineage_index
                .entry(node.meta().lineage_id)
                .or_default()
                .push(*ecs_id);
        }
        if let Some(root_node) = tree.nodes.get(&root_id) {
            self.type_index
                .entry(root_node.type_name().to_string())
                .or_default()
                .insert(root_id);
        }
    }

    /// Remove every node of `tree` from `ecs_index`/`live_index`. Does not
    /// touch `lineage_index` (history is never erased) or `type_index`
    /// (the caller re-adds the root under its, possibly unchanged, type).
    pub(crate) fn deindex_tree(&mut self, tree: &BuiltTree) {
        for (ecs_id, node) in &tree.nodes {
            self.ecs_index.remove(ecs_id);
            self.live_index.remove(&node.meta().live_id);
        }
        self.type_index
            .entry(
                tree.nodes
                    .get(&tree.root_ecs_id)
                    .map(|n| n.type_name().to_string())
                    .unwrap_or_default(),
            )
            .or_default()
            .remove(&tree.root_ecs_id);
    }
}
