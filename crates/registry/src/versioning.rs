//! Divergence detection and version forking (§4.B, Invariant 2)
//!
//! A tree's root hash is its identity content signature. When the live
//! graph behind a registered root is rebuilt and its hash no longer
//! matches the stored tree, every node whose *own* hash changed — which,
//! because hashes fold children upward, is exactly the changed node and
//! all of its ancestors — gets a fresh `ecs_id`. Nodes outside that path
//! keep the identity they already had.

use entity_core::{EcsId, Entity, Timestamp};
use entity_graph::hash::{combine_container, hash_node, hash_reference};
use entity_graph::{BuiltTree, ContainerKind, EdgeInfo, IndexOrKey, Ownership};
use std::collections::{BTreeMap, HashMap, HashSet};

/// The result of a divergence check.
#[derive(Debug, Default, Clone)]
pub struct DivergenceOutcome {
    /// Whether the live graph's structural hash differed from the
    /// registered one.
    pub diverged: bool,
    /// Old `ecs_id` → new `ecs_id` for every node that was re-identified.
    /// Callers that hold their own copy of the live entity are
    /// responsible for applying this remap to it (see
    /// [`crate::Registry::version_if_diverged`]'s docs) — the registry
    /// itself only ever mutates the tree snapshot it owns.
    pub remapped_ids: HashMap<EcsId, EcsId>,
}

/// Compare two hash maps covering (at least) the same node and report the
/// ids present in both whose hash differs.
pub(crate) fn changed_ids(
    old_hashes: &BTreeMap<EcsId, u64>,
    new_hashes: &BTreeMap<EcsId, u64>,
) -> HashSet<EcsId> {
    old_hashes
        .iter()
        .filter_map(|(id, old_hash)| match new_hashes.get(id) {
            Some(new_hash) if new_hash != old_hash => Some(*id),
            _ => None,
        })
        .collect()
}

/// Assign a fresh `ecs_id` to every id in `changed` and rewrite every
/// place a tree references those ids (node keys, edge keys, ancestry,
/// node hash keys, and the root id itself), returning the old→new map.
pub(crate) fn apply_id_remap(tree: &mut BuiltTree, changed: &HashSet<EcsId>) -> HashMap<EcsId, EcsId> {
    let mut remap = HashMap::new();
    for &old_id in changed {
        remap.insert(old_id, EcsId::new());
    }
    if remap.is_empty() {
        return remap;
    }

    // Rewrite node identities and re-key the node map.
    let mut new_nodes = BTreeMap::new();
    for (old_id, mut node) in std::mem::take(&mut tree.nodes) {
        if let Some(&new_id) = remap.get(&old_id) {
            let meta = node.meta_mut();
            meta.old_ids.push(old_id);
            meta.previous_ecs_id = Some(old_id);
            meta.ecs_id = new_id;
            meta.forked_at = Some(Timestamp::now());
            new_nodes.insert(new_id, node);
        } else {
            new_nodes.insert(old_id, node);
        }
    }
    tree.nodes = new_nodes;

    // Re-key edges.
    let mut new_edges = BTreeMap::new();
    for ((parent, child), info) in std::mem::take(&mut tree.edges) {
        let parent = *remap.get(&parent).unwrap_or(&parent);
        let child = *remap.get(&child).unwrap_or(&child);
        new_edges.insert((parent, child), info);
    }
    tree.edges = new_edges;

    // Re-key ancestry: both the subject id and every id in its path.
    let mut new_ancestry = BTreeMap::new();
    for (id, path) in std::mem::take(&mut tree.ancestry) {
        let id = *remap.get(&id).unwrap_or(&id);
        let path = path
            .into_iter()
            .map(|p| *remap.get(&p).unwrap_or(&p))
            .collect();
        new_ancestry.insert(id, path);
    }
    tree.ancestry = new_ancestry;

    // Re-key node hashes.
    let mut new_hashes = BTreeMap::new();
    for (id, hash) in std::mem::take(&mut tree.node_hashes) {
        let id = *remap.get(&id).unwrap_or(&id);
        new_hashes.insert(id, hash);
    }
    tree.node_hashes = new_hashes;

    if let Some(&new_root) = remap.get(&tree.root_ecs_id) {
        tree.root_ecs_id = new_root;
        tree.structural_hash = *tree.node_hashes.get(&new_root).unwrap_or(&tree.structural_hash);
    }

    remap
}

/// Stamp every node in `tree` with the tree's actual root identity.
///
/// Domain entities are constructed as their own root (`EntityMeta::new`)
/// before anything attaches them anywhere, so every structural edit —
/// first registration, a version fork that changes the root id, detach,
/// attach — must refresh `root_ecs_id`/`root_live_id` across the whole
/// tree to keep it consistent with where the node actually now lives.
pub(crate) fn sync_root_meta(tree: &mut BuiltTree) {
    let root_id = tree.root_ecs_id;
    let Some(root_live_id) = tree.nodes.get(&root_id).map(|n| n.meta().live_id) else {
        return;
    };
    for node in tree.nodes.values_mut() {
        let meta = node.meta_mut();
        meta.root_ecs_id = root_id;
        meta.root_live_id = root_live_id;
    }
}

/// Recompute every node's structural hash purely from the tree's own
/// `nodes`/`edges` bookkeeping (no live graph access). Used after
/// structural edits — detach, attach — that change which children a node
/// has without rebuilding from the original `Traversable` graph.
pub(crate) fn recompute_node_hashes(tree: &BuiltTree) -> BTreeMap<EcsId, u64> {
    let mut children_of: HashMap<EcsId, Vec<(&EdgeInfo, EcsId)>> = HashMap::new();
    for ((parent, child), info) in &tree.edges {
        children_of.entry(*parent).or_default().push((info, *child));
    }

    let mut memo: HashMap<EcsId, u64> = HashMap::new();
    for &node_id in tree.nodes.keys() {
        compute_one(node_id, tree, &children_of, &mut memo);
    }
    memo.into_iter().collect()
}

fn compute_one(
    node_id: EcsId,
    tree: &BuiltTree,
    children_of: &HashMap<EcsId, Vec<(&EdgeInfo, EcsId)>>,
    memo: &mut HashMap<EcsId, u64>,
) -> u64 {
    if let Some(h) = memo.get(&node_id) {
        return *h;
    }
    let node = tree
        .nodes
        .get(&node_id)
        .expect("every edge endpoint is indexed in nodes");
    let own_hash = node.own_content_hash();

    let mut field_order: Vec<String> = Vec::new();
    let mut field_groups: HashMap<String, (ContainerKind, Vec<(IndexOrKey, u64)>)> = HashMap::new();

    if let Some(edges) = children_of.get(&node_id) {
        for (info, child_id) in edges {
            let child_hash = match info.ownership {
                Ownership::Reference => hash_reference(*child_id),
                Ownership::Hierarchical => compute_one(*child_id, tree, children_of, memo),
            };
            if !field_order.contains(&info.field_name) {
                field_order.push(info.field_name.clone());
            }
            field_groups
                .entry(info.field_name.clone())
                .or_insert_with(|| (info.container_kind, Vec::new()))
                .1
                .push((info.index_or_key.clone(), child_hash));
        }
    }

    let mut field_hashes = Vec::with_capacity(field_order.len());
    for name in field_order {
        let (kind, entries) = field_groups.remove(&name).expect("field just inserted");
        field_hashes.push((name, combine_container(kind, entries)));
    }

    let hash = hash_node(node.type_name(), own_hash, &field_hashes);
    memo.insert(node_id, hash);
    hash
}
