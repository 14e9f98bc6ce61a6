//! Tree construction: the `BuiltTree` snapshot and its builder

use crate::edge::{ContainerKind, EdgeInfo, IndexOrKey, Ownership};
use crate::error::GraphError;
use crate::hash::{combine_container, hash_node, hash_reference};
use crate::traversable::{RootOracle, Traversable};
use entity_core::{EcsId, Entity};
use std::collections::{BTreeMap, HashMap, HashSet};

/// A pure snapshot of one entity tree: every reachable node, the edges
/// between them, ancestry paths to the root, and the root's structural
/// hash — the tree's identity content signature (§4.A).
pub struct BuiltTree {
    /// `ecs_id` of the tree's root.
    pub root_ecs_id: EcsId,
    /// Every node reachable via hierarchical or reference edges, keyed by
    /// `ecs_id`.
    pub nodes: BTreeMap<EcsId, Box<dyn Traversable>>,
    /// Edge metadata keyed by `(parent_ecs_id, child_ecs_id)`.
    pub edges: BTreeMap<(EcsId, EcsId), EdgeInfo>,
    /// For every node, the path of ancestor `ecs_id`s from the root down
    /// to (but not including) that node. The root's entry is empty.
    pub ancestry: BTreeMap<EcsId, Vec<EcsId>>,
    /// The root's structural hash. Used exclusively to decide divergence
    /// (§4.B); never compared across different roots for any other
    /// purpose.
    pub structural_hash: u64,
    /// Every non-root node's own structural hash, keyed by `ecs_id`. The
    /// registry's divergence walk uses this to find exactly which nodes
    /// changed rather than only knowing the tree as a whole diverged.
    pub node_hashes: BTreeMap<EcsId, u64>,
}

impl BuiltTree {
    /// Every node that is a hierarchical child of some other node in this
    /// tree (i.e. everything except the root and reference targets).
    pub fn hierarchical_children(&self) -> impl Iterator<Item = EcsId> + '_ {
        self.edges
            .iter()
            .filter(|(_, info)| info.ownership == Ownership::Hierarchical)
            .map(|((_, child), _)| *child)
    }
}

/// Walks an entity graph into a [`BuiltTree`].
pub struct TreeBuilder;

impl TreeBuilder {
    /// Build a tree rooted at `root`, consulting `oracle` to decide
    /// whether an otherwise-hierarchical child is actually a reference
    /// because it is already registered as someone else's root.
    pub fn build(
        root: &dyn Traversable,
        oracle: &dyn RootOracle,
    ) -> Result<BuiltTree, GraphError> {
        let root_id = root.meta().ecs_id;
        let mut state = BuildState {
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            ancestry: BTreeMap::new(),
            owner_of: HashMap::new(),
            visiting: HashSet::new(),
            hash_cache: HashMap::new(),
            oracle,
        };

        state.nodes.insert(root_id, root.clone_box());
        state.ancestry.insert(root_id, Vec::new());
        state.visiting.insert(root_id);
        let structural_hash = state.visit(root, root_id, &[])?;
        state.visiting.remove(&root_id);
        state.hash_cache.insert(root_id, structural_hash);

        Ok(BuiltTree {
            root_ecs_id: root_id,
            nodes: state.nodes,
            edges: state.edges,
            ancestry: state.ancestry,
            structural_hash,
            node_hashes: state.hash_cache.into_iter().collect(),
        })
    }
}

struct BuildState<'o> {
    nodes: BTreeMap<EcsId, Box<dyn Traversable>>,
    edges: BTreeMap<(EcsId, EcsId), EdgeInfo>,
    ancestry: BTreeMap<EcsId, Vec<EcsId>>,
    owner_of: HashMap<EcsId, EcsId>,
    visiting: HashSet<EcsId>,
    hash_cache: HashMap<EcsId, u64>,
    oracle: &'o dyn RootOracle,
}

impl<'o> BuildState<'o> {
    fn visit(&mut self, node: &dyn Traversable, node_id: EcsId, path: &[EcsId]) -> Result<u64, GraphError> {
        let own_hash = node.own_content_hash();

        // Group children by field name, preserving first-seen field order,
        // so that a container field's elements are combined into one
        // field-level hash before being folded into the node's hash.
        let mut field_order: Vec<String> = Vec::new();
        let mut field_groups: HashMap<String, (ContainerKind, Vec<(IndexOrKey, u64)>)> =
            HashMap::new();

        for child_edge in node.children() {
            let child_id = child_edge.child.meta().ecs_id;

            let is_cycle = self.visiting.contains(&child_id);
            let is_preregistered_root = self.oracle.is_registered_root(child_id);
            let ownership = if child_edge.declared_ownership == Ownership::Reference
                || is_cycle
                || is_preregistered_root
            {
                Ownership::Reference
            } else {
                Ownership::Hierarchical
            };

            let child_hash = match ownership {
                Ownership::Reference => hash_reference(child_id),
                Ownership::Hierarchical => {
                    if let Some(existing_parent) = self.owner_of.get(&child_id) {
                        if *existing_parent != node_id {
                            return Err(GraphError::IncoherentOwnership {
                                child: child_id,
                                first_parent: *existing_parent,
                                second_parent: node_id,
                            });
                        }
                    } else {
                        self.owner_of.insert(child_id, node_id);
                    }

                    if let Some(cached) = self.hash_cache.get(&child_id) {
                        *cached
                    } else {
                        self.nodes.insert(child_id, child_edge.child.clone_box());
                        let mut child_path = path.to_vec();
                        child_path.push(node_id);
                        self.ancestry.insert(child_id, child_path.clone());

                        self.visiting.insert(child_id);
                        let hash = self.visit(child_edge.child, child_id, &child_path)?;
                        self.visiting.remove(&child_id);

                        self.hash_cache.insert(child_id, hash);
                        hash
                    }
                }
            };

            self.edges.insert(
                (node_id, child_id),
                EdgeInfo {
                    field_name: child_edge.field_name.clone(),
                    container_kind: child_edge.container,
                    index_or_key: child_edge.index_or_key.clone(),
                    ownership,
                },
            );

            if !field_order.contains(&child_edge.field_name) {
                field_order.push(child_edge.field_name.clone());
            }
            field_groups
                .entry(child_edge.field_name.clone())
                .or_insert_with(|| (child_edge.container, Vec::new()))
                .1
                .push((child_edge.index_or_key, child_hash));
        }

        let mut field_hashes = Vec::with_capacity(field_order.len());
        for name in field_order {
            let (kind, entries) = field_groups.remove(&name).expect("field was just inserted");
            field_hashes.push((name, combine_container(kind, entries)));
        }

        Ok(hash_node(node.type_name(), own_hash, &field_hashes))
    }
}
