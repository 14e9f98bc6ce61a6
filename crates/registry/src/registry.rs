//! The public registry API (§4.B, §6 Registry API)
//!
//! A single [`parking_lot::RwLock`] guards all index mutation. Tree builds
//! (which may walk an arbitrarily large live graph) happen *outside* the
//! write lock, consulting the index through a read lock via
//! [`RegistryOracle`]; the write lock is only taken to commit the result,
//! re-checking the precondition that motivated the build in the first
//! place. This mirrors the optimistic-build-then-commit shape the teacher
//! uses for its branch manager: expensive work never happens while holding
//! the lock other writers are waiting on.

use crate::error::{RegistryError, RegistryResult};
use crate::indexes::RegistryInner;
use crate::versioning::{apply_id_remap, changed_ids, recompute_node_hashes, sync_root_meta, DivergenceOutcome};
use entity_core::{EcsId, Entity, LineageId, LiveId};
use entity_graph::{BuiltTree, ContainerKind, EdgeInfo, IndexOrKey, Ownership, RootOracle, TreeBuilder, Traversable};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// The process-wide entity registry.
///
/// Holds one [`BuiltTree`] per registered root and the indexes that map
/// `ecs_id`/`live_id`/`lineage_id`/type name back to it.
#[derive(Default)]
pub struct Registry {
    inner: RwLock<RegistryInner>,
}

struct RegistryOracle<'a> {
    inner: &'a RwLock<RegistryInner>,
    exclude: Option<EcsId>,
}

impl RootOracle for RegistryOracle<'_> {
    fn is_registered_root(&self, ecs_id: EcsId) -> bool {
        if self.exclude == Some(ecs_id) {
            return false;
        }
        self.inner.read().trees.contains_key(&ecs_id)
    }
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree for `root` and register it as a new root (§4.B
    /// Operations, `register_root`).
    #[instrument(skip(self, root), fields(ecs_id = %root.meta().ecs_id))]
    pub fn register_root(&self, root: &dyn Traversable) -> RegistryResult<()> {
        let root_id = root.meta().ecs_id;
        {
            let guard = self.inner.read();
            if guard.ecs_index.contains_key(&root_id) {
                return Err(RegistryError::AlreadyRegistered(root_id));
            }
        }

        let oracle = RegistryOracle { inner: &self.inner, exclude: None };
        let mut tree = TreeBuilder::build(root, &oracle)?;
        sync_root_meta(&mut tree);

        let mut guard = self.inner.write();
        if guard.ecs_index.contains_key(&root_id) {
            return Err(RegistryError::AlreadyRegistered(root_id));
        }
        guard.index_tree(&tree);
        guard.trees.insert(root_id, tree);
        debug!("registered new root");
        Ok(())
    }

    /// Look up a node by `ecs_id`, cloning it out of whichever tree it
    /// belongs to.
    pub fn get_by_ecs_id(&self, ecs_id: EcsId) -> RegistryResult<Box<dyn Traversable>> {
        let guard = self.inner.read();
        let root_id = guard
            .ecs_index
            .get(&ecs_id)
            .ok_or_else(|| RegistryError::NotFound(ecs_id.to_string()))?;
        let tree = guard.trees.get(root_id).expect("ecs_index entries always point at a live tree");
        tree.nodes
            .get(&ecs_id)
            .map(|n| n.clone_box())
            .ok_or_else(|| RegistryError::NotFound(ecs_id.to_string()))
    }

    /// Look up a node by `live_id`.
    pub fn get_by_live_id(&self, live_id: LiveId) -> RegistryResult<Box<dyn Traversable>> {
        let guard = self.inner.read();
        let (root_id, ecs_id) = guard
            .live_index
            .get(&live_id)
            .copied()
            .ok_or(RegistryError::StaleLiveId(live_id))?;
        let tree = guard.trees.get(&root_id).expect("live_index entries always point at a live tree");
        tree.nodes
            .get(&ecs_id)
            .map(|n| n.clone_box())
            .ok_or(RegistryError::StaleLiveId(live_id))
    }

    /// Every current root of the given domain type (§4.B, `by_type`).
    pub fn by_type(&self, type_name: &str) -> Vec<Box<dyn Traversable>> {
        let guard = self.inner.read();
        let Some(root_ids) = guard.type_index.get(type_name) else {
            return Vec::new();
        };
        root_ids
            .iter()
            .filter_map(|id| guard.trees.get(id))
            .filter_map(|tree| tree.nodes.get(&tree.root_ecs_id))
            .map(|n| n.clone_box())
            .collect()
    }

    /// Every `ecs_id` a logical entity has ever held, oldest first
    /// (§4.B, `by_lineage`). Only identities are returned: the registry
    /// does not retain full node bodies for superseded versions.
    pub fn by_lineage(&self, lineage_id: LineageId) -> Vec<EcsId> {
        self.inner
            .read()
            .lineage_index
            .get(&lineage_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Rebuild the tree rooted at `live_root` and compare it against the
    /// registered version. If the structural hash differs, every node on
    /// the path from the changed content up to the root is assigned a
    /// fresh `ecs_id` (Invariant 2); nodes outside that path keep theirs.
    ///
    /// The registry only ever mutates the [`BuiltTree`] snapshot it owns.
    /// `live_root` is read-only here; a caller holding the same live
    /// object the registry just re-identified is responsible for applying
    /// [`DivergenceOutcome::remapped_ids`] to it (the executor does this
    /// automatically when returning a mutated entity to a caller).
    #[instrument(skip(self, live_root), fields(root_ecs_id = %live_root.meta().root_ecs_id))]
    pub fn version_if_diverged(&self, live_root: &dyn Traversable) -> RegistryResult<DivergenceOutcome> {
        let known_root_id = live_root.meta().root_ecs_id;
        let old_structural_hash = {
            let guard = self.inner.read();
            let old_tree = guard
                .trees
                .get(&known_root_id)
                .ok_or_else(|| RegistryError::NotFound(known_root_id.to_string()))?;
            old_tree.structural_hash
        };

        let oracle = RegistryOracle { inner: &self.inner, exclude: Some(known_root_id) };
        let mut new_tree = TreeBuilder::build(live_root, &oracle)?;

        if new_tree.structural_hash == old_structural_hash {
            return Ok(DivergenceOutcome::default());
        }

        let mut guard = self.inner.write();
        let old_tree = guard
            .trees
            .remove(&known_root_id)
            .ok_or_else(|| RegistryError::NotFound(known_root_id.to_string()))?;
        guard.deindex_tree(&old_tree);

        let changed = changed_ids(&old_tree.node_hashes, &new_tree.node_hashes);
        let remapped_ids = apply_id_remap(&mut new_tree, &changed);
        sync_root_meta(&mut new_tree);

        guard.index_tree(&new_tree);
        guard.trees.insert(new_tree.root_ecs_id, new_tree);
        debug!(changed = remapped_ids.len(), "tree diverged, forked versions");

        Ok(DivergenceOutcome { diverged: true, remapped_ids })
    }

    /// Sever `subtree_ecs_id` from its current parent, registering it as
    /// the root of its own new tree (§4.B, `detach`; lifecycle:
    /// *Detached*). Detaching an entity that is already a root is a no-op.
    /// The former parent's ancestry loses a child, which changes its own
    /// hash, so the parent chain is versioned as part of the same
    /// operation (Open Question: detachment forces a parent fork).
    #[instrument(skip(self))]
    pub fn detach(&self, subtree_ecs_id: EcsId) -> RegistryResult<()> {
        let mut guard = self.inner.write();
        let parent_root_id = *guard
            .ecs_index
            .get(&subtree_ecs_id)
            .ok_or_else(|| RegistryError::NotFound(subtree_ecs_id.to_string()))?;

        if subtree_ecs_id == parent_root_id {
            return Ok(());
        }

        let mut old_tree = guard.trees.remove(&parent_root_id).expect("ecs_index is consistent with trees");
        guard.deindex_tree(&old_tree);

        let severed_edge = old_tree
            .edges
            .keys()
            .find(|(_, child)| *child == subtree_ecs_id)
            .copied()
            .filter(|key| old_tree.edges[key].ownership == Ownership::Hierarchical);
        let Some(severed_edge) = severed_edge else {
            guard.index_tree(&old_tree);
            guard.trees.insert(parent_root_id, old_tree);
            return Err(RegistryError::DetachNonHierarchical(subtree_ecs_id));
        };

        let detached_ids: std::collections::HashSet<EcsId> = old_tree
            .ancestry
            .iter()
            .filter(|(_, path)| path.contains(&subtree_ecs_id))
            .map(|(id, _)| *id)
            .chain(std::iter::once(subtree_ecs_id))
            .collect();

        old_tree.edges.remove(&severed_edge);

        let mut new_nodes = BTreeMap::new();
        for id in &detached_ids {
            if let Some(node) = old_tree.nodes.remove(id) {
                new_nodes.insert(*id, node);
            }
        }

        let mut new_edges = BTreeMap::new();
        old_tree.edges.retain(|(parent, child), info| {
            if detached_ids.contains(parent) && detached_ids.contains(child) {
                new_edges.insert((*parent, *child), info.clone());
                false
            } else {
                true
            }
        });

        let prefix = old_tree.ancestry.get(&subtree_ecs_id).cloned().unwrap_or_default();
        let mut new_ancestry = BTreeMap::new();
        for id in &detached_ids {
            if let Some(path) = old_tree.ancestry.remove(id) {
                let relative = path.strip_prefix(prefix.as_slice()).unwrap_or(&path).to_vec();
                new_ancestry.insert(*id, relative);
            }
        }

        let mut new_node_hashes = BTreeMap::new();
        for id in &detached_ids {
            if let Some(h) = old_tree.node_hashes.remove(id) {
                new_node_hashes.insert(*id, h);
            }
        }
        let detached_structural_hash = *new_node_hashes.get(&subtree_ecs_id).unwrap_or(&0);

        let mut new_root_tree = BuiltTree {
            root_ecs_id: subtree_ecs_id,
            nodes: new_nodes,
            edges: new_edges,
            ancestry: new_ancestry,
            structural_hash: detached_structural_hash,
            node_hashes: new_node_hashes,
        };
        sync_root_meta(&mut new_root_tree);

        // The parent's own hash (and every ancestor's) changed by losing a
        // child; fork every node whose recomputed hash differs from what
        // was indexed before this edit. `old_tree.node_hashes` already
        // holds the pre-edit values at this point since we only recompute
        // in place, so snapshot first.
        let pre_edit_hashes = old_tree.node_hashes.clone();
        old_tree.node_hashes = recompute_node_hashes(&old_tree);
        old_tree.structural_hash = *old_tree.node_hashes.get(&old_tree.root_ecs_id).unwrap_or(&old_tree.structural_hash);
        let changed = changed_ids(&pre_edit_hashes, &old_tree.node_hashes);
        apply_id_remap(&mut old_tree, &changed);
        sync_root_meta(&mut old_tree);

        guard.index_tree(&old_tree);
        guard.trees.insert(old_tree.root_ecs_id, old_tree);
        guard.index_tree(&new_root_tree);
        guard.trees.insert(new_root_tree.root_ecs_id, new_root_tree);

        Ok(())
    }

    /// Attach a currently-root entity as a hierarchical child of
    /// `parent_ecs_id` under `field` (§4.B, `attach`). A no-op if that
    /// exact edge already exists.
    #[instrument(skip(self))]
    pub fn attach(&self, subtree_ecs_id: EcsId, parent_ecs_id: EcsId, field: &str) -> RegistryResult<()> {
        let mut guard = self.inner.write();

        let subtree_root = *guard
            .ecs_index
            .get(&subtree_ecs_id)
            .ok_or_else(|| RegistryError::NotFound(subtree_ecs_id.to_string()))?;
        if subtree_root != subtree_ecs_id {
            return Err(RegistryError::NotFound(format!(
                "{subtree_ecs_id} is not currently a root and cannot be attached"
            )));
        }
        let parent_root_id = *guard
            .ecs_index
            .get(&parent_ecs_id)
            .ok_or_else(|| RegistryError::NotFound(parent_ecs_id.to_string()))?;
        if parent_root_id == subtree_ecs_id {
            return Err(RegistryError::NotFound(format!(
                "cannot attach {subtree_ecs_id} to itself"
            )));
        }

        let mut parent_tree = guard.trees.remove(&parent_root_id).expect("ecs_index is consistent with trees");
        if parent_tree
            .edges
            .get(&(parent_ecs_id, subtree_ecs_id))
            .is_some_and(|e| e.field_name == field && e.ownership == Ownership::Hierarchical)
        {
            guard.trees.insert(parent_root_id, parent_tree);
            return Ok(());
        }
        guard.deindex_tree(&parent_tree);

        let subtree = guard.trees.remove(&subtree_ecs_id).expect("ecs_index is consistent with trees");
        guard.deindex_tree(&subtree);

        let parent_prefix = parent_tree.ancestry.get(&parent_ecs_id).cloned().unwrap_or_default();
        let mut joined_prefix = parent_prefix;
        joined_prefix.push(parent_ecs_id);

        for (id, node) in subtree.nodes {
            parent_tree.nodes.insert(id, node);
        }
        for ((p, c), info) in subtree.edges {
            parent_tree.edges.insert((p, c), info);
        }
        for (id, relative) in subtree.ancestry {
            let mut full = joined_prefix.clone();
            full.extend(relative);
            parent_tree.ancestry.insert(id, full);
        }
        for (id, hash) in subtree.node_hashes {
            parent_tree.node_hashes.insert(id, hash);
        }

        parent_tree.edges.insert(
            (parent_ecs_id, subtree_ecs_id),
            EdgeInfo {
                field_name: field.to_string(),
                container_kind: ContainerKind::Direct,
                index_or_key: IndexOrKey::None,
                ownership: Ownership::Hierarchical,
            },
        );

        let pre_edit_hashes = parent_tree.node_hashes.clone();
        parent_tree.node_hashes = recompute_node_hashes(&parent_tree);
        parent_tree.structural_hash = *parent_tree
            .node_hashes
            .get(&parent_tree.root_ecs_id)
            .unwrap_or(&parent_tree.structural_hash);
        let changed = changed_ids(&pre_edit_hashes, &parent_tree.node_hashes);
        apply_id_remap(&mut parent_tree, &changed);
        sync_root_meta(&mut parent_tree);

        guard.index_tree(&parent_tree);
        guard.trees.insert(parent_tree.root_ecs_id, parent_tree);

        Ok(())
    }
}
