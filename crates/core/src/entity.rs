//! The entity trait and its bookkeeping fields
//!
//! Per the design notes, entities are kept purely data: [`EntityMeta`] holds
//! every field the model mandates (§3), with public fields and a couple of
//! constructors. Domain types embed an `EntityMeta` and implement
//! [`Entity`] to expose it; tree-walking, versioning, and borrowing all
//! live in the graph/registry/resolver crates as free functions operating
//! on `&dyn Entity` / `&mut dyn Entity`, never as methods on the entity
//! itself.

use crate::attribute_source::AttributeSource;
use crate::ids::{EcsId, LineageId, LiveId};
use crate::timestamp::Timestamp;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The bookkeeping fields every entity carries, independent of its domain
/// payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMeta {
    /// Identifier of this version.
    pub ecs_id: EcsId,
    /// Identifier of this in-memory instance.
    pub live_id: LiveId,
    /// Identifier shared by every version of this logical entity.
    pub lineage_id: LineageId,
    /// `ecs_id` of this entity's tree root.
    pub root_ecs_id: EcsId,
    /// `live_id` of this entity's tree root.
    pub root_live_id: LiveId,
    /// Immediate predecessor version, if any.
    pub previous_ecs_id: Option<EcsId>,
    /// Every `ecs_id` this logical entity has ever had, oldest first.
    pub old_ids: Vec<EcsId>,
    /// When this logical entity was first constructed.
    pub created_at: Timestamp,
    /// When the current version was forked, if it is not the original.
    pub forked_at: Option<Timestamp>,
    /// True iff this instance was reconstructed from storage rather than
    /// freshly constructed in this process.
    pub from_storage: bool,
    /// Per-field provenance: which source entity each borrowed field (or
    /// element) came from.
    pub attribute_source: BTreeMap<String, AttributeSource>,
    /// Free-form payload for fields not modeled by the domain struct.
    pub untyped_data: BTreeMap<String, Value>,
}

impl EntityMeta {
    /// Construct metadata for a brand-new, not-yet-registered entity.
    ///
    /// The entity starts as its own root; [`crate::Entity`] promotion or
    /// attachment into another tree updates `root_ecs_id`/`root_live_id`
    /// later (see the registry crate).
    pub fn new() -> Self {
        let ecs_id = EcsId::new();
        let live_id = LiveId::new();
        Self {
            ecs_id,
            live_id,
            lineage_id: LineageId::from_uuid(ecs_id.as_uuid()),
            root_ecs_id: ecs_id,
            root_live_id: live_id,
            previous_ecs_id: None,
            old_ids: Vec::new(),
            created_at: Timestamp::now(),
            forked_at: None,
            from_storage: false,
            attribute_source: BTreeMap::new(),
            untyped_data: BTreeMap::new(),
        }
    }

    /// Construct metadata for an entity reconstructed from storage,
    /// preserving every identity field but assigning a fresh `live_id`
    /// (Lifecycle: *Reconstructed*).
    pub fn reconstructed(mut self) -> Self {
        self.live_id = LiveId::new();
        self.root_live_id = if self.root_ecs_id == self.ecs_id {
            self.live_id
        } else {
            LiveId::new()
        };
        self.from_storage = true;
        self
    }

    /// A deep, identity-fresh copy: same `ecs_id`/lineage, new `live_id`.
    /// This is the isolation primitive the executor uses before invoking
    /// user functions (§4.E.4) and the primitive the registry uses to hand
    /// out read copies.
    pub fn copy_with_fresh_live_id(&self) -> Self {
        let mut copy = self.clone();
        copy.live_id = LiveId::new();
        copy
    }

    /// Whether this entity is currently the root of its own tree.
    pub fn is_root(&self) -> bool {
        self.ecs_id == self.root_ecs_id
    }
}

impl Default for EntityMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// Gives a data-only domain record access to its identity and provenance.
///
/// Implementations are expected to be a single delegation to an embedded
/// `EntityMeta` field plus a type-name literal; no other logic belongs
/// here.
pub trait Entity: std::fmt::Debug {
    /// Borrow this entity's bookkeeping fields.
    fn meta(&self) -> &EntityMeta;

    /// Mutably borrow this entity's bookkeeping fields.
    fn meta_mut(&mut self) -> &mut EntityMeta;

    /// The domain type name, used in structural hashing (§4.A) and in
    /// registry type-indexing (§4.B).
    fn type_name(&self) -> &'static str;
}
