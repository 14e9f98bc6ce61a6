//! Per-field provenance tracking
//!
//! `attribute_source` answers "which entity did this field's value come
//! from?" for every field that was populated via borrowing (§4.C) rather
//! than literal construction. The open question in the design notes — one
//! id for a whole container field, or one id per element — is resolved
//! here in favor of per-element: it is strictly more expressive (a list can
//! be partially borrowed, partially literal) and costs nothing extra to
//! carry.

use crate::ids::EcsId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Provenance for a single field.
///
/// `None` entries inside [`AttributeSource::List`] and
/// [`AttributeSource::Map`] mark elements that were set as literals rather
/// than borrowed from another entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeSource {
    /// The whole field was borrowed from one source entity.
    Single(EcsId),
    /// Each element of a list/tuple/set-valued field has its own source
    /// (or `None` if that element is a literal).
    List(Vec<Option<EcsId>>),
    /// Each entry of a map-valued field has its own source (or `None` if
    /// that entry's value is a literal).
    Map(BTreeMap<String, Option<EcsId>>),
}

impl AttributeSource {
    /// The single source id, if this is [`AttributeSource::Single`].
    pub fn as_single(&self) -> Option<EcsId> {
        match self {
            AttributeSource::Single(id) => Some(*id),
            _ => None,
        }
    }

    /// All distinct source ids referenced, regardless of shape.
    pub fn source_ids(&self) -> Vec<EcsId> {
        match self {
            AttributeSource::Single(id) => vec![*id],
            AttributeSource::List(ids) => ids.iter().filter_map(|id| *id).collect(),
            AttributeSource::Map(ids) => ids.values().filter_map(|id| *id).collect(),
        }
    }
}
