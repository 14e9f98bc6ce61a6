//! The `FunctionExecution` entity subtype
//!
//! Every call through the callable engine (§4.E.7) is recorded as a
//! `FunctionExecution`: an ordinary entity describing what happened,
//! attached to the registry exactly like any domain entity. It lives in
//! `entity-core` (rather than `entity-executor`) because the executor
//! crate needs to depend on the registry crate, and the registry
//! registers `FunctionExecution`s just like anything else — putting the
//! type one layer down avoids a cycle.

use crate::entity::{Entity, EntityMeta};
use crate::ids::EcsId;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The detected relationship between a returned entity and the call's
/// inputs (§4.E.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionSemantic {
    /// The returned entity is (by identity) one of the input copies.
    Mutation,
    /// The returned entity is a sub-entity of an input copy, reachable
    /// through hierarchical edges, but is not the copy itself.
    Detachment,
    /// The returned entity is neither an input copy nor reachable from one.
    Creation,
}

impl std::fmt::Display for ExecutionSemantic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExecutionSemantic::Mutation => "mutation",
            ExecutionSemantic::Detachment => "detachment",
            ExecutionSemantic::Creation => "creation",
        };
        write!(f, "{s}")
    }
}

/// A record of one call through the callable engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionExecution {
    /// Standard entity bookkeeping; `FunctionExecution` is registered like
    /// any other entity and is always its own tree root.
    pub meta: EntityMeta,
    /// Name the function was registered under.
    pub function_name: String,
    /// `ecs_id`s of every entity-typed input (post-copy, i.e. the original
    /// identities, not the isolated copies').
    pub input_entity_ids: Vec<EcsId>,
    /// `ecs_id`s of any `ConfigEntity` inputs, including synthesized ones.
    pub config_entity_ids: Vec<EcsId>,
    /// `ecs_id`s of every entity this call produced.
    pub output_entity_ids: Vec<EcsId>,
    /// Groups of outputs that were produced together by one call; every id
    /// in `output_entity_ids` appears in exactly one group (Invariant 9).
    pub sibling_groups: Vec<Vec<EcsId>>,
    /// The execution strategy selected for this call, as a short label
    /// (`"pure_borrowing"`, `"single_entity_direct"`, …).
    pub strategy: String,
    /// The return-pattern classification (`"B1"`..`"B7"`) of the function's
    /// return value.
    pub return_pattern: String,
    /// The detected semantic for each output, keyed by that output's
    /// `ecs_id`.
    pub output_semantics: BTreeMap<EcsId, ExecutionSemantic>,
    /// Whether the call completed without error.
    pub success: bool,
    /// The error message, if `success` is false.
    pub error_message: Option<String>,
    /// When CLASSIFY began.
    pub started_at: Timestamp,
    /// When COMMIT (or FAIL) finished.
    pub completed_at: Option<Timestamp>,
}

impl FunctionExecution {
    /// Start a new, in-progress execution record.
    pub fn started(function_name: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            function_name: function_name.into(),
            input_entity_ids: Vec::new(),
            config_entity_ids: Vec::new(),
            output_entity_ids: Vec::new(),
            sibling_groups: Vec::new(),
            strategy: String::new(),
            return_pattern: String::new(),
            output_semantics: BTreeMap::new(),
            success: false,
            error_message: None,
            started_at: Timestamp::now(),
            completed_at: None,
        }
    }

    /// Every sibling-group id appears exactly once across all groups
    /// (Invariant 9). Used by tests and by the executor's commit path as a
    /// sanity check before registering the record.
    pub fn sibling_groups_are_consistent(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        let mut total = 0;
        for group in &self.sibling_groups {
            for id in group {
                if !self.output_entity_ids.contains(id) {
                    return false;
                }
                seen.insert(*id);
                total += 1;
            }
        }
        seen.len() == total
    }
}

impl Entity for FunctionExecution {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn type_name(&self) -> &'static str {
        "FunctionExecution"
    }
}
