//! The execution log (§4.E.7)
//!
//! `FunctionExecution` lives in `entity-core` rather than `entity-graph`
//! (see that type's own doc comment), so it cannot implement
//! `entity_graph::Traversable` and cannot be registered into
//! [`entity_registry::Registry`] the way domain entities are. The executor
//! keeps its own append-only log instead — ordered by completion, indexed
//! by `ecs_id` and by function name — which is exactly the access pattern
//! `by_lineage`-style history queries need anyway.

use entity_core::{EcsId, FunctionExecution};
use parking_lot::RwLock;
use std::collections::HashMap;

/// An append-only record of every call the executor has completed or
/// failed.
#[derive(Default)]
pub struct ExecutionLog {
    records: RwLock<Vec<FunctionExecution>>,
    by_ecs_id: RwLock<HashMap<EcsId, usize>>,
}

impl ExecutionLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed (or failed) execution record.
    pub fn record(&self, execution: FunctionExecution) {
        let mut records = self.records.write();
        let index = records.len();
        self.by_ecs_id.write().insert(execution.meta.ecs_id, index);
        records.push(execution);
    }

    /// Look up one record by its `ecs_id`.
    pub fn get(&self, ecs_id: EcsId) -> Option<FunctionExecution> {
        let index = *self.by_ecs_id.read().get(&ecs_id)?;
        self.records.read().get(index).cloned()
    }

    /// Every record for a given function name, oldest first.
    pub fn by_function_name(&self, function_name: &str) -> Vec<FunctionExecution> {
        self.records
            .read()
            .iter()
            .filter(|execution| execution.function_name == function_name)
            .cloned()
            .collect()
    }

    /// Total number of recorded executions.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
