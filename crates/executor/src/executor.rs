//! The execution engine state machine (§4.E.7)
//!
//! `CLASSIFY → RESOLVE → ISOLATE → RUN → ANALYZE → COMMIT`, falling to
//! `FAIL` from any step. Each step is a plain method below so the state
//! machine reads top to bottom in [`Executor::run`]; `tracing` spans (not
//! an explicit state enum) carry the step name, matching how the teacher
//! instruments its own multi-phase operations.

use crate::callable::FunctionSpec;
use crate::error::{ExecutorError, ExecutorResult};
use crate::isolation::{detect_semantic, isolate, IsolatedInput};
use crate::log::ExecutionLog;
use crate::return_pattern::unpack;
use crate::strategy::select_strategy;
use crate::value::ExecutorValue;
use entity_core::{EcsId, ExecutionSemantic, FunctionExecution, Timestamp, Value};
use entity_events::{Event, EventBus, EventKind};
use entity_registry::Registry;
use entity_resolver::{classify, resolve, InputPattern, RawInput, ResolvedValue};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::callable::CallableRegistry;

/// The outcome of one completed (successful) call.
pub struct ExecutionOutcome {
    /// The committed record of this call.
    pub execution: FunctionExecution,
    /// The callable's return value, with every entity's identity already
    /// reconciled against the registry.
    pub return_value: ExecutorValue,
}

/// Ties the registry, callable table, and event bus together into one
/// dispatchable engine.
pub struct Executor {
    registry: Arc<Registry>,
    callables: Arc<CallableRegistry>,
    events: EventBus,
    log: ExecutionLog,
}

impl Executor {
    /// Build an executor over shared registry and callable table handles,
    /// plus an event bus handle (already cheaply `Clone`, so taken by
    /// value rather than wrapped in another `Arc`).
    pub fn new(registry: Arc<Registry>, callables: Arc<CallableRegistry>, events: EventBus) -> Self {
        Self { registry, callables, events, log: ExecutionLog::new() }
    }

    /// The execution log of every call this executor has run.
    pub fn log(&self) -> &ExecutionLog {
        &self.log
    }

    /// Dispatch a call synchronously. Lifecycle events are not published
    /// (publishing is inherently async); use [`Executor::execute_async`]
    /// from an async context to also get event notifications.
    #[instrument(skip(self, inputs), fields(function = function_name))]
    pub fn execute(&self, function_name: &str, inputs: BTreeMap<String, RawInput>) -> ExecutorResult<ExecutionOutcome> {
        let (outcome, _events) = self.run(function_name, inputs)?;
        Ok(outcome)
    }

    /// Dispatch a call and publish its lifecycle events on the event bus.
    pub async fn execute_async(
        &self,
        function_name: &str,
        inputs: BTreeMap<String, RawInput>,
    ) -> ExecutorResult<ExecutionOutcome> {
        match self.run(function_name, inputs) {
            Ok((outcome, events)) => {
                for event in events {
                    self.events.publish(event).await;
                }
                Ok(outcome)
            }
            Err((err, events)) => {
                for event in events {
                    self.events.publish(event).await;
                }
                Err(err)
            }
        }
    }

    /// The full CLASSIFY → COMMIT pipeline, returning either the outcome
    /// or the error, each paired with the lifecycle events it produced
    /// (FunctionStarted plus FunctionCompleted/FunctionFailed).
    fn run(
        &self,
        function_name: &str,
        raw_inputs: BTreeMap<String, RawInput>,
    ) -> Result<(ExecutionOutcome, Vec<Event>), (ExecutorError, Vec<Event>)> {
        let mut execution = FunctionExecution::started(function_name);
        let fingerprint = fingerprint_of(execution.meta.ecs_id);
        let mut events = vec![Event::new(EventKind::FunctionStarted)
            .with_fingerprint(fingerprint)
            .with_payload("function_name", function_name)];

        match self.run_inner(function_name, raw_inputs, &mut execution) {
            Ok(return_value) => {
                execution.success = true;
                execution.completed_at = Some(Timestamp::now());
                events.push(
                    Event::new(EventKind::FunctionCompleted)
                        .with_fingerprint(fingerprint)
                        .with_payload("function_name", function_name),
                );
                self.log.record(execution.clone());
                Ok((ExecutionOutcome { execution, return_value }, events))
            }
            Err(err) => {
                execution.success = false;
                execution.error_message = Some(err.to_string());
                execution.completed_at = Some(Timestamp::now());
                events.push(
                    Event::new(EventKind::FunctionFailed)
                        .with_fingerprint(fingerprint)
                        .with_payload("function_name", function_name)
                        .with_payload("error", err.to_string()),
                );
                self.log.record(execution);
                Err((err, events))
            }
        }
    }

    fn run_inner(
        &self,
        function_name: &str,
        raw_inputs: BTreeMap<String, RawInput>,
        execution: &mut FunctionExecution,
    ) -> ExecutorResult<ExecutorValue> {
        let spec = self.callables.get(function_name)?;

        // CLASSIFY
        let classified = classify(&spec.params, raw_inputs)?;
        execution.strategy = select_strategy(&classified).to_string();

        // RESOLVE + ISOLATE
        let mut args = BTreeMap::new();
        let mut isolated_inputs: Vec<IsolatedInput> = Vec::new();
        for (name, pattern) in classified {
            let (value, isolated, config_id) = self.bind_argument(&spec, &name, pattern)?;
            if let Some(isolated) = isolated {
                execution.input_entity_ids.push(isolated.copy.meta().ecs_id);
                isolated_inputs.push(isolated);
            }
            if let Some(config_id) = config_id {
                execution.config_entity_ids.push(config_id);
            }
            args.insert(name, value);
        }

        // RUN
        debug!(function = function_name, "invoking callable");
        let return_value = (spec.callable)(args)
            .map_err(|message| ExecutorError::CallableFailed { function: function_name.to_string(), message })?;

        // ANALYZE
        let (pattern, output_entities, groups) = unpack(return_value);
        execution.return_pattern = pattern.to_string();

        // COMMIT
        let mut committed_ids = Vec::with_capacity(output_entities.len());
        for mut entity in output_entities {
            let semantic = detect_semantic(entity.as_ref(), &isolated_inputs);
            let ecs_id = match semantic {
                ExecutionSemantic::Creation => {
                    self.registry
                        .register_root(entity.as_ref())
                        .map_err(|source| ExecutorError::Commit(entity.meta().ecs_id, source))?;
                    entity.meta().ecs_id
                }
                ExecutionSemantic::Mutation => {
                    let outcome = self
                        .registry
                        .version_if_diverged(entity.as_ref())
                        .map_err(|source| ExecutorError::Commit(entity.meta().ecs_id, source))?;
                    outcome
                        .remapped_ids
                        .get(&entity.meta().ecs_id)
                        .copied()
                        .unwrap_or_else(|| entity.meta().ecs_id)
                }
                ExecutionSemantic::Detachment => {
                    let target = entity.meta().ecs_id;
                    self.registry
                        .detach(target)
                        .map_err(|source| ExecutorError::Commit(target, source))?;
                    target
                }
            };
            execution.output_semantics.insert(ecs_id, semantic);
            committed_ids.push(ecs_id);
        }
        execution.output_entity_ids = committed_ids.clone();
        execution.sibling_groups = groups
            .into_iter()
            .map(|group| group.into_iter().map(|index| committed_ids[index]).collect())
            .collect();

        if !execution.sibling_groups_are_consistent() {
            return Err(ExecutorError::InconsistentSiblingGroups(function_name.to_string()));
        }

        // Re-resolve committed outputs from the registry so the return
        // value carries each entity's authoritative (possibly forked)
        // identity rather than the pre-commit copy's.
        let resolved_outputs: ExecutorResult<Vec<_>> = committed_ids
            .iter()
            .map(|id| {
                self.registry
                    .get_by_ecs_id(*id)
                    .map_err(|source| ExecutorError::Commit(*id, source))
            })
            .collect();
        let resolved_outputs = resolved_outputs?;
        Ok(rebuild_return_value(pattern, resolved_outputs))
    }

    /// Bind one classified input to its argument value. The third element
    /// of the result is the `ecs_id` of a freshly synthesized
    /// `ConfigEntity`, if this argument was one (§4.E.3 residual strategy,
    /// recorded on `FunctionExecution::config_entity_ids`).
    fn bind_argument(
        &self,
        spec: &FunctionSpec,
        name: &str,
        pattern: InputPattern,
    ) -> ExecutorResult<(ExecutorValue, Option<IsolatedInput>, Option<EcsId>)> {
        match pattern {
            InputPattern::EntityParam(entity) => {
                let isolated = isolate(name, entity.as_ref());
                let bound = isolated.copy.clone_box();
                Ok((ExecutorValue::Entity(bound), Some(isolated), None))
            }
            InputPattern::AddressRef(address) => match resolve(&self.registry, &address)? {
                ResolvedValue::Entity(entity) => {
                    let isolated = isolate(name, entity.as_ref());
                    let bound = isolated.copy.clone_box();
                    Ok((ExecutorValue::Entity(bound), Some(isolated), None))
                }
                ResolvedValue::Value { value, .. } => Ok((ExecutorValue::Value(value), None, None)),
            },
            InputPattern::Literal(value) => Ok((ExecutorValue::Value(value), None, None)),
            InputPattern::ConfigPrimitive(value) => {
                let fields = match value {
                    Value::Map(fields) => fields,
                    _ => BTreeMap::new(),
                };
                let constructor = spec
                    .config_constructors
                    .get(name)
                    .ok_or_else(|| ExecutorError::MissingConfigConstructor(name.to_string()))?;
                let built = constructor(fields)
                    .map_err(|source| ExecutorError::ConfigConstruction { param: name.to_string(), source })?;
                let config_id = match &built {
                    ExecutorValue::Entity(entity) => {
                        self.registry
                            .register_root(entity.as_ref())
                            .map_err(|source| ExecutorError::Commit(entity.meta().ecs_id, source))?;
                        Some(entity.meta().ecs_id)
                    }
                    _ => None,
                };
                Ok((built, None, config_id))
            }
        }
    }
}

/// Derive a stable fingerprint for one execution's causal chain from its
/// own `ecs_id`, used to break event-handler cascades (§4.D).
fn fingerprint_of(ecs_id: EcsId) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    ecs_id.hash(&mut hasher);
    hasher.finish()
}

fn rebuild_return_value(
    pattern: crate::return_pattern::ReturnPattern,
    mut entities: Vec<Box<dyn entity_graph::Traversable>>,
) -> ExecutorValue {
    use crate::return_pattern::ReturnPattern;
    match pattern {
        ReturnPattern::None => ExecutorValue::None,
        ReturnPattern::SingleEntity | ReturnPattern::SingleValue => entities
            .pop()
            .map(ExecutorValue::Entity)
            .unwrap_or(ExecutorValue::None),
        ReturnPattern::EntityTuple | ReturnPattern::Mixed => {
            ExecutorValue::Tuple(entities.into_iter().map(ExecutorValue::Entity).collect())
        }
        ReturnPattern::List | ReturnPattern::Nested => {
            ExecutorValue::List(entities.into_iter().map(ExecutorValue::Entity).collect())
        }
        ReturnPattern::Map => ExecutorValue::List(entities.into_iter().map(ExecutorValue::Entity).collect()),
    }
}
