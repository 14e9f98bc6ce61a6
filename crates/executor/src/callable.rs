//! Callable registration (§4.E.1-3)

use crate::error::{ExecutorError, ExecutorResult};
use crate::value::ExecutorValue;
use entity_core::{CoreError, Value};
use entity_resolver::ParamSpec;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A registered function body. Receives its bound arguments keyed by
/// parameter name and returns the call's result, already shaped as one of
/// the B1-B7 return patterns.
pub type Callable = Box<dyn Fn(BTreeMap<String, ExecutorValue>) -> Result<ExecutorValue, String> + Send + Sync>;

/// Builds a `ConfigEntity` from caller-supplied primitive fields.
///
/// Registration is the one place a domain crate bridges its own
/// `ConfigEntity::from_primitives` to the executor's erased value model;
/// the executor itself never names a concrete `ConfigEntity` type.
pub type ConfigConstructor =
    Box<dyn Fn(BTreeMap<String, Value>) -> Result<ExecutorValue, CoreError> + Send + Sync>;

/// Everything the executor needs to dispatch one named function.
pub struct FunctionSpec {
    /// The name callers dispatch by.
    pub name: String,
    /// The declared parameter list, used for input classification.
    pub params: Vec<ParamSpec>,
    /// Constructors for any `ConfigEntity`-kind parameters, keyed by
    /// parameter name.
    pub config_constructors: HashMap<String, ConfigConstructor>,
    /// The function body itself.
    pub callable: Callable,
}

impl std::fmt::Debug for FunctionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionSpec")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// The process-wide table of registered callables.
#[derive(Default)]
pub struct CallableRegistry {
    functions: RwLock<HashMap<String, Arc<FunctionSpec>>>,
}

impl CallableRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under `spec.name`.
    pub fn register(&self, spec: FunctionSpec) -> ExecutorResult<()> {
        let mut functions = self.functions.write();
        if functions.contains_key(&spec.name) {
            return Err(ExecutorError::AlreadyRegistered(spec.name));
        }
        functions.insert(spec.name.clone(), Arc::new(spec));
        Ok(())
    }

    /// Look up a function spec by name.
    pub fn get(&self, name: &str) -> ExecutorResult<Arc<FunctionSpec>> {
        self.functions
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ExecutorError::UnknownFunction(name.to_string()))
    }

    /// Every registered function name.
    pub fn names(&self) -> Vec<String> {
        self.functions.read().keys().cloned().collect()
    }
}
