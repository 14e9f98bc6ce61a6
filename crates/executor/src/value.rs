//! Type-erased argument and return values for the callable engine

use entity_core::Value;
use entity_graph::Traversable;

/// A value flowing into or out of a registered callable.
///
/// Domain functions registered with the executor receive and return
/// `ExecutorValue` rather than concrete types, since the executor cannot
/// know a domain function's exact signature at compile time; registering a
/// callable is the one place a domain crate bridges its own typed API to
/// this erased form (§4.E.2, registration).
pub enum ExecutorValue {
    /// No value (a function with no return, or an absent optional input).
    None,
    /// A single entity.
    Entity(Box<dyn Traversable>),
    /// A single primitive.
    Value(Value),
    /// An ordered, homogeneous collection (a `Vec`-shaped return).
    List(Vec<ExecutorValue>),
    /// A fixed-arity, possibly heterogeneous collection (a tuple-shaped
    /// return).
    Tuple(Vec<ExecutorValue>),
    /// A string-keyed collection (a struct- or map-shaped return).
    Map(Vec<(String, ExecutorValue)>),
}

impl ExecutorValue {
    /// Borrow the entity, if this is [`ExecutorValue::Entity`].
    pub fn as_entity(&self) -> Option<&dyn Traversable> {
        match self {
            ExecutorValue::Entity(entity) => Some(entity.as_ref()),
            _ => None,
        }
    }

    /// Collect every entity reachable at the top level of this value (not
    /// recursing into nested entity graphs — those are walked separately
    /// by the registry when it builds a tree for each one).
    pub fn top_level_entities(&self) -> Vec<&dyn Traversable> {
        match self {
            ExecutorValue::Entity(entity) => vec![entity.as_ref()],
            ExecutorValue::List(items) | ExecutorValue::Tuple(items) => {
                items.iter().flat_map(ExecutorValue::top_level_entities).collect()
            }
            ExecutorValue::Map(entries) => {
                entries.iter().flat_map(|(_, v)| v.top_level_entities()).collect()
            }
            ExecutorValue::None | ExecutorValue::Value(_) => Vec::new(),
        }
    }
}

impl From<Value> for ExecutorValue {
    fn from(value: Value) -> Self {
        ExecutorValue::Value(value)
    }
}

impl From<Box<dyn Traversable>> for ExecutorValue {
    fn from(entity: Box<dyn Traversable>) -> Self {
        ExecutorValue::Entity(entity)
    }
}
