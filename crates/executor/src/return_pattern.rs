//! Return-value classification (§4.E Return Pattern Taxonomy, B1-B7)
//!
//! A callable's return value is classified into one of seven shapes before
//! its entities are unpacked, committed, and grouped into sibling groups
//! (Invariant 9: every output belongs to exactly one group). Composite
//! shapes produced as a single logical result (tuples, named/map records,
//! nested containers) group all their entities together; a list is treated
//! as independent parallel results, each its own group, since a
//! `Vec<Student>` usually means "these many unrelated students", not one
//! multi-part answer. A bare scalar (B7) has no entity of its own, so it is
//! wrapped in a [`crate::ScalarOutput`] and committed as a creation just like
//! any other returned entity.

use crate::scalar_output::ScalarOutput;
use crate::value::ExecutorValue;
use entity_graph::Traversable;
use std::fmt;

/// The shape of a callable's return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnPattern {
    /// No return value at all. Not part of the B1-B7 taxonomy; ambient.
    None,
    /// B1: a single entity.
    SingleEntity,
    /// B2: a tuple whose elements are all entities.
    EntityTuple,
    /// B3: a list of independent results.
    List,
    /// B4: a named/map-shaped record of results.
    Map,
    /// B5: a tuple mixing entities and primitive values.
    Mixed,
    /// B6: a nested structure with entities at depth greater than one.
    Nested,
    /// B7: a single primitive value, wrapped in a [`ScalarOutput`] on unpack.
    SingleValue,
}

impl fmt::Display for ReturnPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReturnPattern::None => "none",
            ReturnPattern::SingleEntity => "B1",
            ReturnPattern::EntityTuple => "B2",
            ReturnPattern::List => "B3",
            ReturnPattern::Map => "B4",
            ReturnPattern::Mixed => "B5",
            ReturnPattern::Nested => "B6",
            ReturnPattern::SingleValue => "B7",
        };
        write!(f, "{label}")
    }
}

/// Classify a return value's shape without consuming it.
pub fn classify_return(value: &ExecutorValue) -> ReturnPattern {
    match value {
        ExecutorValue::None => ReturnPattern::None,
        ExecutorValue::Entity(_) => ReturnPattern::SingleEntity,
        ExecutorValue::Value(_) => ReturnPattern::SingleValue,
        ExecutorValue::Tuple(_) | ExecutorValue::List(_) | ExecutorValue::Map(_) => {
            if max_entity_depth(value, 0) > 1 {
                return ReturnPattern::Nested;
            }
            match value {
                ExecutorValue::Tuple(items) => {
                    if items.iter().all(|item| matches!(item, ExecutorValue::Entity(_))) {
                        ReturnPattern::EntityTuple
                    } else {
                        ReturnPattern::Mixed
                    }
                }
                ExecutorValue::List(_) => ReturnPattern::List,
                ExecutorValue::Map(_) => ReturnPattern::Map,
                _ => unreachable!(),
            }
        }
    }
}

/// The deepest nesting level at which an entity appears, counting the return
/// value itself as depth 0 and each container layer crossed as +1.
fn max_entity_depth(value: &ExecutorValue, depth: usize) -> usize {
    match value {
        ExecutorValue::Entity(_) => depth,
        ExecutorValue::List(items) | ExecutorValue::Tuple(items) => {
            items.iter().map(|item| max_entity_depth(item, depth + 1)).max().unwrap_or(0)
        }
        ExecutorValue::Map(entries) => {
            entries.iter().map(|(_, item)| max_entity_depth(item, depth + 1)).max().unwrap_or(0)
        }
        ExecutorValue::None | ExecutorValue::Value(_) => 0,
    }
}

/// Unpack a return value into its pattern, the flat list of entities it
/// contained (in traversal order), and the sibling groups those entities
/// fall into (each group a set of indices into the flat list).
pub fn unpack(value: ExecutorValue) -> (ReturnPattern, Vec<Box<dyn Traversable>>, Vec<Vec<usize>>) {
    let pattern = classify_return(&value);
    let mut entities = Vec::new();

    match value {
        ExecutorValue::Value(scalar) => entities.push(Box::new(ScalarOutput::new(scalar)) as Box<dyn Traversable>),
        other => collect_entities(other, &mut entities),
    }

    let groups = match pattern {
        ReturnPattern::None => Vec::new(),
        ReturnPattern::List => (0..entities.len()).map(|i| vec![i]).collect(),
        ReturnPattern::SingleEntity
        | ReturnPattern::EntityTuple
        | ReturnPattern::Map
        | ReturnPattern::Mixed
        | ReturnPattern::Nested
        | ReturnPattern::SingleValue => {
            if entities.is_empty() {
                Vec::new()
            } else {
                vec![(0..entities.len()).collect()]
            }
        }
    };

    (pattern, entities, groups)
}

fn collect_entities(value: ExecutorValue, out: &mut Vec<Box<dyn Traversable>>) {
    match value {
        ExecutorValue::Entity(entity) => out.push(entity),
        ExecutorValue::List(items) | ExecutorValue::Tuple(items) => {
            for item in items {
                collect_entities(item, out);
            }
        }
        ExecutorValue::Map(entries) => {
            for (_, item) in entries {
                collect_entities(item, out);
            }
        }
        ExecutorValue::None | ExecutorValue::Value(_) => {}
    }
}
