//! Execution strategy selection (§4.E.3 Execution Strategy Table)
//!
//! The strategy is derived purely from the shape of the classified inputs
//! and never from the callable's body (the executor cannot see into an
//! opaque `Fn`), but it still drives the informational
//! `FunctionExecution::strategy` label and lets [`crate::executor::Executor`]
//! short-circuit isolation when nothing could possibly be mutated.

use entity_resolver::InputPattern;
use std::collections::BTreeMap;
use std::fmt;

/// The strategy a call was dispatched under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// All parameters are addresses or literals; no entity-typed parameter
    /// and no `ConfigEntity` at all. Covers the no-input case too — a call
    /// with nothing to borrow is trivially "all addresses/literals".
    PureBorrowing,
    /// Exactly one entity-typed parameter arrived directly (not via
    /// address), no `ConfigEntity`, and every other parameter is a literal.
    SingleEntityDirect,
    /// Two or more entity-typed parameters, or a mix of a direct entity and
    /// an address-borrowed one, with no `ConfigEntity`.
    MultiEntityComposite,
    /// At least one `ConfigEntity` parameter, synthesized from caller-
    /// supplied primitives and bound alongside the residual strategy
    /// selected from the function's remaining parameters.
    SingleEntityWithConfig,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Strategy::PureBorrowing => "pure_borrowing",
            Strategy::SingleEntityDirect => "single_entity_direct",
            Strategy::MultiEntityComposite => "multi_entity_composite",
            Strategy::SingleEntityWithConfig => "single_entity_with_config",
        };
        write!(f, "{label}")
    }
}

/// Select a strategy from a call's classified inputs.
pub fn select_strategy(inputs: &BTreeMap<String, InputPattern>) -> Strategy {
    let has_config = inputs.values().any(|pattern| matches!(pattern, InputPattern::ConfigPrimitive(_)));
    if has_config {
        return Strategy::SingleEntityWithConfig;
    }

    let direct_entities = inputs.values().filter(|pattern| matches!(pattern, InputPattern::EntityParam(_))).count();

    match direct_entities {
        0 => Strategy::PureBorrowing,
        1 => {
            let other_non_literal = inputs
                .values()
                .filter(|pattern| !matches!(pattern, InputPattern::EntityParam(_) | InputPattern::Literal(_)))
                .count();
            if other_non_literal == 0 {
                Strategy::SingleEntityDirect
            } else {
                Strategy::MultiEntityComposite
            }
        }
        _ => Strategy::MultiEntityComposite,
    }
}
