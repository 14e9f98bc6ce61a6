//! Input isolation and output semantic detection (§4.E.4-5)
//!
//! Every entity-shaped input is cloned and given a fresh `live_id` before a
//! callable ever sees it, so a function that mutates its argument in place
//! never corrupts the caller's own copy or another concurrent call's view
//! of the same logical entity. Rust gives `Traversable` no way to rewrite a
//! whole cloned subtree's `live_id`s in place (there is no `children_mut`
//! on a type-erased node), so isolation only refreshes the root's
//! `live_id` — exactly the granularity [`crate::isolation::detect_semantic`]
//! needs, since identity comparison happens at the root.

use entity_core::{EcsId, LiveId};
use entity_graph::Traversable;
use std::collections::HashSet;

/// One input entity after isolation: the fresh copy handed to the
/// callable, alongside the identity it isolated *from*.
pub struct IsolatedInput {
    /// The parameter name this input was bound to.
    pub param: String,
    /// The isolated copy, with a freshly assigned root `live_id`.
    pub copy: Box<dyn Traversable>,
    /// The `live_id` the original (pre-isolation) instance carried.
    pub original_live_id: LiveId,
}

/// Clone `entity` and assign its copy a fresh root `live_id`.
pub fn isolate(param: impl Into<String>, entity: &dyn Traversable) -> IsolatedInput {
    let original_live_id = entity.meta().live_id;
    let mut copy = entity.clone_box();
    copy.meta_mut().live_id = LiveId::new();
    IsolatedInput { param: param.into(), copy, original_live_id }
}

/// Every `ecs_id` reachable from `root` (including `root` itself), walking
/// hierarchical and reference edges alike — both are valid extraction
/// sources for a `Detachment` (§4.E.5).
pub fn descendant_ecs_ids(root: &dyn Traversable) -> HashSet<EcsId> {
    let mut seen = HashSet::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if seen.insert(node.meta().ecs_id) {
            for edge in node.children() {
                stack.push(edge.child);
            }
        }
    }
    seen
}

/// The detected relationship between one returned entity and the set of
/// isolated inputs it might have come from (§4.E.5, mirrors
/// [`entity_core::ExecutionSemantic`]).
pub fn detect_semantic(
    output: &dyn Traversable,
    inputs: &[IsolatedInput],
) -> entity_core::ExecutionSemantic {
    use entity_core::ExecutionSemantic;

    for input in inputs {
        if output.meta().live_id == input.copy.meta().live_id {
            return ExecutionSemantic::Mutation;
        }
    }
    for input in inputs {
        let descendants = descendant_ecs_ids(input.copy.as_ref());
        if descendants.contains(&output.meta().ecs_id) {
            return ExecutionSemantic::Detachment;
        }
    }
    ExecutionSemantic::Creation
}
