//! The nine quantified invariants, plus the round-trip/idempotence and
//! boundary-behavior properties, from the testable-properties catalogue.

use crate::fixtures::{student_param, Advisor, Assessment, Course, Recommendation, Student};
use entity_substrate::{
    CallableRegistry, ChildEdge, Context, ContainerKind, Entity, EntityMeta, ExecutionSemantic, ExecutorValue,
    FunctionSpec, IndexOrKey, RawInput, Traversable,
};
use std::collections::{BTreeMap, HashMap, HashSet};

fn address(id: entity_substrate::EcsId) -> String {
    format!("@{id}")
}

fn register_echo(callables: &CallableRegistry, name: &str) {
    callables
        .register(FunctionSpec {
            name: name.to_string(),
            params: vec![student_param("s")],
            config_constructors: HashMap::new(),
            callable: Box::new(|mut args| Ok(args.remove("s").unwrap())),
        })
        .unwrap();
}

/// Invariant 1 — `ecs_id` is unique across every entity ever registered.
#[test]
fn invariant_1_ecs_ids_are_globally_unique() {
    let ctx = Context::new();
    let mut seen = HashSet::new();
    for i in 0..50 {
        let student = Student { meta: EntityMeta::new(), name: format!("Student{i}"), gpa: 3.0 };
        let id = student.meta.ecs_id;
        ctx.registry.register_root(&student).unwrap();
        assert!(seen.insert(id), "ecs_id {id} was reused");
    }
}

/// Invariant 2 — a live copy pulled out of the registry always carries a
/// fresh `live_id` distinct from the one that was stored, while its
/// `ecs_id` is unchanged.
#[test]
fn invariant_2_copies_get_fresh_live_ids_but_share_ecs_id() {
    let student = Student { meta: EntityMeta::new(), name: "Alice".into(), gpa: 3.5 };
    let original_live_id = student.meta.live_id;
    let original_ecs_id = student.meta.ecs_id;

    let copy_meta = student.meta.copy_with_fresh_live_id();
    assert_ne!(copy_meta.live_id, original_live_id);
    assert_eq!(copy_meta.ecs_id, original_ecs_id);
}

/// Invariant 3 — structural hashing ignores map-key order but is
/// sensitive to list/tuple order.
#[test]
fn invariant_3_structural_hash_is_key_order_insensitive_and_list_order_sensitive() {
    use entity_graph::hash::combine_container;

    let a = (IndexOrKey::Key("alpha".to_string()), 111u64);
    let b = (IndexOrKey::Key("beta".to_string()), 222u64);
    let forward = combine_container(ContainerKind::Map, vec![a.clone(), b.clone()]);
    let backward = combine_container(ContainerKind::Map, vec![b.clone(), a.clone()]);
    assert_eq!(forward, backward, "map entries must hash the same regardless of insertion order");

    let first = (IndexOrKey::Index(0), 111u64);
    let second = (IndexOrKey::Index(1), 222u64);
    let list_forward = combine_container(ContainerKind::List, vec![first.clone(), second.clone()]);
    let list_backward = combine_container(ContainerKind::List, vec![second, first]);
    assert_ne!(list_forward, list_backward, "list entries must be order-sensitive");
}

/// Invariant 4 — checking for divergence immediately after registering,
/// with no intervening modification, mints no new versions.
#[test]
fn invariant_4_version_check_immediately_after_registration_is_a_no_op() {
    let ctx = Context::new();
    let student = Student { meta: EntityMeta::new(), name: "Alice".into(), gpa: 3.5 };
    let id = student.meta.ecs_id;
    ctx.registry.register_root(&student).unwrap();

    let outcome = ctx.registry.version_if_diverged(&student).unwrap();
    assert!(!outcome.diverged);
    assert!(outcome.remapped_ids.is_empty());
    assert!(ctx.registry.get_by_ecs_id(id).is_ok());
}

/// Invariant 5 — returning the same input copy unchanged is always a
/// `mutation` with no fork.
#[test]
fn invariant_5_unchanged_return_is_mutation_with_no_fork() {
    let ctx = Context::new();
    register_echo(&ctx.callables, "echo");

    let student = Student { meta: EntityMeta::new(), name: "Alice".into(), gpa: 3.5 };
    let id = student.meta.ecs_id;
    ctx.registry.register_root(&student).unwrap();

    let inputs = BTreeMap::from([("s".to_string(), RawInput::Str(address(id)))]);
    let outcome = ctx.executor.execute("echo", inputs).unwrap();

    assert_eq!(outcome.execution.output_semantics.get(&id), Some(&ExecutionSemantic::Mutation));
    assert_eq!(outcome.execution.output_entity_ids, vec![id]);
}

/// Invariant 6 — a freshly constructed entity unreachable from any input
/// is always a `creation`.
#[test]
fn invariant_6_unreachable_new_entity_is_always_creation() {
    let ctx = Context::new();
    ctx.callables
        .register(FunctionSpec {
            name: "spawn".to_string(),
            params: vec![],
            config_constructors: HashMap::new(),
            callable: Box::new(|_| Ok(ExecutorValue::Entity(Box::new(Assessment { meta: EntityMeta::new(), verdict: "ok".into() })))),
        })
        .unwrap();

    let outcome = ctx.executor.execute("spawn", BTreeMap::new()).unwrap();
    let id = outcome.execution.output_entity_ids[0];
    assert_eq!(outcome.execution.output_semantics.get(&id), Some(&ExecutionSemantic::Creation));
}

/// Invariant 7 — every id in a multi-output return appears exactly once
/// across all sibling groups.
#[test]
fn invariant_7_every_output_id_appears_exactly_once_across_sibling_groups() {
    let ctx = Context::new();
    ctx.callables
        .register(FunctionSpec {
            name: "pair".to_string(),
            params: vec![],
            config_constructors: HashMap::new(),
            callable: Box::new(|_| {
                Ok(ExecutorValue::Tuple(vec![
                    ExecutorValue::Entity(Box::new(Assessment { meta: EntityMeta::new(), verdict: "ok".into() })),
                    ExecutorValue::Entity(Box::new(Recommendation { meta: EntityMeta::new(), text: "nice".into() })),
                ]))
            }),
        })
        .unwrap();

    let outcome = ctx.executor.execute("pair", BTreeMap::new()).unwrap();
    assert!(outcome.execution.sibling_groups_are_consistent());
    let mut flattened: Vec<_> = outcome.execution.sibling_groups.iter().flatten().collect();
    flattened.sort();
    let mut outputs = outcome.execution.output_entity_ids.clone();
    outputs.sort();
    assert_eq!(flattened, outputs.iter().collect::<Vec<_>>());
}

/// Invariant 8 — a failing call registers nothing and leaves behind
/// exactly one failed execution record.
#[test]
fn invariant_8_failure_registers_no_outputs_and_one_failed_record() {
    let ctx = Context::new();
    ctx.callables
        .register(FunctionSpec {
            name: "explode".to_string(),
            params: vec![student_param("s")],
            config_constructors: HashMap::new(),
            callable: Box::new(|_| Err("deliberate failure".to_string())),
        })
        .unwrap();

    let student = Student { meta: EntityMeta::new(), name: "Alice".into(), gpa: 3.5 };
    let id = student.meta.ecs_id;
    ctx.registry.register_root(&student).unwrap();

    let before = ctx.registry.by_type("Student").len();
    let inputs = BTreeMap::from([("s".to_string(), RawInput::Str(address(id)))]);
    let result = ctx.executor.execute("explode", inputs);
    assert!(result.is_err());

    assert_eq!(ctx.registry.by_type("Student").len(), before, "no new students were registered");

    let failed = ctx.executor.log().by_function_name("explode");
    assert_eq!(failed.len(), 1);
    assert!(!failed[0].success);
}

/// Invariant 9 — a resolved address's value always has the type the
/// terminal field declared.
#[test]
fn invariant_9_resolved_value_matches_declared_field_type() {
    let ctx = Context::new();
    let student = Student { meta: EntityMeta::new(), name: "Alice".into(), gpa: 3.5 };
    let id = student.meta.ecs_id;
    ctx.registry.register_root(&student).unwrap();

    let addr = entity_substrate::Address { root: id, segments: vec![entity_substrate::PathSegment::Field { name: "gpa".to_string(), position: None }] };
    let resolved = entity_substrate::resolve(&ctx.registry, &addr).unwrap();
    match resolved {
        entity_substrate::ResolvedValue::Value { value, .. } => {
            assert!(matches!(value, entity_substrate::Value::Float(_)));
        }
        entity_substrate::ResolvedValue::Entity(_) => panic!("gpa is a leaf field, not an entity"),
    }
}

/// `version_if_diverged` is idempotent when nothing changes between
/// calls.
#[test]
fn version_if_diverged_is_idempotent_on_an_unmodified_graph() {
    let ctx = Context::new();
    let student = Student { meta: EntityMeta::new(), name: "Alice".into(), gpa: 3.5 };
    ctx.registry.register_root(&student).unwrap();

    let first = ctx.registry.version_if_diverged(&student).unwrap();
    let second = ctx.registry.version_if_diverged(&student).unwrap();
    assert!(!first.diverged);
    assert!(!second.diverged);
}

/// Boundary — detaching an entity that is already a root is a no-op.
#[test]
fn detaching_an_already_root_entity_is_a_no_op() {
    let ctx = Context::new();
    let student = Student { meta: EntityMeta::new(), name: "Alice".into(), gpa: 3.5 };
    let id = student.meta.ecs_id;
    ctx.registry.register_root(&student).unwrap();

    ctx.registry.detach(id).unwrap();
    assert!(ctx.registry.get_by_ecs_id(id).is_ok(), "the root is unaffected");
}

/// Boundary — attaching an entity to a field that already holds it is a
/// no-op, not a second hierarchical edge.
#[test]
fn attaching_to_an_edge_that_already_holds_the_entity_is_a_no_op() {
    let ctx = Context::new();
    let course = Course { meta: EntityMeta::new(), title: "Algorithms".into() };
    let course_id = course.meta.ecs_id;
    let advisor = Advisor { meta: EntityMeta::new(), courses: vec![course] };
    let advisor_id = advisor.meta.ecs_id;
    ctx.registry.register_root(&advisor).unwrap();

    ctx.registry.attach(course_id, advisor_id, "courses").unwrap();
    assert!(
        ctx.registry.get_by_ecs_id(advisor_id).is_ok(),
        "re-attaching an edge that already exists must not fork the parent"
    );
}

/// Boundary — an empty container field hashes differently from one that
/// was never populated at all.
#[test]
fn empty_container_field_hashes_distinctly_from_an_absent_field() {
    #[derive(Debug, Clone)]
    struct WithCourses {
        meta: EntityMeta,
        courses: Vec<Course>,
    }

    impl Entity for WithCourses {
        fn meta(&self) -> &EntityMeta {
            &self.meta
        }
        fn meta_mut(&mut self) -> &mut EntityMeta {
            &mut self.meta
        }
        fn type_name(&self) -> &'static str {
            "WithCourses"
        }
    }

    impl Traversable for WithCourses {
        fn children(&self) -> Vec<ChildEdge<'_>> {
            self.courses
                .iter()
                .enumerate()
                .map(|(i, course)| ChildEdge {
                    field_name: "courses".to_string(),
                    container: ContainerKind::List,
                    index_or_key: IndexOrKey::Index(i),
                    declared_ownership: entity_substrate::Ownership::Hierarchical,
                    child: course as &dyn Traversable,
                })
                .collect()
        }
        fn own_content_hash(&self) -> u64 {
            0
        }
        fn clone_box(&self) -> Box<dyn Traversable> {
            Box::new(self.clone())
        }
        fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
            self
        }
    }

    struct NoCourseField;
    impl NoCourseField {
        fn hash_of(entity: &dyn Traversable) -> u64 {
            let field_hashes: Vec<(String, u64)> = entity
                .children()
                .iter()
                .map(|edge| (edge.field_name.clone(), entity_graph::hash::hash_reference(edge.child.meta().ecs_id)))
                .collect();
            entity_graph::hash::hash_node(entity.type_name(), entity.own_content_hash(), &field_hashes)
        }
    }

    let empty = WithCourses { meta: EntityMeta::new(), courses: Vec::new() };
    let empty_hash = NoCourseField::hash_of(&empty);

    let no_field_at_all = Course { meta: EntityMeta::new(), title: "placeholder".into() };
    let absent_hash = NoCourseField::hash_of(&no_field_at_all);

    assert_ne!(
        empty_hash, absent_hash,
        "an explicit empty container and a type with no such field at all must not collide"
    );
}
