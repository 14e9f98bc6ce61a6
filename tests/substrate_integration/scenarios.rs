//! Concrete scenarios S1-S6 from the testable-properties catalogue,
//! each run end to end against a fresh [`Context`].

use crate::fixtures::{config_param, primitive_param, student_param, Advisor, Assessment, Course, ProcessingConfig, Recommendation, Report, Student};
use entity_substrate::{
    CallableRegistry, Context, Entity, EntityMeta, ExecutionSemantic, ExecutorValue, FunctionSpec, ParamSpec, RawInput, Value,
};
use std::collections::{BTreeMap, HashMap};

fn address(id: entity_substrate::EcsId) -> String {
    format!("@{id}")
}

fn register_noop(callables: &CallableRegistry) {
    callables
        .register(FunctionSpec {
            name: "noop".to_string(),
            params: vec![student_param("s")],
            config_constructors: HashMap::new(),
            callable: Box::new(|mut args| Ok(args.remove("s").unwrap())),
        })
        .unwrap();
}

/// S1 — mutation without divergence: echoing the input back unchanged
/// forks nothing.
#[test]
fn s1_mutation_without_divergence() {
    let ctx = Context::new();
    register_noop(&ctx.callables);

    let student = Student { meta: EntityMeta::new(), name: "Alice".into(), gpa: 3.5 };
    let u1 = student.meta.ecs_id;
    ctx.registry.register_root(&student).unwrap();

    let inputs = BTreeMap::from([("s".to_string(), RawInput::Str(address(u1)))]);
    let outcome = ctx.executor.execute("noop", inputs).unwrap();

    assert_eq!(outcome.execution.output_entity_ids, vec![u1]);
    assert_eq!(outcome.execution.output_semantics.get(&u1), Some(&ExecutionSemantic::Mutation));
    assert!(outcome.execution.success);
    assert!(ctx.registry.get_by_ecs_id(u1).is_ok(), "the original id is still the live version");
}

/// S2 — mutation with divergence: the function changes the content of
/// its input and returns it, forking a new version.
#[test]
fn s2_mutation_with_divergence() {
    let ctx = Context::new();
    ctx.callables
        .register(FunctionSpec {
            name: "set_gpa".to_string(),
            params: vec![student_param("s"), primitive_param("new", true)],
            config_constructors: HashMap::new(),
            callable: Box::new(|mut args| {
                let ExecutorValue::Entity(entity) = args.remove("s").unwrap() else {
                    return Err("expected a student".to_string());
                };
                let ExecutorValue::Value(Value::Float(new_gpa)) = args.remove("new").unwrap() else {
                    return Err("expected a float".to_string());
                };
                let mut student = *entity.into_any().downcast::<Student>().map_err(|_| "not a student".to_string())?;
                student.gpa = new_gpa;
                Ok(ExecutorValue::Entity(Box::new(student)))
            }),
        })
        .unwrap();

    let student = Student { meta: EntityMeta::new(), name: "Alice".into(), gpa: 3.5 };
    let u1 = student.meta.ecs_id;
    ctx.registry.register_root(&student).unwrap();

    let inputs = BTreeMap::from([
        ("s".to_string(), RawInput::Str(address(u1))),
        ("new".to_string(), RawInput::Literal(Value::Float(3.9))),
    ]);
    let outcome = ctx.executor.execute("set_gpa", inputs).unwrap();

    assert_eq!(outcome.execution.output_entity_ids.len(), 1);
    let forked = outcome.execution.output_entity_ids[0];
    assert_ne!(forked, u1);
    assert_eq!(outcome.execution.output_semantics.get(&forked), Some(&ExecutionSemantic::Mutation));

    let new_version = ctx.registry.get_by_ecs_id(forked).unwrap();
    assert_eq!(new_version.meta().previous_ecs_id, Some(u1));
    assert!(new_version.meta().old_ids.contains(&u1));
    assert!(ctx.registry.get_by_ecs_id(u1).is_err(), "superseded version is no longer the live one");
}

/// S3 — creation: a fresh entity unreachable from any input copy.
#[test]
fn s3_creation() {
    let ctx = Context::new();
    ctx.callables
        .register(FunctionSpec {
            name: "make_report".to_string(),
            params: vec![student_param("s")],
            config_constructors: HashMap::new(),
            callable: Box::new(|mut args| {
                let ExecutorValue::Entity(entity) = args.remove("s").unwrap() else {
                    return Err("expected a student".to_string());
                };
                let student = entity.into_any().downcast::<Student>().map_err(|_| "not a student".to_string())?;
                Ok(ExecutorValue::Entity(Box::new(Report { meta: EntityMeta::new(), gpa: student.gpa })))
            }),
        })
        .unwrap();

    let student = Student { meta: EntityMeta::new(), name: "Alice".into(), gpa: 3.5 };
    let u1 = student.meta.lineage_id;
    let u1_id = student.meta.ecs_id;
    ctx.registry.register_root(&student).unwrap();

    let inputs = BTreeMap::from([("s".to_string(), RawInput::Str(address(u1_id)))]);
    let outcome = ctx.executor.execute("make_report", inputs).unwrap();

    assert_eq!(outcome.execution.output_entity_ids.len(), 1);
    let new_id = outcome.execution.output_entity_ids[0];
    assert_eq!(outcome.execution.output_semantics.get(&new_id), Some(&ExecutionSemantic::Creation));
    assert_eq!(outcome.execution.sibling_groups, vec![vec![new_id]]);

    let report = ctx.registry.get_by_ecs_id(new_id).unwrap();
    assert_ne!(report.meta().lineage_id, u1);
    assert!(ctx.registry.get_by_ecs_id(u1_id).is_ok(), "the source student is untouched");
}

/// S4 — multi-entity unpacking: a tuple return registers both outputs
/// under a single sibling group.
#[test]
fn s4_multi_entity_unpacking() {
    let ctx = Context::new();
    ctx.callables
        .register(FunctionSpec {
            name: "assess".to_string(),
            params: vec![student_param("s")],
            config_constructors: HashMap::new(),
            callable: Box::new(|mut args| {
                let ExecutorValue::Entity(entity) = args.remove("s").unwrap() else {
                    return Err("expected a student".to_string());
                };
                let student = entity.into_any().downcast::<Student>().map_err(|_| "not a student".to_string())?;
                let verdict = if student.gpa >= 3.0 { "pass" } else { "fail" };
                let assessment = Assessment { meta: EntityMeta::new(), verdict: verdict.to_string() };
                let recommendation = Recommendation { meta: EntityMeta::new(), text: "keep it up".to_string() };
                Ok(ExecutorValue::Tuple(vec![
                    ExecutorValue::Entity(Box::new(assessment)),
                    ExecutorValue::Entity(Box::new(recommendation)),
                ]))
            }),
        })
        .unwrap();

    let student = Student { meta: EntityMeta::new(), name: "Bob".into(), gpa: 3.2 };
    let u1 = student.meta.ecs_id;
    ctx.registry.register_root(&student).unwrap();

    let inputs = BTreeMap::from([("s".to_string(), RawInput::Entity(Box::new(student)))]);
    let outcome = ctx.executor.execute("assess", inputs).unwrap();

    assert_eq!(outcome.execution.return_pattern, "B2");
    assert_eq!(outcome.execution.strategy, "single_entity_direct");
    assert_eq!(outcome.execution.output_entity_ids.len(), 2);
    assert_eq!(outcome.execution.sibling_groups.len(), 1);
    assert_eq!(outcome.execution.sibling_groups[0].len(), 2);
    assert!(outcome.execution.sibling_groups_are_consistent());
    assert_eq!(outcome.execution.input_entity_ids, vec![u1]);
}

/// S5 — pure borrowing: the input arrives only as an address, never as a
/// live instance, so the callable must pull its fields via
/// `borrow_from` and records provenance back to the source.
#[test]
fn s5_pure_borrowing_records_provenance() {
    let ctx = Context::new();
    ctx.callables
        .register(FunctionSpec {
            name: "combine".to_string(),
            params: vec![student_param("student")],
            config_constructors: HashMap::new(),
            callable: Box::new(|mut args| {
                let ExecutorValue::Entity(entity) = args.remove("student").unwrap() else {
                    return Err("expected a student".to_string());
                };
                let mut report = Report { meta: EntityMeta::new(), gpa: 0.0 };
                let resolved = entity_substrate::borrow_from(&mut report, entity.as_ref(), "gpa", "gpa")
                    .map_err(|e| e.to_string())?;
                if let entity_substrate::ResolvedValue::Value { value: Value::Float(gpa), .. } = resolved {
                    report.gpa = gpa;
                }
                Ok(ExecutorValue::Entity(Box::new(report)))
            }),
        })
        .unwrap();

    let student = Student { meta: EntityMeta::new(), name: "Carol".into(), gpa: 3.8 };
    let u1 = student.meta.ecs_id;
    ctx.registry.register_root(&student).unwrap();

    let inputs = BTreeMap::from([("student".to_string(), RawInput::Str(address(u1)))]);
    let outcome = ctx.executor.execute("combine", inputs).unwrap();

    assert_eq!(outcome.execution.strategy, "pure_borrowing");
    let report_id = outcome.execution.output_entity_ids[0];
    assert_eq!(outcome.execution.output_semantics.get(&report_id), Some(&ExecutionSemantic::Creation));

    let report = ctx.registry.get_by_ecs_id(report_id).unwrap();
    assert_eq!(
        report.meta().attribute_source.get("gpa").and_then(|s| s.as_single()),
        Some(u1),
        "the new report's gpa field is attributed back to the source student"
    );
}

/// S6 — config entity from primitives: a loose map of primitives is
/// synthesized into a registered `ProcessingConfig` alongside a directly
/// bound student.
#[test]
fn s6_config_entity_from_primitives() {
    let ctx = Context::new();
    ctx.callables
        .register(FunctionSpec {
            name: "process".to_string(),
            params: vec![student_param("s"), config_param("cfg", "ProcessingConfig")],
            config_constructors: HashMap::from([(
                "cfg".to_string(),
                Box::new(|fields: BTreeMap<String, Value>| {
                    ProcessingConfig::from_primitives(fields).map(|c| ExecutorValue::Entity(Box::new(c)))
                }) as entity_substrate::ConfigConstructor,
            )]),
            callable: Box::new(|mut args| {
                let ExecutorValue::Entity(student_entity) = args.remove("s").unwrap() else {
                    return Err("expected a student".to_string());
                };
                let ExecutorValue::Entity(cfg_entity) = args.remove("cfg").unwrap() else {
                    return Err("expected a config entity".to_string());
                };
                let mut student = *student_entity.into_any().downcast::<Student>().map_err(|_| "not a student".to_string())?;
                let cfg = cfg_entity.into_any().downcast::<ProcessingConfig>().map_err(|_| "not a config".to_string())?;
                if cfg.mode == "strict" && student.gpa < cfg.threshold {
                    student.gpa = cfg.threshold;
                }
                Ok(ExecutorValue::Entity(Box::new(student)))
            }),
        })
        .unwrap();

    let student = Student { meta: EntityMeta::new(), name: "Dana".into(), gpa: 3.0 };
    let u1 = student.meta.ecs_id;
    ctx.registry.register_root(&student).unwrap();

    let cfg_value = Value::Map(BTreeMap::from([
        ("threshold".to_string(), Value::Float(3.7)),
        ("mode".to_string(), Value::String("strict".to_string())),
    ]));
    let inputs = BTreeMap::from([
        ("s".to_string(), RawInput::Str(address(u1))),
        ("cfg".to_string(), RawInput::Literal(cfg_value)),
    ]);
    let outcome = ctx.executor.execute("process", inputs).unwrap();

    assert_eq!(outcome.execution.strategy, "single_entity_with_config");
    assert_eq!(outcome.execution.config_entity_ids.len(), 1);
    let cfg_id = outcome.execution.config_entity_ids[0];
    assert!(ctx.registry.get_by_ecs_id(cfg_id).is_ok(), "the synthesized config entity was promoted");

    let forked = outcome.execution.output_entity_ids[0];
    let new_student = ctx.registry.get_by_ecs_id(forked).unwrap();
    assert_eq!(new_student.leaf_fields().get("gpa"), Some(&Value::Float(3.7)));
}

/// A detach/attach boundary pair, exercised through a hierarchical
/// `Advisor`/`Course` fixture rather than the leaf-only fixtures above.
#[test]
fn detach_then_reattach_a_course_under_a_new_advisor() {
    let ctx = Context::new();
    let course = Course { meta: EntityMeta::new(), title: "Algorithms".into() };
    let course_id = course.meta.ecs_id;
    let advisor = Advisor { meta: EntityMeta::new(), courses: vec![course] };
    let advisor_id = advisor.meta.ecs_id;
    ctx.registry.register_root(&advisor).unwrap();

    ctx.registry.detach(course_id).unwrap();
    assert!(ctx.registry.get_by_ecs_id(advisor_id).is_err(), "the parent forked after losing a child");
    let detached = ctx.registry.get_by_ecs_id(course_id).unwrap();
    assert_eq!(detached.meta().root_ecs_id, course_id);

    let new_advisor = Advisor { meta: EntityMeta::new(), courses: Vec::new() };
    let new_advisor_id = new_advisor.meta.ecs_id;
    ctx.registry.register_root(&new_advisor).unwrap();

    ctx.registry.attach(course_id, new_advisor_id, "courses").unwrap();
    assert!(ctx.registry.get_by_ecs_id(new_advisor_id).is_err(), "the new advisor forked after gaining a child");
    assert_eq!(ctx.registry.by_type("Advisor").len(), 1);
}
