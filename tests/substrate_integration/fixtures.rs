//! Shared fixture entities for the integration suite.
//!
//! These are deliberately small domain types with hand-written
//! `Traversable` impls, the same way every member crate's own unit tests
//! build a local `Student`/`Leaf`/`Course` fixture rather than pulling in
//! a shared test-only crate.

use entity_core::{ConfigEntity, CoreError, Entity, EntityMeta, Value};
use entity_graph::{ChildEdge, ContainerKind, IndexOrKey, Ownership, Traversable};
use entity_resolver::{DeclaredParamKind, ParamSpec};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Student {
    pub meta: EntityMeta,
    pub name: String,
    pub gpa: f64,
}

impl Entity for Student {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
    fn type_name(&self) -> &'static str {
        "Student"
    }
}

impl Traversable for Student {
    fn children(&self) -> Vec<ChildEdge<'_>> {
        Vec::new()
    }
    fn own_content_hash(&self) -> u64 {
        self.gpa.to_bits() ^ seahash(&self.name)
    }
    fn clone_box(&self) -> Box<dyn Traversable> {
        Box::new(self.clone())
    }
    fn leaf_fields(&self) -> BTreeMap<String, Value> {
        BTreeMap::from([
            ("name".to_string(), Value::String(self.name.clone())),
            ("gpa".to_string(), Value::Float(self.gpa)),
        ])
    }
    fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
        self
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub meta: EntityMeta,
    pub gpa: f64,
}

impl Entity for Report {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
    fn type_name(&self) -> &'static str {
        "Report"
    }
}

impl Traversable for Report {
    fn children(&self) -> Vec<ChildEdge<'_>> {
        Vec::new()
    }
    fn own_content_hash(&self) -> u64 {
        self.gpa.to_bits()
    }
    fn clone_box(&self) -> Box<dyn Traversable> {
        Box::new(self.clone())
    }
    fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
        self
    }
}

#[derive(Debug, Clone)]
pub struct Assessment {
    pub meta: EntityMeta,
    pub verdict: String,
}

impl Entity for Assessment {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
    fn type_name(&self) -> &'static str {
        "Assessment"
    }
}

impl Traversable for Assessment {
    fn children(&self) -> Vec<ChildEdge<'_>> {
        Vec::new()
    }
    fn own_content_hash(&self) -> u64 {
        seahash(&self.verdict)
    }
    fn clone_box(&self) -> Box<dyn Traversable> {
        Box::new(self.clone())
    }
    fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
        self
    }
}

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub meta: EntityMeta,
    pub text: String,
}

impl Entity for Recommendation {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
    fn type_name(&self) -> &'static str {
        "Recommendation"
    }
}

impl Traversable for Recommendation {
    fn children(&self) -> Vec<ChildEdge<'_>> {
        Vec::new()
    }
    fn own_content_hash(&self) -> u64 {
        seahash(&self.text)
    }
    fn clone_box(&self) -> Box<dyn Traversable> {
        Box::new(self.clone())
    }
    fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
        self
    }
}

/// A config-entity parameter bundle, synthesized by the executor from
/// loose caller-supplied primitives rather than passed as a live entity
/// (§4.E.3).
#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    pub meta: EntityMeta,
    pub threshold: f64,
    pub mode: String,
}

impl Entity for ProcessingConfig {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
    fn type_name(&self) -> &'static str {
        "ProcessingConfig"
    }
}

impl Traversable for ProcessingConfig {
    fn children(&self) -> Vec<ChildEdge<'_>> {
        Vec::new()
    }
    fn own_content_hash(&self) -> u64 {
        self.threshold.to_bits() ^ seahash(&self.mode)
    }
    fn clone_box(&self) -> Box<dyn Traversable> {
        Box::new(self.clone())
    }
    fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
        self
    }
}

impl ConfigEntity for ProcessingConfig {
    fn from_primitives(mut fields: BTreeMap<String, Value>) -> Result<Self, CoreError> {
        let threshold = match fields.remove("threshold") {
            Some(Value::Float(f)) => f,
            Some(Value::Int(i)) => i as f64,
            Some(other) => return Err(CoreError::TypeMismatch { expected: "float", found: other.type_name() }),
            None => return Err(CoreError::UnknownField { field: "threshold".into() }),
        };
        let mode = match fields.remove("mode") {
            Some(Value::String(s)) => s,
            Some(other) => return Err(CoreError::TypeMismatch { expected: "string", found: other.type_name() }),
            None => return Err(CoreError::UnknownField { field: "mode".into() }),
        };
        if let Some((field, _)) = fields.into_iter().next() {
            return Err(CoreError::UnknownField { field });
        }
        Ok(Self { meta: EntityMeta::new(), threshold, mode })
    }
}

#[derive(Debug, Clone)]
pub struct Course {
    pub meta: EntityMeta,
    pub title: String,
}

impl Entity for Course {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
    fn type_name(&self) -> &'static str {
        "Course"
    }
}

impl Traversable for Course {
    fn children(&self) -> Vec<ChildEdge<'_>> {
        Vec::new()
    }
    fn own_content_hash(&self) -> u64 {
        seahash(&self.title)
    }
    fn clone_box(&self) -> Box<dyn Traversable> {
        Box::new(self.clone())
    }
    fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
        self
    }
}

/// A hierarchical parent, for exercising `detach`/`attach` boundary
/// behaviors that the leaf fixtures above (with no children) cannot.
#[derive(Debug, Clone)]
pub struct Advisor {
    pub meta: EntityMeta,
    pub courses: Vec<Course>,
}

impl Entity for Advisor {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
    fn type_name(&self) -> &'static str {
        "Advisor"
    }
}

impl Traversable for Advisor {
    fn children(&self) -> Vec<ChildEdge<'_>> {
        self.courses
            .iter()
            .enumerate()
            .map(|(i, course)| ChildEdge {
                field_name: "courses".to_string(),
                container: ContainerKind::List,
                index_or_key: IndexOrKey::Index(i),
                declared_ownership: Ownership::Hierarchical,
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

/// A minimal, dependency-free string hash so fixtures don't need to pull
/// in a hashing crate just to produce a stable `own_content_hash`.
fn seahash(s: &str) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

pub fn student_param(name: &str) -> ParamSpec {
    ParamSpec { name: name.to_string(), kind: DeclaredParamKind::Entity("Student"), required: true }
}

pub fn primitive_param(name: &str, required: bool) -> ParamSpec {
    ParamSpec { name: name.to_string(), kind: DeclaredParamKind::Primitive, required }
}

pub fn config_param(name: &str, type_name: &'static str) -> ParamSpec {
    ParamSpec { name: name.to_string(), kind: DeclaredParamKind::ConfigEntity(type_name), required: true }
}
