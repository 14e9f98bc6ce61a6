//! Call-input classification (§4.C Input Classification)
//!
//! Before a call can be dispatched, every argument the caller supplied has
//! to be matched against what the callable declares and sorted into one of
//! a few patterns: a live entity handed in directly, an address string to
//! resolve against the registry, a literal primitive, or a primitive meant
//! to populate a [`entity_core::ConfigEntity`]. Classification never
//! resolves addresses itself — that is [`crate::resolve::resolve`]'s job,
//! run by the executor once every input has been classified and every
//! required parameter accounted for.

use crate::address::{looks_like_address, parse, Address};
use crate::error::{ResolverError, ResolverResult};
use entity_core::Value;
use entity_graph::Traversable;
use std::collections::BTreeMap;

/// What a callable's parameter list declares for one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredParamKind {
    /// A domain entity of the named type.
    Entity(&'static str),
    /// A [`entity_core::ConfigEntity`] of the named type, constructible
    /// from primitive fields via `from_primitives`.
    ConfigEntity(&'static str),
    /// A plain primitive value.
    Primitive,
}

/// One parameter of a callable's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// The parameter name, matched against the caller's keyword arguments.
    pub name: String,
    /// What kind of input this parameter accepts.
    pub kind: DeclaredParamKind,
    /// Whether the call must supply this parameter.
    pub required: bool,
}

/// What the caller actually supplied for one parameter, before
/// classification.
pub enum RawInput {
    /// A live entity instance.
    Entity(Box<dyn Traversable>),
    /// A string the caller wants resolved — either an address (`@...`) or
    /// a plain string literal.
    Str(String),
    /// Any other literal value.
    Literal(Value),
}

/// The classified shape of one argument, ready for the executor to resolve
/// and bind.
pub enum InputPattern {
    /// An entity was passed directly; no resolution needed.
    EntityParam(Box<dyn Traversable>),
    /// An address string naming where to pull the value (or entity) from.
    AddressRef(Address),
    /// A literal value bound straight to a primitive parameter.
    Literal(Value),
    /// Primitive fields destined for a [`entity_core::ConfigEntity`]'s
    /// `from_primitives` constructor.
    ConfigPrimitive(Value),
}

/// Classify every input against the callable's declared parameters.
///
/// Every required parameter must be present; every supplied input must
/// match a declared parameter name. Type compatibility between the
/// declared kind and what was actually supplied is checked here; address
/// strings are accepted for any parameter kind without attempting
/// resolution — only the run-time value a resolved address produces can
/// be checked against the declared kind, and that happens at resolve time.
pub fn classify(
    specs: &[ParamSpec],
    mut inputs: BTreeMap<String, RawInput>,
) -> ResolverResult<BTreeMap<String, InputPattern>> {
    let mut result = BTreeMap::new();

    for spec in specs {
        let Some(raw) = inputs.remove(&spec.name) else {
            if spec.required {
                return Err(ResolverError::MissingRequired(spec.name.clone()));
            }
            continue;
        };
        result.insert(spec.name.clone(), classify_one(spec, raw)?);
    }

    if let Some((name, _)) = inputs.into_iter().next() {
        return Err(ResolverError::UnknownParameter(name));
    }

    Ok(result)
}

fn classify_one(spec: &ParamSpec, raw: RawInput) -> ResolverResult<InputPattern> {
    match (&spec.kind, raw) {
        (DeclaredParamKind::Entity(expected), RawInput::Entity(entity)) => {
            if entity.type_name() == *expected {
                Ok(InputPattern::EntityParam(entity))
            } else {
                Err(ResolverError::InputTypeMismatch {
                    param: spec.name.clone(),
                    expected,
                    found: entity.type_name(),
                })
            }
        }
        (DeclaredParamKind::Entity(_), RawInput::Str(s)) if looks_like_address(&s) => {
            Ok(InputPattern::AddressRef(parse(&s)?))
        }
        (DeclaredParamKind::Entity(expected), _) => Err(ResolverError::InputTypeMismatch {
            param: spec.name.clone(),
            expected,
            found: "primitive",
        }),

        (DeclaredParamKind::ConfigEntity(_), RawInput::Literal(value @ Value::Map(_))) => {
            Ok(InputPattern::ConfigPrimitive(value))
        }
        (DeclaredParamKind::ConfigEntity(_), RawInput::Str(s)) if looks_like_address(&s) => {
            Ok(InputPattern::AddressRef(parse(&s)?))
        }
        (DeclaredParamKind::ConfigEntity(expected), _) => Err(ResolverError::InputTypeMismatch {
            param: spec.name.clone(),
            expected,
            found: "non-map value",
        }),

        (DeclaredParamKind::Primitive, RawInput::Str(s)) if looks_like_address(&s) => {
            Ok(InputPattern::AddressRef(parse(&s)?))
        }
        (DeclaredParamKind::Primitive, RawInput::Str(s)) => Ok(InputPattern::Literal(Value::String(s))),
        (DeclaredParamKind::Primitive, RawInput::Literal(value)) => Ok(InputPattern::Literal(value)),
        (DeclaredParamKind::Primitive, RawInput::Entity(entity)) => Err(ResolverError::InputTypeMismatch {
            param: spec.name.clone(),
            expected: "primitive",
            found: entity.type_name(),
        }),
    }
}
