//! Resolver and classifier failure modes (§4.C Failures, §7 Input errors)

use entity_core::EcsId;
use thiserror::Error;

/// Result alias for resolver operations.
pub type ResolverResult<T> = std::result::Result<T, ResolverError>;

/// Errors raised while parsing or evaluating an address, or classifying
/// call inputs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolverError {
    /// An address string did not match the grammar.
    #[error("malformed address: {0}")]
    MalformedAddress(String),

    /// An address's leading `ecs_id` has no entry in the registry.
    #[error("unknown entity: {0}")]
    UnknownEntity(EcsId),

    /// A path segment named a field the entity does not declare.
    #[error("field '{field}' not found on {type_name}")]
    FieldNotFound {
        /// The type the lookup was attempted against.
        type_name: &'static str,
        /// The missing field name.
        field: String,
    },

    /// A container index/key was out of range or absent.
    #[error("index '{index}' out of range for field '{field}'")]
    IndexOutOfRange {
        /// The field the index was applied to.
        field: String,
        /// The offending index or key, as written in the address.
        index: String,
    },

    /// A path descended into a value that cannot be navigated further
    /// (e.g. indexing a scalar, or dotting into a primitive).
    #[error("cannot navigate into '{field}': not a container or entity")]
    AddressTypeError {
        /// The field whose value could not be navigated further.
        field: String,
    },

    /// A call supplied a keyword argument the function does not declare.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// A required parameter was not supplied.
    #[error("missing required parameter: {0}")]
    MissingRequired(String),

    /// A supplied value's shape did not match the declared parameter type.
    #[error("parameter '{param}' expected {expected}, found {found}")]
    InputTypeMismatch {
        /// The parameter name.
        param: String,
        /// The declared parameter kind.
        expected: &'static str,
        /// A description of what was actually supplied.
        found: &'static str,
    },
}
