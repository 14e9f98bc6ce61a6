//! Shared error type for the core crate
//!
//! Most errors in the substrate are specific to the component that raises
//! them (graph, registry, resolver, events, executor each define their own
//! `thiserror` enum). [`CoreError`] covers the handful of failures that can
//! occur while working with the vocabulary types defined here directly.

use thiserror::Error;

/// Result alias for core-crate operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Errors raised by entity, value, and identity operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// A field was addressed that the entity does not declare.
    #[error("field not found: {field}")]
    UnknownField {
        /// The field name that was looked up.
        field: String,
    },

    /// A value did not have the expected dynamic type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The type that was expected.
        expected: &'static str,
        /// The type that was actually found.
        found: &'static str,
    },

    /// An attribute-source entry referenced a field the entity does not have.
    #[error("attribute_source key '{field}' does not match any declared field")]
    DanglingAttributeSource {
        /// The offending field name.
        field: String,
    },
}
