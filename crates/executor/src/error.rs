//! Executor failure modes (§4.E Failures, §7 Error Handling Design)

use entity_core::{CoreError, EcsId};
use thiserror::Error;

/// Result alias for executor operations.
pub type ExecutorResult<T> = std::result::Result<T, ExecutorError>;

/// Errors raised while registering or running a callable.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// `register` was called for a name that is already registered.
    #[error("function '{0}' is already registered")]
    AlreadyRegistered(String),

    /// `execute`/`execute_async` named a function the registry has no
    /// record of.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// Input classification failed (unknown parameter, missing required
    /// parameter, or a type mismatch).
    #[error(transparent)]
    Classification(#[from] entity_resolver::ResolverError),

    /// Synthesizing a declared `ConfigEntity` parameter from caller
    /// primitives failed.
    #[error("building config entity for parameter '{param}': {source}")]
    ConfigConstruction {
        /// The parameter name.
        param: String,
        /// The underlying constructor error.
        #[source]
        source: CoreError,
    },

    /// A declared `ConfigEntity` parameter had no registered constructor.
    #[error("no config constructor registered for parameter '{0}'")]
    MissingConfigConstructor(String),

    /// The registered callable itself returned an error.
    #[error("function '{function}' failed: {message}")]
    CallableFailed {
        /// The function name.
        function: String,
        /// The callable's own error message.
        message: String,
    },

    /// Committing a returned entity back to the registry failed.
    #[error("committing output {0}: {1}")]
    Commit(EcsId, #[source] entity_registry::RegistryError),

    /// A sibling-group assignment produced an inconsistent
    /// `FunctionExecution` record (Invariant 9).
    #[error("sibling groups do not partition the output set for '{0}'")]
    InconsistentSiblingGroups(String),
}
