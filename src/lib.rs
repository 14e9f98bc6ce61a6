//! # entity-substrate
//!
//! An entity-native functional computation substrate: immutable, versioned
//! entities flow through registered pure functions, with the substrate
//! automatically maintaining global identity, structural versioning,
//! provenance, and lineage.
//!
//! # Quick start
//!
//! ```
//! use entity_substrate::Context;
//! use entity_core::{Entity, EntityMeta};
//! use entity_graph::{ChildEdge, Traversable};
//!
//! #[derive(Debug, Clone)]
//! struct Student {
//!     meta: EntityMeta,
//!     gpa: f64,
//! }
//!
//! impl Entity for Student {
//!     fn meta(&self) -> &EntityMeta { &self.meta }
//!     fn meta_mut(&mut self) -> &mut EntityMeta { &mut self.meta }
//!     fn type_name(&self) -> &'static str { "Student" }
//! }
//!
//! impl Traversable for Student {
//!     fn children(&self) -> Vec<ChildEdge<'_>> { Vec::new() }
//!     fn own_content_hash(&self) -> u64 { self.gpa.to_bits() }
//!     fn clone_box(&self) -> Box<dyn Traversable> { Box::new(self.clone()) }
//! }
//!
//! let ctx = Context::new();
//! let student = Student { meta: EntityMeta::new(), gpa: 3.5 };
//! ctx.registry.register_root(&student).unwrap();
//! ```
//!
//! # Components
//!
//! | Crate | Responsibility |
//! |-------|-----------------|
//! | [`entity_core`] | Identity, `Entity`/`Value`, `FunctionExecution` |
//! | [`entity_graph`] | `Traversable`, tree building, structural hashing |
//! | [`entity_registry`] | The process-wide registry: versioning, detach/attach |
//! | [`entity_resolver`] | `@id.path` address resolution, input classification |
//! | [`entity_events`] | The async event bus |
//! | [`entity_executor`] | Callable registration and the execution engine |
//!
//! Internal wiring between these crates is not exposed; [`Context`] is the
//! stable entry point.

use std::sync::Arc;

pub use entity_core::{
    AttributeSource, ConfigEntity, CoreError, EcsId, Entity, EntityMeta, ExecutionSemantic,
    FunctionExecution, LineageId, LiveId, Timestamp, Value,
};
pub use entity_events::{Event, EventBus, EventKind, EventError, Handler, Subscription};
pub use entity_executor::{
    CallableRegistry, Callable, ConfigConstructor, ExecutionLog, ExecutionOutcome, Executor,
    ExecutorError, ExecutorValue, FunctionSpec, ReturnPattern, Strategy,
};
pub use entity_graph::{
    BuiltTree, ChildEdge, ContainerKind, EdgeInfo, GraphError, IndexOrKey, Ownership, Traversable,
    TreeBuilder,
};
pub use entity_registry::{DivergenceOutcome, Registry, RegistryError};
pub use entity_resolver::{
    borrow, borrow_from, classify, resolve, Address, DeclaredParamKind, InputPattern, ParamSpec,
    PathSegment, RawInput, ResolvedValue, ResolverError,
};

/// The facade's own error type, wrapping every member crate's error so a
/// caller working only at the [`Context`] level can propagate with `?`
/// without naming each component's error type individually.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A tree-building failure (component A).
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// A registry operation failure (component B).
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// An address resolution or input classification failure (component C).
    #[error(transparent)]
    Resolver(#[from] ResolverError),
    /// An event bus failure (component D).
    #[error(transparent)]
    Event(#[from] EventError),
    /// A callable registration or execution failure (component E).
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

/// Result alias for facade-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An instantiable bundle of the registry, callable table, event bus, and
/// executor — the substrate's single entry point.
///
/// Deliberately not a process-wide singleton (`SPEC_FULL.md` §9, Global
/// mutable state): every `Context` is independent, so tests and
/// multi-tenant callers each get their own isolated instance.
pub struct Context {
    /// The entity registry (component B).
    pub registry: Arc<Registry>,
    /// The callable table (component E, registration half).
    pub callables: Arc<CallableRegistry>,
    /// The event bus (component D).
    pub events: EventBus,
    /// The execution engine (component E, dispatch half).
    pub executor: Executor,
}

impl Context {
    /// A fresh context with an empty registry, no registered callables, and
    /// no event subscribers.
    pub fn new() -> Self {
        let registry = Arc::new(Registry::new());
        let callables = Arc::new(CallableRegistry::new());
        let events = EventBus::new();
        let executor = Executor::new(registry.clone(), callables.clone(), events.clone());
        Self { registry, callables, events, executor }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a `tracing-subscriber` that reads its filter from `RUST_LOG`
/// (default `info`). A convenience for binaries and examples embedding the
/// substrate; library code never calls this itself, matching the teacher's
/// own split between library crates (which only emit spans) and the one
/// binary that installs a subscriber.
#[cfg(feature = "tracing-init")]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
