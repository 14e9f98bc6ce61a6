//! The event payload and its taxonomy (§4.D Event Model)

use entity_core::{EcsId, LineageId, Timestamp, Value};
use std::collections::BTreeMap;
use std::fmt;

/// The fixed taxonomy of events the substrate itself emits. Domain code may
/// also publish events under [`EventKind::Custom`] for application-level
/// notifications that ride the same bus.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A brand-new entity was registered as a root (Lifecycle: *Created* →
    /// *Promoted to root*).
    EntityCreated,
    /// A registered tree diverged from its live graph and forked new
    /// versions (Lifecycle: *Versioned*).
    EntityVersioned,
    /// A hierarchical child was severed and promoted to its own root
    /// (Lifecycle: *Detached*).
    EntityDetached,
    /// A root entity was attached as a hierarchical child elsewhere.
    EntityAttached,
    /// An entity was reconstructed from storage (Lifecycle: *Reconstructed*).
    EntityReconstructed,
    /// A callable execution entered the `RUN` state.
    FunctionStarted,
    /// A callable execution reached `COMMIT` successfully.
    FunctionCompleted,
    /// A callable execution reached `FAIL`.
    FunctionFailed,
    /// An application-defined event name, for domain code that wants to
    /// ride the same bus without extending this enum.
    Custom(String),
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::EntityCreated => write!(f, "entity.created"),
            EventKind::EntityVersioned => write!(f, "entity.versioned"),
            EventKind::EntityDetached => write!(f, "entity.detached"),
            EventKind::EntityAttached => write!(f, "entity.attached"),
            EventKind::EntityReconstructed => write!(f, "entity.reconstructed"),
            EventKind::FunctionStarted => write!(f, "function.started"),
            EventKind::FunctionCompleted => write!(f, "function.completed"),
            EventKind::FunctionFailed => write!(f, "function.failed"),
            EventKind::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// One notification published on the bus.
#[derive(Debug, Clone)]
pub struct Event {
    /// What kind of event this is.
    pub kind: EventKind,
    /// The root entity (if any) this event concerns.
    pub root_ecs_id: Option<EcsId>,
    /// The specific entity version this event concerns.
    pub ecs_id: Option<EcsId>,
    /// The logical entity lineage this event concerns.
    pub lineage_id: Option<LineageId>,
    /// Free-form details (e.g. `function_name`, `old_ecs_id`/`new_ecs_id`
    /// pairs for a version fork).
    pub payload: BTreeMap<String, Value>,
    /// When this event was published.
    pub emitted_at: Timestamp,
    /// Identifies the execution (or other causal chain) that produced this
    /// event. A handler that re-publishes an event carrying its own
    /// `emitter_fingerprint` unchanged is reacting to its own output;
    /// [`crate::bus::EventBus`] uses this to break such cascades rather
    /// than looping forever (§4.D, self-recursion guard).
    pub emitter_fingerprint: Option<u64>,
}

impl Event {
    /// Construct an event with no payload and no causal fingerprint.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            root_ecs_id: None,
            ecs_id: None,
            lineage_id: None,
            payload: BTreeMap::new(),
            emitted_at: Timestamp::now(),
            emitter_fingerprint: None,
        }
    }

    /// Attach the entity this event concerns.
    pub fn with_entity(mut self, root_ecs_id: EcsId, ecs_id: EcsId, lineage_id: LineageId) -> Self {
        self.root_ecs_id = Some(root_ecs_id);
        self.ecs_id = Some(ecs_id);
        self.lineage_id = Some(lineage_id);
        self
    }

    /// Attach a causal fingerprint (typically the executing
    /// `FunctionExecution`'s `ecs_id`, hashed).
    pub fn with_fingerprint(mut self, fingerprint: u64) -> Self {
        self.emitter_fingerprint = Some(fingerprint);
        self
    }

    /// Add one payload field, builder-style.
    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}
