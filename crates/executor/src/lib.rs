//! Callable registry and execution engine (component E)
//!
//! The central coordinator: functions are registered with their declared
//! parameter shape, calls are classified and routed through one of four
//! execution strategies, entity inputs are isolated before invocation, the
//! execution's semantic (mutation / creation / detachment) is detected by
//! object identity, and every call is recorded as a [`FunctionExecution`].

pub mod callable;
pub mod error;
pub mod executor;
pub mod isolation;
pub mod log;
pub mod return_pattern;
pub mod scalar_output;
pub mod strategy;
pub mod value;

pub use callable::{Callable, CallableRegistry, ConfigConstructor, FunctionSpec};
pub use entity_core::FunctionExecution;
pub use error::{ExecutorError, ExecutorResult};
pub use executor::{ExecutionOutcome, Executor};
pub use isolation::{descendant_ecs_ids, detect_semantic, isolate, IsolatedInput};
pub use log::ExecutionLog;
pub use return_pattern::{classify_return, unpack, ReturnPattern};
pub use scalar_output::ScalarOutput;
pub use strategy::{select_strategy, Strategy};
pub use value::ExecutorValue;
