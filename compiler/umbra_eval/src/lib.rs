#![allow(
    clippy::result_large_err,
    reason = "EvalError is returned everywhere; boxing it would touch every call site"
)]
//! Umbra Eval - interpreter and activation protocol for symbolic types.
//!
//! Executes resolved operation trees for types that exist only as compiler
//! symbols, and creates instances of them that outside code can call into.
//!
//! # Architecture
//!
//! - `FrameRef`: parent-linked binding containers (class, instance, method,
//!   scope) that also answer generic-parameter lookups
//! - `FrameProvider`: cached class frames, one per closed type
//! - `evaluate_binary` / `evaluate_unary` / `convert`: direct enum-based
//!   operator dispatch over the closed numeric categories
//! - the runtime adapter bridge: decides once per member whether it is
//!   interpreted, physical, or stored, and routes every access accordingly
//! - `Interpreter`: walks one member body, calling other members only
//!   through the bridge
//! - activation: constructor resolution, the three activation shapes, and
//!   proxy binding
//! - `OperationRegistry` / `MemberTable`: stable handles to registered
//!   bodies and per-type dispatch tables
//! - `Session`: owns all per-session caches and exposes the entry points
//!
//! # Re-exports
//!
//! Value and error types from `umbra_runtime` are re-exported for
//! convenience.

mod activation;
mod bridge;
mod conversions;
mod frame;
mod frame_provider;
mod interpreter;
mod operators;
mod registry;
mod session;
mod types;
mod unary_operators;

#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod tests;

pub use umbra_runtime::{
    CancellationToken, ErrorCategory, EvalError, EvalErrorKind, EvalResult, ObjectRef,
    RuntimeType, Value,
};

pub use conversions::{convert, convert_primitive};
pub use frame::{Binding, FrameError, FrameKind, FrameRef};
pub use frame_provider::FrameProvider;
pub use operators::evaluate_binary;
pub use registry::{MemberTable, OperationId, OperationRegistry, RegistryEntry};
pub use session::{Session, SessionBuilder};
pub use types::TypeRelations;
pub use unary_operators::{evaluate_unary, step};
