//! Contracts of the remaining host collaborators.

use std::rc::Rc;

use umbra_ir::{SharedTree, SymbolId};

use crate::errors::EvalError;
use crate::runtime_type::RuntimeType;
use crate::value::{ObjectRef, Value};

/// Front-end access to member bodies.
///
/// Deterministic: the same symbol always yields the same tree (or none).
pub trait OperationTreeProvider {
    fn operation_tree(&self, symbol: SymbolId) -> Option<SharedTree>;
}

/// Produces loadable placeholder types that back proxy instances.
pub trait TypeSynthesizer {
    /// Synthesize (or return the memoized) backing type for `ty`. Fails with
    /// `TypeCreationFailed` when the host rejects the type.
    fn synthesize(&self, ty: &RuntimeType) -> Result<Rc<dyn SynthesizedType>, EvalError>;
}

/// A synthesized backing type.
pub trait SynthesizedType {
    fn runtime_type(&self) -> &RuntimeType;

    /// Physically construct an unbound proxy instance. `args` are the
    /// physical constructor arguments, empty for a parameterless base.
    fn construct(&self, args: &[Value]) -> Result<ObjectRef, EvalError>;
}
