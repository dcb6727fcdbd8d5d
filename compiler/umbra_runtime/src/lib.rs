#![allow(
    clippy::result_large_err,
    reason = "EvalError is returned everywhere; boxing it would touch every call site"
)]
//! Umbra Runtime - values, errors and host contracts for the Umbra interpreter.
//!
//! This crate provides:
//! - Runtime values (`Value`, `ObjectRef`, `ArrayRef`) and the closed
//!   `NumericCategory` enumeration that operator dispatch switches on
//! - Concrete runtime types (`RuntimeType`) and generic resolution
//! - Evaluation error types (`EvalError`, `EvalErrorKind`, `EvalResult`)
//! - Contracts of the collaborators the interpreter consumes: the descriptor
//!   layer, physical member handles, the type synthesizer and the
//!   operation-tree provider
//! - Cooperative cancellation (`CancellationToken`)

mod cancel;
mod descriptor;
mod errors;
mod host;
mod runtime_type;
mod value;

pub use cancel::CancellationToken;
pub use descriptor::{
    ConstructorDescriptor, DescriptorLayer, FieldDescriptor, MemberDescriptor, MemberHeader,
    MemberInfo, MemberOrigin, MethodDescriptor, Parameter, PhysicalCall, PhysicalHandle,
    PropertyDescriptor, Signature, TypeDescriptor, TypeKind, TypeOrigin,
};
pub use errors::{ErrorCategory, EvalError, EvalErrorKind, EvalResult};
pub use host::{OperationTreeProvider, SynthesizedType, TypeSynthesizer};
pub use runtime_type::{GenericResolver, RuntimeType, Substitution};
pub use value::{
    format_with, ArrayRef, ArrayValue, InterpreterLink, NumericCategory, ObjectRef, Value,
    WeakObject,
};

// Re-export error constructors for use by other crates
pub use errors::{
    ambiguous_constructor, arity_mismatch, cancelled, divide_by_zero, host_failure,
    index_out_of_range, invalid_cast, invalid_format, invalid_operator, missing_constructor,
    missing_context, no_current_instance, null_operand, null_reference,
    operand_category_mismatch, proxy_already_bound, proxy_not_bound, redeclaration,
    type_creation_failed, type_mismatch, unassigned_use, unbound_generic_parameter,
    undefined_name, unresolved_member, unsupported_operand, unsupported_operation,
};
