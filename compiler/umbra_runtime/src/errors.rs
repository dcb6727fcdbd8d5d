//! Error types for interpretation and activation.
//!
//! # Structured Error Categories
//!
//! `EvalErrorKind` is a closed set of typed failures; every kind belongs to
//! exactly one `ErrorCategory`. Factory functions (e.g. `undefined_name()`)
//! are the public way to build errors so messages stay in one place.
//!
//! Nothing in the interpreter catches an `EvalError`: every failure unwinds
//! untouched to the external caller. The only enrichment is the source span
//! of the innermost failing operation.

use umbra_ir::Span;

use crate::value::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Coarse classification of failures.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The operation tree asks for something that cannot be done:
    /// incompatible operands, failed casts, unsupported operation kinds.
    MalformedProgram,
    /// Frame-chain misuse: undeclared names, redeclarations, use of an
    /// unassigned binding. Always an interpreter or operation-tree defect.
    Scope,
    /// A constructor or member could not be resolved.
    Resolution,
    /// The host rejected a synthesized type, or cancellation was requested.
    HostEnvironment,
}

/// Typed error kinds.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    // Malformed program
    #[error("operator `{op}` requires operands of the same category, got {left} and {right}")]
    OperandCategoryMismatch {
        op: &'static str,
        left: String,
        right: String,
    },
    #[error("operator `{op}` is not defined for category {category}")]
    InvalidOperator { op: &'static str, category: String },
    #[error("operator `{op}` received a null operand")]
    NullOperand { op: &'static str },
    #[error("operator `{op}` cannot be applied to a value of type {type_name}")]
    UnsupportedOperand { op: &'static str, type_name: String },
    #[error("integer division by zero")]
    DivideByZero,
    #[error("cannot cast {from} to {to}")]
    InvalidCast { from: String, to: String },
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },
    #[error("index {index} is out of range for a dimension of length {length}")]
    IndexOutOfRange { index: i64, length: usize },
    #[error("operation kind {kind} is not supported by the interpreter")]
    UnsupportedOperation { kind: &'static str },
    #[error("null reference while accessing {member}")]
    NullReference { member: String },
    #[error("format specifier `{spec}` is not valid for {type_name}")]
    InvalidFormat { spec: String, type_name: String },

    // Scope
    #[error("`{name}` is not declared in any enclosing frame")]
    UndefinedName { name: String },
    #[error("`{name}` is already declared in an enclosing frame")]
    Redeclaration { name: String },
    #[error("`{name}` is declared but has not been assigned")]
    UnassignedUse { name: String },
    #[error("generic parameter {param} is not bound in the current frame chain")]
    UnboundGenericParameter { param: String },
    #[error("no current instance is available")]
    NoCurrentInstance,
    #[error("{context} used outside of its enclosing construct")]
    MissingContext { context: &'static str },

    // Resolution
    #[error("no constructor of {type_name} accepts the given {arity} argument(s)")]
    MissingConstructor { type_name: String, arity: usize },
    #[error("constructor call on {type_name} is ambiguous between {candidates} candidates")]
    AmbiguousConstructor { type_name: String, candidates: usize },
    #[error("member {member} of {type_name} cannot be resolved: {reason}")]
    UnresolvedMember {
        member: String,
        type_name: String,
        reason: String,
    },
    #[error("{member} expects {expected} argument(s), got {got}")]
    ArityMismatch {
        member: String,
        expected: usize,
        got: usize,
    },
    #[error("instance of {type_name} is not bound to an interpreter")]
    ProxyNotBound { type_name: String },
    #[error("instance of {type_name} is already bound to an interpreter")]
    ProxyAlreadyBound { type_name: String },

    // Host environment
    #[error("type {type_name} could not be created: {reason}")]
    TypeCreationFailed { type_name: String, reason: String },
    #[error("interpretation was cancelled")]
    Cancelled,
    #[error("host failure: {message}")]
    Host { message: String },
}

impl EvalErrorKind {
    /// The category this kind belongs to.
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::OperandCategoryMismatch { .. }
            | Self::InvalidOperator { .. }
            | Self::NullOperand { .. }
            | Self::UnsupportedOperand { .. }
            | Self::DivideByZero
            | Self::InvalidCast { .. }
            | Self::TypeMismatch { .. }
            | Self::IndexOutOfRange { .. }
            | Self::UnsupportedOperation { .. }
            | Self::NullReference { .. }
            | Self::InvalidFormat { .. } => ErrorCategory::MalformedProgram,

            Self::UndefinedName { .. }
            | Self::Redeclaration { .. }
            | Self::UnassignedUse { .. }
            | Self::UnboundGenericParameter { .. }
            | Self::NoCurrentInstance
            | Self::MissingContext { .. } => ErrorCategory::Scope,

            Self::MissingConstructor { .. }
            | Self::AmbiguousConstructor { .. }
            | Self::UnresolvedMember { .. }
            | Self::ArityMismatch { .. }
            | Self::ProxyNotBound { .. }
            | Self::ProxyAlreadyBound { .. } => ErrorCategory::Resolution,

            Self::TypeCreationFailed { .. } | Self::Cancelled | Self::Host { .. } => {
                ErrorCategory::HostEnvironment
            }
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct EvalError {
    /// Structured error kind.
    pub kind: EvalErrorKind,
    /// Span of the innermost operation that failed, if known.
    pub span: Option<Span>,
    /// Secondary context, e.g. the member being interpreted.
    pub notes: Vec<String>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError {
            kind,
            span: None,
            notes: Vec::new(),
        }
    }

    /// Attach a source span to this error.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach `span` only if no span is set yet, so the innermost node wins.
    #[must_use]
    pub fn or_span(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub const fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// True if this error reports observed cancellation rather than a defect.
    pub fn is_cancellation(&self) -> bool {
        matches!(self.kind, EvalErrorKind::Cancelled)
    }
}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        EvalError::new(kind)
    }
}

// Malformed program

#[cold]
pub fn operand_category_mismatch(op: &'static str, left: &str, right: &str) -> EvalError {
    EvalErrorKind::OperandCategoryMismatch {
        op,
        left: left.to_string(),
        right: right.to_string(),
    }
    .into()
}

#[cold]
pub fn invalid_operator(op: &'static str, category: &str) -> EvalError {
    EvalErrorKind::InvalidOperator {
        op,
        category: category.to_string(),
    }
    .into()
}

#[cold]
pub fn null_operand(op: &'static str) -> EvalError {
    EvalErrorKind::NullOperand { op }.into()
}

#[cold]
pub fn unsupported_operand(op: &'static str, type_name: &str) -> EvalError {
    EvalErrorKind::UnsupportedOperand {
        op,
        type_name: type_name.to_string(),
    }
    .into()
}

#[cold]
pub fn divide_by_zero() -> EvalError {
    EvalErrorKind::DivideByZero.into()
}

#[cold]
pub fn invalid_cast(from: &str, to: &str) -> EvalError {
    EvalErrorKind::InvalidCast {
        from: from.to_string(),
        to: to.to_string(),
    }
    .into()
}

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    }
    .into()
}

#[cold]
pub fn index_out_of_range(index: i64, length: usize) -> EvalError {
    EvalErrorKind::IndexOutOfRange { index, length }.into()
}

#[cold]
pub fn unsupported_operation(kind: &'static str) -> EvalError {
    EvalErrorKind::UnsupportedOperation { kind }.into()
}

#[cold]
pub fn null_reference(member: &str) -> EvalError {
    EvalErrorKind::NullReference {
        member: member.to_string(),
    }
    .into()
}

#[cold]
pub fn invalid_format(spec: &str, type_name: &str) -> EvalError {
    EvalErrorKind::InvalidFormat {
        spec: spec.to_string(),
        type_name: type_name.to_string(),
    }
    .into()
}

// Scope

#[cold]
pub fn undefined_name(name: &str) -> EvalError {
    EvalErrorKind::UndefinedName {
        name: name.to_string(),
    }
    .into()
}

#[cold]
pub fn redeclaration(name: &str) -> EvalError {
    EvalErrorKind::Redeclaration {
        name: name.to_string(),
    }
    .into()
}

#[cold]
pub fn unassigned_use(name: &str) -> EvalError {
    EvalErrorKind::UnassignedUse {
        name: name.to_string(),
    }
    .into()
}

#[cold]
pub fn unbound_generic_parameter(param: &str) -> EvalError {
    EvalErrorKind::UnboundGenericParameter {
        param: param.to_string(),
    }
    .into()
}

#[cold]
pub fn no_current_instance() -> EvalError {
    EvalErrorKind::NoCurrentInstance.into()
}

#[cold]
pub fn missing_context(context: &'static str) -> EvalError {
    EvalErrorKind::MissingContext { context }.into()
}

// Resolution

#[cold]
pub fn missing_constructor(type_name: &str, arity: usize) -> EvalError {
    EvalErrorKind::MissingConstructor {
        type_name: type_name.to_string(),
        arity,
    }
    .into()
}

#[cold]
pub fn ambiguous_constructor(type_name: &str, candidates: usize) -> EvalError {
    EvalErrorKind::AmbiguousConstructor {
        type_name: type_name.to_string(),
        candidates,
    }
    .into()
}

#[cold]
pub fn unresolved_member(member: &str, type_name: &str, reason: &str) -> EvalError {
    EvalErrorKind::UnresolvedMember {
        member: member.to_string(),
        type_name: type_name.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

#[cold]
pub fn arity_mismatch(member: &str, expected: usize, got: usize) -> EvalError {
    EvalErrorKind::ArityMismatch {
        member: member.to_string(),
        expected,
        got,
    }
    .into()
}

#[cold]
pub fn proxy_not_bound(type_name: &str) -> EvalError {
    EvalErrorKind::ProxyNotBound {
        type_name: type_name.to_string(),
    }
    .into()
}

#[cold]
pub fn proxy_already_bound(type_name: &str) -> EvalError {
    EvalErrorKind::ProxyAlreadyBound {
        type_name: type_name.to_string(),
    }
    .into()
}

// Host environment

#[cold]
pub fn type_creation_failed(type_name: &str, reason: &str) -> EvalError {
    EvalErrorKind::TypeCreationFailed {
        type_name: type_name.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

#[cold]
pub fn cancelled() -> EvalError {
    EvalErrorKind::Cancelled.into()
}

#[cold]
pub fn host_failure(message: impl Into<String>) -> EvalError {
    EvalErrorKind::Host {
        message: message.into(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_messages_name_operator_and_category() {
        let err = invalid_operator("<<", "text");
        assert_eq!(err.to_string(), "operator `<<` is not defined for category text");
    }

    #[test]
    fn test_categories() {
        assert_eq!(undefined_name("x").category(), ErrorCategory::Scope);
        assert_eq!(divide_by_zero().category(), ErrorCategory::MalformedProgram);
        assert_eq!(
            missing_constructor("Point", 2).category(),
            ErrorCategory::Resolution
        );
        assert_eq!(cancelled().category(), ErrorCategory::HostEnvironment);
        assert!(cancelled().is_cancellation());
        assert!(!type_creation_failed("Point", "rejected").is_cancellation());
    }

    #[test]
    fn test_or_span_keeps_innermost() {
        let err = undefined_name("x")
            .or_span(Span::new(1, 2))
            .or_span(Span::new(0, 10));
        assert_eq!(err.span, Some(Span::new(1, 2)));
    }
}
