//! Umbra IR - operation trees and symbolic types for the Umbra interpreter.
//!
//! This crate holds the data that the front-end hands to the interpreter:
//!
//! - `Name` / `StringInterner`: interned identifiers
//! - `Span`: source locations attached to operation nodes
//! - `BinaryOp` / `UnaryOp`: the operator sets
//! - `TypeRef` / `GenericParam`: symbolic type references, possibly open over
//!   type-level or method-level generic parameters
//! - `SymbolId` / `TypeDefId` / `MemberUse`: declaration identities and their
//!   generic instantiation at a use site
//! - `Operation`: the closed set of operation kinds
//! - `OperationArena` / `OperationTree` / `SharedTree`: flat storage for one
//!   member's resolved operation tree
//!
//! Nothing in here executes code; see `umbra_eval`.

mod arena;
mod builder;
mod interner;
mod name;
mod operation;
mod ops;
mod span;
mod symbol;
mod types;

pub use arena::{MemberUseId, OpId, OpRange, OperationArena, OperationTree, SharedTree, TypeRefId};
pub use builder::TreeBuilder;
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use operation::{BranchKind, Constant, ConversionKind, InstanceKind, Operation};
pub use ops::{BinaryOp, UnaryOp};
pub use span::Span;
pub use symbol::{MemberUse, SymbolId, TypeDefId};
pub use types::{GenericLevel, GenericParam, PrimitiveType, TypeRef};
