//! Symbol identities.
//!
//! A `SymbolId` names one member declaration (constructor, method, accessor,
//! field or property) and a `TypeDefId` one type declaration. Both identify
//! the *declaration*, not a generic instantiation of it: `List<int>.Add` and
//! `List<string>.Add` share a `SymbolId`. The instantiation at a use site is
//! carried separately by `MemberUse`.

use std::fmt;

use crate::TypeRef;

/// Identity of a member declaration.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct SymbolId(u32);

impl SymbolId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        SymbolId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

/// Identity of a type declaration.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TypeDefId(u32);

impl TypeDefId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        TypeDefId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TypeDefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDefId({})", self.0)
    }
}

/// A member as referenced from inside an operation tree.
///
/// `containing` is the declaring type as seen from the use site, so for a call
/// to `Box<T>.Get()` made inside `Box<T>` it is open over the type-level
/// parameter `T`. `type_args` are the method-level type arguments of a generic
/// method call, likewise possibly open. Both are closed against the caller's
/// frame at run time.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberUse {
    pub symbol: SymbolId,
    pub containing: TypeRef,
    pub type_args: Vec<TypeRef>,
}

impl MemberUse {
    /// A use without method-level type arguments.
    pub fn new(symbol: SymbolId, containing: TypeRef) -> Self {
        MemberUse {
            symbol,
            containing,
            type_args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_type_args(mut self, type_args: Vec<TypeRef>) -> Self {
        self.type_args = type_args;
        self
    }
}
