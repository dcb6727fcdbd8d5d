//! Symbolic type references.
//!
//! A `TypeRef` is a type as written in an operation tree. It may be open over
//! generic parameters; the evaluator closes it against the current frame
//! chain to obtain a concrete runtime type.

use std::fmt;

use crate::TypeDefId;

/// Built-in types with a fixed runtime representation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PrimitiveType {
    Void,
    Bool,
    Char,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Text,
    /// The root reference type; every value converts to it.
    Object,
    /// The type of `typeof(...)` results.
    TypeHandle,
}

impl PrimitiveType {
    /// Source-level spelling, used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "sbyte",
            Self::U8 => "byte",
            Self::I16 => "short",
            Self::U16 => "ushort",
            Self::I32 => "int",
            Self::U32 => "uint",
            Self::I64 => "long",
            Self::U64 => "ulong",
            Self::F32 => "float",
            Self::F64 => "double",
            Self::Text => "string",
            Self::Object => "object",
            Self::TypeHandle => "Type",
        }
    }

    /// Whether `null` is a valid value of this type.
    pub const fn accepts_null(self) -> bool {
        matches!(self, Self::Text | Self::Object | Self::TypeHandle)
    }
}

/// Which declaration owns a generic parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum GenericLevel {
    /// Declared on a type (`class Box<T>`); resolved by class frames.
    Type,
    /// Declared on a method (`T Pick<T>()`); resolved by method frames.
    Method,
}

/// A generic parameter, identified by level and position.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct GenericParam {
    pub level: GenericLevel,
    pub ordinal: u32,
}

impl GenericParam {
    #[inline]
    pub const fn type_level(ordinal: u32) -> Self {
        GenericParam {
            level: GenericLevel::Type,
            ordinal,
        }
    }

    #[inline]
    pub const fn method_level(ordinal: u32) -> Self {
        GenericParam {
            level: GenericLevel::Method,
            ordinal,
        }
    }
}

impl fmt::Display for GenericParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            GenericLevel::Type => write!(f, "!{}", self.ordinal),
            GenericLevel::Method => write!(f, "!!{}", self.ordinal),
        }
    }
}

/// A type as referenced by an operation tree.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeRef {
    Primitive(PrimitiveType),
    /// A declared type with its (possibly open) type arguments.
    Named { def: TypeDefId, args: Vec<TypeRef> },
    /// An unresolved generic parameter.
    Param(GenericParam),
    Array { element: Box<TypeRef>, rank: u8 },
    Tuple(Vec<TypeRef>),
    Nullable(Box<TypeRef>),
}

impl TypeRef {
    pub const VOID: TypeRef = TypeRef::Primitive(PrimitiveType::Void);
    pub const BOOL: TypeRef = TypeRef::Primitive(PrimitiveType::Bool);
    pub const I32: TypeRef = TypeRef::Primitive(PrimitiveType::I32);
    pub const I64: TypeRef = TypeRef::Primitive(PrimitiveType::I64);
    pub const F64: TypeRef = TypeRef::Primitive(PrimitiveType::F64);
    pub const TEXT: TypeRef = TypeRef::Primitive(PrimitiveType::Text);
    pub const OBJECT: TypeRef = TypeRef::Primitive(PrimitiveType::Object);

    /// A non-generic named type.
    pub fn named(def: TypeDefId) -> Self {
        TypeRef::Named {
            def,
            args: Vec::new(),
        }
    }

    /// A single-dimensional array of `element`.
    pub fn array_of(element: TypeRef) -> Self {
        TypeRef::Array {
            element: Box::new(element),
            rank: 1,
        }
    }

    /// True if no generic parameter occurs anywhere inside.
    pub fn is_closed(&self) -> bool {
        match self {
            TypeRef::Primitive(_) => true,
            TypeRef::Param(_) => false,
            TypeRef::Named { args, .. } | TypeRef::Tuple(args) => args.iter().all(Self::is_closed),
            TypeRef::Array { element, .. } | TypeRef::Nullable(element) => element.is_closed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closedness() {
        let open = TypeRef::Named {
            def: TypeDefId::new(1),
            args: vec![TypeRef::Param(GenericParam::type_level(0))],
        };
        assert!(!open.is_closed());
        assert!(TypeRef::array_of(TypeRef::I32).is_closed());
    }

    #[test]
    fn test_param_display() {
        assert_eq!(GenericParam::type_level(1).to_string(), "!1");
        assert_eq!(GenericParam::method_level(0).to_string(), "!!0");
    }
}
