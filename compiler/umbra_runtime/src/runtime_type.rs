//! Concrete runtime types.
//!
//! A `RuntimeType` is a `TypeRef` with every generic parameter replaced by a
//! concrete argument. Operation trees carry open `TypeRef`s; the evaluator
//! closes them through a [`GenericResolver`] (normally the current frame).

use std::fmt;
use std::rc::Rc;

use umbra_ir::{GenericLevel, GenericParam, PrimitiveType, TypeDefId, TypeRef};

use crate::errors::{unbound_generic_parameter, EvalError};
use crate::value::Value;

/// Supplies concrete arguments for generic parameters.
pub trait GenericResolver {
    fn generic_argument(&self, param: GenericParam) -> Result<RuntimeType, EvalError>;
}

/// A fully closed type.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum RuntimeType {
    Primitive(PrimitiveType),
    Named {
        def: TypeDefId,
        args: Rc<[RuntimeType]>,
    },
    Array {
        element: Rc<RuntimeType>,
        rank: u8,
    },
    Tuple(Rc<[RuntimeType]>),
    Nullable(Rc<RuntimeType>),
}

impl RuntimeType {
    pub const VOID: RuntimeType = RuntimeType::Primitive(PrimitiveType::Void);
    pub const BOOL: RuntimeType = RuntimeType::Primitive(PrimitiveType::Bool);
    pub const I32: RuntimeType = RuntimeType::Primitive(PrimitiveType::I32);
    pub const TEXT: RuntimeType = RuntimeType::Primitive(PrimitiveType::Text);
    pub const OBJECT: RuntimeType = RuntimeType::Primitive(PrimitiveType::Object);

    pub fn named(def: TypeDefId, args: Vec<RuntimeType>) -> Self {
        RuntimeType::Named {
            def,
            args: args.into(),
        }
    }

    pub fn array(element: RuntimeType, rank: u8) -> Self {
        RuntimeType::Array {
            element: Rc::new(element),
            rank,
        }
    }

    /// Close `ty` by substituting generic parameters through `resolver`.
    pub fn resolve(ty: &TypeRef, resolver: &dyn GenericResolver) -> Result<Self, EvalError> {
        Ok(match ty {
            TypeRef::Primitive(p) => RuntimeType::Primitive(*p),
            TypeRef::Param(param) => resolver.generic_argument(*param)?,
            TypeRef::Named { def, args } => RuntimeType::Named {
                def: *def,
                args: Self::resolve_all(args, resolver)?.into(),
            },
            TypeRef::Array { element, rank } => RuntimeType::Array {
                element: Rc::new(Self::resolve(element, resolver)?),
                rank: *rank,
            },
            TypeRef::Tuple(elements) => {
                RuntimeType::Tuple(Self::resolve_all(elements, resolver)?.into())
            }
            TypeRef::Nullable(inner) => {
                RuntimeType::Nullable(Rc::new(Self::resolve(inner, resolver)?))
            }
        })
    }

    pub fn resolve_all(
        types: &[TypeRef],
        resolver: &dyn GenericResolver,
    ) -> Result<Vec<Self>, EvalError> {
        types.iter().map(|ty| Self::resolve(ty, resolver)).collect()
    }

    /// The value a slot of this type holds before its first assignment.
    pub fn default_value(&self) -> Value {
        match self {
            RuntimeType::Primitive(p) => match p {
                PrimitiveType::Void => Value::Void,
                PrimitiveType::Bool => Value::Bool(false),
                PrimitiveType::Char => Value::Char('\0'),
                PrimitiveType::I8 => Value::I8(0),
                PrimitiveType::U8 => Value::U8(0),
                PrimitiveType::I16 => Value::I16(0),
                PrimitiveType::U16 => Value::U16(0),
                PrimitiveType::I32 => Value::I32(0),
                PrimitiveType::U32 => Value::U32(0),
                PrimitiveType::I64 => Value::I64(0),
                PrimitiveType::U64 => Value::U64(0),
                PrimitiveType::F32 => Value::F32(0.0),
                PrimitiveType::F64 => Value::F64(0.0),
                PrimitiveType::Text | PrimitiveType::Object | PrimitiveType::TypeHandle => {
                    Value::Null
                }
            },
            RuntimeType::Tuple(elements) => {
                Value::tuple(elements.iter().map(Self::default_value).collect())
            }
            RuntimeType::Named { .. } | RuntimeType::Array { .. } | RuntimeType::Nullable(_) => {
                Value::Null
            }
        }
    }

    /// Whether `null` is a valid value of this type.
    pub fn accepts_null(&self) -> bool {
        match self {
            RuntimeType::Primitive(p) => p.accepts_null(),
            RuntimeType::Named { .. } | RuntimeType::Array { .. } | RuntimeType::Nullable(_) => {
                true
            }
            RuntimeType::Tuple(_) => false,
        }
    }

    pub fn def(&self) -> Option<TypeDefId> {
        match self {
            RuntimeType::Named { def, .. } => Some(*def),
            _ => None,
        }
    }

    /// Type arguments of a named type; empty for everything else.
    pub fn type_args(&self) -> &[RuntimeType] {
        match self {
            RuntimeType::Named { args, .. } => args,
            _ => &[],
        }
    }

    /// Strip one level of nullability.
    pub fn underlying(&self) -> &RuntimeType {
        match self {
            RuntimeType::Nullable(inner) => inner,
            other => other,
        }
    }

    pub fn is_primitive(&self, p: PrimitiveType) -> bool {
        matches!(self, RuntimeType::Primitive(q) if *q == p)
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, items: &[RuntimeType]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }

        match self {
            RuntimeType::Primitive(p) => write!(f, "{}", p.name()),
            RuntimeType::Named { def, args } => {
                write!(f, "type#{}", def.raw())?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    list(f, args)?;
                    write!(f, ">")?;
                }
                Ok(())
            }
            RuntimeType::Array { element, rank } => {
                write!(f, "{element}[")?;
                for _ in 1..*rank {
                    write!(f, ",")?;
                }
                write!(f, "]")
            }
            RuntimeType::Tuple(elements) => {
                write!(f, "(")?;
                list(f, elements)?;
                write!(f, ")")
            }
            RuntimeType::Nullable(inner) => write!(f, "{inner}?"),
        }
    }
}

/// Explicit substitution of type-level and method-level arguments.
///
/// Used where no frame exists yet, e.g. when closing the base type or
/// parameter types of a declaration against the arguments of an
/// instantiation.
#[derive(Copy, Clone, Debug, Default)]
pub struct Substitution<'a> {
    pub type_args: &'a [RuntimeType],
    pub method_args: &'a [RuntimeType],
}

impl<'a> Substitution<'a> {
    pub fn of_type(type_args: &'a [RuntimeType]) -> Self {
        Substitution {
            type_args,
            method_args: &[],
        }
    }
}

impl GenericResolver for Substitution<'_> {
    fn generic_argument(&self, param: GenericParam) -> Result<RuntimeType, EvalError> {
        let args = match param.level {
            GenericLevel::Type => self.type_args,
            GenericLevel::Method => self.method_args,
        };
        args.get(param.ordinal as usize)
            .cloned()
            .ok_or_else(|| unbound_generic_parameter(&param.to_string()))
    }
}
