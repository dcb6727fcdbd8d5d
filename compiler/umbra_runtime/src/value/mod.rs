//! Runtime values for the Umbra interpreter.
//!
//! Primitive values are stored inline. Text, tuples, arrays and objects are
//! reference-counted; arrays and objects have identity (`reference_eq`) and
//! interior mutability, text and tuples are immutable.
//!
//! # Numeric categories
//!
//! Operator dispatch never inspects a value's dynamic type beyond its
//! [`NumericCategory`], a closed enumeration of the primitive kinds operators
//! are defined on. Matching on it is exhaustive, so adding a category is a
//! compile error at every dispatch site.

mod array;
mod format;
mod object;

use std::fmt;
use std::rc::Rc;

use umbra_ir::{Constant, PrimitiveType, StringInterner};

use crate::errors::{type_mismatch, EvalError};
use crate::runtime_type::RuntimeType;

pub use array::{ArrayRef, ArrayValue};
pub use format::format_with;
pub use object::{InterpreterLink, ObjectRef, WeakObject};

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    /// Result of a statement or a void call.
    Void,
    /// The null reference.
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Text(Rc<str>),
    Object(ObjectRef),
    Array(ArrayRef),
    Tuple(Rc<[Value]>),
    /// Result of `typeof(T)`.
    Type(RuntimeType),
}

/// The closed set of primitive categories operators dispatch on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NumericCategory {
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
}

impl NumericCategory {
    pub const fn name(self) -> &'static str {
        self.primitive().name()
    }

    pub const fn primitive(self) -> PrimitiveType {
        match self {
            Self::Bool => PrimitiveType::Bool,
            Self::Char => PrimitiveType::Char,
            Self::I8 => PrimitiveType::I8,
            Self::U8 => PrimitiveType::U8,
            Self::I16 => PrimitiveType::I16,
            Self::U16 => PrimitiveType::U16,
            Self::I32 => PrimitiveType::I32,
            Self::U32 => PrimitiveType::U32,
            Self::I64 => PrimitiveType::I64,
            Self::U64 => PrimitiveType::U64,
            Self::F32 => PrimitiveType::F32,
            Self::F64 => PrimitiveType::F64,
            Self::Text => PrimitiveType::Text,
        }
    }

    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::I8 | Self::U8 | Self::I16 | Self::U16 | Self::I32 | Self::U32 | Self::I64 | Self::U64
        )
    }

    pub const fn is_real(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }
}

impl Value {
    pub fn text(s: &str) -> Self {
        Value::Text(Rc::from(s))
    }

    pub fn tuple(elements: Vec<Value>) -> Self {
        Value::Tuple(elements.into())
    }

    /// Materialize a literal. Text constants are looked up in `interner`.
    pub fn from_constant(constant: Constant, interner: &StringInterner) -> Self {
        match constant {
            Constant::Null => Value::Null,
            Constant::Bool(b) => Value::Bool(b),
            Constant::Char(c) => Value::Char(c),
            Constant::I8(n) => Value::I8(n),
            Constant::U8(n) => Value::U8(n),
            Constant::I16(n) => Value::I16(n),
            Constant::U16(n) => Value::U16(n),
            Constant::I32(n) => Value::I32(n),
            Constant::U32(n) => Value::U32(n),
            Constant::I64(n) => Value::I64(n),
            Constant::U64(n) => Value::U64(n),
            Constant::F32(bits) => Value::F32(f32::from_bits(bits)),
            Constant::F64(bits) => Value::F64(f64::from_bits(bits)),
            Constant::Text(name) => Value::text(interner.lookup(name)),
        }
    }

    /// Operator category, or `None` for void, null and reference values
    /// other than text.
    pub fn category(&self) -> Option<NumericCategory> {
        Some(match self {
            Value::Bool(_) => NumericCategory::Bool,
            Value::Char(_) => NumericCategory::Char,
            Value::I8(_) => NumericCategory::I8,
            Value::U8(_) => NumericCategory::U8,
            Value::I16(_) => NumericCategory::I16,
            Value::U16(_) => NumericCategory::U16,
            Value::I32(_) => NumericCategory::I32,
            Value::U32(_) => NumericCategory::U32,
            Value::I64(_) => NumericCategory::I64,
            Value::U64(_) => NumericCategory::U64,
            Value::F32(_) => NumericCategory::F32,
            Value::F64(_) => NumericCategory::F64,
            Value::Text(_) => NumericCategory::Text,
            Value::Void
            | Value::Null
            | Value::Object(_)
            | Value::Array(_)
            | Value::Tuple(_)
            | Value::Type(_) => return None,
        })
    }

    /// Dynamic type of the value; `None` for void and null.
    pub fn runtime_type(&self) -> Option<RuntimeType> {
        if let Some(category) = self.category() {
            return Some(RuntimeType::Primitive(category.primitive()));
        }
        match self {
            Value::Object(obj) => Some(obj.runtime_type().clone()),
            Value::Array(arr) => Some(arr.runtime_type()),
            Value::Tuple(elements) => Some(RuntimeType::Tuple(
                elements
                    .iter()
                    .map(|v| v.runtime_type().unwrap_or(RuntimeType::OBJECT))
                    .collect(),
            )),
            Value::Type(_) => Some(RuntimeType::Primitive(PrimitiveType::TypeHandle)),
            _ => None,
        }
    }

    /// Whether this value has reference identity.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Object(_) | Value::Array(_) | Value::Type(_)
        )
    }

    /// Identity comparison of reference values. Null equals only null;
    /// type handles compare by the type they denote.
    pub fn reference_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Type(a), Value::Type(b)) => a == b,
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Result<bool, EvalError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(type_mismatch("bool", &other.type_name())),
        }
    }

    /// Integer (or char) value widened for use as an index or count.
    pub fn as_index(&self) -> Result<i64, EvalError> {
        Ok(match self {
            Value::I8(n) => i64::from(*n),
            Value::U8(n) => i64::from(*n),
            Value::I16(n) => i64::from(*n),
            Value::U16(n) => i64::from(*n),
            Value::I32(n) => i64::from(*n),
            Value::U32(n) => i64::from(*n),
            Value::I64(n) => *n,
            Value::U64(n) => i64::try_from(*n).unwrap_or(i64::MAX),
            Value::Char(c) => i64::from(u32::from(*c)),
            other => return Err(type_mismatch("integer", &other.type_name())),
        })
    }

    /// Type name for diagnostics.
    pub fn type_name(&self) -> String {
        match self {
            Value::Void => "void".to_string(),
            Value::Null => "null".to_string(),
            other => other
                .runtime_type()
                .map_or_else(|| "unknown".to_string(), |ty| ty.to_string()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "Void"),
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Char(c) => write!(f, "Char({c:?})"),
            Value::I8(n) => write!(f, "I8({n})"),
            Value::U8(n) => write!(f, "U8({n})"),
            Value::I16(n) => write!(f, "I16({n})"),
            Value::U16(n) => write!(f, "U16({n})"),
            Value::I32(n) => write!(f, "I32({n})"),
            Value::U32(n) => write!(f, "U32({n})"),
            Value::I64(n) => write!(f, "I64({n})"),
            Value::U64(n) => write!(f, "U64({n})"),
            Value::F32(n) => write!(f, "F32({n:?})"),
            Value::F64(n) => write!(f, "F64({n:?})"),
            Value::Text(s) => write!(f, "Text({s:?})"),
            Value::Object(obj) => write!(f, "Object({})", obj.runtime_type()),
            Value::Array(arr) => write!(f, "Array({:?})", arr.values()),
            Value::Tuple(elements) => f.debug_tuple("Tuple").field(elements).finish(),
            Value::Type(ty) => write!(f, "Type({ty})"),
        }
    }
}

#[cfg(test)]
mod tests;
