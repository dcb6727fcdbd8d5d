//! Built-in conversions.
//!
//! Numeric conversions are unchecked: integers truncate to the target width
//! and reals convert with native `as` semantics. Reference conversions
//! succeed only when the value's dynamic type is assignable to the target.
//! A failed `Cast` is an invalid-cast error; a failed `TryCast` yields null.

use umbra_ir::{ConversionKind, PrimitiveType};
use umbra_runtime::{invalid_cast, EvalResult, RuntimeType, Value};

use crate::types::TypeRelations;

/// Numeric payload of a value, char included.
#[derive(Copy, Clone)]
enum Numeric {
    Int(i128),
    Real(f64),
}

fn numeric(value: &Value) -> Option<Numeric> {
    Some(match value {
        Value::Char(c) => Numeric::Int(i128::from(u32::from(*c))),
        Value::I8(n) => Numeric::Int(i128::from(*n)),
        Value::U8(n) => Numeric::Int(i128::from(*n)),
        Value::I16(n) => Numeric::Int(i128::from(*n)),
        Value::U16(n) => Numeric::Int(i128::from(*n)),
        Value::I32(n) => Numeric::Int(i128::from(*n)),
        Value::U32(n) => Numeric::Int(i128::from(*n)),
        Value::I64(n) => Numeric::Int(i128::from(*n)),
        Value::U64(n) => Numeric::Int(i128::from(*n)),
        Value::F32(n) => Numeric::Real(f64::from(*n)),
        Value::F64(n) => Numeric::Real(*n),
        _ => return None,
    })
}

/// Convert between primitive representations, or `None` if no built-in
/// conversion exists.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap
)]
pub fn convert_primitive(value: &Value, target: PrimitiveType) -> Option<Value> {
    match (value, target) {
        (Value::Bool(b), PrimitiveType::Bool) => return Some(Value::Bool(*b)),
        (Value::Text(s), PrimitiveType::Text) => return Some(Value::Text(s.clone())),
        _ => {}
    }
    let n = numeric(value)?;

    macro_rules! to {
        ($variant:ident, $t:ty) => {
            Value::$variant(match n {
                Numeric::Int(i) => i as $t,
                Numeric::Real(f) => f as $t,
            })
        };
    }

    Some(match target {
        PrimitiveType::I8 => to!(I8, i8),
        PrimitiveType::U8 => to!(U8, u8),
        PrimitiveType::I16 => to!(I16, i16),
        PrimitiveType::U16 => to!(U16, u16),
        PrimitiveType::I32 => to!(I32, i32),
        PrimitiveType::U32 => to!(U32, u32),
        PrimitiveType::I64 => to!(I64, i64),
        PrimitiveType::U64 => to!(U64, u64),
        PrimitiveType::F32 => to!(F32, f32),
        PrimitiveType::F64 => to!(F64, f64),
        PrimitiveType::Char => {
            let unit = match n {
                Numeric::Int(i) => i as u16,
                Numeric::Real(f) => f as u16,
            };
            Value::Char(char::from_u32(u32::from(unit))?)
        }
        PrimitiveType::Void
        | PrimitiveType::Bool
        | PrimitiveType::Text
        | PrimitiveType::Object
        | PrimitiveType::TypeHandle => return None,
    })
}

/// Apply a built-in conversion of `value` to `target`.
pub fn convert(
    value: Value,
    target: &RuntimeType,
    kind: ConversionKind,
    relations: &TypeRelations<'_>,
) -> EvalResult {
    let fail = |value: &Value| match kind {
        ConversionKind::Cast => Err(invalid_cast(&value.type_name(), &target.to_string())),
        ConversionKind::TryCast => Ok(Value::Null),
    };

    if value.is_null() {
        return if target.accepts_null() {
            Ok(Value::Null)
        } else {
            fail(&value)
        };
    }

    match target {
        RuntimeType::Nullable(inner) => convert(value, inner, kind, relations),
        RuntimeType::Primitive(PrimitiveType::Object) => Ok(value),
        RuntimeType::Primitive(p) if value.category().is_some() => {
            match convert_primitive(&value, *p) {
                Some(converted) => Ok(converted),
                None => fail(&value),
            }
        }
        _ => {
            if relations.accepts_value(&value, target)? {
                Ok(value)
            } else {
                fail(&value)
            }
        }
    }
}
