//! Unary operator implementations, plus the increment step used by `++`
//! and `--`.

use umbra_ir::UnaryOp;
use umbra_runtime::{invalid_operator, null_operand, unsupported_operand, EvalResult, Value};

use crate::operators::Integer;

/// Evaluate a unary operator on a concrete operand.
pub fn evaluate_unary(op: UnaryOp, operand: &Value) -> EvalResult {
    let symbol = op.as_symbol();
    let Some(category) = operand.category() else {
        return Err(if operand.is_null() {
            null_operand(symbol)
        } else {
            unsupported_operand(symbol, &operand.type_name())
        });
    };

    macro_rules! integer {
        ($n:expr, $variant:ident) => {
            match op {
                UnaryOp::Plus => Ok(Value::$variant($n)),
                UnaryOp::Neg => Ok(Value::$variant(Integer::wrapping_neg($n))),
                UnaryOp::BitNot => Ok(Value::$variant(!$n)),
                UnaryOp::Not => Err(invalid_operator(symbol, category.name())),
            }
        };
    }

    match operand {
        Value::Bool(b) => match op {
            UnaryOp::Not => Ok(Value::Bool(!b)),
            _ => Err(invalid_operator(symbol, category.name())),
        },
        Value::I8(n) => integer!(*n, I8),
        Value::U8(n) => integer!(*n, U8),
        Value::I16(n) => integer!(*n, I16),
        Value::U16(n) => integer!(*n, U16),
        Value::I32(n) => integer!(*n, I32),
        Value::U32(n) => integer!(*n, U32),
        Value::I64(n) => integer!(*n, I64),
        Value::U64(n) => integer!(*n, U64),
        Value::F32(n) => match op {
            UnaryOp::Plus => Ok(Value::F32(*n)),
            UnaryOp::Neg => Ok(Value::F32(-n)),
            _ => Err(invalid_operator(symbol, category.name())),
        },
        Value::F64(n) => match op {
            UnaryOp::Plus => Ok(Value::F64(*n)),
            UnaryOp::Neg => Ok(Value::F64(-n)),
            _ => Err(invalid_operator(symbol, category.name())),
        },
        _ => Err(invalid_operator(symbol, category.name())),
    }
}

/// `value + 1` (or `- 1`) in the value's own category. Chars step through
/// code points.
pub fn step(value: &Value, decrement: bool) -> EvalResult {
    let symbol = if decrement { "--" } else { "++" };

    fn int<T: Integer>(n: T, decrement: bool) -> T {
        if decrement {
            n.wrapping_sub(T::ONE)
        } else {
            n.wrapping_add(T::ONE)
        }
    }

    Ok(match value {
        Value::I8(n) => Value::I8(int(*n, decrement)),
        Value::U8(n) => Value::U8(int(*n, decrement)),
        Value::I16(n) => Value::I16(int(*n, decrement)),
        Value::U16(n) => Value::U16(int(*n, decrement)),
        Value::I32(n) => Value::I32(int(*n, decrement)),
        Value::U32(n) => Value::U32(int(*n, decrement)),
        Value::I64(n) => Value::I64(int(*n, decrement)),
        Value::U64(n) => Value::U64(int(*n, decrement)),
        Value::F32(n) => Value::F32(if decrement { n - 1.0 } else { n + 1.0 }),
        Value::F64(n) => Value::F64(if decrement { n - 1.0 } else { n + 1.0 }),
        // Stepping into the surrogate range or past either end has no char.
        Value::Char(c) => match char::from_u32(int(u32::from(*c), decrement)) {
            Some(next) => Value::Char(next),
            None => return Err(invalid_operator(symbol, &value.type_name())),
        },
        Value::Null => return Err(null_operand(symbol)),
        other => return Err(unsupported_operand(symbol, &other.type_name())),
    })
}
