//! Binary operator implementations.
//!
//! Dispatch is an exhaustive match on the left operand's [`NumericCategory`].
//! The right operand must already have the same category; there is no
//! implicit widening here. Semantic analysis inserts explicit conversions
//! where the language widens, so a mismatch means a malformed tree.
//!
//! Null operands are rejected before dispatch: by the time an operator runs,
//! both operands must be concrete. Reference equality on null and objects is
//! handled by the interpreter, not here.

use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Not, Rem, Sub};

use umbra_ir::BinaryOp;
use umbra_runtime::{
    divide_by_zero, invalid_operator, null_operand, operand_category_mismatch,
    unsupported_operand, EvalResult, NumericCategory, Value,
};

/// Native integer behavior shared by all eight integer categories.
///
/// Arithmetic wraps on overflow, matching unchecked compiled code.
pub(crate) trait Integer:
    Copy + PartialEq + PartialOrd + BitAnd<Output = Self> + BitOr<Output = Self> + BitXor<Output = Self> + Not<Output = Self>
{
    const ZERO: Self;
    const ONE: Self;

    fn wrapping_add(self, rhs: Self) -> Self;
    fn wrapping_sub(self, rhs: Self) -> Self;
    fn wrapping_mul(self, rhs: Self) -> Self;
    fn wrapping_div(self, rhs: Self) -> Self;
    fn wrapping_rem(self, rhs: Self) -> Self;
    fn wrapping_neg(self) -> Self;
    fn wrapping_shl(self, amount: u32) -> Self;
    fn wrapping_shr(self, amount: u32) -> Self;
    /// Shift count; the shift itself masks it to the type's width.
    fn shift_amount(self) -> u32;
}

macro_rules! impl_integer {
    ($($t:ty),*) => {$(
        impl Integer for $t {
            const ZERO: Self = 0;
            const ONE: Self = 1;

            #[inline]
            fn wrapping_add(self, rhs: Self) -> Self { <$t>::wrapping_add(self, rhs) }
            #[inline]
            fn wrapping_sub(self, rhs: Self) -> Self { <$t>::wrapping_sub(self, rhs) }
            #[inline]
            fn wrapping_mul(self, rhs: Self) -> Self { <$t>::wrapping_mul(self, rhs) }
            #[inline]
            fn wrapping_div(self, rhs: Self) -> Self { <$t>::wrapping_div(self, rhs) }
            #[inline]
            fn wrapping_rem(self, rhs: Self) -> Self { <$t>::wrapping_rem(self, rhs) }
            #[inline]
            fn wrapping_neg(self) -> Self { <$t>::wrapping_neg(self) }
            #[inline]
            fn wrapping_shl(self, amount: u32) -> Self { <$t>::wrapping_shl(self, amount) }
            #[inline]
            fn wrapping_shr(self, amount: u32) -> Self { <$t>::wrapping_shr(self, amount) }
            #[inline]
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation, clippy::cast_lossless)]
            fn shift_amount(self) -> u32 { self as u32 }
        }
    )*};
}

impl_integer!(i8, u8, i16, u16, i32, u32, i64, u64);

/// Evaluate a binary operator on two concrete operands of the same category.
pub fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    let symbol = op.as_symbol();
    if left.is_null() || right.is_null() {
        return Err(null_operand(symbol));
    }
    let Some(category) = left.category() else {
        return Err(unsupported_operand(symbol, &left.type_name()));
    };
    let Some(right_category) = right.category() else {
        return Err(unsupported_operand(symbol, &right.type_name()));
    };
    if category != right_category {
        return Err(operand_category_mismatch(
            symbol,
            category.name(),
            right_category.name(),
        ));
    }

    let mismatch = || operand_category_mismatch(symbol, category.name(), right_category.name());

    // Bind both payloads of the expected variant.
    macro_rules! same {
        ($variant:ident, |$a:ident, $b:ident| $body:expr) => {
            match (left, right) {
                (Value::$variant($a), Value::$variant($b)) => $body,
                _ => Err(mismatch()),
            }
        };
    }

    match category {
        NumericCategory::Bool => same!(Bool, |a, b| eval_bool(op, *a, *b)),
        NumericCategory::Char => same!(Char, |a, b| eval_char(op, *a, *b)),
        NumericCategory::I8 => same!(I8, |a, b| eval_integer(op, category, *a, *b, Value::I8)),
        NumericCategory::U8 => same!(U8, |a, b| eval_integer(op, category, *a, *b, Value::U8)),
        NumericCategory::I16 => same!(I16, |a, b| eval_integer(op, category, *a, *b, Value::I16)),
        NumericCategory::U16 => same!(U16, |a, b| eval_integer(op, category, *a, *b, Value::U16)),
        NumericCategory::I32 => same!(I32, |a, b| eval_integer(op, category, *a, *b, Value::I32)),
        NumericCategory::U32 => same!(U32, |a, b| eval_integer(op, category, *a, *b, Value::U32)),
        NumericCategory::I64 => same!(I64, |a, b| eval_integer(op, category, *a, *b, Value::I64)),
        NumericCategory::U64 => same!(U64, |a, b| eval_integer(op, category, *a, *b, Value::U64)),
        NumericCategory::F32 => same!(F32, |a, b| eval_real(op, category, *a, *b, Value::F32)),
        NumericCategory::F64 => same!(F64, |a, b| eval_real(op, category, *a, *b, Value::F64)),
        NumericCategory::Text => same!(Text, |a, b| eval_text(op, a, b)),
    }
}

fn eval_integer<T: Integer>(
    op: BinaryOp,
    category: NumericCategory,
    a: T,
    b: T,
    wrap: fn(T) -> Value,
) -> EvalResult {
    Ok(match op {
        BinaryOp::Add => wrap(a.wrapping_add(b)),
        BinaryOp::Sub => wrap(a.wrapping_sub(b)),
        BinaryOp::Mul => wrap(a.wrapping_mul(b)),
        BinaryOp::Div => {
            if b == T::ZERO {
                return Err(divide_by_zero());
            }
            wrap(a.wrapping_div(b))
        }
        BinaryOp::Rem => {
            if b == T::ZERO {
                return Err(divide_by_zero());
            }
            wrap(a.wrapping_rem(b))
        }
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::NotEq => Value::Bool(a != b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::LtEq => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::GtEq => Value::Bool(a >= b),
        BinaryOp::BitAnd => wrap(a & b),
        BinaryOp::BitOr => wrap(a | b),
        BinaryOp::BitXor => wrap(a ^ b),
        BinaryOp::Shl => wrap(a.wrapping_shl(b.shift_amount())),
        BinaryOp::Shr => wrap(a.wrapping_shr(b.shift_amount())),
        BinaryOp::And | BinaryOp::Or => {
            return Err(invalid_operator(op.as_symbol(), category.name()))
        }
    })
}

/// IEEE 754 arithmetic; division by zero yields an infinity or NaN.
fn eval_real<T>(
    op: BinaryOp,
    category: NumericCategory,
    a: T,
    b: T,
    wrap: fn(T) -> Value,
) -> EvalResult
where
    T: Copy
        + PartialOrd
        + Add<Output = T>
        + Sub<Output = T>
        + Mul<Output = T>
        + Div<Output = T>
        + Rem<Output = T>,
{
    Ok(match op {
        BinaryOp::Add => wrap(a + b),
        BinaryOp::Sub => wrap(a - b),
        BinaryOp::Mul => wrap(a * b),
        BinaryOp::Div => wrap(a / b),
        BinaryOp::Rem => wrap(a % b),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::NotEq => Value::Bool(a != b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::LtEq => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::GtEq => Value::Bool(a >= b),
        BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor
        | BinaryOp::Shl
        | BinaryOp::Shr
        | BinaryOp::And
        | BinaryOp::Or => return Err(invalid_operator(op.as_symbol(), category.name())),
    })
}

fn eval_bool(op: BinaryOp, a: bool, b: bool) -> EvalResult {
    Ok(Value::Bool(match op {
        BinaryOp::Eq => a == b,
        BinaryOp::NotEq => a != b,
        BinaryOp::BitAnd | BinaryOp::And => a & b,
        BinaryOp::BitOr | BinaryOp::Or => a | b,
        BinaryOp::BitXor => a ^ b,
        _ => {
            return Err(invalid_operator(
                op.as_symbol(),
                NumericCategory::Bool.name(),
            ))
        }
    }))
}

fn eval_char(op: BinaryOp, a: char, b: char) -> EvalResult {
    Ok(Value::Bool(match op {
        BinaryOp::Eq => a == b,
        BinaryOp::NotEq => a != b,
        BinaryOp::Lt => a < b,
        BinaryOp::LtEq => a <= b,
        BinaryOp::Gt => a > b,
        BinaryOp::GtEq => a >= b,
        _ => {
            return Err(invalid_operator(
                op.as_symbol(),
                NumericCategory::Char.name(),
            ))
        }
    }))
}

fn eval_text(op: BinaryOp, a: &str, b: &str) -> EvalResult {
    match op {
        BinaryOp::Add => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Ok(Value::text(&joined))
        }
        BinaryOp::Eq => Ok(Value::Bool(a == b)),
        BinaryOp::NotEq => Ok(Value::Bool(a != b)),
        _ => Err(invalid_operator(
            op.as_symbol(),
            NumericCategory::Text.name(),
        )),
    }
}
