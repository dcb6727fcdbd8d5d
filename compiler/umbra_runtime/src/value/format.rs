//! Text rendering of values for string interpolation.
//!
//! `Display` gives the default rendering. [`format_with`] applies a format
//! specifier (`D`, `X`, `F`, `N` with an optional precision) and an
//! alignment: positive widths right-align, negative widths left-align.

use std::fmt;

use crate::errors::{invalid_format, EvalError};
use crate::value::Value;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void | Value::Null => Ok(()),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Char(c) => write!(f, "{c}"),
            Value::I8(n) => write!(f, "{n}"),
            Value::U8(n) => write!(f, "{n}"),
            Value::I16(n) => write!(f, "{n}"),
            Value::U16(n) => write!(f, "{n}"),
            Value::I32(n) => write!(f, "{n}"),
            Value::U32(n) => write!(f, "{n}"),
            Value::I64(n) => write!(f, "{n}"),
            Value::U64(n) => write!(f, "{n}"),
            Value::F32(n) => write!(f, "{n}"),
            Value::F64(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Object(obj) => write!(f, "{}", obj.runtime_type()),
            Value::Array(arr) => write!(f, "{}", arr.runtime_type()),
            Value::Tuple(elements) => {
                write!(f, "(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, ")")
            }
            Value::Type(ty) => write!(f, "{ty}"),
        }
    }
}

/// Integer payload widened to i128 so every integer category formats alike.
fn integer(value: &Value) -> Option<i128> {
    Some(match value {
        Value::I8(n) => i128::from(*n),
        Value::U8(n) => i128::from(*n),
        Value::I16(n) => i128::from(*n),
        Value::U16(n) => i128::from(*n),
        Value::I32(n) => i128::from(*n),
        Value::U32(n) => i128::from(*n),
        Value::I64(n) => i128::from(*n),
        Value::U64(n) => i128::from(*n),
        _ => return None,
    })
}

fn real(value: &Value) -> Option<f64> {
    match value {
        Value::F32(n) => Some(f64::from(*n)),
        Value::F64(n) => Some(*n),
        other => integer(other).map(|n| n as f64),
    }
}

/// Hex digits of the value's two's-complement representation at its width.
fn hex(value: &Value, upper: bool) -> Option<String> {
    let s = match value {
        Value::I8(n) => format!("{n:x}"),
        Value::U8(n) => format!("{n:x}"),
        Value::I16(n) => format!("{n:x}"),
        Value::U16(n) => format!("{n:x}"),
        Value::I32(n) => format!("{n:x}"),
        Value::U32(n) => format!("{n:x}"),
        Value::I64(n) => format!("{n:x}"),
        Value::U64(n) => format!("{n:x}"),
        _ => return None,
    };
    Some(if upper { s.to_uppercase() } else { s })
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn zero_pad(n: i128, width: usize) -> String {
    let digits = n.unsigned_abs().to_string();
    let sign = if n < 0 { "-" } else { "" };
    format!("{sign}{digits:0>width$}")
}

/// Render `value` with an optional format specifier and alignment.
pub fn format_with(
    value: &Value,
    spec: Option<&str>,
    alignment: Option<i64>,
) -> Result<String, EvalError> {
    let text = match spec {
        None | Some("") => value.to_string(),
        Some(spec) => apply_spec(value, spec)?,
    };
    Ok(match alignment {
        None => text,
        Some(width) => {
            let pad = usize::try_from(width.unsigned_abs()).unwrap_or(usize::MAX);
            if width < 0 {
                format!("{text:<pad$}")
            } else {
                format!("{text:>pad$}")
            }
        }
    })
}

fn apply_spec(value: &Value, spec: &str) -> Result<String, EvalError> {
    let fail = || invalid_format(spec, &value.type_name());
    let mut chars = spec.chars();
    let letter = chars.next().ok_or_else(fail)?;
    let digits = chars.as_str();
    let precision = if digits.is_empty() {
        None
    } else {
        Some(digits.parse::<usize>().map_err(|_| fail())?)
    };

    match letter {
        'D' | 'd' => {
            let n = integer(value).ok_or_else(fail)?;
            Ok(zero_pad(n, precision.unwrap_or(0)))
        }
        'X' | 'x' => {
            let digits = hex(value, letter == 'X').ok_or_else(fail)?;
            let width = precision.unwrap_or(0);
            Ok(format!("{digits:0>width$}"))
        }
        'F' | 'f' => {
            let n = real(value).ok_or_else(fail)?;
            let places = precision.unwrap_or(2);
            Ok(format!("{n:.places$}"))
        }
        'N' | 'n' => {
            let n = real(value).ok_or_else(fail)?;
            let places = precision.unwrap_or(2);
            let fixed = format!("{:.places$}", n.abs());
            let (whole, fraction) = match fixed.split_once('.') {
                Some((w, f)) => (w, Some(f)),
                None => (fixed.as_str(), None),
            };
            let sign = if n < 0.0 { "-" } else { "" };
            let grouped = group_thousands(whole);
            Ok(match fraction {
                Some(f) => format!("{sign}{grouped}.{f}"),
                None => format!("{sign}{grouped}"),
            })
        }
        _ => Err(fail()),
    }
}
