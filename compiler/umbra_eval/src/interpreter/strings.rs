//! Interpolated strings.

use umbra_ir::{Name, OpId, OpRange};
use umbra_runtime::{format_with, EvalResult, Value};

use super::Interpreter;

impl Interpreter<'_> {
    pub(super) fn eval_interpolated_string(&mut self, parts: OpRange) -> EvalResult {
        let mut text = String::new();
        for part in self.eval_list(parts)? {
            // Text parts and interpolations both evaluate to text.
            text.push_str(&part.to_string());
        }
        Ok(Value::text(&text))
    }

    /// `{value,alignment:format}`.
    pub(super) fn eval_interpolation(
        &mut self,
        value: OpId,
        alignment: Option<OpId>,
        format: Option<Name>,
    ) -> EvalResult {
        let value = self.eval(value)?;
        let alignment = match alignment {
            Some(alignment) => Some(self.eval(alignment)?.as_index()?),
            None => None,
        };
        let format = format.map(|name| self.session.name(name));
        Ok(Value::text(&format_with(&value, format, alignment)?))
    }
}
