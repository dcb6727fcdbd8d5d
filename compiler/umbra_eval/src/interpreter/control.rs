//! Blocks, conditionals and loops.

use umbra_ir::{BranchKind, Name, OpId, OpRange};
use umbra_runtime::{null_reference, unsupported_operand, EvalResult, Value};

use super::Interpreter;

impl Interpreter<'_> {
    /// True once a `return` or a branch signal is pending.
    fn interrupted(&self) -> bool {
        self.pending_return.is_some() || self.branch.is_some()
    }

    /// Consume the signal left by one loop iteration. True when the loop
    /// must stop: on `break`, or when a `return` is pending.
    fn loop_exit(&mut self) -> bool {
        if self.pending_return.is_some() {
            return true;
        }
        matches!(self.branch.take(), Some(BranchKind::Break))
    }

    pub(super) fn eval_block(&mut self, statements: OpRange) -> EvalResult {
        let tree = self.tree.clone();
        self.with_scope(|scoped| {
            for &statement in tree.arena.list(statements) {
                scoped.eval(statement)?;
                if scoped.interrupted() {
                    break;
                }
            }
            Ok(Value::Void)
        })
    }

    pub(super) fn eval_declaration(&mut self, name: Name, initializer: Option<OpId>) -> EvalResult {
        let result = match initializer {
            Some(initializer) => {
                let value = self.eval(initializer)?;
                self.frame().define(name, value)
            }
            None => self.frame().declare(name),
        };
        result.map_err(|e| e.into_eval(self.session.name(name)))?;
        Ok(Value::Void)
    }

    /// `if`/`else`, and `?:` when used as an expression.
    pub(super) fn eval_conditional(
        &mut self,
        condition: OpId,
        when_true: OpId,
        when_false: Option<OpId>,
    ) -> EvalResult {
        let arm = if self.eval(condition)?.as_bool()? {
            when_true
        } else {
            match when_false {
                Some(when_false) => when_false,
                None => return Ok(Value::Void),
            }
        };
        self.with_scope(|scoped| scoped.eval(arm))
    }

    pub(super) fn eval_while(&mut self, condition: OpId, body: OpId, test_first: bool) -> EvalResult {
        self.with_scope(|scoped| {
            let mut first = true;
            loop {
                if (test_first || !first) && !scoped.eval(condition)?.as_bool()? {
                    break;
                }
                first = false;
                scoped.eval(body)?;
                if scoped.loop_exit() {
                    break;
                }
            }
            Ok(Value::Void)
        })
    }

    pub(super) fn eval_for(
        &mut self,
        before: OpRange,
        condition: Option<OpId>,
        after: OpRange,
        body: OpId,
    ) -> EvalResult {
        let tree = self.tree.clone();
        self.with_scope(|scoped| {
            for &init in tree.arena.list(before) {
                scoped.eval(init)?;
            }
            loop {
                if let Some(condition) = condition {
                    if !scoped.eval(condition)?.as_bool()? {
                        break;
                    }
                }
                scoped.eval(body)?;
                if scoped.loop_exit() {
                    break;
                }
                for &step in tree.arena.list(after) {
                    scoped.eval(step)?;
                }
            }
            Ok(Value::Void)
        })
    }

    /// `foreach` over an array (row-major) or the characters of a text.
    pub(super) fn eval_foreach(&mut self, local: Name, collection: OpId, body: OpId) -> EvalResult {
        let items = match self.eval(collection)? {
            Value::Array(array) => array.values(),
            Value::Text(text) => text.chars().map(Value::Char).collect(),
            Value::Null => return Err(null_reference("foreach")),
            other => return Err(unsupported_operand("foreach", &other.type_name())),
        };
        for item in items {
            let stop = self.with_scope(|scoped| {
                scoped
                    .frame()
                    .define(local, item)
                    .map_err(|e| e.into_eval(scoped.session.name(local)))?;
                scoped.eval(body)?;
                Ok::<_, umbra_runtime::EvalError>(scoped.loop_exit())
            })?;
            if stop {
                break;
            }
        }
        Ok(Value::Void)
    }
}
