//! RAII scope guard for the interpreter's frame stack.
//!
//! [`ScopedInterpreter`] pushes a scope frame on creation and pops it on
//! drop, so early returns through `?` and unwinding both leave the stack
//! balanced. It derefs to the interpreter, so the body reads the same as
//! unscoped code.
//!
//! ```text
//! self.with_scope(|scoped| {
//!     scoped.frame().define(name, value)?;
//!     scoped.eval(body)
//! })
//! ```

use std::ops::{Deref, DerefMut};

use super::Interpreter;

pub struct ScopedInterpreter<'guard, 's> {
    interpreter: &'guard mut Interpreter<'s>,
}

impl Drop for ScopedInterpreter<'_, '_> {
    fn drop(&mut self) {
        self.interpreter.scopes.pop();
    }
}

impl<'s> Deref for ScopedInterpreter<'_, 's> {
    type Target = Interpreter<'s>;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl<'s> Interpreter<'s> {
    /// Push a scope frame above the current one; popped when the guard drops.
    pub fn scoped(&mut self) -> ScopedInterpreter<'_, 's> {
        let scope = self.session.frames().scope_frame(self.frame());
        self.scopes.push(scope);
        ScopedInterpreter { interpreter: self }
    }

    /// Run `f` inside a fresh scope.
    pub fn with_scope<T, F>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut ScopedInterpreter<'_, 's>) -> T,
    {
        let mut scoped = self.scoped();
        f(&mut scoped)
    }
}
