//! Member reads, invocations and object creation.
//!
//! All of these hand a [`ResolvedMember`] to the bridge; none of them knows
//! whether the member is interpreted, physical or stored.

use umbra_ir::{MemberUseId, OpId, OpRange, TypeRefId};
use umbra_runtime::{EvalError, EvalResult, MemberInfo, Value};

use super::Interpreter;
use crate::bridge::{MemberTarget, ResolvedMember};

impl Interpreter<'_> {
    /// The receiver of a member access. An explicit receiver is evaluated;
    /// an instance member without one uses the current instance; static
    /// members have none.
    pub(super) fn receiver_for(
        &mut self,
        member: &ResolvedMember,
        receiver: Option<OpId>,
    ) -> Result<Option<Value>, EvalError> {
        if let Some(receiver) = receiver {
            return self.eval(receiver).map(Some);
        }
        if self.session.descriptors().member(member.symbol)?.is_static() {
            Ok(None)
        } else {
            Ok(Some(Value::Object(self.current_instance()?)))
        }
    }

    pub(super) fn eval_member_read(
        &mut self,
        member: MemberUseId,
        receiver: Option<OpId>,
        index: OpRange,
        is_virtual: bool,
    ) -> EvalResult {
        let member = self.resolve_member(member)?;
        let receiver = self.receiver_for(&member, receiver)?;
        let index = self.eval_list(index)?;
        self.session.get_member(&member, receiver, index, is_virtual)
    }

    pub(super) fn eval_invocation(
        &mut self,
        method: MemberUseId,
        receiver: Option<OpId>,
        args: OpRange,
        is_virtual: bool,
    ) -> EvalResult {
        let method = self.resolve_member(method)?;
        let receiver = self.receiver_for(&method, receiver)?;
        let args = self.eval_list(args)?;
        self.session.call_member(&method, receiver, args, is_virtual)
    }

    /// User-defined operator or conversion: a static call.
    pub(super) fn call_operator(&mut self, operator: MemberUseId, args: Vec<Value>) -> EvalResult {
        let operator = self.resolve_member(operator)?;
        self.session.call_member(&operator, None, args, false)
    }

    /// `: base(...)` / `: this(...)`.
    ///
    /// A physical target was already satisfied when the backing instance was
    /// constructed, so only an interpreted target runs here, against the
    /// same instance. Arguments evaluated during activation are reused.
    pub(super) fn eval_constructor_initializer(
        &mut self,
        constructor: MemberUseId,
        args: OpRange,
    ) -> EvalResult {
        let constructor = self.resolve_member(constructor)?;
        let target = self.session.target(constructor.symbol)?;
        let MemberTarget::Interpreted(tree) = &*target else {
            return Ok(Value::Void);
        };
        let instance = self.current_instance()?;
        let args = if self.prepared_initializers.is_empty() {
            self.eval_list(args)?
        } else {
            self.prepared_initializers.remove(0)
        };
        let rest = std::mem::take(&mut self.prepared_initializers);
        self.session
            .interpreter_for(
                tree,
                constructor.symbol,
                &constructor.containing,
                Vec::new(),
                Some(&instance),
                args,
            )?
            .with_prepared_initializers(rest)
            .run()?;
        Ok(Value::Void)
    }

    pub(super) fn eval_object_creation(
        &mut self,
        constructor: MemberUseId,
        args: OpRange,
        initializer: Option<OpId>,
    ) -> EvalResult {
        let constructor = self.resolve_member(constructor)?;
        let args = self.eval_list(args)?;
        let descriptor = self.session.descriptors().member(constructor.symbol)?;
        let instance = self
            .session
            .activate_with(&descriptor, &constructor.containing, args)?;
        let instance = Value::Object(instance);
        if let Some(initializer) = initializer {
            self.with_receiver(instance.clone(), initializer)?;
        }
        Ok(instance)
    }

    /// `new { A = a, B = b }`.
    pub(super) fn eval_anonymous_creation(
        &mut self,
        ty: TypeRefId,
        initializers: OpRange,
    ) -> EvalResult {
        let ty = self.resolve_type(ty)?;
        let instance = Value::Object(self.session.activate(&ty, Vec::new())?);
        let tree = self.tree.clone();
        for &initializer in tree.arena.list(initializers) {
            self.with_receiver(instance.clone(), initializer)?;
        }
        Ok(instance)
    }

    /// Evaluate `id` with `receiver` as the implicit receiver.
    fn with_receiver(&mut self, receiver: Value, id: OpId) -> EvalResult {
        self.implicit_receivers.push(receiver);
        let result = self.eval(id);
        self.implicit_receivers.pop();
        result
    }
}
