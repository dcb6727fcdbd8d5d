//! Tree-walking interpreter over resolved operation trees.
//!
//! One `Interpreter` evaluates one member body. It never calls another
//! member's tree directly: every member access goes through the bridge,
//! which may re-enter a fresh interpreter for an interpreted callee.
//!
//! # Control flow
//!
//! Statements signal non-local exits through two slots rather than through
//! `Result`:
//!
//! - `pending_return`: set by `return`, observed by every enclosing block
//!   and loop, turned into the result by [`Interpreter::run`].
//! - `branch`: set by `break`/`continue`, consumed by the nearest loop.
//!
//! A block stops after the first statement that sets either slot. A branch
//! signal that escapes the body is a malformed program.
//!
//! # Frames
//!
//! `base` is the method frame. Blocks and loops push scope frames above it
//! through [`ScopedInterpreter`]; the instance frame is carried separately
//! and is only consulted for the current instance.
//!
//! Helper modules:
//!
//! - `calls` - member reads, invocations, object creation
//! - `place` - assignment targets, compound assignment, deconstruction
//! - `control` - blocks, conditionals, loops
//! - `arrays` - array creation and nested initializers
//! - `strings` - interpolated strings

mod arrays;
mod calls;
mod control;
mod place;
mod scope_guard;
mod strings;

pub use scope_guard::ScopedInterpreter;

use smallvec::SmallVec;
use umbra_ir::{
    BinaryOp, BranchKind, InstanceKind, MemberUseId, Name, OpId, OpRange, Operation, SharedTree,
    TypeRefId,
};
use umbra_runtime::{
    missing_context, no_current_instance, unsupported_operation, ArrayRef, EvalError, EvalResult,
    ObjectRef, RuntimeType, Value,
};

use crate::bridge::ResolvedMember;
use crate::conversions::convert;
use crate::frame::FrameRef;
use crate::operators::evaluate_binary;
use crate::session::Session;
use crate::types::TypeRelations;
use crate::unary_operators::evaluate_unary;

/// Array being filled by nested initializers, with the index path of the
/// initializer currently being evaluated. The path length is the dimension.
struct ArrayInitContext {
    array: ArrayRef,
    path: SmallVec<[i64; 4]>,
}

pub struct Interpreter<'s> {
    session: &'s Session,
    tree: SharedTree,
    base: FrameRef,
    scopes: Vec<FrameRef>,
    instance: Option<FrameRef>,
    /// Receivers of enclosing object initializers.
    implicit_receivers: SmallVec<[Value; 2]>,
    /// Receivers of enclosing `?.` accesses.
    conditional_roots: SmallVec<[Value; 2]>,
    array_inits: Vec<ArrayInitContext>,
    pending_return: Option<Value>,
    branch: Option<BranchKind>,
    /// Constructor initializer arguments evaluated during activation,
    /// outermost body first.
    prepared_initializers: Vec<Vec<Value>>,
}

impl<'s> Interpreter<'s> {
    pub(crate) fn new(
        session: &'s Session,
        tree: SharedTree,
        frame: FrameRef,
        instance: Option<FrameRef>,
    ) -> Self {
        Interpreter {
            session,
            tree,
            base: frame,
            scopes: Vec::new(),
            instance,
            implicit_receivers: SmallVec::new(),
            conditional_roots: SmallVec::new(),
            array_inits: Vec::new(),
            pending_return: None,
            branch: None,
            prepared_initializers: Vec::new(),
        }
    }

    /// Use already-evaluated arguments for the constructor initializers this
    /// body and the bodies it chains to will reach.
    #[must_use]
    pub(crate) fn with_prepared_initializers(mut self, prepared: Vec<Vec<Value>>) -> Self {
        self.prepared_initializers = prepared;
        self
    }

    /// Evaluate the whole tree. The result is the returned value, or the
    /// root's own value when the body never returns.
    #[tracing::instrument(level = "trace", skip_all)]
    pub(crate) fn run(mut self) -> EvalResult {
        let value = self.eval(self.tree.root)?;
        if self.branch.is_some() {
            return Err(missing_context("enclosing loop"));
        }
        Ok(self.pending_return.take().unwrap_or(value))
    }

    /// Innermost frame.
    pub(crate) fn frame(&self) -> &FrameRef {
        self.scopes.last().unwrap_or(&self.base)
    }

    /// Evaluate one node. Errors without a span get this node's span.
    pub(crate) fn eval(&mut self, id: OpId) -> EvalResult {
        let op = *self.tree.arena.get(id);
        self.eval_operation(op)
            .map_err(|e| e.or_span(self.tree.arena.span(id)))
    }

    pub(crate) fn eval_list(&mut self, range: OpRange) -> Result<Vec<Value>, EvalError> {
        let tree = self.tree.clone();
        tree.arena
            .list(range)
            .iter()
            .map(|&id| self.eval(id))
            .collect()
    }

    fn eval_operation(&mut self, op: Operation) -> EvalResult {
        match op {
            Operation::Literal(constant) => {
                Ok(Value::from_constant(constant, self.session.interner()))
            }
            Operation::DefaultValue(ty) => Ok(self.resolve_type(ty)?.default_value()),
            Operation::TypeOf(ty) => Ok(Value::Type(self.resolve_type(ty)?)),

            Operation::Local(name) | Operation::Parameter(name) => self.read_name(name),
            Operation::Instance(InstanceKind::ContainingType) => {
                Ok(Value::Object(self.current_instance()?))
            }
            Operation::Instance(InstanceKind::ImplicitReceiver) => self
                .implicit_receivers
                .last()
                .cloned()
                .ok_or_else(|| missing_context("object initializer")),
            Operation::ConditionalAccessInstance => self
                .conditional_roots
                .last()
                .cloned()
                .ok_or_else(|| missing_context("conditional access")),

            Operation::FieldRef { field, receiver } => {
                self.eval_member_read(field, receiver, OpRange::EMPTY, false)
            }
            Operation::PropertyRef {
                property,
                receiver,
                index,
                is_virtual,
            } => self.eval_member_read(property, receiver, index, is_virtual),
            Operation::ArrayElement { array, indices } => self.eval_element_read(array, indices),

            Operation::Binary {
                op,
                left,
                right,
                operator,
            } => self.eval_binary(op, left, right, operator),
            Operation::Unary {
                op,
                operand,
                operator,
            } => {
                let value = self.eval(operand)?;
                match operator {
                    Some(operator) => self.call_operator(operator, vec![value]),
                    None => evaluate_unary(op, &value),
                }
            }
            Operation::Conversion {
                operand,
                target,
                kind,
                operator,
            } => {
                let value = self.eval(operand)?;
                if let Some(operator) = operator {
                    return self.call_operator(operator, vec![value]);
                }
                let target = self.resolve_type(target)?;
                convert(value, &target, kind, &self.relations())
            }
            Operation::Coalesce { value, when_null } => {
                let value = self.eval(value)?;
                if value.is_null() {
                    self.eval(when_null)
                } else {
                    Ok(value)
                }
            }
            Operation::ConditionalAccess {
                receiver,
                when_not_null,
            } => {
                let receiver = self.eval(receiver)?;
                if receiver.is_null() {
                    return Ok(Value::Null);
                }
                self.conditional_roots.push(receiver);
                let result = self.eval(when_not_null);
                self.conditional_roots.pop();
                result
            }
            Operation::IsType {
                operand,
                target,
                negated,
            } => {
                let value = self.eval(operand)?;
                let target = self.resolve_type(target)?;
                let matches = !value.is_null() && self.relations().accepts_value(&value, &target)?;
                Ok(Value::Bool(matches != negated))
            }

            Operation::Assign { target, value } => self.eval_assign(target, value),
            Operation::CompoundAssign {
                op,
                target,
                value,
                operator,
            } => self.eval_compound_assign(op, target, value, operator),
            Operation::Increment {
                target,
                decrement,
                postfix,
                operator,
            } => self.eval_increment(target, decrement, postfix, operator),
            Operation::Deconstruct { target, value } => self.eval_deconstruct(target, value),

            Operation::Invocation {
                method,
                receiver,
                args,
                is_virtual,
            } => self.eval_invocation(method, receiver, args, is_virtual),
            Operation::ConstructorInitializer { constructor, args } => {
                self.eval_constructor_initializer(constructor, args)
            }
            Operation::ObjectCreation {
                constructor,
                args,
                initializer,
            } => self.eval_object_creation(constructor, args, initializer),
            Operation::AnonymousObjectCreation { ty, initializers } => {
                self.eval_anonymous_creation(ty, initializers)
            }
            Operation::ObjectInitializer(initializers) => {
                self.eval_list(initializers)?;
                Ok(Value::Void)
            }
            Operation::ArrayCreation {
                element,
                rank,
                dimensions,
                initializer,
            } => self.eval_array_creation(element, rank, dimensions, initializer),
            Operation::ArrayInitializer(items) => self.eval_array_initializer(items),
            Operation::Tuple(elements) => Ok(Value::tuple(self.eval_list(elements)?)),

            Operation::InterpolatedString(parts) => self.eval_interpolated_string(parts),
            Operation::InterpolatedText(text) => Ok(Value::text(self.session.name(text))),
            Operation::Interpolation {
                value,
                alignment,
                format,
            } => self.eval_interpolation(value, alignment, format),

            Operation::Block(statements) => self.eval_block(statements),
            Operation::ExpressionStatement(expr) => {
                self.eval(expr)?;
                Ok(Value::Void)
            }
            Operation::VariableDeclaration { name, initializer } => {
                self.eval_declaration(name, initializer)
            }
            Operation::Conditional {
                condition,
                when_true,
                when_false,
            } => self.eval_conditional(condition, when_true, when_false),
            Operation::WhileLoop {
                condition,
                body,
                test_first,
            } => self.eval_while(condition, body, test_first),
            Operation::ForLoop {
                before,
                condition,
                after,
                body,
            } => self.eval_for(before, condition, after, body),
            Operation::ForEachLoop {
                local,
                collection,
                body,
            } => self.eval_foreach(local, collection, body),
            Operation::Branch(kind) => {
                self.branch = Some(kind);
                Ok(Value::Void)
            }
            Operation::Return(value) => {
                let value = match value {
                    Some(value) => self.eval(value)?,
                    None => Value::Void,
                };
                self.pending_return = Some(value);
                Ok(Value::Void)
            }
            Operation::Empty => Ok(Value::Void),

            // Only meaningful as assignment targets.
            op @ (Operation::DeclarationTarget(_) | Operation::Discard) => {
                Err(unsupported_operation(op.kind_name()))
            }
            op @ (Operation::Throw(_)
            | Operation::Await(_)
            | Operation::Lambda { .. }
            | Operation::Switch { .. }) => Err(unsupported_operation(op.kind_name())),
        }
    }

    fn read_name(&self, name: Name) -> EvalResult {
        self.frame()
            .get(name)
            .map_err(|e| e.into_eval(self.session.name(name)))
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        left: OpId,
        right: OpId,
        operator: Option<MemberUseId>,
    ) -> EvalResult {
        let left = self.eval(left)?;
        if op.is_short_circuit() && operator.is_none() {
            if let Value::Bool(l) = left {
                let decided = if op == BinaryOp::And { !l } else { l };
                if decided {
                    return Ok(Value::Bool(l));
                }
                let r = self.eval(right)?.as_bool()?;
                return Ok(Value::Bool(r));
            }
        }
        let right = self.eval(right)?;
        match operator {
            Some(operator) => self.call_operator(operator, vec![left, right]),
            None => binary_values(op, &left, &right),
        }
    }

    /// Close a type reference against the current frame chain.
    fn resolve_type(&self, id: TypeRefId) -> Result<RuntimeType, EvalError> {
        RuntimeType::resolve(self.tree.arena.type_ref(id), self.frame())
    }

    /// Close a member use against the current frame chain.
    fn resolve_member(&self, id: MemberUseId) -> Result<ResolvedMember, EvalError> {
        let member = self.tree.arena.member(id);
        Ok(ResolvedMember {
            symbol: member.symbol,
            containing: RuntimeType::resolve(&member.containing, self.frame())?,
            type_args: RuntimeType::resolve_all(&member.type_args, self.frame())?,
        })
    }

    fn current_instance(&self) -> Result<ObjectRef, EvalError> {
        self.instance
            .as_ref()
            .and_then(FrameRef::current_instance)
            .ok_or_else(no_current_instance)
    }

    fn relations(&self) -> TypeRelations<'s> {
        TypeRelations::new(self.session.descriptors())
    }
}

/// Binary operator on evaluated operands.
///
/// Equality involving a reference operand compares identity, and text
/// concatenation renders the other operand (null as empty). Everything else
/// goes to [`evaluate_binary`].
pub(crate) fn binary_values(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    if op.is_equality() && (left.is_reference() || right.is_reference()) {
        let same = left.reference_eq(right);
        return Ok(Value::Bool(if op == BinaryOp::Eq { same } else { !same }));
    }
    if op == BinaryOp::Add
        && (matches!(left, Value::Text(_)) || matches!(right, Value::Text(_)))
        && !matches!((left, right), (Value::Text(_), Value::Text(_)))
    {
        return Ok(Value::text(&format!("{left}{right}")));
    }
    evaluate_binary(op, left, right)
}
