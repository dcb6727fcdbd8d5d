//! Instance activation.
//!
//! Creating an instance of a symbolic type takes one of three shapes:
//!
//! - **implicit**: no constructor body. The backing instance is constructed
//!   and bound, nothing else runs.
//! - **anonymous**: a structurally-anonymous type. After binding, every
//!   property name is declared (unassigned) in the instance frame; the
//!   creation site's initializers assign them.
//! - **interpreted**: the constructor initializer chain is evaluated once,
//!   the backing instance is constructed with the physical base arguments
//!   and bound, then the constructor bodies are interpreted, reusing the
//!   initializer arguments already evaluated.
//!
//! The binding is always in place before any interpreted code of the
//! instance runs, so callbacks made during construction reach the
//! interpreter. Types loaded from outside the session are constructed
//! through their physical constructor directly.

use std::rc::Rc;

use smallvec::SmallVec;
use umbra_ir::{Operation, SymbolId};
use umbra_runtime::{
    ambiguous_constructor, arity_mismatch, missing_constructor, type_mismatch, unresolved_member,
    EvalError, MemberDescriptor, MemberInfo, ObjectRef, PhysicalCall, RuntimeType, Signature,
    Substitution, TypeDescriptor, TypeKind, Value,
};

use crate::bridge::MemberTarget;
use crate::interpreter::Interpreter;
use crate::session::Session;
use crate::types::TypeRelations;

impl Session {
    /// Create an instance of `ty`, resolving the constructor from `args`.
    pub(crate) fn activate(&self, ty: &RuntimeType, args: Vec<Value>) -> Result<ObjectRef, EvalError> {
        let descriptor = self.descriptor_of(ty)?;
        match self.resolve_constructor(&descriptor, ty, &args)? {
            Some(constructor) => self.activate_with(&constructor, ty, args),
            None => self.activate_implicit(ty, &descriptor),
        }
    }

    /// The single instance constructor of `ty` that accepts `args`.
    ///
    /// `None` means the type declares no constructors and `args` is empty,
    /// so the implicit default applies.
    fn resolve_constructor(
        &self,
        descriptor: &TypeDescriptor,
        ty: &RuntimeType,
        args: &[Value],
    ) -> Result<Option<Rc<MemberDescriptor>>, EvalError> {
        let relations = TypeRelations::new(self.descriptors());
        let subst = Substitution::of_type(ty.type_args());
        let mut declared = 0usize;
        let mut candidates: SmallVec<[Rc<MemberDescriptor>; 2]> = SmallVec::new();

        'members: for &symbol in &descriptor.members {
            let member = self.descriptors().member(symbol)?;
            let Some(constructor) = member.as_constructor() else {
                continue;
            };
            if constructor.is_static() {
                continue;
            }
            declared += 1;
            if constructor.arity() != args.len() {
                continue;
            }
            for (parameter, arg) in constructor.parameters.iter().zip(args) {
                let expected = RuntimeType::resolve(&parameter.ty, &subst)?;
                if !relations.accepts_value(arg, &expected)? {
                    continue 'members;
                }
            }
            candidates.push(Rc::clone(&member));
        }

        match candidates.len() {
            0 if declared == 0 && args.is_empty() => Ok(None),
            0 => Err(missing_constructor(&descriptor.name, args.len())),
            1 => Ok(candidates.pop()),
            n => Err(ambiguous_constructor(&descriptor.name, n)),
        }
    }

    /// Create an instance of `ty` through `constructor`.
    pub(crate) fn activate_with(
        &self,
        constructor: &MemberDescriptor,
        ty: &RuntimeType,
        args: Vec<Value>,
    ) -> Result<ObjectRef, EvalError> {
        let Some(ctor) = constructor.as_constructor() else {
            return Err(type_mismatch("constructor", constructor.kind_name()));
        };
        if ctor.arity() != args.len() {
            return Err(arity_mismatch(ctor.name(), ctor.arity(), args.len()));
        }
        let descriptor = self.descriptor_of(ty)?;
        let symbol = ctor.symbol();

        match &*self.target(symbol)? {
            MemberTarget::Physical(handle) if !descriptor.is_symbolic() => {
                tracing::debug!(ty = %ty, "physical construction");
                match handle.invoke(PhysicalCall {
                    receiver: None,
                    args: &args,
                    type_args: &[],
                    containing: ty,
                })? {
                    Value::Object(instance) => Ok(instance),
                    other => Err(type_mismatch(&ty.to_string(), &other.type_name())),
                }
            }
            MemberTarget::Interpreted(tree) => {
                let chain = self.constructor_chain(symbol, ty, args.clone())?;
                let instance = self.manufacture(ty, &chain.physical)?;
                self.bind(&instance, ty)?;
                tracing::debug!(ty = %ty, "running constructor body");
                self.interpreter_for(tree, symbol, ty, Vec::new(), Some(&instance), args)?
                    .with_prepared_initializers(chain.interpreted)
                    .run()?;
                Ok(instance)
            }
            MemberTarget::Empty => self.activate_implicit(ty, &descriptor),
            _ => Err(unresolved_member(
                ctor.name(),
                &ty.to_string(),
                "constructor cannot be activated",
            )),
        }
    }

    /// Construct and bind with no constructor body. Anonymous types get
    /// their property names declared in the instance frame.
    fn activate_implicit(
        &self,
        ty: &RuntimeType,
        descriptor: &TypeDescriptor,
    ) -> Result<ObjectRef, EvalError> {
        let instance = self.manufacture(ty, &[])?;
        let frame = self.bind(&instance, ty)?;
        if descriptor.kind == TypeKind::Anonymous {
            for &symbol in &descriptor.members {
                let member = self.descriptors().member(symbol)?;
                if let Some(property) = member.as_property() {
                    let name = self.interner().intern(property.name());
                    frame
                        .declare(name)
                        .map_err(|e| e.into_eval(property.name()))?;
                }
            }
        }
        Ok(instance)
    }

    /// Physically construct an unbound backing instance of `ty`.
    fn manufacture(&self, ty: &RuntimeType, physical_args: &[Value]) -> Result<ObjectRef, EvalError> {
        let backing = self.synthesizer().synthesize(ty)?;
        backing.construct(physical_args)
    }

    /// Evaluate the constructor initializer chain of `constructor`.
    ///
    /// Follows `: base(...)`/`: this(...)` through interpreted constructors
    /// until it reaches a physical one. Every initializer's arguments are
    /// evaluated exactly once here; the bodies reuse them when they run.
    /// Nothing is evaluated when the chain ends at an implicit constructor.
    pub(crate) fn constructor_chain(
        &self,
        constructor: SymbolId,
        ty: &RuntimeType,
        args: Vec<Value>,
    ) -> Result<ConstructorChain, EvalError> {
        let mut chain = ConstructorChain::default();
        let (mut constructor, mut ty, mut args) = (constructor, ty.clone(), args);
        loop {
            let target = self.target(constructor)?;
            let MemberTarget::Interpreted(tree) = &*target else {
                return Ok(chain);
            };
            let Some(Operation::ConstructorInitializer {
                constructor: next,
                args: next_args,
            }) = initializer_of(tree)
            else {
                return Ok(chain);
            };

            let member = self.descriptors().member(constructor)?;
            let Some(ctor) = member.as_constructor() else {
                return Err(type_mismatch("constructor", member.kind_name()));
            };
            if ctor.arity() != args.len() {
                return Err(arity_mismatch(ctor.name(), ctor.arity(), args.len()));
            }
            let class_frame = self.class_frame(&ty);
            let method_frame = self.frames().method_frame(&class_frame, constructor, Vec::new());
            for (parameter, arg) in ctor.parameters.iter().zip(args) {
                method_frame
                    .define(parameter.name, arg)
                    .map_err(|e| e.into_eval(self.name(parameter.name)))?;
            }

            let next_use = tree.arena.member(next);
            let next_type = RuntimeType::resolve(&next_use.containing, &method_frame)?;
            let next_target = self.target(next_use.symbol)?;
            if !matches!(
                *next_target,
                MemberTarget::Physical(_) | MemberTarget::Interpreted(_)
            ) {
                return Ok(chain);
            }
            let mut interpreter = Interpreter::new(self, tree.clone(), method_frame, None);
            let values = interpreter.eval_list(next_args)?;
            if matches!(*next_target, MemberTarget::Physical(_)) {
                chain.physical = values;
                return Ok(chain);
            }
            chain.interpreted.push(values.clone());
            constructor = next_use.symbol;
            ty = next_type;
            args = values;
        }
    }

    fn descriptor_of(&self, ty: &RuntimeType) -> Result<Rc<TypeDescriptor>, EvalError> {
        match ty.def() {
            Some(def) => self.descriptors().type_descriptor(def),
            None => Err(type_mismatch("named type", &ty.to_string())),
        }
    }
}

/// Constructor initializer arguments, evaluated before the backing instance
/// exists.
#[derive(Default)]
pub(crate) struct ConstructorChain {
    /// Arguments for the physical base constructor the chain ends at.
    pub physical: Vec<Value>,
    /// Arguments of each initializer that targets an interpreted
    /// constructor, outermost body first.
    pub interpreted: Vec<Vec<Value>>,
}

/// The constructor initializer at the start of a constructor body.
fn initializer_of(tree: &umbra_ir::SharedTree) -> Option<Operation> {
    let mut id = tree.root;
    if let Operation::Block(statements) = tree.arena.get(id) {
        id = *tree.arena.list(*statements).first()?;
    }
    if let Operation::ExpressionStatement(inner) = tree.arena.get(id) {
        id = *inner;
    }
    match tree.arena.get(id) {
        op @ Operation::ConstructorInitializer { .. } => Some(*op),
        _ => None,
    }
}
