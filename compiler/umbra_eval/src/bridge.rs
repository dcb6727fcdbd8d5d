//! The runtime adapter bridge.
//!
//! For every member the bridge decides once, on first use, how the member is
//! reached: by interpreting its operation tree, by calling a loaded
//! implementation, or by reading and writing storage. The decision is cached
//! per member symbol for the session's lifetime and never revisited.
//!
//! The interpreter never sees the decision; it only "calls the member". An
//! interpreted member re-enters the interpreter with a fresh method frame,
//! which is how interpretation and physical calls recurse into each other.
//!
//! Every type the bridge needs is closed against the *caller's* frame
//! before it gets here ([`ResolvedMember`]), so generic code runs without
//! the bridge knowing anything about generic definitions.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use umbra_ir::{Name, SharedTree, SymbolId};
use umbra_runtime::{
    arity_mismatch, null_reference, proxy_not_bound, type_mismatch, unresolved_member,
    EvalError, EvalResult, MemberDescriptor, MemberInfo, MemberOrigin, ObjectRef, Parameter,
    PhysicalCall, PhysicalHandle, RuntimeType, Substitution, TypeKind, Value,
};

use crate::interpreter::Interpreter;
use crate::session::Session;

/// How a member is reached.
pub(crate) enum MemberTarget {
    /// Source-backed body, interpreted on every call.
    Interpreted(SharedTree),
    /// Loaded implementation.
    Physical(Rc<dyn PhysicalHandle>),
    /// Instance field or auto-property, stored in the proxy's slots.
    Slot,
    /// Static field or auto-property, stored in session static storage.
    StaticSlot,
    /// Property of a structurally-anonymous type, stored in the instance
    /// frame under the property name.
    FrameSlot(Name),
    /// Property with accessor methods.
    Accessors {
        getter: Option<SymbolId>,
        setter: Option<SymbolId>,
    },
    /// Source member without a body; reachable only through an override.
    Abstract,
    /// Implicit member with nothing to run.
    Empty,
}

impl MemberTarget {
    fn name(&self) -> &'static str {
        match self {
            MemberTarget::Interpreted(_) => "interpreted",
            MemberTarget::Physical(_) => "physical",
            MemberTarget::Slot => "slot",
            MemberTarget::StaticSlot => "static slot",
            MemberTarget::FrameSlot(_) => "frame slot",
            MemberTarget::Accessors { .. } => "accessors",
            MemberTarget::Abstract => "abstract",
            MemberTarget::Empty => "empty",
        }
    }
}

/// A member use with its containing type and method type arguments closed
/// against the caller's frame.
#[derive(Clone, Debug)]
pub(crate) struct ResolvedMember {
    pub symbol: SymbolId,
    pub containing: RuntimeType,
    pub type_args: Vec<RuntimeType>,
}

impl ResolvedMember {
    pub fn new(symbol: SymbolId, containing: RuntimeType) -> Self {
        ResolvedMember {
            symbol,
            containing,
            type_args: Vec::new(),
        }
    }
}

/// Per-session caches of the bridge.
#[derive(Default)]
pub(crate) struct RuntimeAdapter {
    targets: RefCell<FxHashMap<SymbolId, Rc<MemberTarget>>>,
    /// Static storage, per closed declaring type.
    statics: RefCell<FxHashMap<(RuntimeType, SymbolId), Value>>,
}

impl Session {
    /// The cached decision for `symbol`, made on first request.
    pub(crate) fn target(&self, symbol: SymbolId) -> Result<Rc<MemberTarget>, EvalError> {
        if let Some(target) = self.adapter().targets.borrow().get(&symbol) {
            return Ok(Rc::clone(target));
        }
        let target = Rc::new(self.decide(symbol)?);
        self.adapter()
            .targets
            .borrow_mut()
            .insert(symbol, Rc::clone(&target));
        Ok(target)
    }

    fn decide(&self, symbol: SymbolId) -> Result<MemberTarget, EvalError> {
        let member = self.descriptors().member(symbol)?;
        let target = if let Some(handle) = self.descriptors().physical_handle(symbol)? {
            MemberTarget::Physical(handle)
        } else if member.origin() == MemberOrigin::Loaded {
            return Err(unresolved_member(
                member.name(),
                &self.type_name(member.declaring_type()),
                "loaded member has no physical implementation",
            ));
        } else {
            match &*member {
                MemberDescriptor::Field(field) if field.is_static() => MemberTarget::StaticSlot,
                MemberDescriptor::Field(_) => MemberTarget::Slot,
                MemberDescriptor::Property(property) => {
                    let declaring = self
                        .descriptors()
                        .type_descriptor(property.declaring_type())?;
                    if declaring.kind == TypeKind::Anonymous {
                        MemberTarget::FrameSlot(self.interner().intern(property.name()))
                    } else if !property.is_auto() {
                        MemberTarget::Accessors {
                            getter: property.getter,
                            setter: property.setter,
                        }
                    } else if property.is_static() {
                        MemberTarget::StaticSlot
                    } else {
                        MemberTarget::Slot
                    }
                }
                MemberDescriptor::Method(_) | MemberDescriptor::Constructor(_) => {
                    match self.trees().operation_tree(symbol) {
                        Some(tree) => MemberTarget::Interpreted(tree),
                        None if member.origin() == MemberOrigin::Source
                            && member.as_method().is_some() =>
                        {
                            MemberTarget::Abstract
                        }
                        None => MemberTarget::Empty,
                    }
                }
            }
        };
        tracing::debug!(
            ?symbol,
            member = member.name(),
            target = target.name(),
            "bridge decision"
        );
        Ok(target)
    }

    /// Call a method, accessor or constructor body.
    ///
    /// With `is_virtual`, a proxy receiver's member table is consulted first
    /// so an override in a more-derived type wins.
    #[tracing::instrument(level = "trace", skip_all, fields(symbol = ?member.symbol))]
    pub(crate) fn call_member(
        &self,
        member: &ResolvedMember,
        receiver: Option<Value>,
        args: Vec<Value>,
        is_virtual: bool,
    ) -> EvalResult {
        let target = self.target(member.symbol)?;
        let is_virtual = is_virtual || matches!(*target, MemberTarget::Abstract);

        if is_virtual {
            if let Some(Value::Object(obj)) = &receiver {
                if let Some(entry) = self.override_of(obj, member.symbol) {
                    return self.run_interpreted(
                        &entry.tree,
                        entry.symbol,
                        &entry.context,
                        member.type_args.clone(),
                        Some(obj),
                        args,
                    );
                }
            }
        }

        match &*target {
            MemberTarget::Interpreted(tree) => {
                let obj = self.object_receiver(member, receiver.as_ref())?;
                self.run_interpreted(
                    tree,
                    member.symbol,
                    &member.containing,
                    member.type_args.clone(),
                    obj.as_ref(),
                    args,
                )
            }
            MemberTarget::Physical(handle) => {
                if matches!(receiver, Some(Value::Null)) {
                    return Err(null_reference(&self.member_name(member.symbol)));
                }
                handle.invoke(PhysicalCall {
                    receiver: receiver.as_ref(),
                    args: &args,
                    type_args: &member.type_args,
                    containing: &member.containing,
                })
            }
            MemberTarget::Empty => Ok(Value::Void),
            MemberTarget::Abstract => Err(unresolved_member(
                &self.member_name(member.symbol),
                &member.containing.to_string(),
                "member has no body and the receiver has no override",
            )),
            other => Err(unresolved_member(
                &self.member_name(member.symbol),
                &member.containing.to_string(),
                &format!("{} member is not invocable", other.name()),
            )),
        }
    }

    /// Read a field or property (indexers take `index` arguments).
    ///
    /// `is_virtual` applies to accessor properties, as for [`Session::call_member`].
    pub(crate) fn get_member(
        &self,
        member: &ResolvedMember,
        receiver: Option<Value>,
        index: Vec<Value>,
        is_virtual: bool,
    ) -> EvalResult {
        let target = self.target(member.symbol)?;
        match &*target {
            MemberTarget::Physical(handle) => {
                if matches!(receiver, Some(Value::Null)) {
                    return Err(null_reference(&self.member_name(member.symbol)));
                }
                if self.descriptors().member(member.symbol)?.as_field().is_some() {
                    handle.load(receiver.as_ref())
                } else {
                    handle.invoke(PhysicalCall {
                        receiver: receiver.as_ref(),
                        args: &index,
                        type_args: &[],
                        containing: &member.containing,
                    })
                }
            }
            MemberTarget::Slot => {
                let obj = self.require_object(member, receiver.as_ref())?;
                match obj.load_slot(member.symbol) {
                    Some(value) => Ok(value),
                    None => self.storage_default(member),
                }
            }
            MemberTarget::StaticSlot => {
                let key = (member.containing.clone(), member.symbol);
                if let Some(value) = self.adapter().statics.borrow().get(&key) {
                    return Ok(value.clone());
                }
                self.storage_default(member)
            }
            MemberTarget::FrameSlot(name) => {
                let obj = self.require_object(member, receiver.as_ref())?;
                let frame = self
                    .instance_frame(&obj)
                    .ok_or_else(|| proxy_not_bound(&obj.runtime_type().to_string()))?;
                frame
                    .get(*name)
                    .map_err(|e| e.into_eval(self.interner().lookup(*name)))
            }
            MemberTarget::Accessors {
                getter: Some(getter),
                ..
            } => self.call_member(
                &ResolvedMember::new(*getter, member.containing.clone()),
                receiver,
                index,
                is_virtual,
            ),
            other => Err(unresolved_member(
                &self.member_name(member.symbol),
                &member.containing.to_string(),
                &format!("{} member is not readable", other.name()),
            )),
        }
    }

    /// Write a field or property.
    pub(crate) fn set_member(
        &self,
        member: &ResolvedMember,
        receiver: Option<Value>,
        index: Vec<Value>,
        value: Value,
        is_virtual: bool,
    ) -> Result<(), EvalError> {
        let target = self.target(member.symbol)?;
        match &*target {
            MemberTarget::Physical(handle) => {
                if matches!(receiver, Some(Value::Null)) {
                    return Err(null_reference(&self.member_name(member.symbol)));
                }
                if self.descriptors().member(member.symbol)?.as_field().is_some() {
                    handle.store(receiver.as_ref(), value)
                } else {
                    let mut args = index;
                    args.push(value);
                    handle
                        .invoke(PhysicalCall {
                            receiver: receiver.as_ref(),
                            args: &args,
                            type_args: &[],
                            containing: &member.containing,
                        })
                        .map(|_| ())
                }
            }
            MemberTarget::Slot => {
                let obj = self.require_object(member, receiver.as_ref())?;
                obj.store_slot(member.symbol, value);
                Ok(())
            }
            MemberTarget::StaticSlot => {
                self.adapter()
                    .statics
                    .borrow_mut()
                    .insert((member.containing.clone(), member.symbol), value);
                Ok(())
            }
            MemberTarget::FrameSlot(name) => {
                let obj = self.require_object(member, receiver.as_ref())?;
                let frame = self
                    .instance_frame(&obj)
                    .ok_or_else(|| proxy_not_bound(&obj.runtime_type().to_string()))?;
                frame
                    .assign(*name, value)
                    .map_err(|e| e.into_eval(self.interner().lookup(*name)))
            }
            MemberTarget::Accessors {
                setter: Some(setter),
                ..
            } => {
                let mut args = index;
                args.push(value);
                self.call_member(
                    &ResolvedMember::new(*setter, member.containing.clone()),
                    receiver,
                    args,
                    is_virtual,
                )
                .map(|_| ())
            }
            other => Err(unresolved_member(
                &self.member_name(member.symbol),
                &member.containing.to_string(),
                &format!("{} member is not writable", other.name()),
            )),
        }
    }

    /// Interpret `tree` as the body of `symbol`, declared in `containing`.
    pub(crate) fn run_interpreted(
        &self,
        tree: &SharedTree,
        symbol: SymbolId,
        containing: &RuntimeType,
        type_args: Vec<RuntimeType>,
        receiver: Option<&ObjectRef>,
        args: Vec<Value>,
    ) -> EvalResult {
        self.interpreter_for(tree, symbol, containing, type_args, receiver, args)?
            .run()
    }

    /// An interpreter ready to run `tree` as the body of `symbol`.
    ///
    /// The method frame is parented at the class frame of `containing`; the
    /// receiver's instance frame is passed alongside it.
    pub(crate) fn interpreter_for(
        &self,
        tree: &SharedTree,
        symbol: SymbolId,
        containing: &RuntimeType,
        type_args: Vec<RuntimeType>,
        receiver: Option<&ObjectRef>,
        args: Vec<Value>,
    ) -> Result<Interpreter<'_>, EvalError> {
        let member = self.descriptors().member(symbol)?;
        let parameters: &[Parameter] = match &*member {
            MemberDescriptor::Method(m) => &m.parameters,
            MemberDescriptor::Constructor(c) => &c.parameters,
            MemberDescriptor::Property(p) => &p.parameters,
            MemberDescriptor::Field(_) => &[],
        };
        if parameters.len() != args.len() {
            return Err(arity_mismatch(member.name(), parameters.len(), args.len()));
        }

        let class_frame = self.class_frame(containing);
        let method_frame = self.frames().method_frame(&class_frame, symbol, type_args);
        for (parameter, arg) in parameters.iter().zip(args) {
            method_frame
                .define(parameter.name, arg)
                .map_err(|e| e.into_eval(self.interner().lookup(parameter.name)))?;
        }
        let instance = receiver.map(|obj| {
            self.instance_frame(obj)
                .unwrap_or_else(|| self.frames().instance_frame(&class_frame, obj))
        });

        Ok(Interpreter::new(self, tree.clone(), method_frame, instance))
    }

    fn object_receiver(
        &self,
        member: &ResolvedMember,
        receiver: Option<&Value>,
    ) -> Result<Option<ObjectRef>, EvalError> {
        match receiver {
            None => Ok(None),
            Some(Value::Object(obj)) => Ok(Some(obj.clone())),
            Some(Value::Null) => Err(null_reference(&self.member_name(member.symbol))),
            Some(other) => Err(type_mismatch(
                &member.containing.to_string(),
                &other.type_name(),
            )),
        }
    }

    fn require_object(
        &self,
        member: &ResolvedMember,
        receiver: Option<&Value>,
    ) -> Result<ObjectRef, EvalError> {
        self.object_receiver(member, receiver)?.ok_or_else(|| {
            null_reference(&self.member_name(member.symbol))
        })
    }

    /// Default value of a field or auto-property that was never written.
    fn storage_default(&self, member: &ResolvedMember) -> EvalResult {
        let descriptor = self.descriptors().member(member.symbol)?;
        let ty = match &*descriptor {
            MemberDescriptor::Field(f) => &f.ty,
            MemberDescriptor::Property(p) => &p.ty,
            MemberDescriptor::Method(_) | MemberDescriptor::Constructor(_) => {
                return Ok(Value::Void)
            }
        };
        let subst = Substitution::of_type(member.containing.type_args());
        Ok(RuntimeType::resolve(ty, &subst)?.default_value())
    }
}
