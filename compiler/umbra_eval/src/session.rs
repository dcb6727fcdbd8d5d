//! The interpreter session: the public entry points and the per-session
//! caches behind them.
//!
//! A session owns the frame provider, the bridge decisions, static storage,
//! the operation registry and member tables. Everything it caches lives as
//! long as the session; nothing is evicted.
//!
//! Sessions are single-threaded (`Rc`-based). Cancellation is the only thing
//! that crosses threads, through [`CancellationToken`].

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use umbra_ir::{Name, SharedInterner, SymbolId, TypeDefId};
use umbra_runtime::{
    host_failure, missing_context, no_current_instance, unresolved_member, CancellationToken,
    DescriptorLayer, EvalError, EvalResult, InterpreterLink, MemberDescriptor, MemberInfo,
    MemberOrigin, ObjectRef, OperationTreeProvider, RuntimeType, Substitution, TypeSynthesizer,
    Value,
};

use crate::bridge::{MemberTarget, ResolvedMember, RuntimeAdapter};
use crate::frame::FrameRef;
use crate::frame_provider::FrameProvider;
use crate::registry::{MemberTable, OperationRegistry, RegistryEntry};

pub(crate) struct SessionInner {
    interner: SharedInterner,
    descriptors: Rc<dyn DescriptorLayer>,
    synthesizer: Rc<dyn TypeSynthesizer>,
    trees: Rc<dyn OperationTreeProvider>,
    frames: FrameProvider,
    adapter: RuntimeAdapter,
    registry: OperationRegistry,
    tables: RefCell<FxHashMap<RuntimeType, Rc<MemberTable>>>,
}

/// Interpreter session.
///
/// Cheap to clone; clones share every cache.
#[derive(Clone)]
pub struct Session(Rc<SessionInner>);

/// Builder for [`Session`].
///
/// # Example
///
/// ```text
/// let session = Session::builder()
///     .interner(interner)
///     .descriptors(host.clone())
///     .synthesizer(host.clone())
///     .trees(host)
///     .build()?;
/// ```
#[derive(Default)]
pub struct SessionBuilder {
    interner: Option<SharedInterner>,
    descriptors: Option<Rc<dyn DescriptorLayer>>,
    synthesizer: Option<Rc<dyn TypeSynthesizer>>,
    trees: Option<Rc<dyn OperationTreeProvider>>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The interner the operation trees were built with. A fresh one is
    /// created if none is given.
    #[must_use]
    pub fn interner(mut self, interner: SharedInterner) -> Self {
        self.interner = Some(interner);
        self
    }

    #[must_use]
    pub fn descriptors(mut self, descriptors: Rc<dyn DescriptorLayer>) -> Self {
        self.descriptors = Some(descriptors);
        self
    }

    #[must_use]
    pub fn synthesizer(mut self, synthesizer: Rc<dyn TypeSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    #[must_use]
    pub fn trees(mut self, trees: Rc<dyn OperationTreeProvider>) -> Self {
        self.trees = Some(trees);
        self
    }

    pub fn build(self) -> Result<Session, EvalError> {
        let descriptors = self
            .descriptors
            .ok_or_else(|| host_failure("session requires a descriptor layer"))?;
        let synthesizer = self
            .synthesizer
            .ok_or_else(|| host_failure("session requires a type synthesizer"))?;
        let trees = self
            .trees
            .ok_or_else(|| host_failure("session requires an operation-tree provider"))?;
        Ok(Session(Rc::new(SessionInner {
            interner: self.interner.unwrap_or_default(),
            descriptors,
            synthesizer,
            trees,
            frames: FrameProvider::new(),
            adapter: RuntimeAdapter::default(),
            registry: OperationRegistry::new(),
            tables: RefCell::new(FxHashMap::default()),
        })))
    }
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Create an instance of `ty`, choosing the constructor from `args`.
    #[tracing::instrument(level = "debug", skip_all, fields(ty = %ty))]
    pub fn create_instance(
        &self,
        ty: &RuntimeType,
        args: Vec<Value>,
        cancel: &CancellationToken,
    ) -> Result<ObjectRef, EvalError> {
        cancel.check()?;
        self.activate(ty, args)
    }

    /// Create an instance of `ty` through a specific constructor.
    #[tracing::instrument(level = "debug", skip_all, fields(ty = %ty, ?constructor))]
    pub fn create_instance_with(
        &self,
        constructor: SymbolId,
        ty: &RuntimeType,
        args: Vec<Value>,
        cancel: &CancellationToken,
    ) -> Result<ObjectRef, EvalError> {
        cancel.check()?;
        let member = self.descriptors().member(constructor)?;
        self.activate_with(&member, ty, args)
    }

    /// Interpret `member` in the context of `frame`.
    ///
    /// An instance frame supplies the receiver; a class frame runs the
    /// member statically. The declaring type is the frame's class type.
    pub fn interpret(
        &self,
        member: SymbolId,
        frame: &FrameRef,
        args: Vec<Value>,
        cancel: &CancellationToken,
    ) -> EvalResult {
        self.interpret_generic(member, frame, Vec::new(), args, cancel)
    }

    /// [`Session::interpret`] for a generic method, with its method-level
    /// type arguments already closed by the caller.
    #[tracing::instrument(level = "debug", skip_all, fields(?member))]
    pub fn interpret_generic(
        &self,
        member: SymbolId,
        frame: &FrameRef,
        type_args: Vec<RuntimeType>,
        args: Vec<Value>,
        cancel: &CancellationToken,
    ) -> EvalResult {
        cancel.check()?;
        let containing = frame
            .class_type()
            .ok_or_else(|| missing_context("class frame"))?;
        let receiver = frame.current_instance().map(Value::Object);
        let member = ResolvedMember {
            symbol: member,
            containing,
            type_args,
        };
        self.call_member(&member, receiver, args, false)
    }

    /// Run the body of `constructor` against the instance of `frame`.
    ///
    /// Used by physical constructors that delegate their body back to the
    /// interpreter after the instance has been bound.
    #[tracing::instrument(level = "debug", skip_all, fields(?constructor))]
    pub fn interpret_constructor(
        &self,
        constructor: SymbolId,
        frame: &FrameRef,
        args: Vec<Value>,
        cancel: &CancellationToken,
    ) -> Result<(), EvalError> {
        cancel.check()?;
        let instance = frame.current_instance().ok_or_else(no_current_instance)?;
        let containing = frame
            .class_type()
            .ok_or_else(|| missing_context("class frame"))?;
        match &*self.target(constructor)? {
            MemberTarget::Interpreted(tree) => self
                .run_interpreted(tree, constructor, &containing, Vec::new(), Some(&instance), args)
                .map(|_| ()),
            MemberTarget::Empty => Ok(()),
            _ => Err(unresolved_member(
                &self.member_name(constructor),
                &containing.to_string(),
                "constructor has no interpretable body",
            )),
        }
    }

    /// Arguments for the backing type's physical base constructor, evaluated
    /// from the constructor initializer of `constructor`.
    pub fn physical_constructor_arguments(
        &self,
        constructor: SymbolId,
        ty: &RuntimeType,
        args: Vec<Value>,
    ) -> Result<Vec<Value>, EvalError> {
        Ok(self.constructor_chain(constructor, ty, args)?.physical)
    }

    /// The instance frame bound to `instance`, if it is a proxy of this
    /// session.
    pub fn instance_frame(&self, instance: &ObjectRef) -> Option<FrameRef> {
        self.binding_of(instance)
            .map(|binding| binding.instance_frame.clone())
    }

    pub fn class_frame(&self, ty: &RuntimeType) -> FrameRef {
        self.0.frames.class_frame(ty)
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.0.registry
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.0.interner
    }

    /// Members of `ty` (and its symbolic bases) that carry a source body,
    /// each mapped to the most-derived registered operation.
    pub fn member_table(&self, ty: &RuntimeType) -> Result<Rc<MemberTable>, EvalError> {
        if let Some(table) = self.0.tables.borrow().get(ty) {
            return Ok(Rc::clone(table));
        }

        let mut table = MemberTable::new(ty.clone());
        let mut level = Some(ty.clone());
        let mut most_derived = true;
        while let Some(current) = level {
            let Some(def) = current.def() else { break };
            let descriptor = self.descriptors().type_descriptor(def)?;
            if !descriptor.is_symbolic() {
                break;
            }
            for &symbol in &descriptor.members {
                let member = self.descriptors().member(symbol)?;
                if member.origin() != MemberOrigin::Source {
                    continue;
                }
                match &*member {
                    MemberDescriptor::Method(method) => {
                        self.register_operation(&mut table, &current, symbol, method.overrides);
                    }
                    MemberDescriptor::Constructor(_) if most_derived => {
                        self.register_operation(&mut table, &current, symbol, None);
                    }
                    MemberDescriptor::Property(property) => {
                        for accessor in [property.getter, property.setter].into_iter().flatten() {
                            let accessor_member = self.descriptors().member(accessor)?;
                            let overrides = accessor_member.as_method().and_then(|m| m.overrides);
                            self.register_operation(&mut table, &current, accessor, overrides);
                        }
                    }
                    MemberDescriptor::Constructor(_) | MemberDescriptor::Field(_) => {}
                }
            }
            most_derived = false;
            level = match &descriptor.base {
                Some(base) => Some(RuntimeType::resolve(
                    base,
                    &Substitution::of_type(current.type_args()),
                )?),
                None => None,
            };
        }

        tracing::debug!(ty = %ty, members = table.len(), "computed member table");
        let table = Rc::new(table);
        self.0
            .tables
            .borrow_mut()
            .insert(ty.clone(), Rc::clone(&table));
        Ok(table)
    }

    fn register_operation(
        &self,
        table: &mut MemberTable,
        context: &RuntimeType,
        symbol: SymbolId,
        overrides: Option<SymbolId>,
    ) {
        // Already claimed by a more-derived override: pass the claim down the
        // override chain instead of registering the base body.
        if let Some(existing) = table.lookup(symbol) {
            if let Some(base) = overrides {
                table.insert_if_absent(base, existing);
            }
            return;
        }
        let Some(tree) = self.trees().operation_tree(symbol) else {
            return;
        };
        let id = self.0.registry.register(context.clone(), tree, symbol);
        table.insert_if_absent(symbol, id);
        if let Some(base) = overrides {
            table.insert_if_absent(base, id);
        }
    }

    /// Most-derived registered body for `symbol` on a proxy of this session.
    pub(crate) fn override_of(
        &self,
        instance: &ObjectRef,
        symbol: SymbolId,
    ) -> Option<Rc<RegistryEntry>> {
        let binding = self.binding_of(instance)?;
        let id = binding.table.lookup(symbol)?;
        self.0.registry.get(id)
    }

    pub(crate) fn binding_of<'o>(&self, instance: &'o ObjectRef) -> Option<&'o ProxyBinding> {
        instance
            .link()?
            .as_any()
            .downcast_ref::<ProxyBinding>()
            .filter(|binding| binding.belongs_to(self))
    }

    /// Bind a freshly constructed backing instance to this session.
    pub(crate) fn bind(&self, instance: &ObjectRef, ty: &RuntimeType) -> Result<FrameRef, EvalError> {
        let class_frame = self.class_frame(ty);
        let instance_frame = self.0.frames.instance_frame(&class_frame, instance);
        let table = self.member_table(ty)?;
        instance.bind(Rc::new(ProxyBinding {
            session: Rc::downgrade(&self.0),
            instance_frame: instance_frame.clone(),
            table,
        }))?;
        tracing::trace!(ty = %ty, "bound proxy instance");
        Ok(instance_frame)
    }

    pub(crate) fn descriptors(&self) -> &dyn DescriptorLayer {
        &*self.0.descriptors
    }

    pub(crate) fn synthesizer(&self) -> &dyn TypeSynthesizer {
        &*self.0.synthesizer
    }

    pub(crate) fn trees(&self) -> &dyn OperationTreeProvider {
        &*self.0.trees
    }

    pub(crate) fn frames(&self) -> &FrameProvider {
        &self.0.frames
    }

    pub(crate) fn adapter(&self) -> &RuntimeAdapter {
        &self.0.adapter
    }

    pub(crate) fn name(&self, name: Name) -> &'static str {
        self.0.interner.lookup(name)
    }

    /// Display name of a member for diagnostics.
    pub(crate) fn member_name(&self, symbol: SymbolId) -> String {
        match self.descriptors().member(symbol) {
            Ok(member) => member.name().to_owned(),
            Err(_) => format!("{symbol:?}"),
        }
    }

    /// Display name of a type definition for diagnostics.
    pub(crate) fn type_name(&self, def: TypeDefId) -> String {
        match self.descriptors().type_descriptor(def) {
            Ok(descriptor) => descriptor.name.clone(),
            Err(_) => format!("{def:?}"),
        }
    }
}

/// The link from a backing instance to the session that interprets it.
///
/// Holds the session weakly; a proxy that outlives its session fails its
/// callbacks instead of keeping the session alive.
pub(crate) struct ProxyBinding {
    session: Weak<SessionInner>,
    pub(crate) instance_frame: FrameRef,
    table: Rc<MemberTable>,
}

impl ProxyBinding {
    fn belongs_to(&self, session: &Session) -> bool {
        std::ptr::eq(self.session.as_ptr(), Rc::as_ptr(&session.0))
    }
}

impl InterpreterLink for ProxyBinding {
    fn dispatch(
        &self,
        receiver: &ObjectRef,
        member: SymbolId,
        type_args: &[RuntimeType],
        args: Vec<Value>,
    ) -> EvalResult {
        let session = Session(
            self.session
                .upgrade()
                .ok_or_else(|| host_failure("proxy outlived its interpreter session"))?,
        );
        if let Some(id) = self.table.lookup(member) {
            if let Some(entry) = session.0.registry.get(id) {
                return session.run_interpreted(
                    &entry.tree,
                    entry.symbol,
                    &entry.context,
                    type_args.to_vec(),
                    Some(receiver),
                    args,
                );
            }
        }
        let member = ResolvedMember {
            symbol: member,
            containing: receiver.runtime_type().clone(),
            type_args: type_args.to_vec(),
        };
        session.call_member(
            &member,
            Some(Value::Object(receiver.clone())),
            args,
            false,
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
