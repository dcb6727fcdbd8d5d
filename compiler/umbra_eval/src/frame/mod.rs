//! The frame chain.
//!
//! Frames are parent-linked binding containers. Lookup, assignment and
//! declaration walk outward; a name may be bound at most once along any
//! chain, so a nested scope can never shadow an outer binding.
//!
//! The four kinds differ only in two respects: what "current instance"
//! resolves to, and which generic-parameter level they answer. Class frames
//! answer type-level parameters, method frames answer method-level ones, and
//! every other kind delegates to its parent unchanged.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use umbra_ir::{GenericLevel, GenericParam, Name, SymbolId};
use umbra_runtime::{
    redeclaration, unassigned_use, unbound_generic_parameter, undefined_name, EvalError,
    GenericResolver, ObjectRef, RuntimeType, Value, WeakObject,
};

/// A binding slot.
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    /// Declared but not yet assigned. Distinct from an assigned null.
    Unassigned,
    Value(Value),
}

/// Failure of a frame-chain operation.
///
/// Frames do not know names as text; callers turn this into an
/// [`EvalError`] with [`FrameError::into_eval`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameError {
    /// Not declared in any frame of the chain.
    Undefined,
    /// Already declared somewhere in the chain.
    Redeclared,
    /// Declared but never assigned.
    Unassigned,
}

impl FrameError {
    #[cold]
    pub fn into_eval(self, name: &str) -> EvalError {
        match self {
            FrameError::Undefined => undefined_name(name),
            FrameError::Redeclared => redeclaration(name),
            FrameError::Unassigned => unassigned_use(name),
        }
    }
}

#[derive(Clone, Debug)]
pub enum FrameKind {
    /// Root of a chain, one per closed type.
    Class { ty: RuntimeType },
    /// Wraps one live instance. Held weakly; the instance owns its frame.
    Instance { instance: WeakObject },
    /// One call of one member.
    Method {
        method: SymbolId,
        type_args: Vec<RuntimeType>,
    },
    /// A lexical block.
    Scope,
}

impl FrameKind {
    pub const fn name(&self) -> &'static str {
        match self {
            FrameKind::Class { .. } => "class",
            FrameKind::Instance { .. } => "instance",
            FrameKind::Method { .. } => "method",
            FrameKind::Scope => "scope",
        }
    }
}

pub struct Frame {
    kind: FrameKind,
    bindings: FxHashMap<Name, Binding>,
    parent: Option<FrameRef>,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("kind", &self.kind)
            .field("bindings", &self.bindings.len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

/// Shared handle to a frame.
///
/// Only class frames are created without a parent; the constructors enforce
/// it.
#[derive(Clone)]
#[repr(transparent)]
pub struct FrameRef(Rc<RefCell<Frame>>);

impl FrameRef {
    fn with(kind: FrameKind, parent: Option<FrameRef>) -> Self {
        FrameRef(Rc::new(RefCell::new(Frame {
            kind,
            bindings: FxHashMap::default(),
            parent,
        })))
    }

    pub fn class(ty: RuntimeType) -> Self {
        Self::with(FrameKind::Class { ty }, None)
    }

    pub fn instance(parent: &FrameRef, instance: &ObjectRef) -> Self {
        Self::with(
            FrameKind::Instance {
                instance: instance.downgrade(),
            },
            Some(parent.clone()),
        )
    }

    pub fn method(parent: &FrameRef, method: SymbolId, type_args: Vec<RuntimeType>) -> Self {
        Self::with(FrameKind::Method { method, type_args }, Some(parent.clone()))
    }

    pub fn scope(parent: &FrameRef) -> Self {
        Self::with(FrameKind::Scope, Some(parent.clone()))
    }

    pub fn kind(&self) -> FrameKind {
        self.0.borrow().kind.clone()
    }

    pub fn parent(&self) -> Option<FrameRef> {
        self.0.borrow().parent.clone()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &FrameRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Run `f` on the binding of `name` in the nearest frame that has one.
    fn find<R>(&self, name: Name, f: impl FnOnce(&mut Binding) -> R) -> Option<R> {
        let mut current = self.clone();
        loop {
            let next = {
                let mut frame = current.0.borrow_mut();
                if let Some(binding) = frame.bindings.get_mut(&name) {
                    return Some(f(binding));
                }
                frame.parent.clone()
            };
            current = next?;
        }
    }

    /// True if `name` is bound anywhere in the chain.
    pub fn is_bound(&self, name: Name) -> bool {
        self.find(name, |_| ()).is_some()
    }

    /// Bind `name` in this frame without a value.
    pub fn declare(&self, name: Name) -> Result<(), FrameError> {
        self.insert(name, Binding::Unassigned)
    }

    /// Bind `name` in this frame to `value`.
    pub fn define(&self, name: Name, value: Value) -> Result<(), FrameError> {
        self.insert(name, Binding::Value(value))
    }

    fn insert(&self, name: Name, binding: Binding) -> Result<(), FrameError> {
        if self.is_bound(name) {
            return Err(FrameError::Redeclared);
        }
        self.0.borrow_mut().bindings.insert(name, binding);
        Ok(())
    }

    /// Assign where bound, otherwise define here.
    pub fn define_or_assign(&self, name: Name, value: Value) {
        if let Err(FrameError::Undefined) = self.assign(name, value.clone()) {
            self.0
                .borrow_mut()
                .bindings
                .insert(name, Binding::Value(value));
        }
    }

    /// Overwrite the nearest binding of `name`.
    pub fn assign(&self, name: Name, value: Value) -> Result<(), FrameError> {
        self.find(name, |binding| *binding = Binding::Value(value))
            .ok_or(FrameError::Undefined)
    }

    /// Read the nearest binding of `name`.
    pub fn get(&self, name: Name) -> Result<Value, FrameError> {
        match self.find(name, |binding| binding.clone()) {
            None => Err(FrameError::Undefined),
            Some(Binding::Unassigned) => Err(FrameError::Unassigned),
            Some(Binding::Value(value)) => Ok(value),
        }
    }

    /// The instance of the nearest instance frame, if it is still alive.
    pub fn current_instance(&self) -> Option<ObjectRef> {
        let mut current = self.clone();
        loop {
            let next = {
                let frame = current.0.borrow();
                match &frame.kind {
                    FrameKind::Instance { instance } => return instance.upgrade(),
                    FrameKind::Class { .. } => return None,
                    FrameKind::Method { .. } | FrameKind::Scope => frame.parent.clone(),
                }
            };
            current = next?;
        }
    }

    /// The class frame at the root of this chain.
    pub fn class_frame(&self) -> FrameRef {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// The closed type of the root class frame.
    pub fn class_type(&self) -> Option<RuntimeType> {
        match self.class_frame().kind() {
            FrameKind::Class { ty } => Some(ty),
            _ => None,
        }
    }
}

impl GenericResolver for FrameRef {
    fn generic_argument(&self, param: GenericParam) -> Result<RuntimeType, EvalError> {
        let ordinal = param.ordinal as usize;
        let mut current = self.clone();
        loop {
            let next = {
                let frame = current.0.borrow();
                let answered = match (&frame.kind, param.level) {
                    (FrameKind::Class { ty }, GenericLevel::Type) => Some(ty.type_args()),
                    (FrameKind::Method { type_args, .. }, GenericLevel::Method) => {
                        Some(type_args.as_slice())
                    }
                    _ => None,
                };
                if let Some(args) = answered {
                    return args
                        .get(ordinal)
                        .cloned()
                        .ok_or_else(|| unbound_generic_parameter(&param.to_string()));
                }
                frame.parent.clone()
            };
            match next {
                Some(parent) => current = parent,
                None => return Err(unbound_generic_parameter(&param.to_string())),
            }
        }
    }
}

impl fmt::Debug for FrameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FrameRef").field(&*self.0.borrow()).finish()
    }
}
