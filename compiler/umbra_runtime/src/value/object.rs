//! Object instances.
//!
//! Every instance of an interpreted type is a proxy: a host-created object
//! whose members forward to the interpreter through an [`InterpreterLink`].
//! The link is attached exactly once, after construction and before the
//! constructor body runs.

use std::any::Any;
use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use umbra_ir::SymbolId;

use crate::errors::{proxy_already_bound, proxy_not_bound, EvalResult};
use crate::runtime_type::RuntimeType;
use crate::value::Value;

/// Back-reference from a proxy instance to the interpreter state that
/// serves its members.
pub trait InterpreterLink {
    /// Invoke `member` on `receiver` with already-evaluated arguments and
    /// the method's own type arguments (empty for non-generic methods).
    fn dispatch(
        &self,
        receiver: &ObjectRef,
        member: SymbolId,
        type_args: &[RuntimeType],
        args: Vec<Value>,
    ) -> EvalResult;

    fn as_any(&self) -> &dyn Any;
}

struct Instance {
    ty: RuntimeType,
    /// Field storage, keyed by field symbol. Absent means never assigned.
    slots: RefCell<FxHashMap<SymbolId, Value>>,
    link: OnceCell<Rc<dyn InterpreterLink>>,
}

/// Shared handle to an object instance. Equality is identity.
#[derive(Clone)]
pub struct ObjectRef(Rc<Instance>);

impl ObjectRef {
    pub fn new(ty: RuntimeType) -> Self {
        ObjectRef(Rc::new(Instance {
            ty,
            slots: RefCell::new(FxHashMap::default()),
            link: OnceCell::new(),
        }))
    }

    pub fn runtime_type(&self) -> &RuntimeType {
        &self.0.ty
    }

    pub fn load_slot(&self, field: SymbolId) -> Option<Value> {
        self.0.slots.borrow().get(&field).cloned()
    }

    pub fn store_slot(&self, field: SymbolId, value: Value) {
        self.0.slots.borrow_mut().insert(field, value);
    }

    /// Attach the interpreter link. Fails if one is already attached.
    pub fn bind(&self, link: Rc<dyn InterpreterLink>) -> Result<(), crate::EvalError> {
        self.0
            .link
            .set(link)
            .map_err(|_| proxy_already_bound(&self.0.ty.to_string()))
    }

    pub fn link(&self) -> Option<&Rc<dyn InterpreterLink>> {
        self.0.link.get()
    }

    pub fn is_bound(&self) -> bool {
        self.0.link.get().is_some()
    }

    /// Forward a member call through the attached link.
    pub fn dispatch(&self, member: SymbolId, args: Vec<Value>) -> EvalResult {
        self.dispatch_generic(member, &[], args)
    }

    /// Forward a call of a generic method, closed over `type_args`.
    pub fn dispatch_generic(
        &self,
        member: SymbolId,
        type_args: &[RuntimeType],
        args: Vec<Value>,
    ) -> EvalResult {
        let Some(link) = self.0.link.get().cloned() else {
            return Err(proxy_not_bound(&self.0.ty.to_string()));
        };
        link.dispatch(self, member, type_args, args)
    }

    #[inline]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakObject {
        WeakObject(Rc::downgrade(&self.0))
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({}, bound: {})", self.0.ty, self.is_bound())
    }
}

/// Non-owning instance handle.
///
/// Instance frames hold their instance weakly: the instance owns its link,
/// the link owns the frame.
#[derive(Clone)]
pub struct WeakObject(Weak<Instance>);

impl WeakObject {
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.0.upgrade().map(ObjectRef)
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(obj) => write!(f, "WeakObject({})", obj.runtime_type()),
            None => write!(f, "WeakObject(<dropped>)"),
        }
    }
}
