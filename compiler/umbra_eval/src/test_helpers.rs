//! In-memory host for tests.
//!
//! Implements the descriptor layer, the type synthesizer and the
//! operation-tree provider over plain maps. "Loaded" members are backed by
//! Rust closures.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use umbra_ir::{Name, SharedInterner, SharedTree, SymbolId, TreeBuilder, TypeDefId, TypeRef};
use umbra_runtime::{
    host_failure, type_creation_failed, CancellationToken, ConstructorDescriptor,
    DescriptorLayer, EvalError, EvalResult, FieldDescriptor, MemberDescriptor, MemberHeader,
    MemberOrigin, MethodDescriptor, ObjectRef, OperationTreeProvider, Parameter, PhysicalCall,
    PhysicalHandle, PropertyDescriptor, RuntimeType, SynthesizedType, TypeDescriptor, TypeKind,
    TypeOrigin, TypeSynthesizer, Value,
};

use crate::Session;

/// The closed runtime type of a non-generic definition.
pub(crate) fn closed(def: TypeDefId) -> RuntimeType {
    RuntimeType::named(def, Vec::new())
}

/// Physical handle backed by a closure.
pub(crate) struct NativeHandle(Box<dyn Fn(PhysicalCall<'_>) -> EvalResult>);

impl PhysicalHandle for NativeHandle {
    fn invoke(&self, call: PhysicalCall<'_>) -> EvalResult {
        (self.0)(call)
    }
}

type ConstructionLog = Rc<RefCell<Vec<(RuntimeType, Vec<Value>)>>>;

struct Backing {
    ty: RuntimeType,
    log: ConstructionLog,
}

impl SynthesizedType for Backing {
    fn runtime_type(&self) -> &RuntimeType {
        &self.ty
    }

    fn construct(&self, args: &[Value]) -> Result<ObjectRef, EvalError> {
        self.log.borrow_mut().push((self.ty.clone(), args.to_vec()));
        Ok(ObjectRef::new(self.ty.clone()))
    }
}

pub(crate) struct TestHost {
    interner: SharedInterner,
    next_id: Cell<u32>,
    types: RefCell<FxHashMap<TypeDefId, TypeDescriptor>>,
    members: RefCell<FxHashMap<SymbolId, Rc<MemberDescriptor>>>,
    trees: RefCell<FxHashMap<SymbolId, SharedTree>>,
    handles: RefCell<FxHashMap<SymbolId, Rc<dyn PhysicalHandle>>>,
    rejected: RefCell<FxHashSet<TypeDefId>>,
    synthesized: RefCell<FxHashMap<RuntimeType, Rc<dyn SynthesizedType>>>,
    constructed: ConstructionLog,
}

impl TestHost {
    pub fn new() -> Rc<Self> {
        Rc::new(TestHost {
            interner: SharedInterner::new(),
            next_id: Cell::new(1),
            types: RefCell::new(FxHashMap::default()),
            members: RefCell::new(FxHashMap::default()),
            trees: RefCell::new(FxHashMap::default()),
            handles: RefCell::new(FxHashMap::default()),
            rejected: RefCell::new(FxHashSet::default()),
            synthesized: RefCell::new(FxHashMap::default()),
            constructed: Rc::new(RefCell::new(Vec::new())),
        })
    }

    pub fn session(self: &Rc<Self>) -> Session {
        Session::builder()
            .interner(self.interner.clone())
            .descriptors(self.clone())
            .synthesizer(self.clone())
            .trees(self.clone())
            .build()
            .unwrap()
    }

    pub fn interner(&self) -> SharedInterner {
        self.interner.clone()
    }

    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    pub fn builder(&self) -> TreeBuilder {
        TreeBuilder::new(self.interner.clone())
    }

    fn next(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    // Types

    pub fn declare_type(
        &self,
        name: &str,
        kind: TypeKind,
        origin: TypeOrigin,
        generic_arity: u32,
        base: Option<TypeRef>,
    ) -> TypeDefId {
        let def = TypeDefId::new(self.next());
        self.types.borrow_mut().insert(
            def,
            TypeDescriptor {
                def,
                name: name.to_string(),
                kind,
                origin,
                generic_arity,
                base,
                interfaces: Vec::new(),
                members: Vec::new(),
            },
        );
        def
    }

    pub fn class(&self, name: &str) -> TypeDefId {
        self.declare_type(name, TypeKind::Class, TypeOrigin::Symbolic, 0, None)
    }

    pub fn derived(&self, name: &str, base: TypeDefId) -> TypeDefId {
        self.declare_type(
            name,
            TypeKind::Class,
            TypeOrigin::Symbolic,
            0,
            Some(TypeRef::named(base)),
        )
    }

    pub fn generic_class(&self, name: &str, arity: u32) -> TypeDefId {
        self.declare_type(name, TypeKind::Class, TypeOrigin::Symbolic, arity, None)
    }

    pub fn loaded_class(&self, name: &str) -> TypeDefId {
        self.declare_type(name, TypeKind::Class, TypeOrigin::Loaded, 0, None)
    }

    pub fn implement(&self, ty: TypeDefId, interface: TypeRef) {
        self.types
            .borrow_mut()
            .get_mut(&ty)
            .unwrap()
            .interfaces
            .push(interface);
    }

    /// Anonymous type with implicit properties, in declaration order.
    pub fn anonymous(&self, properties: &[(&str, TypeRef)]) -> (TypeDefId, Vec<SymbolId>) {
        let def = self.declare_type(
            "<>f__AnonymousType",
            TypeKind::Anonymous,
            TypeOrigin::Symbolic,
            0,
            None,
        );
        let symbols = properties
            .iter()
            .map(|(name, ty)| {
                let header = self.header(def, name, false, MemberOrigin::Implicit);
                self.add(MemberDescriptor::Property(PropertyDescriptor {
                    header,
                    ty: ty.clone(),
                    parameters: Vec::new(),
                    getter: None,
                    setter: None,
                }))
            })
            .collect();
        (def, symbols)
    }

    pub fn reject(&self, def: TypeDefId) {
        self.rejected.borrow_mut().insert(def);
    }

    // Members

    fn header(&self, owner: TypeDefId, name: &str, is_static: bool, origin: MemberOrigin) -> MemberHeader {
        MemberHeader {
            symbol: SymbolId::new(self.next()),
            name: name.to_string(),
            declaring_type: owner,
            is_static,
            origin,
        }
    }

    fn parameters(&self, params: &[(&str, TypeRef)]) -> Vec<Parameter> {
        params
            .iter()
            .map(|(name, ty)| Parameter {
                name: self.name(name),
                ty: ty.clone(),
            })
            .collect()
    }

    fn add(&self, member: MemberDescriptor) -> SymbolId {
        use umbra_runtime::MemberInfo;

        let symbol = member.symbol();
        let owner = member.declaring_type();
        self.types
            .borrow_mut()
            .get_mut(&owner)
            .unwrap()
            .members
            .push(symbol);
        self.members.borrow_mut().insert(symbol, Rc::new(member));
        symbol
    }

    pub fn field(&self, owner: TypeDefId, name: &str, ty: TypeRef) -> SymbolId {
        let header = self.header(owner, name, false, MemberOrigin::Source);
        self.add(MemberDescriptor::Field(FieldDescriptor { header, ty }))
    }

    pub fn static_field(&self, owner: TypeDefId, name: &str, ty: TypeRef) -> SymbolId {
        let header = self.header(owner, name, true, MemberOrigin::Source);
        self.add(MemberDescriptor::Field(FieldDescriptor { header, ty }))
    }

    pub fn auto_property(&self, owner: TypeDefId, name: &str, ty: TypeRef) -> SymbolId {
        let header = self.header(owner, name, false, MemberOrigin::Source);
        self.add(MemberDescriptor::Property(PropertyDescriptor {
            header,
            ty,
            parameters: Vec::new(),
            getter: None,
            setter: None,
        }))
    }

    /// Property with a getter method (which must be given a body).
    pub fn computed_property(&self, owner: TypeDefId, name: &str, ty: TypeRef) -> (SymbolId, SymbolId) {
        let getter = self.method(owner, &format!("get_{name}"), &[], ty.clone());
        self.property_with_getter(owner, name, ty, getter)
    }

    /// Computed property with a virtual getter, overriding the getter
    /// `overrides` when given.
    pub fn virtual_property(
        &self,
        owner: TypeDefId,
        name: &str,
        ty: TypeRef,
        overrides: Option<SymbolId>,
    ) -> (SymbolId, SymbolId) {
        let getter = self.virtual_method(owner, &format!("get_{name}"), ty.clone(), overrides);
        self.property_with_getter(owner, name, ty, getter)
    }

    fn property_with_getter(
        &self,
        owner: TypeDefId,
        name: &str,
        ty: TypeRef,
        getter: SymbolId,
    ) -> (SymbolId, SymbolId) {
        let header = self.header(owner, name, false, MemberOrigin::Source);
        let property = self.add(MemberDescriptor::Property(PropertyDescriptor {
            header,
            ty,
            parameters: Vec::new(),
            getter: Some(getter),
            setter: None,
        }));
        (property, getter)
    }

    #[expect(clippy::too_many_arguments, reason = "test descriptor factory")]
    fn add_method(
        &self,
        owner: TypeDefId,
        name: &str,
        params: &[(&str, TypeRef)],
        return_type: TypeRef,
        is_static: bool,
        origin: MemberOrigin,
        is_virtual: bool,
        overrides: Option<SymbolId>,
    ) -> SymbolId {
        let header = self.header(owner, name, is_static, origin);
        self.add(MemberDescriptor::Method(MethodDescriptor {
            header,
            parameters: self.parameters(params),
            return_type,
            generic_arity: 0,
            is_virtual,
            overrides,
        }))
    }

    pub fn method(&self, owner: TypeDefId, name: &str, params: &[(&str, TypeRef)], ret: TypeRef) -> SymbolId {
        self.add_method(owner, name, params, ret, false, MemberOrigin::Source, false, None)
    }

    pub fn static_method(
        &self,
        owner: TypeDefId,
        name: &str,
        params: &[(&str, TypeRef)],
        ret: TypeRef,
    ) -> SymbolId {
        self.add_method(owner, name, params, ret, true, MemberOrigin::Source, false, None)
    }

    pub fn virtual_method(
        &self,
        owner: TypeDefId,
        name: &str,
        ret: TypeRef,
        overrides: Option<SymbolId>,
    ) -> SymbolId {
        self.add_method(owner, name, &[], ret, false, MemberOrigin::Source, true, overrides)
    }

    pub fn loaded_method(
        &self,
        owner: TypeDefId,
        name: &str,
        params: &[(&str, TypeRef)],
        ret: TypeRef,
        is_static: bool,
    ) -> SymbolId {
        self.add_method(owner, name, params, ret, is_static, MemberOrigin::Loaded, false, None)
    }

    fn add_constructor(&self, owner: TypeDefId, params: &[(&str, TypeRef)], origin: MemberOrigin) -> SymbolId {
        let header = self.header(owner, ".ctor", false, origin);
        self.add(MemberDescriptor::Constructor(ConstructorDescriptor {
            header,
            parameters: self.parameters(params),
        }))
    }

    pub fn constructor(&self, owner: TypeDefId, params: &[(&str, TypeRef)]) -> SymbolId {
        self.add_constructor(owner, params, MemberOrigin::Source)
    }

    pub fn implicit_constructor(&self, owner: TypeDefId) -> SymbolId {
        self.add_constructor(owner, &[], MemberOrigin::Implicit)
    }

    pub fn loaded_constructor(&self, owner: TypeDefId, params: &[(&str, TypeRef)]) -> SymbolId {
        self.add_constructor(owner, params, MemberOrigin::Loaded)
    }

    // Bodies and implementations

    pub fn body(&self, symbol: SymbolId, tree: SharedTree) {
        self.trees.borrow_mut().insert(symbol, tree);
    }

    pub fn native(&self, symbol: SymbolId, f: impl Fn(PhysicalCall<'_>) -> EvalResult + 'static) {
        self.handles
            .borrow_mut()
            .insert(symbol, Rc::new(NativeHandle(Box::new(f))));
    }

    /// Run `tree` as the body of a fresh static method.
    pub fn run(&self, session: &Session, tree: SharedTree) -> EvalResult {
        let program = self.class("Program");
        let main = self.static_method(program, "Main", &[], TypeRef::OBJECT);
        self.body(main, tree);
        let frame = session.class_frame(&closed(program));
        session.interpret(main, &frame, Vec::new(), &CancellationToken::new())
    }

    /// Every physical construction so far, with its arguments.
    pub fn constructed(&self) -> Vec<(RuntimeType, Vec<Value>)> {
        self.constructed.borrow().clone()
    }
}

impl DescriptorLayer for TestHost {
    fn type_descriptor(&self, def: TypeDefId) -> Result<Rc<TypeDescriptor>, EvalError> {
        self.types
            .borrow()
            .get(&def)
            .cloned()
            .map(Rc::new)
            .ok_or_else(|| host_failure(format!("unknown type {def:?}")))
    }

    fn member(&self, symbol: SymbolId) -> Result<Rc<MemberDescriptor>, EvalError> {
        self.members
            .borrow()
            .get(&symbol)
            .cloned()
            .ok_or_else(|| host_failure(format!("unknown member {symbol:?}")))
    }

    fn physical_handle(&self, symbol: SymbolId) -> Result<Option<Rc<dyn PhysicalHandle>>, EvalError> {
        Ok(self.handles.borrow().get(&symbol).cloned())
    }
}

impl TypeSynthesizer for TestHost {
    fn synthesize(&self, ty: &RuntimeType) -> Result<Rc<dyn SynthesizedType>, EvalError> {
        if let Some(backing) = self.synthesized.borrow().get(ty) {
            return Ok(Rc::clone(backing));
        }
        if let Some(def) = ty.def() {
            if self.rejected.borrow().contains(&def) {
                return Err(type_creation_failed(&ty.to_string(), "rejected by host"));
            }
        }
        let backing: Rc<dyn SynthesizedType> = Rc::new(Backing {
            ty: ty.clone(),
            log: Rc::clone(&self.constructed),
        });
        self.synthesized
            .borrow_mut()
            .insert(ty.clone(), Rc::clone(&backing));
        Ok(backing)
    }
}

impl OperationTreeProvider for TestHost {
    fn operation_tree(&self, symbol: SymbolId) -> Option<SharedTree> {
        self.trees.borrow().get(&symbol).cloned()
    }
}
