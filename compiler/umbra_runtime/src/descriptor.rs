//! Reflection-shaped descriptors over semantic symbols.
//!
//! The descriptor layer is an external collaborator: it exposes declarations
//! known only through semantic analysis with the same surface as loaded
//! ones. Each member kind is one variant of [`MemberDescriptor`]; shared
//! accessors come from the [`MemberInfo`] and [`Signature`] capability traits
//! rather than from a class hierarchy.
//!
//! Descriptors identify declarations, not instantiations. Two uses of
//! `Box<int>.Get` and `Box<string>.Get` resolve to the same descriptor, which
//! is what makes them usable as cache keys.

use std::rc::Rc;

use umbra_ir::{Name, SymbolId, TypeDefId, TypeRef};

use crate::errors::{unsupported_operation, EvalError, EvalResult};
use crate::runtime_type::RuntimeType;
use crate::value::Value;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    /// Structurally-anonymous type (`new { A = 1 }`).
    Anonymous,
}

/// Whether a type exists only symbolically or is already loadable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeOrigin {
    Symbolic,
    Loaded,
}

#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    pub def: TypeDefId,
    pub name: String,
    pub kind: TypeKind,
    pub origin: TypeOrigin,
    pub generic_arity: u32,
    /// Base type, open over this type's own generic parameters.
    pub base: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    /// Declared members, constructors included.
    pub members: Vec<SymbolId>,
}

impl TypeDescriptor {
    pub fn is_symbolic(&self) -> bool {
        self.origin == TypeOrigin::Symbolic
    }
}

/// Where a member's behavior comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MemberOrigin {
    /// Declared in source; has an operation tree unless abstract or auto.
    Source,
    /// Declared implicitly by the language (default constructors,
    /// anonymous-type accessors). Never has an operation tree.
    Implicit,
    /// Backed by a loaded implementation reached through a physical handle.
    Loaded,
}

#[derive(Clone, Debug)]
pub struct MemberHeader {
    pub symbol: SymbolId,
    pub name: String,
    pub declaring_type: TypeDefId,
    pub is_static: bool,
    pub origin: MemberOrigin,
}

#[derive(Clone, Debug)]
pub struct Parameter {
    pub name: Name,
    /// Declared type, open over type- and method-level parameters.
    pub ty: TypeRef,
}

#[derive(Clone, Debug)]
pub struct MethodDescriptor {
    pub header: MemberHeader,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeRef,
    pub generic_arity: u32,
    pub is_virtual: bool,
    /// The base member this method overrides, if any.
    pub overrides: Option<SymbolId>,
}

#[derive(Clone, Debug)]
pub struct ConstructorDescriptor {
    pub header: MemberHeader,
    pub parameters: Vec<Parameter>,
}

#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub header: MemberHeader,
    pub ty: TypeRef,
}

/// A property or indexer. Without accessors it is an auto-property whose
/// value lives in storage keyed by the property symbol.
#[derive(Clone, Debug)]
pub struct PropertyDescriptor {
    pub header: MemberHeader,
    pub ty: TypeRef,
    /// Indexer parameters; empty for plain properties.
    pub parameters: Vec<Parameter>,
    pub getter: Option<SymbolId>,
    pub setter: Option<SymbolId>,
}

impl PropertyDescriptor {
    pub fn is_auto(&self) -> bool {
        self.getter.is_none() && self.setter.is_none()
    }
}

#[derive(Clone, Debug)]
pub enum MemberDescriptor {
    Method(MethodDescriptor),
    Constructor(ConstructorDescriptor),
    Field(FieldDescriptor),
    Property(PropertyDescriptor),
}

/// Capability shared by every member kind.
pub trait MemberInfo {
    fn header(&self) -> &MemberHeader;

    fn symbol(&self) -> SymbolId {
        self.header().symbol
    }

    fn name(&self) -> &str {
        &self.header().name
    }

    fn declaring_type(&self) -> TypeDefId {
        self.header().declaring_type
    }

    fn is_static(&self) -> bool {
        self.header().is_static
    }

    fn origin(&self) -> MemberOrigin {
        self.header().origin
    }
}

/// Capability of members that take parameters.
pub trait Signature {
    fn parameters(&self) -> &[Parameter];

    fn arity(&self) -> usize {
        self.parameters().len()
    }
}

impl MemberInfo for MethodDescriptor {
    fn header(&self) -> &MemberHeader {
        &self.header
    }
}

impl MemberInfo for ConstructorDescriptor {
    fn header(&self) -> &MemberHeader {
        &self.header
    }
}

impl MemberInfo for FieldDescriptor {
    fn header(&self) -> &MemberHeader {
        &self.header
    }
}

impl MemberInfo for PropertyDescriptor {
    fn header(&self) -> &MemberHeader {
        &self.header
    }
}

impl MemberInfo for MemberDescriptor {
    fn header(&self) -> &MemberHeader {
        match self {
            MemberDescriptor::Method(m) => &m.header,
            MemberDescriptor::Constructor(c) => &c.header,
            MemberDescriptor::Field(f) => &f.header,
            MemberDescriptor::Property(p) => &p.header,
        }
    }
}

impl Signature for MethodDescriptor {
    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

impl Signature for ConstructorDescriptor {
    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

impl Signature for PropertyDescriptor {
    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

impl MemberDescriptor {
    pub fn kind_name(&self) -> &'static str {
        match self {
            MemberDescriptor::Method(_) => "method",
            MemberDescriptor::Constructor(_) => "constructor",
            MemberDescriptor::Field(_) => "field",
            MemberDescriptor::Property(_) => "property",
        }
    }

    pub fn as_method(&self) -> Option<&MethodDescriptor> {
        match self {
            MemberDescriptor::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_constructor(&self) -> Option<&ConstructorDescriptor> {
        match self {
            MemberDescriptor::Constructor(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldDescriptor> {
        match self {
            MemberDescriptor::Field(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyDescriptor> {
        match self {
            MemberDescriptor::Property(p) => Some(p),
            _ => None,
        }
    }
}

/// Arguments of one call into a loaded implementation.
#[derive(Copy, Clone, Debug)]
pub struct PhysicalCall<'a> {
    /// `None` for static members and constructors.
    pub receiver: Option<&'a Value>,
    pub args: &'a [Value],
    /// Method-level type arguments, already closed.
    pub type_args: &'a [RuntimeType],
    /// The closed declaring type at the call site.
    pub containing: &'a RuntimeType,
}

/// A loaded implementation of one member.
///
/// Failures inside a handle are opaque to the interpreter and propagate
/// unchanged.
pub trait PhysicalHandle {
    /// Call a method, constructor or accessor.
    fn invoke(&self, call: PhysicalCall<'_>) -> EvalResult;

    /// Read a field.
    fn load(&self, receiver: Option<&Value>) -> EvalResult {
        let _ = receiver;
        Err(unsupported_operation("physical field load"))
    }

    /// Write a field.
    fn store(&self, receiver: Option<&Value>, value: Value) -> Result<(), EvalError> {
        let _ = (receiver, value);
        Err(unsupported_operation("physical field store"))
    }
}

/// The descriptor layer consumed by the interpreter.
pub trait DescriptorLayer {
    fn type_descriptor(&self, def: TypeDefId) -> Result<Rc<TypeDescriptor>, EvalError>;

    fn member(&self, symbol: SymbolId) -> Result<Rc<MemberDescriptor>, EvalError>;

    /// The loaded implementation of `symbol`, or `None` if it has none and
    /// must be interpreted or stored.
    fn physical_handle(&self, symbol: SymbolId)
        -> Result<Option<Rc<dyn PhysicalHandle>>, EvalError>;
}
