//! The closed set of operation kinds.
//!
//! `Operation` is `Copy`: child nodes, child lists, types and member uses are
//! referenced by id into the owning `OperationArena`, so the evaluator can copy
//! a node out of the arena before recursing into it.

use crate::{BinaryOp, MemberUseId, Name, OpId, OpRange, TypeRefId, UnaryOp};

/// A compile-time constant.
///
/// Floating-point constants are stored as bits to keep `Operation: Eq`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Constant {
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(u32),
    F64(u64),
    Text(Name),
}

impl Constant {
    pub fn f32(value: f32) -> Self {
        Constant::F32(value.to_bits())
    }

    pub fn f64(value: f64) -> Self {
        Constant::F64(value.to_bits())
    }
}

/// What an instance reference denotes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum InstanceKind {
    /// `this`
    ContainingType,
    /// The object under construction inside an object initializer.
    ImplicitReceiver,
}

/// `break` or `continue`. Unlabeled: always targets the innermost loop.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BranchKind {
    Break,
    Continue,
}

/// How a conversion behaves when the value does not fit the target type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ConversionKind {
    /// `(T)x`: failure is an invalid-cast error.
    Cast,
    /// `x as T`: failure yields null.
    TryCast,
}

/// One node of a resolved operation tree.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Operation {
    // Literals
    Literal(Constant),
    DefaultValue(TypeRefId),

    // References
    Local(Name),
    Parameter(Name),
    Instance(InstanceKind),
    FieldRef {
        field: MemberUseId,
        receiver: Option<OpId>,
    },
    /// Property or indexer reference; `index` is empty for plain properties.
    /// `is_virtual` is false for `base.` access.
    PropertyRef {
        property: MemberUseId,
        receiver: Option<OpId>,
        index: OpRange,
        is_virtual: bool,
    },
    ArrayElement {
        array: OpId,
        indices: OpRange,
    },

    // Operators
    /// `operator` is set when semantic analysis bound a user-defined operator.
    Binary {
        op: BinaryOp,
        left: OpId,
        right: OpId,
        operator: Option<MemberUseId>,
    },
    Unary {
        op: UnaryOp,
        operand: OpId,
        operator: Option<MemberUseId>,
    },
    Conversion {
        operand: OpId,
        target: TypeRefId,
        kind: ConversionKind,
        operator: Option<MemberUseId>,
    },
    Coalesce {
        value: OpId,
        when_null: OpId,
    },
    /// `receiver?.rest`; `when_not_null` refers back through
    /// `ConditionalAccessInstance`.
    ConditionalAccess {
        receiver: OpId,
        when_not_null: OpId,
    },
    ConditionalAccessInstance,
    IsType {
        operand: OpId,
        target: TypeRefId,
        negated: bool,
    },
    TypeOf(TypeRefId),

    // Assignment
    Assign {
        target: OpId,
        value: OpId,
    },
    CompoundAssign {
        op: BinaryOp,
        target: OpId,
        value: OpId,
        operator: Option<MemberUseId>,
    },
    Increment {
        target: OpId,
        decrement: bool,
        postfix: bool,
        operator: Option<MemberUseId>,
    },
    /// `(a, var b, _) = value`; `target` is a `Tuple` of targets.
    Deconstruct {
        target: OpId,
        value: OpId,
    },
    /// `var x` as a deconstruction target.
    DeclarationTarget(Name),
    Discard,

    // Calls and creation
    Invocation {
        method: MemberUseId,
        receiver: Option<OpId>,
        args: OpRange,
        is_virtual: bool,
    },
    /// `: base(...)` or `: this(...)` at the start of a constructor body.
    ConstructorInitializer {
        constructor: MemberUseId,
        args: OpRange,
    },
    ObjectCreation {
        constructor: MemberUseId,
        args: OpRange,
        initializer: Option<OpId>,
    },
    /// `new { A = 1, B = 2 }`; each initializer assigns a property of the
    /// implicit receiver.
    AnonymousObjectCreation {
        ty: TypeRefId,
        initializers: OpRange,
    },
    ObjectInitializer(OpRange),
    /// Array creation; `dimensions` may be empty when an initializer gives
    /// the shape.
    ArrayCreation {
        element: TypeRefId,
        rank: u8,
        dimensions: OpRange,
        initializer: Option<OpId>,
    },
    ArrayInitializer(OpRange),
    Tuple(OpRange),
    InterpolatedString(OpRange),
    InterpolatedText(Name),
    Interpolation {
        value: OpId,
        alignment: Option<OpId>,
        format: Option<Name>,
    },

    // Statements
    Block(OpRange),
    ExpressionStatement(OpId),
    VariableDeclaration {
        name: Name,
        initializer: Option<OpId>,
    },
    /// `if`/`else` statement or `?:` expression.
    Conditional {
        condition: OpId,
        when_true: OpId,
        when_false: Option<OpId>,
    },
    /// `while` when `test_first`, `do ... while` otherwise.
    WhileLoop {
        condition: OpId,
        body: OpId,
        test_first: bool,
    },
    ForLoop {
        before: OpRange,
        condition: Option<OpId>,
        after: OpRange,
        body: OpId,
    },
    ForEachLoop {
        local: Name,
        collection: OpId,
        body: OpId,
    },
    Branch(BranchKind),
    Return(Option<OpId>),
    Empty,

    // Produced by the front-end but outside the interpreted subset
    Throw(Option<OpId>),
    Await(OpId),
    Lambda {
        body: OpId,
    },
    Switch {
        value: OpId,
        cases: OpRange,
    },
}

impl Operation {
    /// Stable kind name for diagnostics.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Literal(_) => "Literal",
            Self::DefaultValue(_) => "DefaultValue",
            Self::Local(_) => "LocalReference",
            Self::Parameter(_) => "ParameterReference",
            Self::Instance(_) => "InstanceReference",
            Self::FieldRef { .. } => "FieldReference",
            Self::PropertyRef { .. } => "PropertyReference",
            Self::ArrayElement { .. } => "ArrayElementReference",
            Self::Binary { .. } => "BinaryOperator",
            Self::Unary { .. } => "UnaryOperator",
            Self::Conversion { .. } => "Conversion",
            Self::Coalesce { .. } => "Coalesce",
            Self::ConditionalAccess { .. } => "ConditionalAccess",
            Self::ConditionalAccessInstance => "ConditionalAccessInstance",
            Self::IsType { .. } => "IsType",
            Self::TypeOf(_) => "TypeOf",
            Self::Assign { .. } => "SimpleAssignment",
            Self::CompoundAssign { .. } => "CompoundAssignment",
            Self::Increment { .. } => "Increment",
            Self::Deconstruct { .. } => "DeconstructionAssignment",
            Self::DeclarationTarget(_) => "DeclarationExpression",
            Self::Discard => "Discard",
            Self::Invocation { .. } => "Invocation",
            Self::ConstructorInitializer { .. } => "ConstructorInitializer",
            Self::ObjectCreation { .. } => "ObjectCreation",
            Self::AnonymousObjectCreation { .. } => "AnonymousObjectCreation",
            Self::ObjectInitializer(_) => "ObjectInitializer",
            Self::ArrayCreation { .. } => "ArrayCreation",
            Self::ArrayInitializer(_) => "ArrayInitializer",
            Self::Tuple(_) => "Tuple",
            Self::InterpolatedString(_) => "InterpolatedString",
            Self::InterpolatedText(_) => "InterpolatedStringText",
            Self::Interpolation { .. } => "Interpolation",
            Self::Block(_) => "Block",
            Self::ExpressionStatement(_) => "ExpressionStatement",
            Self::VariableDeclaration { .. } => "VariableDeclaration",
            Self::Conditional { .. } => "Conditional",
            Self::WhileLoop { .. } => "WhileLoop",
            Self::ForLoop { .. } => "ForLoop",
            Self::ForEachLoop { .. } => "ForEachLoop",
            Self::Branch(_) => "Branch",
            Self::Return(_) => "Return",
            Self::Empty => "Empty",
            Self::Throw(_) => "Throw",
            Self::Await(_) => "Await",
            Self::Lambda { .. } => "AnonymousFunction",
            Self::Switch { .. } => "Switch",
        }
    }
}
