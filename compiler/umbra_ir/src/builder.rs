//! Convenience builder for operation trees.
//!
//! Front-ends lower declarations through this builder; it also keeps
//! hand-written trees in tests readable. Every node gets `Span::DUMMY` unless
//! a span is set with [`TreeBuilder::at`].

use crate::{
    BinaryOp, BranchKind, Constant, ConversionKind, InstanceKind, MemberUse, MemberUseId, Name,
    OpId, OpRange, Operation, OperationArena, OperationTree, SharedInterner, SharedTree, Span,
    TypeRef, TypeRefId, UnaryOp,
};

pub struct TreeBuilder {
    arena: OperationArena,
    interner: SharedInterner,
    span: Span,
}

impl TreeBuilder {
    pub fn new(interner: SharedInterner) -> Self {
        TreeBuilder {
            arena: OperationArena::new(),
            interner,
            span: Span::DUMMY,
        }
    }

    /// Use `span` for the nodes pushed from now on.
    pub fn at(&mut self, span: Span) -> &mut Self {
        self.span = span;
        self
    }

    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    pub fn push(&mut self, op: Operation) -> OpId {
        self.arena.push(op, self.span)
    }

    pub fn list(&mut self, ids: impl IntoIterator<Item = OpId>) -> OpRange {
        self.arena.push_list(ids)
    }

    pub fn ty(&mut self, ty: TypeRef) -> TypeRefId {
        self.arena.push_type(ty)
    }

    pub fn member(&mut self, member: MemberUse) -> MemberUseId {
        self.arena.push_member(member)
    }

    /// Finish the tree with `root` as its entry node.
    pub fn finish(self, root: OpId) -> SharedTree {
        SharedTree::new(OperationTree::new(self.arena, root))
    }

    // Literals

    pub fn constant(&mut self, value: Constant) -> OpId {
        self.push(Operation::Literal(value))
    }

    pub fn int(&mut self, value: i32) -> OpId {
        self.constant(Constant::I32(value))
    }

    pub fn bool(&mut self, value: bool) -> OpId {
        self.constant(Constant::Bool(value))
    }

    pub fn text(&mut self, value: &str) -> OpId {
        let name = self.name(value);
        self.constant(Constant::Text(name))
    }

    pub fn null(&mut self) -> OpId {
        self.constant(Constant::Null)
    }

    // References

    pub fn local(&mut self, name: &str) -> OpId {
        let name = self.name(name);
        self.push(Operation::Local(name))
    }

    pub fn param(&mut self, name: &str) -> OpId {
        let name = self.name(name);
        self.push(Operation::Parameter(name))
    }

    pub fn this(&mut self) -> OpId {
        self.push(Operation::Instance(InstanceKind::ContainingType))
    }

    pub fn implicit_receiver(&mut self) -> OpId {
        self.push(Operation::Instance(InstanceKind::ImplicitReceiver))
    }

    pub fn field(&mut self, field: MemberUse, receiver: Option<OpId>) -> OpId {
        let field = self.member(field);
        self.push(Operation::FieldRef { field, receiver })
    }

    pub fn property(&mut self, property: MemberUse, receiver: Option<OpId>) -> OpId {
        let property = self.member(property);
        self.push(Operation::PropertyRef {
            property,
            receiver,
            index: OpRange::EMPTY,
            is_virtual: true,
        })
    }

    /// `base.Property`: reaches the named accessor, never an override.
    pub fn base_property(&mut self, property: MemberUse, receiver: Option<OpId>) -> OpId {
        let property = self.member(property);
        self.push(Operation::PropertyRef {
            property,
            receiver,
            index: OpRange::EMPTY,
            is_virtual: false,
        })
    }

    // Operators

    pub fn binary(&mut self, op: BinaryOp, left: OpId, right: OpId) -> OpId {
        self.push(Operation::Binary {
            op,
            left,
            right,
            operator: None,
        })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: OpId) -> OpId {
        self.push(Operation::Unary {
            op,
            operand,
            operator: None,
        })
    }

    pub fn convert(&mut self, operand: OpId, target: TypeRef, kind: ConversionKind) -> OpId {
        let target = self.ty(target);
        self.push(Operation::Conversion {
            operand,
            target,
            kind,
            operator: None,
        })
    }

    // Assignment

    pub fn assign(&mut self, target: OpId, value: OpId) -> OpId {
        self.push(Operation::Assign { target, value })
    }

    pub fn compound(&mut self, op: BinaryOp, target: OpId, value: OpId) -> OpId {
        self.push(Operation::CompoundAssign {
            op,
            target,
            value,
            operator: None,
        })
    }

    pub fn increment(&mut self, target: OpId, postfix: bool) -> OpId {
        self.push(Operation::Increment {
            target,
            decrement: false,
            postfix,
            operator: None,
        })
    }

    // Calls

    pub fn call(&mut self, method: MemberUse, receiver: Option<OpId>, args: &[OpId]) -> OpId {
        let method = self.member(method);
        let args = self.list(args.iter().copied());
        self.push(Operation::Invocation {
            method,
            receiver,
            args,
            is_virtual: false,
        })
    }

    pub fn new_object(
        &mut self,
        constructor: MemberUse,
        args: &[OpId],
        initializer: Option<OpId>,
    ) -> OpId {
        let constructor = self.member(constructor);
        let args = self.list(args.iter().copied());
        self.push(Operation::ObjectCreation {
            constructor,
            args,
            initializer,
        })
    }

    // Statements

    pub fn block(&mut self, statements: &[OpId]) -> OpId {
        let range = self.list(statements.iter().copied());
        self.push(Operation::Block(range))
    }

    pub fn expr_stmt(&mut self, expr: OpId) -> OpId {
        self.push(Operation::ExpressionStatement(expr))
    }

    pub fn declare(&mut self, name: &str, initializer: Option<OpId>) -> OpId {
        let name = self.name(name);
        self.push(Operation::VariableDeclaration { name, initializer })
    }

    pub fn if_else(&mut self, condition: OpId, when_true: OpId, when_false: Option<OpId>) -> OpId {
        self.push(Operation::Conditional {
            condition,
            when_true,
            when_false,
        })
    }

    pub fn while_loop(&mut self, condition: OpId, body: OpId) -> OpId {
        self.push(Operation::WhileLoop {
            condition,
            body,
            test_first: true,
        })
    }

    pub fn for_loop(
        &mut self,
        before: &[OpId],
        condition: Option<OpId>,
        after: &[OpId],
        body: OpId,
    ) -> OpId {
        let before = self.list(before.iter().copied());
        let after = self.list(after.iter().copied());
        self.push(Operation::ForLoop {
            before,
            condition,
            after,
            body,
        })
    }

    pub fn branch(&mut self, kind: BranchKind) -> OpId {
        self.push(Operation::Branch(kind))
    }

    pub fn ret(&mut self, value: Option<OpId>) -> OpId {
        self.push(Operation::Return(value))
    }
}
