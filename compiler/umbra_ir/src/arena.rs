//! Operation arena and the shared operation tree.
//!
//! [`OperationArena`] uses struct-of-arrays layout (parallel `ops` and `spans`
//! arrays indexed by [`OpId`]). Child lists, type references and member uses
//! live in side tables addressed by [`OpRange`], [`TypeRefId`] and
//! [`MemberUseId`].

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::{MemberUse, Operation, Span, TypeRef};

fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("operation arena overflow: too many {what}"))
}

/// Index of an operation node in an [`OperationArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct OpId(u32);

impl OpId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpId({})", self.0)
    }
}

/// A contiguous range of operation ids in the arena's list storage.
///
/// Used for arguments, block statements, tuple elements and initializers.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct OpRange {
    pub start: u32,
    pub len: u16,
}

impl OpRange {
    /// Empty range constant.
    pub const EMPTY: Self = Self { start: 0, len: 0 };

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }
}

impl fmt::Debug for OpRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpRange({}..{})", self.start, self.start + u32::from(self.len))
    }
}

/// Index of a [`TypeRef`] in the arena's type table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct TypeRefId(u32);

/// Index of a [`MemberUse`] in the arena's member table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct MemberUseId(u32);

/// Flat storage for the nodes of one operation tree.
#[derive(Clone, Debug, Default)]
pub struct OperationArena {
    /// Operation kinds (parallel with spans).
    ops: Vec<Operation>,
    /// Source spans for error reporting (parallel with ops).
    spans: Vec<Span>,
    /// Flattened child lists.
    lists: Vec<OpId>,
    types: Vec<TypeRef>,
    members: Vec<MemberUse>,
}

impl OperationArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an operation node, returning its id.
    pub fn push(&mut self, op: Operation, span: Span) -> OpId {
        let id = OpId::new(to_u32(self.ops.len(), "operations"));
        self.ops.push(op);
        self.spans.push(span);
        id
    }

    /// Allocate a child list.
    pub fn push_list(&mut self, ids: impl IntoIterator<Item = OpId>) -> OpRange {
        let start = to_u32(self.lists.len(), "list entries");
        self.lists.extend(ids);
        let len = self.lists.len() - start as usize;
        let len = u16::try_from(len).unwrap_or_else(|_| panic!("operation list longer than u16::MAX"));
        OpRange { start, len }
    }

    pub fn push_type(&mut self, ty: TypeRef) -> TypeRefId {
        let id = TypeRefId(to_u32(self.types.len(), "type references"));
        self.types.push(ty);
        id
    }

    pub fn push_member(&mut self, member: MemberUse) -> MemberUseId {
        let id = MemberUseId(to_u32(self.members.len(), "member uses"));
        self.members.push(member);
        id
    }

    /// Get the operation stored at `id`.
    #[inline]
    pub fn get(&self, id: OpId) -> &Operation {
        &self.ops[id.index()]
    }

    #[inline]
    pub fn span(&self, id: OpId) -> Span {
        self.spans[id.index()]
    }

    #[inline]
    pub fn list(&self, range: OpRange) -> &[OpId] {
        let start = range.start as usize;
        &self.lists[start..start + range.len()]
    }

    #[inline]
    pub fn type_ref(&self, id: TypeRefId) -> &TypeRef {
        &self.types[id.0 as usize]
    }

    #[inline]
    pub fn member(&self, id: MemberUseId) -> &MemberUse {
        &self.members[id.0 as usize]
    }

    /// Number of operation nodes.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// The operation tree of one member body (or one field initializer).
#[derive(Clone, Debug)]
pub struct OperationTree {
    pub arena: OperationArena,
    pub root: OpId,
}

impl OperationTree {
    pub fn new(arena: OperationArena, root: OpId) -> Self {
        OperationTree { arena, root }
    }
}

/// Immutable, shareable operation tree.
///
/// Trees are produced once per member by the front-end and never mutated.
#[derive(Clone, Debug)]
pub struct SharedTree(Arc<OperationTree>);

impl SharedTree {
    pub fn new(tree: OperationTree) -> Self {
        SharedTree(Arc::new(tree))
    }

    /// True if both handles point at the same tree.
    pub fn ptr_eq(&self, other: &SharedTree) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for SharedTree {
    type Target = OperationTree;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Constant, Name};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_push_and_get() {
        let mut arena = OperationArena::new();
        let id = arena.push(Operation::Literal(Constant::I32(7)), Span::new(1, 2));
        assert_eq!(*arena.get(id), Operation::Literal(Constant::I32(7)));
        assert_eq!(arena.span(id), Span::new(1, 2));
    }

    #[test]
    fn test_lists_are_contiguous() {
        let mut arena = OperationArena::new();
        let a = arena.push(Operation::Local(Name::from_raw(1)), Span::DUMMY);
        let b = arena.push(Operation::Local(Name::from_raw(2)), Span::DUMMY);
        let first = arena.push_list([a]);
        let second = arena.push_list([a, b]);
        assert_eq!(arena.list(first), &[a]);
        assert_eq!(arena.list(second), &[a, b]);
        assert!(arena.list(OpRange::EMPTY).is_empty());
    }
}
