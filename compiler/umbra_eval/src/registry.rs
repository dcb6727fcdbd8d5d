//! The operation registry and per-type member tables.
//!
//! The registry is an append-only list of `(context, tree, symbol)` entries
//! addressed by a small integer [`OperationId`]. Entries are never removed,
//! so an id stays valid for the lifetime of the session that issued it. A
//! dynamically emitted body (or any other handle-carrying caller) can find
//! its way back to the right tree with nothing but the id.
//!
//! A [`MemberTable`] maps the members of one closed type to registry ids.
//! Overridden base members map to the most-derived override, which is what
//! virtual dispatch on a proxy instance looks up.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use umbra_ir::{SharedTree, SymbolId};
use umbra_runtime::RuntimeType;

/// Stable handle of a registry entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OperationId(u32);

impl OperationId {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug)]
pub struct RegistryEntry {
    /// Closed declaring type the tree runs in.
    pub context: RuntimeType,
    pub tree: SharedTree,
    pub symbol: SymbolId,
}

#[derive(Default)]
pub struct OperationRegistry {
    entries: RefCell<Vec<Rc<RegistryEntry>>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return its id.
    pub fn register(&self, context: RuntimeType, tree: SharedTree, symbol: SymbolId) -> OperationId {
        let mut entries = self.entries.borrow_mut();
        // Registry ids are u32; a session never approaches that many members.
        let id = OperationId(u32::try_from(entries.len()).unwrap_or(u32::MAX));
        tracing::trace!(id = id.0, ?symbol, context = %context, "registering operation");
        entries.push(Rc::new(RegistryEntry {
            context,
            tree,
            symbol,
        }));
        id
    }

    pub fn get(&self, id: OperationId) -> Option<Rc<RegistryEntry>> {
        self.entries.borrow().get(id.0 as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// Member-to-operation table of one closed type.
#[derive(Debug)]
pub struct MemberTable {
    ty: RuntimeType,
    slots: FxHashMap<SymbolId, OperationId>,
}

impl MemberTable {
    pub fn new(ty: RuntimeType) -> Self {
        MemberTable {
            ty,
            slots: FxHashMap::default(),
        }
    }

    pub fn runtime_type(&self) -> &RuntimeType {
        &self.ty
    }

    /// Record `symbol` unless a more-derived entry already claimed it.
    pub fn insert_if_absent(&mut self, symbol: SymbolId, id: OperationId) {
        self.slots.entry(symbol).or_insert(id);
    }

    pub fn lookup(&self, symbol: SymbolId) -> Option<OperationId> {
        self.slots.get(&symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
