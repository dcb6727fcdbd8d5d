//! String interner for identifiers and literal text.
//!
//! Interned strings are leaked, so lookups hand out `&'static str` without
//! holding the lock.

// Arc is needed for SharedInterner: front-end and interpreter share one interner.
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::Name;

struct InternTable {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

impl InternTable {
    fn with_empty() -> Self {
        let mut map = FxHashMap::default();
        map.insert("", 0);
        InternTable {
            map,
            strings: vec![""],
        }
    }
}

/// String interner with O(1) interning and lookup.
///
/// # Thread Safety
/// Uses an `RwLock` so the front-end may intern from several threads while
/// trees are being produced; the interpreter itself only reads.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    /// Create a new interner holding only the empty string.
    pub fn new() -> Self {
        StringInterner {
            table: RwLock::new(InternTable::with_empty()),
        }
    }

    /// Intern a string, returning its Name.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` distinct strings are interned.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(&index) = self.table.read().map.get(s) {
            return Name::from_raw(index);
        }

        let mut table = self.table.write();
        // Double-check after acquiring the write lock
        if let Some(&index) = table.map.get(s) {
            return Name::from_raw(index);
        }

        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let index = u32::try_from(table.strings.len())
            .unwrap_or_else(|_| panic!("string interner exceeded u32::MAX entries"));
        table.strings.push(leaked);
        table.map.insert(leaked, index);
        Name::from_raw(index)
    }

    /// Look up the string for a Name.
    ///
    /// Names from a different interner resolve to `"<unknown>"`.
    pub fn lookup(&self, name: Name) -> &'static str {
        let table = self.table.read();
        table
            .strings
            .get(name.raw() as usize)
            .copied()
            .unwrap_or("<unknown>")
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// Always false: the empty string is pre-interned.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}

/// Shared handle to one interner.
#[derive(Clone, Default, Debug)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
