//! String interner backing [`Name`].
//!
//! Interned strings are leaked to obtain `'static` lifetime, so lookups can
//! hand out references without lifetime plumbing. An interner lives for the
//! whole compiler process; the leak is intentional.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// Interner exceeded capacity (over 4 billion strings).
    Overflow { count: usize },
}

impl std::fmt::Display for InternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternError::Overflow { count } => {
                write!(f, "interner exceeded capacity: {count} strings")
            }
        }
    }
}

impl std::error::Error for InternError {}

struct InternTable {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents, indexed by `Name::raw`.
    strings: Vec<&'static str>,
}

/// Thread-safe string interner.
///
/// Provides O(1) lookup and equality comparison for interned strings.
/// Wrap in `Arc` to share across threads.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let mut table = InternTable {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        let empty: &'static str = "";
        table.map.insert(empty, 0);
        table.strings.push(empty);
        StringInterner {
            table: RwLock::new(table),
        }
    }

    /// Try to intern a string, returning its [`Name`] or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        // Fast path: already interned.
        {
            let guard = self.table.read();
            if let Some(&idx) = guard.map.get(s) {
                return Ok(Name::from_raw(idx));
            }
        }
        self.try_intern_slow(s.to_owned())
    }

    /// Try to intern an owned string, avoiding the extra allocation when the
    /// caller already owns it.
    pub fn try_intern_owned(&self, s: String) -> Result<Name, InternError> {
        {
            let guard = self.table.read();
            if let Some(&idx) = guard.map.get(s.as_str()) {
                return Ok(Name::from_raw(idx));
            }
        }
        self.try_intern_slow(s)
    }

    fn try_intern_slow(&self, s: String) -> Result<Name, InternError> {
        let mut guard = self.table.write();
        // Double-check after acquiring the write lock.
        if let Some(&idx) = guard.map.get(s.as_str()) {
            return Ok(Name::from_raw(idx));
        }
        let idx = u32::try_from(guard.strings.len()).map_err(|_| InternError::Overflow {
            count: guard.strings.len(),
        })?;
        let leaked: &'static str = Box::leak(s.into_boxed_str());
        guard.strings.push(leaked);
        guard.map.insert(leaked, idx);
        Ok(Name::from_raw(idx))
    }

    /// Intern a string, returning its [`Name`].
    ///
    /// # Panics
    /// Panics if the interner exceeds capacity. Use [`Self::try_intern`] for
    /// fallible interning.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        match self.try_intern(s) {
            Ok(name) => name,
            Err(e) => panic!("{e}"),
        }
    }

    /// Intern an owned string, returning its [`Name`].
    ///
    /// # Panics
    /// Panics if the interner exceeds capacity.
    #[inline]
    pub fn intern_owned(&self, s: String) -> Name {
        match self.try_intern_owned(s) {
            Ok(name) => name,
            Err(e) => panic!("{e}"),
        }
    }

    /// Look up the string for a [`Name`].
    ///
    /// Returns a `'static` reference; interned strings are never deallocated.
    pub fn lookup(&self, name: Name) -> &'static str {
        let guard = self.table.read();
        guard.strings[name.raw() as usize]
    }

    /// Number of interned strings, including the pre-interned empty string.
    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// Check whether the interner holds only the pre-interned empty string.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn intern_is_idempotent() {
        let interner = StringInterner::new();
        let a = interner.intern("owner");
        let b = interner.intern("owner");
        assert_eq!(a, b);
        assert_eq!(interner.lookup(a), "owner");
    }

    #[test]
    fn distinct_strings_get_distinct_names() {
        let interner = StringInterner::new();
        let a = interner.intern("lhs");
        let b = interner.intern("rhs");
        assert_ne!(a, b);
        assert_eq!(interner.lookup(a), "lhs");
        assert_eq!(interner.lookup(b), "rhs");
    }

    #[test]
    fn empty_string_is_pre_interned() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.lookup(Name::EMPTY), "");
    }

    #[test]
    fn intern_owned_matches_intern() {
        let interner = StringInterner::new();
        let a = interner.intern("member$$x");
        let b = interner.intern_owned("member$$x".to_owned());
        assert_eq!(a, b);
    }
}
