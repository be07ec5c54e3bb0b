//! Symbols, scopes, and the arena they live in.
//!
//! A symbol is a declaration's identity: name, owner, flags, and an info
//! slot that starts as a deferred completer and is later replaced by a
//! resolved type. Symbols reference each other by [`SymbolId`] handle, so
//! owner/member cycles are structurally free; no symbol owns another.
//!
//! The info slot is an explicit three-state value. `Pending` carries the
//! byte range the completer re-enters; `Completing` makes illegal re-entrant
//! completion a first-class error instead of an accidental infinite loop.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use veld_ir::{Name, StringInterner};

use crate::ty::TypeId;

bitflags::bitflags! {
    /// Symbol flag bits as they appear in the pickled flag word.
    ///
    /// The producer's translation between surface modifiers and pickled
    /// bits is its own concern; only the bits this decoder consults are
    /// named here. The word is carried verbatim otherwise.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct SymbolFlags: u64 {
        const PROTECTED      = 1 << 0;
        const OVERRIDE       = 1 << 1;
        const PRIVATE        = 1 << 2;
        const ABSTRACT       = 1 << 3;
        const DEFERRED       = 1 << 4;
        const FINAL          = 1 << 5;
        const METHOD         = 1 << 6;
        const INTERFACE      = 1 << 7;
        const MODULE         = 1 << 8;
        const IMPLICIT       = 1 << 9;
        const SEALED         = 1 << 10;
        const CASE           = 1 << 11;
        const MUTABLE        = 1 << 12;
        const PARAM          = 1 << 13;
        const PACKAGE        = 1 << 14;
        const COVARIANT      = 1 << 16;
        const CONTRAVARIANT  = 1 << 17;
        const JAVA           = 1 << 20;
        const SYNTHETIC      = 1 << 21;
        const STABLE         = 1 << 22;
        const STATIC         = 1 << 23;
        const CASE_ACCESSOR  = 1 << 24;
        const TRAIT          = 1 << 25;
        const ACCESSOR       = 1 << 27;
        const SUPER_ACCESSOR = 1 << 28;
        const PARAM_ACCESSOR = 1 << 29;
        const MODULE_VAR     = 1 << 30;
        const LAZY           = 1 << 31;
        const EXISTENTIAL    = 1 << 35;
        const EXPANDED_NAME  = 1 << 36;

        /// Session-synthesized placeholder for an unresolved external
        /// reference. Never appears on the wire.
        const STUB           = 1 << 60;
    }
}

/// A 32-bit handle into the symbol arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Sentinel for "no symbol" (the dedicated wire tag decodes to this).
    pub const NONE: SymbolId = SymbolId(u32::MAX);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        SymbolId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

impl std::fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "SymbolId::NONE")
        } else {
            write!(f, "SymbolId({})", self.0)
        }
    }
}

/// What kind of declaration a symbol stands for.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SymbolKind {
    /// Class or trait.
    Class,
    /// Abstract type member or type parameter.
    Type,
    /// Type alias.
    Alias,
    /// Module (object) value.
    Module,
    /// Term: val, var, or method.
    Value,
}

impl SymbolKind {
    /// Symbols that live in the type namespace.
    #[inline]
    pub const fn is_type(self) -> bool {
        matches!(self, SymbolKind::Class | SymbolKind::Type | SymbolKind::Alias)
    }

    /// Symbols that live in the term namespace.
    #[inline]
    pub const fn is_term(self) -> bool {
        matches!(self, SymbolKind::Module | SymbolKind::Value)
    }
}

/// Resolved info of a completed class symbol: the decomposed class
/// signature. Members live in the class's scope in the symbol table, not
/// here.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct ClassInfo {
    pub parents: Vec<TypeId>,
    pub self_type: Option<TypeId>,
    /// Type parameters in declaration order.
    pub type_params: Vec<SymbolId>,
}

/// A symbol's resolved info. Only canonical types appear here; the
/// finalization step that produces these rejects transient type forms.
#[derive(Clone, PartialEq, Debug)]
pub enum ResolvedInfo {
    /// A term's type, or an abstract type's bounds.
    Typed(TypeId),
    /// A type alias's right-hand side.
    Alias(TypeId),
    /// A class's decomposed signature.
    Class(ClassInfo),
}

impl ResolvedInfo {
    /// The info viewed as a plain type, for members contributing to
    /// refinements. Classes have no such view.
    pub fn as_type(&self) -> Option<TypeId> {
        match self {
            ResolvedInfo::Typed(t) | ResolvedInfo::Alias(t) => Some(*t),
            ResolvedInfo::Class(_) => None,
        }
    }
}

/// Three-state info slot.
#[derive(Clone, PartialEq, Debug)]
pub enum SymbolInfo {
    /// Not yet materialized; the completer re-enters the byte stream at
    /// `resume` (just past the fields read at creation time) and may read
    /// up to `end`.
    Pending { resume: usize, end: usize },
    /// Completion in progress. Observing this state is a corruption error.
    Completing,
    Resolved(ResolvedInfo),
}

/// One declaration.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: Name,
    pub kind: SymbolKind,
    pub owner: SymbolId,
    pub flags: SymbolFlags,
    pub info: SymbolInfo,
    /// Access boundary, when the declaration is qualified-private.
    pub private_within: Option<SymbolId>,
    /// Alias metadata of super-accessors and parameter-accessors.
    pub alias: Option<SymbolId>,
    /// For module values: the class that holds the module's members.
    pub module_class: Option<SymbolId>,
    pub annotations: Vec<crate::annot::AnnotId>,
    /// Sealed children, attached by the driver's second pass.
    pub children: Vec<SymbolId>,
    /// Declared in the module being decoded (as opposed to resolved from,
    /// or stubbed for, another module).
    pub is_local: bool,
}

impl Symbol {
    /// A fresh symbol with empty metadata; info must be filled by the caller.
    pub fn new(name: Name, kind: SymbolKind, owner: SymbolId, flags: SymbolFlags) -> Self {
        Symbol {
            name,
            kind,
            owner,
            flags,
            info: SymbolInfo::Pending { resume: 0, end: 0 },
            private_within: None,
            alias: None,
            module_class: None,
            annotations: Vec::new(),
            children: Vec::new(),
            is_local: false,
        }
    }

    #[inline]
    pub fn is_stub(&self) -> bool {
        self.flags.contains(SymbolFlags::STUB)
    }

    /// A module class: the class half of a module (object) declaration.
    #[inline]
    pub fn is_module_class(&self) -> bool {
        self.kind == SymbolKind::Class && self.flags.contains(SymbolFlags::MODULE)
    }
}

/// Per-owner member mapping.
///
/// Keeps both insertion order (scopes are enumerated when folding
/// refinements) and a name index tolerating overloads.
#[derive(Default, Clone, Debug)]
pub struct Scope {
    members: Vec<SymbolId>,
    by_name: FxHashMap<Name, SmallVec<[SymbolId; 2]>>,
}

impl Scope {
    /// Enter a member. Overloads (same name, distinct symbols) are legal.
    pub fn enter(&mut self, name: Name, sym: SymbolId) {
        self.members.push(sym);
        self.by_name.entry(name).or_default().push(sym);
    }

    /// All members sharing `name`, in insertion order.
    pub fn lookup(&self, name: Name) -> &[SymbolId] {
        self.by_name.get(&name).map_or(&[], |v| v.as_slice())
    }

    /// Members in insertion order.
    pub fn members(&self) -> &[SymbolId] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
}

/// Arena of symbols plus their per-owner scopes.
///
/// Slot 0 is always the root symbol, the owner of last resort that owns
/// itself. Handles are stable for the table's lifetime.
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    scopes: FxHashMap<SymbolId, Scope>,
}

impl SymbolTable {
    /// Create a table holding only the root symbol.
    pub fn new(interner: &StringInterner) -> Self {
        let root_name = interner.intern("<root>");
        let mut root = Symbol::new(
            root_name,
            SymbolKind::Class,
            SymbolId::from_raw(0),
            SymbolFlags::PACKAGE,
        );
        root.info = SymbolInfo::Resolved(ResolvedInfo::Class(ClassInfo::default()));
        SymbolTable {
            symbols: vec![root],
            scopes: FxHashMap::default(),
        }
    }

    /// The root symbol: its own owner, never entered in any scope.
    #[inline]
    pub fn root(&self) -> SymbolId {
        SymbolId::from_raw(0)
    }

    /// Allocate a fresh symbol.
    pub fn alloc(&mut self, sym: Symbol) -> SymbolId {
        let id = SymbolId::from_raw(
            u32::try_from(self.symbols.len()).unwrap_or_else(|_| panic!("symbol arena overflow")),
        );
        self.symbols.push(sym);
        id
    }

    #[inline]
    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.raw() as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.raw() as usize]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Enter `member` into `owner`'s scope, creating the scope on demand.
    pub fn enter(&mut self, owner: SymbolId, member: SymbolId) {
        let name = self.get(member).name;
        self.scopes.entry(owner).or_default().enter(name, member);
    }

    /// An owner's scope, if any member has been entered.
    pub fn scope(&self, owner: SymbolId) -> Option<&Scope> {
        self.scopes.get(&owner)
    }

    /// Remove and return an owner's scope. Refined types consume the scope
    /// of their carrier class this way, so its members cannot leak into
    /// later lookups against the same symbol.
    pub fn take_scope(&mut self, owner: SymbolId) -> Option<Scope> {
        self.scopes.remove(&owner)
    }

    /// Members of `owner` sharing `name`.
    pub fn lookup_member(&self, owner: SymbolId, name: Name) -> &[SymbolId] {
        self.scopes.get(&owner).map_or(&[], |s| s.lookup(name))
    }

    /// Dotted path of a symbol from the root, using `sep` between segments.
    ///
    /// Owner chains can be cyclic mid-decode, so the walk is depth-capped
    /// rather than trusted to terminate.
    pub fn full_name(&self, interner: &StringInterner, sym: SymbolId, sep: char) -> String {
        const DEPTH_LIMIT: usize = 128;
        let mut segments: Vec<&str> = Vec::new();
        let mut cur = sym;
        let mut depth = 0;
        while !cur.is_none() && cur != self.root() && depth < DEPTH_LIMIT {
            let s = self.get(cur);
            segments.push(interner.lookup(s.name));
            if s.owner == cur {
                break;
            }
            cur = s.owner;
            depth += 1;
        }
        segments.reverse();
        let mut out = String::new();
        for (i, seg) in segments.iter().enumerate() {
            if i > 0 {
                out.push(sep);
            }
            out.push_str(seg);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table_with(interner: &StringInterner) -> SymbolTable {
        SymbolTable::new(interner)
    }

    #[test]
    fn root_owns_itself() {
        let interner = StringInterner::new();
        let table = table_with(&interner);
        let root = table.root();
        assert_eq!(table.get(root).owner, root);
    }

    #[test]
    fn scope_keeps_insertion_order_and_overloads() {
        let interner = StringInterner::new();
        let mut table = table_with(&interner);
        let root = table.root();
        let name = interner.intern("apply");
        let a = table.alloc(Symbol::new(name, SymbolKind::Value, root, SymbolFlags::METHOD));
        let b = table.alloc(Symbol::new(name, SymbolKind::Value, root, SymbolFlags::METHOD));
        let other = table.alloc(Symbol::new(
            interner.intern("other"),
            SymbolKind::Value,
            root,
            SymbolFlags::empty(),
        ));
        table.enter(root, a);
        table.enter(root, other);
        table.enter(root, b);

        let scope = table.scope(root).unwrap();
        assert_eq!(scope.members(), &[a, other, b]);
        assert_eq!(scope.lookup(name), &[a, b]);
    }

    #[test]
    fn take_scope_clears_members() {
        let interner = StringInterner::new();
        let mut table = table_with(&interner);
        let root = table.root();
        let m = table.alloc(Symbol::new(
            interner.intern("m"),
            SymbolKind::Value,
            root,
            SymbolFlags::empty(),
        ));
        table.enter(root, m);
        assert_eq!(table.take_scope(root).unwrap().len(), 1);
        assert!(table.scope(root).is_none());
        assert!(table.lookup_member(root, table.get(m).name).is_empty());
    }

    #[test]
    fn full_name_walks_owner_chain() {
        let interner = StringInterner::new();
        let mut table = table_with(&interner);
        let root = table.root();
        let pkg = table.alloc(Symbol::new(
            interner.intern("demo"),
            SymbolKind::Class,
            root,
            SymbolFlags::PACKAGE,
        ));
        let cls = table.alloc(Symbol::new(
            interner.intern("Widget"),
            SymbolKind::Class,
            pkg,
            SymbolFlags::empty(),
        ));
        assert_eq!(table.full_name(&interner, cls, '$'), "demo$Widget");
        assert_eq!(table.full_name(&interner, cls, '.'), "demo.Widget");
    }

    #[test]
    fn full_name_survives_owner_cycles() {
        let interner = StringInterner::new();
        let mut table = table_with(&interner);
        let root = table.root();
        let a = table.alloc(Symbol::new(
            interner.intern("a"),
            SymbolKind::Class,
            root,
            SymbolFlags::empty(),
        ));
        let b = table.alloc(Symbol::new(
            interner.intern("b"),
            SymbolKind::Class,
            a,
            SymbolFlags::empty(),
        ));
        table.get_mut(a).owner = b;
        // Must terminate; exact rendering is unspecified under a cycle.
        let _ = table.full_name(&interner, b, '.');
    }
}
