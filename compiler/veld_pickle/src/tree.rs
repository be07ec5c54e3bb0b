//! Decoded syntax trees.
//!
//! Trees ride along in pickles for two consumers: annotation arguments and
//! inlineable method bodies. Every node except the empty tree carries a
//! type; nodes that bind a declaration also carry its symbol. A handful of
//! legacy shapes are deliberately not reconstructed and fail decoding with
//! an unsupported-construct error (see [`crate::format::TreeTag`]).

use veld_ir::Name;

use crate::constant::Constant;
use crate::name::PickleName;
use crate::symbol::{SymbolFlags, SymbolId};
use crate::ty::TypeId;

/// A 32-bit handle into the tree arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct TreeId(u32);

impl TreeId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        TreeId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Modifier set attached to definition trees.
///
/// On the wire the flag word is split into two 32-bit varints (high half
/// first), followed by the access-boundary name.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Modifiers {
    pub flags: SymbolFlags,
    pub private_within: Name,
}

/// One clause of an import tree: `from` as declared, `to` as visible after
/// the import (the two coincide unless the clause renames).
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ImportSelector {
    pub from: PickleName,
    pub to: PickleName,
}

/// A decoded tree node: the shape plus the type every non-empty node
/// carries.
#[derive(Clone, PartialEq, Debug)]
pub struct TreeNode {
    pub ty: TypeId,
    pub tree: Tree,
}

/// Tree shapes.
///
/// Definition shapes carry the symbol they declare; reference shapes carry
/// the symbol they resolve to (possibly [`SymbolId::NONE`] when the
/// producer left it unbound).
#[derive(Clone, PartialEq, Debug)]
pub enum Tree {
    Empty,
    PackageDef {
        sym: SymbolId,
        pid: TreeId,
        stats: Vec<TreeId>,
    },
    ModuleDef {
        sym: SymbolId,
        mods: Modifiers,
        name: PickleName,
        body: TreeId,
    },
    ValDef {
        sym: SymbolId,
        mods: Modifiers,
        name: PickleName,
        tpt: TreeId,
        rhs: TreeId,
    },
    DefDef {
        sym: SymbolId,
        mods: Modifiers,
        name: PickleName,
        type_params: Vec<TreeId>,
        param_lists: Vec<Vec<TreeId>>,
        tpt: TreeId,
        rhs: TreeId,
    },
    TypeDef {
        sym: SymbolId,
        mods: Modifiers,
        name: PickleName,
        type_params: Vec<TreeId>,
        rhs: TreeId,
    },
    LabelDef {
        sym: SymbolId,
        name: PickleName,
        params: Vec<TreeId>,
        rhs: TreeId,
    },
    Import {
        sym: SymbolId,
        expr: TreeId,
        selectors: Vec<ImportSelector>,
    },
    Template {
        sym: SymbolId,
        parents: Vec<TreeId>,
        self_val: TreeId,
        body: Vec<TreeId>,
    },
    Block {
        expr: TreeId,
        stats: Vec<TreeId>,
    },
    CaseDef {
        pat: TreeId,
        guard: TreeId,
        body: TreeId,
    },
    Alternative {
        alts: Vec<TreeId>,
    },
    Star {
        elem: TreeId,
    },
    Bind {
        sym: SymbolId,
        name: PickleName,
        body: TreeId,
    },
    UnApply {
        fun: TreeId,
        args: Vec<TreeId>,
    },
    Function {
        sym: SymbolId,
        params: Vec<TreeId>,
        body: TreeId,
    },
    Assign {
        lhs: TreeId,
        rhs: TreeId,
    },
    If {
        cond: TreeId,
        then_branch: TreeId,
        else_branch: TreeId,
    },
    Match {
        selector: TreeId,
        cases: Vec<TreeId>,
    },
    Return {
        sym: SymbolId,
        expr: TreeId,
    },
    Try {
        block: TreeId,
        finalizer: TreeId,
        catches: Vec<TreeId>,
    },
    Throw {
        expr: TreeId,
    },
    New {
        tpt: TreeId,
    },
    Typed {
        expr: TreeId,
        tpt: TreeId,
    },
    TypeApply {
        fun: TreeId,
        args: Vec<TreeId>,
    },
    Apply {
        fun: TreeId,
        args: Vec<TreeId>,
    },
    Super {
        sym: SymbolId,
        qual: TreeId,
        mix: Name,
    },
    This {
        sym: SymbolId,
        qual: Name,
    },
    Select {
        sym: SymbolId,
        qualifier: TreeId,
        name: PickleName,
    },
    Ident {
        sym: SymbolId,
        name: PickleName,
    },
    Literal {
        value: Constant,
    },
    /// A synthetic type tree; its meaning is entirely the carried type.
    TypeTree,
    Annotated {
        annot: TreeId,
        arg: TreeId,
    },
    SingletonTypeTree {
        reference: TreeId,
    },
    SelectFromTypeTree {
        qualifier: TreeId,
        name: PickleName,
    },
    CompoundTypeTree {
        template: TreeId,
    },
    AppliedTypeTree {
        tpt: TreeId,
        args: Vec<TreeId>,
    },
    TypeBoundsTree {
        lo: TreeId,
        hi: TreeId,
    },
    ExistentialTypeTree {
        tpt: TreeId,
        where_clauses: Vec<TreeId>,
    },
}

/// Session-owned tree arena.
#[derive(Default)]
pub struct TreeArena {
    items: Vec<TreeNode>,
}

impl TreeArena {
    pub fn new() -> Self {
        TreeArena::default()
    }

    pub fn alloc(&mut self, node: TreeNode) -> TreeId {
        let id = TreeId::from_raw(
            u32::try_from(self.items.len()).unwrap_or_else(|_| panic!("tree arena overflow")),
        );
        self.items.push(node);
        id
    }

    #[inline]
    pub fn get(&self, id: TreeId) -> &TreeNode {
        &self.items[id.raw() as usize]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
