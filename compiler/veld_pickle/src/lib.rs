//! Binary metadata decoder for Veld.
//!
//! A compiled module's metadata — symbol declarations, their types,
//! annotations, and optionally syntax trees — travels as a compact
//! append-only pickle. This crate decodes one such buffer back into a live
//! declaration graph without re-running semantic analysis, tolerating
//! forward references, mutual recursion between symbols and types, and
//! constructs that only become well-formed once surrounding context
//! resolves.
//!
//! # Design
//!
//! - One [`Unpickler`] session per buffer: it owns the entry index, the
//!   write-once decode cache, and the arenas the graph lives in. No state
//!   outlives a session.
//! - Symbols decode shell-first and complete lazily: owner/member cycles
//!   see an incomplete shell instead of looping, and a symbol's full type
//!   is materialized on first demand by re-entering the byte stream.
//! - Cross-module references resolve through a fallback chain that ends in
//!   a stub symbol; an unresolvable reference never aborts a decode.
//! - Fatal failures (version mismatch, corruption) surface as
//!   [`UnpickleError`]; best-effort type approximations surface as warnings
//!   on the session's diagnostic queue instead.

mod annot;
mod buf;
mod constant;
mod error;
mod format;
mod index;
mod name;
mod read_symbol;
mod read_tree;
mod read_type;
mod session;
mod symbol;
mod tree;
mod ty;

pub use annot::{AnnotArena, AnnotArg, AnnotArgs, AnnotId, Annotation};
pub use constant::Constant;
pub use error::{Result, UnpickleError};
pub use format::{EntryTag, TreeTag, MAJOR_VERSION, MINOR_VERSION};
pub use name::{NameKind, PickleName};
pub use session::{MissingSymbolResolver, RootSymbols, StubOnlyResolver, Unpickler};
pub use symbol::{
    ClassInfo, ResolvedInfo, Scope, Symbol, SymbolFlags, SymbolId, SymbolInfo, SymbolKind,
    SymbolTable,
};
pub use tree::{ImportSelector, Modifiers, Tree, TreeArena, TreeId, TreeNode};
pub use ty::{
    LambdaParam, MethodParam, Refinement, SymRef, Type, TypeId, TypePool, Variance,
};
