//! Decoded types and the pool they live in.
//!
//! Types are stored in a session-owned pool and referenced by 32-bit
//! [`TypeId`] handles; a handful of fixed slots are pre-interned so the
//! common sentinels compare by constant. Two variants are *transient*:
//! [`Type::TempClassInfo`] (a class signature that has not been decomposed
//! yet) and [`Type::TempPoly`] (polymorphic bindings that have not been
//! distributed yet). Both exist only between a type entry's decode and the
//! owning symbol's completion; finalization rejects them anywhere else.

use veld_ir::Name;

use crate::annot::AnnotId;
use crate::constant::Constant;
use crate::name::PickleName;
use crate::symbol::SymbolId;

/// A 32-bit handle into the type pool.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    // === Pre-interned slots ===
    /// Absent type (uninitialized info, unpickled "no type").
    pub const NO_TYPE: TypeId = TypeId(0);
    /// Absent prefix.
    pub const NO_PREFIX: TypeId = TypeId(1);
    /// The top type.
    pub const ANY: TypeId = TypeId(2);
    /// The bottom type.
    pub const NOTHING: TypeId = TypeId(3);
    /// Error placeholder (stub infos).
    pub const ERROR: TypeId = TypeId(4);

    /// First index handed out by the pool.
    pub const FIRST_DYNAMIC: u32 = 5;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        TypeId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Debug for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            TypeId::NO_TYPE => write!(f, "TypeId::NO_TYPE"),
            TypeId::NO_PREFIX => write!(f, "TypeId::NO_PREFIX"),
            TypeId::ANY => write!(f, "TypeId::ANY"),
            TypeId::NOTHING => write!(f, "TypeId::NOTHING"),
            TypeId::ERROR => write!(f, "TypeId::ERROR"),
            TypeId(raw) => write!(f, "TypeId({raw})"),
        }
    }
}

/// How a type names a symbol.
///
/// Symbols declared in the module being decoded are bound by identity.
/// Symbols from other modules are bound by name, deferring identity
/// resolution to whatever load happens later; the implied signature is
/// "not a method", which is what singleton prefixes select.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SymRef {
    Sym(SymbolId),
    ByName(PickleName),
}

/// One named member of a refined type.
#[derive(Clone, PartialEq, Debug)]
pub struct Refinement {
    pub name: PickleName,
    pub info: TypeId,
}

/// One parameter of a method type.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct MethodParam {
    pub name: Name,
    pub ty: TypeId,
}

/// Declaration-site variance of a bound-carrier parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Variance {
    Invariant,
    Covariant,
    Contravariant,
}

/// One parameter of a bound-carrier lambda, synthesized when distributing
/// polymorphic bindings over a type member's bounds.
#[derive(Clone, PartialEq, Debug)]
pub struct LambdaParam {
    pub name: Name,
    pub variance: Variance,
    pub bounds: TypeId,
}

/// A decoded type.
#[derive(Clone, PartialEq, Debug)]
pub enum Type {
    /// Absent type.
    NoType,
    /// Absent prefix.
    NoPrefix,
    /// The top type.
    Any,
    /// The bottom type.
    Nothing,
    /// Error placeholder; propagates silently.
    Error,
    /// `C.this`.
    This(SymbolId),
    /// Singleton type `prefix.sym.type`.
    Single { prefix: TypeId, sym: SymRef },
    /// `C.super[...]`: a this-type narrowed to one of its base classes.
    Super { this_ty: TypeId, underlying: TypeId },
    /// Literal singleton type.
    Constant(Constant),
    /// Possibly-applied reference `prefix # sym [args]`.
    Ref {
        prefix: TypeId,
        sym: SymbolId,
        args: Vec<TypeId>,
    },
    /// `>: lo <: hi`.
    Bounds { lo: TypeId, hi: TypeId },
    /// Structural refinement of one or more parents.
    Refined {
        parents: Vec<TypeId>,
        refinements: Vec<Refinement>,
    },
    /// Method signature. Parameter symbols are flattened to (name, type)
    /// pairs at decode time.
    Method {
        params: Vec<MethodParam>,
        result: TypeId,
        implicit: bool,
    },
    /// Canonical polymorphic type: type parameters over a term's type.
    Poly { params: Vec<SymbolId>, body: TypeId },
    /// Bound-carrier lambda: the fully applied form a type member's
    /// higher-kinded bounds take after finalization.
    Lambda {
        params: Vec<LambdaParam>,
        body: TypeId,
    },
    /// Annotated type.
    Annotated { base: TypeId, annots: Vec<AnnotId> },

    // === Transient forms ===
    /// Not-yet-decomposed class signature. Only legal between decode and
    /// class completion.
    TempClassInfo {
        owner: SymbolId,
        parents: Vec<TypeId>,
    },
    /// Not-yet-distributed polymorphic bindings. Only legal between decode
    /// and the owning symbol's completion.
    TempPoly { params: Vec<SymbolId>, body: TypeId },
}

impl Type {
    /// Transient forms may not escape finalization.
    #[inline]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Type::TempClassInfo { .. } | Type::TempPoly { .. })
    }
}

/// Session-owned type pool.
///
/// Allocation is append-only; handles are stable for the session's
/// lifetime. No deduplication: the entry cache already guarantees each
/// pickled type decodes exactly once.
pub struct TypePool {
    items: Vec<Type>,
}

impl TypePool {
    pub fn new() -> Self {
        TypePool {
            items: vec![
                Type::NoType,
                Type::NoPrefix,
                Type::Any,
                Type::Nothing,
                Type::Error,
            ],
        }
    }

    pub fn alloc(&mut self, ty: Type) -> TypeId {
        // Reuse the fixed slots for sentinel values.
        match ty {
            Type::NoType => return TypeId::NO_TYPE,
            Type::NoPrefix => return TypeId::NO_PREFIX,
            Type::Any => return TypeId::ANY,
            Type::Nothing => return TypeId::NOTHING,
            Type::Error => return TypeId::ERROR,
            _ => {}
        }
        let id = TypeId::from_raw(
            u32::try_from(self.items.len()).unwrap_or_else(|_| panic!("type pool overflow")),
        );
        self.items.push(ty);
        id
    }

    #[inline]
    pub fn get(&self, id: TypeId) -> &Type {
        &self.items[id.raw() as usize]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check whether `sym` is reachable anywhere inside `ty`.
    ///
    /// Used for existential elimination (did a bound symbol escape?) and
    /// for the self-escape check on higher-kinded bounds.
    pub fn contains_symbol(&self, ty: TypeId, sym: SymbolId) -> bool {
        match self.get(ty) {
            Type::NoType | Type::NoPrefix | Type::Any | Type::Nothing | Type::Error => false,
            Type::This(s) => *s == sym,
            Type::Single { prefix, sym: target } => {
                matches!(target, SymRef::Sym(s) if *s == sym) || self.contains_symbol(*prefix, sym)
            }
            Type::Super { this_ty, underlying } => {
                self.contains_symbol(*this_ty, sym) || self.contains_symbol(*underlying, sym)
            }
            Type::Constant(c) => matches!(c, Constant::Enum(s) if *s == sym),
            Type::Ref { prefix, sym: s, args } => {
                *s == sym
                    || self.contains_symbol(*prefix, sym)
                    || args.iter().any(|&a| self.contains_symbol(a, sym))
            }
            Type::Bounds { lo, hi } => {
                self.contains_symbol(*lo, sym) || self.contains_symbol(*hi, sym)
            }
            Type::Refined { parents, refinements } => {
                parents.iter().any(|&p| self.contains_symbol(p, sym))
                    || refinements.iter().any(|r| self.contains_symbol(r.info, sym))
            }
            Type::Method { params, result, .. } => {
                self.contains_symbol(*result, sym)
                    || params.iter().any(|p| self.contains_symbol(p.ty, sym))
            }
            Type::Poly { params, body } | Type::TempPoly { params, body } => {
                params.contains(&sym) || self.contains_symbol(*body, sym)
            }
            Type::Lambda { params, body } => {
                self.contains_symbol(*body, sym)
                    || params.iter().any(|p| self.contains_symbol(p.bounds, sym))
            }
            Type::Annotated { base, .. } => self.contains_symbol(*base, sym),
            Type::TempClassInfo { owner, parents } => {
                *owner == sym || parents.iter().any(|&p| self.contains_symbol(p, sym))
            }
        }
    }

    /// Rebuild `ty` with every direct reference to `from` replaced by `to`.
    ///
    /// A "direct reference" is a this-type of `from`, a singleton over
    /// `from`, or a reference headed by `from` — applied or not; an
    /// application whose head is gone has nothing left to apply, so the
    /// whole reference collapses to `to`. Other occurrences are rewritten
    /// recursively. Subtrees not containing `from` are shared, not copied.
    pub fn subst_symbol(&mut self, ty: TypeId, from: SymbolId, to: TypeId) -> TypeId {
        if !self.contains_symbol(ty, from) {
            return ty;
        }
        match self.get(ty).clone() {
            Type::This(s) if s == from => to,
            Type::Single { sym: SymRef::Sym(s), .. } if s == from => to,
            Type::Single { prefix, sym } => {
                let prefix = self.subst_symbol(prefix, from, to);
                self.alloc(Type::Single { prefix, sym })
            }
            Type::Super { this_ty, underlying } => {
                let this_ty = self.subst_symbol(this_ty, from, to);
                let underlying = self.subst_symbol(underlying, from, to);
                self.alloc(Type::Super { this_ty, underlying })
            }
            Type::Ref { sym, .. } if sym == from => to,
            Type::Ref { prefix, sym, args } => {
                let prefix = self.subst_symbol(prefix, from, to);
                let args = args
                    .into_iter()
                    .map(|a| self.subst_symbol(a, from, to))
                    .collect();
                self.alloc(Type::Ref { prefix, sym, args })
            }
            Type::Bounds { lo, hi } => {
                let lo = self.subst_symbol(lo, from, to);
                let hi = self.subst_symbol(hi, from, to);
                self.alloc(Type::Bounds { lo, hi })
            }
            Type::Refined { parents, refinements } => {
                let parents = parents
                    .into_iter()
                    .map(|p| self.subst_symbol(p, from, to))
                    .collect();
                let refinements = refinements
                    .into_iter()
                    .map(|r| Refinement {
                        name: r.name,
                        info: self.subst_symbol(r.info, from, to),
                    })
                    .collect();
                self.alloc(Type::Refined { parents, refinements })
            }
            Type::Method { params, result, implicit } => {
                let params = params
                    .into_iter()
                    .map(|p| MethodParam {
                        name: p.name,
                        ty: self.subst_symbol(p.ty, from, to),
                    })
                    .collect();
                let result = self.subst_symbol(result, from, to);
                self.alloc(Type::Method { params, result, implicit })
            }
            Type::Poly { params, body } => {
                let body = self.subst_symbol(body, from, to);
                self.alloc(Type::Poly { params, body })
            }
            Type::TempPoly { params, body } => {
                let body = self.subst_symbol(body, from, to);
                self.alloc(Type::TempPoly { params, body })
            }
            Type::Lambda { params, body } => {
                let params = params
                    .into_iter()
                    .map(|p| LambdaParam {
                        name: p.name,
                        variance: p.variance,
                        bounds: self.subst_symbol(p.bounds, from, to),
                    })
                    .collect();
                let body = self.subst_symbol(body, from, to);
                self.alloc(Type::Lambda { params, body })
            }
            Type::Annotated { base, annots } => {
                let base = self.subst_symbol(base, from, to);
                self.alloc(Type::Annotated { base, annots })
            }
            Type::TempClassInfo { owner, parents } => {
                let parents = parents
                    .into_iter()
                    .map(|p| self.subst_symbol(p, from, to))
                    .collect();
                self.alloc(Type::TempClassInfo { owner, parents })
            }
            // contains_symbol returned true, so a sentinel is unreachable.
            other => self.alloc(other),
        }
    }
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sentinels_are_pre_interned() {
        let mut pool = TypePool::new();
        assert_eq!(pool.alloc(Type::NoType), TypeId::NO_TYPE);
        assert_eq!(pool.alloc(Type::Any), TypeId::ANY);
        assert_eq!(pool.alloc(Type::Error), TypeId::ERROR);
        assert_eq!(pool.len(), TypeId::FIRST_DYNAMIC as usize);
    }

    #[test]
    fn contains_symbol_sees_through_structure() {
        let mut pool = TypePool::new();
        let bound = SymbolId::from_raw(7);
        let other = SymbolId::from_raw(8);
        let inner = pool.alloc(Type::Ref {
            prefix: TypeId::NO_PREFIX,
            sym: bound,
            args: vec![],
        });
        let outer = pool.alloc(Type::Ref {
            prefix: TypeId::NO_PREFIX,
            sym: other,
            args: vec![inner],
        });
        assert!(pool.contains_symbol(outer, bound));
        assert!(pool.contains_symbol(outer, other));
        assert!(!pool.contains_symbol(outer, SymbolId::from_raw(9)));
    }

    #[test]
    fn subst_replaces_direct_references() {
        let mut pool = TypePool::new();
        let bound = SymbolId::from_raw(7);
        let direct = pool.alloc(Type::Ref {
            prefix: TypeId::NO_PREFIX,
            sym: bound,
            args: vec![],
        });
        let replaced = pool.subst_symbol(direct, bound, TypeId::ANY);
        assert_eq!(replaced, TypeId::ANY);
    }

    #[test]
    fn subst_rewrites_nested_argument_positions() {
        let mut pool = TypePool::new();
        let bound = SymbolId::from_raw(7);
        let carrier = SymbolId::from_raw(8);
        let arg = pool.alloc(Type::Ref {
            prefix: TypeId::NO_PREFIX,
            sym: bound,
            args: vec![],
        });
        let applied = pool.alloc(Type::Ref {
            prefix: TypeId::NO_PREFIX,
            sym: carrier,
            args: vec![arg],
        });
        let rewritten = pool.subst_symbol(applied, bound, TypeId::ANY);
        assert!(!pool.contains_symbol(rewritten, bound));
        match pool.get(rewritten) {
            Type::Ref { sym, args, .. } => {
                assert_eq!(*sym, carrier);
                assert_eq!(args, &[TypeId::ANY]);
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn subst_collapses_applied_references_to_the_replacement() {
        let mut pool = TypePool::new();
        let bound = SymbolId::from_raw(7);
        let arg = pool.alloc(Type::This(SymbolId::from_raw(8)));
        let applied = pool.alloc(Type::Ref {
            prefix: TypeId::NO_PREFIX,
            sym: bound,
            args: vec![arg],
        });
        let rewritten = pool.subst_symbol(applied, bound, TypeId::ANY);
        assert_eq!(rewritten, TypeId::ANY);
        assert!(!pool.contains_symbol(rewritten, bound));
    }

    #[test]
    fn subst_shares_untouched_subtrees() {
        let mut pool = TypePool::new();
        let bound = SymbolId::from_raw(7);
        let unrelated = pool.alloc(Type::This(SymbolId::from_raw(9)));
        assert_eq!(pool.subst_symbol(unrelated, bound, TypeId::ANY), unrelated);
    }
}
