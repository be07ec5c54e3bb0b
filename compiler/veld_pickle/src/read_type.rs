//! Type decoding.
//!
//! One function per session, dispatched by type tag. The two transient
//! forms produced here — not-yet-distributed polymorphic bindings and
//! not-yet-decomposed class signatures — are consumed by symbol completion;
//! nothing else may observe them.
//!
//! Two situations deliberately degrade instead of failing: higher-kinded
//! bounds whose parameter escapes into its own bound, and existential types
//! that cannot be eliminated locally. Both substitute a conservative
//! approximation and report through the diagnostic queue.

use veld_diagnostic::{Diagnostic, ErrorCode};

use crate::error::{Result, UnpickleError};
use crate::format::EntryTag;
use crate::name::{NameKind, PickleName};
use crate::read_symbol;
use crate::session::Unpickler;
use crate::symbol::{SymbolFlags, SymbolId, SymbolInfo, SymbolKind};
use crate::ty::{
    LambdaParam, MethodParam, Refinement, SymRef, Type, TypeId, Variance,
};

/// Decode one type entry. Cursor is just past the entry's length field.
pub(crate) fn read_type(ses: &mut Unpickler<'_>, tag: EntryTag, end: usize) -> Result<TypeId> {
    match tag {
        EntryTag::NoTpe => Ok(TypeId::NO_TYPE),
        EntryTag::NoPrefixTpe => Ok(TypeId::NO_PREFIX),

        EntryTag::ThisTpe => {
            let sym = ses.read_symbol_ref()?;
            // A refinement class's this-type *is* the structural type it
            // was synthesized for.
            if let Some(&registered) = ses.refinements.get(&sym) {
                return Ok(registered);
            }
            Ok(ses.types.alloc(Type::This(sym)))
        }

        EntryTag::SingleTpe => {
            let prefix = ses.read_type_ref()?;
            let sym = ses.read_symbol_ref()?;
            // Local symbols bind by identity; foreign ones by name, leaving
            // identity to whichever load materializes them. The implied
            // signature is "not a method", which is all a singleton prefix
            // can select.
            let sym_ref = if sym.is_none() || ses.table.get(sym).is_local {
                SymRef::Sym(sym)
            } else {
                let s = ses.table.get(sym);
                let kind = if s.kind.is_type() {
                    NameKind::Type
                } else {
                    NameKind::Term
                };
                SymRef::ByName(PickleName { kind, text: s.name })
            };
            Ok(ses.types.alloc(Type::Single {
                prefix,
                sym: sym_ref,
            }))
        }

        EntryTag::SuperTpe => {
            let this_ty = ses.read_type_ref()?;
            let underlying = ses.read_type_ref()?;
            Ok(ses.types.alloc(Type::Super { this_ty, underlying }))
        }

        EntryTag::ConstantTpe => {
            let c = ses.read_const_ref()?;
            Ok(ses.types.alloc(Type::Constant(c)))
        }

        EntryTag::TypeRefTpe => {
            let mut prefix = ses.read_type_ref()?;
            let sym = ses.read_symbol_ref()?;
            let mut args = Vec::new();
            while ses.buf.pos() < end {
                args.push(ses.read_type_ref()?);
            }
            // An ancestor's member pickled relative to `this` instead of
            // `super`: rewrite the prefix to a super-type over the class
            // that actually declares the member.
            if let Type::This(cls) = *ses.types.get(prefix) {
                let owner = if sym.is_none() {
                    SymbolId::NONE
                } else {
                    ses.table.get(sym).owner
                };
                if !owner.is_none()
                    && owner != cls
                    && ses.table.get(owner).kind == SymbolKind::Class
                    && !ses.table.get(owner).flags.contains(SymbolFlags::PACKAGE)
                {
                    let base = ses.types.alloc(Type::Ref {
                        prefix: TypeId::NO_PREFIX,
                        sym: owner,
                        args: Vec::new(),
                    });
                    prefix = ses.types.alloc(Type::Super {
                        this_ty: prefix,
                        underlying: base,
                    });
                }
            }
            Ok(ses.types.alloc(Type::Ref { prefix, sym, args }))
        }

        EntryTag::TypeBoundsTpe => {
            let lo = ses.read_type_ref()?;
            let hi = ses.read_type_ref()?;
            Ok(ses.types.alloc(Type::Bounds { lo, hi }))
        }

        EntryTag::RefinedTpe => read_refined(ses, end),

        EntryTag::ClassInfoTpe => {
            let owner = ses.read_symbol_ref()?;
            let mut parents = Vec::new();
            while ses.buf.pos() < end {
                parents.push(ses.read_type_ref()?);
            }
            Ok(ses.types.alloc(Type::TempClassInfo { owner, parents }))
        }

        EntryTag::MethodTpe | EntryTag::ImplicitMethodTpe => read_method(ses, tag, end),

        EntryTag::PolyTpe => {
            let body = ses.read_type_ref()?;
            let mut params = Vec::new();
            while ses.buf.pos() < end {
                params.push(ses.read_symbol_ref()?);
            }
            // A parameterless polymorphic wrapper adds nothing.
            if params.is_empty() {
                Ok(body)
            } else {
                Ok(ses.types.alloc(Type::TempPoly { params, body }))
            }
        }

        EntryTag::AnnotatedTpe => {
            let base = ses.read_type_ref()?;
            let mut annots = Vec::new();
            while ses.buf.pos() < end {
                let r = ses.buf.read_nat()?;
                annots.push(ses.annot_at(r)?);
            }
            Ok(ses.types.alloc(Type::Annotated { base, annots }))
        }

        EntryTag::ExistentialTpe => {
            let body = ses.read_type_ref()?;
            let mut bound = Vec::new();
            while ses.buf.pos() < end {
                bound.push(ses.read_symbol_ref()?);
            }
            eliminate_existential(ses, body, &bound)
        }

        EntryTag::DeBruijnTpe => Err(UnpickleError::unsupported(
            ses.buf.pos(),
            "de Bruijn indexed type",
        )),

        other => Err(UnpickleError::corrupt(
            ses.buf.pos(),
            format!("{other:?} is not a type tag"),
        )),
    }
}

/// Refined type: a synthetic class reference plus parents; the class's
/// scope holds the refinement members and is consumed here so it cannot
/// leak into later lookups against the same symbol.
fn read_refined(ses: &mut Unpickler<'_>, end: usize) -> Result<TypeId> {
    let clazz = ses.read_symbol_ref()?;
    let mut parents = Vec::new();
    while ses.buf.pos() < end {
        parents.push(ses.read_type_ref()?);
    }
    let members: Vec<SymbolId> = ses
        .table
        .take_scope(clazz)
        .map(|s| s.members().to_vec())
        .unwrap_or_default();
    if members.is_empty() {
        return Ok(if parents.len() == 1 {
            parents[0]
        } else {
            ses.types.alloc(Type::Refined {
                parents,
                refinements: Vec::new(),
            })
        });
    }
    let mut refinements = Vec::with_capacity(members.len());
    for m in members {
        read_symbol::ensure_completed(ses, m)?;
        let s = ses.table.get(m);
        let name = PickleName {
            kind: if s.kind.is_type() {
                NameKind::Type
            } else {
                NameKind::Term
            },
            text: s.name,
        };
        let info = resolved_type_of(ses, m).ok_or_else(|| {
            UnpickleError::corrupt(ses.buf.pos(), "refinement member has no member type")
        })?;
        refinements.push(Refinement { name, info });
    }
    let ty = ses.types.alloc(Type::Refined {
        parents,
        refinements,
    });
    if ses.refinements.insert(clazz, ty).is_some() {
        return Err(UnpickleError::corrupt(
            ses.buf.pos(),
            "refinement class registered twice",
        ));
    }
    Ok(ty)
}

/// Method signature: result type, then parameter symbols flattened to
/// (name, type) pairs. The implicit marker is either the legacy tag or a
/// flag on the first parameter.
fn read_method(ses: &mut Unpickler<'_>, tag: EntryTag, end: usize) -> Result<TypeId> {
    let result = ses.read_type_ref()?;
    let mut param_syms = Vec::new();
    while ses.buf.pos() < end {
        param_syms.push(ses.read_symbol_ref()?);
    }
    let mut implicit = tag == EntryTag::ImplicitMethodTpe;
    let mut params = Vec::with_capacity(param_syms.len());
    for (i, &p) in param_syms.iter().enumerate() {
        read_symbol::ensure_completed(ses, p)?;
        let s = ses.table.get(p);
        if i == 0 && s.flags.contains(SymbolFlags::IMPLICIT) {
            implicit = true;
        }
        let name = s.name;
        let ty = resolved_type_of(ses, p).ok_or_else(|| {
            UnpickleError::corrupt(ses.buf.pos(), "method parameter has no type")
        })?;
        params.push(MethodParam { name, ty });
    }
    Ok(ses.types.alloc(Type::Method {
        params,
        result,
        implicit,
    }))
}

fn resolved_type_of(ses: &Unpickler<'_>, sym: SymbolId) -> Option<TypeId> {
    match &ses.table.get(sym).info {
        SymbolInfo::Resolved(info) => info.as_type(),
        _ => None,
    }
}

fn upper_bound_of(ses: &Unpickler<'_>, sym: SymbolId) -> TypeId {
    match resolved_type_of(ses, sym) {
        Some(t) => match *ses.types.get(t) {
            Type::Bounds { hi, .. } => hi,
            _ => t,
        },
        None => TypeId::ANY,
    }
}

/// Try to eliminate an existential's bound symbols.
///
/// Refinement members whose declared type is exactly a bound symbol are
/// rewritten to that symbol's bounds; if any bound symbol is still
/// reachable afterwards, every occurrence is substituted with the symbol's
/// upper bound and then `Any`, and the approximation is reported. The
/// result never contains a bound symbol.
fn eliminate_existential(
    ses: &mut Unpickler<'_>,
    body: TypeId,
    bound: &[SymbolId],
) -> Result<TypeId> {
    for &b in bound {
        read_symbol::ensure_completed(ses, b)?;
    }
    let mut result = body;
    if let Type::Refined {
        parents,
        refinements,
    } = ses.types.get(body).clone()
    {
        let mut changed = false;
        let rewritten: Vec<Refinement> = refinements
            .into_iter()
            .map(|r| match direct_bound_ref(ses, r.info, bound) {
                Some(b) => {
                    changed = true;
                    Refinement {
                        name: r.name,
                        info: resolved_type_of(ses, b).unwrap_or(TypeId::ANY),
                    }
                }
                None => r,
            })
            .collect();
        if changed {
            result = ses.types.alloc(Type::Refined {
                parents,
                refinements: rewritten,
            });
        }
    }
    if bound.iter().any(|&b| ses.types.contains_symbol(result, b)) {
        for &b in bound {
            let hi = upper_bound_of(ses, b);
            result = ses.types.subst_symbol(result, b, hi);
        }
        // Upper bounds can mention other binders of the same group.
        for &b in bound {
            if ses.types.contains_symbol(result, b) {
                result = ses.types.subst_symbol(result, b, TypeId::ANY);
            }
        }
        ses.diags.emit(
            Diagnostic::warning(ErrorCode::P0002)
                .with_message(
                    "existential type could not be eliminated; \
                     approximated bound symbols by their upper bounds",
                )
                .with_offset(ses.buf.pos()),
        );
    }
    Ok(result)
}

/// Is `ty` exactly an unapplied reference to one of `bound`?
fn direct_bound_ref(ses: &Unpickler<'_>, ty: TypeId, bound: &[SymbolId]) -> Option<SymbolId> {
    match ses.types.get(ty) {
        Type::Ref { sym, args, .. } if args.is_empty() && bound.contains(sym) => Some(*sym),
        _ => None,
    }
}

/// Convert an abstract type member's polymorphic bindings into its
/// higher-kinded bounds: variance-tagged bound-carrier parameters applied
/// over each side of the member's bounds.
///
/// A parameter that escapes into its own bound has no finite expansion;
/// such occurrences are substituted with `Any` and reported.
pub(crate) fn higher_kinded_bounds(
    ses: &mut Unpickler<'_>,
    params: Vec<SymbolId>,
    body: TypeId,
) -> Result<TypeId> {
    let mut lambda_params = Vec::with_capacity(params.len());
    for &p in &params {
        read_symbol::ensure_completed(ses, p)?;
        let (name, flags) = {
            let s = ses.table.get(p);
            (s.name, s.flags)
        };
        let variance = if flags.contains(SymbolFlags::COVARIANT) {
            Variance::Covariant
        } else if flags.contains(SymbolFlags::CONTRAVARIANT) {
            Variance::Contravariant
        } else {
            Variance::Invariant
        };
        let mut bounds = resolved_type_of(ses, p).unwrap_or(TypeId::ERROR);
        for &q in &params {
            if ses.types.contains_symbol(bounds, q) {
                bounds = ses.types.subst_symbol(bounds, q, TypeId::ANY);
                ses.diags.emit(
                    Diagnostic::warning(ErrorCode::P0001)
                        .with_message(format!(
                            "type parameter `{}` escapes into its own bound; substituted `Any`",
                            ses.interner.lookup(ses.table.get(q).name)
                        ))
                        .with_offset(ses.buf.pos()),
                );
            }
        }
        lambda_params.push(LambdaParam {
            name,
            variance,
            bounds,
        });
    }
    match ses.types.get(body).clone() {
        Type::Bounds { lo, hi } => {
            let lo_carrier = ses.types.alloc(Type::Lambda {
                params: lambda_params.clone(),
                body: lo,
            });
            let hi_carrier = ses.types.alloc(Type::Lambda {
                params: lambda_params,
                body: hi,
            });
            Ok(ses.types.alloc(Type::Bounds {
                lo: lo_carrier,
                hi: hi_carrier,
            }))
        }
        _ => Ok(ses.types.alloc(Type::Lambda {
            params: lambda_params,
            body,
        })),
    }
}
