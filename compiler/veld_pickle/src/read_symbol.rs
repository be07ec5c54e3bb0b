//! Symbol decoding and completion.
//!
//! Local symbols come out of their entry as shells: name, owner, and flags
//! are read eagerly, the info slot records where the rest of the entry
//! starts, and the decode-cache slot is fulfilled before anything else is
//! followed. External references resolve immediately through an ordered
//! fallback chain that ends in a stub, never in an error.

use tracing::debug;

use crate::error::{Result, UnpickleError};
use crate::format::EntryTag;
use crate::name::{NameKind, PickleName};
use crate::read_type;
use crate::session::{Entry, Unpickler};
use crate::symbol::{
    ClassInfo, ResolvedInfo, Symbol, SymbolFlags, SymbolId, SymbolInfo, SymbolKind,
};
use crate::ty::{Type, TypeId};

fn kind_of(tag: EntryTag) -> SymbolKind {
    match tag {
        EntryTag::TypeSym => SymbolKind::Type,
        EntryTag::AliasSym => SymbolKind::Alias,
        EntryTag::ClassSym => SymbolKind::Class,
        EntryTag::ModuleSym => SymbolKind::Module,
        _ => SymbolKind::Value,
    }
}

/// Decode a locally declared symbol entry into a shell whose info is a
/// deferred completer.
pub(crate) fn read_local_symbol(
    ses: &mut Unpickler<'_>,
    r: u32,
    tag: EntryTag,
    end: usize,
) -> Result<Entry> {
    let name = ses.read_name_ref()?;
    let owner = ses.read_symbol_ref()?;
    let flags = SymbolFlags::from_bits_retain(ses.buf.read_long_nat()?);
    let resume = ses.buf.pos();
    let kind = kind_of(tag);

    let sym = match matching_root(ses, name, owner, tag, flags) {
        // The caller already holds this identity; complete it in place.
        Some(root) => {
            let s = ses.table.get_mut(root);
            s.flags = flags;
            s.info = SymbolInfo::Pending { resume, end };
            s.is_local = true;
            root
        }
        None => {
            let mut s = Symbol::new(name.text, kind, owner, flags);
            s.info = SymbolInfo::Pending { resume, end };
            s.is_local = true;
            ses.table.alloc(s)
        }
    };
    // Shell-first: back-references reached through the info peek or the
    // deferred type-parameter read must see this entry as decoded.
    ses.fulfil_symbol(r, sym);

    // Peek the info reference (without decoding it) past the optional
    // access-boundary reference.
    let r1 = ses.buf.read_nat()?;
    let info_ref = if ses.tag_at(r1)?.is_symbol_ref() {
        ses.buf.read_nat()?
    } else {
        r1
    };
    if kind == SymbolKind::Class && ses.tag_at(info_ref)? == EntryTag::PolyTpe {
        ses.defer_type_params(sym, info_ref);
    }

    let is_module_class = kind == SymbolKind::Class && flags.contains(SymbolFlags::MODULE);
    if is_module_class {
        ses.module_classes.insert((owner, name.text), sym);
        // Link a companion value decoded before its class.
        let companions: Vec<SymbolId> = ses
            .table
            .lookup_member(owner, name.text)
            .iter()
            .copied()
            .filter(|&m| ses.table.get(m).kind == SymbolKind::Module)
            .collect();
        for m in companions {
            ses.table.get_mut(m).module_class.get_or_insert(sym);
        }
    } else if kind == SymbolKind::Module {
        if let Some(&cls) = ses.module_classes.get(&(owner, name.text)) {
            ses.table.get_mut(sym).module_class = Some(cls);
        }
    }

    if should_enter(ses, sym, owner, kind, flags, name) {
        ses.table.enter(owner, sym);
    }
    Ok(Entry::Symbol(sym))
}

/// Symbols that never sit in their owner's scope: roots (already entered by
/// whoever installed them), existential binders, parameters (class type
/// parameters are entered later, in declaration order), module classes, and
/// synthetic refinement classes. Everything else is a member of a class
/// owner.
fn should_enter(
    ses: &Unpickler<'_>,
    sym: SymbolId,
    owner: SymbolId,
    kind: SymbolKind,
    flags: SymbolFlags,
    name: PickleName,
) -> bool {
    if is_root(ses, sym) {
        return false;
    }
    if flags.intersects(SymbolFlags::EXISTENTIAL | SymbolFlags::PARAM) {
        return false;
    }
    if kind == SymbolKind::Class
        && (flags.contains(SymbolFlags::MODULE) || ses.is_refinement_name(name.text))
    {
        return false;
    }
    !owner.is_none() && ses.table.get(owner).kind == SymbolKind::Class
}

fn is_root(ses: &Unpickler<'_>, sym: SymbolId) -> bool {
    ses.roots().is_some_and(|r| {
        sym == r.class_root || sym == r.module_root || sym == r.module_class_root
    })
}

/// The pre-existing identity this (name, owner, kind) triple must complete
/// in place, if any. A root can be claimed only once.
fn matching_root(
    ses: &Unpickler<'_>,
    name: PickleName,
    owner: SymbolId,
    tag: EntryTag,
    flags: SymbolFlags,
) -> Option<SymbolId> {
    let roots = ses.roots()?;
    let candidate = match tag {
        EntryTag::ClassSym if flags.contains(SymbolFlags::MODULE) => roots.module_class_root,
        EntryTag::ClassSym => roots.class_root,
        EntryTag::ModuleSym => roots.module_root,
        _ => return None,
    };
    let c = ses.table.get(candidate);
    (!c.is_local && c.name == name.text && c.owner == owner).then_some(candidate)
}

/// Decode an external reference entry: name, optional owner, then the
/// fallback resolution chain.
pub(crate) fn read_ext_symbol(
    ses: &mut Unpickler<'_>,
    tag: EntryTag,
    end: usize,
) -> Result<Entry> {
    let name = ses.read_name_ref()?;
    let owner = if ses.buf.pos() < end {
        let o = ses.read_symbol_ref()?;
        if o.is_none() {
            ses.table.root()
        } else {
            o
        }
    } else {
        ses.table.root()
    };
    resolve_external(ses, tag, owner, name).map(Entry::Symbol)
}

/// Ordered fallback chain for cross-module references; first match wins and
/// the final step cannot fail.
fn resolve_external(
    ses: &mut Unpickler<'_>,
    tag: EntryTag,
    owner: SymbolId,
    name: PickleName,
) -> Result<SymbolId> {
    // The owner's scope only holds what has been decoded; force its
    // completion so lazily driven sessions see the same members as eager
    // ones.
    if ses.table.get(owner).is_local
        && matches!(ses.table.get(owner).info, SymbolInfo::Pending { .. })
    {
        ensure_completed(ses, owner)?;
    }
    let want_module_class = tag == EntryTag::ExtModClassRef;

    // The enclosing root package is referenced by its own name; it is
    // nobody's member.
    let root = ses.table.root();
    if owner == root && name.text == ses.table.get(root).name {
        return Ok(root);
    }

    // A module class is reachable by name even though it sits in no scope.
    if want_module_class {
        if let Some(&cls) = ses.module_classes.get(&(owner, name.text)) {
            return Ok(cls);
        }
    }

    // 1. Direct member lookup, disambiguating same-named candidates.
    if let Some(found) = member_lookup(ses, owner, name.text, name.kind, want_module_class) {
        return Ok(found);
    }

    // 2. Retry with the expanded (mangled non-public) form of the name.
    let expanded = {
        let owner_path = ses.table.full_name(ses.interner, owner, '$');
        let text = format!("{owner_path}$${}", ses.interner.lookup(name.text));
        ses.interner.intern(&text)
    };
    if let Some(found) = member_lookup(ses, owner, expanded, name.kind, want_module_class) {
        return Ok(found);
    }

    // 3. Module class via its companion value.
    if want_module_class {
        let companion = ses
            .table
            .lookup_member(owner, name.text)
            .iter()
            .copied()
            .find(|&m| ses.table.get(m).kind == SymbolKind::Module);
        if let Some(m) = companion {
            if let Some(cls) = ses.table.get(m).module_class {
                return Ok(cls);
            }
        }
    }

    // 4. The cross-module hook.
    if let Some(found) = ses.resolver.missing(&mut ses.table, owner, name) {
        return Ok(found);
    }

    // 5. Stub: resolution never aborts the session.
    debug!(
        owner = %ses.table.full_name(ses.interner, owner, '.'),
        name = ses.interner.lookup(name.text),
        "unresolved external reference, stubbing"
    );
    let kind = if want_module_class {
        SymbolKind::Class
    } else if name.kind == NameKind::Type {
        SymbolKind::Type
    } else {
        SymbolKind::Value
    };
    Ok(ses.resolver.stub(&mut ses.table, owner, name, kind))
}

/// One lookup step of the chain: members of `owner` named `text` in the
/// namespace the reference expects, narrowed to one candidate.
fn member_lookup(
    ses: &mut Unpickler<'_>,
    owner: SymbolId,
    text: veld_ir::Name,
    kind: NameKind,
    want_module_class: bool,
) -> Option<SymbolId> {
    let candidates: Vec<SymbolId> = ses
        .table
        .lookup_member(owner, text)
        .iter()
        .copied()
        .filter(|&m| {
            let k = ses.table.get(m).kind;
            if want_module_class {
                k == SymbolKind::Module
            } else {
                k.is_type() == (kind == NameKind::Type)
            }
        })
        .collect();
    let chosen = match candidates.as_slice() {
        [] => return None,
        [one] => *one,
        many => ses.resolver.disambiguate(&ses.table, many)?,
    };
    if want_module_class {
        ses.table.get(chosen).module_class
    } else {
        Some(chosen)
    }
}

/// Force a symbol's deferred info. Idempotent; observing a completion
/// already in progress is a corruption error.
pub(crate) fn ensure_completed(ses: &mut Unpickler<'_>, sym: SymbolId) -> Result<()> {
    let (resume, end) = match ses.table.get(sym).info {
        SymbolInfo::Resolved(_) => return Ok(()),
        SymbolInfo::Completing => {
            return Err(UnpickleError::corrupt(
                ses.buf.pos(),
                format!(
                    "re-entrant completion of `{}`",
                    ses.table.full_name(ses.interner, sym, '.')
                ),
            )
            .with_context(&ses.context));
        }
        SymbolInfo::Pending { resume, end } => (resume, end),
    };
    if end == 0 {
        return Err(UnpickleError::corrupt(
            ses.buf.pos(),
            format!(
                "`{}` has no recorded declaration to complete from",
                ses.table.full_name(ses.interner, sym, '.')
            ),
        ));
    }
    let ctx = format!("`{}`", ses.table.full_name(ses.interner, sym, '.'));
    let old_context = std::mem::replace(&mut ses.context, ctx.clone());
    ses.table.get_mut(sym).info = SymbolInfo::Completing;
    let saved = ses.buf.pos();
    ses.buf.set_pos(resume);
    let result = complete_at(ses, sym, end);
    ses.buf.set_pos(saved);
    ses.context = old_context;
    let info = result.map_err(|e| e.with_context(&ctx))?;
    ses.table.get_mut(sym).info = SymbolInfo::Resolved(info);
    Ok(())
}

/// Cursor is just past the (name, owner, flags) prefix of the symbol's
/// entry; read the rest and finalize.
fn complete_at(ses: &mut Unpickler<'_>, sym: SymbolId, end: usize) -> Result<ResolvedInfo> {
    let r1 = ses.buf.read_nat()?;
    let info_ref = if ses.tag_at(r1)?.is_symbol_ref() {
        let pw = ses.symbol_at(r1)?;
        if !pw.is_none() {
            ses.table.get_mut(sym).private_within = Some(pw);
        }
        ses.buf.read_nat()?
    } else {
        r1
    };
    let info_ty = ses.type_at(info_ref)?;
    let kind = ses.table.get(sym).kind;
    let flags = ses.table.get(sym).flags;

    match kind {
        SymbolKind::Class => {
            // Classes may carry a trailing self-type reference.
            let self_type = if ses.buf.pos() < end {
                Some(ses.read_type_ref()?)
            } else {
                None
            };
            finish_class(ses, info_ty, self_type)
        }
        SymbolKind::Alias => {
            let ty = canonicalize_term_poly(ses, info_ty)?;
            Ok(ResolvedInfo::Alias(ty))
        }
        SymbolKind::Type => {
            // Polymorphic bindings on an abstract type member are its
            // higher-kinded bounds.
            let ty = match ses.types.get(info_ty).clone() {
                Type::TempPoly { params, body } => {
                    read_type::higher_kinded_bounds(ses, params, body)?
                }
                _ => info_ty,
            };
            ensure_canonical(ses, ty)?;
            Ok(ResolvedInfo::Typed(ty))
        }
        SymbolKind::Module | SymbolKind::Value => {
            if flags.intersects(SymbolFlags::SUPER_ACCESSOR | SymbolFlags::PARAM_ACCESSOR)
                && ses.buf.pos() < end
            {
                // Accessor metadata, not part of the type.
                let alias = ses.read_symbol_ref()?;
                ses.table.get_mut(sym).alias = Some(alias);
            }
            let ty = canonicalize_term_poly(ses, info_ty)?;
            Ok(ResolvedInfo::Typed(ty))
        }
    }
}

/// Decompose a class's temporary signature into its canonical form.
fn finish_class(
    ses: &mut Unpickler<'_>,
    info_ty: TypeId,
    self_type: Option<TypeId>,
) -> Result<ResolvedInfo> {
    let (type_params, class_part) = match ses.types.get(info_ty).clone() {
        Type::TempPoly { params, body } => (params, body),
        _ => (Vec::new(), info_ty),
    };
    let parents = match ses.types.get(class_part).clone() {
        Type::TempClassInfo { parents, .. } => parents,
        other => {
            return Err(UnpickleError::corrupt(
                ses.buf.pos(),
                format!("class info is {other:?}, not a class signature"),
            ))
        }
    };
    for &p in &parents {
        ensure_canonical(ses, p)?;
    }
    if let Some(st) = self_type {
        ensure_canonical(ses, st)?;
    }
    Ok(ResolvedInfo::Class(ClassInfo {
        parents,
        self_type,
        type_params,
    }))
}

/// Distribute polymorphic bindings over a term's type: the canonical
/// polymorphic form, or the body alone when there are no parameters.
fn canonicalize_term_poly(ses: &mut Unpickler<'_>, ty: TypeId) -> Result<TypeId> {
    let ty = match ses.types.get(ty).clone() {
        Type::TempPoly { params, body } => {
            ensure_canonical(ses, body)?;
            if params.is_empty() {
                body
            } else {
                ses.types.alloc(Type::Poly { params, body })
            }
        }
        _ => ty,
    };
    ensure_canonical(ses, ty)?;
    Ok(ty)
}

/// Transient type forms may not escape finalization.
fn ensure_canonical(ses: &Unpickler<'_>, ty: TypeId) -> Result<()> {
    if ses.types.get(ty).is_transient() {
        return Err(UnpickleError::corrupt(
            ses.buf.pos(),
            "transient type form escaped finalization",
        ));
    }
    Ok(())
}
