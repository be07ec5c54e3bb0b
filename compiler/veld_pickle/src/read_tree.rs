//! Tree, modifier, and annotation-argument decoding.
//!
//! Trees appear in pickles as annotation arguments and inlineable bodies.
//! Every non-empty node starts with a type reference; definition and
//! reference shapes then carry a symbol reference. List fields come in two
//! encodings: count-prefixed (`rep`) and until-end-of-entry (`all`),
//! matching what the producer wrote for each shape.

use crate::annot::AnnotArg;
use crate::error::{Result, UnpickleError};
use crate::format::{EntryTag, TreeTag};
use crate::session::{Entry, Unpickler};
use crate::symbol::SymbolFlags;
use crate::tree::{ImportSelector, Modifiers, Tree, TreeId, TreeNode};
use crate::ty::TypeId;

/// Decode one tree entry. Cursor is just past the entry's length field.
pub(crate) fn read_tree(ses: &mut Unpickler<'_>, end: usize) -> Result<TreeId> {
    let tag_offset = ses.buf.pos();
    let b = ses.buf.read_byte()?;
    let tag = TreeTag::from_byte(b)
        .ok_or_else(|| UnpickleError::corrupt(tag_offset, format!("unknown tree tag {b}")))?;
    if tag == TreeTag::Empty {
        return Ok(ses.trees.alloc(TreeNode {
            ty: TypeId::NO_TYPE,
            tree: Tree::Empty,
        }));
    }
    let ty = ses.read_type_ref()?;
    let tree = match tag {
        TreeTag::Empty => Tree::Empty,

        // Legacy shapes with no faithful reconstruction here.
        TreeTag::ClassDef => {
            return Err(UnpickleError::unsupported(tag_offset, "class definition tree"))
        }
        TreeTag::DocDef => {
            return Err(UnpickleError::unsupported(tag_offset, "doc comment tree"))
        }
        TreeTag::ArrayValue => {
            return Err(UnpickleError::unsupported(tag_offset, "varargs array literal tree"))
        }
        TreeTag::ApplyDynamic => {
            return Err(UnpickleError::unsupported(tag_offset, "dynamic apply tree"))
        }

        TreeTag::PackageDef => {
            let sym = ses.read_symbol_ref()?;
            let pid = ses.read_tree_ref()?;
            let stats = all_trees(ses, end)?;
            Tree::PackageDef { sym, pid, stats }
        }
        TreeTag::ModuleDef => {
            let sym = ses.read_symbol_ref()?;
            let mods = ses.read_mods_ref()?;
            let name = ses.read_name_ref()?;
            let body = ses.read_tree_ref()?;
            Tree::ModuleDef {
                sym,
                mods,
                name,
                body,
            }
        }
        TreeTag::ValDef => {
            let sym = ses.read_symbol_ref()?;
            let mods = ses.read_mods_ref()?;
            let name = ses.read_name_ref()?;
            let tpt = ses.read_tree_ref()?;
            let rhs = ses.read_tree_ref()?;
            Tree::ValDef {
                sym,
                mods,
                name,
                tpt,
                rhs,
            }
        }
        TreeTag::DefDef => {
            let sym = ses.read_symbol_ref()?;
            let mods = ses.read_mods_ref()?;
            let name = ses.read_name_ref()?;
            let type_params = rep_trees(ses)?;
            let list_count = ses.buf.read_nat()? as usize;
            let mut param_lists = Vec::with_capacity(list_count);
            for _ in 0..list_count {
                param_lists.push(rep_trees(ses)?);
            }
            let tpt = ses.read_tree_ref()?;
            let rhs = ses.read_tree_ref()?;
            Tree::DefDef {
                sym,
                mods,
                name,
                type_params,
                param_lists,
                tpt,
                rhs,
            }
        }
        TreeTag::TypeDef => {
            let sym = ses.read_symbol_ref()?;
            let mods = ses.read_mods_ref()?;
            let name = ses.read_name_ref()?;
            let type_params = rep_trees(ses)?;
            let rhs = ses.read_tree_ref()?;
            Tree::TypeDef {
                sym,
                mods,
                name,
                type_params,
                rhs,
            }
        }
        TreeTag::LabelDef => {
            let sym = ses.read_symbol_ref()?;
            let name = ses.read_name_ref()?;
            let rhs = ses.read_tree_ref()?;
            let params = all_trees(ses, end)?;
            Tree::LabelDef {
                sym,
                name,
                params,
                rhs,
            }
        }
        TreeTag::Import => {
            let sym = ses.read_symbol_ref()?;
            let expr = ses.read_tree_ref()?;
            let mut selectors = Vec::new();
            while ses.buf.pos() < end {
                let from = ses.read_name_ref()?;
                let to = ses.read_name_ref()?;
                selectors.push(ImportSelector { from, to });
            }
            Tree::Import {
                sym,
                expr,
                selectors,
            }
        }
        TreeTag::Template => {
            let sym = ses.read_symbol_ref()?;
            let parents = rep_trees(ses)?;
            let self_val = ses.read_tree_ref()?;
            let body = all_trees(ses, end)?;
            Tree::Template {
                sym,
                parents,
                self_val,
                body,
            }
        }
        TreeTag::Block => {
            let expr = ses.read_tree_ref()?;
            let stats = all_trees(ses, end)?;
            Tree::Block { expr, stats }
        }
        TreeTag::CaseDef => {
            let pat = ses.read_tree_ref()?;
            let guard = ses.read_tree_ref()?;
            let body = ses.read_tree_ref()?;
            Tree::CaseDef { pat, guard, body }
        }
        TreeTag::Alternative => Tree::Alternative {
            alts: all_trees(ses, end)?,
        },
        TreeTag::Star => Tree::Star {
            elem: ses.read_tree_ref()?,
        },
        TreeTag::Bind => {
            let sym = ses.read_symbol_ref()?;
            let name = ses.read_name_ref()?;
            let body = ses.read_tree_ref()?;
            Tree::Bind { sym, name, body }
        }
        TreeTag::UnApply => {
            let fun = ses.read_tree_ref()?;
            let args = all_trees(ses, end)?;
            Tree::UnApply { fun, args }
        }
        TreeTag::Function => {
            let sym = ses.read_symbol_ref()?;
            let body = ses.read_tree_ref()?;
            let params = all_trees(ses, end)?;
            Tree::Function { sym, params, body }
        }
        TreeTag::Assign => {
            let lhs = ses.read_tree_ref()?;
            let rhs = ses.read_tree_ref()?;
            Tree::Assign { lhs, rhs }
        }
        TreeTag::If => {
            let cond = ses.read_tree_ref()?;
            let then_branch = ses.read_tree_ref()?;
            let else_branch = ses.read_tree_ref()?;
            Tree::If {
                cond,
                then_branch,
                else_branch,
            }
        }
        TreeTag::Match => {
            let selector = ses.read_tree_ref()?;
            let cases = all_trees(ses, end)?;
            Tree::Match { selector, cases }
        }
        TreeTag::Return => {
            let sym = ses.read_symbol_ref()?;
            let expr = ses.read_tree_ref()?;
            Tree::Return { sym, expr }
        }
        TreeTag::Try => {
            let block = ses.read_tree_ref()?;
            let finalizer = ses.read_tree_ref()?;
            let catches = all_trees(ses, end)?;
            Tree::Try {
                block,
                finalizer,
                catches,
            }
        }
        TreeTag::Throw => Tree::Throw {
            expr: ses.read_tree_ref()?,
        },
        TreeTag::New => Tree::New {
            tpt: ses.read_tree_ref()?,
        },
        TreeTag::Typed => {
            let expr = ses.read_tree_ref()?;
            let tpt = ses.read_tree_ref()?;
            Tree::Typed { expr, tpt }
        }
        TreeTag::TypeApply => {
            let fun = ses.read_tree_ref()?;
            let args = all_trees(ses, end)?;
            Tree::TypeApply { fun, args }
        }
        TreeTag::Apply => {
            let fun = ses.read_tree_ref()?;
            let args = all_trees(ses, end)?;
            Tree::Apply { fun, args }
        }
        TreeTag::Super => {
            let sym = ses.read_symbol_ref()?;
            let qual = ses.read_tree_ref()?;
            let mix = ses.read_name_ref()?.text;
            Tree::Super { sym, qual, mix }
        }
        TreeTag::This => {
            let sym = ses.read_symbol_ref()?;
            let qual = ses.read_name_ref()?.text;
            Tree::This { sym, qual }
        }
        TreeTag::Select => {
            let sym = ses.read_symbol_ref()?;
            let qualifier = ses.read_tree_ref()?;
            let name = ses.read_name_ref()?;
            Tree::Select {
                sym,
                qualifier,
                name,
            }
        }
        TreeTag::Ident => {
            let sym = ses.read_symbol_ref()?;
            let name = ses.read_name_ref()?;
            Tree::Ident { sym, name }
        }
        TreeTag::Literal => Tree::Literal {
            value: ses.read_const_ref()?,
        },
        TreeTag::TypeTree => Tree::TypeTree,
        TreeTag::Annotated => {
            let annot = ses.read_tree_ref()?;
            let arg = ses.read_tree_ref()?;
            Tree::Annotated { annot, arg }
        }
        TreeTag::SingletonTypeTree => Tree::SingletonTypeTree {
            reference: ses.read_tree_ref()?,
        },
        TreeTag::SelectFromTypeTree => {
            let qualifier = ses.read_tree_ref()?;
            let name = ses.read_name_ref()?;
            Tree::SelectFromTypeTree { qualifier, name }
        }
        TreeTag::CompoundTypeTree => Tree::CompoundTypeTree {
            template: ses.read_tree_ref()?,
        },
        TreeTag::AppliedTypeTree => {
            let tpt = ses.read_tree_ref()?;
            let args = all_trees(ses, end)?;
            Tree::AppliedTypeTree { tpt, args }
        }
        TreeTag::TypeBoundsTree => {
            let lo = ses.read_tree_ref()?;
            let hi = ses.read_tree_ref()?;
            Tree::TypeBoundsTree { lo, hi }
        }
        TreeTag::ExistentialTypeTree => {
            let tpt = ses.read_tree_ref()?;
            let where_clauses = all_trees(ses, end)?;
            Tree::ExistentialTypeTree { tpt, where_clauses }
        }
    };
    Ok(ses.trees.alloc(TreeNode { ty, tree }))
}

/// Tree references until the entry ends.
fn all_trees(ses: &mut Unpickler<'_>, end: usize) -> Result<Vec<TreeId>> {
    let mut out = Vec::new();
    while ses.buf.pos() < end {
        out.push(ses.read_tree_ref()?);
    }
    Ok(out)
}

/// Count-prefixed tree references.
fn rep_trees(ses: &mut Unpickler<'_>) -> Result<Vec<TreeId>> {
    let n = ses.buf.read_nat()? as usize;
    let mut out = Vec::with_capacity(n.min(1024));
    for _ in 0..n {
        out.push(ses.read_tree_ref()?);
    }
    Ok(out)
}

/// Modifiers entry: flag word split into two 32-bit halves (high first),
/// then the access-boundary name.
pub(crate) fn read_modifiers(ses: &mut Unpickler<'_>, _end: usize) -> Result<Modifiers> {
    let hi = u64::from(ses.buf.read_nat()?);
    let lo = u64::from(ses.buf.read_nat()?);
    let flags = SymbolFlags::from_bits_retain((hi << 32) | lo);
    let private_within = ses.read_name_ref()?.text;
    Ok(Modifiers {
        flags,
        private_within,
    })
}

/// Parse a deferred annotation-argument byte range.
///
/// Each item is an entry reference: a name reference starts a named
/// argument (the next reference is its value); anything else is a
/// positional tree or constant argument.
pub(crate) fn read_annot_args(
    ses: &mut Unpickler<'_>,
    start: usize,
    end: usize,
) -> Result<Vec<AnnotArg>> {
    let saved = ses.buf.pos();
    ses.buf.set_pos(start);
    let result: Result<Vec<AnnotArg>> = (|| {
        let mut args = Vec::new();
        while ses.buf.pos() < end {
            let r = ses.buf.read_nat()?;
            if ses.tag_at(r)?.is_name() {
                let name = ses.name_at(r)?;
                let value_ref = ses.buf.read_nat()?;
                let value = read_classfile_annot_arg(ses, value_ref)?;
                args.push(AnnotArg::Named {
                    name: name.text,
                    value: Box::new(value),
                });
            } else {
                args.push(read_plain_annot_arg(ses, r)?);
            }
        }
        Ok(args)
    })();
    ses.buf.set_pos(saved);
    result.map_err(|e| e.with_context(&ses.context))
}

/// Positional argument: an expression tree or a constant.
fn read_plain_annot_arg(ses: &mut Unpickler<'_>, r: u32) -> Result<AnnotArg> {
    if ses.tag_at(r)? == EntryTag::Tree {
        Ok(AnnotArg::Tree(ses.tree_at(r)?))
    } else {
        Ok(AnnotArg::Const(ses.const_at(r)?))
    }
}

/// Named-argument value: nested annotation, argument array, tree, or
/// constant.
pub(crate) fn read_classfile_annot_arg(ses: &mut Unpickler<'_>, r: u32) -> Result<AnnotArg> {
    match ses.tag_at(r)? {
        EntryTag::AnnotInfo => Ok(AnnotArg::Nested(ses.annot_at(r)?)),
        EntryTag::AnnotArgArray => match ses.decode_entry(r)? {
            Entry::AnnotArgArray(items) => Ok(AnnotArg::Array(items)),
            _ => Err(UnpickleError::corrupt(
                ses.buf.pos(),
                "annotation argument array decoded to a different entry kind",
            )),
        },
        EntryTag::Tree => Ok(AnnotArg::Tree(ses.tree_at(r)?)),
        _ => Ok(AnnotArg::Const(ses.const_at(r)?)),
    }
}
