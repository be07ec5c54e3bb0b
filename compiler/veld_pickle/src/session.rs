//! The decode session: one buffer, one index, one memoized slot table.
//!
//! # Design
//!
//! All decoding goes through [`Unpickler::decode_entry`]. The protocol is
//! strictly stack-disciplined: save the cursor, seek to the entry, run the
//! tag's reader, restore the cursor, store the result. A slot is write-once;
//! observing an in-progress slot means the buffer encodes a structural cycle
//! that the symbol reader's shell-first protocol did not break, which is a
//! corruption error, not a loop.
//!
//! Symbol entries fulfil their own slot *early* (the shell goes in before
//! the owner reference is followed), so legal owner/member cycles resolve to
//! the shell instead of re-entering. Everything else fulfils on return.
//!
//! Class type parameters are not entered into their class's scope at
//! creation time. Creation only queues the class; the queue is drained when
//! the outermost decode returns, reading the parameter list from the class's
//! polymorphic info entry so scope order is declaration order no matter
//! which entry was touched first.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use veld_ir::{Name, StringInterner};

use veld_diagnostic::DiagnosticQueue;

use crate::annot::{AnnotArena, AnnotArg, AnnotArgs, AnnotId, Annotation};
use crate::buf::PickleBuf;
use crate::constant::Constant;
use crate::error::{Result, UnpickleError};
use crate::format::{EntryTag, MAJOR_VERSION, MINOR_VERSION};
use crate::index::{self, EntryMeta};
use crate::name::PickleName;
use crate::symbol::{
    ResolvedInfo, Symbol, SymbolFlags, SymbolId, SymbolInfo, SymbolKind, SymbolTable,
};
use crate::tree::{Modifiers, TreeArena, TreeId};
use crate::ty::{Type, TypeId, TypePool};
use crate::{read_symbol, read_tree, read_type};

/// A decoded entry value, cached per slot.
#[derive(Clone, Debug)]
pub(crate) enum Entry {
    Name(PickleName),
    Symbol(SymbolId),
    Type(TypeId),
    Constant(Constant),
    Annotation(AnnotId),
    Tree(TreeId),
    Modifiers(Modifiers),
    AnnotArgArray(Vec<AnnotArg>),
}

impl Entry {
    fn kind(&self) -> &'static str {
        match self {
            Entry::Name(_) => "name",
            Entry::Symbol(_) => "symbol",
            Entry::Type(_) => "type",
            Entry::Constant(_) => "constant",
            Entry::Annotation(_) => "annotation",
            Entry::Tree(_) => "tree",
            Entry::Modifiers(_) => "modifiers",
            Entry::AnnotArgArray(_) => "annotation argument array",
        }
    }
}

#[derive(Clone, Debug)]
enum Slot {
    Empty,
    InProgress,
    Done(Entry),
}

/// The pre-existing symbols a decode completes in place.
///
/// External callers hold references to these before decoding starts, so the
/// decoder must reuse their identity rather than allocate fresh symbols for
/// the module's top-level class, its companion module, and that module's
/// class.
#[derive(Copy, Clone, Debug)]
pub struct RootSymbols {
    pub class_root: SymbolId,
    pub module_root: SymbolId,
    pub module_class_root: SymbolId,
}

/// Hook for symbols declared in modules not currently loaded.
///
/// `missing` is consulted only after every in-module lookup has failed;
/// `stub` is the fallback after that and never fails. `disambiguate` breaks
/// ties when an owner has several members sharing the referenced name.
pub trait MissingSymbolResolver {
    /// Locate `name` as a member of `owner` in some other module.
    fn missing(
        &mut self,
        table: &mut SymbolTable,
        owner: SymbolId,
        name: PickleName,
    ) -> Option<SymbolId> {
        let _ = (table, owner, name);
        None
    }

    /// Pick one of several same-named candidates. `None` falls through to
    /// the next resolution step.
    fn disambiguate(&self, table: &SymbolTable, candidates: &[SymbolId]) -> Option<SymbolId> {
        let _ = (table, candidates);
        None
    }

    /// Synthesize a placeholder for a reference nothing could resolve.
    fn stub(
        &mut self,
        table: &mut SymbolTable,
        owner: SymbolId,
        name: PickleName,
        kind: SymbolKind,
    ) -> SymbolId {
        let mut flags = SymbolFlags::STUB;
        if kind == SymbolKind::Class {
            flags |= SymbolFlags::MODULE;
        }
        let mut sym = Symbol::new(name.text, kind, owner, flags);
        sym.info = SymbolInfo::Resolved(ResolvedInfo::Typed(TypeId::ERROR));
        table.alloc(sym)
    }
}

/// Resolver with no cross-module knowledge: everything unresolved becomes a
/// stub.
#[derive(Default)]
pub struct StubOnlyResolver;

impl MissingSymbolResolver for StubOnlyResolver {}

/// One decode session over one pickle buffer.
///
/// Owns the index, the slot cache, and the arenas the decoded graph lives
/// in. Nothing here is shared across sessions.
pub struct Unpickler<'a> {
    pub(crate) buf: PickleBuf<'a>,
    source: String,
    pub(crate) entries: Vec<EntryMeta>,
    slots: Vec<Slot>,
    pub table: SymbolTable,
    pub types: TypePool,
    pub trees: TreeArena,
    pub annots: AnnotArena,
    pub diags: DiagnosticQueue,
    pub(crate) interner: &'a StringInterner,
    pub(crate) resolver: &'a mut dyn MissingSymbolResolver,
    pub(crate) roots: Option<RootSymbols>,
    /// Refinement class -> the structural type it stands for.
    pub(crate) refinements: FxHashMap<SymbolId, TypeId>,
    /// (owner, name) -> module class, for companion-value hops. Module
    /// classes never sit in scopes, so member lookup cannot find them.
    pub(crate) module_classes: FxHashMap<(SymbolId, Name), SymbolId>,
    /// Classes whose type-parameter list still has to be entered into their
    /// scope, paired with the polymorphic info entry holding the list.
    pending_type_params: Vec<(SymbolId, u32)>,
    depth: usize,
    draining: bool,
    /// Declaration being decoded, for error context.
    pub(crate) context: String,
    refinement_name: Name,
}

impl<'a> Unpickler<'a> {
    /// Gate on the version header and build the entry index. No body entry
    /// is decoded yet.
    pub fn new(
        bytes: &'a [u8],
        source: impl Into<String>,
        interner: &'a StringInterner,
        resolver: &'a mut dyn MissingSymbolResolver,
    ) -> Result<Self> {
        let source = source.into();
        let mut buf = PickleBuf::new(bytes);
        let major = buf.read_nat()?;
        let minor = buf.read_nat()?;
        if major != MAJOR_VERSION || minor > MINOR_VERSION {
            return Err(UnpickleError::VersionMismatch {
                found_major: major,
                found_minor: minor,
                expected_major: MAJOR_VERSION,
                expected_minor: MINOR_VERSION,
                source_name: source,
            });
        }
        let entries = index::scan(&mut buf)?;
        debug!(source = %source, entries = entries.len(), "indexed pickle");
        let slots = vec![Slot::Empty; entries.len()];
        Ok(Unpickler {
            buf,
            source,
            entries,
            slots,
            table: SymbolTable::new(interner),
            types: TypePool::new(),
            trees: TreeArena::new(),
            annots: AnnotArena::new(),
            diags: DiagnosticQueue::new(),
            interner,
            resolver,
            roots: None,
            refinements: FxHashMap::default(),
            module_classes: FxHashMap::default(),
            pending_type_params: Vec::new(),
            depth: 0,
            draining: false,
            context: String::new(),
            refinement_name: interner.intern("<refinement>"),
        })
    }

    /// Origin of the byte buffer, for diagnostics.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn roots(&self) -> Option<RootSymbols> {
        self.roots
    }

    /// Pre-allocate the root identities this buffer will complete in place:
    /// the top-level class named `name`, its companion module, and the
    /// module's class, all owned by `owner`. The class and the module are
    /// entered into `owner`'s scope; the module class never is.
    pub fn install_roots(&mut self, owner: SymbolId, name: &str) -> RootSymbols {
        let text = self.interner.intern(name);
        let class_root = self
            .table
            .alloc(Symbol::new(text, SymbolKind::Class, owner, SymbolFlags::empty()));
        let module_root = self
            .table
            .alloc(Symbol::new(text, SymbolKind::Module, owner, SymbolFlags::MODULE));
        let module_class_root = self
            .table
            .alloc(Symbol::new(text, SymbolKind::Class, owner, SymbolFlags::MODULE));
        self.table.get_mut(module_root).module_class = Some(module_class_root);
        self.table.enter(owner, class_root);
        self.table.enter(owner, module_root);
        self.module_classes.insert((owner, text), module_class_root);
        let roots = RootSymbols {
            class_root,
            module_root,
            module_class_root,
        };
        self.roots = Some(roots);
        roots
    }

    /// Full two-pass decode.
    ///
    /// Pass one forces every locally declared symbol entry and completes
    /// each symbol's info. Pass two attaches per-symbol annotations and
    /// sealed-children records; those reference symbols by identity, so
    /// running them in the first pass would race against symbol creation.
    pub fn run(&mut self) -> Result<()> {
        debug!(source = %self.source, "unpickling: symbol pass");
        for i in 0..self.entries.len() as u32 {
            let tag = EntryTag::from_byte(self.entries[i as usize].tag);
            if tag.is_some_and(EntryTag::is_local_symbol) {
                self.symbol_at(i)?;
            }
        }
        // Completion can allocate further symbols (stubs, existential
        // binders), so walk until the table stops growing.
        let mut i = 0;
        while i < self.table.len() {
            let sym = SymbolId::from_raw(i as u32);
            let pending = self.table.get(sym).is_local
                && matches!(self.table.get(sym).info, SymbolInfo::Pending { .. });
            if pending {
                read_symbol::ensure_completed(self, sym)?;
            }
            i += 1;
        }
        debug!(source = %self.source, "unpickling: annotation pass");
        for i in 0..self.entries.len() as u32 {
            match EntryTag::from_byte(self.entries[i as usize].tag) {
                Some(EntryTag::SymAnnot) => self.read_symbol_annotation(i)?,
                Some(EntryTag::Children) => self.read_children(i)?,
                _ => {}
            }
        }
        Ok(())
    }

    // === Memoized recursive decode ===

    /// Decode entry `r`, or return its cached value.
    pub(crate) fn decode_entry(&mut self, r: u32) -> Result<Entry> {
        let idx = r as usize;
        let meta = *self.entries.get(idx).ok_or_else(|| {
            UnpickleError::corrupt(
                self.buf.pos(),
                format!("entry reference {r} out of range ({} entries)", self.entries.len()),
            )
            .with_context(&self.context)
        })?;
        match &self.slots[idx] {
            Slot::Done(e) => return Ok(e.clone()),
            Slot::InProgress => {
                return Err(UnpickleError::corrupt(
                    meta.offset,
                    format!("re-entrant decode of entry {r}: structural reference cycle"),
                )
                .with_context(&self.context));
            }
            Slot::Empty => {}
        }
        let tag = EntryTag::from_byte(meta.tag).ok_or_else(|| {
            UnpickleError::corrupt(meta.offset, format!("unknown entry tag {}", meta.tag))
                .with_context(&self.context)
        })?;
        if tag.is_top_level_only() {
            return Err(UnpickleError::corrupt(
                meta.offset,
                format!("{tag:?} entry referenced from inside another entry"),
            )
            .with_context(&self.context));
        }
        trace!(entry = r, ?tag, offset = meta.offset, "decode");

        self.slots[idx] = Slot::InProgress;
        let saved = self.buf.pos();
        self.buf.set_pos(meta.offset);
        self.depth += 1;
        let result = self.decode_body(r, tag);
        self.depth -= 1;
        self.buf.set_pos(saved);
        let entry = result.map_err(|e| e.with_context(&self.context))?;
        // Symbol readers fulfil their slot early; everything else lands here.
        if matches!(self.slots[idx], Slot::InProgress) {
            self.slots[idx] = Slot::Done(entry.clone());
        }
        if self.depth == 0 && !self.draining {
            self.drain_pending_type_params()?;
        }
        Ok(entry)
    }

    /// Cursor is at the entry's tag byte; read the frame and dispatch.
    fn decode_body(&mut self, r: u32, tag: EntryTag) -> Result<Entry> {
        let _ = self.buf.read_byte()?;
        let len = self.buf.read_nat()? as usize;
        let end = self.buf.pos() + len;
        match tag {
            EntryTag::TermName => Ok(Entry::Name(PickleName::term(self.read_name_text(end)?))),
            EntryTag::TypeName => Ok(Entry::Name(PickleName::tpe(self.read_name_text(end)?))),
            EntryTag::NoneSym => Ok(Entry::Symbol(SymbolId::NONE)),
            EntryTag::TypeSym
            | EntryTag::AliasSym
            | EntryTag::ClassSym
            | EntryTag::ModuleSym
            | EntryTag::ValSym => read_symbol::read_local_symbol(self, r, tag, end),
            EntryTag::ExtRef | EntryTag::ExtModClassRef => {
                read_symbol::read_ext_symbol(self, tag, end)
            }
            t if t.is_type() => read_type::read_type(self, tag, end).map(Entry::Type),
            t if t.is_literal() => self.read_constant(tag, end).map(Entry::Constant),
            EntryTag::AnnotInfo => {
                let atp = self.read_type_ref()?;
                let id = self.annots.alloc(Annotation {
                    atp,
                    args: AnnotArgs::Deferred {
                        start: self.buf.pos(),
                        end,
                    },
                });
                Ok(Entry::Annotation(id))
            }
            EntryTag::AnnotArgArray => {
                let mut args = Vec::new();
                while self.buf.pos() < end {
                    let arg_ref = self.buf.read_nat()?;
                    args.push(read_tree::read_classfile_annot_arg(self, arg_ref)?);
                }
                Ok(Entry::AnnotArgArray(args))
            }
            EntryTag::Tree => read_tree::read_tree(self, end).map(Entry::Tree),
            EntryTag::Modifiers => read_tree::read_modifiers(self, end).map(Entry::Modifiers),
            // Unreachable: names, symbols, types, and literals are all
            // matched above, and top-level-only tags are rejected earlier.
            other => Err(UnpickleError::corrupt(
                self.buf.pos(),
                format!("{other:?} entry cannot be decoded by reference"),
            )),
        }
    }

    fn read_name_text(&mut self, end: usize) -> Result<Name> {
        let start = self.buf.pos();
        let bytes = self.buf.read_bytes(end - start)?;
        let text = std::str::from_utf8(bytes)
            .map_err(|_| UnpickleError::corrupt(start, "name entry is not valid UTF-8"))?;
        Ok(self.interner.intern(text))
    }

    fn read_constant(&mut self, tag: EntryTag, end: usize) -> Result<Constant> {
        Ok(match tag {
            EntryTag::LiteralUnit => Constant::Unit,
            EntryTag::LiteralBoolean => Constant::Boolean(self.buf.read_long_signed(end)? != 0),
            EntryTag::LiteralByte => Constant::Byte(self.buf.read_long_signed(end)? as i8),
            EntryTag::LiteralShort => Constant::Short(self.buf.read_long_signed(end)? as i16),
            EntryTag::LiteralChar => Constant::Char(self.buf.read_long_signed(end)? as u16),
            EntryTag::LiteralInt => Constant::Int(self.buf.read_long_signed(end)? as i32),
            EntryTag::LiteralLong => Constant::Long(self.buf.read_long_signed(end)?),
            EntryTag::LiteralFloat => {
                Constant::Float(f32::from_bits(self.buf.read_long_signed(end)? as u32))
            }
            EntryTag::LiteralDouble => {
                Constant::Double(f64::from_bits(self.buf.read_long_signed(end)? as u64))
            }
            EntryTag::LiteralString => Constant::String(self.read_name_ref()?.text),
            EntryTag::LiteralNull => Constant::Null,
            EntryTag::LiteralClass => Constant::Class(self.read_type_ref()?),
            EntryTag::LiteralEnum => Constant::Enum(self.read_symbol_ref()?),
            other => {
                return Err(UnpickleError::corrupt(
                    self.buf.pos(),
                    format!("{other:?} is not a literal tag"),
                ))
            }
        })
    }

    // === Typed per-entry accessors ===

    fn kind_error(&self, r: u32, wanted: &'static str, got: &Entry) -> UnpickleError {
        let offset = self.entries.get(r as usize).map_or(0, |m| m.offset);
        UnpickleError::corrupt(
            offset,
            format!("entry {r} is a {} where a {wanted} was expected", got.kind()),
        )
        .with_context(&self.context)
    }

    pub(crate) fn name_at(&mut self, r: u32) -> Result<PickleName> {
        match self.decode_entry(r)? {
            Entry::Name(n) => Ok(n),
            other => Err(self.kind_error(r, "name", &other)),
        }
    }

    /// Decode entry `r` as a symbol. Public so a driver can decode on
    /// demand instead of through [`Unpickler::run`].
    pub fn symbol_at(&mut self, r: u32) -> Result<SymbolId> {
        match self.decode_entry(r)? {
            Entry::Symbol(s) => Ok(s),
            other => Err(self.kind_error(r, "symbol", &other)),
        }
    }

    /// Force a symbol's deferred info, if it still has one. Idempotent.
    pub fn complete_symbol(&mut self, sym: SymbolId) -> Result<()> {
        read_symbol::ensure_completed(self, sym)
    }

    /// Decode entry `r` as a type.
    pub fn type_at(&mut self, r: u32) -> Result<TypeId> {
        match self.decode_entry(r)? {
            Entry::Type(t) => Ok(t),
            Entry::Constant(c) => Ok(self.types.alloc(Type::Constant(c))),
            other => Err(self.kind_error(r, "type", &other)),
        }
    }

    pub(crate) fn const_at(&mut self, r: u32) -> Result<Constant> {
        match self.decode_entry(r)? {
            Entry::Constant(c) => Ok(c),
            other => Err(self.kind_error(r, "constant", &other)),
        }
    }

    pub(crate) fn tree_at(&mut self, r: u32) -> Result<TreeId> {
        match self.decode_entry(r)? {
            Entry::Tree(t) => Ok(t),
            other => Err(self.kind_error(r, "tree", &other)),
        }
    }

    pub(crate) fn annot_at(&mut self, r: u32) -> Result<AnnotId> {
        match self.decode_entry(r)? {
            Entry::Annotation(a) => Ok(a),
            other => Err(self.kind_error(r, "annotation", &other)),
        }
    }

    pub(crate) fn mods_at(&mut self, r: u32) -> Result<Modifiers> {
        match self.decode_entry(r)? {
            Entry::Modifiers(m) => Ok(m),
            other => Err(self.kind_error(r, "modifiers", &other)),
        }
    }

    /// The tag of entry `r`, without decoding it.
    pub(crate) fn tag_at(&self, r: u32) -> Result<EntryTag> {
        let meta = self.entries.get(r as usize).ok_or_else(|| {
            UnpickleError::corrupt(
                self.buf.pos(),
                format!("entry reference {r} out of range ({} entries)", self.entries.len()),
            )
            .with_context(&self.context)
        })?;
        EntryTag::from_byte(meta.tag).ok_or_else(|| {
            UnpickleError::corrupt(meta.offset, format!("unknown entry tag {}", meta.tag))
                .with_context(&self.context)
        })
    }

    // === Ref readers: a varint entry reference at the cursor ===

    pub(crate) fn read_name_ref(&mut self) -> Result<PickleName> {
        let r = self.buf.read_nat()?;
        self.name_at(r)
    }

    pub(crate) fn read_symbol_ref(&mut self) -> Result<SymbolId> {
        let r = self.buf.read_nat()?;
        self.symbol_at(r)
    }

    pub(crate) fn read_type_ref(&mut self) -> Result<TypeId> {
        let r = self.buf.read_nat()?;
        self.type_at(r)
    }

    pub(crate) fn read_const_ref(&mut self) -> Result<Constant> {
        let r = self.buf.read_nat()?;
        self.const_at(r)
    }

    pub(crate) fn read_tree_ref(&mut self) -> Result<TreeId> {
        let r = self.buf.read_nat()?;
        self.tree_at(r)
    }

    pub(crate) fn read_mods_ref(&mut self) -> Result<Modifiers> {
        let r = self.buf.read_nat()?;
        self.mods_at(r)
    }

    // === Symbol-reader support ===

    /// Install `sym` as entry `r`'s value before its owner or info are
    /// followed, so back-references during the recursion see the shell.
    pub(crate) fn fulfil_symbol(&mut self, r: u32, sym: SymbolId) {
        self.slots[r as usize] = Slot::Done(Entry::Symbol(sym));
    }

    /// Queue a class whose type parameters must be scope-entered in
    /// declaration order once the outermost decode returns.
    pub(crate) fn defer_type_params(&mut self, class: SymbolId, poly_ref: u32) {
        self.pending_type_params.push((class, poly_ref));
    }

    pub(crate) fn is_refinement_name(&self, name: Name) -> bool {
        name == self.refinement_name
    }

    /// Enter each queued class's type parameters into its scope, in the
    /// order the polymorphic info entry declares them. Decoding a parameter
    /// can queue further classes; loop until quiet.
    fn drain_pending_type_params(&mut self) -> Result<()> {
        self.draining = true;
        let result = self.drain_inner();
        self.draining = false;
        result
    }

    fn drain_inner(&mut self) -> Result<()> {
        while let Some((class, poly_ref)) = self.pending_type_params.pop() {
            let meta = self.entries[poly_ref as usize];
            let saved = self.buf.pos();
            self.buf.set_pos(meta.offset);
            let frame: Result<Vec<SymbolId>> = (|| {
                let _ = self.buf.read_byte()?;
                let len = self.buf.read_nat()? as usize;
                let end = self.buf.pos() + len;
                // Body type first, then the parameter symbols.
                let _ = self.buf.read_nat()?;
                let mut params = Vec::new();
                while self.buf.pos() < end {
                    params.push(self.read_symbol_ref()?);
                }
                Ok(params)
            })();
            self.buf.set_pos(saved);
            for param in frame? {
                if self.table.get(param).owner == class {
                    self.table.enter(class, param);
                }
            }
        }
        Ok(())
    }

    // === Annotations ===

    /// Force an annotation's argument list, parsing its deferred byte range
    /// on first inspection.
    pub fn annotation_args(&mut self, id: AnnotId) -> Result<&[AnnotArg]> {
        let deferred = match self.annots.get(id).args {
            AnnotArgs::Deferred { start, end } => Some((start, end)),
            AnnotArgs::Forced(_) => None,
        };
        if let Some((start, end)) = deferred {
            let args = read_tree::read_annot_args(self, start, end)?;
            self.annots.get_mut(id).args = AnnotArgs::Forced(args);
        }
        match &self.annots.get(id).args {
            AnnotArgs::Forced(v) => Ok(v),
            AnnotArgs::Deferred { start, .. } => Err(UnpickleError::corrupt(
                *start,
                "annotation arguments failed to force",
            )),
        }
    }

    /// Pass-two reader for a top-level per-symbol annotation entry. The
    /// argument range stays deferred.
    fn read_symbol_annotation(&mut self, r: u32) -> Result<()> {
        let meta = self.entries[r as usize];
        let saved = self.buf.pos();
        self.buf.set_pos(meta.offset);
        let result: Result<()> = (|| {
            let _ = self.buf.read_byte()?;
            let len = self.buf.read_nat()? as usize;
            let end = self.buf.pos() + len;
            let sym = self.read_symbol_ref()?;
            let atp = self.read_type_ref()?;
            let id = self.annots.alloc(Annotation {
                atp,
                args: AnnotArgs::Deferred {
                    start: self.buf.pos(),
                    end,
                },
            });
            if sym.is_none() {
                return Err(UnpickleError::corrupt(
                    meta.offset,
                    "annotation attached to no symbol",
                ));
            }
            self.table.get_mut(sym).annotations.push(id);
            Ok(())
        })();
        self.buf.set_pos(saved);
        result.map_err(|e| e.with_context(&self.context))
    }

    /// Pass-two reader for a sealed-children record.
    fn read_children(&mut self, r: u32) -> Result<()> {
        let meta = self.entries[r as usize];
        let saved = self.buf.pos();
        self.buf.set_pos(meta.offset);
        let result: Result<()> = (|| {
            let _ = self.buf.read_byte()?;
            let len = self.buf.read_nat()? as usize;
            let end = self.buf.pos() + len;
            let parent = self.read_symbol_ref()?;
            let mut children = Vec::new();
            while self.buf.pos() < end {
                children.push(self.read_symbol_ref()?);
            }
            if parent.is_none() {
                return Err(UnpickleError::corrupt(
                    meta.offset,
                    "children record attached to no symbol",
                ));
            }
            self.table.get_mut(parent).children.extend(children);
            Ok(())
        })();
        self.buf.set_pos(saved);
        result.map_err(|e| e.with_context(&self.context))
    }
}
