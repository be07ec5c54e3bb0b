//! Decoded annotations.
//!
//! An annotation is its type plus an argument list. Arguments are the lazy
//! half of the design: a symbol-attached annotation records only the byte
//! range its arguments occupy, and the range is parsed when somebody first
//! asks. Malformed argument bytes therefore stay harmless until forced.

use veld_ir::Name;

use crate::constant::Constant;
use crate::tree::TreeId;
use crate::ty::TypeId;

/// A 32-bit handle into the annotation arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct AnnotId(u32);

impl AnnotId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        AnnotId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// One annotation argument.
#[derive(Clone, PartialEq, Debug)]
pub enum AnnotArg {
    /// An arbitrary expression argument.
    Tree(TreeId),
    /// A constant argument.
    Const(Constant),
    /// A named (`name = value`) argument.
    Named { name: Name, value: Box<AnnotArg> },
    /// A repeated-argument group.
    Array(Vec<AnnotArg>),
    /// A nested annotation (annotation-typed argument).
    Nested(AnnotId),
}

/// Argument list state: a byte range until first forced, parsed values
/// afterwards.
#[derive(Clone, PartialEq, Debug)]
pub enum AnnotArgs {
    /// Unparsed argument bytes `[start, end)` inside the annotation's entry.
    Deferred { start: usize, end: usize },
    Forced(Vec<AnnotArg>),
}

/// A decoded annotation.
#[derive(Clone, PartialEq, Debug)]
pub struct Annotation {
    /// The annotation's type.
    pub atp: TypeId,
    pub args: AnnotArgs,
}

/// Session-owned annotation arena.
#[derive(Default)]
pub struct AnnotArena {
    items: Vec<Annotation>,
}

impl AnnotArena {
    pub fn new() -> Self {
        AnnotArena::default()
    }

    pub fn alloc(&mut self, annot: Annotation) -> AnnotId {
        let id = AnnotId::from_raw(
            u32::try_from(self.items.len()).unwrap_or_else(|_| panic!("annotation arena overflow")),
        );
        self.items.push(annot);
        id
    }

    #[inline]
    pub fn get(&self, id: AnnotId) -> &Annotation {
        &self.items[id.raw() as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: AnnotId) -> &mut Annotation {
        &mut self.items[id.raw() as usize]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
