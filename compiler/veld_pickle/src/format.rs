//! The fixed wire format: version constants and the closed tag spaces.
//!
//! Every entry in the pickle body is `[tag: u8][length: varint][payload]`.
//! The tag byte values are frozen; the decoder speaks exactly one
//! major version and rejects minor versions newer than [`MINOR_VERSION`].
//!
//! Tag ranges partition into: names, symbols (local and external), types,
//! literal constants, annotations, trees, and two tags that may only appear
//! at top level (per-symbol annotations and sealed-children records).

/// Supported major format version. A mismatch is fatal.
pub const MAJOR_VERSION: u32 = 5;

/// Newest minor format version this decoder understands.
pub const MINOR_VERSION: u32 = 2;

/// Entry kind discriminant.
///
/// `from_byte` is the only way in; an unknown byte is a corruption error at
/// the call site, so every later `match` over `EntryTag` is exhaustive.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum EntryTag {
    // === Names ===
    TermName = 1,
    TypeName = 2,

    // === Symbols (local) ===
    NoneSym = 3,
    TypeSym = 4,
    AliasSym = 5,
    ClassSym = 6,
    ModuleSym = 7,
    ValSym = 8,

    // === Symbols (external references) ===
    ExtRef = 9,
    ExtModClassRef = 10,

    // === Types ===
    NoTpe = 11,
    NoPrefixTpe = 12,
    ThisTpe = 13,
    SingleTpe = 14,
    ConstantTpe = 15,
    TypeRefTpe = 16,
    TypeBoundsTpe = 17,
    RefinedTpe = 18,
    ClassInfoTpe = 19,
    MethodTpe = 20,
    PolyTpe = 21,
    /// Pre-5.2 encoding of an implicit-parameter method; newer producers
    /// flag the first parameter instead.
    ImplicitMethodTpe = 22,

    // === Literal constants ===
    LiteralUnit = 24,
    LiteralBoolean = 25,
    LiteralByte = 26,
    LiteralShort = 27,
    LiteralChar = 28,
    LiteralInt = 29,
    LiteralLong = 30,
    LiteralFloat = 31,
    LiteralDouble = 32,
    LiteralString = 33,
    LiteralNull = 34,
    LiteralClass = 35,
    LiteralEnum = 36,

    // === Annotations and remaining types ===
    /// Top level only: attaches an annotation to a symbol.
    SymAnnot = 40,
    /// Top level only: records the sealed children of a symbol.
    Children = 41,
    AnnotatedTpe = 42,
    AnnotInfo = 43,
    AnnotArgArray = 44,
    SuperTpe = 46,
    /// Legacy de Bruijn indexed type; deliberately unsupported.
    DeBruijnTpe = 47,
    ExistentialTpe = 48,

    // === Trees ===
    Tree = 49,
    Modifiers = 50,
}

impl EntryTag {
    /// Decode a tag byte. `None` means the buffer is corrupt.
    pub const fn from_byte(b: u8) -> Option<EntryTag> {
        Some(match b {
            1 => EntryTag::TermName,
            2 => EntryTag::TypeName,
            3 => EntryTag::NoneSym,
            4 => EntryTag::TypeSym,
            5 => EntryTag::AliasSym,
            6 => EntryTag::ClassSym,
            7 => EntryTag::ModuleSym,
            8 => EntryTag::ValSym,
            9 => EntryTag::ExtRef,
            10 => EntryTag::ExtModClassRef,
            11 => EntryTag::NoTpe,
            12 => EntryTag::NoPrefixTpe,
            13 => EntryTag::ThisTpe,
            14 => EntryTag::SingleTpe,
            15 => EntryTag::ConstantTpe,
            16 => EntryTag::TypeRefTpe,
            17 => EntryTag::TypeBoundsTpe,
            18 => EntryTag::RefinedTpe,
            19 => EntryTag::ClassInfoTpe,
            20 => EntryTag::MethodTpe,
            21 => EntryTag::PolyTpe,
            22 => EntryTag::ImplicitMethodTpe,
            24 => EntryTag::LiteralUnit,
            25 => EntryTag::LiteralBoolean,
            26 => EntryTag::LiteralByte,
            27 => EntryTag::LiteralShort,
            28 => EntryTag::LiteralChar,
            29 => EntryTag::LiteralInt,
            30 => EntryTag::LiteralLong,
            31 => EntryTag::LiteralFloat,
            32 => EntryTag::LiteralDouble,
            33 => EntryTag::LiteralString,
            34 => EntryTag::LiteralNull,
            35 => EntryTag::LiteralClass,
            36 => EntryTag::LiteralEnum,
            40 => EntryTag::SymAnnot,
            41 => EntryTag::Children,
            42 => EntryTag::AnnotatedTpe,
            43 => EntryTag::AnnotInfo,
            44 => EntryTag::AnnotArgArray,
            46 => EntryTag::SuperTpe,
            47 => EntryTag::DeBruijnTpe,
            48 => EntryTag::ExistentialTpe,
            49 => EntryTag::Tree,
            50 => EntryTag::Modifiers,
            _ => return None,
        })
    }

    /// The wire byte for this tag.
    #[inline]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Name entries (term or type).
    #[inline]
    pub const fn is_name(self) -> bool {
        matches!(self, EntryTag::TermName | EntryTag::TypeName)
    }

    /// Entries a symbol reference may legally point at, including the
    /// "no symbol" marker and external references.
    #[inline]
    pub const fn is_symbol_ref(self) -> bool {
        self.byte() >= EntryTag::NoneSym.byte() && self.byte() <= EntryTag::ExtModClassRef.byte()
    }

    /// Locally declared symbol entries; these are what the driver's first
    /// pass forces.
    #[inline]
    pub const fn is_local_symbol(self) -> bool {
        matches!(
            self,
            EntryTag::TypeSym
                | EntryTag::AliasSym
                | EntryTag::ClassSym
                | EntryTag::ModuleSym
                | EntryTag::ValSym
        )
    }

    /// Type entries.
    #[inline]
    pub const fn is_type(self) -> bool {
        matches!(
            self,
            EntryTag::NoTpe
                | EntryTag::NoPrefixTpe
                | EntryTag::ThisTpe
                | EntryTag::SingleTpe
                | EntryTag::ConstantTpe
                | EntryTag::TypeRefTpe
                | EntryTag::TypeBoundsTpe
                | EntryTag::RefinedTpe
                | EntryTag::ClassInfoTpe
                | EntryTag::MethodTpe
                | EntryTag::PolyTpe
                | EntryTag::ImplicitMethodTpe
                | EntryTag::AnnotatedTpe
                | EntryTag::SuperTpe
                | EntryTag::DeBruijnTpe
                | EntryTag::ExistentialTpe
        )
    }

    /// Literal constant entries.
    #[inline]
    pub const fn is_literal(self) -> bool {
        self.byte() >= EntryTag::LiteralUnit.byte() && self.byte() <= EntryTag::LiteralEnum.byte()
    }

    /// Entries that may only appear at top level, never referenced from
    /// inside another entry.
    #[inline]
    pub const fn is_top_level_only(self) -> bool {
        matches!(self, EntryTag::SymAnnot | EntryTag::Children)
    }
}

/// Tree shape discriminant, the sub-tag byte inside a [`EntryTag::Tree`]
/// entry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum TreeTag {
    Empty = 1,
    PackageDef = 2,
    /// Unsupported: reconstructing a class body requires primary-constructor
    /// extraction, which has no faithful equivalent here.
    ClassDef = 3,
    ModuleDef = 4,
    ValDef = 5,
    DefDef = 6,
    TypeDef = 7,
    LabelDef = 8,
    Import = 9,
    /// Legacy doc-comment carrier; unsupported.
    DocDef = 11,
    Template = 12,
    Block = 13,
    CaseDef = 14,
    Alternative = 16,
    Star = 17,
    Bind = 18,
    UnApply = 19,
    /// Legacy varargs array literal; unsupported.
    ArrayValue = 20,
    Function = 21,
    Assign = 22,
    If = 23,
    Match = 24,
    Return = 25,
    Try = 26,
    Throw = 27,
    New = 28,
    Typed = 29,
    TypeApply = 30,
    Apply = 31,
    /// Legacy dynamic-call shape; unsupported.
    ApplyDynamic = 32,
    Super = 33,
    This = 34,
    Select = 35,
    Ident = 36,
    Literal = 37,
    TypeTree = 38,
    Annotated = 39,
    SingletonTypeTree = 40,
    SelectFromTypeTree = 41,
    CompoundTypeTree = 42,
    AppliedTypeTree = 43,
    TypeBoundsTree = 44,
    ExistentialTypeTree = 45,
}

impl TreeTag {
    pub const fn from_byte(b: u8) -> Option<TreeTag> {
        Some(match b {
            1 => TreeTag::Empty,
            2 => TreeTag::PackageDef,
            3 => TreeTag::ClassDef,
            4 => TreeTag::ModuleDef,
            5 => TreeTag::ValDef,
            6 => TreeTag::DefDef,
            7 => TreeTag::TypeDef,
            8 => TreeTag::LabelDef,
            9 => TreeTag::Import,
            11 => TreeTag::DocDef,
            12 => TreeTag::Template,
            13 => TreeTag::Block,
            14 => TreeTag::CaseDef,
            16 => TreeTag::Alternative,
            17 => TreeTag::Star,
            18 => TreeTag::Bind,
            19 => TreeTag::UnApply,
            20 => TreeTag::ArrayValue,
            21 => TreeTag::Function,
            22 => TreeTag::Assign,
            23 => TreeTag::If,
            24 => TreeTag::Match,
            25 => TreeTag::Return,
            26 => TreeTag::Try,
            27 => TreeTag::Throw,
            28 => TreeTag::New,
            29 => TreeTag::Typed,
            30 => TreeTag::TypeApply,
            31 => TreeTag::Apply,
            32 => TreeTag::ApplyDynamic,
            33 => TreeTag::Super,
            34 => TreeTag::This,
            35 => TreeTag::Select,
            36 => TreeTag::Ident,
            37 => TreeTag::Literal,
            38 => TreeTag::TypeTree,
            39 => TreeTag::Annotated,
            40 => TreeTag::SingletonTypeTree,
            41 => TreeTag::SelectFromTypeTree,
            42 => TreeTag::CompoundTypeTree,
            43 => TreeTag::AppliedTypeTree,
            44 => TreeTag::TypeBoundsTree,
            45 => TreeTag::ExistentialTypeTree,
            _ => return None,
        })
    }

    #[inline]
    pub const fn byte(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_bytes_round_trip() {
        for b in 0..=255u8 {
            if let Some(tag) = EntryTag::from_byte(b) {
                assert_eq!(tag.byte(), b);
            }
        }
        for b in 0..=255u8 {
            if let Some(tag) = TreeTag::from_byte(b) {
                assert_eq!(tag.byte(), b);
            }
        }
    }

    #[test]
    fn unknown_bytes_are_rejected() {
        assert_eq!(EntryTag::from_byte(0), None);
        assert_eq!(EntryTag::from_byte(23), None);
        assert_eq!(EntryTag::from_byte(99), None);
        assert_eq!(TreeTag::from_byte(0), None);
        assert_eq!(TreeTag::from_byte(10), None);
    }

    #[test]
    fn classification_ranges() {
        assert!(EntryTag::NoneSym.is_symbol_ref());
        assert!(EntryTag::ExtModClassRef.is_symbol_ref());
        assert!(!EntryTag::NoTpe.is_symbol_ref());
        assert!(!EntryTag::NoneSym.is_local_symbol());
        assert!(EntryTag::ValSym.is_local_symbol());
        assert!(!EntryTag::ExtRef.is_local_symbol());
        assert!(EntryTag::ExistentialTpe.is_type());
        assert!(!EntryTag::Tree.is_type());
        assert!(EntryTag::LiteralEnum.is_literal());
        assert!(EntryTag::SymAnnot.is_top_level_only());
        assert!(EntryTag::Children.is_top_level_only());
    }
}
