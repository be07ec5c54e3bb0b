//! Pickled names.
//!
//! A pickled name is interned text plus a namespace: term names and type
//! names live in separate namespaces, and member lookup must respect that
//! distinction (a class and its companion value share spelling but never a
//! namespace).

use veld_ir::Name;

/// Which namespace a name lives in.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NameKind {
    Term,
    Type,
}

/// A decoded name entry: interned text plus namespace.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct PickleName {
    pub kind: NameKind,
    pub text: Name,
}

impl PickleName {
    pub const fn term(text: Name) -> Self {
        PickleName {
            kind: NameKind::Term,
            text,
        }
    }

    pub const fn tpe(text: Name) -> Self {
        PickleName {
            kind: NameKind::Type,
            text,
        }
    }
}
