//! Core identifier types shared across the Veld compiler.
//!
//! Currently this crate provides interned strings: the [`Name`] handle and
//! the [`StringInterner`] that backs it. Interned names give O(1) equality
//! and hashing, which the symbol tables downstream rely on.

mod interner;
mod name;

pub use interner::{InternError, StringInterner};
pub use name::Name;
