//! Literal constants.

use veld_ir::Name;

use crate::symbol::SymbolId;
use crate::ty::TypeId;

/// A decoded literal constant.
///
/// Numeric literals are stored on the wire as sign-extended big-endian
/// values sized by the entry length; floats are the IEEE bit patterns of
/// those values. `Char` keeps the raw UTF-16 code unit the producer wrote.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Constant {
    Unit,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// Interned string contents (stored as a name entry reference).
    String(Name),
    Null,
    /// A class literal; the payload is the class's type.
    Class(TypeId),
    /// A Java enum value; the payload is the enum constant's symbol.
    Enum(SymbolId),
}
