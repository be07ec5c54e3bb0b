//! Stable diagnostic codes.

use std::fmt;

/// Stable code identifying a diagnostic kind.
///
/// Codes are grouped by compiler phase: `P` codes come from pickled-metadata
/// decoding.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Pickle decoding (Pxxxx)
    /// Type parameter escapes into its own bound; `Any` substituted.
    P0001,
    /// Existential type not locally eliminable; approximated.
    P0002,
}

impl ErrorCode {
    /// Short human-readable description of the code.
    pub const fn description(self) -> &'static str {
        match self {
            ErrorCode::P0001 => "type parameter escapes into its own bound",
            ErrorCode::P0002 => "existential type approximated",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
