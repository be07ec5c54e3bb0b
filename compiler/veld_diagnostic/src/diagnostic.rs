use std::fmt;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A structured, non-aborting report.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    pub message: String,
    /// Byte offset into the artifact being processed, when known.
    pub offset: Option<usize>,
    /// Additional free-form context lines.
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Create an error diagnostic with the given code.
    pub fn error(code: ErrorCode) -> Self {
        Diagnostic {
            severity: Severity::Error,
            code,
            message: code.description().to_owned(),
            offset: None,
            notes: Vec::new(),
        }
    }

    /// Create a warning diagnostic with the given code.
    pub fn warning(code: ErrorCode) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            code,
            message: code.description().to_owned(),
            offset: None,
            notes: Vec::new(),
        }
    }

    /// Replace the default message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach the byte offset the diagnostic refers to.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Append a note line.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        if let Some(offset) = self.offset {
            write!(f, " (at byte {offset})")?;
        }
        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_includes_code_and_offset() {
        let diag = Diagnostic::warning(ErrorCode::P0002)
            .with_message("approximated `T` to its upper bound")
            .with_offset(42);
        assert_eq!(
            diag.to_string(),
            "warning[P0002]: approximated `T` to its upper bound (at byte 42)"
        );
    }

    #[test]
    fn notes_render_on_their_own_lines() {
        let diag = Diagnostic::error(ErrorCode::P0001).with_note("while decoding `Outer`");
        assert!(diag.to_string().contains("\n  note: while decoding `Outer`"));
    }
}
