//! Ordered diagnostic sink.

use crate::{Diagnostic, Severity};

/// Collects diagnostics in emission order.
///
/// A queue belongs to one unit of work (one decode session, one file check)
/// and is drained by the driver once that work finishes.
#[derive(Default, Debug)]
pub struct DiagnosticQueue {
    diags: Vec<Diagnostic>,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic.
    pub fn emit(&mut self, diag: Diagnostic) {
        self.diags.push(diag);
    }

    /// Iterate over diagnostics in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diags.iter()
    }

    /// Drain all diagnostics, leaving the queue empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diags)
    }

    /// Number of queued diagnostics.
    pub fn len(&self) -> usize {
        self.diags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diags.is_empty()
    }

    /// Check whether any queued diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diags.iter().any(|d| d.severity == Severity::Error)
    }
}
