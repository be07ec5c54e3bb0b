//! Diagnostics for the Veld compiler.
//!
//! A [`Diagnostic`] is a structured, non-aborting report: a severity, a
//! stable [`ErrorCode`], a message, and optionally the byte offset it refers
//! to plus free-form notes. Fatal conditions are *not* diagnostics; those
//! travel through each phase's own error type. Diagnostics are the side
//! channel for conditions a phase recovers from (best-effort substitutions,
//! approximations) that the user should still hear about.
//!
//! Diagnostics carry byte offsets rather than resolved source positions:
//! phases that work on binary artifacts have no line table to point into.

mod diagnostic;
mod error_code;
mod queue;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use queue::DiagnosticQueue;
