//! Fatal decode errors.
//!
//! Two kinds of failure abort a decode session: a format version the decoder
//! does not speak, and a structurally corrupt buffer. Both are unrecoverable
//! for the session; there is no partial-success mode. Recoverable conditions
//! (conservative type approximations) go through the diagnostic queue
//! instead and never surface here.

use thiserror::Error;

/// Result alias for decode operations.
pub type Result<T> = std::result::Result<T, UnpickleError>;

/// A fatal failure while decoding pickled metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnpickleError {
    /// The buffer was produced by an incompatible format version.
    ///
    /// Raised before any body entry is touched: a differing major version or
    /// a minor version newer than the supported one is rejected outright.
    #[error(
        "{source_name}: unsupported pickle format {found_major}.{found_minor}, \
         expected {expected_major}.{expected_minor} or an older minor version"
    )]
    VersionMismatch {
        found_major: u32,
        found_minor: u32,
        expected_major: u32,
        expected_minor: u32,
        source_name: String,
    },

    /// The buffer is structurally malformed: a bad tag, an out-of-range
    /// reference, a truncated payload, or an illegal structural cycle.
    #[error("corrupt pickle at byte {offset}{}: {detail}", fmt_context(.context))]
    Corrupt {
        offset: usize,
        /// The declaration being decoded when the corruption was detected.
        context: String,
        detail: String,
    },

    /// A legacy construct this decoder deliberately does not reconstruct.
    #[error("unsupported construct `{construct}` at byte {offset}{}", fmt_context(.context))]
    Unsupported {
        construct: &'static str,
        offset: usize,
        context: String,
    },
}

fn fmt_context(context: &str) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!(" while unpickling {context}")
    }
}

impl UnpickleError {
    /// Corruption error with no declaration context yet; the session fills
    /// the context in at its decode boundary.
    pub(crate) fn corrupt(offset: usize, detail: impl Into<String>) -> Self {
        UnpickleError::Corrupt {
            offset,
            context: String::new(),
            detail: detail.into(),
        }
    }

    pub(crate) fn unsupported(offset: usize, construct: &'static str) -> Self {
        UnpickleError::Unsupported {
            construct,
            offset,
            context: String::new(),
        }
    }

    /// Fill in the declaration context if it is still empty.
    pub(crate) fn with_context(mut self, ctx: &str) -> Self {
        match &mut self {
            UnpickleError::Corrupt { context, .. } | UnpickleError::Unsupported { context, .. } => {
                if context.is_empty() {
                    ctx.clone_into(context);
                }
            }
            UnpickleError::VersionMismatch { .. } => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_message_includes_offset_and_context() {
        let err = UnpickleError::corrupt(17, "bad entry tag 99").with_context("module `demo`");
        assert_eq!(
            err.to_string(),
            "corrupt pickle at byte 17 while unpickling module `demo`: bad entry tag 99"
        );
    }

    #[test]
    fn with_context_does_not_overwrite() {
        let err = UnpickleError::corrupt(3, "x")
            .with_context("first")
            .with_context("second");
        match err {
            UnpickleError::Corrupt { context, .. } => assert_eq!(context, "first"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
