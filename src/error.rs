//! Typed errors raised by the word-weighting core.
//! Glue code wraps these in `anyhow::Error` with context.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CloudError {
    /// Caller-supplied static configuration is unusable (zero boost/blow, threshold out of range).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A reference wordlist row could not be parsed. `line` is 1-based.
    #[error("wordlist line {line}: {reason}")]
    WordlistFormat { line: usize, reason: String },
}
