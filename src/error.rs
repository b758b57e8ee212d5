//! Lexical error taxonomy, returned alongside the token rather than in place
//! of it.
//!
//! A soft or hard failure never suppresses the token: the scanner always
//! makes forward progress and always hands back something the caller can
//! report a position from. `ScanError` is the out-of-band channel for
//! conditions the token's kind alone can't represent (stack over/underflow,
//! an oracle that failed, unbalanced brackets at EOF).

use crate::tag::Token;

/// Error surfaced alongside a [`Token`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanError {
    /// Push onto the bracket stack beyond its fixed capacity.
    StackOverflow,
    /// Pop from the bracket stack with no matching open bracket, or a
    /// popped entry's kind doesn't match the closing byte.
    StackUnderflow,
    /// EOF reached with one or more brackets still open.
    UnbalancedAtEof,
    /// The expression-context oracle reported its own failure.
    OracleFailed(i32),
    /// No dispatch rule matched the byte at the cursor.
    UnrecognizedByte,
}

/// Outcome of a single `next_token` call.
///
/// `token` is always populated, even when `error` is `Some` — a failed call
/// still reports a position the caller can treat as a diagnostic anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanResult {
    /// The token produced by this call.
    pub token: Token,
    /// `None` on success; `Some` for a soft or hard condition.
    pub error: Option<ScanError>,
}
