//! Expression-context oracle: the scanner's sole external collaborator.
//!
//! Resolving whether a `/` starts a division operator or a regular-expression
//! literal requires knowing whether the preceding token could terminate an
//! expression — something only a parser tracking grammar state can answer.
//! The scanner treats that answer as a capability supplied by the caller
//! rather than reaching for a global or thread-local.

/// A caller-supplied predicate consulted whenever the cursor stands on `/`.
pub trait ExpressionContext {
    /// Returns whether a value just ended at the current position.
    fn check(&mut self) -> OracleSignal;
}

/// Result of consulting an [`ExpressionContext`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OracleSignal {
    /// A value just ended; `/` is division.
    ValueEnds,
    /// No value is expected; `/` begins a regular-expression literal.
    NoValue,
    /// The caller itself failed; carries an opaque caller-defined code.
    Failed(i32),
}

impl<F> ExpressionContext for F
where
    F: FnMut() -> OracleSignal,
{
    fn check(&mut self) -> OracleSignal {
        self()
    }
}
